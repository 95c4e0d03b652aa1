//! Lifecycle events broadcast by the session core.

use crate::user::User;

/// Every notification the session core broadcasts.
///
/// Listeners (usually the UI) match on this enum instead of string names.
/// Broadcasting is fire-and-forget: the core never waits for, or reads
/// anything back from, a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user was signed in, either through the session service or
    /// through a trusted `authenticate` call.
    SignInSuccess,
    /// Sign-in was rejected or the response carried no identifier.
    SignInFailure {
        /// Normalized failure message.
        message: String,
    },
    /// Sign-out was requested. Broadcast before the remote call completes.
    SignOutSuccess,
    /// An account was created.
    SignUpSuccess {
        /// The created account.
        user: User,
    },
    /// Account creation failed.
    SignUpFailure(SignUpFailure),
    /// The confirmation token was accepted.
    SignUpConfirmationSuccess,
    /// The confirmation token was rejected.
    SignUpConfirmationFailure {
        /// Normalized failure message.
        message: String,
    },
    /// A password reset email was requested successfully.
    RequestPasswordResetSuccess,
    /// Requesting a password reset email failed.
    RequestPasswordResetFailure {
        /// Normalized failure message.
        message: String,
    },
    /// A new password was accepted.
    SubmitPasswordResetSuccess,
    /// Submitting a new password failed.
    SubmitPasswordResetFailure {
        /// Normalized failure message.
        message: String,
    },
    /// A caller vouched for a user through `authenticate`.
    Authenticated,
    /// A guest tried to reach a private route.
    SignInRequired {
        /// The path the guest was heading to, without its leading `/`.
        redirect: String,
    },
    /// The sign-in challenge is being presented.
    SignInStart {
        /// The path to resume after sign-in, without its leading `/`.
        redirect: String,
    },
}

/// Why an account could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpFailure {
    /// The account service answered without an identifier.
    Unidentified(User),
    /// The account service rejected the request.
    Rejected {
        /// Normalized failure message.
        message: String,
    },
}

impl SessionEvent {
    /// The broadcast name of this event, e.g. `"signInSuccess"`.
    pub const fn name(&self) -> &'static str {
        match self {
            SessionEvent::SignInSuccess => "signInSuccess",
            SessionEvent::SignInFailure { .. } => "signInFailure",
            SessionEvent::SignOutSuccess => "signOutSuccess",
            SessionEvent::SignUpSuccess { .. } => "signUpSuccess",
            SessionEvent::SignUpFailure(_) => "signUpFailure",
            SessionEvent::SignUpConfirmationSuccess => "signUpConfirmationSuccess",
            SessionEvent::SignUpConfirmationFailure { .. } => "signUpConfirmationFailure",
            SessionEvent::RequestPasswordResetSuccess => "requestPasswordResetSuccess",
            SessionEvent::RequestPasswordResetFailure { .. } => "requestPasswordResetFailure",
            SessionEvent::SubmitPasswordResetSuccess => "submitPasswordResetSuccess",
            SessionEvent::SubmitPasswordResetFailure { .. } => "submitPasswordResetFailure",
            SessionEvent::Authenticated => "authenticated",
            SessionEvent::SignInRequired { .. } => "signInRequired",
            SessionEvent::SignInStart { .. } => "signInStart",
        }
    }

    /// Whether this event reports a failed workflow.
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            SessionEvent::SignInFailure { .. }
                | SessionEvent::SignUpFailure(_)
                | SessionEvent::SignUpConfirmationFailure { .. }
                | SessionEvent::RequestPasswordResetFailure { .. }
                | SessionEvent::SubmitPasswordResetFailure { .. }
        )
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
