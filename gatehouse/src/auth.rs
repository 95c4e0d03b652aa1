//! # Authentication Workflows
//!
//! [`AuthFlowController`] drives sign-in, sign-out, sign-up, account
//! confirmation, password reset and user reload against the identity
//! back-ends, and broadcasts the outcome of each.
//!
//! | Operation | Success event | Failure event |
//! |-----------|---------------|---------------|
//! | `sign_in` | `SignInSuccess` | `SignInFailure` |
//! | `sign_out` | `SignOutSuccess` (always, first) | - |
//! | `authenticate` | `SignInSuccess`, `Authenticated` | - |
//! | `sign_up` | via `signUpSuccess` | via `signUpFailure` |
//! | `confirm_sign_up` | `SignUpConfirmationSuccess` | `SignUpConfirmationFailure` |
//! | `request_password_reset` | `RequestPasswordResetSuccess` | `RequestPasswordResetFailure` |
//! | `submit_password_reset` | `SubmitPasswordResetSuccess` | `SubmitPasswordResetFailure` |
//!
//! Returned errors are informational: the failure event has already been
//! broadcast when they reach the caller.

use crate::{
    context::SessionContext,
    hooks::{SignUpError, SignUpResponse},
};
use gatehouse_core::{AuthError, Credentials, PasswordReset, SessionEvent, User, identified};

const NOT_AUTHENTICATED_NOTICE: &str = "User is not authenticated, please sign in to continue.";

/// Runs authentication workflows against the session context.
#[derive(Debug, Clone)]
pub struct AuthFlowController {
    ctx: SessionContext,
}

impl AuthFlowController {
    /// Create a controller over `ctx`.
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Sign in with `credentials`.
    ///
    /// Broadcasts exactly one of `SignInSuccess` or `SignInFailure`.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let outcome = match self.ctx.session_service().sign_in(credentials).await {
            Ok(user) => identified(user).map_err(AuthError::Unidentified),
            Err(error) => Err(AuthError::Service(error)),
        };

        match outcome {
            Ok(user) => {
                tracing::info!(user = ?user.id(), "signed in");
                self.ctx.session().set(user.clone());
                self.ctx.emit(SessionEvent::SignInSuccess).await;
                Ok(user)
            }
            Err(error) => {
                tracing::info!(%error, "sign-in failed");
                self.ctx
                    .emit(SessionEvent::SignInFailure {
                        message: error.message(),
                    })
                    .await;
                Err(error)
            }
        }
    }

    /// Sign out.
    ///
    /// `SignOutSuccess` is broadcast before anything else. The remote
    /// session is closed only when an identified user is signed in; the
    /// current user is cleared whatever the remote outcome.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.ctx.emit(SessionEvent::SignOutSuccess).await;

        if !self.ctx.session().is_signed_in() {
            tracing::debug!("sign-out without a user, nothing to close");
            return Ok(());
        }

        let result = self.ctx.session_service().sign_out().await;
        self.ctx.session().clear();
        match result {
            Ok(()) => {
                tracing::info!("signed out");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "remote sign-out failed, local session cleared");
                Err(error.into())
            }
        }
    }

    /// Adopt `user` as the signed-in user without contacting the session
    /// service, e.g. after an out-of-band login.
    ///
    /// Broadcasts `SignInSuccess` then `Authenticated`.
    pub async fn authenticate(&self, user: User) -> Result<(), AuthError> {
        let user = identified(user).map_err(|_| AuthError::InvalidUser)?;
        tracing::info!(user = ?user.id(), "authenticated");
        self.ctx.session().set(user);
        self.ctx.emit(SessionEvent::SignInSuccess).await;
        self.ctx.emit(SessionEvent::Authenticated).await;
        Ok(())
    }

    /// Create an account and hand the outcome to `signUpSuccess` or
    /// `signUpFailure`.
    pub async fn sign_up(&self, credentials: &Credentials) {
        let result = self.ctx.account_service().create(credentials).await;
        let current = self.ctx.session().get();
        match result {
            Ok(user) => {
                let sign_up_success = self.ctx.hooks().sign_up_success();
                sign_up_success
                    .call(self.ctx.clone(), SignUpResponse { user, current })
                    .await;
            }
            Err(error) => {
                tracing::info!(%error, "sign-up rejected");
                let sign_up_failure = self.ctx.hooks().sign_up_failure();
                sign_up_failure
                    .call(self.ctx.clone(), SignUpError { error, current })
                    .await;
            }
        }
    }

    /// Confirm an account with the token from the confirmation email.
    pub async fn confirm_sign_up(&self, token: &str) -> Result<(), AuthError> {
        match self.ctx.account_service().confirm(token).await {
            Ok(()) => {
                self.ctx.emit(SessionEvent::SignUpConfirmationSuccess).await;
                Ok(())
            }
            Err(error) => {
                self.ctx
                    .emit(SessionEvent::SignUpConfirmationFailure {
                        message: error.message(),
                    })
                    .await;
                Err(error.into())
            }
        }
    }

    /// Ask for a password reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self.ctx.session_service().request_password_reset(email).await {
            Ok(()) => {
                self.ctx.emit(SessionEvent::RequestPasswordResetSuccess).await;
                Ok(())
            }
            Err(error) => {
                self.ctx
                    .emit(SessionEvent::RequestPasswordResetFailure {
                        message: error.message(),
                    })
                    .await;
                Err(error.into())
            }
        }
    }

    /// Set a new password from a reset token.
    pub async fn submit_password_reset(&self, reset: &PasswordReset) -> Result<(), AuthError> {
        match self.ctx.session_service().submit_password_reset(reset).await {
            Ok(()) => {
                self.ctx.emit(SessionEvent::SubmitPasswordResetSuccess).await;
                Ok(())
            }
            Err(error) => {
                self.ctx
                    .emit(SessionEvent::SubmitPasswordResetFailure {
                        message: error.message(),
                    })
                    .await;
                Err(error.into())
            }
        }
    }

    /// Refresh the current user through the `userReload` handler.
    pub async fn reload_user(&self) {
        let user_reload = self.ctx.hooks().user_reload();
        user_reload.call(self.ctx.clone(), ()).await;
    }

    /// React to a session found expired elsewhere, e.g. an HTTP 401 seen by
    /// the host's HTTP layer: tell the user and send them to sign in.
    pub fn require_sign_in(&self) {
        tracing::debug!("session required, sending user to sign-in");
        self.ctx.notifier().error(NOT_AUTHENTICATED_NOTICE);
        self.ctx.navigator().navigate(&self.ctx.config().sign_in_path);
    }
}
