//! # Named Handlers
//!
//! Gatehouse reacts to lifecycle points through seven named, overridable
//! handlers:
//!
//! | Name | Argument | Runs when |
//! |------|----------|-----------|
//! | `signInStart` | redirect target | a guest reaches a private route |
//! | `signInSuccess` | - | `SignInSuccess` is emitted |
//! | `signOutSuccess` | - | `SignOutSuccess` is emitted |
//! | `signUpSuccess` | [`SignUpResponse`] | the account service created an account |
//! | `signUpFailure` | [`SignUpError`] | the account service refused |
//! | `locationChange` | [`LocationChange`] | every navigation, after the session probe |
//! | `userReload` | - | `reload_user` is called |
//!
//! Every handler has a default (see [`HandlerRegistry`]), installed when the
//! registry is created. Overrides replace it; the next invocation uses the
//! override.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse::{Handler, Hook};
//!
//! gatehouse.set_handler(
//!     "signInStart",
//!     Handler::Redirect(Hook::sync(|_ctx, redirect: String| {
//!         modal::open_sign_in(&redirect);
//!     })),
//! )?;
//! ```

mod defaults;
mod registry;

pub use defaults::normalize_path;
pub use registry::HandlerRegistry;

use crate::context::SessionContext;
use futures::future::{BoxFuture, FutureExt};
use gatehouse_core::{HandlerError, ServiceError, User};
use std::{future::Future, str::FromStr, sync::Arc};

/// An async callback receiving the session context and one argument.
///
/// Cloning is cheap; clones share the callback.
pub struct Hook<A, R = ()> {
    f: Arc<dyn Fn(SessionContext, A) -> BoxFuture<'static, R> + Send + Sync>,
}

impl<A, R> Clone for Hook<A, R> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<A, R> std::fmt::Debug for Hook<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook")
    }
}

impl<A: Send + 'static, R: Send + 'static> Hook<A, R> {
    /// Wrap an async function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(SessionContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self {
            f: Arc::new(move |ctx: SessionContext, args: A| f(ctx, args).boxed()),
        }
    }

    /// Wrap a plain function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&SessionContext, A) -> R + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |ctx: SessionContext, args: A| {
                futures::future::ready(f(&ctx, args)).boxed()
            }),
        }
    }

    /// Run the callback.
    pub async fn call(&self, ctx: SessionContext, args: A) -> R {
        (self.f)(ctx, args).await
    }
}

/// Argument of `signUpSuccess`.
#[derive(Debug, Clone)]
pub struct SignUpResponse {
    /// What the account service returned. May lack an identifier.
    pub user: User,
    /// Who was signed in when the response arrived.
    pub current: Option<User>,
}

/// Argument of `signUpFailure`.
#[derive(Debug)]
pub struct SignUpError {
    /// Why the account service refused.
    pub error: ServiceError,
    /// Who was signed in when the failure arrived.
    pub current: Option<User>,
}

/// Argument of `locationChange`: one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    /// Destination as reported by the host, possibly an absolute URL with
    /// query string.
    pub next: String,
    /// Where the navigation starts from, if known.
    pub current: Option<String>,
}

impl LocationChange {
    /// A navigation towards `next`.
    pub fn to(next: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            current: None,
        }
    }

    /// Record where the navigation starts from.
    pub fn from(mut self, current: impl Into<String>) -> Self {
        self.current = Some(current.into());
        self
    }
}

/// What `locationChange` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Let the navigation through.
    Proceed,
    /// A sign-in challenge was raised instead.
    Challenged {
        /// Where to resume after sign-in, without leading `/`.
        redirect: String,
    },
}

impl Navigation {
    /// Whether the navigation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Proceed)
    }
}

/// The fixed set of handler keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerName {
    /// `signInStart`
    SignInStart,
    /// `signInSuccess`
    SignInSuccess,
    /// `signOutSuccess`
    SignOutSuccess,
    /// `signUpSuccess`
    SignUpSuccess,
    /// `signUpFailure`
    SignUpFailure,
    /// `locationChange`
    LocationChange,
    /// `userReload`
    UserReload,
}

impl HandlerName {
    /// All keys.
    pub const ALL: [HandlerName; 7] = [
        HandlerName::SignInStart,
        HandlerName::SignInSuccess,
        HandlerName::SignOutSuccess,
        HandlerName::SignUpSuccess,
        HandlerName::SignUpFailure,
        HandlerName::LocationChange,
        HandlerName::UserReload,
    ];

    /// The key, e.g. `"signInStart"`.
    pub const fn key(self) -> &'static str {
        match self {
            HandlerName::SignInStart => "signInStart",
            HandlerName::SignInSuccess => "signInSuccess",
            HandlerName::SignOutSuccess => "signOutSuccess",
            HandlerName::SignUpSuccess => "signUpSuccess",
            HandlerName::SignUpFailure => "signUpFailure",
            HandlerName::LocationChange => "locationChange",
            HandlerName::UserReload => "userReload",
        }
    }

    /// The prefixed alias, e.g. `"handleSignInStart"`.
    pub const fn alias(self) -> &'static str {
        match self {
            HandlerName::SignInStart => "handleSignInStart",
            HandlerName::SignInSuccess => "handleSignInSuccess",
            HandlerName::SignOutSuccess => "handleSignOutSuccess",
            HandlerName::SignUpSuccess => "handleSignUpSuccess",
            HandlerName::SignUpFailure => "handleSignUpFailure",
            HandlerName::LocationChange => "handleLocationChange",
            HandlerName::UserReload => "handleUserReload",
        }
    }

    /// The callback shape this key requires.
    pub const fn expected(self) -> &'static str {
        match self {
            HandlerName::SignInStart => Handler::REDIRECT,
            HandlerName::SignInSuccess | HandlerName::SignOutSuccess | HandlerName::UserReload => {
                Handler::NOTIFY
            }
            HandlerName::SignUpSuccess => Handler::SIGN_UP,
            HandlerName::SignUpFailure => Handler::SIGN_UP_ERROR,
            HandlerName::LocationChange => Handler::NAVIGATION,
        }
    }
}

impl FromStr for HandlerName {
    type Err = HandlerError;

    /// Accepts the key (`signInStart`) or its prefixed alias
    /// (`handleSignInStart`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        HandlerName::ALL
            .into_iter()
            .find(|h| h.key() == name || h.alias() == name)
            .ok_or_else(|| HandlerError::InvalidName(name.to_string()))
    }
}

impl std::fmt::Display for HandlerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A callback offered to [`HandlerRegistry::set_handler`].
///
/// The variant states the callback's shape; it must match the key it is
/// installed under.
#[derive(Debug, Clone)]
pub enum Handler {
    /// `fn(redirect)`: `signInStart`.
    Redirect(Hook<String>),
    /// `fn()`: `signInSuccess`, `signOutSuccess`, `userReload`.
    Notify(Hook<()>),
    /// `fn(response)`: `signUpSuccess`.
    SignUp(Hook<SignUpResponse>),
    /// `fn(error)`: `signUpFailure`.
    SignUpError(Hook<SignUpError>),
    /// `fn(change) -> Navigation`: `locationChange`.
    Navigation(Hook<LocationChange, Navigation>),
}

impl Handler {
    const REDIRECT: &'static str = "a callback taking the redirect target";
    const NOTIFY: &'static str = "a callback without arguments";
    const SIGN_UP: &'static str = "a callback taking the sign-up response";
    const SIGN_UP_ERROR: &'static str = "a callback taking the sign-up error";
    const NAVIGATION: &'static str = "a callback taking the location change and returning a navigation decision";

    /// Describe this callback's shape.
    pub const fn shape(&self) -> &'static str {
        match self {
            Handler::Redirect(_) => Self::REDIRECT,
            Handler::Notify(_) => Self::NOTIFY,
            Handler::SignUp(_) => Self::SIGN_UP,
            Handler::SignUpError(_) => Self::SIGN_UP_ERROR,
            Handler::Navigation(_) => Self::NAVIGATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_and_alias() {
        assert_eq!(
            "signInStart".parse::<HandlerName>().unwrap(),
            HandlerName::SignInStart
        );
        assert_eq!(
            "handleUserReload".parse::<HandlerName>().unwrap(),
            HandlerName::UserReload
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for bogus in ["bogusName", "handle", "SignInStart", "handlesignInStart", ""] {
            assert_eq!(
                bogus.parse::<HandlerName>(),
                Err(HandlerError::InvalidName(bogus.to_string()))
            );
        }
    }

    #[test]
    fn test_expected_shapes() {
        let notify = Handler::Notify(Hook::sync(|_, ()| ()));
        assert_eq!(HandlerName::UserReload.expected(), notify.shape());
        assert_ne!(HandlerName::SignInStart.expected(), notify.shape());
    }

    #[test]
    fn test_navigation_helpers() {
        assert!(Navigation::Proceed.is_allowed());
        let change = LocationChange::to("/users").from("/");
        assert_eq!(change.current.as_deref(), Some("/"));
    }
}
