//! Error types for gatehouse.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GatehouseError`] - Top-level error type for all gatehouse operations
//! - [`ConfigError`] - Errors while wiring services at setup time
//! - [`HandlerError`] - Rejected handler overrides
//! - [`AuthError`] - Failed authentication workflows
//! - [`ServiceError`] - Failures reported by the session or account service
//! - [`RouteError`] - Route templates that cannot be compiled

use crate::user::User;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all gatehouse operations.
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// The session core could not be configured.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A handler override was rejected.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// An authentication workflow failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A route template was rejected.
    #[error("routing error: {0}")]
    Route(#[from] RouteError),
}

/// Errors raised while assembling the session core.
///
/// These are fatal: the builder refuses to produce a usable core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No session service instance or resolvable name was configured.
    #[error("please configure a session service")]
    MissingSessionService,

    /// No account service instance or resolvable name was configured.
    #[error("please configure an account service")]
    MissingAccountService,

    /// A service name was configured but nothing is registered under it.
    #[error("no {kind} registered under the name \"{name}\"")]
    UnknownService {
        /// Which collaborator was being resolved.
        kind: ServiceKind,
        /// The configured name.
        name: String,
    },

    /// A service name was configured as an empty string.
    #[error("the {kind} name must not be empty")]
    EmptyServiceName {
        /// Which collaborator was being resolved.
        kind: ServiceKind,
    },
}

/// The two identity back-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Session validation, sign-in, sign-out and password reset.
    Session,
    /// Account creation, confirmation and user reload.
    Account,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Session => f.write_str("session service"),
            ServiceKind::Account => f.write_str("account service"),
        }
    }
}

/// Errors raised when overriding a named handler.
///
/// The previously installed handler stays in place when either is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The name does not denote one of the fixed handler keys.
    #[error("handler name \"{0}\" is not a valid property")]
    InvalidName(String),

    /// The supplied callback does not have the shape the key requires.
    #[error("handler \"{name}\" expects {expected}")]
    InvalidValue {
        /// The handler key.
        name: &'static str,
        /// The callback shape the key requires.
        expected: &'static str,
    },
}

/// Errors produced by authentication workflows.
///
/// By the time one of these is returned the matching failure event has
/// already been broadcast.
#[derive(Error, Debug)]
pub enum AuthError {
    /// `authenticate` was called with a user lacking an identifier.
    #[error("unable to authenticate with a user lacking an identifier")]
    InvalidUser,

    /// The service answered, but the user carries no identifier.
    #[error("{}", unidentified_message(.0))]
    Unidentified(User),

    /// The service rejected the request or could not be reached.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AuthError {
    /// The normalized, user-facing failure message.
    pub fn message(&self) -> String {
        match self {
            AuthError::Service(err) => err.message(),
            other => other.to_string(),
        }
    }
}

fn unidentified_message(user: &User) -> String {
    match user.email.as_deref().or(user.name.as_deref()) {
        Some(who) => format!("no identifier returned for {who}"),
        None => "no identifier returned".to_string(),
    }
}

/// Failures reported by a [`SessionService`] or [`AccountService`].
///
/// [`SessionService`]: crate::SessionService
/// [`AccountService`]: crate::AccountService
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The back-end answered with an explicit rejection.
    #[error("{message}")]
    Rejected {
        /// Status code reported by the back-end, when there is one.
        status: Option<u16>,
        /// The back-end's message.
        message: String,
    },

    /// The request never produced an answer.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The service is not able to serve this operation.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Build a rejection without a status code.
    pub fn rejected(message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status: None,
            message: message.into(),
        }
    }

    /// Build a rejection carrying a status code.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Wrap any transport-level error.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ServiceError::Transport(err.into())
    }

    /// The status code, if the back-end reported one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Rejected { status, .. } => *status,
            _ => None,
        }
    }

    /// The message carried by the error, without any prefix.
    pub fn message(&self) -> String {
        match self {
            ServiceError::Rejected { message, .. } => message.clone(),
            ServiceError::Transport(source) => source.to_string(),
            ServiceError::Unavailable(message) => message.clone(),
        }
    }
}

/// Errors that can occur while compiling route templates.
#[derive(Error, Debug, Clone)]
pub enum RouteError {
    /// The template produced a pattern the regex engine rejected.
    #[error("invalid route template \"{template}\"")]
    InvalidTemplate {
        /// The offending template.
        template: String,
        /// The underlying compile error.
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_message_strips_prefix() {
        let err = ServiceError::transport("connection reset");
        assert_eq!(err.message(), "connection reset");
        assert_eq!(err.to_string(), "transport failure: connection reset");
    }

    #[test]
    fn test_auth_error_message_from_rejection() {
        let err = AuthError::from(ServiceError::with_status(401, "bad password"));
        assert_eq!(err.message(), "bad password");
        assert!(matches!(err, AuthError::Service(ref e) if e.status() == Some(401)));
    }

    #[test]
    fn test_unidentified_message_names_user() {
        let user = User::builder().email("ada@example.com").build();
        let err = AuthError::Unidentified(user);
        assert_eq!(err.message(), "no identifier returned for ada@example.com");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownService {
            kind: ServiceKind::Account,
            name: "Ldap".into(),
        };
        assert_eq!(
            err.to_string(),
            "no account service registered under the name \"Ldap\""
        );
    }

    #[test]
    fn test_top_level_conversion() {
        let err: GatehouseError = HandlerError::InvalidName("bogus".into()).into();
        assert!(matches!(err, GatehouseError::Handler(_)));
    }
}
