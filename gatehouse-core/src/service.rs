//! # Identity Back-ends
//!
//! The two external services the session core drives. Their network
//! behavior is not designed here; gatehouse only depends on the contracts
//! below.
//!
//! Both traits use `async-trait` so they can be stored as
//! `Arc<dyn SessionService>` and chosen at setup time.
//!
//! A resolved [`User`] without an identifier is a soft failure. Services
//! should still return it as `Ok`; gatehouse decides what it means.

use crate::{
    error::ServiceError,
    user::{Credentials, PasswordReset, User},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Session validation, sign-in, sign-out and password reset.
#[async_trait]
pub trait SessionService: Send + Sync + 'static {
    /// Ask whether an existing session is still valid and for whom.
    async fn session(&self) -> Result<User, ServiceError>;

    /// Open a session with the given credentials.
    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ServiceError>;

    /// Close the current session.
    async fn sign_out(&self) -> Result<(), ServiceError>;

    /// Send a password reset email.
    async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError>;

    /// Set a new password from a reset token.
    async fn submit_password_reset(&self, reset: &PasswordReset) -> Result<(), ServiceError>;
}

/// Account creation, confirmation and user reload.
#[async_trait]
pub trait AccountService: Send + Sync + 'static {
    /// Create an account.
    async fn create(&self, credentials: &Credentials) -> Result<User, ServiceError>;

    /// Confirm an account with the token from the confirmation email.
    async fn confirm(&self, token: &str) -> Result<(), ServiceError>;

    /// Fetch the signed-in user. `force_reload` bypasses any cache.
    async fn current_user(&self, force_reload: bool) -> Result<User, ServiceError>;
}

// Allow shared handles to be used where a service is expected.
#[async_trait]
impl<S: SessionService + ?Sized> SessionService for Arc<S> {
    async fn session(&self) -> Result<User, ServiceError> {
        (**self).session().await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ServiceError> {
        (**self).sign_in(credentials).await
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        (**self).sign_out().await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        (**self).request_password_reset(email).await
    }

    async fn submit_password_reset(&self, reset: &PasswordReset) -> Result<(), ServiceError> {
        (**self).submit_password_reset(reset).await
    }
}

#[async_trait]
impl<A: AccountService + ?Sized> AccountService for Arc<A> {
    async fn create(&self, credentials: &Credentials) -> Result<User, ServiceError> {
        (**self).create(credentials).await
    }

    async fn confirm(&self, token: &str) -> Result<(), ServiceError> {
        (**self).confirm(token).await
    }

    async fn current_user(&self, force_reload: bool) -> Result<User, ServiceError> {
        (**self).current_user(force_reload).await
    }
}

/// Turn a resolved response into an explicit identified / unidentified result.
///
/// Returns the user back as the error when it carries no identifier.
pub fn identified(user: User) -> Result<User, User> {
    if user.is_identified() {
        Ok(user)
    } else {
        Err(user)
    }
}
