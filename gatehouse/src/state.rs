//! The single source of truth for who is signed in.

use gatehouse_core::User;
use std::sync::{PoisonError, RwLock};

/// Holds the current user.
///
/// Every component reads through this type; only the flow controller, the
/// session probe and the default handlers write to it. Locks are held for
/// the duration of a single read or write, never across an `.await`.
#[derive(Debug, Default)]
pub struct SessionState {
    current: RwLock<Option<User>>,
}

impl SessionState {
    /// Start as a guest.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current user, if any.
    pub fn get(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `user` the current user.
    pub fn set(&self, user: User) {
        self.replace(Some(user));
    }

    /// Forget the current user.
    pub fn clear(&self) {
        self.replace(None);
    }

    /// Swap the current user, returning the previous one.
    pub fn replace(&self, user: Option<User>) -> Option<User> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, user)
    }

    /// Whether an identified user is present.
    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(User::is_identified)
    }

    /// Whether any user record is present, identified or not.
    pub fn is_logged_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The current user's identifier.
    pub fn user_id(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|u| u.id().map(str::to_string))
    }
}
