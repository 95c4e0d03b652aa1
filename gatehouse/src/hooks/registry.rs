//! Storage for the seven named handlers.

use super::{
    Handler, HandlerName, Hook, LocationChange, Navigation, SignUpError, SignUpResponse, defaults,
};
use gatehouse_core::HandlerError;
use std::sync::{PoisonError, RwLock};

#[derive(Clone)]
struct Slot<H> {
    hook: H,
    overridden: bool,
}

impl<H> Slot<H> {
    fn default_hook(hook: H) -> Self {
        Self {
            hook,
            overridden: false,
        }
    }

    fn set(&mut self, hook: H) {
        self.hook = hook;
        self.overridden = true;
    }
}

struct HandlerSet {
    sign_in_start: Slot<Hook<String>>,
    sign_in_success: Slot<Hook<()>>,
    sign_out_success: Slot<Hook<()>>,
    sign_up_success: Slot<Hook<SignUpResponse>>,
    sign_up_failure: Slot<Hook<SignUpError>>,
    location_change: Slot<Hook<LocationChange, Navigation>>,
    user_reload: Slot<Hook<()>>,
}

impl HandlerSet {
    fn defaults() -> Self {
        Self {
            sign_in_start: Slot::default_hook(defaults::sign_in_start()),
            sign_in_success: Slot::default_hook(defaults::sign_in_success()),
            sign_out_success: Slot::default_hook(defaults::sign_out_success()),
            sign_up_success: Slot::default_hook(defaults::sign_up_success()),
            sign_up_failure: Slot::default_hook(defaults::sign_up_failure()),
            location_change: Slot::default_hook(defaults::location_change()),
            user_reload: Slot::default_hook(defaults::user_reload()),
        }
    }

    fn is_overridden(&self, name: HandlerName) -> bool {
        match name {
            HandlerName::SignInStart => self.sign_in_start.overridden,
            HandlerName::SignInSuccess => self.sign_in_success.overridden,
            HandlerName::SignOutSuccess => self.sign_out_success.overridden,
            HandlerName::SignUpSuccess => self.sign_up_success.overridden,
            HandlerName::SignUpFailure => self.sign_up_failure.overridden,
            HandlerName::LocationChange => self.location_change.overridden,
            HandlerName::UserReload => self.user_reload.overridden,
        }
    }
}

/// The named handlers, seeded with defaults and overridable at any time.
///
/// Callers fetch a handler at the moment of invocation, so an override
/// installed between two invocations takes effect on the second one.
///
/// | Default | Behavior |
/// |---------|----------|
/// | `signInStart` | go to the sign-in path with `?redirect=<target>` |
/// | `signInSuccess` | go to the `redirect` query target (and clear it), else to the root path |
/// | `signOutSuccess` | notify "User has successfully signed out." and go to the root path |
/// | `signUpSuccess` | broadcast `SignUpSuccess`, or `SignUpFailure` if the user has no id |
/// | `signUpFailure` | clear the current user and broadcast `SignUpFailure` |
/// | `locationChange` | guard private routes, challenging guests |
/// | `userReload` | refetch the user from the account service |
pub struct HandlerRegistry {
    set: RwLock<HandlerSet>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Create a registry holding the default handlers.
    pub fn new() -> Self {
        Self {
            set: RwLock::new(HandlerSet::defaults()),
        }
    }

    /// Replace the handler stored under `name`.
    ///
    /// `name` is a key (`signInStart`) or its prefixed alias
    /// (`handleSignInStart`). Fails without changing anything when the name
    /// is unknown or the callback has the wrong shape for it.
    pub fn set_handler(&self, name: &str, handler: Handler) -> Result<(), HandlerError> {
        let name: HandlerName = name.parse()?;
        self.set(name, handler)
    }

    /// Replace the handler stored under `name`.
    pub fn set(&self, name: HandlerName, handler: Handler) -> Result<(), HandlerError> {
        let mismatch = |handler: &Handler| {
            tracing::warn!(
                handler = name.key(),
                offered = handler.shape(),
                "rejected handler override"
            );
            HandlerError::InvalidValue {
                name: name.key(),
                expected: name.expected(),
            }
        };

        let mut set = self.write();
        match (name, handler) {
            (HandlerName::SignInStart, Handler::Redirect(hook)) => set.sign_in_start.set(hook),
            (HandlerName::SignInSuccess, Handler::Notify(hook)) => set.sign_in_success.set(hook),
            (HandlerName::SignOutSuccess, Handler::Notify(hook)) => set.sign_out_success.set(hook),
            (HandlerName::UserReload, Handler::Notify(hook)) => set.user_reload.set(hook),
            (HandlerName::SignUpSuccess, Handler::SignUp(hook)) => set.sign_up_success.set(hook),
            (HandlerName::SignUpFailure, Handler::SignUpError(hook)) => {
                set.sign_up_failure.set(hook)
            }
            (HandlerName::LocationChange, Handler::Navigation(hook)) => {
                set.location_change.set(hook)
            }
            (_, other) => return Err(mismatch(&other)),
        }
        tracing::debug!(handler = name.key(), "handler overridden");
        Ok(())
    }

    /// Put the default handler back under `name`.
    pub fn reset(&self, name: HandlerName) {
        let fresh = HandlerSet::defaults();
        let mut set = self.write();
        match name {
            HandlerName::SignInStart => set.sign_in_start = fresh.sign_in_start,
            HandlerName::SignInSuccess => set.sign_in_success = fresh.sign_in_success,
            HandlerName::SignOutSuccess => set.sign_out_success = fresh.sign_out_success,
            HandlerName::SignUpSuccess => set.sign_up_success = fresh.sign_up_success,
            HandlerName::SignUpFailure => set.sign_up_failure = fresh.sign_up_failure,
            HandlerName::LocationChange => set.location_change = fresh.location_change,
            HandlerName::UserReload => set.user_reload = fresh.user_reload,
        }
    }

    /// Whether `name` still holds its default handler.
    pub fn is_default(&self, name: HandlerName) -> bool {
        !self.read().is_overridden(name)
    }

    /// Keys that hold an override, in declaration order.
    pub fn overridden(&self) -> Vec<HandlerName> {
        let set = self.read();
        HandlerName::ALL
            .into_iter()
            .filter(|name| set.is_overridden(*name))
            .collect()
    }

    // Typed setters: these cannot fail.

    /// Override `signInStart`.
    pub fn on_sign_in_start(&self, hook: Hook<String>) {
        self.write().sign_in_start.set(hook);
    }

    /// Override `signInSuccess`.
    pub fn on_sign_in_success(&self, hook: Hook<()>) {
        self.write().sign_in_success.set(hook);
    }

    /// Override `signOutSuccess`.
    pub fn on_sign_out_success(&self, hook: Hook<()>) {
        self.write().sign_out_success.set(hook);
    }

    /// Override `signUpSuccess`.
    pub fn on_sign_up_success(&self, hook: Hook<SignUpResponse>) {
        self.write().sign_up_success.set(hook);
    }

    /// Override `signUpFailure`.
    pub fn on_sign_up_failure(&self, hook: Hook<SignUpError>) {
        self.write().sign_up_failure.set(hook);
    }

    /// Override `locationChange`.
    pub fn on_location_change(&self, hook: Hook<LocationChange, Navigation>) {
        self.write().location_change.set(hook);
    }

    /// Override `userReload`.
    pub fn on_user_reload(&self, hook: Hook<()>) {
        self.write().user_reload.set(hook);
    }

    // Getters hand out a clone so no lock is held while the hook runs.

    /// The current `signInStart` handler.
    pub fn sign_in_start(&self) -> Hook<String> {
        self.read().sign_in_start.hook.clone()
    }

    /// The current `signInSuccess` handler.
    pub fn sign_in_success(&self) -> Hook<()> {
        self.read().sign_in_success.hook.clone()
    }

    /// The current `signOutSuccess` handler.
    pub fn sign_out_success(&self) -> Hook<()> {
        self.read().sign_out_success.hook.clone()
    }

    /// The current `signUpSuccess` handler.
    pub fn sign_up_success(&self) -> Hook<SignUpResponse> {
        self.read().sign_up_success.hook.clone()
    }

    /// The current `signUpFailure` handler.
    pub fn sign_up_failure(&self) -> Hook<SignUpError> {
        self.read().sign_up_failure.hook.clone()
    }

    /// The current `locationChange` handler.
    pub fn location_change(&self) -> Hook<LocationChange, Navigation> {
        self.read().location_change.hook.clone()
    }

    /// The current `userReload` handler.
    pub fn user_reload(&self) -> Hook<()> {
        self.read().user_reload.hook.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HandlerSet> {
        self.set.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HandlerSet> {
        self.set.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("overridden", &self.overridden())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_defaults() {
        let registry = HandlerRegistry::new();
        for name in HandlerName::ALL {
            assert!(registry.is_default(name), "{name} should be default");
        }
        assert!(registry.overridden().is_empty());
    }

    #[test]
    fn test_set_handler_accepts_key_and_alias() {
        let registry = HandlerRegistry::new();
        registry
            .set_handler("signInStart", Handler::Redirect(Hook::sync(|_, _| ())))
            .unwrap();
        registry
            .set_handler("handleUserReload", Handler::Notify(Hook::sync(|_, ()| ())))
            .unwrap();

        assert_eq!(
            registry.overridden(),
            vec![HandlerName::SignInStart, HandlerName::UserReload]
        );
    }

    #[test]
    fn test_set_handler_rejects_unknown_name() {
        let registry = HandlerRegistry::new();
        let err = registry
            .set_handler("bogusName", Handler::Notify(Hook::sync(|_, ()| ())))
            .unwrap_err();
        assert_eq!(err, HandlerError::InvalidName("bogusName".into()));
        assert!(registry.overridden().is_empty());
    }

    #[test]
    fn test_set_handler_rejects_wrong_shape() {
        let registry = HandlerRegistry::new();
        let err = registry
            .set_handler("signInStart", Handler::Notify(Hook::sync(|_, ()| ())))
            .unwrap_err();
        assert!(matches!(
            err,
            HandlerError::InvalidValue {
                name: "signInStart",
                ..
            }
        ));
        assert!(registry.is_default(HandlerName::SignInStart));
    }

    #[test]
    fn test_reset_restores_default() {
        let registry = HandlerRegistry::new();
        registry.on_location_change(Hook::sync(|_, _| Navigation::Proceed));
        assert!(!registry.is_default(HandlerName::LocationChange));

        registry.reset(HandlerName::LocationChange);
        assert!(registry.is_default(HandlerName::LocationChange));
    }
}
