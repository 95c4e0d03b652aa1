//! The assembled session core and its builder.

use crate::{
    auth::AuthFlowController,
    config::{ServiceCatalog, SessionConfig},
    context::{ContextParts, SessionContext},
    guard::NavigationGuard,
    hooks::{
        Handler, HandlerName, HandlerRegistry, Hook, LocationChange, Navigation, SignUpError,
        SignUpResponse,
    },
    state::SessionState,
};
use futures::channel::mpsc::UnboundedReceiver;
use gatehouse_core::{
    AccountService, AuthError, ConfigError, Credentials, GatehouseError, HandlerError, Navigator,
    Notifier, PasswordReset, SessionEvent, SessionService, User,
};
use gatehouse_std::{
    EventBus, MemoryNavigator, RouteSource, RouteTable, Subscriber, Subscription, TracingNotifier,
};
use std::sync::Arc;

/// Builder for [`Gatehouse`].
///
/// Every surface has a default except the identity back-ends, which come
/// either as instances or by name from a [`ServiceCatalog`]:
///
/// | Part | Default |
/// |------|---------|
/// | config | [`SessionConfig::default`] |
/// | navigator | [`MemoryNavigator`] at `/` |
/// | notifier | [`TracingNotifier`] |
/// | routes | empty table (nothing is private) |
/// | bus | fresh [`EventBus`] |
/// | handlers | the defaults |
///
/// # Example
///
/// ```rust,ignore
/// let gatehouse = Gatehouse::builder()
///     .config(SessionConfig::default().with_sign_in_path("/login"))
///     .session_service(HttpSessions::new(api))
///     .account_service(HttpAccounts::new(api))
///     .routes(RouteTable::builder().public("/").private("/admin/*rest").build()?)
///     .build()?;
/// ```
pub struct GatehouseBuilder {
    config: SessionConfig,
    catalog: ServiceCatalog,
    session_service: Option<Arc<dyn SessionService>>,
    account_service: Option<Arc<dyn AccountService>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    routes: Option<Arc<dyn RouteSource>>,
    bus: Option<EventBus>,
    hooks: HandlerRegistry,
    rejected: Option<HandlerError>,
}

impl Default for GatehouseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatehouseBuilder {
    /// Create a builder with every default in place.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            catalog: ServiceCatalog::new(),
            session_service: None,
            account_service: None,
            navigator: None,
            notifier: None,
            routes: None,
            bus: None,
            hooks: HandlerRegistry::new(),
            rejected: None,
        }
    }

    /// Use `config`.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve services not supplied directly from `catalog`, by the names
    /// in the config.
    pub fn catalog(mut self, catalog: ServiceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use `service` as the session back-end.
    pub fn session_service<S: SessionService>(mut self, service: S) -> Self {
        self.session_service = Some(Arc::new(service));
        self
    }

    /// Use `service` as the account back-end.
    pub fn account_service<A: AccountService>(mut self, service: A) -> Self {
        self.account_service = Some(Arc::new(service));
        self
    }

    /// Use `navigator` as the host location.
    pub fn navigator<N: Navigator>(mut self, navigator: N) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Use `notifier` for user-facing notices.
    pub fn notifier<N: Notifier>(mut self, notifier: N) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Guard navigation with `routes`.
    pub fn routes<R: RouteSource>(mut self, routes: R) -> Self {
        self.routes = Some(Arc::new(routes));
        self
    }

    /// Broadcast on an existing bus, e.g. one shared with other components.
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Override a handler by name.
    ///
    /// A rejected override is reported by [`build`](Self::build); only the
    /// first rejection is kept.
    pub fn handler(mut self, name: &str, handler: Handler) -> Self {
        if let Err(err) = self.hooks.set_handler(name, handler) {
            tracing::debug!(name, error = %err, "Handler override rejected");
            self.rejected.get_or_insert(err);
        }
        self
    }

    /// Override `signInStart`.
    pub fn on_sign_in_start(self, hook: Hook<String>) -> Self {
        self.hooks.on_sign_in_start(hook);
        self
    }

    /// Override `signInSuccess`.
    pub fn on_sign_in_success(self, hook: Hook<()>) -> Self {
        self.hooks.on_sign_in_success(hook);
        self
    }

    /// Override `signOutSuccess`.
    pub fn on_sign_out_success(self, hook: Hook<()>) -> Self {
        self.hooks.on_sign_out_success(hook);
        self
    }

    /// Override `signUpSuccess`.
    pub fn on_sign_up_success(self, hook: Hook<SignUpResponse>) -> Self {
        self.hooks.on_sign_up_success(hook);
        self
    }

    /// Override `signUpFailure`.
    pub fn on_sign_up_failure(self, hook: Hook<SignUpError>) -> Self {
        self.hooks.on_sign_up_failure(hook);
        self
    }

    /// Override `locationChange`.
    pub fn on_location_change(self, hook: Hook<LocationChange, Navigation>) -> Self {
        self.hooks.on_location_change(hook);
        self
    }

    /// Override `userReload`.
    pub fn on_user_reload(self, hook: Hook<()>) -> Self {
        self.hooks.on_user_reload(hook);
        self
    }

    /// Assemble the session core.
    ///
    /// # Errors
    ///
    /// Returns [`GatehouseError::Handler`] when a named override was
    /// rejected, and [`GatehouseError::Config`] when a back-end was neither
    /// supplied nor registered in the catalog, or when the configured name
    /// is empty or unknown.
    pub fn build(self) -> Result<Gatehouse, GatehouseError> {
        if let Some(err) = self.rejected {
            return Err(err.into());
        }

        let session_service = match self.session_service {
            Some(service) => service,
            None if !self.catalog.has_sessions() => {
                return Err(ConfigError::MissingSessionService.into());
            }
            None => self.catalog.resolve_session(&self.config.session_service)?,
        };
        let account_service = match self.account_service {
            Some(service) => service,
            None if !self.catalog.has_accounts() => {
                return Err(ConfigError::MissingAccountService.into());
            }
            None => self.catalog.resolve_account(&self.config.account_service)?,
        };

        let defaults: Vec<&'static str> = HandlerName::ALL
            .into_iter()
            .filter(|name| self.hooks.is_default(*name))
            .map(HandlerName::key)
            .collect();
        tracing::debug!(?defaults, "handlers running default behavior");

        let ctx = SessionContext::new(ContextParts {
            config: self.config,
            state: SessionState::new(),
            hooks: self.hooks,
            bus: self.bus.unwrap_or_default(),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(MemoryNavigator::new())),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(TracingNotifier::default())),
            session_service,
            account_service,
            routes: self
                .routes
                .unwrap_or_else(|| Arc::new(RouteTable::empty())),
        });

        Ok(Gatehouse {
            flow: AuthFlowController::new(ctx.clone()),
            guard: Arc::new(NavigationGuard::new(ctx.clone())),
            ctx,
        })
    }
}

impl std::fmt::Debug for GatehouseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatehouseBuilder")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// The session core: current user, named handlers, broadcast bus,
/// authentication workflows and navigation guard behind one handle.
///
/// Clones share everything, including the guard's one-shot session probe.
#[derive(Debug, Clone)]
pub struct Gatehouse {
    ctx: SessionContext,
    flow: AuthFlowController,
    guard: Arc<NavigationGuard>,
}

impl Gatehouse {
    /// Start building.
    pub fn builder() -> GatehouseBuilder {
        GatehouseBuilder::new()
    }

    /// The shared context handed to handlers.
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// The authentication workflows.
    pub fn flow(&self) -> &AuthFlowController {
        &self.flow
    }

    /// The navigation guard.
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// The named handlers.
    pub fn handlers(&self) -> &HandlerRegistry {
        self.ctx.hooks()
    }

    /// Setup-time settings.
    pub fn config(&self) -> &SessionConfig {
        self.ctx.config()
    }

    /// The current user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.ctx.session().get()
    }

    /// Whether an identified user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.ctx.session().is_signed_in()
    }

    /// Whether any user record is present, identified or not.
    pub fn is_logged_in(&self) -> bool {
        self.ctx.session().is_logged_in()
    }

    /// Receive every broadcast event.
    pub fn subscribe<S: Subscriber>(&self, subscriber: S) -> Subscription {
        self.ctx.bus().subscribe(subscriber)
    }

    /// Receive every broadcast event on a channel.
    pub fn channel(&self) -> (Subscription, UnboundedReceiver<SessionEvent>) {
        self.ctx.bus().channel()
    }

    /// Override a handler by name. See [`HandlerRegistry::set_handler`].
    pub fn set_handler(&self, name: &str, handler: Handler) -> Result<(), HandlerError> {
        self.ctx.hooks().set_handler(name, handler)
    }

    /// Handle one navigation attempt. See [`NavigationGuard::on_location_change`].
    pub async fn on_location_change(&self, change: LocationChange) -> Navigation {
        self.guard.on_location_change(change).await
    }

    /// Whether the session probe has completed.
    pub fn is_probed(&self) -> bool {
        self.guard.is_probed()
    }

    /// See [`AuthFlowController::sign_in`].
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, AuthError> {
        self.flow.sign_in(credentials).await
    }

    /// See [`AuthFlowController::sign_out`].
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.flow.sign_out().await
    }

    /// See [`AuthFlowController::authenticate`].
    pub async fn authenticate(&self, user: User) -> Result<(), AuthError> {
        self.flow.authenticate(user).await
    }

    /// See [`AuthFlowController::sign_up`].
    pub async fn sign_up(&self, credentials: &Credentials) {
        self.flow.sign_up(credentials).await
    }

    /// See [`AuthFlowController::confirm_sign_up`].
    pub async fn confirm_sign_up(&self, token: &str) -> Result<(), AuthError> {
        self.flow.confirm_sign_up(token).await
    }

    /// See [`AuthFlowController::request_password_reset`].
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.flow.request_password_reset(email).await
    }

    /// See [`AuthFlowController::submit_password_reset`].
    pub async fn submit_password_reset(&self, reset: &PasswordReset) -> Result<(), AuthError> {
        self.flow.submit_password_reset(reset).await
    }

    /// See [`AuthFlowController::reload_user`].
    pub async fn reload_user(&self) {
        self.flow.reload_user().await
    }

    /// See [`AuthFlowController::require_sign_in`].
    pub fn require_sign_in(&self) {
        self.flow.require_sign_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_std::testing::{MockAccountService, MockSessionService};

    #[test]
    fn test_build_without_services_fails() {
        let err = Gatehouse::builder().build().unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Config(ConfigError::MissingSessionService)
        ));

        let err = Gatehouse::builder()
            .session_service(MockSessionService::new())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Config(ConfigError::MissingAccountService)
        ));
    }

    #[test]
    fn test_build_resolves_from_catalog() {
        let catalog = ServiceCatalog::new()
            .session("SessionService", || {
                Arc::new(MockSessionService::new()) as Arc<dyn SessionService>
            })
            .account("AccountService", || {
                Arc::new(MockAccountService::new()) as Arc<dyn AccountService>
            });

        let gatehouse = Gatehouse::builder().catalog(catalog).build().unwrap();
        assert!(!gatehouse.is_signed_in());
        assert!(!gatehouse.is_probed());
    }

    #[test]
    fn test_build_rejects_unknown_catalog_name() {
        let catalog = ServiceCatalog::new()
            .session("Fake", || {
                Arc::new(MockSessionService::new()) as Arc<dyn SessionService>
            });

        let err = Gatehouse::builder()
            .config(SessionConfig::default().with_session_service("Http"))
            .catalog(catalog)
            .account_service(MockAccountService::new())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Config(ConfigError::UnknownService { name, .. }) if name == "Http"
        ));
    }

    #[test]
    fn test_builder_handler_rejects_bad_name() {
        let err = Gatehouse::builder()
            .session_service(MockSessionService::new())
            .account_service(MockAccountService::new())
            .handler("bogusName", Handler::Notify(Hook::sync(|_, ()| ())))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Handler(HandlerError::InvalidName(name)) if name == "bogusName"
        ));
    }

    #[test]
    fn test_builder_reports_first_rejected_override() {
        let err = Gatehouse::builder()
            .session_service(MockSessionService::new())
            .account_service(MockAccountService::new())
            .handler("signInStart", Handler::Notify(Hook::sync(|_, ()| ())))
            .handler("bogusName", Handler::Notify(Hook::sync(|_, ()| ())))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Handler(HandlerError::InvalidValue {
                name: "signInStart",
                ..
            })
        ));
    }
}
