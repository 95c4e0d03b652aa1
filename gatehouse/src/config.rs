//! Setup-time configuration: paths the default handlers navigate to, and
//! which identity back-ends to use.

use gatehouse_core::{AccountService, ConfigError, ServiceKind, SessionService};
use std::{collections::HashMap, sync::Arc};

/// Name the session service is resolved by when none is configured.
pub const DEFAULT_SESSION_SERVICE: &str = "SessionService";

/// Name the account service is resolved by when none is configured.
pub const DEFAULT_ACCOUNT_SERVICE: &str = "AccountService";

/// Settings applied once, before the session core is first used.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Where the default `signInStart` handler sends guests.
    pub sign_in_path: String,
    /// Where the default handlers go when there is nowhere better.
    pub root_path: String,
    /// Query parameter carrying the redirect target.
    pub redirect_param: String,
    /// Prefix stripped from destinations before route matching, e.g. `/#`
    /// for hash-based routing or `/app` when mounted below the host root.
    pub base_path: String,
    /// Catalog name of the session service.
    pub session_service: String,
    /// Catalog name of the account service.
    pub account_service: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/signIn".to_string(),
            root_path: "/".to_string(),
            redirect_param: "redirect".to_string(),
            base_path: String::new(),
            session_service: DEFAULT_SESSION_SERVICE.to_string(),
            account_service: DEFAULT_ACCOUNT_SERVICE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Set the sign-in path.
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    /// Set the root path.
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = path.into();
        self
    }

    /// Set the redirect query parameter name.
    pub fn with_redirect_param(mut self, name: impl Into<String>) -> Self {
        self.redirect_param = name.into();
        self
    }

    /// Set the prefix stripped from destinations.
    pub fn with_base_path(mut self, prefix: impl Into<String>) -> Self {
        self.base_path = prefix.into();
        self
    }

    /// Choose the session service by catalog name.
    pub fn with_session_service(mut self, name: impl Into<String>) -> Self {
        self.session_service = name.into();
        self
    }

    /// Choose the account service by catalog name.
    pub fn with_account_service(mut self, name: impl Into<String>) -> Self {
        self.account_service = name.into();
        self
    }
}

type SessionFactory = Box<dyn Fn() -> Arc<dyn SessionService> + Send + Sync>;
type AccountFactory = Box<dyn Fn() -> Arc<dyn AccountService> + Send + Sync>;

/// Named factories for the identity back-ends.
///
/// Lets an application ship several implementations (HTTP, fake, offline)
/// and pick one by name through [`SessionConfig`].
///
/// # Example
///
/// ```rust,ignore
/// let catalog = ServiceCatalog::new()
///     .session("SessionService", || Arc::new(HttpSessions::new(base_url)))
///     .account("AccountService", || Arc::new(HttpAccounts::new(base_url)));
/// ```
#[derive(Default)]
pub struct ServiceCatalog {
    sessions: HashMap<String, SessionFactory>,
    accounts: HashMap<String, AccountFactory>,
}

impl ServiceCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session service factory under `name`.
    pub fn session<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn SessionService> + Send + Sync + 'static,
    {
        self.sessions.insert(name.into(), Box::new(factory));
        self
    }

    /// Register an account service factory under `name`.
    pub fn account<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn AccountService> + Send + Sync + 'static,
    {
        self.accounts.insert(name.into(), Box::new(factory));
        self
    }

    /// Build the session service registered under `name`.
    pub fn resolve_session(&self, name: &str) -> Result<Arc<dyn SessionService>, ConfigError> {
        resolve(&self.sessions, name, ServiceKind::Session)
    }

    /// Build the account service registered under `name`.
    pub fn resolve_account(&self, name: &str) -> Result<Arc<dyn AccountService>, ConfigError> {
        resolve(&self.accounts, name, ServiceKind::Account)
    }

    pub(crate) fn has_sessions(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub(crate) fn has_accounts(&self) -> bool {
        !self.accounts.is_empty()
    }
}

fn resolve<T: ?Sized>(
    factories: &HashMap<String, Box<dyn Fn() -> Arc<T> + Send + Sync>>,
    name: &str,
    kind: ServiceKind,
) -> Result<Arc<T>, ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptyServiceName { kind });
    }
    factories
        .get(name)
        .map(|factory| factory())
        .ok_or_else(|| ConfigError::UnknownService {
            kind,
            name: name.to_string(),
        })
}

impl std::fmt::Debug for ServiceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCatalog")
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}
