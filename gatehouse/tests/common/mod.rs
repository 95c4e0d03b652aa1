#![allow(dead_code)]

use gatehouse::{
    Gatehouse, GatehouseBuilder, MemoryNavigator, RouteTable, SessionConfig,
    testing::{MockAccountService, MockSessionService, RecordingNotifier, RecordingSubscriber},
};
use std::sync::Arc;

// ============================================================================
// Fixture
// ============================================================================

/// A gatehouse wired to scriptable back-ends and recording host surfaces.
pub struct Fixture {
    pub gatehouse: Gatehouse,
    pub sessions: Arc<MockSessionService>,
    pub accounts: Arc<MockAccountService>,
    pub navigator: Arc<MemoryNavigator>,
    pub notifier: RecordingNotifier,
    pub events: RecordingSubscriber,
}

impl Fixture {
    /// `/` public, `/users` private, no active session.
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Same as [`Fixture::new`], with extra builder configuration.
    pub fn with(configure: impl FnOnce(GatehouseBuilder) -> GatehouseBuilder) -> Self {
        let sessions = Arc::new(MockSessionService::new());
        let accounts = Arc::new(MockAccountService::new());
        Self::from_services(sessions, accounts, configure)
    }

    pub fn from_services(
        sessions: Arc<MockSessionService>,
        accounts: Arc<MockAccountService>,
        configure: impl FnOnce(GatehouseBuilder) -> GatehouseBuilder,
    ) -> Self {
        let navigator = Arc::new(MemoryNavigator::new());
        let notifier = RecordingNotifier::new();
        let events = RecordingSubscriber::new();

        let builder = Gatehouse::builder()
            .config(SessionConfig::default())
            .session_service(sessions.clone())
            .account_service(accounts.clone())
            .navigator(navigator.clone())
            .notifier(notifier.clone())
            .routes(default_routes());

        let gatehouse = configure(builder).build().unwrap();
        gatehouse.subscribe(events.clone());

        Self {
            gatehouse,
            sessions,
            accounts,
            navigator,
            notifier,
            events,
        }
    }
}

pub fn default_routes() -> RouteTable {
    RouteTable::builder()
        .public("/")
        .public("/signIn")
        .private("/users")
        .private("/users/:id")
        .build()
        .unwrap()
}

/// Install a fmt subscriber for debugging a test run with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
