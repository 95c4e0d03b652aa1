//! # gatehouse - Session Lifecycle and Route Guarding
//!
//! `gatehouse` keeps track of who is signed in to a single-page application,
//! drives the authentication workflows against pluggable identity back-ends,
//! and decides, on every navigation, whether a guest may proceed or must be
//! sent to sign in first.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatehouse::prelude::*;
//!
//! let gatehouse = Gatehouse::builder()
//!     .session_service(HttpSessions::new(api.clone()))
//!     .account_service(HttpAccounts::new(api))
//!     .routes(
//!         RouteTable::builder()
//!             .public("/")
//!             .public("/signIn")
//!             .private("/users/:id")
//!             .build()?,
//!     )
//!     .build()?;
//!
//! gatehouse.subscribe(|event: &SessionEvent| println!("{}", event.name()));
//!
//! // On every navigation attempt:
//! match gatehouse.on_location_change(LocationChange::to("/users/42")).await {
//!     Navigation::Proceed => render(),
//!     Navigation::Challenged { .. } => {} // already sent to /signIn?redirect=users%2F42
//! }
//! ```
//!
//! ## Components
//!
//! - [`SessionState`]: the current user
//! - [`HandlerRegistry`]: seven named, overridable handlers
//! - [`AuthFlowController`]: sign-in, sign-out, sign-up, confirmation,
//!   password reset, user reload
//! - [`NavigationGuard`]: one-shot session probe plus per-navigation access
//!   decision
//! - [`RouteTable`] / [`PathTemplate`]: ordered route classification
//! - [`EventBus`]: broadcast of [`SessionEvent`]s

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod auth;
mod builder;
mod config;
mod context;
mod guard;
mod hooks;
mod state;

pub use auth::AuthFlowController;
pub use builder::{Gatehouse, GatehouseBuilder};
pub use config::{DEFAULT_ACCOUNT_SERVICE, DEFAULT_SESSION_SERVICE, ServiceCatalog, SessionConfig};
pub use context::SessionContext;
pub use guard::{BootstrapState, NavigationGuard};
pub use hooks::{
    Handler, HandlerName, HandlerRegistry, Hook, LocationChange, Navigation, SignUpError,
    SignUpResponse, normalize_path,
};
pub use state::SessionState;

pub use gatehouse_core::{
    // Identity back-ends
    AccountService,
    // Errors
    AuthError,
    BoxError,
    ConfigError,
    Credentials,
    GatehouseError,
    HandlerError,
    // Host surfaces
    Navigator,
    Notifier,
    PasswordReset,
    RouteError,
    ServiceError,
    ServiceKind,
    // Events
    SessionEvent,
    SessionService,
    SignUpFailure,
    // Data
    User,
    UserBuilder,
    async_trait,
    identified,
};

pub use gatehouse_std::{
    // Bus
    ChannelSubscriber,
    EnabledHandle,
    EventBus,
    // Routing
    MatchOptions,
    // Host surfaces
    MemoryNavigator,
    Params,
    PathTemplate,
    RouteEntry,
    RouteEntryBuilder,
    RouteMatch,
    RouteSource,
    RouteTable,
    RouteTableBuilder,
    SharedRouteTable,
    Subscriber,
    Subscription,
    TracingNotifier,
    match_path,
};

/// Testing utilities.
pub mod testing {
    pub use gatehouse_std::testing::{
        Gate, MockAccountService, MockSessionService, RecordingNotifier, RecordingSubscriber,
        Reply,
    };
}

/// Prelude module - common imports for gatehouse.
///
/// # Usage
///
/// ```rust,ignore
/// use gatehouse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AccountService, AuthError, Credentials, Gatehouse, Handler, Hook, LocationChange,
        Navigation, RouteTable, SessionConfig, SessionContext, SessionEvent, SessionService, User,
    };
}
