//! Shared handles passed to every handler.

use crate::{config::SessionConfig, hooks::HandlerRegistry, state::SessionState};
use gatehouse_core::{AccountService, Navigator, Notifier, SessionEvent, SessionService};
use gatehouse_std::{EventBus, RouteSource};
use std::sync::Arc;

pub(crate) struct ContextParts {
    pub(crate) config: SessionConfig,
    pub(crate) state: SessionState,
    pub(crate) hooks: HandlerRegistry,
    pub(crate) bus: EventBus,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) session_service: Arc<dyn SessionService>,
    pub(crate) account_service: Arc<dyn AccountService>,
    pub(crate) routes: Arc<dyn RouteSource>,
}

/// Everything a handler may need: the session state, the handler registry,
/// the event bus, the host surfaces and the identity back-ends.
///
/// Cheap to clone; all clones refer to the same session.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<ContextParts>,
}

impl SessionContext {
    pub(crate) fn new(parts: ContextParts) -> Self {
        Self {
            inner: Arc::new(parts),
        }
    }

    /// Setup-time settings.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The current user.
    pub fn session(&self) -> &SessionState {
        &self.inner.state
    }

    /// The named handlers.
    pub fn hooks(&self) -> &HandlerRegistry {
        &self.inner.hooks
    }

    /// The broadcast bus.
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// The host application's location.
    pub fn navigator(&self) -> &dyn Navigator {
        &*self.inner.navigator
    }

    /// The host application's notification area.
    pub fn notifier(&self) -> &dyn Notifier {
        &*self.inner.notifier
    }

    /// The session back-end.
    pub fn session_service(&self) -> &dyn SessionService {
        &*self.inner.session_service
    }

    /// The account back-end.
    pub fn account_service(&self) -> &dyn AccountService {
        &*self.inner.account_service
    }

    /// The live route table.
    pub fn routes(&self) -> &dyn RouteSource {
        &*self.inner.routes
    }

    /// Broadcast `event`, then run the handler wired to it.
    ///
    /// `SignInSuccess` runs `signInSuccess` and `SignOutSuccess` runs
    /// `signOutSuccess`; other events are broadcast only.
    pub async fn emit(&self, event: SessionEvent) {
        if event.is_failure() {
            tracing::debug!(event = event.name(), "Workflow failed");
        }
        self.bus().publish(&event);
        match event {
            SessionEvent::SignInSuccess => {
                let hook = self.hooks().sign_in_success();
                hook.call(self.clone(), ()).await;
            }
            SessionEvent::SignOutSuccess => {
                let hook = self.hooks().sign_out_success();
                hook.call(self.clone(), ()).await;
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("config", &self.inner.config)
            .field("state", &self.inner.state)
            .field("bus", &self.inner.bus)
            .finish_non_exhaustive()
    }
}
