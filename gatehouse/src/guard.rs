//! # Navigation Guard
//!
//! Intercepts navigation attempts. The first attempt probes the session
//! service once to restore an existing session; every attempt then runs the
//! `locationChange` handler, which decides whether the navigation proceeds.
//!
//! ```text
//! on_location_change(change)
//!   ├─ Unprobed?  session_service.session()  (once, concurrent callers wait)
//!   │     ├─ identified user ─► CurrentUser = user
//!   │     └─ error / no id   ─► stay guest
//!   └─ locationChange(change) ─► Proceed | Challenged { redirect }
//! ```

use crate::{
    context::SessionContext,
    hooks::{LocationChange, Navigation},
};
use gatehouse_core::identified;
use tokio::sync::OnceCell;

/// Whether the guard has consulted the session service yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// No navigation has completed the probe.
    Unprobed,
    /// The probe ran, whatever its outcome.
    Probed,
}

/// Gates navigation on the session.
#[derive(Debug)]
pub struct NavigationGuard {
    ctx: SessionContext,
    probe: OnceCell<()>,
}

impl NavigationGuard {
    /// Create a guard that has not probed yet.
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            probe: OnceCell::new(),
        }
    }

    /// Handle one navigation attempt.
    ///
    /// Waits for the session probe on first use, then defers to the
    /// `locationChange` handler current at this moment.
    pub async fn on_location_change(&self, change: LocationChange) -> Navigation {
        self.ensure_probed().await;
        let location_change = self.ctx.hooks().location_change();
        location_change.call(self.ctx.clone(), change).await
    }

    /// Run the session probe unless it already ran.
    ///
    /// Concurrent callers share a single in-flight probe.
    pub async fn ensure_probed(&self) {
        self.probe.get_or_init(|| self.probe_session()).await;
    }

    /// Where the guard is in its bootstrap.
    pub fn state(&self) -> BootstrapState {
        if self.probe.initialized() {
            BootstrapState::Probed
        } else {
            BootstrapState::Unprobed
        }
    }

    /// Whether the session probe has completed.
    pub fn is_probed(&self) -> bool {
        self.state() == BootstrapState::Probed
    }

    async fn probe_session(&self) {
        match self.ctx.session_service().session().await.map(identified) {
            Ok(Ok(user)) => {
                tracing::info!(user = ?user.id(), "existing session restored");
                self.ctx.session().set(user);
            }
            Ok(Err(_)) => tracing::info!("session probe returned no user id, continuing as guest"),
            Err(error) => tracing::warn!(%error, "session probe failed, continuing as guest"),
        }
    }
}
