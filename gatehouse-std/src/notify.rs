//! Logging notifier for user-facing notices.

use gatehouse_core::Notifier;

/// A [`Notifier`] that writes notices to the `tracing` subscriber.
///
/// This is the fallback when the host application has no notification area
/// of its own (tests, server-side rendering, CLIs).
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse_std::TracingNotifier;
///
/// // Create a notifier with the default target name
/// let notifier = TracingNotifier::new();
///
/// // Or with a custom name
/// let notifier = TracingNotifier::named("auth");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TracingNotifier {
    name: &'static str,
}

impl TracingNotifier {
    /// Create a new `TracingNotifier` with a default name.
    pub const fn new() -> Self {
        Self { name: "session" }
    }

    /// Create a new `TracingNotifier` with a custom name.
    ///
    /// The name is attached to every notice to identify its source.
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(name = %self.name, notice = message, "Success notice");
    }

    fn error(&self, message: &str) {
        tracing::warn!(name = %self.name, notice = message, "Error notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_notifier_accepts_notices() {
        let notifier = TracingNotifier::named("auth");
        notifier.success("signed out");
        notifier.error("please sign in");
    }
}
