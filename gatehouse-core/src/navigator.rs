//! Host-application surfaces the session core acts upon: the location bar
//! and the user-facing notification area.

use std::sync::Arc;

/// Read and change the application's current location.
///
/// Paths are application-relative (`/users/42`). The query string is kept
/// separately so handlers can read and clear parameters such as `redirect`.
pub trait Navigator: Send + Sync + 'static {
    /// The current application path, without query string.
    fn path(&self) -> String;

    /// Move to another application path. The query string is left untouched.
    fn navigate(&self, path: &str);

    /// Read one query parameter (already decoded by the host).
    fn query_param(&self, key: &str) -> Option<String>;

    /// Replace the whole query string. An empty slice clears it.
    fn set_query(&self, params: &[(&str, &str)]);
}

/// Show short notices to the user.
pub trait Notifier: Send + Sync + 'static {
    /// A positive notice.
    fn success(&self, message: &str);

    /// A problem the user should know about.
    fn error(&self, message: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn path(&self) -> String {
        (**self).path()
    }

    fn navigate(&self, path: &str) {
        (**self).navigate(path)
    }

    fn query_param(&self, key: &str) -> Option<String> {
        (**self).query_param(key)
    }

    fn set_query(&self, params: &[(&str, &str)]) {
        (**self).set_query(params)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
