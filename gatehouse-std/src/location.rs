//! In-memory location for hosts without a browser location bar.

use gatehouse_core::Navigator;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct LocationState {
    path: String,
    query: Vec<(String, String)>,
    history: Vec<String>,
}

/// A [`Navigator`] that keeps the location in memory and records every
/// path it was sent to.
///
/// Useful for server-side rendering, headless runs and tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<LocationState>,
}

impl MemoryNavigator {
    /// Start at `/` with an empty query.
    pub fn new() -> Self {
        Self::at("/")
    }

    /// Start at the given path.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(LocationState {
                path: path.into(),
                query: Vec::new(),
                history: Vec::new(),
            }),
        }
    }

    /// Every path passed to [`Navigator::navigate`], oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// The current query parameters.
    pub fn query(&self) -> Vec<(String, String)> {
        self.lock().query.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for MemoryNavigator {
    fn path(&self) -> String {
        self.lock().path.clone()
    }

    fn navigate(&self, path: &str) {
        let mut state = self.lock();
        state.path = path.to_string();
        state.history.push(path.to_string());
    }

    fn query_param(&self, key: &str) -> Option<String> {
        self.lock()
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn set_query(&self, params: &[(&str, &str)]) {
        self.lock().query = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
    }
}
