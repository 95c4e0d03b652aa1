//! Route tables: the ordered set of declared application routes with their
//! public/private flag.
//!
//! The table belongs to the surrounding routing subsystem. Gatehouse reads it
//! through [`RouteSource`] and never mutates it.

use super::template::{MatchOptions, Params, PathTemplate};
use gatehouse_core::RouteError;
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

/// One declared application route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    template: PathTemplate,
    public: bool,
    name: Option<String>,
    data: BTreeMap<String, String>,
}

impl RouteEntry {
    /// Compile a route with default options.
    pub fn new(template: &str, public: bool) -> Result<Self, RouteError> {
        Self::builder(template).public(public).build()
    }

    /// Start describing a route.
    pub fn builder(template: impl Into<String>) -> RouteEntryBuilder {
        RouteEntryBuilder {
            template: template.into(),
            public: false,
            options: MatchOptions::default(),
            name: None,
            data: BTreeMap::new(),
        }
    }

    /// The compiled template.
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Whether the route is reachable without a session.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Optional route name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Opaque per-route data owned by the routing subsystem.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Test a candidate path against this route.
    pub fn matches(&self, path: &str) -> Option<Params> {
        self.template.matches(path)
    }
}

/// Builder for [`RouteEntry`].
#[derive(Debug, Clone)]
pub struct RouteEntryBuilder {
    template: String,
    public: bool,
    options: MatchOptions,
    name: Option<String>,
    data: BTreeMap<String, String>,
}

impl RouteEntryBuilder {
    /// Set the public flag. Routes are private unless stated otherwise.
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Match this route without regard to case.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.case_insensitive = yes;
        self
    }

    /// Name the route.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach opaque data.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Compile the template.
    pub fn build(self) -> Result<RouteEntry, RouteError> {
        Ok(RouteEntry {
            template: PathTemplate::compile(&self.template, self.options)?,
            public: self.public,
            name: self.name,
            data: self.data,
        })
    }
}

/// The first route that matched a path, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matching route.
    pub entry: RouteEntry,
    /// Parameters bound by the route's template.
    pub params: Params,
}

/// Read access to a live route table.
pub trait RouteSource: Send + Sync + 'static {
    /// The current routes, in table order.
    fn routes(&self) -> Arc<[RouteEntry]>;

    /// Scan the table in order and return the first route matching `path`.
    ///
    /// Later matches for the same path are ignored.
    fn first_match(&self, path: &str) -> Option<RouteMatch> {
        self.routes().iter().find_map(|entry| {
            entry.matches(path).map(|params| RouteMatch {
                entry: entry.clone(),
                params,
            })
        })
    }
}

impl<R: RouteSource + ?Sized> RouteSource for Arc<R> {
    fn routes(&self) -> Arc<[RouteEntry]> {
        (**self).routes()
    }

    fn first_match(&self, path: &str) -> Option<RouteMatch> {
        (**self).first_match(path)
    }
}

/// An immutable, ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Arc<[RouteEntry]>,
}

impl RouteTable {
    /// Start declaring routes.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// A table without routes: nothing is restricted.
    pub fn empty() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate routes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<RouteEntry>> for RouteTable {
    fn from(entries: Vec<RouteEntry>) -> Self {
        Self {
            entries: Arc::from(entries),
        }
    }
}

impl RouteSource for RouteTable {
    fn routes(&self) -> Arc<[RouteEntry]> {
        self.entries.clone()
    }
}

/// Builder for [`RouteTable`]. Templates are compiled in [`build`].
///
/// [`build`]: RouteTableBuilder::build
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntryBuilder>,
}

impl RouteTableBuilder {
    /// Declare a public route.
    pub fn public(self, template: &str) -> Self {
        self.route(RouteEntry::builder(template).public(true))
    }

    /// Declare a private route.
    pub fn private(self, template: &str) -> Self {
        self.route(RouteEntry::builder(template).public(false))
    }

    /// Declare a fully described route.
    pub fn route(mut self, entry: RouteEntryBuilder) -> Self {
        self.entries.push(entry);
        self
    }

    /// Compile every template, keeping declaration order.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let entries = self
            .entries
            .into_iter()
            .map(RouteEntryBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTable::from(entries))
    }
}

/// A route table that the routing subsystem can swap at runtime.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct SharedRouteTable {
    inner: Arc<RwLock<RouteTable>>,
}

impl SharedRouteTable {
    /// Share an existing table.
    pub fn new(table: RouteTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Replace the whole table. Navigations already classifying keep the
    /// snapshot they started with.
    pub fn replace(&self, table: RouteTable) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = table;
    }
}

impl RouteSource for SharedRouteTable {
    fn routes(&self) -> Arc<[RouteEntry]> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .routes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::builder()
            .public("/users/new")
            .private("/users/:id")
            .build()
            .unwrap();

        let found = table.first_match("/users/new").unwrap();
        assert!(found.entry.is_public());
        assert!(found.params.is_empty());

        let found = table.first_match("/users/9").unwrap();
        assert!(!found.entry.is_public());
        assert_eq!(found.params.get("id"), Some("9"));
    }

    #[test]
    fn test_no_match() {
        let table = RouteTable::builder().public("/").build().unwrap();
        assert!(table.first_match("/elsewhere").is_none());
        assert!(RouteTable::empty().first_match("/").is_none());
    }

    #[test]
    fn test_entry_builder_carries_data() {
        let entry = RouteEntry::builder("/Admin/*rest")
            .case_insensitive(true)
            .name("admin")
            .data("layout", "wide")
            .build()
            .unwrap();
        assert!(!entry.is_public());
        assert_eq!(entry.name(), Some("admin"));
        assert_eq!(entry.data("layout"), Some("wide"));
        assert!(entry.matches("/admin/a/b").is_some());
    }

    #[test]
    fn test_shared_table_replace() {
        let shared = SharedRouteTable::new(RouteTable::builder().private("/a").build().unwrap());
        let reader = shared.clone();
        assert!(!reader.first_match("/a").unwrap().entry.is_public());

        shared.replace(RouteTable::builder().public("/a").build().unwrap());
        assert!(reader.first_match("/a").unwrap().entry.is_public());
    }
}
