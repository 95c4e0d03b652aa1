//! # gatehouse-std
//!
//! Standard implementations for the gatehouse session guard.
//!
//! This crate provides:
//! - **Route matching**: [`PathTemplate`], [`match_path`], [`RouteTable`]
//! - **Event bus**: [`EventBus`], [`Subscriber`], channel subscriptions
//! - **Host surfaces**: [`TracingNotifier`], [`MemoryNavigator`]
//! - **Testing**: scripted services and recorders in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use gatehouse_core;

// Modules
pub mod bus;
pub mod location;
pub mod notify;
pub mod routing;
pub mod testing;

pub use bus::{ChannelSubscriber, EnabledHandle, EventBus, Subscriber, Subscription};
pub use location::MemoryNavigator;
pub use notify::TracingNotifier;
pub use routing::{
    MatchOptions, Params, PathTemplate, RouteEntry, RouteEntryBuilder, RouteMatch, RouteSource,
    RouteTable, RouteTableBuilder, SharedRouteTable, match_path,
};
