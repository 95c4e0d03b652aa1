//! # Route Matching
//!
//! This module provides the pieces the navigation guard uses to classify a
//! destination:
//!
//! - **Templates**: [`PathTemplate`] compiles `/users/:id` or `/files/*rest`
//!   into an anchored matcher; [`match_path`] does it in one step.
//! - **Tables**: [`RouteTable`] and [`SharedRouteTable`] hold the ordered
//!   route declarations, read through [`RouteSource`].
//!
//! # Choosing a Table
//!
//! | Table | Use Case |
//! |-------|----------|
//! | `RouteTable` | Routes fixed at startup |
//! | `SharedRouteTable` | Routes replaced at runtime (lazy-loaded modules) |

pub mod table;
pub mod template;

pub use table::{
    RouteEntry, RouteEntryBuilder, RouteMatch, RouteSource, RouteTable, RouteTableBuilder,
    SharedRouteTable,
};
pub use template::{MatchOptions, Params, PathTemplate, match_path};
