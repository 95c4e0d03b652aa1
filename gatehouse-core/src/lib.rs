//! # gatehouse-core
//!
//! Core types for the gatehouse session guard.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! service implementations (HTTP clients, fakes) that do not need the full
//! guard.
//!
//! # Contents
//!
//! - [`User`], [`Credentials`], [`PasswordReset`] - the data exchanged with
//!   the identity back-ends
//! - [`SessionEvent`] - the closed set of lifecycle notifications
//! - [`SessionService`], [`AccountService`] - the identity back-ends
//! - [`Navigator`], [`Notifier`] - host-application surfaces
//!
//! # Error Types
//!
//! - [`GatehouseError`] - Top-level error type
//! - [`ConfigError`] - Setup errors
//! - [`HandlerError`] - Rejected handler overrides
//! - [`AuthError`] - Failed authentication workflows
//! - [`ServiceError`] - Back-end failures
//! - [`RouteError`] - Invalid route templates

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod navigator;
mod service;
mod user;

// Re-exports
pub use error::{
    AuthError, BoxError, ConfigError, GatehouseError, HandlerError, RouteError, ServiceError,
    ServiceKind,
};
pub use event::{SessionEvent, SignUpFailure};
pub use navigator::{Navigator, Notifier};
pub use service::{AccountService, SessionService, identified};
pub use user::{Credentials, PasswordReset, User, UserBuilder};

// Service implementors need the same attribute macro.
pub use async_trait::async_trait;
