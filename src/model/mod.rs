//! Typed configuration model.
//!
//! # Data Flow
//! ```text
//! Route (watcher input) ──┐
//! RouteExtensions ────────┼→ controller::builder → GlobalConfig → render
//! BackendView (slots) ────┘
//! ```
//!
//! # Design Decisions
//! - A fresh `GlobalConfig` is built every cycle; rendering only reads it
//! - Field names are the template contract, so everything serializes

pub mod config;
pub mod route;

pub use config::{GlobalConfig, HostRecord, LocationRecord};
pub use route::{Route, RoutePath, RouteRule};
