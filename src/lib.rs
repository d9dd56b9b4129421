//! Ingress configuration synthesis library.
//!
//! Turns routing resources, their annotations and backend endpoint sets into
//! a rendered proxy configuration document.

// Core subsystems
pub mod annotations;
pub mod backend;
pub mod render;
pub mod resolver;

// Model and orchestration
pub mod controller;
pub mod model;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::ControllerConfig;
pub use controller::{ClusterSnapshot, Reconciler};
pub use model::GlobalConfig;
pub use render::ConfigRenderer;
