//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//!     → shared via Arc with the reconciler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a new reconciler
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ControllerConfig;
pub use schema::ControllerSettings;
pub use schema::ObservabilityConfig;
pub use schema::ProxySettings;
