//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! template file ──→ ConfigRenderer::new (compile once, helpers registered)
//!                          │
//! GlobalConfig ────────────┴→ render() → Vec<u8> document
//! ```
//!
//! # Design Decisions
//! - Helpers are plain functions (`functions.rs`), adapted to the engine in
//!   `template.rs`
//! - Compilation errors are fatal; execution errors are returned and the
//!   caller keeps its previous document
//! - The renderer is a projection; it validates nothing

pub mod functions;
pub mod size;
pub mod template;

pub use size::{size_suffix_to_int64, InvalidSize};
pub use template::{ConfigRenderer, RenderError, HELPERS, HELPERS_VERSION};
