//! Controller subsystem.
//!
//! # Data Flow
//! ```text
//! ClusterSnapshot (routes + endpoints)
//!     → AnnotationExtractor::extract_all (concurrent per route)
//!     → builder::build_model (hosts, locations, SlotStore reconcile)
//!     → unchanged? keep previous document
//!     → ConfigRenderer::render
//!     → ArcSwapOption<RenderedConfig> (last good document)
//! ```
//!
//! # Design Decisions
//! - Slot tables live in the reconciler for the controller's lifetime
//! - A failed render never replaces the published document
//! - Readers load the current document without blocking a running cycle

pub mod builder;
pub mod reconciler;
pub mod snapshot;

pub use builder::build_model;
pub use reconciler::{CycleReport, ReconcileError, Reconciler, RenderedConfig};
pub use snapshot::{ClusterSnapshot, SnapshotError};
