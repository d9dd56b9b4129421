//! Backend slot allocation subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint source (per cycle): backend name → endpoint set
//!     → store.rs (look up / create the backend's slot table, lock it)
//!     → slots.rs (keep bindings, release vanished, fill new, grow pool)
//!     → BackendView (stable ordered server list) for the renderer
//! ```
//!
//! # Design Decisions
//! - Slot names persist across cycles to keep rendered documents stable
//! - Pools only grow, in fixed increments
//! - One in-flight reconciliation per backend; backends are independent

pub mod endpoint;
pub mod slots;
pub mod store;

pub use endpoint::BackendEndpoint;
pub use slots::{BackendServer, BackendSlot, BackendSlotTable, BackendView, SlotDelta};
pub use store::SlotStore;
