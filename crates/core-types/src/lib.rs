//! # Dashboard Core Types
//!
//! The shared vocabulary of the dashboard: the raw `PriceRecord` loaded from the
//! store, the `Month` bucket used by the monthly view, and the static
//! ticker-to-sector lookup.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate depends on nothing else in the workspace. Every other
//!   crate speaks in these types.
//! - **Immutable Inputs:** A `PriceRecord` is never modified after loading. All
//!   derived values live in the `analytics` crate.

pub mod error;
pub mod sector;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use sector::{UNKNOWN_SECTOR, sector_for};
pub use structs::{Month, PriceRecord};
