//! Audit trail aggregate
//!
//! Append-only log of security-relevant account actions.

pub mod model;
pub mod repository;

pub use model::{ActivityLogEntry, ActivityLogFilter, NewActivityLog};
pub use repository::ActivityLogRepositoryInterface;
