//! Dev Resources Hub progress tracker.
//!
//! Drives [`devhub_logic::ProgressEngine`] against the hub's collaborators:
//! a snapshot store, an activity ledger that refuses double credit, and a
//! notification sink. Those collaborators are traits; the hosted backend
//! supplies real implementations and [`memory`] supplies in-process ones.

pub mod collaborators;
pub mod error;
pub mod memory;
pub mod tracker;

pub use collaborators::{ActivityLedger, LedgerEntry, NotificationSink, SnapshotStore};
pub use error::{Result, TrackerError};
pub use tracker::{ProgressTracker, ProgressView, TrackOutcome};
