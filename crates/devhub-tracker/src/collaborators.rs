//! Seams to the services the tracker drives.
//!
//! Implementations live in the surrounding application (document database,
//! notification feed). [`crate::memory`] provides in-process versions.

use chrono::{DateTime, Utc};
use devhub_logic::activity::ActivityKind;
use devhub_logic::notices::Notice;
use devhub_logic::snapshot::ProgressSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Loads and saves progress snapshots by user id.
///
/// Callers of the tracker serialize calls per user; a store backed by a
/// transactional database should additionally make `save` conditional on the
/// snapshot loaded by the same call.
pub trait SnapshotStore {
    fn load(&mut self, user_id: &str) -> Result<Option<ProgressSnapshot>>;
    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<()>;
}

/// One credited activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub user_id: String,
    pub resource_id: String,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}

/// Record of credited activities, used to refuse double credit for
/// first-time-only kinds.
pub trait ActivityLedger {
    fn already_credited(&self, user_id: &str, resource_id: &str, kind: ActivityKind)
        -> Result<bool>;
    fn record(&mut self, entry: LedgerEntry) -> Result<()>;
    /// Withdraw an entry whose credit could not be saved.
    fn forget(&mut self, entry: &LedgerEntry) -> Result<()>;
}

/// Surfaces notices to a user.
pub trait NotificationSink {
    fn deliver(&mut self, user_id: &str, notice: &Notice) -> Result<()>;
}
