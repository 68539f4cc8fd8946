//! Activity kinds reported by the hub and the XP each one earns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::ProgressSnapshot;

/// Things a user can do to a resource that earn XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Viewed,
    Completed,
    Bookmarked,
    Submitted,
    Helpful,
}

impl ActivityKind {
    /// All activity kinds in order.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Viewed,
        ActivityKind::Completed,
        ActivityKind::Bookmarked,
        ActivityKind::Submitted,
        ActivityKind::Helpful,
    ];

    /// Kinds credited at most once per (user, resource).
    ///
    /// The activity ledger is expected to filter repeats of these before the
    /// engine sees them.
    pub fn is_first_time_only(self) -> bool {
        matches!(
            self,
            ActivityKind::Viewed | ActivityKind::Completed | ActivityKind::Bookmarked
        )
    }

    /// Short phrase used in XP toasts, e.g. "+25 XP (completing a resource)".
    pub fn reason(self) -> &'static str {
        match self {
            ActivityKind::Viewed => "viewing a resource",
            ActivityKind::Completed => "completing a resource",
            ActivityKind::Bookmarked => "bookmarking a resource",
            ActivityKind::Submitted => "submitting a resource",
            ActivityKind::Helpful => "marking as helpful",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Viewed => "viewed",
            ActivityKind::Completed => "completed",
            ActivityKind::Bookmarked => "bookmarked",
            ActivityKind::Submitted => "submitted",
            ActivityKind::Helpful => "helpful",
        }
    }

    /// Bump the snapshot counter this kind feeds. Saturates at `u32::MAX`.
    pub(crate) fn increment(self, snapshot: &mut ProgressSnapshot) {
        let counter = match self {
            ActivityKind::Viewed => &mut snapshot.total_resources_viewed,
            ActivityKind::Completed => &mut snapshot.total_resources_completed,
            ActivityKind::Bookmarked => &mut snapshot.total_resources_bookmarked,
            ActivityKind::Submitted => &mut snapshot.total_resources_submitted,
            ActivityKind::Helpful => &mut snapshot.total_helpful_marked,
        };
        *counter = counter.saturating_add(1);
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub resource_id: String,
    /// When the activity happened; stamped on any badge it unlocks.
    pub at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, resource_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            resource_id: resource_id.into(),
            at,
        }
    }
}

/// Base XP per activity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    pub viewed: u64,
    pub completed: u64,
    pub bookmarked: u64,
    pub submitted: u64,
    pub helpful: u64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            viewed: 5,
            completed: 25,
            bookmarked: 10,
            submitted: 50,
            helpful: 5,
        }
    }
}

impl RewardTable {
    pub fn xp_for(&self, kind: ActivityKind) -> u64 {
        match kind {
            ActivityKind::Viewed => self.viewed,
            ActivityKind::Completed => self.completed,
            ActivityKind::Bookmarked => self.bookmarked,
            ActivityKind::Submitted => self.submitted,
            ActivityKind::Helpful => self.helpful,
        }
    }
}
