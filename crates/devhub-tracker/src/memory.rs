//! In-memory collaborators for tests and the headless harness.

use std::collections::{HashMap, HashSet};

use devhub_logic::activity::ActivityKind;
use devhub_logic::notices::Notice;
use devhub_logic::snapshot::ProgressSnapshot;

use crate::collaborators::{ActivityLedger, LedgerEntry, NotificationSink, SnapshotStore};
use crate::error::Result;

/// Snapshots keyed by user id.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshots: HashMap<String, ProgressSnapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&ProgressSnapshot> {
        self.snapshots.get(user_id)
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn insert(&mut self, snapshot: ProgressSnapshot) {
        self.snapshots.insert(snapshot.user_id.clone(), snapshot);
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self, user_id: &str) -> Result<Option<ProgressSnapshot>> {
        Ok(self.snapshots.get(user_id).cloned())
    }

    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.saves += 1;
        self.insert(snapshot.clone());
        Ok(())
    }
}

/// Append-only ledger with a (user, resource, kind) index.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
    credited: HashSet<(String, String, ActivityKind)>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entries_for<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries.iter().filter(move |e| e.user_id == user_id)
    }
}

impl ActivityLedger for MemoryLedger {
    fn already_credited(
        &self,
        user_id: &str,
        resource_id: &str,
        kind: ActivityKind,
    ) -> Result<bool> {
        Ok(self
            .credited
            .contains(&(user_id.to_string(), resource_id.to_string(), kind)))
    }

    fn record(&mut self, entry: LedgerEntry) -> Result<()> {
        self.credited.insert((
            entry.user_id.clone(),
            entry.resource_id.clone(),
            entry.kind,
        ));
        self.entries.push(entry);
        Ok(())
    }

    fn forget(&mut self, entry: &LedgerEntry) -> Result<()> {
        if let Some(pos) = self.entries.iter().rposition(|e| e == entry) {
            self.entries.remove(pos);
        }
        let still_credited = self.entries.iter().any(|e| {
            e.user_id == entry.user_id && e.resource_id == entry.resource_id && e.kind == entry.kind
        });
        if !still_credited {
            self.credited.remove(&(
                entry.user_id.clone(),
                entry.resource_id.clone(),
                entry.kind,
            ));
        }
        Ok(())
    }
}

/// Keeps every delivered notice in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    delivered: Vec<(String, Notice)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> &[(String, Notice)] {
        &self.delivered
    }

    pub fn messages_for(&self, user_id: &str) -> Vec<String> {
        self.delivered
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, n)| n.message())
            .collect()
    }

    pub fn clear(&mut self) {
        self.delivered.clear();
    }
}

impl NotificationSink for CollectingSink {
    fn deliver(&mut self, user_id: &str, notice: &Notice) -> Result<()> {
        self.delivered.push((user_id.to_string(), notice.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load("u1").expect("load").is_none());
        let mut s = ProgressSnapshot::new("u1");
        s.xp = 42;
        store.save(&s).expect("save");
        assert_eq!(store.load("u1").expect("load"), Some(s));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn ledger_indexes_by_kind() {
        let mut ledger = MemoryLedger::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ledger
            .record(LedgerEntry {
                user_id: "u1".into(),
                resource_id: "r1".into(),
                kind: ActivityKind::Viewed,
                at,
            })
            .expect("record");
        assert!(ledger.already_credited("u1", "r1", ActivityKind::Viewed).expect("check"));
        assert!(!ledger.already_credited("u1", "r1", ActivityKind::Completed).expect("check"));
        assert!(!ledger.already_credited("u2", "r1", ActivityKind::Viewed).expect("check"));
        assert_eq!(ledger.entries_for("u1").count(), 1);
    }

    #[test]
    fn forget_withdraws_only_the_given_entry() {
        let mut ledger = MemoryLedger::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = |kind| LedgerEntry {
            user_id: "u1".into(),
            resource_id: "r1".into(),
            kind,
            at,
        };
        ledger.record(entry(ActivityKind::Helpful)).expect("record");
        ledger.record(entry(ActivityKind::Helpful)).expect("record");
        ledger.record(entry(ActivityKind::Viewed)).expect("record");

        ledger.forget(&entry(ActivityKind::Helpful)).expect("forget");
        assert_eq!(ledger.entries().len(), 2);
        assert!(ledger.already_credited("u1", "r1", ActivityKind::Helpful).expect("check"));

        ledger.forget(&entry(ActivityKind::Viewed)).expect("forget");
        assert!(!ledger.already_credited("u1", "r1", ActivityKind::Viewed).expect("check"));
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn sink_filters_by_user() {
        let mut sink = CollectingSink::new();
        sink.deliver("u1", &Notice::LevelUp { level: 2 }).expect("deliver");
        sink.deliver("u2", &Notice::LevelUp { level: 5 }).expect("deliver");
        assert_eq!(
            sink.messages_for("u1"),
            vec!["Congratulations! You've reached level 2!".to_string()]
        );
        sink.clear();
        assert!(sink.delivered().is_empty());
    }
}
