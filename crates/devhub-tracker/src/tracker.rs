//! Per-user progress tracking over the engine and its collaborators.
//!
//! Each call loads the user's snapshot (creating it on first contact), hands
//! it to [`ProgressEngine`], saves the returned snapshot and delivers its
//! notices. Nothing is re-read after a save: the engine's outcome already is
//! the new state.
//!
//! The tracker takes `&mut self` and does no locking. Callers must not run
//! two calls for the same user concurrently.

use chrono::{DateTime, NaiveDate, Utc};
use devhub_logic::activity::{ActivityEvent, ActivityKind};
use devhub_logic::config::EngineConfig;
use devhub_logic::level::{progress_fraction, xp_threshold_for_level};
use devhub_logic::notices::Notice;
use devhub_logic::progress::{ActivityOutcome, ProgressEngine, StreakOutcome, XpAward};
use devhub_logic::snapshot::ProgressSnapshot;
use serde::Serialize;

use crate::collaborators::{ActivityLedger, LedgerEntry, NotificationSink, SnapshotStore};
use crate::error::Result;

/// Result of [`ProgressTracker::track_activity`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// The activity earned XP; the outcome has been saved.
    Credited(ActivityOutcome),
    /// A first-time-only activity the ledger had already credited.
    AlreadyCredited,
}

impl TrackOutcome {
    pub fn credited(&self) -> Option<&ActivityOutcome> {
        match self {
            TrackOutcome::Credited(outcome) => Some(outcome),
            TrackOutcome::AlreadyCredited => None,
        }
    }
}

/// Dashboard figures for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub user_id: String,
    pub level: u32,
    pub xp: u64,
    pub next_level_xp: u64,
    /// 0.0–100.0
    pub progress_percent: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub badge_count: usize,
}

impl ProgressView {
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        let s = snapshot.normalized();
        Self {
            user_id: s.user_id.clone(),
            level: s.level,
            xp: s.xp,
            next_level_xp: xp_threshold_for_level(s.level),
            progress_percent: progress_fraction(s.xp, s.level),
            current_streak: s.current_streak,
            longest_streak: s.longest_streak,
            badge_count: s.badges.len(),
        }
    }
}

pub struct ProgressTracker<S, L, N> {
    engine: ProgressEngine,
    store: S,
    ledger: L,
    sink: N,
}

impl<S, L, N> ProgressTracker<S, L, N>
where
    S: SnapshotStore,
    L: ActivityLedger,
    N: NotificationSink,
{
    pub fn new(engine: ProgressEngine, store: S, ledger: L, sink: N) -> Self {
        Self {
            engine,
            store,
            ledger,
            sink,
        }
    }

    pub fn from_config(config: &EngineConfig, store: S, ledger: L, sink: N) -> Result<Self> {
        let engine = ProgressEngine::from_config(config)?;
        Ok(Self::new(engine, store, ledger, sink))
    }

    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    /// Current snapshot for `user_id`, or a fresh one if none is stored.
    pub fn snapshot(&mut self, user_id: &str) -> Result<ProgressSnapshot> {
        let snapshot = self
            .store
            .load(user_id)?
            .unwrap_or_else(|| ProgressSnapshot::new(user_id));
        Ok(snapshot)
    }

    pub fn progress(&mut self, user_id: &str) -> Result<ProgressView> {
        Ok(ProgressView::from_snapshot(&self.snapshot(user_id)?))
    }

    /// Credit `kind` on `resource_id` for `user_id`.
    ///
    /// First-time-only kinds the ledger already holds are skipped without
    /// touching the store. The ledger entry is written before the snapshot
    /// and withdrawn again if the save fails, so an `Err` leaves neither
    /// changed and the call can be retried.
    pub fn track_activity(
        &mut self,
        user_id: &str,
        resource_id: &str,
        kind: ActivityKind,
        at: DateTime<Utc>,
    ) -> Result<TrackOutcome> {
        if kind.is_first_time_only() && self.ledger.already_credited(user_id, resource_id, kind)? {
            log::debug!(
                "Skipping repeat {} of {} by {}: already credited",
                kind,
                resource_id,
                user_id
            );
            return Ok(TrackOutcome::AlreadyCredited);
        }

        let snapshot = self.snapshot(user_id)?;
        let event = ActivityEvent::new(kind, resource_id, at);
        let outcome = self.engine.report_activity(&event, &snapshot);

        let entry = LedgerEntry {
            user_id: user_id.to_string(),
            resource_id: resource_id.to_string(),
            kind,
            at,
        };
        self.ledger.record(entry.clone())?;
        if let Err(e) = self.store.save(&outcome.snapshot) {
            if let Err(undo) = self.ledger.forget(&entry) {
                log::error!(
                    "Could not withdraw ledger entry for {} {} {}: {}",
                    user_id,
                    kind,
                    resource_id,
                    undo
                );
            }
            return Err(e);
        }

        log::debug!(
            "{} {} {}: +{} XP ({}), total {}",
            user_id,
            kind,
            resource_id,
            outcome.xp_awarded,
            kind.reason(),
            outcome.snapshot.xp
        );
        self.announce(user_id, &outcome.notices());
        Ok(TrackOutcome::Credited(outcome))
    }

    /// Credit a daily visit on `today`.
    pub fn visit(&mut self, user_id: &str, today: NaiveDate) -> Result<StreakOutcome> {
        let snapshot = self.snapshot(user_id)?;
        let outcome = self.engine.check_in(&snapshot, today);
        if !outcome.counted {
            return Ok(outcome);
        }
        self.store.save(&outcome.snapshot)?;

        if outcome.streak_broken {
            log::info!(
                "{} streak reset after {} days",
                user_id,
                snapshot.current_streak
            );
        }
        log::debug!(
            "{} visited {}: streak {} (longest {})",
            user_id,
            today,
            outcome.snapshot.current_streak,
            outcome.snapshot.longest_streak
        );
        self.announce(user_id, &outcome.notices());
        Ok(outcome)
    }

    /// Grant bonus XP outside the activity table.
    pub fn award_bonus(&mut self, user_id: &str, amount: u64, reason: &str) -> Result<XpAward> {
        let snapshot = self.snapshot(user_id)?;
        let award = self.engine.award_xp(&snapshot, amount);
        self.store.save(&award.snapshot)?;
        log::debug!("{}: +{} XP ({})", user_id, amount, reason);
        if award.leveled_up() {
            let notice = Notice::LevelUp {
                level: award.snapshot.level,
            };
            self.announce(user_id, &[notice]);
        }
        Ok(award)
    }

    /// Deliver notices. A failed delivery is logged and does not undo the
    /// saved update.
    fn announce(&mut self, user_id: &str, notices: &[Notice]) {
        for notice in notices {
            match notice {
                Notice::LevelUp { level } => log::info!("{} reached level {}", user_id, level),
                Notice::AchievementUnlocked { id, .. } => {
                    log::info!("{} unlocked achievement {}", user_id, id)
                }
                Notice::StreakMilestone { days } => {
                    log::info!("{} hit a {}-day streak", user_id, days)
                }
            }
            if let Err(e) = self.sink.deliver(user_id, notice) {
                log::warn!("Failed to deliver notice to {}: {}", user_id, e);
            }
        }
    }
}
