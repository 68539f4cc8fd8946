//! Progress aggregation. Applies activity and visit events to a snapshot.
//!
//! [`ProgressEngine`] is a stateless calculator over an immutable catalog and
//! reward table. Each call takes the latest snapshot and returns the fully
//! updated one together with the deltas the caller must persist and announce.
//!
//! Callers must serialize calls per user (for example with a transactional
//! read-modify-write of the stored snapshot). Two calls computed from the
//! same stale snapshot will each return a result missing the other's
//! increment.
//!
//! ```
//! use chrono::Utc;
//! use devhub_logic::activity::{ActivityEvent, ActivityKind};
//! use devhub_logic::progress::ProgressEngine;
//! use devhub_logic::snapshot::ProgressSnapshot;
//!
//! let engine = ProgressEngine::default();
//! let event = ActivityEvent::new(ActivityKind::Submitted, "res-1", Utc::now());
//! let outcome = engine.report_activity(&event, &ProgressSnapshot::new("u1"));
//! assert_eq!(outcome.xp_awarded, 150);
//! assert_eq!(outcome.snapshot.level, 2);
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{evaluate_achievements, reward_total};
use crate::activity::{ActivityEvent, RewardTable};
use crate::catalog::{AchievementDefinition, Catalog, CatalogError};
use crate::config::EngineConfig;
use crate::level::level_for_xp;
use crate::notices::{is_streak_milestone, Notice};
use crate::snapshot::{Badge, ProgressSnapshot};
use crate::streak::{advance_streak, start_of_day};

/// Result of [`ProgressEngine::report_activity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityOutcome {
    pub snapshot: ProgressSnapshot,
    /// Base reward plus every unlocked achievement's reward.
    pub xp_awarded: u64,
    /// Base reward for the activity alone.
    pub base_xp: u64,
    /// Achievements unlocked by this event, in catalog order.
    pub newly_unlocked: Vec<AchievementDefinition>,
    /// Level derived from the incoming snapshot's XP.
    pub previous_level: u32,
}

impl ActivityOutcome {
    pub fn leveled_up(&self) -> bool {
        self.snapshot.level > self.previous_level
    }

    /// Level-up first, then unlocks in catalog order.
    pub fn notices(&self) -> Vec<Notice> {
        collect_notices(self.leveled_up(), &self.snapshot, &self.newly_unlocked, None)
    }
}

/// Result of [`ProgressEngine::report_streak_checkpoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakOutcome {
    pub snapshot: ProgressSnapshot,
    /// A streak existed and this visit did not continue it.
    pub streak_broken: bool,
    /// False when today had already been counted; the snapshot is then unchanged.
    pub counted: bool,
    /// Streak achievements unlocked by this visit.
    pub newly_unlocked: Vec<AchievementDefinition>,
    pub xp_awarded: u64,
    pub previous_level: u32,
}

impl StreakOutcome {
    pub fn leveled_up(&self) -> bool {
        self.snapshot.level > self.previous_level
    }

    /// Streak length worth celebrating, if this visit reached one.
    pub fn milestone(&self) -> Option<u32> {
        let days = self.snapshot.current_streak;
        (self.counted && is_streak_milestone(days)).then_some(days)
    }

    /// Level-up, then unlocks, then the streak cheer.
    pub fn notices(&self) -> Vec<Notice> {
        collect_notices(
            self.leveled_up(),
            &self.snapshot,
            &self.newly_unlocked,
            self.milestone(),
        )
    }
}

/// Result of [`ProgressEngine::award_xp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpAward {
    pub snapshot: ProgressSnapshot,
    pub xp_awarded: u64,
    pub previous_level: u32,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.snapshot.level > self.previous_level
    }
}

fn collect_notices(
    leveled_up: bool,
    snapshot: &ProgressSnapshot,
    unlocked: &[AchievementDefinition],
    streak_days: Option<u32>,
) -> Vec<Notice> {
    let mut notices = Vec::with_capacity(unlocked.len() + 2);
    if leveled_up {
        notices.push(Notice::LevelUp {
            level: snapshot.level,
        });
    }
    notices.extend(unlocked.iter().map(Notice::unlocked));
    if let Some(days) = streak_days {
        notices.push(Notice::StreakMilestone { days });
    }
    notices
}

/// Stateless progress calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEngine {
    catalog: Catalog,
    rewards: RewardTable,
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new(Catalog::builtin(), RewardTable::default())
    }
}

impl ProgressEngine {
    pub fn new(catalog: Catalog, rewards: RewardTable) -> Self {
        Self { catalog, rewards }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(config.catalog()?, config.rewards))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    /// Catalog entries `snapshot` newly satisfies given `unlocked`.
    pub fn evaluate<'a>(
        &'a self,
        snapshot: &ProgressSnapshot,
        unlocked: &BTreeSet<String>,
    ) -> Vec<&'a AchievementDefinition> {
        evaluate_achievements(&self.catalog, snapshot, unlocked)
    }

    /// Credit one activity.
    ///
    /// Bumps the matching counter, adds the base reward, then unlocks every
    /// achievement the new counters satisfy and adds their rewards. The level
    /// is re-derived from the final XP. The caller guarantees first-time-only
    /// kinds are not reported twice for the same resource.
    pub fn report_activity(
        &self,
        event: &ActivityEvent,
        snapshot: &ProgressSnapshot,
    ) -> ActivityOutcome {
        let mut next = snapshot.normalized();
        let previous_level = next.level;

        event.kind.increment(&mut next);
        let base_xp = self.rewards.xp_for(event.kind);
        add_xp(&mut next, base_xp);

        let (newly_unlocked, bonus) = self.unlock(&mut next, event.at);

        ActivityOutcome {
            snapshot: next,
            xp_awarded: base_xp.saturating_add(bonus),
            base_xp,
            newly_unlocked,
            previous_level,
        }
    }

    /// Credit a daily visit on `today`, given the day the streak was last
    /// credited.
    ///
    /// Same day: no-op. The day after: streak + 1. Anything else: streak
    /// resets to 1. Streak achievements are then evaluated; their badges are
    /// stamped at the start of `today`.
    pub fn report_streak_checkpoint(
        &self,
        snapshot: &ProgressSnapshot,
        today: NaiveDate,
        last_visit: Option<NaiveDate>,
    ) -> StreakOutcome {
        let mut next = snapshot.normalized();
        let previous_level = next.level;

        let step = advance_streak(next.current_streak, next.longest_streak, today, last_visit);
        if !step.counted {
            return StreakOutcome {
                snapshot: next,
                streak_broken: false,
                counted: false,
                newly_unlocked: Vec::new(),
                xp_awarded: 0,
                previous_level,
            };
        }

        next.current_streak = step.current;
        next.longest_streak = step.longest;
        next.last_visit_date = Some(today);

        let (newly_unlocked, xp_awarded) = self.unlock(&mut next, start_of_day(today));

        StreakOutcome {
            snapshot: next,
            streak_broken: step.broken,
            counted: true,
            newly_unlocked,
            xp_awarded,
            previous_level,
        }
    }

    /// [`report_streak_checkpoint`](Self::report_streak_checkpoint) using the
    /// snapshot's own last visit date.
    pub fn check_in(&self, snapshot: &ProgressSnapshot, today: NaiveDate) -> StreakOutcome {
        self.report_streak_checkpoint(snapshot, today, snapshot.last_visit_date)
    }

    /// Grant `amount` bonus XP outside the activity table. Does not evaluate
    /// achievements; no achievement is measured in XP.
    pub fn award_xp(&self, snapshot: &ProgressSnapshot, amount: u64) -> XpAward {
        let mut next = snapshot.normalized();
        let previous_level = next.level;
        add_xp(&mut next, amount);
        XpAward {
            snapshot: next,
            xp_awarded: amount,
            previous_level,
        }
    }

    /// Record every newly satisfied achievement on `snapshot` and add their
    /// rewards. Returns the unlocks and the XP they granted.
    fn unlock(
        &self,
        snapshot: &mut ProgressSnapshot,
        at: DateTime<Utc>,
    ) -> (Vec<AchievementDefinition>, u64) {
        let found = evaluate_achievements(&self.catalog, snapshot, &snapshot.achievements);
        if found.is_empty() {
            return (Vec::new(), 0);
        }
        let bonus = reward_total(&found);
        let unlocked: Vec<AchievementDefinition> = found.into_iter().cloned().collect();

        for def in &unlocked {
            snapshot.achievements.insert(def.id.clone());
            snapshot.badges.push(Badge::from_definition(def, at));
        }
        add_xp(snapshot, bonus);
        (unlocked, bonus)
    }
}

fn add_xp(snapshot: &mut ProgressSnapshot, amount: u64) {
    snapshot.xp = snapshot.xp.saturating_add(amount);
    snapshot.level = level_for_xp(snapshot.xp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityKind;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn event(kind: ActivityKind) -> ActivityEvent {
        ActivityEvent::new(kind, "res-1", at())
    }

    fn day(s: &str) -> NaiveDate {
        crate::streak::parse_visit_date(s).expect("date")
    }

    #[test]
    fn first_completion() {
        let engine = ProgressEngine::default();
        let out = engine.report_activity(&event(ActivityKind::Completed), &ProgressSnapshot::new("u1"));
        assert_eq!(out.snapshot.total_resources_completed, 1);
        assert_eq!(out.snapshot.xp, 25);
        assert_eq!(out.xp_awarded, 25);
        assert_eq!(out.snapshot.level, 1);
        assert!(out.newly_unlocked.is_empty());
        assert!(!out.leveled_up());
        assert!(out.notices().is_empty());
    }

    #[test]
    fn first_submission_unlocks_contributor() {
        let engine = ProgressEngine::default();
        let out = engine.report_activity(&event(ActivityKind::Submitted), &ProgressSnapshot::new("u1"));
        assert_eq!(out.snapshot.total_resources_submitted, 1);
        assert_eq!(out.base_xp, 50);
        assert_eq!(out.xp_awarded, 150);
        assert_eq!(out.snapshot.xp, 150);
        assert_eq!(out.snapshot.level, level_for_xp(150));
        assert_eq!(out.snapshot.level, 2);
        let ids: Vec<_> = out.newly_unlocked.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["submit_1"]);
        assert!(out.snapshot.is_unlocked("submit_1"));
        assert_eq!(out.snapshot.badges.len(), 1);
        assert_eq!(out.snapshot.badges[0].unlocked_at, at());
        assert!(out.leveled_up());
        assert_eq!(
            out.notices(),
            vec![
                Notice::LevelUp { level: 2 },
                Notice::unlocked(engine.catalog().get("submit_1").expect("submit_1")),
            ]
        );
    }

    #[test]
    fn unlocked_achievement_not_granted_twice() {
        let engine = ProgressEngine::default();
        let first = engine.report_activity(&event(ActivityKind::Submitted), &ProgressSnapshot::new("u1"));
        let second = engine.report_activity(&event(ActivityKind::Submitted), &first.snapshot);
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(second.xp_awarded, 50);
        assert_eq!(second.snapshot.xp, 200);
        assert_eq!(second.snapshot.badges.len(), 1);
    }

    #[test]
    fn tenth_view_unlocks_curious_mind() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.total_resources_viewed = 9;
        s.xp = 45;
        let out = engine.report_activity(&event(ActivityKind::Viewed), &s);
        assert_eq!(out.snapshot.total_resources_viewed, 10);
        assert_eq!(out.xp_awarded, 5 + 25);
        assert_eq!(out.snapshot.xp, 75);
    }

    #[test]
    fn drifted_level_is_corrected_without_level_up_notice() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.xp = 30;
        s.level = 7;
        let out = engine.report_activity(&event(ActivityKind::Viewed), &s);
        assert_eq!(out.previous_level, 1);
        assert_eq!(out.snapshot.level, 1);
        assert!(!out.leveled_up());
    }

    #[test]
    fn previously_unlocked_but_unmet_counters_keep_unlock() {
        // Drifted data: unlock recorded although the counter was reset.
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.achievements.insert("views_10".into());
        let out = engine.report_activity(&event(ActivityKind::Viewed), &s);
        assert!(out.snapshot.is_unlocked("views_10"));
        assert!(out.newly_unlocked.is_empty());
    }

    #[test]
    fn custom_rewards() {
        let rewards = RewardTable {
            helpful: 12,
            ..RewardTable::default()
        };
        let engine = ProgressEngine::new(Catalog::builtin(), rewards);
        let out = engine.report_activity(&event(ActivityKind::Helpful), &ProgressSnapshot::new("u1"));
        assert_eq!(out.snapshot.total_helpful_marked, 1);
        assert_eq!(out.xp_awarded, 12);
    }

    #[test]
    fn streak_yesterday_increments() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.current_streak = 1;
        s.longest_streak = 1;
        let out = engine.report_streak_checkpoint(&s, day("2025-06-02"), Some(day("2025-06-01")));
        assert_eq!(out.snapshot.current_streak, 2);
        assert_eq!(out.snapshot.longest_streak, 2);
        assert_eq!(out.snapshot.last_visit_date, Some(day("2025-06-02")));
        assert!(!out.streak_broken);
        assert!(out.counted);
    }

    #[test]
    fn streak_same_day_twice_is_noop() {
        let engine = ProgressEngine::default();
        let s = ProgressSnapshot::new("u1");
        let first = engine.check_in(&s, day("2025-06-02"));
        let second = engine.check_in(&first.snapshot, day("2025-06-02"));
        assert!(!second.counted);
        assert_eq!(second.snapshot, first.snapshot);
        assert_eq!(second.xp_awarded, 0);
    }

    #[test]
    fn streak_gap_resets() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.current_streak = 6;
        s.longest_streak = 6;
        let out = engine.report_streak_checkpoint(&s, day("2025-06-10"), Some(day("2025-06-07")));
        assert_eq!(out.snapshot.current_streak, 1);
        assert_eq!(out.snapshot.longest_streak, 6);
        assert!(out.streak_broken);
    }

    #[test]
    fn third_day_unlocks_streak_achievement_and_cheers() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        s.current_streak = 2;
        s.longest_streak = 2;
        s.last_visit_date = Some(day("2025-06-01"));
        let out = engine.check_in(&s, day("2025-06-02"));
        assert_eq!(out.snapshot.current_streak, 3);
        let ids: Vec<_> = out.newly_unlocked.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["streak_3"]);
        assert_eq!(out.xp_awarded, 50);
        assert_eq!(out.snapshot.xp, 50);
        assert_eq!(out.milestone(), Some(3));
        assert_eq!(out.snapshot.badges[0].unlocked_at, start_of_day(day("2025-06-02")));
        let notices = out.notices();
        assert_eq!(notices.len(), 2);
        assert!(matches!(&notices[0], Notice::AchievementUnlocked { id, .. } if id == "streak_3"));
        assert_eq!(notices[1], Notice::StreakMilestone { days: 3 });
    }

    #[test]
    fn award_xp_recomputes_level() {
        let engine = ProgressEngine::default();
        let out = engine.award_xp(&ProgressSnapshot::new("u1"), 400);
        assert_eq!(out.snapshot.xp, 400);
        assert_eq!(out.snapshot.level, 3);
        assert!(out.leveled_up());
    }

    #[test]
    fn xp_never_decreases_across_events() {
        let engine = ProgressEngine::default();
        let mut s = ProgressSnapshot::new("u1");
        let mut last_xp = 0;
        for i in 0..300u32 {
            let kind = ActivityKind::ALL[(i % 5) as usize];
            s = engine.report_activity(&event(kind), &s).snapshot;
            assert!(s.xp >= last_xp);
            assert_eq!(s.level, level_for_xp(s.xp));
            last_xp = s.xp;
        }
        assert_eq!(s.achievements.len(), s.badges.len());
    }
}
