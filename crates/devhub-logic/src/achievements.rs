//! Achievement evaluation. Which catalog entries a snapshot newly satisfies.
//!
//! Every entry is checked on its own against the counter its requirement
//! names, so a counter that jumps across several tiers unlocks all of them
//! in one pass:
//!
//! ```
//! use std::collections::BTreeSet;
//! use devhub_logic::achievements::evaluate_achievements;
//! use devhub_logic::catalog::Catalog;
//! use devhub_logic::snapshot::ProgressSnapshot;
//!
//! let mut s = ProgressSnapshot::new("u1");
//! s.total_resources_viewed = 60;
//! let catalog = Catalog::builtin();
//! let found = evaluate_achievements(&catalog, &s, &BTreeSet::new());
//! let ids: Vec<_> = found
//!     .iter()
//!     .map(|a| a.id.as_str())
//!     .collect();
//! assert_eq!(ids, ["views_10", "views_50"]);
//! ```

use std::collections::BTreeSet;

use crate::catalog::{AchievementDefinition, Catalog};
use crate::snapshot::ProgressSnapshot;

/// Catalog entries not in `unlocked` whose threshold the snapshot's counters
/// meet, in catalog order.
///
/// Pure: neither `snapshot` nor `unlocked` is touched.
pub fn evaluate_achievements<'c>(
    catalog: &'c Catalog,
    snapshot: &ProgressSnapshot,
    unlocked: &BTreeSet<String>,
) -> Vec<&'c AchievementDefinition> {
    catalog
        .iter()
        .filter(|def| !unlocked.contains(&def.id))
        .filter(|def| snapshot.counter(def.requirement.kind) >= def.requirement.count)
        .collect()
}

/// Total XP granted by a set of unlocks.
pub fn reward_total(unlocks: &[&AchievementDefinition]) -> u64 {
    unlocks
        .iter()
        .fold(0u64, |sum, def| sum.saturating_add(def.xp_reward))
}

/// Closest locked entry for each dimension, with how far the snapshot is from
/// it. Drives "next milestone" hints on the dashboard.
pub fn next_milestones<'c>(
    catalog: &'c Catalog,
    snapshot: &ProgressSnapshot,
) -> Vec<(&'c AchievementDefinition, u32)> {
    let mut result: Vec<(&AchievementDefinition, u32)> = Vec::new();
    for def in catalog {
        if snapshot.is_unlocked(&def.id) {
            continue;
        }
        let have = snapshot.counter(def.requirement.kind);
        let remaining = def.requirement.count.saturating_sub(have);
        match result
            .iter_mut()
            .find(|(d, _)| d.requirement.kind == def.requirement.kind)
        {
            Some(slot) if remaining < slot.1 => *slot = (def, remaining),
            Some(_) => {}
            None => result.push((def, remaining)),
        }
    }
    result
}
