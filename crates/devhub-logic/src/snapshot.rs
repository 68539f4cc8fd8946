//! Per-user progress snapshot. The record every engine operation consumes
//! and returns.
//!
//! Snapshots are persisted outside this crate, often by code that predates
//! the current rules, so deserialization is forgiving: missing fields take
//! their defaults, negative or non-finite numbers clamp to zero, `null`
//! lists read as empty, duplicate achievement ids collapse, and an empty or
//! malformed `lastVisitDate` reads as "never visited".

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{AchievementDefinition, RequirementKind};
use crate::level::{level_for_xp, MIN_LEVEL};

/// Unlock record shown on a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl Badge {
    /// Badge for `def` unlocked at `at`.
    pub fn from_definition(def: &AchievementDefinition, at: DateTime<Utc>) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
            unlocked_at: at,
        }
    }
}

/// Aggregate progress for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSnapshot {
    pub user_id: String,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub xp: u64,
    /// Cached level; always re-derived from `xp` by engine operations.
    #[serde(deserialize_with = "lenient::level")]
    pub level: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub current_streak: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub longest_streak: u32,
    #[serde(with = "lenient::visit_date")]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_resources_viewed: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_resources_completed: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_resources_bookmarked: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_resources_submitted: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_helpful_marked: u32,
    /// Maintained by the hub's contribution flow; engine operations carry it
    /// through unchanged.
    #[serde(deserialize_with = "lenient::count_u32")]
    pub total_contributions: u32,
    /// Unlocked achievement ids.
    #[serde(deserialize_with = "lenient::or_empty")]
    pub achievements: BTreeSet<String>,
    #[serde(deserialize_with = "lenient::or_empty")]
    pub badges: Vec<Badge>,
}

impl ProgressSnapshot {
    /// Fresh snapshot for a user's first recorded activity.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            xp: 0,
            level: MIN_LEVEL,
            current_streak: 0,
            longest_streak: 0,
            last_visit_date: None,
            total_resources_viewed: 0,
            total_resources_completed: 0,
            total_resources_bookmarked: 0,
            total_resources_submitted: 0,
            total_helpful_marked: 0,
            total_contributions: 0,
            achievements: BTreeSet::new(),
            badges: Vec::new(),
        }
    }

    /// Counter value an achievement requirement of `kind` is measured against.
    pub fn counter(&self, kind: RequirementKind) -> u32 {
        match kind {
            RequirementKind::Streak => self.current_streak,
            RequirementKind::Views => self.total_resources_viewed,
            RequirementKind::Completed => self.total_resources_completed,
            RequirementKind::Submissions => self.total_resources_submitted,
            RequirementKind::Helpful => self.total_helpful_marked,
            RequirementKind::Favorites => self.total_resources_bookmarked,
        }
    }

    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.achievements.contains(achievement_id)
    }

    /// Re-derive the cached level from XP and lift the longest streak to at
    /// least the current one.
    pub fn normalize(&mut self) {
        self.level = level_for_xp(self.xp);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// Copy of this snapshot with [`normalize`](Self::normalize) applied.
    pub fn normalized(&self) -> Self {
        let mut s = self.clone();
        s.normalize();
        s
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Forgiving (de)serializers for externally persisted fields.
mod lenient {
    use std::fmt;

    use chrono::NaiveDate;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::level::MIN_LEVEL;
    use crate::streak::{parse_visit_date, VISIT_DATE_FORMAT};

    struct ClampedCount;

    impl<'de> Visitor<'de> for ClampedCount {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            Ok(u64::try_from(v).unwrap_or(0))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            Ok(crate::level::sanitize_xp(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<u64, D::Error> {
            d.deserialize_any(ClampedCount)
        }
    }

    pub fn count_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        d.deserialize_any(ClampedCount)
    }

    pub fn count_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = d.deserialize_any(ClampedCount)?;
        Ok(u32::try_from(v).unwrap_or(u32::MAX))
    }

    pub fn level<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(count_u32(d)?.max(MIN_LEVEL))
    }

    /// `null` reads as an empty collection.
    pub fn or_empty<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }

    pub mod visit_date {
        use super::*;

        struct LenientDate;

        impl<'de> Visitor<'de> for LenientDate {
            type Value = Option<NaiveDate>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YYYY-MM-DD string, an empty string or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(parse_visit_date(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(LenientDate)
            }
        }

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => s.collect_str(&d.format(VISIT_DATE_FORMAT)),
                None => s.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            d.deserialize_any(LenientDate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_starts_at_level_one() {
        let s = ProgressSnapshot::new("u1");
        assert_eq!(s.user_id, "u1");
        assert_eq!(s.xp, 0);
        assert_eq!(s.level, 1);
        assert!(s.achievements.is_empty());
        assert!(s.last_visit_date.is_none());
        for kind in RequirementKind::ALL {
            assert_eq!(s.counter(kind), 0);
        }
    }

    #[test]
    fn counter_maps_favorites_to_bookmarks() {
        let mut s = ProgressSnapshot::new("u1");
        s.total_resources_bookmarked = 12;
        s.current_streak = 4;
        assert_eq!(s.counter(RequirementKind::Favorites), 12);
        assert_eq!(s.counter(RequirementKind::Streak), 4);
    }

    #[test]
    fn normalize_fixes_drifted_level() {
        let mut s = ProgressSnapshot::new("u1");
        s.xp = 450;
        s.level = 9;
        s.current_streak = 5;
        s.longest_streak = 2;
        s.normalize();
        assert_eq!(s.level, 3);
        assert_eq!(s.longest_streak, 5);
    }

    #[test]
    fn deserializes_stored_document() {
        let json = r#"{
            "userId": "abc",
            "xp": 150,
            "level": 2,
            "currentStreak": 2,
            "longestStreak": 6,
            "lastVisitDate": "2025-03-09",
            "totalResourcesViewed": 11,
            "totalResourcesCompleted": 1,
            "totalResourcesBookmarked": 0,
            "totalResourcesSubmitted": 1,
            "totalContributions": 0,
            "achievements": ["views_10", "submit_1", "views_10"],
            "badges": []
        }"#;
        let s: ProgressSnapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(s.user_id, "abc");
        assert_eq!(s.total_resources_viewed, 11);
        assert_eq!(s.last_visit_date, NaiveDate::from_ymd_opt(2025, 3, 9));
        assert_eq!(s.achievements.len(), 2);
        assert_eq!(s.total_helpful_marked, 0);
    }

    #[test]
    fn clamps_malformed_numbers() {
        let json = r#"{
            "xp": -30,
            "level": 0,
            "currentStreak": null,
            "totalResourcesViewed": 4.7,
            "lastVisitDate": ""
        }"#;
        let s: ProgressSnapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(s.xp, 0);
        assert_eq!(s.level, 1);
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.total_resources_viewed, 4);
        assert!(s.last_visit_date.is_none());
    }

    #[test]
    fn null_collections_read_as_empty() {
        let json = r#"{"userId": "u1", "achievements": null, "badges": null}"#;
        let s: ProgressSnapshot = serde_json::from_str(json).expect("parse");
        assert!(s.achievements.is_empty());
        assert!(s.badges.is_empty());
    }

    #[test]
    fn contributions_survive_a_save() {
        let json = r#"{"userId": "u1", "totalContributions": 7}"#;
        let s: ProgressSnapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(s.total_contributions, 7);
        let value = serde_json::to_value(&s).expect("serialize");
        assert_eq!(value["totalContributions"], 7);
    }

    #[test]
    fn garbage_date_reads_as_never_visited() {
        let s: ProgressSnapshot =
            serde_json::from_str(r#"{"lastVisitDate": "yesterday-ish"}"#).expect("parse");
        assert!(s.last_visit_date.is_none());
    }

    #[test]
    fn serializes_dates_like_stored_documents() {
        let mut s = ProgressSnapshot::new("u1");
        let value = serde_json::to_value(&s).expect("serialize");
        assert_eq!(value["lastVisitDate"], "");
        s.last_visit_date = NaiveDate::from_ymd_opt(2025, 1, 31);
        let value = serde_json::to_value(&s).expect("serialize");
        assert_eq!(value["lastVisitDate"], "2025-01-31");
        assert_eq!(value["totalResourcesViewed"], 0);

        let back: ProgressSnapshot = serde_json::from_value(value).expect("parse");
        assert_eq!(back, s);
    }
}
