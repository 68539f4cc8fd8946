//! Celebration notices derived from engine outcomes.
//!
//! The engine never delivers anything; it describes what happened and the
//! caller's notification sink decides how to surface it.

use serde::{Deserialize, Serialize};

use crate::catalog::AchievementDefinition;

/// Notification category as stored by the hub's notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    LearningMilestone,
    Achievement,
    Streak,
}

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    LevelUp {
        level: u32,
    },
    AchievementUnlocked {
        id: String,
        name: String,
        description: String,
        icon: String,
    },
    StreakMilestone {
        days: u32,
    },
}

impl Notice {
    pub fn unlocked(def: &AchievementDefinition) -> Self {
        Notice::AchievementUnlocked {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
        }
    }

    pub fn category(&self) -> NoticeCategory {
        match self {
            Notice::LevelUp { .. } => NoticeCategory::LearningMilestone,
            Notice::AchievementUnlocked { .. } => NoticeCategory::Achievement,
            Notice::StreakMilestone { .. } => NoticeCategory::Streak,
        }
    }

    /// Text for the persistent notification feed.
    pub fn message(&self) -> String {
        match self {
            Notice::LevelUp { level } => {
                format!("Congratulations! You've reached level {}!", level)
            }
            Notice::AchievementUnlocked {
                name, description, ..
            } => format!("You unlocked \"{}\" - {}", name, description),
            Notice::StreakMilestone { days } => match *days {
                3 => "🔥 3-day streak! Keep it going!".to_string(),
                7 => "⚡ 7-day streak! You're on fire!".to_string(),
                n => format!("💪 {}-day streak! Incredible!", n),
            },
        }
    }

    /// Short toast headline.
    pub fn headline(&self) -> String {
        match self {
            Notice::LevelUp { level } => format!("🎉 Level Up! You're now level {}!", level),
            Notice::AchievementUnlocked { name, .. } => {
                format!("🏆 Achievement Unlocked: {}!", name)
            }
            Notice::StreakMilestone { .. } => self.message(),
        }
    }
}

/// Whether a streak of `days` deserves a cheer: day 3, day 7, then every
/// tenth day.
pub fn is_streak_milestone(days: u32) -> bool {
    days == 3 || days == 7 || (days >= 10 && days % 10 == 0)
}
