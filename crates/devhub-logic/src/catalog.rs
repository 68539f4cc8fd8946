//! Achievement catalog. The ordered registry of unlockable milestones.
//!
//! Each [`AchievementDefinition`] ties one counter dimension to a threshold
//! and an XP reward. Several entries may share a dimension at increasing
//! thresholds (tiers); they are independent entries, not a state machine.
//!
//! The built-in catalog is [`Catalog::builtin`]. Deployments can extend it
//! by loading a JSON array of definitions with [`Catalog::from_json`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Counter dimension an achievement requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Current consecutive-day visit streak.
    Streak,
    /// Distinct resources viewed.
    Views,
    /// Distinct resources completed.
    Completed,
    /// Resources submitted.
    Submissions,
    /// Resources marked helpful.
    Helpful,
    /// Distinct resources bookmarked.
    Favorites,
}

impl RequirementKind {
    /// All requirement kinds in catalog order.
    pub const ALL: [RequirementKind; 6] = [
        RequirementKind::Streak,
        RequirementKind::Views,
        RequirementKind::Completed,
        RequirementKind::Submissions,
        RequirementKind::Helpful,
        RequirementKind::Favorites,
    ];
}

/// Threshold on a single counter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(rename = "type")]
    pub kind: RequirementKind,
    pub count: u32,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    /// Stable identifier, e.g. `"views_50"`.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display glyph (emoji).
    pub icon: String,
    pub xp_reward: u64,
    pub requirement: Requirement,
}

impl AchievementDefinition {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        xp_reward: u64,
        kind: RequirementKind,
        count: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            xp_reward,
            requirement: Requirement { kind, count },
        }
    }
}

/// Catalog validation or loading error.
#[derive(Debug)]
pub enum CatalogError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
    /// Two entries share an identifier.
    DuplicateId(String),
    /// An entry has an empty identifier.
    EmptyId,
    /// An entry has an empty display name.
    EmptyName(String),
    /// An entry's threshold is zero, which would unlock on first contact.
    ZeroThreshold(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {}", e),
            CatalogError::DuplicateId(id) => write!(f, "Duplicate achievement id: {}", id),
            CatalogError::EmptyId => write!(f, "Achievement with empty id"),
            CatalogError::EmptyName(id) => write!(f, "Achievement {} has an empty name", id),
            CatalogError::ZeroThreshold(id) => {
                write!(f, "Achievement {} has a zero threshold", id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered, immutable set of achievement definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<AchievementDefinition>,
}

impl Catalog {
    /// Build a catalog from definitions, validating ids, names and thresholds.
    pub fn new(entries: Vec<AchievementDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if entry.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(entry.id.clone()));
            }
            if entry.requirement.count == 0 {
                return Err(CatalogError::ZeroThreshold(entry.id.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<AchievementDefinition> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The catalog the hub ships with: 18 achievements over six dimensions.
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        use RequirementKind::*;
        let entries = vec![
            // Streak
            AchievementDefinition::new("streak_3", "Getting Started", "Visit 3 days in a row", "🔥", 50, Streak, 3),
            AchievementDefinition::new("streak_7", "Week Warrior", "Visit 7 days in a row", "⚡", 150, Streak, 7),
            AchievementDefinition::new("streak_30", "Monthly Master", "Visit 30 days in a row", "💪", 500, Streak, 30),
            AchievementDefinition::new("streak_100", "Century Club", "Visit 100 days in a row", "👑", 2000, Streak, 100),
            // Views
            AchievementDefinition::new("views_10", "Curious Mind", "View 10 resources", "👀", 25, Views, 10),
            AchievementDefinition::new("views_50", "Knowledge Seeker", "View 50 resources", "🔍", 100, Views, 50),
            AchievementDefinition::new("views_100", "Explorer", "View 100 resources", "🗺️", 250, Views, 100),
            AchievementDefinition::new("views_500", "Master Explorer", "View 500 resources", "🌟", 1000, Views, 500),
            // Completed
            AchievementDefinition::new("completed_5", "First Steps", "Complete 5 resources", "✅", 50, Completed, 5),
            AchievementDefinition::new("completed_25", "Dedicated Learner", "Complete 25 resources", "📚", 200, Completed, 25),
            AchievementDefinition::new("completed_100", "Learning Machine", "Complete 100 resources", "🎓", 750, Completed, 100),
            // Submissions
            AchievementDefinition::new("submit_1", "Contributor", "Submit your first resource", "📝", 100, Submissions, 1),
            AchievementDefinition::new("submit_5", "Active Contributor", "Submit 5 resources", "✨", 300, Submissions, 5),
            AchievementDefinition::new("submit_20", "Content Creator", "Submit 20 resources", "🏆", 1000, Submissions, 20),
            // Helpful
            AchievementDefinition::new("helpful_10", "Helpful Friend", "Mark 10 resources as helpful", "👍", 50, Helpful, 10),
            AchievementDefinition::new("helpful_50", "Community Helper", "Mark 50 resources as helpful", "💖", 200, Helpful, 50),
            // Favorites
            AchievementDefinition::new("favorites_10", "Collector", "Favorite 10 resources", "⭐", 30, Favorites, 10),
            AchievementDefinition::new("favorites_50", "Curator", "Favorite 50 resources", "💎", 150, Favorites, 50),
        ];
        Self { entries }
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, AchievementDefinition> {
        self.entries.iter()
    }

    /// Look up an entry by identifier.
    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries measured against `kind`, in catalog order.
    pub fn tiers(&self, kind: RequirementKind) -> impl Iterator<Item = &AchievementDefinition> {
        self.entries
            .iter()
            .filter(move |e| e.requirement.kind == kind)
    }

    /// Sum of every reward in the catalog.
    pub fn total_reward(&self) -> u64 {
        self.entries.iter().map(|e| e.xp_reward).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AchievementDefinition;
    type IntoIter = std::slice::Iter<'a, AchievementDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
