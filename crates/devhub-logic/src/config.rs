//! Engine configuration. Reward amounts and catalog overrides.
//!
//! Every field defaults to the hub's built-in rules, so an empty JSON object
//! is a valid configuration:
//!
//! ```
//! use devhub_logic::config::EngineConfig;
//!
//! let config = EngineConfig::from_json("{}").unwrap();
//! assert_eq!(config.rewards.submitted, 50);
//! assert!(config.achievements.is_none());
//! ```

use serde::{Deserialize, Serialize};

use crate::activity::RewardTable;
use crate::catalog::{AchievementDefinition, Catalog, CatalogError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Base XP per activity kind.
    pub rewards: RewardTable,
    /// Replacement catalog. `None` keeps [`Catalog::builtin`].
    pub achievements: Option<Vec<AchievementDefinition>>,
    /// Entries appended after the active catalog.
    pub extra_achievements: Vec<AchievementDefinition>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build and validate the catalog this configuration describes.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        let mut entries: Vec<AchievementDefinition> = match &self.achievements {
            Some(list) => list.clone(),
            None => Catalog::builtin().iter().cloned().collect(),
        };
        entries.extend(self.extra_achievements.iter().cloned());
        Catalog::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RequirementKind;

    #[test]
    fn empty_config_is_builtin() {
        let config = EngineConfig::from_json("{}").expect("parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.catalog().expect("catalog"), Catalog::builtin());
    }

    #[test]
    fn extra_achievements_append_in_order() {
        let json = r#"{
            "rewards": { "helpful": 7 },
            "extraAchievements": [{
                "id": "helpful_200",
                "name": "Pillar",
                "description": "Mark 200 resources as helpful",
                "icon": "🏛️",
                "xpReward": 600,
                "requirement": { "type": "helpful", "count": 200 }
            }]
        }"#;
        let config = EngineConfig::from_json(json).expect("parse");
        assert_eq!(config.rewards.helpful, 7);
        assert_eq!(config.rewards.viewed, 5);
        let catalog = config.catalog().expect("catalog");
        assert_eq!(catalog.len(), 19);
        let last = catalog.iter().last().expect("entry");
        assert_eq!(last.id, "helpful_200");
        assert_eq!(last.requirement.kind, RequirementKind::Helpful);
    }

    #[test]
    fn extra_entry_colliding_with_builtin_is_rejected() {
        let mut config = EngineConfig::default();
        let dup = Catalog::builtin().get("views_10").cloned().expect("views_10");
        config.extra_achievements.push(dup);
        assert!(matches!(config.catalog(), Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn replacement_catalog() {
        let config = EngineConfig {
            achievements: Some(Vec::new()),
            ..EngineConfig::default()
        };
        assert!(config.catalog().expect("catalog").is_empty());
    }
}
