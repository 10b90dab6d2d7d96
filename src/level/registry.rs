//! Level metadata, campaigns and unlock state
//!
//! Read once at startup from `campaigns.json`:
//!
//! ```json
//! {
//!   "levels": {"stage_1": {"path": "stage_1.json", "name": "First Contact", "unlocked": true}},
//!   "campaigns": {"main": {"name": "Main", "start_level": "stage_1", "levels": ["stage_1"]}},
//!   "default_campaign": "main"
//! }
//! ```

use crate::config::{load_json, ASSETS_ROOT};
use crate::error::GameError;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct LevelEntry {
    path: String,
    name: Option<String>,
    #[serde(default)]
    unlocked: bool,
    campaign: Option<String>,
    duration: Option<f32>,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    description: String,
}

fn default_difficulty() -> String {
    "normal".to_string()
}

#[derive(Debug, Deserialize)]
struct CampaignEntry {
    name: Option<String>,
    start_level: Option<String>,
    #[serde(default)]
    levels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub id: String,
    /// Relative to the assets root, always under `levels/` or `config/`
    pub path: String,
    pub name: String,
    pub unlocked: bool,
    pub campaign: Option<String>,
    pub duration: Option<f32>,
    pub difficulty: String,
    pub description: String,
}

impl LevelConfig {
    fn from_entry(id: &str, entry: LevelEntry) -> Self {
        let path = if entry.path.starts_with("levels/") || entry.path.starts_with("config/") {
            entry.path
        } else {
            format!("levels/{}", entry.path)
        };
        LevelConfig {
            id: id.to_string(),
            path,
            name: entry.name.unwrap_or_else(|| id.to_string()),
            unlocked: entry.unlocked,
            campaign: entry.campaign,
            duration: entry.duration,
            difficulty: entry.difficulty,
            description: entry.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub start_level: Option<String>,
    pub levels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LevelRegistry {
    levels: BTreeMap<String, LevelConfig>,
    campaigns: BTreeMap<String, Campaign>,
    default_campaign: Option<String>,
    assets_root: PathBuf,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        LevelRegistry {
            levels: BTreeMap::new(),
            campaigns: BTreeMap::new(),
            default_campaign: None,
            assets_root: PathBuf::from(ASSETS_ROOT),
        }
    }
}

impl LevelRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let data: Value = load_json(path)?;
        let registry = LevelRegistry::from_value(&data);
        info!(
            "Loaded {} levels and {} campaigns from {}",
            registry.levels.len(),
            registry.campaigns.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_value(data: &Value) -> Self {
        let mut registry = LevelRegistry::default();

        if let Some(levels) = data.get("levels").and_then(Value::as_object) {
            for (id, raw) in levels {
                match serde_json::from_value::<LevelEntry>(raw.clone()) {
                    Ok(entry) => {
                        registry
                            .levels
                            .insert(id.clone(), LevelConfig::from_entry(id, entry));
                    }
                    Err(e) => warn!("Skipping malformed level '{}': {}", id, e),
                }
            }
        }

        if let Some(campaigns) = data.get("campaigns").and_then(Value::as_object) {
            for (id, raw) in campaigns {
                let entry = match serde_json::from_value::<CampaignEntry>(raw.clone()) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping malformed campaign '{}': {}", id, e);
                        continue;
                    }
                };
                let unknown: Vec<&str> = entry
                    .levels
                    .iter()
                    .filter(|level| !registry.levels.contains_key(*level))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    warn!("Campaign '{}' references unknown levels: {:?}", id, unknown);
                }
                if let Some(start) = &entry.start_level {
                    if !registry.levels.contains_key(start) {
                        warn!("Campaign '{}' has invalid start_level '{}'", id, start);
                    }
                }
                registry.campaigns.insert(
                    id.clone(),
                    Campaign {
                        id: id.clone(),
                        name: entry.name.unwrap_or_else(|| id.clone()),
                        start_level: entry.start_level,
                        levels: entry.levels,
                    },
                );
            }
        }

        registry.default_campaign = data
            .get("default_campaign")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(default) = &registry.default_campaign {
            if !registry.campaigns.contains_key(default) {
                warn!("default_campaign '{}' does not exist", default);
            }
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&LevelConfig> {
        self.levels.get(id)
    }

    /// File system path of a level's stage file
    pub fn resolve_path(&self, level: &LevelConfig) -> PathBuf {
        self.assets_root.join(&level.path)
    }

    pub fn campaign(&self, id: &str) -> Option<&Campaign> {
        self.campaigns.get(id)
    }

    /// A campaign's levels in play order. Unknown ids are left out.
    pub fn get_campaign(&self, id: &str) -> Vec<&LevelConfig> {
        let Some(campaign) = self.campaigns.get(id) else {
            warn!("Unknown campaign: {}", id);
            return Vec::new();
        };
        campaign
            .levels
            .iter()
            .filter_map(|level| self.levels.get(level))
            .collect()
    }

    pub fn default_campaign(&self) -> Option<&str> {
        self.default_campaign.as_deref()
    }

    /// `start_level`, else the first listed level
    pub fn default_start(&self, campaign: &str) -> Option<&LevelConfig> {
        let campaign = self.campaigns.get(campaign)?;
        match &campaign.start_level {
            Some(start) => self.get(start),
            None => campaign.levels.first().and_then(|id| self.get(id)),
        }
    }

    pub fn unlocked(&self) -> Vec<&LevelConfig> {
        self.levels.values().filter(|l| l.unlocked).collect()
    }

    pub fn unlocked_ids(&self) -> Vec<String> {
        self.unlocked().into_iter().map(|l| l.id.clone()).collect()
    }

    pub fn unlock(&mut self, id: &str) -> bool {
        match self.levels.get_mut(id) {
            Some(level) => {
                if !level.unlocked {
                    info!("Unlocked level {}", id);
                }
                level.unlocked = true;
                true
            }
            None => {
                warn!("Cannot unlock unknown level: {}", id);
                false
            }
        }
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.levels.get(id).is_some_and(|l| l.unlocked)
    }

    pub fn list_campaigns(&self) -> Vec<&Campaign> {
        self.campaigns.values().collect()
    }

    /// The level after `id` in its campaign
    pub fn next_level(&self, id: &str) -> Option<&LevelConfig> {
        let level = self.levels.get(id)?;
        let campaign = match &level.campaign {
            Some(name) => self.campaigns.get(name),
            None => self.campaigns.values().find(|c| c.levels.iter().any(|l| l == id)),
        }?;
        let index = campaign.levels.iter().position(|l| l == id)?;
        campaign.levels.get(index + 1).and_then(|next| self.get(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> LevelRegistry {
        LevelRegistry::from_value(&json!({
            "levels": {
                "one": {"path": "one.json", "name": "First Contact", "unlocked": true, "campaign": "main"},
                "two": {"path": "levels/two.json", "campaign": "main", "difficulty": "hard"},
                "dev": {"path": "config/dev.json"},
                "broken": {"name": "No path"}
            },
            "campaigns": {
                "main": {"name": "Main", "levels": ["one", "two", "ghost"]},
                "test": {"start_level": "dev", "levels": ["one", "dev"]}
            },
            "default_campaign": "main"
        }))
    }

    #[test]
    fn test_paths_are_prefixed() {
        let r = registry();
        assert_eq!(r.get("one").unwrap().path, "levels/one.json");
        assert_eq!(r.get("two").unwrap().path, "levels/two.json");
        assert_eq!(r.get("dev").unwrap().path, "config/dev.json");
        assert_eq!(r.resolve_path(r.get("one").unwrap()), Path::new("assets/levels/one.json"));
    }

    #[test]
    fn test_defaults_and_malformed_entries() {
        let r = registry();
        assert!(r.get("broken").is_none());
        let two = r.get("two").unwrap();
        assert_eq!(two.name, "two");
        assert_eq!(two.difficulty, "hard");
        assert_eq!(r.get("dev").unwrap().difficulty, "normal");
        assert_eq!(r.campaign("test").unwrap().name, "test");
    }

    #[test]
    fn test_campaign_order_skips_unknown_levels() {
        let r = registry();
        let ids: Vec<&str> = r.get_campaign("main").iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert!(r.get_campaign("nope").is_empty());
    }

    #[test]
    fn test_default_start() {
        let r = registry();
        assert_eq!(r.default_campaign(), Some("main"));
        assert_eq!(r.default_start("main").unwrap().id, "one");
        assert_eq!(r.default_start("test").unwrap().id, "dev");
        assert!(r.default_start("nope").is_none());
    }

    #[test]
    fn test_unlock() {
        let mut r = registry();
        assert!(!r.is_unlocked("two"));
        assert!(r.unlock("two"));
        assert!(r.is_unlocked("two"));
        assert_eq!(r.unlocked_ids(), vec!["one".to_string(), "two".to_string()]);
        assert!(!r.unlock("ghost"));
    }

    #[test]
    fn test_next_level() {
        let r = registry();
        assert_eq!(r.next_level("one").unwrap().id, "two");
        assert!(r.next_level("two").is_none());
        assert_eq!(r.list_campaigns().len(), 2);
    }
}
