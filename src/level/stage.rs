//! Stage files and exit triggers
//!
//! ```json
//! {"stages": [{
//!     "name": "Opening",
//!     "timeline": {"0": [{"enemy": "straight", "count": 3, "pattern": "line"}],
//!                  "4.5": [{"pickup": "medkit", "spawn_edge": "top"}]},
//!     "exit_trigger": "all_waves_cleared"
//! }]}
//! ```

use crate::config::load_json;
use crate::entity::SpawnParams;
use crate::error::GameError;
use log::{info, warn};
use serde_json::Value;
use std::path::Path;

/// One timeline entry, tagged with the second it fires at
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub time: f32,
    pub entry: SpawnParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExitTrigger {
    /// `stage_timer >= duration`
    Duration(f32),
    /// Every wave fired and no tracked enemy remains
    AllWavesCleared,
    /// Every wave fired and no enemy is alive
    EnemyCleared,
    EnemyCategoryCleared,
    BossDefeated,
    /// Ends at `max`, or after `min` once the waves are cleared
    Timer { min: f32, max: f32 },
    /// Unrecognized config, never satisfied
    Never,
}

impl ExitTrigger {
    pub fn from_value(value: Option<&Value>, duration: Option<f32>) -> ExitTrigger {
        let Some(value) = value else {
            return ExitTrigger::AllWavesCleared;
        };
        let kind = match value {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => map.get("type").and_then(Value::as_str),
            _ => None,
        };
        match kind {
            Some("duration") => ExitTrigger::Duration(duration.unwrap_or(f32::INFINITY)),
            Some("all_waves_cleared") => ExitTrigger::AllWavesCleared,
            Some("enemy_cleared") => ExitTrigger::EnemyCleared,
            Some("enemy_category_cleared") => ExitTrigger::EnemyCategoryCleared,
            Some("boss_defeated") => ExitTrigger::BossDefeated,
            Some("timer") => {
                let bound = |key: &str, default: f32| {
                    value
                        .get(key)
                        .and_then(Value::as_f64)
                        .map_or(default, |v| v as f32)
                };
                ExitTrigger::Timer {
                    min: bound("min", 0.0),
                    max: bound("max", f32::INFINITY),
                }
            }
            _ => {
                warn!("Unknown exit trigger: {}", value);
                ExitTrigger::Never
            }
        }
    }

    /// Time-driven triggers are checked every frame, the rest only once every
    /// wave has fired
    pub fn always_checked(&self) -> bool {
        matches!(self, ExitTrigger::Duration(_) | ExitTrigger::Timer { .. })
    }
}

/// World state a trigger is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriggerState {
    pub stage_timer: f32,
    pub waves_complete: bool,
    pub remaining_enemies: i64,
    pub alive_enemies: usize,
    pub boss_defeated: bool,
}

impl TriggerState {
    fn waves_cleared(&self) -> bool {
        self.waves_complete && self.remaining_enemies <= 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub waves: Vec<Wave>,
    pub trigger: ExitTrigger,
    pub duration: Option<f32>,
}

impl Stage {
    pub fn from_value(index: usize, value: &Value) -> Stage {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("Stage {}", index + 1), str::to_string);
        let duration = value.get("duration").and_then(Value::as_f64).map(|d| d as f32);
        let trigger = ExitTrigger::from_value(value.get("exit_trigger"), duration);
        let waves = parse_timeline(&name, value.get("timeline"));
        Stage {
            name,
            waves,
            trigger,
            duration,
        }
    }
}

/// Flattens `{"<seconds>": [wave, ..]}` into waves sorted by time
pub fn parse_timeline(stage: &str, timeline: Option<&Value>) -> Vec<Wave> {
    let Some(timeline) = timeline else {
        return Vec::new();
    };
    let Some(entries) = timeline.as_object() else {
        warn!("Stage {} has a timeline that is not an object", stage);
        return Vec::new();
    };

    let mut waves = Vec::new();
    for (key, spawns) in entries {
        let Some(time) = key.trim().parse::<f32>().ok().filter(|t| t.is_finite()) else {
            warn!("Stage {}: skipping invalid time key '{}'", stage, key);
            continue;
        };
        let Some(spawns) = spawns.as_array() else {
            warn!("Stage {}: entry at {} is not a list", stage, key);
            continue;
        };
        for spawn in spawns {
            match spawn.as_object() {
                Some(map) => waves.push(Wave {
                    time,
                    entry: SpawnParams::from_map(map.clone()),
                }),
                None => warn!("Stage {}: invalid wave at {}", stage, key),
            }
        }
    }
    waves.sort_by(|a, b| a.time.total_cmp(&b.time));
    waves
}

#[derive(Debug, Clone, Default)]
pub struct StageLoader {
    stages: Vec<Stage>,
    index: usize,
    pub stage_timer: f32,
}

impl StageLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let data: Value = load_json(path)?;
        let loader = StageLoader::from_value(&data);
        info!("Loaded {} stage(s) from {}", loader.len(), path.display());
        Ok(loader)
    }

    pub fn from_value(data: &Value) -> Self {
        let stages = match data.get("stages") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, stage)| Stage::from_value(i, stage))
                .collect(),
            Some(_) => {
                warn!("Level has a 'stages' value that is not a list");
                Vec::new()
            }
            None => Vec::new(),
        };
        if stages.is_empty() {
            warn!("Level has no stages");
        }
        StageLoader {
            stages,
            index: 0,
            stage_timer: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages.get(self.index)
    }

    pub fn stage_index(&self) -> usize {
        self.index
    }

    pub fn has_next_stage(&self) -> bool {
        self.index + 1 < self.stages.len()
    }

    pub fn advance_stage(&mut self) {
        self.index += 1;
        self.stage_timer = 0.0;
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.stage_timer = 0.0;
    }

    pub fn update_timer(&mut self, dt: f32) {
        self.stage_timer += dt;
    }

    pub fn should_check_trigger(&self, waves_complete: bool) -> bool {
        match self.current_stage() {
            Some(stage) => stage.trigger.always_checked() || waves_complete,
            None => false,
        }
    }

    pub fn check_trigger(&self, state: &TriggerState) -> bool {
        let Some(stage) = self.current_stage() else {
            return false;
        };
        match stage.trigger {
            ExitTrigger::Duration(duration) => state.stage_timer >= duration,
            ExitTrigger::AllWavesCleared => state.waves_cleared(),
            ExitTrigger::EnemyCleared => state.waves_complete && state.alive_enemies == 0,
            ExitTrigger::EnemyCategoryCleared => state.alive_enemies == 0,
            ExitTrigger::BossDefeated => state.boss_defeated,
            ExitTrigger::Timer { min, max } => {
                state.stage_timer >= max || (state.stage_timer >= min && state.waves_cleared())
            }
            ExitTrigger::Never => false,
        }
    }
}
