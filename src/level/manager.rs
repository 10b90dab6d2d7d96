//! Drives a level: stage timer, waves and stage transitions

use super::stage::{StageLoader, TriggerState};
use super::wave::{WaveContext, WaveScheduler};
use crate::entity::EntityCategory;
use crate::error::GameError;
use crate::events::{EventManager, GameEvent};
use crate::item::ItemManager;
use crate::spawn::SpawnManager;
use log::info;
use std::path::Path;

pub struct LevelManager {
    stages: StageLoader,
    waves: WaveScheduler,
    boss_defeated: bool,
    complete: bool,
    paused: bool,
}

impl LevelManager {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        Ok(LevelManager::from_stages(StageLoader::load(path)?))
    }

    pub fn from_stages(stages: StageLoader) -> Self {
        LevelManager::with_scheduler(stages, WaveScheduler::new())
    }

    pub fn with_scheduler(stages: StageLoader, waves: WaveScheduler) -> Self {
        let mut level = LevelManager {
            stages,
            waves,
            boss_defeated: false,
            complete: false,
            paused: false,
        };
        level.start_stage();
        level
    }

    fn start_stage(&mut self) {
        match self.stages.current_stage() {
            Some(stage) => {
                info!(
                    "Starting stage {}/{}: {}",
                    self.stages.stage_index() + 1,
                    self.stages.len(),
                    stage.name
                );
                self.waves.load_waves(stage.waves.clone());
            }
            None => self.waves.load_waves(Vec::new()),
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        spawner: &mut SpawnManager,
        items: &ItemManager,
        ctx: WaveContext,
        events: &mut EventManager,
    ) {
        if self.complete || self.stages.is_empty() {
            return;
        }
        if !self.paused && !self.waves.is_paused() {
            self.stages.update_timer(dt);
        }
        self.waves
            .update(self.stages.stage_timer, spawner, items, ctx, events);

        let waves_complete = self.waves.waves_complete();
        if !self.stages.should_check_trigger(waves_complete) {
            return;
        }
        let state = TriggerState {
            stage_timer: self.stages.stage_timer,
            waves_complete,
            remaining_enemies: self.waves.remaining_enemies(),
            alive_enemies: spawner.count_alive(EntityCategory::Enemy),
            boss_defeated: self.boss_defeated,
        };
        if !self.stages.check_trigger(&state) {
            return;
        }

        if self.stages.has_next_stage() {
            self.stages.advance_stage();
            self.boss_defeated = false;
            self.start_stage();
        } else {
            info!("Level complete");
            self.complete = true;
            events.publish(GameEvent::LevelComplete);
        }
    }

    pub fn current_stage_name(&self) -> Option<&str> {
        self.stages.current_stage().map(|s| s.name.as_str())
    }

    pub fn stage_timer(&self) -> f32 {
        self.stages.stage_timer
    }

    pub fn remaining_enemies(&self) -> i64 {
        self.waves.remaining_enemies()
    }

    pub fn notify_enemy_destroyed(&mut self) {
        self.waves.on_enemy_destroyed();
    }

    pub fn notify_boss_defeated(&mut self) {
        self.boss_defeated = true;
    }

    /// Stops both the stage timer and the waves
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.waves.set_paused(paused);
    }

    pub fn reset(&mut self) {
        self.stages.restart();
        self.boss_defeated = false;
        self.complete = false;
        self.paused = false;
        self.waves.set_paused(false);
        self.start_stage();
    }
}
