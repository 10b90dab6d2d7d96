//! Scene switching with fades and a pause stack
//!
//! Scenes are plain ids. The main loop matches on [`SceneManager::current`]
//! and drives the matching screen; the manager only tracks states, the stack
//! and the fade.

use crate::error::GameError;
use log::{debug, info, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    MainMenu,
    CampaignSelect,
    Game,
    Settings,
    Pause,
}

impl SceneId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneId::MainMenu => "main_menu",
            SceneId::CampaignSelect => "campaign_select",
            SceneId::Game => "game",
            SceneId::Settings => "settings",
            SceneId::Pause => "pause",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    #[default]
    Inactive,
    Loading,
    Active,
    Paused,
    Exiting,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FadePhase {
    Out,
    In,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    target: SceneId,
    /// Length of each half
    half: f32,
    elapsed: f32,
    phase: FadePhase,
}

#[derive(Debug, Default)]
pub struct SceneManager {
    states: HashMap<SceneId, SceneState>,
    current: Option<SceneId>,
    stack: Vec<SceneId>,
    fade: Option<Fade>,
}

impl SceneManager {
    pub fn new() -> Self {
        SceneManager::default()
    }

    /// Manager with every scene registered
    pub fn with_all_scenes() -> Self {
        let mut manager = SceneManager::new();
        for id in [
            SceneId::MainMenu,
            SceneId::CampaignSelect,
            SceneId::Game,
            SceneId::Settings,
            SceneId::Pause,
        ] {
            manager.register(id);
        }
        manager
    }

    pub fn register(&mut self, id: SceneId) {
        self.states.entry(id).or_insert(SceneState::Inactive);
    }

    pub fn is_registered(&self, id: SceneId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn current(&self) -> Option<SceneId> {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.fade.is_some()
    }

    fn check(&self, id: SceneId) -> Result<(), GameError> {
        if self.is_registered(id) {
            Ok(())
        } else {
            Err(GameError::UnknownScene(id.as_str().to_string()))
        }
    }

    fn set_state(&mut self, id: SceneId, state: SceneState) {
        self.states.insert(id, state);
    }

    /// Switches scenes at once, clearing the stack. Returns false when ignored
    /// because a fade is running.
    pub fn set_scene(&mut self, id: SceneId) -> Result<bool, GameError> {
        self.check(id)?;
        if self.is_transitioning() {
            warn!("Ignoring switch to {} during a transition", id.as_str());
            return Ok(false);
        }
        self.switch_to(id);
        self.set_state(id, SceneState::Active);
        Ok(true)
    }

    fn switch_to(&mut self, id: SceneId) {
        for scene in self.stack.drain(..).chain(self.current) {
            self.states.insert(scene, SceneState::Inactive);
        }
        info!("Scene: {}", id.as_str());
        self.current = Some(id);
    }

    /// Fades out of the current scene, then into `id`. `duration` covers both
    /// halves.
    pub fn set_scene_with_fade(&mut self, id: SceneId, duration: f32) -> Result<bool, GameError> {
        self.check(id)?;
        if self.is_transitioning() {
            warn!("Ignoring fade to {} during a transition", id.as_str());
            return Ok(false);
        }
        if duration <= 0.0 || self.current.is_none() {
            return self.set_scene(id);
        }
        if let Some(current) = self.current {
            self.set_state(current, SceneState::Exiting);
        }
        self.set_state(id, SceneState::Transitioning);
        self.fade = Some(Fade {
            target: id,
            half: duration / 2.0,
            elapsed: 0.0,
            phase: FadePhase::Out,
        });
        Ok(true)
    }

    /// Advances the fade
    pub fn update(&mut self, dt: f32) {
        let Some(mut fade) = self.fade else {
            return;
        };
        fade.elapsed += dt;
        if fade.elapsed < fade.half {
            self.fade = Some(fade);
            return;
        }
        match fade.phase {
            FadePhase::Out => {
                self.switch_to(fade.target);
                self.set_state(fade.target, SceneState::Loading);
                fade.elapsed -= fade.half;
                fade.phase = FadePhase::In;
                debug!("Fading into {}", fade.target.as_str());
                self.fade = Some(fade);
            }
            FadePhase::In => {
                self.set_state(fade.target, SceneState::Active);
                self.fade = None;
            }
        }
    }

    /// Fade overlay opacity in `0.0..=1.0`
    pub fn transition_alpha(&self) -> f32 {
        match self.fade {
            None => 0.0,
            Some(fade) => {
                let t = (fade.elapsed / fade.half.max(f32::EPSILON)).clamp(0.0, 1.0);
                match fade.phase {
                    FadePhase::Out => t,
                    FadePhase::In => 1.0 - t,
                }
            }
        }
    }

    /// Pauses the current scene and makes `id` current on top of it
    pub fn push_scene(&mut self, id: SceneId) -> Result<(), GameError> {
        self.check(id)?;
        if let Some(current) = self.current {
            self.set_state(current, SceneState::Paused);
            self.stack.push(current);
        }
        self.current = Some(id);
        self.set_state(id, SceneState::Active);
        debug!("Pushed {} (depth {})", id.as_str(), self.stack.len());
        Ok(())
    }

    /// Drops the top scene and resumes the one below. Returns the resumed scene.
    pub fn pop_scene(&mut self) -> Option<SceneId> {
        let below = self.stack.pop()?;
        if let Some(top) = self.current {
            self.set_state(top, SceneState::Inactive);
        }
        self.current = Some(below);
        self.set_state(below, SceneState::Active);
        Some(below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_of(scenes: &SceneManager, id: SceneId) -> Option<SceneState> {
        scenes.states.get(&id).copied()
    }

    #[test]
    fn test_unknown_scene_is_rejected() {
        let mut scenes = SceneManager::new();
        scenes.register(SceneId::MainMenu);
        assert!(matches!(scenes.set_scene(SceneId::Game), Err(GameError::UnknownScene(_))));
        assert!(scenes.set_scene(SceneId::MainMenu).unwrap());
        assert_eq!(scenes.current(), Some(SceneId::MainMenu));
        assert_eq!(state_of(&scenes, SceneId::MainMenu), Some(SceneState::Active));
    }

    #[test]
    fn test_fade_runs_both_halves() {
        let mut scenes = SceneManager::with_all_scenes();
        scenes.set_scene(SceneId::MainMenu).unwrap();
        scenes.set_scene_with_fade(SceneId::Game, 1.0).unwrap();
        assert_eq!(state_of(&scenes, SceneId::MainMenu), Some(SceneState::Exiting));

        scenes.update(0.25);
        assert_eq!(scenes.current(), Some(SceneId::MainMenu));
        assert!((scenes.transition_alpha() - 0.5).abs() < 1e-5);

        scenes.update(0.25);
        assert_eq!(scenes.current(), Some(SceneId::Game));
        assert_eq!(state_of(&scenes, SceneId::Game), Some(SceneState::Loading));
        assert_eq!(state_of(&scenes, SceneId::MainMenu), Some(SceneState::Inactive));

        scenes.update(0.5);
        assert!(!scenes.is_transitioning());
        assert_eq!(state_of(&scenes, SceneId::Game), Some(SceneState::Active));
        assert_eq!(scenes.transition_alpha(), 0.0);
    }

    #[test]
    fn test_switches_ignored_during_fade() {
        let mut scenes = SceneManager::with_all_scenes();
        scenes.set_scene(SceneId::MainMenu).unwrap();
        scenes.set_scene_with_fade(SceneId::CampaignSelect, 0.6).unwrap();
        assert!(!scenes.set_scene(SceneId::Game).unwrap());
        assert!(!scenes.set_scene_with_fade(SceneId::Settings, 0.6).unwrap());

        scenes.update(1.0);
        scenes.update(1.0);
        assert_eq!(scenes.current(), Some(SceneId::CampaignSelect));
    }

    #[test]
    fn test_push_and_pop_for_pause() {
        let mut scenes = SceneManager::with_all_scenes();
        scenes.set_scene(SceneId::Game).unwrap();
        scenes.push_scene(SceneId::Pause).unwrap();
        assert_eq!(scenes.current(), Some(SceneId::Pause));
        assert_eq!(state_of(&scenes, SceneId::Game), Some(SceneState::Paused));
        assert_eq!(scenes.stack.len(), 1);

        assert_eq!(scenes.pop_scene(), Some(SceneId::Game));
        assert_eq!(state_of(&scenes, SceneId::Game), Some(SceneState::Active));
        assert_eq!(state_of(&scenes, SceneId::Pause), Some(SceneState::Inactive));
        assert_eq!(scenes.pop_scene(), None);
    }

    #[test]
    fn test_set_scene_clears_stack() {
        let mut scenes = SceneManager::with_all_scenes();
        scenes.set_scene(SceneId::Game).unwrap();
        scenes.push_scene(SceneId::Pause).unwrap();
        scenes.set_scene(SceneId::MainMenu).unwrap();
        assert_eq!(scenes.stack.len(), 0);
        assert_eq!(state_of(&scenes, SceneId::Game), Some(SceneState::Inactive));
    }
}
