use glam::Vec2;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::EventPump;

/// Discrete actions produced by key presses
///
/// Held keys for steering and firing are not actions; they are sampled every
/// frame into a [`PlayerInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    // === Menu Navigation ===
    MenuUp,
    MenuDown,
    MenuConfirm,
    Back,

    // === Gameplay ===
    Pause,
    ToggleHitboxes,

    // === System ===
    Quit,
}

/// Input context determines which actions are available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    /// Main menu, campaign select and settings
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Ship controls sampled from the keyboard state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Raw direction, not normalized. The movement step normalizes it.
    pub movement: Vec2,
    pub fire: bool,
    /// Held to charge the spread shot, fires on release
    pub spread: bool,
}

impl PlayerInput {
    /// Builds the input from a "is this key down" query
    ///
    /// WASD and the arrow keys steer, Space or Z fires, X charges the spread
    /// shot.
    pub fn from_keys(pressed: impl Fn(Scancode) -> bool) -> Self {
        let any = |keys: &[Scancode]| keys.iter().any(|&k| pressed(k));
        let mut direction = Vec2::ZERO;
        if any(&[Scancode::A, Scancode::Left]) {
            direction.x -= 1.0;
        }
        if any(&[Scancode::D, Scancode::Right]) {
            direction.x += 1.0;
        }
        if any(&[Scancode::W, Scancode::Up]) {
            direction.y -= 1.0;
        }
        if any(&[Scancode::S, Scancode::Down]) {
            direction.y += 1.0;
        }
        PlayerInput {
            movement: direction,
            fire: any(&[Scancode::Space, Scancode::Z]),
            spread: pressed(Scancode::X),
        }
    }

    pub fn from_event_pump(event_pump: &EventPump) -> Self {
        let keyboard = event_pump.keyboard_state();
        PlayerInput::from_keys(|key| keyboard.is_scancode_pressed(key))
    }
}

/// InputSystem translates SDL2 events into GameActions
///
/// # Architecture
///
/// Input processing happens in phases:
/// 1. The scene loop sets the current InputContext
/// 2. Poll SDL2 events
/// 3. Filter key presses based on context
/// 4. Return actions to the scene loop
pub struct InputSystem {
    pub context: InputContext,
}

impl InputSystem {
    /// Creates a new InputSystem starting in the menu context
    pub fn new() -> Self {
        InputSystem {
            context: InputContext::Menu,
        }
    }

    pub fn set_context(&mut self, context: InputContext) {
        self.context = context;
    }

    /// Process SDL2 events and return list of actions to handle
    pub fn poll_events(&self, event_pump: &mut EventPump) -> Vec<GameAction> {
        let mut actions = Vec::new();
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => actions.push(GameAction::Quit),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(action) = self.map_key(key) {
                        actions.push(action);
                    }
                }
                _ => {}
            }
        }
        actions
    }

    /// Maps one key press to an action in the current context
    pub fn map_key(&self, key: Keycode) -> Option<GameAction> {
        match self.context {
            InputContext::Menu | InputContext::GameOver => Self::menu_key(key),
            InputContext::Playing => match key {
                Keycode::Escape | Keycode::P => Some(GameAction::Pause),
                Keycode::F1 | Keycode::B => Some(GameAction::ToggleHitboxes),
                _ => None,
            },
            InputContext::Paused => match key {
                Keycode::Escape | Keycode::P => Some(GameAction::Pause),
                _ => Self::menu_key(key),
            },
        }
    }

    fn menu_key(key: Keycode) -> Option<GameAction> {
        match key {
            Keycode::Up | Keycode::W => Some(GameAction::MenuUp),
            Keycode::Down | Keycode::S => Some(GameAction::MenuDown),
            Keycode::Return | Keycode::Space => Some(GameAction::MenuConfirm),
            Keycode::Escape | Keycode::Backspace => Some(GameAction::Back),
            _ => None,
        }
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(keys: &[Scancode]) -> PlayerInput {
        PlayerInput::from_keys(|key| keys.contains(&key))
    }

    #[test]
    fn test_input_system_creation() {
        let input = InputSystem::new();
        assert_eq!(input.context, InputContext::Menu);
    }

    #[test]
    fn test_escape_depends_on_context() {
        let mut input = InputSystem::new();
        assert_eq!(input.map_key(Keycode::Escape), Some(GameAction::Back));

        input.set_context(InputContext::Playing);
        assert_eq!(input.map_key(Keycode::Escape), Some(GameAction::Pause));
        assert_eq!(input.map_key(Keycode::Up), None);

        input.set_context(InputContext::Paused);
        assert_eq!(input.map_key(Keycode::Escape), Some(GameAction::Pause));
        assert_eq!(input.map_key(Keycode::Down), Some(GameAction::MenuDown));
    }

    #[test]
    fn test_hitbox_toggle_only_while_playing() {
        let mut input = InputSystem::new();
        assert_eq!(input.map_key(Keycode::F1), None);
        input.set_context(InputContext::Playing);
        assert_eq!(input.map_key(Keycode::F1), Some(GameAction::ToggleHitboxes));
    }

    #[test]
    fn test_player_input_from_keys() {
        let input = input_with(&[Scancode::W, Scancode::Right, Scancode::Z]);
        assert_eq!(input.movement, Vec2::new(1.0, -1.0));
        assert!(input.fire);
        assert!(!input.spread);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = input_with(&[Scancode::A, Scancode::D, Scancode::X]);
        assert_eq!(input.movement, Vec2::ZERO);
        assert!(input.spread);
    }
}
