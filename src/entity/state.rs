//! Lifecycle and interaction states
//!
//! Entities carry two independent states. The lifecycle says whether the
//! entity still exists; the interaction state says what it is allowed to do
//! while it exists.
//!
//! # Example
//!
//! ```ignore
//! let mut life = LifecycleState::Alive;
//! life.mark_dead(false);
//! assert_eq!(life, LifecycleState::Dying);
//! life.mark_dead(false);
//! assert_eq!(life, LifecycleState::Dead);
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LifecycleState {
    #[default]
    Alive,
    /// Playing a death effect, still updated but no longer collides
    Dying,
    /// Ready to be removed by cleanup
    Dead,
}

impl LifecycleState {
    /// Advances toward `Dead`. `immediate` skips the dying phase.
    pub fn mark_dead(&mut self, immediate: bool) {
        *self = match self {
            LifecycleState::Dead => LifecycleState::Dead,
            _ if immediate => LifecycleState::Dead,
            LifecycleState::Alive => LifecycleState::Dying,
            LifecycleState::Dying => LifecycleState::Dead,
        };
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, LifecycleState::Alive)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, LifecycleState::Dead)
    }
}

/// Ordered from most to least interactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum InteractionState {
    #[default]
    Default,
    /// Collides but ignores damage
    Invincible,
    /// Skips collision checks entirely
    Intangible,
    /// Hitbox disabled
    ClipThrough,
}

impl InteractionState {
    pub fn allows_damage(&self) -> bool {
        *self == InteractionState::Default
    }

    pub fn checks_collision(&self) -> bool {
        *self < InteractionState::Intangible
    }

    pub fn hitbox_active(&self) -> bool {
        *self < InteractionState::ClipThrough
    }
}
