//! Entity categories and collision tags

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Broad grouping used by the spawner and the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Player,
    Enemy,
    Projectile,
    Pickup,
    Obstacle,
    Hazard,
    Environment,
    Particle,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Player => "player",
            EntityCategory::Enemy => "enemy",
            EntityCategory::Projectile => "projectile",
            EntityCategory::Pickup => "pickup",
            EntityCategory::Obstacle => "obstacle",
            EntityCategory::Hazard => "hazard",
            EntityCategory::Environment => "environment",
            EntityCategory::Particle => "particle",
        }
    }
}

/// Collision tag, matched against the rule table in `collision::rules`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionTag {
    Neutral,
    Player,
    PlayerBullet,
    Enemy,
    EnemyBullet,
    Pickup,
    Hazard,
    Environment,
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletOwner {
    Player,
    Enemy,
}

impl BulletOwner {
    /// The `{owner}_bullet` tag
    pub fn bullet_tag(&self) -> CollisionTag {
        match self {
            BulletOwner::Player => CollisionTag::PlayerBullet,
            BulletOwner::Enemy => CollisionTag::EnemyBullet,
        }
    }
}

/// Screen edge an entity or formation enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub fn parse(name: &str) -> Option<SpawnEdge> {
        match name {
            "top" => Some(SpawnEdge::Top),
            "bottom" => Some(SpawnEdge::Bottom),
            "left" => Some(SpawnEdge::Left),
            "right" => Some(SpawnEdge::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnEdge::Top => "top",
            SpawnEdge::Bottom => "bottom",
            SpawnEdge::Left => "left",
            SpawnEdge::Right => "right",
        }
    }

    /// Unit direction pointing into the screen
    pub fn inward(&self) -> Vec2 {
        match self {
            SpawnEdge::Top => Vec2::Y,
            SpawnEdge::Bottom => Vec2::NEG_Y,
            SpawnEdge::Left => Vec2::X,
            SpawnEdge::Right => Vec2::NEG_X,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, SpawnEdge::Top | SpawnEdge::Bottom)
    }
}
