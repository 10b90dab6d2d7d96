//! Which collision tags interact
//!
//! Rules are symmetric: listing `(Player, Enemy)` also covers
//! `(Enemy, Player)`.

use crate::entity::CollisionTag;

const RULES: &[(CollisionTag, CollisionTag)] = &[
    (CollisionTag::Player, CollisionTag::Enemy),
    (CollisionTag::Player, CollisionTag::Pickup),
    (CollisionTag::PlayerBullet, CollisionTag::Enemy),
    (CollisionTag::EnemyBullet, CollisionTag::Player),
    (CollisionTag::PlayerBullet, CollisionTag::EnemyBullet),
    (CollisionTag::Player, CollisionTag::Hazard),
];

pub fn should_collide(a: CollisionTag, b: CollisionTag) -> bool {
    RULES
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_are_symmetric() {
        assert!(should_collide(CollisionTag::Player, CollisionTag::Enemy));
        assert!(should_collide(CollisionTag::Enemy, CollisionTag::Player));
        assert!(should_collide(CollisionTag::EnemyBullet, CollisionTag::PlayerBullet));
    }

    #[test]
    fn test_unlisted_pairs_do_not_collide() {
        assert!(!should_collide(CollisionTag::Enemy, CollisionTag::Enemy));
        assert!(!should_collide(CollisionTag::PlayerBullet, CollisionTag::Player));
        assert!(!should_collide(CollisionTag::EnemyBullet, CollisionTag::Enemy));
        assert!(!should_collide(CollisionTag::Neutral, CollisionTag::Player));
    }
}
