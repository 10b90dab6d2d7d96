//! Multi-part boss
//!
//! The boss flies down to `home_y` and then sweeps from side to side while
//! [`AttackManager`] runs its attack patterns. Its gun parts are extra
//! hitboxes with their own health. The body stays `Invincible` until every
//! part is down.

use super::boss_attack::{AttackInput, AttackKind, AttackManager, AttackOutput, GunOrder, MotionOrder};
use crate::bullet::BulletRequest;
use crate::collision::hitbox::CollisionHitbox;
use crate::collision::shapes::Aabb;
use crate::config::bounds::ENEMY_DAMAGE_MARGIN;
use crate::config::layers;
use crate::entity::{
    Beam, BulletOwner, CollisionTag, Contact, EntityCategory, EntityCore, GameEntity,
    InteractionState, SpawnParams, UpdateContext,
};
use crate::events::{EventManager, GameEvent};
use crate::stats::Health;
use glam::Vec2;
use log::{info, warn};

pub const BOSS_SIZE: Vec2 = Vec2::new(240.0, 160.0);
pub const PART_SIZE: Vec2 = Vec2::new(44.0, 44.0);
pub const BODY_HEALTH: f32 = 500.0;
pub const PART_HEALTH: f32 = 40.0;
pub const BOSS_EXP: u32 = 1000;
pub const HOME_Y: f32 = 150.0;
const ENTRY_SPEED: f32 = 100.0;
const SWEEP_SPEED: f32 = 120.0;
/// Gun swing either side of straight down, degrees
pub const GUN_ARC: f32 = 30.0;
/// Degrees per second
const GUN_TURN_RATE: f32 = 90.0;
const GUN_SWEEP_RATE: f32 = 45.0;
const GUN_RELAX: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    Entering,
    Sweeping,
}

#[derive(Debug, Clone)]
pub struct BossPart {
    pub name: &'static str,
    /// Part center relative to the body center
    pub offset: Vec2,
    pub health: Health,
    /// Degrees from straight down, positive toward +x
    pub aim: f32,
    sweep_dir: f32,
    fire_timer: f32,
    interval: f32,
    bullet_speed: f32,
}

impl BossPart {
    fn new(name: &'static str, offset: Vec2, health: f32, params: &SpawnParams, stagger: f32) -> Self {
        BossPart {
            name,
            offset,
            health: Health::new(health),
            aim: 0.0,
            sweep_dir: if offset.x < 0.0 { 1.0 } else { -1.0 },
            fire_timer: stagger,
            interval: params.f32_or("shoot_interval", 0.25),
            bullet_speed: params.f32_or("bullet_speed", 300.0),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn barrel(&self) -> Vec2 {
        let (sin, cos) = self.aim.to_radians().sin_cos();
        Vec2::new(sin, cos)
    }

    fn turn(&mut self, dt: f32, order: GunOrder, muzzle: Vec2, player: Option<Vec2>) {
        match order {
            GunOrder::Relax => self.aim *= GUN_RELAX,
            GunOrder::Track => {
                let Some(player) = player else {
                    self.aim *= GUN_RELAX;
                    return;
                };
                let to_player = player - muzzle;
                let target = to_player.x.atan2(to_player.y).to_degrees().clamp(-GUN_ARC, GUN_ARC);
                let step = GUN_TURN_RATE * dt;
                self.aim += (target - self.aim).clamp(-step, step);
            }
            GunOrder::Sweep => {
                self.aim += self.sweep_dir * GUN_SWEEP_RATE * dt;
                if self.aim >= GUN_ARC {
                    self.aim = GUN_ARC;
                    self.sweep_dir = -1.0;
                } else if self.aim <= -GUN_ARC {
                    self.aim = -GUN_ARC;
                    self.sweep_dir = 1.0;
                }
            }
        }
    }

    fn fire(&mut self, dt: f32, interval: f32, speed: f32, muzzle: Vec2) -> Option<BulletRequest> {
        self.fire_timer += dt;
        if interval <= 0.0 || self.fire_timer < interval {
            return None;
        }
        self.fire_timer = 0.0;
        let mut request = BulletRequest::new(muzzle, self.barrel() * speed, BulletOwner::Enemy).with_damage(1.0);
        request.color = Some((255, 90, 90));
        request.radius = Some(7.0);
        Some(request)
    }
}

fn attacks_from_params(params: &SpawnParams) -> Vec<AttackKind> {
    let Some(list) = params.get("attacks").and_then(|v| v.as_array()) else {
        return AttackKind::ALL.to_vec();
    };
    list.iter()
        .filter_map(|v| {
            let name = v.as_str()?;
            let kind = AttackKind::parse(name);
            if kind.is_none() {
                warn!("Unknown boss attack '{}'", name);
            }
            kind
        })
        .collect()
}

pub struct Boss {
    core: EntityCore,
    health: Health,
    parts: Vec<BossPart>,
    phase: BossPhase,
    home_y: f32,
    sweep_dir: f32,
    exp: u32,
    attacks: AttackManager,
    beam: Option<Beam>,
}

impl Boss {
    pub fn new(pos: Vec2, params: &SpawnParams) -> Self {
        let mut core = EntityCore::new(
            EntityCategory::Enemy,
            CollisionTag::Enemy,
            layers::ENEMIES,
            pos,
            BOSS_SIZE,
            CollisionHitbox::rect_scaled(0.8),
        );
        core.interaction = InteractionState::Invincible;

        let part_health = params.f32_or("part_health", PART_HEALTH);
        let parts = vec![
            BossPart::new("left_gun", Vec2::new(-90.0, 50.0), part_health, params, 0.0),
            BossPart::new("right_gun", Vec2::new(90.0, 50.0), part_health, params, 0.1),
        ];

        Boss {
            core,
            health: Health::new(params.f32_or("health", BODY_HEALTH)),
            parts,
            phase: BossPhase::Entering,
            home_y: params.f32_or("home_y", HOME_Y),
            sweep_dir: 1.0,
            exp: params.f32_or("exp", BOSS_EXP as f32).max(0.0) as u32,
            attacks: AttackManager::new(attacks_from_params(params)),
            beam: None,
        }
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn parts(&self) -> &[BossPart] {
        &self.parts
    }

    #[cfg(test)]
    pub fn attacks(&self) -> &AttackManager {
        &self.attacks
    }

    pub fn parts_remaining(&self) -> usize {
        self.parts.iter().filter(|p| p.is_alive()).count()
    }

    fn part_rect(&self, part: &BossPart) -> Aabb {
        Aabb::from_center(self.core.center() + part.offset, PART_SIZE)
    }

    fn damage_part(&mut self, index: usize, amount: f32) {
        let Some(part) = self.parts.get_mut(index) else {
            return;
        };
        if !part.is_alive() {
            return;
        }
        if part.health.take_damage(amount).is_fatal {
            info!("Boss part {} destroyed", part.name);
            if self.parts_remaining() == 0 {
                info!("Boss body exposed");
                self.core.interaction = InteractionState::Default;
            }
        }
    }

    fn damage_body(&mut self, amount: f32, events: &mut EventManager) {
        if !self.core.interaction.allows_damage() {
            return;
        }
        if self.health.take_damage(amount).is_fatal {
            self.core.mark_dead(true);
            self.beam = None;
            info!("Boss defeated");
            events.extend(self.attacks.abort());
            events.publish(GameEvent::EnemyDied {
                position: self.core.center(),
                type_tag: "boss".to_string(),
                exp: self.exp_value(),
            });
            events.publish(GameEvent::BossDefeated);
        }
    }

    fn x_bounds(&self, screen: Vec2) -> (f32, f32) {
        let min_x = ENEMY_DAMAGE_MARGIN + 10.0;
        let max_x = (screen.x - ENEMY_DAMAGE_MARGIN - 10.0 - self.core.size.x).max(min_x);
        (min_x, max_x)
    }

    fn sweep(&mut self, dt: f32, screen: Vec2) {
        let (min_x, max_x) = self.x_bounds(screen);
        self.core.velocity = Vec2::new(self.sweep_dir * SWEEP_SPEED, 0.0);
        self.core.pos.x += self.core.velocity.x * dt;
        if self.core.pos.x <= min_x {
            self.core.pos.x = min_x;
            self.sweep_dir = 1.0;
        } else if self.core.pos.x >= max_x {
            self.core.pos.x = max_x;
            self.sweep_dir = -1.0;
        }
    }

    fn apply_motion(&mut self, dt: f32, motion: MotionOrder, screen: Vec2) {
        match motion {
            MotionOrder::Free => self.sweep(dt, screen),
            MotionOrder::Velocity(velocity) => {
                let (min_x, max_x) = self.x_bounds(screen);
                self.core.velocity = velocity;
                self.core.pos += velocity * dt;
                self.core.pos.x = self.core.pos.x.clamp(min_x, max_x);
            }
            MotionOrder::Place(center) => {
                self.core.velocity = if dt > 0.0 {
                    (center - self.core.center()) / dt
                } else {
                    Vec2::ZERO
                };
                self.core.set_center(center);
            }
        }
    }

    fn run_guns(&mut self, dt: f32, orders: &AttackOutput, ctx: &mut UpdateContext) {
        let center = self.core.center();
        for part in self.parts.iter_mut().filter(|p| p.is_alive()) {
            let muzzle = center + part.offset;
            part.turn(dt, orders.guns, muzzle, ctx.player_center);
            let rate = match orders.fire {
                Some(fire) => Some((fire.interval, fire.bullet_speed)),
                None if orders.fire_default => Some((part.interval, part.bullet_speed)),
                None => None,
            };
            if let Some((interval, speed)) = rate {
                if let Some(request) = part.fire(dt, interval, speed, muzzle) {
                    ctx.bullets.push(request);
                }
            }
        }
    }

    fn fight(&mut self, dt: f32, ctx: &mut UpdateContext) {
        let input = AttackInput {
            center: self.core.center(),
            home: Vec2::new(self.core.center().x, self.home_y),
            size: self.core.size,
            screen: ctx.screen,
            player: ctx.player_center,
            health_fraction: self.health.percentage(),
        };
        let mut orders = self.attacks.update(dt, &input);
        self.apply_motion(dt, orders.motion, ctx.screen);
        self.run_guns(dt, &orders, ctx);
        self.beam = orders.beam;
        ctx.events.append(&mut orders.events);
    }
}

impl GameEntity for Boss {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "boss"
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        if !self.core.is_alive() {
            return;
        }
        match self.phase {
            BossPhase::Entering => {
                self.core.velocity = Vec2::new(0.0, ENTRY_SPEED);
                self.core.pos.y += ENTRY_SPEED * dt;
                if self.core.center().y >= self.home_y {
                    let x = self.core.center().x;
                    self.core.set_center(Vec2::new(x, self.home_y));
                    self.phase = BossPhase::Sweeping;
                }
            }
            BossPhase::Sweeping => self.fight(dt, ctx),
        }
        self.core.sync_hitbox();
    }

    fn on_collision(&mut self, contact: &Contact, events: &mut EventManager) {
        if contact.other.tag != CollisionTag::PlayerBullet || self.phase == BossPhase::Entering {
            return;
        }
        match contact.part {
            0 => self.damage_body(contact.other.damage, events),
            part => self.damage_part(part - 1, contact.other.damage),
        }
    }

    fn contact_damage(&self) -> f32 {
        super::CONTACT_DAMAGE
    }

    fn exp_value(&self) -> u32 {
        self.exp
    }

    fn health_fraction(&self) -> Option<f32> {
        Some(self.health.percentage())
    }

    fn extra_hitboxes(&self) -> Vec<(usize, Aabb)> {
        self.parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.is_alive())
            .map(|(i, part)| (i + 1, self.part_rect(part)))
            .collect()
    }

    fn reset_from(&mut self, pos: Vec2, params: &SpawnParams) {
        let id = self.core.id;
        *self = Boss::new(pos, params);
        self.core.id = id;
    }

    fn beams(&self) -> Vec<Beam> {
        self.beam.into_iter().collect()
    }

    fn color(&self) -> (u8, u8, u8) {
        if self.core.interaction.allows_damage() {
            (255, 70, 70)
        } else {
            (150, 150, 170)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CollisionInfo;
    use serde_json::json;

    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);
    const PLAYER: Vec2 = Vec2::new(640.0, 650.0);

    fn hit(part: usize, damage: f32) -> Contact {
        Contact {
            other: CollisionInfo {
                id: 0,
                tag: CollisionTag::PlayerBullet,
                category: EntityCategory::Projectile,
                center: Vec2::ZERO,
                damage,
            },
            part,
        }
    }

    fn boss_with(attacks: &[&str]) -> Boss {
        let params = SpawnParams::new().with("attacks", json!(attacks));
        Boss::new(Vec2::new(520.0, -100.0), &params)
    }

    /// Drives the boss down to its home row and no further
    fn at_home(mut boss: Boss) -> Boss {
        let mut ctx = UpdateContext::new(SCREEN, None);
        while boss.phase() == BossPhase::Entering {
            boss.update(0.1, &mut ctx);
        }
        boss
    }

    fn boss_at_home() -> Boss {
        at_home(boss_with(&["trace"]))
    }

    /// Runs `seconds` of 60 Hz updates and returns every bullet and event
    fn run(boss: &mut Boss, seconds: f32, player: Option<Vec2>) -> (Vec<BulletRequest>, Vec<GameEvent>) {
        let mut bullets = Vec::new();
        let mut events = Vec::new();
        for _ in 0..(seconds * 60.0) as usize {
            let mut ctx = UpdateContext::new(SCREEN, player);
            boss.update(1.0 / 60.0, &mut ctx);
            bullets.append(&mut ctx.bullets);
            events.append(&mut ctx.events);
        }
        (bullets, events)
    }

    #[test]
    fn test_enters_to_home_then_sweeps() {
        let boss = boss_at_home();
        assert_eq!(boss.phase(), BossPhase::Sweeping);
        assert_eq!(boss.core().center().y, HOME_Y);
    }

    #[test]
    fn test_body_invincible_until_parts_destroyed() {
        let mut boss = boss_at_home();
        let mut events = EventManager::new();

        boss.on_collision(&hit(0, 1000.0), &mut events);
        assert!(boss.core().is_alive());
        assert_eq!(boss.health().current(), BODY_HEALTH);

        boss.on_collision(&hit(1, PART_HEALTH), &mut events);
        assert_eq!(boss.parts_remaining(), 1);
        assert_eq!(boss.extra_hitboxes().len(), 1);
        assert_eq!(boss.core().interaction, InteractionState::Invincible);

        boss.on_collision(&hit(2, PART_HEALTH), &mut events);
        assert_eq!(boss.core().interaction, InteractionState::Default);

        boss.on_collision(&hit(0, BODY_HEALTH), &mut events);
        assert!(boss.core().lifecycle.is_dead());
        let dispatched = events.dispatch();
        assert!(dispatched.contains(&GameEvent::BossDefeated));
        assert!(dispatched.iter().any(|e| matches!(
            e,
            GameEvent::EnemyDied { exp: BOSS_EXP, .. }
        )));
    }

    #[test]
    fn test_guns_hold_fire_while_idle() {
        let mut boss = boss_at_home();
        let (bullets, _) = run(&mut boss, 2.0, Some(PLAYER));
        assert!(bullets.is_empty());
        assert!(!boss.attacks().is_attacking());
    }

    #[test]
    fn test_trace_guns_turn_toward_player_and_fire() {
        let mut boss = boss_at_home();
        // 3 s cooldown at full health, then 1 s before the first burst
        let (bullets, _) = run(&mut boss, 5.0, Some(Vec2::new(1200.0, 650.0)));

        assert_eq!(boss.attacks().current(), Some(AttackKind::Trace));
        assert!(!bullets.is_empty());
        for part in boss.parts() {
            assert!(part.aim > 0.0 && part.aim <= GUN_ARC);
        }
        assert!(bullets.iter().all(|b| b.vel.x > 0.0 && b.vel.y > 0.0));
    }

    #[test]
    fn test_spray_sweeps_across_the_arc() {
        let mut boss = at_home(boss_with(&["spray"]));
        let (bullets, _) = run(&mut boss, 7.5, None);

        assert!(bullets.iter().any(|b| b.vel.x < -1.0));
        assert!(bullets.iter().any(|b| b.vel.x > 1.0));
        let limit = GUN_ARC.to_radians().sin() * 300.0 + 0.01;
        assert!(bullets.iter().all(|b| b.vel.x.abs() <= limit));
    }

    #[test]
    fn test_charge_leaves_the_screen_and_pauses_waves() {
        let mut boss = at_home(boss_with(&["charge"]));
        let mut lowest = f32::MIN;
        let mut events = Vec::new();
        for _ in 0..60 * 20 {
            let mut ctx = UpdateContext::new(SCREEN, Some(PLAYER));
            boss.update(1.0 / 60.0, &mut ctx);
            lowest = lowest.max(boss.core().center().y);
            events.append(&mut ctx.events);
        }

        assert!(lowest >= SCREEN.y);
        assert!(events.contains(&GameEvent::SpawnPause { paused: true }));
        assert!(events.contains(&GameEvent::SpawnPause { paused: false }));
    }

    #[test]
    fn test_killed_mid_charge_resumes_waves() {
        let mut boss = at_home(boss_with(&["charge"]));
        run(&mut boss, 3.5, Some(PLAYER));
        assert_eq!(boss.attacks().current(), Some(AttackKind::Charge));

        let mut events = EventManager::new();
        boss.on_collision(&hit(1, PART_HEALTH), &mut events);
        boss.on_collision(&hit(2, PART_HEALTH), &mut events);
        boss.on_collision(&hit(0, BODY_HEALTH), &mut events);

        let dispatched = events.dispatch();
        assert!(dispatched.contains(&GameEvent::SpawnPause { paused: false }));
        assert!(dispatched.contains(&GameEvent::BossDefeated));
    }

    #[test]
    fn test_artillery_beam_is_drawn_and_hits_once() {
        let mut boss = at_home(boss_with(&["artillery"]));
        let (_, events) = run(&mut boss, 3.5, Some(PLAYER));
        assert!(!boss.beams().is_empty());

        let (_, more) = run(&mut boss, 3.0, Some(PLAYER));
        let hits = events
            .iter()
            .chain(more.iter())
            .filter(|e| matches!(e, GameEvent::BeamHit { .. }))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_unknown_attack_names_are_skipped() {
        let boss = boss_with(&["trace", "laser"]);
        assert_eq!(boss.attacks().enabled(), &[AttackKind::Trace]);
        assert_eq!(Boss::new(Vec2::ZERO, &SpawnParams::new()).attacks().enabled().len(), 4);
    }

    #[test]
    fn test_sweep_stays_inside_damage_region() {
        let mut boss = at_home(boss_with(&["spray"]));
        let mut ctx = UpdateContext::new(SCREEN, None);
        for _ in 0..200 {
            boss.update(0.1, &mut ctx);
            assert!(boss.core().is_inside_screen(SCREEN, ENEMY_DAMAGE_MARGIN));
        }
    }
}
