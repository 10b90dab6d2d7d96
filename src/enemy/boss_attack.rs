//! Boss attack patterns
//!
//! [`AttackManager`] cycles `Idle → Attacking → Idle`. The idle cooldown
//! shrinks as the boss loses health: `1 + 2 × health fraction` seconds.
//!
//! Attacks never touch the boss. Each tick they read an [`AttackInput`] and
//! return an [`AttackOutput`]: how the guns turn, whether they fire, who moves
//! the body, and the beam to draw or resolve.
//!
//! | Attack    | Guns                     | Body                         |
//! |-----------|--------------------------|------------------------------|
//! | Trace     | track the player, bursts | free                         |
//! | Spray     | sweep the arc, fire      | strafes left slowly          |
//! | Charge    | hold                     | dives off screen, four times |
//! | Artillery | hold                     | free, fires a tracking beam  |

use crate::entity::Beam;
use crate::events::GameEvent;
use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const TRACE_IDLE_START: f32 = 1.0;
const TRACE_BURST: f32 = 1.0;
const TRACE_PAUSE: f32 = 1.0;
const TRACE_BURSTS: u32 = 5;
const TRACE_IDLE_END: f32 = 1.0;
const TRACE_INTERVAL: f32 = 0.12;
const TRACE_BULLET_SPEED: f32 = 450.0;

const SPRAY_DURATION: f32 = 5.0;
const SPRAY_STRAFE_SPEED: f32 = 10.0;

const CHARGE_REV_UP: f32 = 1.0;
const CHARGE_PAUSE: f32 = 1.0;
const CHARGE_WARN: f32 = 0.5;
const CHARGE_SPEED: f32 = 1000.0;
const CHARGE_RETURN_SPEED: f32 = 100.0;
const CHARGE_COUNT: u32 = 4;
const CHARGE_DURATION: f32 = 15.0;
const CHARGE_ARRIVE_DISTANCE: f32 = 10.0;

const ARTILLERY_TRACK: f32 = 1.5;
const ARTILLERY_CHARGE: f32 = 0.5;
const ARTILLERY_FIRE: f32 = 0.3;
const ARTILLERY_COOLDOWN: f32 = 0.2;
/// Degrees per second
const ARTILLERY_TURN_RATE: f32 = 120.0;
pub const BEAM_RANGE: f32 = 800.0;
pub const BEAM_DAMAGE: f32 = 1.0;
const AIM_LASER_WIDTH: f32 = 2.0;
const BEAM_WIDTH: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    Trace,
    Spray,
    Charge,
    Artillery,
}

impl AttackKind {
    pub const ALL: [AttackKind; 4] = [
        AttackKind::Trace,
        AttackKind::Spray,
        AttackKind::Charge,
        AttackKind::Artillery,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "trace" => Some(AttackKind::Trace),
            "spray" => Some(AttackKind::Spray),
            "charge" => Some(AttackKind::Charge),
            "artillery" => Some(AttackKind::Artillery),
            _ => None,
        }
    }
}

/// How the gun parts turn this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GunOrder {
    /// Ease back toward straight down
    #[default]
    Relax,
    /// Turn toward the player
    Track,
    /// Swing back and forth across the arc
    Sweep,
}

/// Fire rate override for the guns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub interval: f32,
    pub bullet_speed: f32,
}

/// Who moves the body this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotionOrder {
    /// The boss's own side-to-side sweep
    #[default]
    Free,
    Velocity(Vec2),
    /// The attack sets the body center directly
    Place(Vec2),
}

/// What an attack needs to know about the boss and the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackInput {
    pub center: Vec2,
    pub home: Vec2,
    pub size: Vec2,
    pub screen: Vec2,
    pub player: Option<Vec2>,
    /// Boss body health, 0 to 1
    pub health_fraction: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttackOutput {
    pub guns: GunOrder,
    /// `None` holds fire
    pub fire: Option<FireOrder>,
    /// Use the guns' configured rate instead of an override
    pub fire_default: bool,
    pub motion: MotionOrder,
    pub beam: Option<Beam>,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChargePhase {
    RevUp,
    Dive,
    TrackPlayer,
    Warn,
    Return,
}

#[derive(Debug, Clone, PartialEq)]
struct Charge {
    phase: ChargePhase,
    phase_timer: f32,
    charges: u32,
    going_down: bool,
    center: Vec2,
}

impl Charge {
    fn new(center: Vec2) -> Self {
        Charge {
            phase: ChargePhase::RevUp,
            phase_timer: 0.0,
            charges: 0,
            going_down: true,
            center,
        }
    }

    fn enter(&mut self, phase: ChargePhase) {
        self.phase = phase;
        self.phase_timer = 0.0;
    }

    /// Returns true when back home
    fn update(&mut self, dt: f32, input: &AttackInput) -> bool {
        self.phase_timer += dt;
        let bottom = input.screen.y + input.size.y / 2.0;
        let top = -input.size.y / 2.0;
        match self.phase {
            ChargePhase::RevUp => {
                if self.phase_timer >= CHARGE_REV_UP {
                    self.enter(ChargePhase::Dive);
                }
            }
            ChargePhase::Dive => {
                let step = CHARGE_SPEED * dt;
                let arrived = if self.going_down {
                    self.center.y = (self.center.y + step).min(bottom);
                    self.center.y >= bottom
                } else {
                    self.center.y = (self.center.y - step).max(top);
                    self.center.y <= top
                };
                if arrived {
                    self.charges += 1;
                    if self.charges >= CHARGE_COUNT {
                        self.enter(ChargePhase::Return);
                    } else {
                        self.enter(ChargePhase::TrackPlayer);
                    }
                }
            }
            ChargePhase::TrackPlayer => {
                if let Some(player) = input.player {
                    self.center.x = player.x;
                }
                if self.phase_timer >= CHARGE_PAUSE {
                    self.enter(ChargePhase::Warn);
                }
            }
            ChargePhase::Warn => {
                if self.phase_timer >= CHARGE_WARN {
                    self.going_down = !self.going_down;
                    self.enter(ChargePhase::Dive);
                }
            }
            ChargePhase::Return => {
                let to_home = input.home - self.center;
                let distance = to_home.length();
                if distance < CHARGE_ARRIVE_DISTANCE {
                    self.center = input.home;
                    return true;
                }
                self.center += to_home / distance * (CHARGE_RETURN_SPEED * dt).min(distance);
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArtilleryPhase {
    Tracking,
    Charging,
    Firing { hit_sent: bool },
    Cooldown,
}

#[derive(Debug, Clone, PartialEq)]
struct Artillery {
    phase: ArtilleryPhase,
    phase_timer: f32,
    /// Radians, y down; `FRAC_PI_2` points straight down
    angle: f32,
}

impl Artillery {
    fn new() -> Self {
        Artillery {
            phase: ArtilleryPhase::Tracking,
            phase_timer: 0.0,
            angle: std::f32::consts::FRAC_PI_2,
        }
    }

    fn muzzle(input: &AttackInput) -> Vec2 {
        input.center + Vec2::new(0.0, input.size.y / 2.0)
    }

    fn beam(&self, input: &AttackInput, width: f32, damage: f32) -> Beam {
        Beam {
            origin: Self::muzzle(input),
            direction: Vec2::from_angle(self.angle),
            range: BEAM_RANGE,
            width,
            damage,
        }
    }

    fn enter(&mut self, phase: ArtilleryPhase) {
        self.phase = phase;
        self.phase_timer = 0.0;
    }

    /// Returns true when finished
    fn update(&mut self, dt: f32, input: &AttackInput, out: &mut AttackOutput) -> bool {
        self.phase_timer += dt;
        match self.phase {
            ArtilleryPhase::Tracking => {
                if let Some(player) = input.player {
                    let to_player = player - Self::muzzle(input);
                    if to_player != Vec2::ZERO {
                        let target = to_player.y.atan2(to_player.x);
                        self.angle = rotate_toward(self.angle, target, ARTILLERY_TURN_RATE.to_radians() * dt);
                    }
                }
                out.beam = Some(self.beam(input, AIM_LASER_WIDTH, 0.0));
                if self.phase_timer >= ARTILLERY_TRACK {
                    self.enter(ArtilleryPhase::Charging);
                }
            }
            ArtilleryPhase::Charging => {
                let pulse = (self.phase_timer * 15.0).sin().abs();
                out.beam = Some(self.beam(input, AIM_LASER_WIDTH + pulse * 4.0, 0.0));
                if self.phase_timer >= ARTILLERY_CHARGE {
                    self.enter(ArtilleryPhase::Firing { hit_sent: false });
                }
            }
            ArtilleryPhase::Firing { hit_sent } => {
                let beam = self.beam(input, BEAM_WIDTH, BEAM_DAMAGE);
                // One hit per shot
                if !hit_sent {
                    out.events.push(GameEvent::BeamHit {
                        start: beam.origin,
                        end: beam.end(),
                        width: beam.width,
                        damage: beam.damage,
                    });
                    self.phase = ArtilleryPhase::Firing { hit_sent: true };
                }
                out.beam = Some(beam);
                if self.phase_timer >= ARTILLERY_FIRE {
                    self.enter(ArtilleryPhase::Cooldown);
                }
            }
            ArtilleryPhase::Cooldown => return self.phase_timer >= ARTILLERY_COOLDOWN,
        }
        false
    }
}

/// Steps `current` toward `target` by at most `max_step`, the short way round
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    let diff = (target - current + std::f32::consts::PI).rem_euclid(tau) - std::f32::consts::PI;
    if diff.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(diff)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ActiveAttack {
    Trace,
    Spray,
    Charge(Charge),
    Artillery(Artillery),
}

#[derive(Debug, Clone, PartialEq)]
struct Attack {
    active: ActiveAttack,
    timer: f32,
}

impl Attack {
    fn start(kind: AttackKind, input: &AttackInput, out: &mut AttackOutput) -> Self {
        let active = match kind {
            AttackKind::Trace => ActiveAttack::Trace,
            AttackKind::Spray => ActiveAttack::Spray,
            AttackKind::Charge => {
                // The dives sweep the whole screen, so waves hold off
                out.events.push(GameEvent::SpawnPause { paused: true });
                ActiveAttack::Charge(Charge::new(input.center))
            }
            AttackKind::Artillery => ActiveAttack::Artillery(Artillery::new()),
        };
        Attack { active, timer: 0.0 }
    }

    fn kind(&self) -> AttackKind {
        match self.active {
            ActiveAttack::Trace => AttackKind::Trace,
            ActiveAttack::Spray => AttackKind::Spray,
            ActiveAttack::Charge(_) => AttackKind::Charge,
            ActiveAttack::Artillery(_) => AttackKind::Artillery,
        }
    }

    /// Returns true when the attack is over
    fn update(&mut self, dt: f32, input: &AttackInput, out: &mut AttackOutput) -> bool {
        self.timer += dt;
        match &mut self.active {
            ActiveAttack::Trace => {
                out.guns = GunOrder::Track;
                let cycle = TRACE_BURST + TRACE_PAUSE;
                let bursts = self.timer - TRACE_IDLE_START;
                if bursts >= 0.0 && bursts < cycle * TRACE_BURSTS as f32 && bursts % cycle < TRACE_BURST {
                    out.fire = Some(FireOrder {
                        interval: TRACE_INTERVAL,
                        bullet_speed: TRACE_BULLET_SPEED,
                    });
                }
                self.timer >= TRACE_IDLE_START + cycle * TRACE_BURSTS as f32 + TRACE_IDLE_END
            }
            ActiveAttack::Spray => {
                out.guns = GunOrder::Sweep;
                out.fire_default = true;
                out.motion = MotionOrder::Velocity(Vec2::new(-SPRAY_STRAFE_SPEED, 0.0));
                self.timer >= SPRAY_DURATION
            }
            ActiveAttack::Charge(charge) => {
                let home = charge.update(dt, input);
                let timed_out = self.timer >= CHARGE_DURATION;
                out.motion = MotionOrder::Place(if timed_out { input.home } else { charge.center });
                home || timed_out
            }
            ActiveAttack::Artillery(artillery) => artillery.update(dt, input, out),
        }
    }

    /// Events to publish when the attack ends, finished or not
    fn finish_events(&self) -> Vec<GameEvent> {
        match self.active {
            ActiveAttack::Charge(_) => vec![GameEvent::SpawnPause { paused: false }],
            _ => Vec::new(),
        }
    }
}

pub struct AttackManager {
    enabled: Vec<AttackKind>,
    idle_timer: f32,
    current: Option<Attack>,
    rng: StdRng,
}

impl AttackManager {
    pub fn new(enabled: Vec<AttackKind>) -> Self {
        AttackManager {
            enabled,
            idle_timer: 0.0,
            current: None,
            rng: StdRng::from_entropy(),
        }
    }

    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[cfg(test)]
    pub fn enabled(&self) -> &[AttackKind] {
        &self.enabled
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<AttackKind> {
        self.current.as_ref().map(Attack::kind)
    }

    #[cfg(test)]
    pub fn is_attacking(&self) -> bool {
        self.current.is_some()
    }

    /// Idle time before the next attack
    pub fn cooldown(health_fraction: f32) -> f32 {
        1.0 + 2.0 * health_fraction.clamp(0.0, 1.0)
    }

    pub fn update(&mut self, dt: f32, input: &AttackInput) -> AttackOutput {
        let mut out = AttackOutput::default();
        match self.current.as_mut() {
            Some(attack) => {
                if attack.update(dt, input, &mut out) {
                    out.events.extend(attack.finish_events());
                    debug!("Boss attack {:?} finished", attack.kind());
                    self.current = None;
                    self.idle_timer = 0.0;
                }
            }
            None => {
                self.idle_timer += dt;
                if self.idle_timer >= Self::cooldown(input.health_fraction) {
                    if let Some(&kind) = self.enabled.choose(&mut self.rng) {
                        debug!("Boss attack {:?} started", kind);
                        self.current = Some(Attack::start(kind, input, &mut out));
                        self.idle_timer = 0.0;
                    }
                }
            }
        }
        out
    }

    /// Ends the running attack early, e.g. when the boss dies
    pub fn abort(&mut self) -> Vec<GameEvent> {
        self.current
            .take()
            .map(|attack| attack.finish_events())
            .unwrap_or_default()
    }
}
