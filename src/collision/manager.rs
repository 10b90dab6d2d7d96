//! Broad-phase and narrow-phase collision detection
//!
//! # Algorithm
//!
//! 1. Gather one [`ColliderView`] per active hitbox, skipping entities that are
//!    not alive, not collidable, or too far off the screen.
//! 2. Insert every view into each spatial-hash cell it overlaps. The cell size
//!    adapts to the number of views.
//! 3. For each view, look at the 3x3 block of neighbouring cells. Each pair is
//!    tested at most once, and only if the tag rules allow it.
//! 4. Narrow phase: AABB, or SAT when either hitbox is rotated.
//!
//! [`CollisionManager::resolve`] then calls `on_collision` on both sides with a
//! snapshot of the other. When one of an entity's parts overlaps something,
//! the main hitbox behind it does not also report that contact.

use super::rules::should_collide;
use super::shapes::{aabb_intersect, sat_intersect, Aabb, Obb};
use crate::config::bounds::COLLISION_CULL_MARGIN;
use crate::entity::{CollisionTag, Contact, EntityId, GameEntity};
use crate::events::EventManager;
use log::debug;
use std::collections::{HashMap, HashSet};

pub const BASE_CELL_SIZE: f32 = 64.0;
pub const DENSE_CELL_SIZE: f32 = 48.0;
pub const SPARSE_CELL_SIZE: f32 = 96.0;
const DENSE_THRESHOLD: usize = 800;
const SPARSE_THRESHOLD: usize = 100;

/// One hitbox taking part in detection
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderView {
    pub id: EntityId,
    /// Index of the owning entity in the caller's slice
    pub owner: usize,
    pub part: usize,
    pub tag: CollisionTag,
    pub rect: Aabb,
    pub rotation: f32,
}

impl ColliderView {
    fn overlaps(&self, other: &ColliderView) -> bool {
        if self.rotation == 0.0 && other.rotation == 0.0 {
            aabb_intersect(&self.rect, &other.rect)
        } else {
            sat_intersect(
                &Obb::from_aabb(&self.rect, self.rotation),
                &Obb::from_aabb(&other.rect, other.rotation),
            )
        }
    }
}

pub fn cell_size_for(count: usize) -> f32 {
    if count > DENSE_THRESHOLD {
        DENSE_CELL_SIZE
    } else if count < SPARSE_THRESHOLD {
        SPARSE_CELL_SIZE
    } else {
        BASE_CELL_SIZE
    }
}

pub struct CollisionManager {
    screen: Aabb,
    cell_size: f32,
    /// Last known hitbox per entity, kept for debug drawing
    registry: HashMap<EntityId, (CollisionTag, Aabb)>,
}

impl CollisionManager {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        CollisionManager {
            screen: Aabb::new(0.0, 0.0, screen_width, screen_height),
            cell_size: BASE_CELL_SIZE,
            registry: HashMap::new(),
        }
    }

    pub fn registered(&self) -> impl Iterator<Item = (&EntityId, &(CollisionTag, Aabb))> {
        self.registry.iter()
    }

    /// Drops registry entries whose owner is no longer alive
    pub fn update(&mut self, is_alive: impl Fn(EntityId) -> bool) {
        self.registry.retain(|id, _| is_alive(*id));
    }

    fn cells_for(&self, rect: &Aabb) -> impl Iterator<Item = (i32, i32)> {
        let size = self.cell_size;
        let x0 = (rect.x / size).floor() as i32;
        let x1 = (rect.right() / size).floor() as i32;
        let y0 = (rect.y / size).floor() as i32;
        let y1 = (rect.bottom() / size).floor() as i32;
        (x0..=x1).flat_map(move |cx| (y0..=y1).map(move |cy| (cx, cy)))
    }

    /// Returns index pairs into `views` that collide, `(lower, higher)`
    pub fn detect(&mut self, views: &[ColliderView]) -> Vec<(usize, usize)> {
        self.cell_size = cell_size_for(views.len());
        let cull = self.screen.inflate(COLLISION_CULL_MARGIN);

        let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        let mut occupied: Vec<Vec<(i32, i32)>> = vec![Vec::new(); views.len()];
        for (i, view) in views.iter().enumerate() {
            if !aabb_intersect(&view.rect, &cull) {
                continue;
            }
            for cell in self.cells_for(&view.rect) {
                grid.entry(cell).or_default().push(i);
                occupied[i].push(cell);
            }
        }

        let mut checked: HashSet<(usize, usize)> = HashSet::new();
        let mut pairs = Vec::new();
        for (i, cells) in occupied.iter().enumerate() {
            for &(cx, cy) in cells {
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                            continue;
                        };
                        for &j in bucket {
                            if j == i {
                                continue;
                            }
                            let key = (i.min(j), i.max(j));
                            if !checked.insert(key) {
                                continue;
                            }
                            let (a, b) = (&views[key.0], &views[key.1]);
                            if a.owner == b.owner || !should_collide(a.tag, b.tag) {
                                continue;
                            }
                            if a.overlaps(b) {
                                pairs.push(key);
                            }
                        }
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }

    /// Builds views for `entities`, detects pairs and notifies both sides.
    /// Returns the number of contacts delivered.
    pub fn resolve(&mut self, entities: &mut [&mut dyn GameEntity], events: &mut EventManager) -> usize {
        let mut views = Vec::new();
        for (owner, entity) in entities.iter().enumerate() {
            let core = entity.core();
            if !core.collision_enabled() {
                continue;
            }
            self.registry.insert(core.id, (core.tag, core.hitbox.rect));
            views.push(ColliderView {
                id: core.id,
                owner,
                part: 0,
                tag: core.tag,
                rect: core.hitbox.rect,
                rotation: if core.hitbox.is_rotated() { core.hitbox.rotation } else { 0.0 },
            });
            for (part, rect) in entity.extra_hitboxes() {
                views.push(ColliderView {
                    id: core.id,
                    owner,
                    part,
                    tag: core.tag,
                    rect,
                    rotation: 0.0,
                });
            }
        }

        let pairs = shadow_main_hitboxes(&views, self.detect(&views));
        let snapshots: Vec<_> = entities.iter().map(|e| e.collision_info()).collect();

        let mut delivered = 0;
        for (i, j) in pairs {
            let (va, vb) = (&views[i], &views[j]);
            let (a, b) = pair_mut(entities, va.owner, vb.owner);
            // An earlier contact this tick may already have killed one side
            if !a.core().is_alive() || !b.core().is_alive() {
                continue;
            }
            a.on_collision(
                &Contact {
                    other: snapshots[vb.owner].clone(),
                    part: va.part,
                },
                events,
            );
            b.on_collision(
                &Contact {
                    other: snapshots[va.owner].clone(),
                    part: vb.part,
                },
                events,
            );
            delivered += 1;
        }

        if delivered > 0 {
            debug!("collision: {} contacts among {} hitboxes", delivered, views.len());
        }
        delivered
    }
}

/// Drops main-hitbox pairs when a part of the same owner touches the same
/// other entity
fn shadow_main_hitboxes(views: &[ColliderView], pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let part_hits: HashSet<(usize, usize)> = pairs
        .iter()
        .flat_map(|&(i, j)| [(&views[i], &views[j]), (&views[j], &views[i])])
        .filter(|(view, _)| view.part > 0)
        .map(|(view, other)| (view.owner, other.owner))
        .collect();
    if part_hits.is_empty() {
        return pairs;
    }
    pairs
        .into_iter()
        .filter(|&(i, j)| {
            let shadowed = |view: &ColliderView, other: &ColliderView| {
                view.part == 0 && part_hits.contains(&(view.owner, other.owner))
            };
            !shadowed(&views[i], &views[j]) && !shadowed(&views[j], &views[i])
        })
        .collect()
}

/// Two distinct mutable entries of the same slice
fn pair_mut<'a, 'b>(
    entities: &'a mut [&'b mut dyn GameEntity],
    i: usize,
    j: usize,
) -> (&'a mut (dyn GameEntity + 'b), &'a mut (dyn GameEntity + 'b)) {
    if i < j {
        let (left, right) = entities.split_at_mut(j);
        (&mut *left[i], &mut *right[0])
    } else {
        let (left, right) = entities.split_at_mut(i);
        (&mut *right[0], &mut *left[j])
    }
}
