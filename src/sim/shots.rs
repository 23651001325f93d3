//! Projectile lifecycle
//!
//! Fixed-capacity pools of ship and bunker shots. A shot's whole flight is
//! predicted when it spawns (and again after each bounce), so per-tick work
//! is just moving it and counting down. When the count reaches zero the
//! shot either bounces or dies, and a dying shot may leave a strafe spark.
//!
//! A dead slot keeps `just_died` set for the tick it died on so a renderer
//! can still draw it once; the flag is cleared at the next tick boundary.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::predict::{LifePrediction, predict_life};
use super::reflect::bounce_shot_velocity;
use super::walls::{WallGraph, WallId};
use crate::World;
use crate::consts::{MAX_IMPACTS_PER_TICK, STRAFE_LIFE, SUB_SHIFT};

/// Who fired a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOwner {
    Ship,
    Bunker,
}

/// One projectile slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    /// Pixel position
    pub pos: IVec2,
    /// Position in 1/8 px
    pub sub: IVec2,
    /// Velocity in 1/8 px per frame
    pub vel: IVec2,
    /// Where the shot was fired from
    pub origin: IVec2,
    /// Frames until impact or expiry; 0 means the slot is inactive
    pub remaining_life: i32,
    /// Frames left after bouncing off `hit_wall`
    pub bounce_timer: i32,
    /// 16-step bounce/strafe direction, -1 for none
    pub strafe_dir: i8,
    pub hit_wall: Option<WallId>,
    /// Died this tick; still visible for one frame
    pub just_died: bool,
}

impl Default for Shot {
    fn default() -> Self {
        Self {
            pos: IVec2::ZERO,
            sub: IVec2::ZERO,
            vel: IVec2::ZERO,
            origin: IVec2::ZERO,
            remaining_life: 0,
            bounce_timer: 0,
            strafe_dir: -1,
            hit_wall: None,
            just_died: false,
        }
    }
}

/// Fields that change whenever a slot is (re)used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSignature {
    pub pos: IVec2,
    pub sub: IVec2,
    pub vel: IVec2,
    pub origin: IVec2,
    pub strafe_dir: i8,
    pub bounce_timer: i32,
}

/// Request for a strafe spark where a shot died on a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrafeRequest {
    pub pos: IVec2,
    pub dir: i8,
}

/// What happened when a shot's life ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Bounced and is flying again
    Bounced,
    /// Dead, with an optional strafe spark
    Died(Option<StrafeRequest>),
}

impl Shot {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.remaining_life > 0
    }

    /// Free for reuse: inactive and not awaiting its last render
    #[inline]
    pub fn is_free(&self) -> bool {
        self.remaining_life == 0 && !self.just_died
    }

    pub fn spawn_signature(&self) -> SpawnSignature {
        SpawnSignature {
            pos: self.pos,
            sub: self.sub,
            vel: self.vel,
            origin: self.origin,
            strafe_dir: self.strafe_dir,
            bounce_timer: self.bounce_timer,
        }
    }

    fn apply(&mut self, prediction: LifePrediction) {
        self.remaining_life = prediction.life;
        self.bounce_timer = prediction.bounce_timer;
        self.hit_wall = prediction.hit_wall;
        self.strafe_dir = prediction.strafe_dir;
    }

    fn set_sub(&mut self, sub: IVec2, world: &World) {
        self.sub = IVec2::new(world.wrap_scaled_x(sub.x, SUB_SHIFT), sub.y);
        self.pos = self.sub >> SUB_SHIFT;
    }

    /// Move one frame and count it off. Returns the position before the move.
    pub fn step(&mut self, world: &World) -> IVec2 {
        let prev = self.pos;
        self.set_sub(self.sub + self.vel, world);
        self.remaining_life -= 1;
        prev
    }

    /// Kill without a strafe (target hit)
    pub fn kill(&mut self) {
        self.remaining_life = 0;
        self.bounce_timer = 0;
        self.strafe_dir = -1;
        self.just_died = true;
    }

    /// Resolve a shot whose life just reached zero.
    ///
    /// Bounce chains are followed immediately, at most
    /// `MAX_IMPACTS_PER_TICK` impacts. `moved` says whether the shot advanced
    /// this tick; if so it is pulled back one frame to the near side of the
    /// wall it crossed.
    pub fn expire(&mut self, graph: &WallGraph, world: &World, moved: bool) -> Expiry {
        if moved && self.hit_wall.is_some() {
            self.set_sub(self.sub - self.vel, world);
        }

        for _ in 0..MAX_IMPACTS_PER_TICK {
            let Some(wall_id) = self.hit_wall else {
                break;
            };
            if graph.get(wall_id).is_none() {
                log::warn!(
                    "Shot at {:?} references missing wall {:?}; dropping impact",
                    self.pos,
                    wall_id
                );
                self.strafe_dir = -1;
                break;
            }
            if self.bounce_timer <= 0 {
                break;
            }
            let Some(vel) = bounce_shot_velocity(self.strafe_dir) else {
                break;
            };
            self.vel = vel;
            let prediction =
                predict_life(graph, world, self.sub, vel, self.bounce_timer, Some(wall_id));
            self.apply(prediction);
            if self.is_alive() {
                return Expiry::Bounced;
            }
        }

        let strafe = (self.strafe_dir >= 0).then_some(StrafeRequest {
            pos: self.pos,
            dir: self.strafe_dir,
        });
        self.remaining_life = 0;
        self.bounce_timer = 0;
        self.just_died = true;
        Expiry::Died(strafe)
    }
}

/// True if slot `curr` holds a shot spawned since `prev` was recorded.
///
/// Only an inactive previous slot can be reused. The comparison ignores
/// `remaining_life`, so a shot that hit a wall on its spawn frame still
/// counts.
pub fn is_new_spawn(prev: &Shot, curr: &Shot) -> bool {
    prev.remaining_life == 0 && prev.spawn_signature() != curr.spawn_signature()
}

/// Slots that were (re)spawned between two snapshots of a pool
pub fn spawned_slots(prev: &[Shot], curr: &[Shot]) -> Vec<usize> {
    prev.iter()
        .zip(curr)
        .enumerate()
        .filter(|(_, (p, c))| is_new_spawn(p, c))
        .map(|(i, _)| i)
        .collect()
}

/// Result of firing into a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    pub slot: usize,
    /// Set when the shot expired on its spawn frame
    pub expiry: Option<Expiry>,
}

/// Shot placed by `ShotPool::launch`, expiry not yet resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launched {
    pub slot: usize,
    /// Position before the spawn frame
    pub prev: IVec2,
    /// False when the shot spawned on a wall and never moved
    pub moved: bool,
}

/// Fixed-capacity projectile pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotPool {
    owner: ShotOwner,
    slots: Vec<Shot>,
}

impl ShotPool {
    pub fn new(owner: ShotOwner, capacity: usize) -> Self {
        Self {
            owner,
            slots: vec![Shot::default(); capacity],
        }
    }

    pub fn owner(&self) -> ShotOwner {
        self.owner
    }

    pub fn slots(&self) -> &[Shot] {
        &self.slots
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Shot> {
        self.slots.get_mut(index)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_alive()).count()
    }

    /// First reusable slot
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Shot::is_free)
    }

    /// Clear last tick's one-frame death markers
    pub fn clear_just_died(&mut self) {
        for shot in &mut self.slots {
            shot.just_died = false;
        }
    }

    /// Empty every slot (level change)
    pub fn reset(&mut self) {
        self.slots.fill(Shot::default());
    }

    /// Fire a shot and resolve it at once if it expired on its spawn frame.
    /// Returns `None` when the pool is full.
    pub fn fire(
        &mut self,
        origin: IVec2,
        vel: IVec2,
        life: i32,
        graph: &WallGraph,
        world: &World,
    ) -> Option<Spawned> {
        let launched = self.launch(origin, vel, life, graph, world)?;
        let shot = &mut self.slots[launched.slot];
        let expiry = (!shot.is_alive()).then(|| shot.expire(graph, world, launched.moved));
        Some(Spawned {
            slot: launched.slot,
            expiry,
        })
    }

    /// Place a shot without resolving its expiry, so target checks can run
    /// on the spawn frame first. Returns `None` when the pool is full.
    ///
    /// The flight is predicted from `origin`, then one frame is applied
    /// immediately so the shot clears its muzzle on the tick it is fired.
    pub fn launch(
        &mut self,
        origin: IVec2,
        vel: IVec2,
        life: i32,
        graph: &WallGraph,
        world: &World,
    ) -> Option<Launched> {
        let Some(slot) = self.free_slot() else {
            log::trace!("{:?} shot pool full; dropping shot", self.owner);
            return None;
        };
        let shot = &mut self.slots[slot];

        *shot = Shot {
            origin,
            vel,
            ..Shot::default()
        };
        shot.set_sub(origin << SUB_SHIFT, world);
        shot.apply(predict_life(graph, world, shot.sub, vel, life, None));

        let prev = shot.pos;
        let moved = shot.is_alive();
        if moved {
            shot.step(world);
        }

        Some(Launched { slot, prev, moved })
    }
}

/// Strafe spark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Strafe {
    pub pos: IVec2,
    /// 16-step direction the spark points
    pub dir: i8,
    pub remaining_life: i32,
}

/// Fixed-capacity strafe pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrafePool {
    slots: Vec<Strafe>,
}

impl StrafePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Strafe::default(); capacity],
        }
    }

    pub fn slots(&self) -> &[Strafe] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.remaining_life > 0).count()
    }

    /// Age every spark by one frame
    pub fn advance(&mut self) {
        for strafe in &mut self.slots {
            if strafe.remaining_life > 0 {
                strafe.remaining_life -= 1;
            }
        }
    }

    /// Place a spark, replacing the one closest to burning out
    pub fn spawn(&mut self, request: StrafeRequest) -> Option<usize> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.remaining_life)
            .map(|(i, _)| i)?;
        self.slots[slot] = Strafe {
            pos: request.pos,
            dir: request.dir,
            remaining_life: STRAFE_LIFE,
        };
        Some(slot)
    }

    pub fn reset(&mut self) {
        self.slots.fill(Strafe::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::WallSpec;
    use crate::sim::walls::WallKind;

    fn world() -> World {
        World::new(1000, 600, false)
    }

    fn graph(specs: &[(WallKind, (i32, i32), (i32, i32))]) -> WallGraph {
        let specs: Vec<WallSpec> = specs
            .iter()
            .map(|&(kind, a, b)| WallSpec::new(kind, IVec2::new(a.0, a.1), IVec2::new(b.0, b.1)))
            .collect();
        WallGraph::new(&specs)
    }

    #[test]
    fn test_fire_predicts_and_preapplies_a_frame() {
        let g = graph(&[(WallKind::Bounce, (135, 0), (135, 300))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        let spawned = pool
            .fire(IVec2::new(100, 100), IVec2::new(72, 0), 35, &g, &world())
            .unwrap();
        assert_eq!(spawned.slot, 0);
        assert!(spawned.expiry.is_none());
        let shot = pool.slots()[0];
        assert_eq!(shot.remaining_life, 3);
        assert_eq!(shot.pos, IVec2::new(109, 100));
        assert_eq!(shot.hit_wall, Some(WallId(0)));
        assert_eq!(shot.bounce_timer, 31);
    }

    #[test]
    fn test_bounce_reverses_and_repredicts() {
        let g = graph(&[
            (WallKind::Bounce, (135, 0), (135, 300)),
            (WallKind::Normal, (20, 0), (20, 300)),
        ]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        pool.fire(IVec2::new(100, 100), IVec2::new(72, 0), 35, &g, &world());
        let shot = pool.slot_mut(0).unwrap();
        for _ in 0..3 {
            shot.step(&world());
        }
        assert_eq!(shot.remaining_life, 0);
        assert_eq!(shot.pos, IVec2::new(136, 100));

        let expiry = shot.expire(&g, &world(), true);
        assert_eq!(expiry, Expiry::Bounced);
        assert_eq!(shot.vel, IVec2::new(-72, 0));
        // Pulled back to x=127, then 107 px to the normal wall: 12 frames
        assert_eq!(shot.pos, IVec2::new(127, 100));
        assert_eq!(shot.remaining_life, 12);
        assert_eq!(shot.bounce_timer, 0);
        assert_eq!(shot.strafe_dir, 4);
    }

    #[test]
    fn test_normal_wall_death_requests_strafe() {
        let g = graph(&[(WallKind::Normal, (0, 200), (400, 200))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        pool.fire(IVec2::new(100, 100), IVec2::new(0, 72), 35, &g, &world());
        let shot = pool.slot_mut(0).unwrap();
        while shot.is_alive() {
            shot.step(&world());
        }
        match shot.expire(&g, &world(), true) {
            Expiry::Died(Some(strafe)) => {
                assert_eq!(strafe.dir, 0);
                assert!(strafe.pos.y < 200);
            }
            other => panic!("expected strafe, got {other:?}"),
        }
        assert!(shot.just_died);
        assert!(!shot.is_free());
    }

    #[test]
    fn test_open_air_expiry_has_no_strafe() {
        let g = graph(&[]);
        let mut pool = ShotPool::new(ShotOwner::Bunker, 2);
        pool.fire(IVec2::new(100, 100), IVec2::new(48, 0), 2, &g, &world());
        let shot = pool.slot_mut(0).unwrap();
        shot.step(&world());
        assert_eq!(shot.expire(&g, &world(), true), Expiry::Died(None));
    }

    #[test]
    fn test_missing_wall_dies_without_strafe() {
        let g = graph(&[(WallKind::Bounce, (135, 0), (135, 300))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        pool.fire(IVec2::new(100, 100), IVec2::new(72, 0), 35, &g, &world());
        let shot = pool.slot_mut(0).unwrap();
        for _ in 0..3 {
            shot.step(&world());
        }
        // Level reloaded with no walls
        let empty = graph(&[]);
        assert_eq!(shot.expire(&empty, &world(), true), Expiry::Died(None));
        assert!(shot.just_died);
    }

    #[test]
    fn test_missing_normal_wall_dies_without_strafe() {
        let g = graph(&[(WallKind::Normal, (0, 200), (400, 200))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        pool.fire(IVec2::new(100, 100), IVec2::new(0, 72), 35, &g, &world());
        let shot = pool.slot_mut(0).unwrap();
        while shot.is_alive() {
            shot.step(&world());
        }
        assert!(shot.hit_wall.is_some());
        let empty = graph(&[]);
        assert_eq!(shot.expire(&empty, &world(), true), Expiry::Died(None));
        assert_eq!(shot.strafe_dir, -1);
        assert!(shot.just_died);
    }

    #[test]
    fn test_launch_leaves_expiry_to_the_caller() {
        let g = graph(&[(WallKind::Normal, (108, 0), (108, 300))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        let launched = pool
            .launch(IVec2::new(100, 100), IVec2::new(72, 0), 35, &g, &world())
            .unwrap();
        assert_eq!(launched.prev, IVec2::new(100, 100));
        assert!(launched.moved);
        // Life used up past the wall, but not yet resolved
        let shot = pool.slots()[0];
        assert_eq!(shot.remaining_life, 0);
        assert_eq!(shot.pos, IVec2::new(109, 100));
        assert!(!shot.just_died);
    }

    #[test]
    fn test_spawn_on_wall_dies_immediately() {
        let g = graph(&[(WallKind::Normal, (0, 100), (400, 100))]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 6);
        let before = pool.slots().to_vec();
        let spawned = pool
            .fire(IVec2::new(100, 100), IVec2::new(0, 72), 35, &g, &world())
            .unwrap();
        assert!(matches!(spawned.expiry, Some(Expiry::Died(_))));
        let after = pool.slots();
        assert_eq!(after[0].remaining_life, 0);
        assert_eq!(spawned_slots(&before, after), vec![0]);
    }

    #[test]
    fn test_slot_reuse_detection() {
        let dead = Shot::default();
        let mut reborn = dead;
        reborn.origin = IVec2::new(10, 10);
        reborn.pos = IVec2::new(10, 10);
        // New life is 0 as well, but the signature changed
        assert!(is_new_spawn(&dead, &reborn));
        assert!(!is_new_spawn(&dead, &dead));

        let mut flying = reborn;
        flying.remaining_life = 5;
        let mut moved = flying;
        moved.pos.x += 9;
        assert!(!is_new_spawn(&flying, &moved));
    }

    #[test]
    fn test_just_died_blocks_reuse_until_cleared() {
        let g = graph(&[]);
        let mut pool = ShotPool::new(ShotOwner::Ship, 1);
        pool.fire(IVec2::new(100, 100), IVec2::new(72, 0), 1, &g, &world());
        // Life 1: pre-applied frame used it up
        assert!(pool.slots()[0].just_died);
        assert!(pool.fire(IVec2::new(100, 100), IVec2::new(72, 0), 10, &g, &world()).is_none());
        pool.clear_just_died();
        assert!(pool.fire(IVec2::new(100, 100), IVec2::new(72, 0), 10, &g, &world()).is_some());
    }

    #[test]
    fn test_strafe_pool_replaces_oldest() {
        let mut pool = StrafePool::new(2);
        let req = |x| StrafeRequest {
            pos: IVec2::new(x, 0),
            dir: 0,
        };
        assert_eq!(pool.spawn(req(1)), Some(0));
        pool.advance();
        assert_eq!(pool.spawn(req(2)), Some(1));
        pool.advance();
        // Slot 0 has 2 frames left, slot 1 has 3
        assert_eq!(pool.spawn(req(3)), Some(0));
        assert_eq!(pool.slots()[0].pos.x, 3);
        assert_eq!(pool.active_count(), 2);

        let mut empty = StrafePool::new(0);
        assert_eq!(empty.spawn(req(4)), None);
    }
}
