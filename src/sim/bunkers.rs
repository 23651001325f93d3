//! Bunker targeting AI
//!
//! Bunkers are stationary turrets. Each tick at most one of them fires,
//! picked by roulette-wheel selection over per-bunker weights. Wall and
//! diff bunkers only see (and can only be hit from) their firing ranges.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{angle_to_steps, compass_angle};
use super::rng::RandomSource;
use super::tables::shot_vector;
use crate::World;
use crate::config::SimConfig;
use crate::consts::{BUNKER_RADIUS, SHIP_ROTATIONS, SHOT_SPEED};
use crate::level::BunkerSpec;

/// Bunker behaviour class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BunkerKind {
    /// Mounted on a wall, fires within its facing arc
    Wall,
    /// Like `Wall`; fire weight depends on facing
    Diff,
    /// Fires in any direction
    Ground,
    /// Rotates toward the ship
    Follow,
    /// Never fires
    Generator,
}

impl BunkerKind {
    /// Only fires, and can only be destroyed, within its firing ranges
    pub fn is_directional(self) -> bool {
        matches!(self, BunkerKind::Wall | BunkerKind::Diff)
    }
}

/// Inclusive compass-degree band; empty when `low > high`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiringRange {
    pub low: i32,
    pub high: i32,
}

impl FiringRange {
    pub const NONE: FiringRange = FiringRange { low: 0, high: -1 };
    pub const FULL: FiringRange = FiringRange { low: 0, high: 359 };

    pub fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    pub fn contains(&self, angle: i32) -> bool {
        self.low <= angle && angle <= self.high
    }
}

/// Half-width of a directional bunker's arc, degrees
const FACING_HALF_ARC: i32 = 70;

/// A bunker in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bunker {
    pub kind: BunkerKind,
    pub pos: IVec2,
    /// Facing 0..15 for wall/diff, 8-step aim for follow, frame otherwise
    pub rot: i32,
    pub alive: bool,
    pub ranges: [FiringRange; 2],
}

impl Bunker {
    pub fn new(kind: BunkerKind, pos: IVec2, rot: i32) -> Self {
        Self {
            kind,
            pos,
            rot,
            alive: true,
            ranges: default_ranges(kind, rot),
        }
    }

    pub fn from_spec(spec: &BunkerSpec) -> Self {
        let mut bunker = Self::new(spec.kind, spec.pos, spec.rot);
        if let Some(ranges) = spec.ranges {
            bunker.ranges = ranges;
        }
        bunker
    }

    /// Is the compass angle inside either firing range?
    pub fn in_range(&self, angle: i32) -> bool {
        self.ranges.iter().any(|r| r.contains(angle))
    }

    /// Legal angle check: non-directional bunkers accept everything
    pub fn accepts(&self, angle: i32) -> bool {
        !self.kind.is_directional() || self.in_range(angle)
    }

    /// Relative chance of this bunker being picked to fire
    pub fn fire_weight(&self) -> u32 {
        match self.kind {
            BunkerKind::Generator => 0,
            BunkerKind::Diff => match self.rot.rem_euclid(4) {
                1 | 3 => 0,
                2 => 2,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// Can a shot last seen at `from` destroy this bunker?
    pub fn vulnerable_from(&self, from: IVec2, world: &World) -> bool {
        self.accepts(compass_angle(world.delta(self.pos, from)))
    }
}

/// Firing ranges for a kind and facing.
///
/// Directional bunkers cover the facing +/- 70 degrees, split at the 0/360
/// seam into two bands. Everything else covers the full circle.
pub fn default_ranges(kind: BunkerKind, rot: i32) -> [FiringRange; 2] {
    if !kind.is_directional() {
        return [FiringRange::FULL, FiringRange::NONE];
    }
    let center = rot.rem_euclid(16) * 45 / 2;
    let (low, high) = (center - FACING_HALF_ARC, center + FACING_HALF_ARC);
    if low < 0 {
        [FiringRange::new(low + 360, 359), FiringRange::new(0, high)]
    } else if high > 359 {
        [FiringRange::new(low, 359), FiringRange::new(0, high - 360)]
    } else {
        [FiringRange::new(low, high), FiringRange::NONE]
    }
}

/// Compass angle from a bunker to the ship along the shortest wrapped path
pub fn angle_to_ship(bunker_pos: IVec2, ship_pos: IVec2, world: &World) -> i32 {
    compass_angle(world.delta(bunker_pos, ship_pos))
}

/// One step of turret rotation toward the ship: -1, 0 or +1 on an 8-step dial
pub fn lead_turn(rot: i32, bunker_pos: IVec2, ship_pos: IVec2, world: &World) -> i32 {
    let target = angle_to_steps(angle_to_ship(bunker_pos, ship_pos, world), 8);
    match (target - rot).rem_euclid(8) {
        0 => 0,
        1..=3 => 1,
        _ => -1,
    }
}

/// Is the bunker within half a view of the ship?
pub fn in_view(bunker_pos: IVec2, ship_pos: IVec2, world: &World, config: &SimConfig) -> bool {
    let d = world.delta(ship_pos, bunker_pos);
    d.x.abs() <= config.view_width / 2 && d.y.abs() <= config.view_height / 2
}

/// Per-bunker roulette weights; dead or out-of-view bunkers weigh 0
pub fn eligible_weights(
    bunkers: &[Bunker],
    ship_pos: IVec2,
    world: &World,
    config: &SimConfig,
) -> Vec<u32> {
    bunkers
        .iter()
        .map(|b| {
            if b.alive && in_view(b.pos, ship_pos, world, config) {
                b.fire_weight()
            } else {
                0
            }
        })
        .collect()
}

/// Roulette-wheel pick: subtract weights from `draw` until it goes negative.
///
/// `draw` must lie in `[0, sum(weights))`; returns `None` otherwise.
pub fn roulette_select(weights: &[u32], draw: u32) -> Option<usize> {
    let mut left = draw as i64;
    for (i, &w) in weights.iter().enumerate() {
        left -= w as i64;
        if left < 0 {
            return Some(i);
        }
    }
    None
}

/// Draw once and pick a weighted index. An all-zero wheel draws nothing.
pub fn pick_weighted(weights: &[u32], rng: &mut impl RandomSource) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    roulette_select(weights, rng.next(total))
}

/// A shot a bunker wants to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BunkerShot {
    pub origin: IVec2,
    pub vel: IVec2,
}

/// Aim a bunker at the ship with jitter.
///
/// `None` when a directional bunker cannot see the ship.
pub fn aim(
    bunker: &Bunker,
    ship_pos: IVec2,
    world: &World,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Option<BunkerShot> {
    let mut angle = angle_to_ship(bunker.pos, ship_pos, world);
    if !bunker.accepts(angle) {
        return None;
    }
    let jitter = config.bunker_aim_jitter;
    if jitter > 0 {
        angle += rng.next((jitter * 2 + 1) as u32) as i32 - jitter;
    }
    let dir = angle_to_steps(angle, SHIP_ROTATIONS);
    let muzzle = shot_vector(dir);
    Some(BunkerShot {
        origin: bunker.pos + muzzle * BUNKER_RADIUS / SHOT_SPEED,
        vel: muzzle * config.bunker_shot_speed / SHOT_SPEED,
    })
}

/// Per-tick fire decision: chance roll, roulette pick, aim
pub fn choose_shot(
    bunkers: &[Bunker],
    ship_pos: IVec2,
    world: &World,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Option<(usize, BunkerShot)> {
    if rng.next(100) >= config.bunker_fire_chance {
        return None;
    }
    let weights = eligible_weights(bunkers, ship_pos, world, config);
    let index = pick_weighted(&weights, rng)?;
    let shot = aim(&bunkers[index], ship_pos, world, config, rng)?;
    Some((index, shot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRng;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(1000, 600, true)
    }

    #[test]
    fn test_wrapped_aim_takes_short_way() {
        let d = world().delta(IVec2::new(10, 300), IVec2::new(995, 300));
        assert_eq!(d.x, -15);
        assert_eq!(angle_to_ship(IVec2::new(10, 300), IVec2::new(995, 300), &world()), 270);
    }

    #[test]
    fn test_roulette_reference_case() {
        assert_eq!(roulette_select(&[0, 2, 1, 0], 0), Some(1));
        assert_eq!(roulette_select(&[0, 2, 1, 0], 1), Some(1));
        assert_eq!(roulette_select(&[0, 2, 1, 0], 2), Some(2));
        assert_eq!(roulette_select(&[0, 2, 1, 0], 3), None);
    }

    #[test]
    fn test_empty_wheel_draws_nothing() {
        let mut rng = ScriptedRng::new([1]);
        assert_eq!(pick_weighted(&[0, 0], &mut rng), None);
        assert_eq!(rng.remaining(), 1);
        assert_eq!(pick_weighted(&[], &mut rng), None);
    }

    #[test]
    fn test_default_ranges_split_at_seam() {
        // Facing up: 290..359 and 0..70
        assert_eq!(
            default_ranges(BunkerKind::Wall, 0),
            [FiringRange::new(290, 359), FiringRange::new(0, 70)]
        );
        // Facing east: one band
        let east = default_ranges(BunkerKind::Diff, 4);
        assert_eq!(east[0], FiringRange::new(20, 160));
        assert!(east[1].is_empty());
        // Facing north-north-west: 337 +/- 70
        assert_eq!(
            default_ranges(BunkerKind::Wall, 15),
            [FiringRange::new(267, 359), FiringRange::new(0, 47)]
        );
        assert_eq!(default_ranges(BunkerKind::Ground, 3)[0], FiringRange::FULL);
    }

    #[test]
    fn test_directional_legality() {
        let bunker = Bunker::new(BunkerKind::Wall, IVec2::new(100, 100), 0);
        let w = World::new(1000, 600, false);
        assert!(bunker.vulnerable_from(IVec2::new(100, 50), &w));
        assert!(bunker.vulnerable_from(IVec2::new(120, 50), &w));
        assert!(!bunker.vulnerable_from(IVec2::new(100, 150), &w));

        let ground = Bunker::new(BunkerKind::Ground, IVec2::new(100, 100), 0);
        assert!(ground.vulnerable_from(IVec2::new(100, 150), &w));
    }

    #[test]
    fn test_fire_weights() {
        let weight = |kind, rot| Bunker::new(kind, IVec2::ZERO, rot).fire_weight();
        assert_eq!(weight(BunkerKind::Diff, 1), 0);
        assert_eq!(weight(BunkerKind::Diff, 2), 2);
        assert_eq!(weight(BunkerKind::Diff, 4), 1);
        assert_eq!(weight(BunkerKind::Diff, 6), 2);
        assert_eq!(weight(BunkerKind::Generator, 0), 0);
        assert_eq!(weight(BunkerKind::Follow, 5), 1);
    }

    #[test]
    fn test_lead_turn_steps_toward_ship() {
        let w = World::new(1000, 600, false);
        let bunker = IVec2::new(500, 300);
        // Ship due east: target step 2
        let east = IVec2::new(600, 300);
        assert_eq!(lead_turn(2, bunker, east, &w), 0);
        assert_eq!(lead_turn(0, bunker, east, &w), 1);
        assert_eq!(lead_turn(4, bunker, east, &w), -1);
        // Directly behind: turn the negative way
        assert_eq!(lead_turn(6, bunker, east, &w), -1);
    }

    #[test]
    fn test_view_eligibility() {
        let config = SimConfig::default();
        let bunkers = [
            Bunker::new(BunkerKind::Ground, IVec2::new(300, 300), 0),
            Bunker::new(BunkerKind::Ground, IVec2::new(900, 300), 0),
            Bunker::new(BunkerKind::Ground, IVec2::new(20, 300), 0),
        ];
        let mut dead = bunkers;
        dead[0].alive = false;
        let ship = IVec2::new(980, 300);
        assert_eq!(eligible_weights(&bunkers, ship, &world(), &config), vec![0, 1, 1]);
        let flat = World::new(1000, 600, false);
        assert_eq!(eligible_weights(&bunkers, ship, &flat, &config), vec![0, 1, 0]);
        assert_eq!(eligible_weights(&dead, IVec2::new(300, 300), &flat, &config)[0], 0);
    }

    #[test]
    fn test_aim_without_jitter() {
        let config = SimConfig {
            bunker_aim_jitter: 0,
            ..Default::default()
        };
        let bunker = Bunker::new(BunkerKind::Ground, IVec2::new(500, 300), 0);
        let mut rng = ScriptedRng::default();
        let shot = aim(&bunker, IVec2::new(600, 300), &world(), &config, &mut rng).unwrap();
        assert_eq!(shot.vel, IVec2::new(48, 0));
        assert_eq!(shot.origin, IVec2::new(512, 300));
    }

    #[test]
    fn test_aim_jitter_range() {
        let config = SimConfig::default();
        let bunker = Bunker::new(BunkerKind::Ground, IVec2::new(500, 300), 0);
        // Draw 0 is the full negative jitter: 90 - 8 = 82 degrees -> step 7
        let mut rng = ScriptedRng::new([0]);
        let shot = aim(&bunker, IVec2::new(600, 300), &world(), &config, &mut rng).unwrap();
        assert_eq!(shot.vel, shot_vector(7) * 48 / 72);
    }

    #[test]
    fn test_wall_bunker_wont_fire_backwards() {
        let config = SimConfig::default();
        let bunker = Bunker::new(BunkerKind::Wall, IVec2::new(500, 300), 0);
        let mut rng = ScriptedRng::new([8]);
        assert!(aim(&bunker, IVec2::new(500, 400), &world(), &config, &mut rng).is_none());
        // Nothing was drawn for jitter
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_choose_shot_sequence() {
        let config = SimConfig::default();
        let bunkers = [
            Bunker::new(BunkerKind::Generator, IVec2::new(450, 300), 0),
            Bunker::new(BunkerKind::Ground, IVec2::new(550, 300), 0),
        ];
        // Chance roll 5 < 12, roulette draw 0, jitter draw 8 (no jitter)
        let mut rng = ScriptedRng::new([5, 0, 8]);
        let (index, shot) =
            choose_shot(&bunkers, IVec2::new(500, 300), &world(), &config, &mut rng).unwrap();
        assert_eq!(index, 1);
        assert_eq!(shot.vel, IVec2::new(-48, 0));

        // Chance roll fails
        let mut rng = ScriptedRng::new([50]);
        assert!(choose_shot(&bunkers, IVec2::new(500, 300), &world(), &config, &mut rng).is_none());
    }

    proptest! {
        #[test]
        fn prop_roulette_is_deterministic(weights in prop::collection::vec(0u32..5, 1..8), seed in 0u32..1000) {
            let total: u32 = weights.iter().sum();
            prop_assume!(total > 0);
            let draw = seed % total;
            let first = roulette_select(&weights, draw);
            prop_assert_eq!(first, roulette_select(&weights, draw));
            let index = first.unwrap();
            prop_assert!(weights[index] > 0);
        }
    }
}
