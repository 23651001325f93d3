//! Gravity Sim - deterministic physics core for a top-down vector arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (walls, projectiles, bunkers, ship bounce)
//! - `config`: Data-driven tunables loaded from JSON
//! - `level`: Level geometry records consumed at level load
//! - `error`: Error type for the few structural failures
//!
//! All arithmetic is integer. Correctness means matching the legacy
//! fixed-point behavior bit for bit, not physical realism.

pub mod config;
pub mod error;
pub mod level;
pub mod sim;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use level::{BunkerSpec, LevelData, WallSpec};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate of the reference build (ticks per second)
    pub const TICK_HZ: u32 = 20;

    /// Projectile sub-pixel scale: sub-position = pixels << 3
    pub const SUB_SHIFT: i32 = 3;
    /// Ship sub-pixel scale: ship velocity is in 1/256 px per frame
    pub const SHIP_SUB_SHIFT: i32 = 8;

    /// Standard ship-shot speed in 1/8 px per frame
    pub const SHOT_SPEED: i32 = 72;

    /// Projectile pool capacities
    pub const NUM_SHIP_SHOTS: usize = 6;
    pub const NUM_BUNKER_SHOTS: usize = 20;
    /// Strafe effect pool capacity and lifetime (frames)
    pub const NUM_STRAFES: usize = 5;
    pub const STRAFE_LIFE: i32 = 4;

    /// Ship collision radius (pixels)
    pub const SHIP_RADIUS: i32 = 7;
    /// Bunker hit radius (pixels)
    pub const BUNKER_RADIUS: i32 = 12;

    /// Ship rotation steps per full turn
    pub const SHIP_ROTATIONS: i32 = 32;
    /// Bounce/strafe direction steps per full turn
    pub const DIRECTIONS: i32 = 16;

    /// Ship bounce: impulse is only applied below this dot product
    pub const BOUNCE_DOT_THRESHOLD: i32 = 16384;
    /// Ship bounce: minimum impulse magnitude
    pub const BOUNCE_MIN_FORCE: i32 = 2560;

    /// Endpoints closer than this (inclusive, per axis) share a junction
    pub const JUNCTION_SLOP: i32 = 3;

    /// Upper bound on wall impacts resolved for one projectile in one tick
    pub const MAX_IMPACTS_PER_TICK: u32 = 4;
}

/// Shortest horizontal delta from `from_x` to `to_x`.
///
/// When the world wraps and the direct delta exceeds half the world width,
/// the delta is taken the other way around.
#[inline]
pub fn wrapped_dx(from_x: i32, to_x: i32, world_width: i32, wraps: bool) -> i32 {
    let dx = to_x - from_x;
    if !wraps || world_width <= 0 {
        return dx;
    }
    let half = world_width / 2;
    if dx > half {
        dx - world_width
    } else if dx < -half {
        dx + world_width
    } else {
        dx
    }
}

/// Shortest delta vector from `from` to `to` (only x wraps)
#[inline]
pub fn wrapped_delta(from: IVec2, to: IVec2, world_width: i32, wraps: bool) -> IVec2 {
    IVec2::new(wrapped_dx(from.x, to.x, world_width, wraps), to.y - from.y)
}

/// Wrap an x coordinate into `[0, width)`
#[inline]
pub fn wrap_x(x: i32, width: i32) -> i32 {
    if width <= 0 { x } else { x.rem_euclid(width) }
}

/// Playfield extents and topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct World {
    pub width: i32,
    pub height: i32,
    /// Horizontal toroidal wrap
    pub wraps: bool,
}

impl World {
    pub fn new(width: i32, height: i32, wraps: bool) -> Self {
        Self { width, height, wraps }
    }

    /// Shortest delta from `from` to `to`
    #[inline]
    pub fn delta(&self, from: IVec2, to: IVec2) -> IVec2 {
        wrapped_delta(from, to, self.width, self.wraps)
    }

    /// Wrap a sub-pixel x coordinate scaled by `1 << shift`
    #[inline]
    pub fn wrap_scaled_x(&self, x: i32, shift: i32) -> i32 {
        if self.wraps { wrap_x(x, self.width << shift) } else { x }
    }
}
