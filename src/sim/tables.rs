//! Static lookup tables
//!
//! These are the legacy constants. They are kept as data; nothing here is
//! derived at runtime.

use glam::IVec2;

/// Shot vector component per 32-step direction, 1/8 px per frame.
/// SHOT_VECS[i] = round(72 * sin(i * 11.25deg)).
/// x = SHOT_VECS[d], y = SHOT_VECS[(d + 24) % 32] (0 = up).
pub static SHOT_VECS: [i32; 32] = [
    0, 14, 28, 40, 51, 60, 67, 71, 72, 71, 67, 60, 51, 40, 28, 14, //
    0, -14, -28, -40, -51, -60, -67, -71, -72, -71, -67, -60, -51, -40, -28, -14,
];

/// Ship bounce normal component per 16-step direction (magnitude 24).
/// x1 = BOUNCE_NORMALS[n], y1 = BOUNCE_NORMALS[(n + 12) % 16].
pub static BOUNCE_NORMALS: [i32; 16] = [0, 9, 17, 22, 24, 22, 17, 9, 0, -9, -17, -22, -24, -22, -17, -9];

/// Squared magnitude of a bounce normal, halved (|n|^2 / 2)
pub const BOUNCE_NORMAL_HALF_SQ: i32 = 288;

/// Strafe direction for standard walls, `[side][orientation code]`.
/// Side 0 is above the wall (right of a vertical wall), side 1 below (left).
/// Orientation codes run S, SSE, SE, ESE, E, ENE, NE, NNE = 1..8; slot 0 unused.
pub static STRAFE_DIRS_NORMAL: [[i8; 9]; 2] = [
    [-1, 4, 3, 2, 1, 0, 15, 14, 13],
    [-1, 12, -1, -1, -1, -1, -1, -1, -1],
];

/// Strafe direction for bounce walls, `[side][orientation code]`
pub static STRAFE_DIRS_BOUNCE: [[i8; 9]; 2] = [
    [-1, 4, 3, 2, 1, 0, 15, 14, 13],
    [-1, 12, 11, 10, 9, 8, 7, 6, 5],
];

/// atan(i / 32) in whole degrees, i = 0..=32
pub static ATAN_DEG: [i32; 33] = [
    0, 2, 4, 5, 7, 9, 11, 12, 14, 16, 17, 19, 21, 22, 24, 25, //
    27, 28, 29, 31, 32, 33, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45,
];

/// Velocity for a 32-step direction at the standard shot speed
#[inline]
pub fn shot_vector(dir32: i32) -> IVec2 {
    let d = dir32.rem_euclid(32) as usize;
    IVec2::new(SHOT_VECS[d], SHOT_VECS[(d + 24) % 32])
}

/// Velocity for a 16-step direction at the standard shot speed
#[inline]
pub fn direction_vector(dir16: i32) -> IVec2 {
    shot_vector(dir16.rem_euclid(16) * 2)
}

/// Ship bounce normal `(x1, y1)` for a 16-step direction
#[inline]
pub fn bounce_normal(norm: i32) -> IVec2 {
    let n = norm.rem_euclid(16) as usize;
    IVec2::new(BOUNCE_NORMALS[n], BOUNCE_NORMALS[(n + 12) % 16])
}
