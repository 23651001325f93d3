//! Integer geometry primitives
//!
//! Distance tests use the legacy signed 16-bit operand semantics (16x16 -> 32
//! bit products). The inclusive `<=` boundary in `in_distance` is legacy
//! behavior and must stay.

use glam::IVec2;

use super::tables::ATAN_DEG;

/// True iff `dx^2 + dy^2 <= radius^2` (inclusive).
///
/// Runs a bounding-box rejection first, so any 16-bit input is safe.
#[inline]
pub fn in_distance(dx: i16, dy: i16, radius: i16) -> bool {
    let (dx, dy, r) = (dx as i32, dy as i32, radius as i32);
    if dx < -r || dx > r || dy < -r || dy > r {
        return false;
    }
    dx * dx + dy * dy <= r * r
}

/// `in_distance` without the bounding-box rejection.
///
/// Callers must guarantee `|dx| <= radius` and `|dy| <= radius`.
#[inline]
pub fn in_distance_bounded(dx: i16, dy: i16, radius: i16) -> bool {
    let (dx, dy, r) = (dx as i32, dy as i32, radius as i32);
    debug_assert!(dx.abs() <= r && dy.abs() <= r);
    dx * dx + dy * dy <= r * r
}

/// `in_distance` for world-space deltas.
///
/// Deltas that do not fit 16 bits are always out of range.
#[inline]
pub fn within(delta: IVec2, radius: i32) -> bool {
    match (
        i16::try_from(delta.x),
        i16::try_from(delta.y),
        i16::try_from(radius),
    ) {
        (Ok(dx), Ok(dy), Ok(r)) => in_distance(dx, dy, r),
        _ => false,
    }
}

/// 2D cross product, widened
#[inline]
pub fn cross(a: IVec2, b: IVec2) -> i64 {
    a.x as i64 * b.y as i64 - a.y as i64 * b.x as i64
}

/// Dot product, widened
#[inline]
pub fn dot(a: IVec2, b: IVec2) -> i64 {
    a.x as i64 * b.x as i64 + a.y as i64 * b.y as i64
}

/// Squared distance from `point` to the segment `a`-`b`.
///
/// True perpendicular distance when the foot of the perpendicular lands
/// inside the segment, endpoint distance otherwise.
pub fn distance_to_segment(point: IVec2, a: IVec2, b: IVec2) -> i64 {
    let seg = b - a;
    let rel = point - a;
    let len_sq = dot(seg, seg);
    if len_sq == 0 {
        return dot(rel, rel);
    }

    let along = dot(rel, seg);
    if along <= 0 {
        return dot(rel, rel);
    }
    if along >= len_sq {
        let rel_b = point - b;
        return dot(rel_b, rel_b);
    }

    let perp = cross(seg, rel);
    perp * perp / len_sq
}

/// Which side of the directed line `a`->`b` a point lies on.
///
/// Negative: above (or right of a downward vertical line). Positive: below
/// (or left). Zero: on the line.
#[inline]
pub fn side_of(point: IVec2, a: IVec2, b: IVec2) -> i64 {
    cross(b - a, point - a).signum()
}

/// Compass angle of a delta in whole degrees: 0 = up (-y), clockwise, 0..359.
///
/// Octant decomposition over a 33-entry atan table. A zero delta is 0.
pub fn compass_angle(delta: IVec2) -> i32 {
    let (dx, dy) = (delta.x as i64, delta.y as i64);
    if dx == 0 && dy == 0 {
        return 0;
    }
    let (ax, ay) = (dx.abs(), dy.abs());

    // Angle away from the vertical axis, 0..=90
    let off_vertical = if ax <= ay {
        ATAN_DEG[((ax * 32) / ay) as usize]
    } else {
        90 - ATAN_DEG[((ay * 32) / ax) as usize]
    };

    let angle = match (dx >= 0, dy <= 0) {
        (true, true) => off_vertical,
        (true, false) => 180 - off_vertical,
        (false, false) => 180 + off_vertical,
        (false, true) => 360 - off_vertical,
    };
    angle.rem_euclid(360)
}

/// Quantize a compass angle to `steps` equal directions (rounded)
#[inline]
pub fn angle_to_steps(angle: i32, steps: i32) -> i32 {
    ((angle.rem_euclid(360) * steps + 180) / 360).rem_euclid(steps)
}
