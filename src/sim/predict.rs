//! Collision predictor
//!
//! Computes a projectile's "life": how many frames it travels before it
//! crosses a wall, which wall that is, and how it should bounce or strafe.
//! The ray is tested once at spawn and once per bounce, never per frame.

use glam::IVec2;

use super::geometry::cross;
use super::walls::{Wall, WallGraph, WallId, WallKind};
use crate::World;
use crate::consts::SUB_SHIFT;

/// Outcome of a life prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifePrediction {
    /// Frames until impact, or the whole budget if nothing is hit
    pub life: i32,
    /// Frames left to spend after bouncing (bounce walls only)
    pub bounce_timer: i32,
    pub hit_wall: Option<WallId>,
    /// 16-step strafe/bounce direction, -1 for none
    pub strafe_dir: i8,
}

impl LifePrediction {
    /// Nothing in the way for the whole budget
    pub fn clear(budget: i32) -> Self {
        Self {
            life: budget,
            bounce_timer: 0,
            hit_wall: None,
            strafe_dir: -1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    frames: i64,
    side: i64,
}

/// Predict the first wall crossed by a projectile at sub-position `sub`
/// moving `vel` per frame for at most `budget` frames.
///
/// NORMAL walls are scanned before BOUNCE walls; on equal frame counts the
/// wall scanned first wins. `ignore` excludes the wall just bounced off.
pub fn predict_life(
    graph: &WallGraph,
    world: &World,
    sub: IVec2,
    vel: IVec2,
    budget: i32,
    ignore: Option<WallId>,
) -> LifePrediction {
    let budget = budget.max(0);
    if vel == IVec2::ZERO || budget == 0 || graph.is_empty() {
        return LifePrediction::clear(budget);
    }

    let travel_x = sub.x as i64 + vel.x as i64 * budget as i64;
    let span_lo = (sub.x as i64).min(travel_x) >> SUB_SHIFT;
    let span_hi = (sub.x as i64).max(travel_x) >> SUB_SHIFT;

    // Unwrapped first, then the copies across each seam the flight reaches
    let width = world.width as i64;
    let offsets = [
        Some(0),
        (world.wraps && span_lo < 0).then_some(width),
        (world.wraps && span_hi >= width).then_some(-width),
    ];

    let mut best: Option<(&Wall, Crossing)> = None;
    for offset in offsets.into_iter().flatten() {
        let start = IVec2::new(
            (sub.x as i64 + (offset << SUB_SHIFT)) as i32,
            sub.y,
        );
        let (lo, hi) = (span_lo + offset, span_hi + offset);

        for kind in [WallKind::Normal, WallKind::Bounce] {
            for wall in graph.iter_kind_except(kind, ignore) {
                // Lists are sorted by start x
                if wall.start.x as i64 > hi {
                    break;
                }
                if (wall.end.x as i64) < lo {
                    continue;
                }
                let Some(hit) = crossing(start, vel, wall) else {
                    continue;
                };
                if hit.frames > budget as i64 {
                    continue;
                }
                if best.is_none_or(|(_, b)| hit.frames < b.frames) {
                    best = Some((wall, hit));
                }
            }
        }
    }

    match best {
        Some((wall, crossing)) => {
            let frames = crossing.frames as i32;
            let side_row = if crossing.side < 0 { 0 } else { 1 };
            LifePrediction {
                life: frames,
                bounce_timer: if wall.kind == WallKind::Bounce {
                    budget - frames
                } else {
                    0
                },
                hit_wall: Some(wall.id),
                strafe_dir: wall.strafe_dir(side_row),
            }
        }
        None => LifePrediction::clear(budget),
    }
}

/// Parametric ray/segment intersection in sub-pixel units.
///
/// Ray `start + t * vel`, segment `a + u * d`. With `denom = vel x d`,
/// `t = ((a - start) x d) / denom` and `u = ((a - start) x vel) / denom`.
/// Frames are `ceil(t)`: the first whole frame at or past the line.
fn crossing(start: IVec2, vel: IVec2, wall: &Wall) -> Option<Crossing> {
    let a = wall.start << SUB_SHIFT;
    let d = wall.delta() << SUB_SHIFT;

    let mut denom = cross(vel, d);
    if denom == 0 {
        return None;
    }
    let w = a - start;
    let mut t_num = cross(w, d);
    let mut u_num = cross(w, vel);
    if denom < 0 {
        denom = -denom;
        t_num = -t_num;
        u_num = -u_num;
    }
    if t_num < 0 || u_num < 0 || u_num > denom {
        return None;
    }

    // Which side the shot approaches from; fall back to the incoming
    // direction when it starts exactly on the line
    let mut side = cross(d, start - a).signum();
    if side == 0 {
        side = cross(d, -vel).signum();
    }

    Some(Crossing {
        frames: (t_num + denom - 1) / denom,
        side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::WallSpec;

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

    fn sub(x: i32, y: i32) -> IVec2 {
        IVec2::new(x, y) << SUB_SHIFT
    }

    #[test]
    fn test_vertical_bounce_wall() {
        let g = graph(&[(WallKind::Bounce, (135, 0), (135, 300))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        // 35 px at 9 px/frame: 3.9 frames, rounded up
        assert_eq!(p.life, 4);
        assert_eq!(p.hit_wall, Some(WallId(0)));
        assert_eq!(p.bounce_timer, 31);
        // Approaching from the left of a downward wall: bounce back west
        assert_eq!(p.strafe_dir, 12);
    }

    #[test]
    fn test_normal_wall_has_no_bounce_timer() {
        let g = graph(&[(WallKind::Normal, (0, 200), (400, 200))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(0, 72), 35, None);
        // 100 px down at 9 px/frame
        assert_eq!(p.life, 12);
        assert_eq!(p.bounce_timer, 0);
        assert_eq!(p.strafe_dir, 0);
    }

    #[test]
    fn test_hit_from_below_normal_wall_has_no_strafe() {
        let g = graph(&[(WallKind::Normal, (0, 200), (400, 200))]);
        let p = predict_life(&g, &world(), sub(100, 300), IVec2::new(0, -72), 35, None);
        assert_eq!(p.hit_wall, Some(WallId(0)));
        assert_eq!(p.strafe_dir, -1);
    }

    #[test]
    fn test_out_of_reach_is_clear() {
        let g = graph(&[(WallKind::Normal, (900, 0), (900, 600))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p, LifePrediction::clear(35));
    }

    #[test]
    fn test_moving_away_never_hits() {
        let g = graph(&[(WallKind::Normal, (50, 0), (50, 600))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.hit_wall, None);
    }

    #[test]
    fn test_ghost_walls_ignored() {
        let g = graph(&[(WallKind::Ghost, (135, 0), (135, 300))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.hit_wall, None);
        assert_eq!(p.life, 35);
    }

    #[test]
    fn test_nearest_wall_wins() {
        let g = graph(&[
            (WallKind::Normal, (200, 0), (200, 300)),
            (WallKind::Bounce, (150, 0), (150, 300)),
        ]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(g.get(p.hit_wall.unwrap()).unwrap().start.x, 150);
        assert_eq!(p.life, 6);
    }

    #[test]
    fn test_tie_goes_to_normal_wall() {
        // Both crossings round up to frame 4
        let g = graph(&[
            (WallKind::Bounce, (130, 0), (130, 300)),
            (WallKind::Normal, (134, 0), (134, 300)),
        ]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.life, 4);
        assert_eq!(g.get(p.hit_wall.unwrap()).unwrap().kind, WallKind::Normal);
        assert_eq!(p.bounce_timer, 0);
    }

    #[test]
    fn test_ignored_wall_is_skipped() {
        let g = graph(&[
            (WallKind::Bounce, (135, 0), (135, 300)),
            (WallKind::Bounce, (180, 0), (180, 300)),
        ]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, Some(WallId(0)));
        assert_eq!(p.hit_wall, Some(WallId(1)));
        assert_eq!(p.life, 9);
    }

    #[test]
    fn test_crossing_past_segment_end_misses() {
        let g = graph(&[(WallKind::Normal, (135, 0), (135, 90))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.hit_wall, None);
    }

    #[test]
    fn test_wrapped_world_sees_across_the_seam() {
        let world = World::new(1000, 600, true);
        let g = graph(&[(WallKind::Normal, (20, 0), (20, 600))]);
        // From x=980 heading east: 40 px to reach x=1020 == 20
        let p = predict_life(&g, &world, sub(980, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.hit_wall, Some(WallId(0)));
        assert_eq!(p.life, 5);

        let flat = World::new(1000, 600, false);
        let p = predict_life(&g, &flat, sub(980, 100), IVec2::new(72, 0), 35, None);
        assert_eq!(p.hit_wall, None);
    }

    #[test]
    fn test_budget_limits_reach() {
        let g = graph(&[(WallKind::Bounce, (135, 0), (135, 300))]);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 3, None);
        assert_eq!(p.hit_wall, None);
        assert_eq!(p.life, 3);
        let p = predict_life(&g, &world(), sub(100, 100), IVec2::new(72, 0), 4, None);
        assert_eq!(p.life, 4);
        assert_eq!(p.bounce_timer, 0);
    }
}
