//! Ship movement and the ship bounce integrator
//!
//! The ship moves in 1/256 px units. Terrain contact is tested on a small
//! bitmap window around the ship: overlap that appears only once bounce
//! walls are drawn is a new bounce, overlap with normal walls is a crash.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision_map::CollisionMap;
use super::geometry::distance_to_segment;
use super::reflect::bounce_ship;
use super::tables::shot_vector;
use super::tick::TickInput;
use super::walls::{Wall, WallGraph, WallId, WallKind};
use crate::consts::{SHIP_RADIUS, SHIP_ROTATIONS, SHIP_SUB_SHIFT};
use crate::error::Result;
use crate::{World, wrapped_dx};

/// Extra pixels around the ship footprint in the terrain window
const WINDOW_MARGIN: i32 = 2;

/// Player ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipState {
    /// Pixel position (center)
    pub pos: IVec2,
    /// Position in 1/256 px
    pub sub: IVec2,
    /// Velocity in 1/256 px per frame
    pub vel: IVec2,
    /// Facing, 0..31 (0 = up, clockwise)
    pub rot: i32,
    /// Set on any tick the bounce integrator kicked the ship
    pub bouncing: bool,
    /// Last position with no bounce-wall overlap; anchors the bounce side
    pub last_safe: IVec2,
    pub shielding: bool,
    pub alive: bool,
}

impl ShipState {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            sub: pos << SHIP_SUB_SHIFT,
            vel: IVec2::ZERO,
            rot: 0,
            bouncing: false,
            last_safe: pos,
            shielding: false,
            alive: true,
        }
    }

    /// Velocity of a shot fired now: muzzle vector plus inherited motion
    pub fn shot_velocity(&self) -> IVec2 {
        shot_vector(self.rot) + (self.vel >> 5)
    }
}

/// Apply one tick of steering, thrust, drag and integration.
///
/// Firing is handled by the tick driver since it needs the shot pool.
pub fn steer(ship: &mut ShipState, input: &TickInput, world: &World, thrust_scale: i32) {
    if !ship.alive {
        return;
    }

    if input.turn_left {
        ship.rot = (ship.rot - 1).rem_euclid(SHIP_ROTATIONS);
    }
    if input.turn_right {
        ship.rot = (ship.rot + 1).rem_euclid(SHIP_ROTATIONS);
    }
    ship.shielding = input.shield;

    if input.thrust {
        ship.vel += shot_vector(ship.rot) * thrust_scale / 8;
    }
    // Drag
    ship.vel -= ship.vel >> 6;

    ship.sub += ship.vel;
    ship.sub.x = world.wrap_scaled_x(ship.sub.x, SHIP_SUB_SHIFT);

    let max_y = (world.height - 1) << SHIP_SUB_SHIFT;
    if ship.sub.y < 0 {
        ship.sub.y = 0;
        ship.vel.y = 0;
    } else if ship.sub.y > max_y {
        ship.sub.y = max_y;
        ship.vel.y = 0;
    }
    if !world.wraps {
        let max_x = (world.width - 1) << SHIP_SUB_SHIFT;
        if ship.sub.x < 0 || ship.sub.x > max_x {
            ship.sub.x = ship.sub.x.clamp(0, max_x);
            ship.vel.x = 0;
        }
    }

    ship.pos = ship.sub >> SHIP_SUB_SHIFT;
}

/// A bounce applied by the integrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipBounce {
    pub wall: WallId,
    /// 16-step normal the kick was applied along
    pub norm: i32,
}

/// Result of one integrator pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainContact {
    pub bounce: Option<ShipBounce>,
    /// Ship overlaps normal terrain
    pub crashed: bool,
}

/// Run the bounce integrator for the ship's current position.
///
/// 1. Rasterize normal walls (the fatal map), then ghost walls on a copy.
/// 2. Note the overlap, add bounce walls, compare.
/// 3. New overlap: kick off the nearest bounce wall on the side of the last
///    safe position, then erase the footprint. No overlap at all: the
///    current position becomes the last safe one.
/// 4. Report a crash if normal terrain still overlaps.
pub fn resolve_terrain(
    ship: &mut ShipState,
    graph: &WallGraph,
    world: &World,
) -> Result<TerrainContact> {
    ship.bouncing = false;
    let mut contact = TerrainContact::default();
    if !ship.alive {
        return Ok(contact);
    }

    let mut fatal = CollisionMap::around(ship.pos, SHIP_RADIUS + WINDOW_MARGIN);
    rasterize(&mut fatal, graph, WallKind::Normal, world);

    let mut mask = fatal.clone();
    rasterize(&mut mask, graph, WallKind::Ghost, world);
    let before = mask.overlaps_disk(ship.pos, SHIP_RADIUS)?;
    rasterize(&mut mask, graph, WallKind::Bounce, world);
    let after = mask.overlaps_disk(ship.pos, SHIP_RADIUS)?;

    if after && !before {
        if let Some(wall) = nearest_wall(graph, WallKind::Bounce, ship.pos, world) {
            let norm = wall.normal_toward(local_point(wall, ship.last_safe, world));
            bounce_ship(ship, norm);
            log::debug!("Ship bounced off wall {:?} along {}", wall.id, norm);
            contact.bounce = Some(ShipBounce { wall: wall.id, norm });
        }
        mask.clear_disk(ship.pos, SHIP_RADIUS);
        fatal.clear_disk(ship.pos, SHIP_RADIUS);
    } else if !after {
        ship.last_safe = ship.pos;
    }

    contact.crashed = fatal.overlaps_disk(ship.pos, SHIP_RADIUS)?;
    Ok(contact)
}

/// Horizontal copies of the world to draw so walls across the seam show up
fn wrap_offsets(world: &World) -> &'static [i32] {
    if world.wraps { &[0, 1, -1] } else { &[0] }
}

fn rasterize(map: &mut CollisionMap, graph: &WallGraph, kind: WallKind, world: &World) {
    let lo = map.origin();
    let hi = lo + IVec2::new(map.width() - 1, map.height() - 1);
    for &copy in wrap_offsets(world) {
        let shift = IVec2::new(copy * world.width, 0);
        for wall in graph.iter_kind(kind) {
            let (x0, x1) = wall.x_range();
            let (y0, y1) = wall.y_range();
            if x1 + shift.x < lo.x || x0 + shift.x > hi.x || y1 < lo.y || y0 > hi.y {
                continue;
            }
            map.draw_line(wall.start + shift, wall.end + shift);
        }
    }
}

/// Express `p` in the copy of the world closest to the wall
fn local_point(wall: &Wall, p: IVec2, world: &World) -> IVec2 {
    let mid = (wall.start.x + wall.end.x) / 2;
    IVec2::new(mid + wrapped_dx(mid, p.x, world.width, world.wraps), p.y)
}

/// Closest wall of a kind by true segment distance
pub fn nearest_wall<'a>(
    graph: &'a WallGraph,
    kind: WallKind,
    p: IVec2,
    world: &World,
) -> Option<&'a Wall> {
    graph
        .iter_kind(kind)
        .min_by_key(|wall| distance_to_segment(local_point(wall, p, world), wall.start, wall.end))
}
