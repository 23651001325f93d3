//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Integer arithmetic only
//! - Seeded RNG only, one source per run
//! - Stable iteration order (arena order for walls, slot order for pools)
//! - No rendering, audio or platform dependencies

pub mod bunkers;
pub mod collision_map;
pub mod geometry;
pub mod predict;
pub mod reflect;
pub mod rng;
pub mod ship;
pub mod shots;
pub mod state;
pub mod tables;
pub mod tick;
pub mod walls;

pub use bunkers::{Bunker, BunkerKind, FiringRange};
pub use collision_map::CollisionMap;
pub use geometry::{distance_to_segment, in_distance, in_distance_bounded};
pub use predict::{LifePrediction, predict_life};
pub use reflect::{bounce_ship, bounce_shot_velocity};
pub use rng::{RandomSource, ScriptedRng, SimRng};
pub use ship::ShipState;
pub use shots::{Shot, ShotOwner, ShotPool, Strafe, StrafePool, is_new_spawn, spawned_slots};
pub use state::{SimEvent, SimState};
pub use tick::{TickInput, tick, tick_with_rng};
pub use walls::{Wall, WallGraph, WallId, WallKind, WallOrientation};
