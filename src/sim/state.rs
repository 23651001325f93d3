//! Simulation state and intents
//!
//! Everything the tick mutates lives in one owned struct; there are no
//! globals. Walls and bunkers are replaced wholesale between levels.

use glam::IVec2;

use super::bunkers::Bunker;
use super::rng::SimRng;
use super::ship::ShipState;
use super::shots::{ShotOwner, ShotPool, StrafePool};
use super::walls::{WallGraph, WallId};
use crate::config::SimConfig;
use crate::consts::*;
use crate::error::Result;
use crate::level::LevelData;
use crate::World;

/// Intents for the render and sound layers, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// A shot took a pool slot
    ProjectileSpawned { owner: ShotOwner, slot: usize },
    /// A shot died this tick; draw it one last time
    ProjectileJustDied {
        owner: ShotOwner,
        slot: usize,
        pos: IVec2,
    },
    StrafeSpawned { slot: usize, pos: IVec2, dir: i8 },
    BunkerDestroyed { index: usize, pos: IVec2 },
    ShipBounced { wall: WallId, norm: i32 },
    /// A ship shot ran back into the ship
    ShieldFeedback,
    /// A bunker shot was absorbed by the shield
    ShotDeflected { slot: usize },
    ShipKilled,
    ShipCrashed,
    ShipSelfDestructed,
}

/// Complete simulation state (deterministic)
#[derive(Debug, Clone)]
pub struct SimState {
    pub config: SimConfig,
    pub world: World,
    pub walls: WallGraph,
    pub bunkers: Vec<Bunker>,
    pub ship: ShipState,
    pub ship_shots: ShotPool,
    pub bunker_shots: ShotPool,
    pub strafes: StrafePool,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: SimRng,
}

impl SimState {
    /// Create a state for `level` with the given seed
    pub fn new(config: SimConfig, level: &LevelData, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut state = Self {
            world: World::new(config.world_width, config.world_height, config.wraps),
            walls: WallGraph::default(),
            bunkers: Vec::new(),
            ship: ShipState::new(level.ship_start),
            ship_shots: ShotPool::new(ShotOwner::Ship, NUM_SHIP_SHOTS),
            bunker_shots: ShotPool::new(ShotOwner::Bunker, NUM_BUNKER_SHOTS),
            strafes: StrafePool::new(NUM_STRAFES),
            seed,
            time_ticks: 0,
            rng: SimRng::new(seed),
            config,
        };
        state.load_level(level)?;
        Ok(state)
    }

    /// Replace walls, bunkers and the ship; clear all pools
    pub fn load_level(&mut self, level: &LevelData) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(width) = level.world_width {
            config.world_width = width;
        }
        if let Some(wraps) = level.wraps {
            config.wraps = wraps;
        }
        config.validate()?;
        self.world = World::new(config.world_width, config.world_height, config.wraps);

        self.walls = WallGraph::new(&level.walls);
        self.bunkers = level.bunkers.iter().map(Bunker::from_spec).collect();
        self.ship = ShipState::new(level.ship_start);
        self.ship_shots.reset();
        self.bunker_shots.reset();
        self.strafes.reset();

        log::info!(
            "Level loaded: {} walls, {} bunkers, world {}x{}{}",
            self.walls.len(),
            self.bunkers.len(),
            self.world.width,
            self.world.height,
            if self.world.wraps { " (wrapping)" } else { "" }
        );
        Ok(())
    }

    /// Bunkers still standing
    pub fn bunkers_alive(&self) -> usize {
        self.bunkers.iter().filter(|b| b.alive).count()
    }
}
