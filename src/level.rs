//! Level geometry records
//!
//! Consumed once at level load to build the wall graph and bunker set.
//! How these records are produced is up to the level loader.

use std::fs;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::bunkers::{BunkerKind, FiringRange};
use crate::sim::walls::WallKind;

/// One wall segment as authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSpec {
    pub kind: WallKind,
    pub start: IVec2,
    pub end: IVec2,
}

impl WallSpec {
    pub fn new(kind: WallKind, start: IVec2, end: IVec2) -> Self {
        Self { kind, start, end }
    }
}

/// One bunker as authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BunkerSpec {
    pub kind: BunkerKind,
    pub pos: IVec2,
    /// Facing (WALL/DIFF, 0..15) or animation frame (others, 0..7)
    #[serde(default)]
    pub rot: i32,
    /// Overrides the default firing ranges for this kind/facing
    #[serde(default)]
    pub ranges: Option<[FiringRange; 2]>,
}

/// Everything needed to start a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub walls: Vec<WallSpec>,
    #[serde(default)]
    pub bunkers: Vec<BunkerSpec>,
    #[serde(default)]
    pub ship_start: IVec2,
    /// Level-specific world width (overrides config)
    #[serde(default)]
    pub world_width: Option<i32>,
    /// Level-specific wrap flag (overrides config)
    #[serde(default)]
    pub wraps: Option<bool>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let level = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!(
            "Loaded level from {} ({} walls, {} bunkers)",
            path.display(),
            level.walls.len(),
            level.bunkers.len()
        );
        Ok(level)
    }
}
