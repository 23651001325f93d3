//! Wall graph
//!
//! Immutable line segments stored in a dense arena, sorted by ascending
//! start x. Each kind (normal, bounce, ghost) is threaded through the arena
//! as a singly-linked list of indices, so traversal order is deterministic
//! and scans can stop early once walls start past the region of interest.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{angle_to_steps, compass_angle, side_of};
use super::tables::{STRAFE_DIRS_BOUNCE, STRAFE_DIRS_NORMAL};
use crate::consts::JUNCTION_SLOP;
use crate::level::WallSpec;

/// Terrain kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    /// Solid terrain: kills the ship, stops projectiles
    Normal,
    /// Reflects the ship and projectiles
    Bounce,
    /// Drawn but never collides
    Ghost,
}

impl WallKind {
    pub const ALL: [WallKind; 3] = [WallKind::Normal, WallKind::Bounce, WallKind::Ghost];

    fn index(self) -> usize {
        match self {
            WallKind::Normal => 0,
            WallKind::Bounce => 1,
            WallKind::Ghost => 2,
        }
    }
}

/// Stable handle to a wall in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub u32);

impl WallId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One of eight line orientations, legacy type codes 1..8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallOrientation {
    S,
    Sse,
    Se,
    Ese,
    E,
    Ene,
    Ne,
    Nne,
}

impl WallOrientation {
    /// Legacy type code (S = 1 .. NNE = 8)
    pub fn code(self) -> usize {
        match self {
            WallOrientation::S => 1,
            WallOrientation::Sse => 2,
            WallOrientation::Se => 3,
            WallOrientation::Ese => 4,
            WallOrientation::E => 5,
            WallOrientation::Ene => 6,
            WallOrientation::Ne => 7,
            WallOrientation::Nne => 8,
        }
    }

    /// 16-step compass direction walking from the start point
    pub fn direction(self) -> i32 {
        9 - self.code() as i32
    }

    /// 16-step compass direction walking from the end point
    pub fn reverse_direction(self) -> i32 {
        (self.direction() + 8) % 16
    }

    /// Bucket an arbitrary segment delta to the nearest orientation.
    ///
    /// Lines are undirected here: a delta and its negation give the same
    /// orientation.
    pub fn from_delta(delta: IVec2) -> Self {
        let dir = angle_to_steps(compass_angle(delta), 16) % 8;
        match dir {
            1 => WallOrientation::Nne,
            2 => WallOrientation::Ne,
            3 => WallOrientation::Ene,
            4 => WallOrientation::E,
            5 => WallOrientation::Ese,
            6 => WallOrientation::Se,
            7 => WallOrientation::Sse,
            _ => WallOrientation::S,
        }
    }
}

/// A wall segment with precomputed orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub kind: WallKind,
    /// Leftmost endpoint (topmost for vertical walls)
    pub start: IVec2,
    pub end: IVec2,
    pub orientation: WallOrientation,
    /// Next wall of the same kind
    pub next: Option<WallId>,
}

impl Wall {
    #[inline]
    pub fn delta(&self) -> IVec2 {
        self.end - self.start
    }

    /// Strafe direction for a hit from `side_row` (0 = above/right, 1 = below/left)
    pub fn strafe_dir(&self, side_row: usize) -> i8 {
        let table = match self.kind {
            WallKind::Bounce => &STRAFE_DIRS_BOUNCE,
            _ => &STRAFE_DIRS_NORMAL,
        };
        table[side_row.min(1)][self.orientation.code()]
    }

    /// Outward normal (16-step) on the side of the wall where `point` lies
    pub fn normal_toward(&self, point: IVec2) -> i32 {
        let row = if side_of(point, self.start, self.end) > 0 { 1 } else { 0 };
        STRAFE_DIRS_BOUNCE[row][self.orientation.code()] as i32
    }

    /// Horizontal extent
    #[inline]
    pub fn x_range(&self) -> (i32, i32) {
        (self.start.x, self.end.x)
    }

    /// Vertical extent
    #[inline]
    pub fn y_range(&self) -> (i32, i32) {
        (self.start.y.min(self.end.y), self.start.y.max(self.end.y))
    }
}

/// Arena of walls with one linked list per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallGraph {
    walls: Vec<Wall>,
    heads: [Option<WallId>; 3],
    junctions: Vec<IVec2>,
}

impl WallGraph {
    /// Build the graph from authored segments.
    ///
    /// Endpoints are normalized so `start.x <= end.x`, then walls are stably
    /// sorted by start x. Zero-length segments are dropped.
    pub fn new(specs: &[WallSpec]) -> Self {
        let mut segments: Vec<(WallKind, IVec2, IVec2)> = specs
            .iter()
            .filter_map(|spec| {
                if spec.start == spec.end {
                    log::debug!("Dropping zero-length wall at {:?}", spec.start);
                    return None;
                }
                let (a, b) = (spec.start, spec.end);
                let swap = a.x > b.x || (a.x == b.x && a.y > b.y);
                Some(if swap { (spec.kind, b, a) } else { (spec.kind, a, b) })
            })
            .collect();
        segments.sort_by_key(|&(_, start, _)| start.x);

        let mut walls: Vec<Wall> = segments
            .into_iter()
            .enumerate()
            .map(|(i, (kind, start, end))| Wall {
                id: WallId(i as u32),
                kind,
                start,
                end,
                orientation: WallOrientation::from_delta(end - start),
                next: None,
            })
            .collect();

        // Thread each kind back to front so the links follow arena order
        let mut heads = [None; 3];
        for wall in walls.iter_mut().rev() {
            let slot = &mut heads[wall.kind.index()];
            wall.next = *slot;
            *slot = Some(wall.id);
        }

        let junctions = find_junctions(&walls);

        log::debug!(
            "Wall graph: {} walls, {} junctions",
            walls.len(),
            junctions.len()
        );

        Self {
            walls,
            heads,
            junctions,
        }
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Look up a wall; `None` if the id is stale
    pub fn get(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id.index())
    }

    /// All walls in arena order
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// First wall of a kind
    pub fn first(&self, kind: WallKind) -> Option<WallId> {
        self.heads[kind.index()]
    }

    /// Walk one kind's list in ascending start-x order
    pub fn iter_kind(&self, kind: WallKind) -> KindIter<'_> {
        KindIter {
            graph: self,
            cursor: self.first(kind),
        }
    }

    /// Walk one kind's list, skipping `ignore`
    pub fn iter_kind_except(
        &self,
        kind: WallKind,
        ignore: Option<WallId>,
    ) -> impl Iterator<Item = &Wall> + '_ {
        self.iter_kind(kind).filter(move |w| Some(w.id) != ignore)
    }

    /// Junction points sorted by ascending x
    pub fn junctions(&self) -> &[IVec2] {
        &self.junctions
    }
}

/// Forward traversal of one kind's list
pub struct KindIter<'a> {
    graph: &'a WallGraph,
    cursor: Option<WallId>,
}

impl<'a> Iterator for KindIter<'a> {
    type Item = &'a Wall;

    fn next(&mut self) -> Option<Self::Item> {
        let wall = self.graph.get(self.cursor?)?;
        self.cursor = wall.next;
        Some(wall)
    }
}

fn find_junctions(walls: &[Wall]) -> Vec<IVec2> {
    let mut junctions: Vec<IVec2> = Vec::new();
    for wall in walls {
        for point in [wall.start, wall.end] {
            let known = junctions.iter().any(|j| {
                (j.x - point.x).abs() <= JUNCTION_SLOP && (j.y - point.y).abs() <= JUNCTION_SLOP
            });
            if !known {
                junctions.push(point);
            }
        }
    }
    junctions.sort_by_key(|j| j.x);
    junctions
}
