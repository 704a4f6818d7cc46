//! The data that makes up an entire level, along with the state that changes
//! as the level plays (the tic counter, the sight tracer scratch data).

pub mod builder;
pub mod flags;
pub mod map_data;
pub mod map_defs;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::fmt;

use log::info;

use crate::level::map_data::MapData;
use crate::thing::MapObject;
use crate::thing::sight::SightTracer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A level needs at least one subsector to stand in
    Empty,
    BadIndex {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    /// A partition line with no direction
    DegenerateNode(usize),
    InvalidRoom(String),
}

impl Error for MapError {}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Empty => write!(f, "level has no subsectors"),
            MapError::BadIndex { kind, index, len } => {
                write!(f, "{kind} index {index} out of range (have {len})")
            }
            MapError::DegenerateNode(n) => write!(f, "node {n} has a zero length partition"),
            MapError::InvalidRoom(m) => write!(f, "{m}"),
        }
    }
}

/// The level is considered a `World` or sorts. One that exists only
/// while the player is in it.
pub struct Level {
    pub map_data: MapData,
    /// Tics since the level started, drives scrolling and swirling flats
    pub level_time: u32,
    sight: SightTracer,
}

impl Level {
    pub fn new(map_data: MapData) -> Self {
        info!(
            "Level loaded: {} sectors, {} subsectors",
            map_data.sectors.len(),
            map_data.subsectors.len()
        );
        let sight = SightTracer::new(map_data.linedefs.len());
        Self {
            map_data,
            level_time: 0,
            sight,
        }
    }

    pub fn tic(&mut self) {
        self.level_time = self.level_time.wrapping_add(1);
    }

    /// True if `looker` has an unobstructed line of sight to any part of
    /// `target`. Doom function name `P_CheckSight`.
    pub fn check_sight(&mut self, looker: &MapObject, target: &MapObject) -> bool {
        self.sight.check_sight(&self.map_data, looker, target)
    }

    /// Sight checks answered by the REJECT table (`[0]`) and by walking the
    /// BSP (`[1]`)
    pub fn sight_counts(&self) -> [u32; 2] {
        self.sight.sight_counts()
    }

    /// Number of BSP nodes and leaves entered by sight checks so far
    pub fn sight_traversals(&self) -> u32 {
        self.sight.traversals()
    }
}
