//! Things in the world. Only what sight checks and the view need is kept:
//! a position, an angle, a height, and the subsector the thing stands in.

pub mod sight;

use math::{Angle, FRACUNIT, Fixed};

use crate::level::map_data::MapData;

/// Default height of a player sized thing
pub const PLAYER_HEIGHT: Fixed = 56 * FRACUNIT;

#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub x: Fixed,
    pub y: Fixed,
    /// Feet
    pub z: Fixed,
    pub height: Fixed,
    pub angle: Angle,
    /// Subsector the thing is in, updated on every move
    pub subsector: usize,
}

impl MapObject {
    /// Spawn standing on the floor of whatever sector `(x, y)` is in
    pub fn spawn(map: &MapData, x: Fixed, y: Fixed, angle: Angle, height: Fixed) -> Self {
        let subsector = map.point_in_subsector(x, y);
        let z = map.sectors[map.subsectors[subsector].sector].floorheight;
        Self {
            x,
            y,
            z,
            height,
            angle,
            subsector,
        }
    }

    /// Move to a new position and re-link in to the level. Keeps to the floor.
    pub fn move_to(&mut self, map: &MapData, x: Fixed, y: Fixed) {
        self.x = x;
        self.y = y;
        self.subsector = map.point_in_subsector(x, y);
        self.z = map.sectors[self.sector(map)].floorheight;
    }

    #[inline]
    pub fn sector(&self, map: &MapData) -> usize {
        map.subsectors[self.subsector].sector
    }

    /// Eye height used as the start of a sight line, three quarters up
    #[inline]
    pub fn sight_z(&self) -> Fixed {
        self.z + self.height - (self.height >> 2)
    }
}
