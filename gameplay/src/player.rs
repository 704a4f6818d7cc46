use math::{Angle, FRACUNIT, Fixed, fixed_mul};

use crate::level::map_data::MapData;
use crate::thing::{MapObject, PLAYER_HEIGHT};

/// Eye level above the floor
pub const VIEWHEIGHT: Fixed = 41 * FRACUNIT;

/// The camera the level is drawn from
#[derive(Debug, Clone)]
pub struct Player {
    pub mobj: MapObject,
    /// Absolute eye height, recalculated on every move
    pub viewz: Fixed,
    pub viewheight: Fixed,
    /// Gun flash light boost, added to every wall and flat light level
    pub extralight: i32,
    /// Colourmap forced on while a power up is active
    pub fixedcolormap: Option<usize>,
}

impl Player {
    pub fn new(map: &MapData, x: Fixed, y: Fixed, angle: Angle) -> Self {
        let mobj = MapObject::spawn(map, x, y, angle, PLAYER_HEIGHT);
        let mut player = Self {
            viewz: 0,
            viewheight: VIEWHEIGHT,
            extralight: 0,
            fixedcolormap: None,
            mobj,
        };
        player.calc_view_z(map);
        player
    }

    /// Eye height clipped so it never goes through the ceiling. Doom
    /// function name `P_CalcHeight` without the bob.
    pub fn calc_view_z(&mut self, map: &MapData) {
        let sector = &map.sectors[self.mobj.sector(map)];
        self.viewz = (self.mobj.z + self.viewheight).min(sector.ceilingheight - 4 * FRACUNIT);
    }

    /// Move along the view direction by `distance` map units, negative
    /// steps backwards
    pub fn walk(&mut self, map: &MapData, distance: Fixed) {
        let x = self.mobj.x + fixed_mul(distance, self.mobj.angle.cos());
        let y = self.mobj.y + fixed_mul(distance, self.mobj.angle.sin());
        self.mobj.move_to(map, x, y);
        self.calc_view_z(map);
    }

    pub fn turn(&mut self, delta: Angle) {
        self.mobj.angle += delta;
    }
}
