//! The built in level the viewer walks through. Every room shows off
//! something different: a step, a non power of two wall, a see-through grate
//! under an open sky, a scrolling liquid floor, and a room walled off
//! entirely.

use gameplay::{CorridorBuilder, MapData, MapError, MapObject, PLAYER_HEIGHT, Player, Room};
use math::{ANG180, Angle, FRACUNIT};

// generated picture numbers
const BRICK: usize = 0;
const CHECK72: usize = 1;
const LITPANEL: usize = 2;
const FLOOR4_8: usize = 0;
const CEIL3_5: usize = 1;
const NUKAGE1: usize = 2;
const TLITE6_5: usize = 3;
const F_SKY1: usize = 4;

const DEPTH: i32 = 192;

pub fn corridor() -> Result<MapData, MapError> {
    CorridorBuilder::new(
        DEPTH,
        Room::new(256, 0, 128)
            .pics(FLOOR4_8, CEIL3_5)
            .wall(BRICK),
    )
    .open(
        Room::new(192, 24, 216)
            .pics(FLOOR4_8, TLITE6_5)
            .light(200)
            .wall(CHECK72),
    )
    .grate(
        Room::new(160, 0, 256)
            .pics(FLOOR4_8, F_SKY1)
            .light(255)
            .wall(LITPANEL),
        CHECK72,
        true,
    )
    .open(
        Room::new(256, -16, 128)
            .pics(NUKAGE1, CEIL3_5)
            .light(144)
            .flow(201)
            .wall(BRICK),
    )
    .solid(Room::new(128, 0, 128).pics(FLOOR4_8, CEIL3_5).wall(BRICK))
    .build()
}

/// Near the west wall, facing east down the corridor
pub fn player(map: &MapData) -> Player {
    Player::new(map, 48 * FRACUNIT, DEPTH / 2 * FRACUNIT, Angle::default())
}

/// Things that look back at the player: one down the corridor, one walled
/// off in the last room
pub fn watchers(map: &MapData) -> Vec<(&'static str, MapObject)> {
    let facing_west = Angle::new(ANG180);
    let y = DEPTH / 2 * FRACUNIT;
    vec![
        (
            "corridor",
            MapObject::spawn(map, 800 * FRACUNIT, y, facing_west, PLAYER_HEIGHT),
        ),
        (
            "sealed room",
            MapObject::spawn(map, 928 * FRACUNIT, y, facing_west, PLAYER_HEIGHT),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use gameplay::Level;

    use super::{corridor, player, watchers};

    #[test]
    fn watchers_stand_where_expected() {
        let map = corridor().unwrap();
        let sectors: Vec<usize> = watchers(&map).iter().map(|(_, m)| m.sector(&map)).collect();
        assert_eq!(sectors, vec![3, 4]);
        assert_eq!(player(&map).mobj.sector(&map), 0);
    }

    #[test]
    fn sealed_room_is_rejected() {
        let mut level = Level::new(corridor().unwrap());
        let player = player(&level.map_data);
        let watchers = watchers(&level.map_data);
        assert!(level.check_sight(&watchers[0].1, &player.mobj));
        assert!(!level.check_sight(&watchers[1].1, &player.mobj));
        assert_eq!(level.sight_counts()[0], 1);
    }
}
