#[cfg(test)]
mod sight_tests {
    use math::{Angle, FRACUNIT, Fixed};

    use crate::level::Level;
    use crate::level::builder::{CorridorBuilder, Room};
    use crate::level::map_data::MapData;
    use crate::thing::{MapObject, PLAYER_HEIGHT};

    fn thing_in_room(map: &MapData, room: i32) -> MapObject {
        let x: Fixed = (room * 128 + 64) * FRACUNIT;
        MapObject::spawn(map, x, 64 * FRACUNIT, Angle::default(), PLAYER_HEIGHT)
    }

    fn check(level: &mut Level, from: i32, to: i32) -> bool {
        let looker = thing_in_room(&level.map_data, from);
        let target = thing_in_room(&level.map_data, to);
        level.check_sight(&looker, &target)
    }

    #[test]
    fn reject_answers_without_traversal() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .solid(Room::new(128, 0, 128))
            .build()
            .unwrap();
        let mut level = Level::new(map);
        assert!(!check(&mut level, 0, 1));
        assert!(!check(&mut level, 1, 0));
        assert_eq!(level.sight_counts(), [2, 0]);
        assert_eq!(level.sight_traversals(), 0);
    }

    #[test]
    fn one_sided_wall_blocks_with_empty_reject() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .solid(Room::new(128, 0, 128))
            .without_reject()
            .build()
            .unwrap();
        let mut level = Level::new(map);
        assert!(!check(&mut level, 0, 1));
        assert_eq!(level.sight_counts(), [0, 1]);
        assert!(level.sight_traversals() > 0);
    }

    #[test]
    fn far_leaf_is_not_skipped() {
        // two nodes, the blocking wall is only in the last leaf
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 128))
            .solid(Room::new(128, 0, 128))
            .without_reject()
            .build()
            .unwrap();
        assert_eq!(map.nodes.len(), 2);
        let mut level = Level::new(map);
        assert!(check(&mut level, 0, 1));
        assert!(!check(&mut level, 0, 2));
        assert!(!check(&mut level, 2, 0));
    }

    #[test]
    fn open_rooms_see_each_other() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 200))
            .open(Room::new(128, 16, 128))
            .build()
            .unwrap();
        let mut level = Level::new(map);
        assert!(check(&mut level, 0, 2));
        assert!(check(&mut level, 2, 0));
        assert!(check(&mut level, 1, 1));
    }

    #[test]
    fn low_gap_blocks_sight() {
        // eye height is 42, the gap in the middle room only reaches 20
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 20))
            .open(Room::new(128, 0, 128))
            .build()
            .unwrap();
        let mut level = Level::new(map);
        assert!(!check(&mut level, 0, 2));
        // a closed door is blocked before any slope math
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 0))
            .open(Room::new(128, 0, 128))
            .build()
            .unwrap();
        let mut level = Level::new(map);
        assert!(!check(&mut level, 0, 2));
    }
}
