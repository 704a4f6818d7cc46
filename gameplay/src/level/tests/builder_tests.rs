#[cfg(test)]
mod builder_tests {
    use math::FRACUNIT;

    use crate::level::MapError;
    use crate::level::builder::{CorridorBuilder, Room};
    use crate::level::flags::{LineDefFlags, render_flags};
    use crate::level::map_data::IS_SSECTOR_MASK;
    use crate::level::map_defs::line_render_flags;

    fn three_rooms() -> CorridorBuilder {
        CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 128))
            .solid(Room::new(128, 0, 128))
    }

    #[test]
    fn corridor_layout() {
        let map = three_rooms().build().unwrap();
        assert_eq!(map.sectors.len(), 3);
        assert_eq!(map.subsectors.len(), 3);
        assert_eq!(map.nodes.len(), 2);
        assert_eq!(map.start_node, 1);
        assert_eq!(map.vertexes.len(), 8);
        // 4 walls per room, the open boundary is one line with two segs
        assert_eq!(map.segments.len(), 12);
        assert_eq!(map.linedefs.len(), 11);
        for ss in &map.subsectors {
            assert_eq!(ss.seg_count, 4);
        }
    }

    #[test]
    fn points_land_in_their_room() {
        let map = three_rooms().build().unwrap();
        for room in 0..3 {
            let x = (room * 128 + 64) * FRACUNIT;
            let ss = map.point_in_subsector(x, 64 * FRACUNIT);
            assert_eq!(map.subsectors[ss].sector, room as usize);
        }
    }

    #[test]
    fn single_room_has_no_nodes() {
        let map = CorridorBuilder::new(64, Room::new(64, 0, 64)).build().unwrap();
        assert!(map.nodes.is_empty());
        assert_eq!(map.start_node, IS_SSECTOR_MASK);
        assert_eq!(map.point_in_subsector(10 * FRACUNIT, 10 * FRACUNIT), 0);
    }

    #[test]
    fn segs_face_in_to_their_room() {
        let map = three_rooms().build().unwrap();
        for ss in &map.subsectors {
            for seg in map.subsector_segs(ss) {
                assert_eq!(seg.frontsector, ss.sector);
                assert_eq!(map.sidedefs[seg.sidedef].sector, ss.sector);
                assert_eq!(seg.length, 64 << 16);
            }
        }
    }

    #[test]
    fn reject_marks_walled_off_rooms() {
        let map = three_rooms().build().unwrap();
        assert!(!map.reject().is_rejected(0, 1));
        assert!(map.reject().is_rejected(0, 2));
        assert!(map.reject().is_rejected(2, 1));
        assert!(!map.reject().is_rejected(2, 2));

        let map = three_rooms().without_reject().build().unwrap();
        assert!(map.reject().as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn open_line_between_matching_rooms_is_ignored() {
        let map = three_rooms().build().unwrap();
        let line = map.linedefs.iter().find(|l| l.is_two_sided()).unwrap();
        let flags = line_render_flags(
            line,
            &map.sidedefs[line.front_sidedef],
            &map.sectors[line.frontsector],
            &map.sectors[line.backsector.unwrap()],
            usize::MAX,
        );
        assert_eq!(flags, render_flags::IGNORE);
    }

    #[test]
    fn grate_is_masked_and_never_ignored() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .grate(Room::new(128, 0, 128), 1, true)
            .build()
            .unwrap();
        let line = map.linedefs.iter().find(|l| l.is_two_sided()).unwrap();
        assert!(LineDefFlags::Translucent.is_set(line.flags));
        let front = &map.sidedefs[line.front_sidedef];
        assert_eq!(front.midtexture, Some(1));
        assert_eq!(map.sidedefs[line.back_sidedef.unwrap()].midtexture, Some(1));
        let flags = line_render_flags(
            line,
            front,
            &map.sectors[line.frontsector],
            &map.sectors[line.backsector.unwrap()],
            usize::MAX,
        );
        assert_eq!(flags, 0);
        // a grate does not wall off the rooms for REJECT
        assert!(!map.reject().is_rejected(0, 1));
    }

    #[test]
    fn bad_rooms_are_refused() {
        let err = CorridorBuilder::new(128, Room::new(0, 0, 128)).build();
        assert!(matches!(err, Err(MapError::InvalidRoom(_))));
        let err = CorridorBuilder::new(128, Room::new(64, 100, 0)).build();
        assert!(matches!(err, Err(MapError::InvalidRoom(_))));
        let err = CorridorBuilder::new(0, Room::new(64, 0, 64)).build();
        assert!(matches!(err, Err(MapError::InvalidRoom(_))));
    }
}
