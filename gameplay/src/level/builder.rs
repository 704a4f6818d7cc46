//! Builds small, valid levels directly in memory: a straight corridor of
//! rectangular rooms laid out west to east. Each room is one convex sector
//! and one subsector, and the BSP splits on the room boundaries.
//!
//! Used by the viewer to have something to look at without a WAD, and by the
//! tests to set up exact geometry.

use log::debug;
use math::{Divline, FRACUNIT, Fixed, point_to_angle_wide};

use crate::level::MapError;
use crate::level::flags::LineDefFlags;
use crate::level::map_data::{IS_SSECTOR_MASK, MapData, RejectMatrix};
use crate::level::map_defs::{
    BBox, LineDef, Node, Sector, Segment, SideDef, SlopeType, SubSector, Vertex,
};

/// One rectangular room. Heights and sizes are whole map units.
#[derive(Debug, Clone)]
pub struct Room {
    pub width: i32,
    pub floor: i32,
    pub ceiling: i32,
    pub floorpic: usize,
    pub ceilingpic: usize,
    pub light: i32,
    /// Wall texture used for every side facing in to this room
    pub wall: usize,
    pub flow: i16,
}

impl Room {
    pub fn new(width: i32, floor: i32, ceiling: i32) -> Self {
        Self {
            width,
            floor,
            ceiling,
            floorpic: 0,
            ceilingpic: 0,
            light: 160,
            wall: 0,
            flow: 0,
        }
    }

    pub fn pics(mut self, floorpic: usize, ceilingpic: usize) -> Self {
        self.floorpic = floorpic;
        self.ceilingpic = ceilingpic;
        self
    }

    pub fn light(mut self, light: i32) -> Self {
        self.light = light;
        self
    }

    pub fn wall(mut self, wall: usize) -> Self {
        self.wall = wall;
        self
    }

    pub fn flow(mut self, flow: i16) -> Self {
        self.flow = flow;
        self
    }
}

/// What separates a room from the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// A single two-sided line
    Open,
    /// Two back to back one-sided walls
    Solid,
    /// A two-sided line with a see-through middle texture on both sides
    Grate { texture: usize, translucent: bool },
}

pub struct CorridorBuilder {
    depth: i32,
    origin_x: i32,
    rooms: Vec<Room>,
    boundaries: Vec<Boundary>,
    build_reject: bool,
}

impl CorridorBuilder {
    /// `depth` is the north-south size shared by every room
    pub fn new(depth: i32, first: Room) -> Self {
        Self {
            depth,
            origin_x: 0,
            rooms: vec![first],
            boundaries: Vec::new(),
            build_reject: true,
        }
    }

    /// West edge of the first room
    pub fn origin(mut self, x: i32) -> Self {
        self.origin_x = x;
        self
    }

    pub fn open(mut self, room: Room) -> Self {
        self.boundaries.push(Boundary::Open);
        self.rooms.push(room);
        self
    }

    pub fn solid(mut self, room: Room) -> Self {
        self.boundaries.push(Boundary::Solid);
        self.rooms.push(room);
        self
    }

    /// Join `room` through a masked middle texture
    pub fn grate(mut self, room: Room, texture: usize, translucent: bool) -> Self {
        self.boundaries.push(Boundary::Grate {
            texture,
            translucent,
        });
        self.rooms.push(room);
        self
    }

    /// Leave the REJECT table zeroed instead of rejecting sector pairs that
    /// are walled off from each other
    pub fn without_reject(mut self) -> Self {
        self.build_reject = false;
        self
    }

    pub fn build(self) -> Result<MapData, MapError> {
        if self.depth <= 0 {
            return Err(MapError::InvalidRoom(format!(
                "corridor depth {} must be positive",
                self.depth
            )));
        }
        for (i, room) in self.rooms.iter().enumerate() {
            if room.width <= 0 || room.ceiling < room.floor {
                return Err(MapError::InvalidRoom(format!(
                    "room {i} has width {} floor {} ceiling {}",
                    room.width, room.floor, room.ceiling
                )));
            }
        }

        let depth = self.depth * FRACUNIT;
        let mut edges = Vec::with_capacity(self.rooms.len() + 1);
        let mut x = self.origin_x;
        edges.push(x * FRACUNIT);
        for room in &self.rooms {
            x += room.width;
            edges.push(x * FRACUNIT);
        }

        // two vertexes per room edge, south then north
        let vertexes: Vec<Vertex> = edges
            .iter()
            .flat_map(|&x| [Vertex::new(x, 0), Vertex::new(x, depth)])
            .collect();
        let south = |edge: usize| edge * 2;
        let north = |edge: usize| edge * 2 + 1;

        let sectors: Vec<Sector> = self
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut sector = Sector::new(
                    i as u32,
                    r.floor * FRACUNIT,
                    r.ceiling * FRACUNIT,
                    r.floorpic,
                    r.ceilingpic,
                    r.light,
                );
                sector.flow = r.flow;
                sector
            })
            .collect();

        let mut geometry = Geometry {
            vertexes: &vertexes,
            linedefs: Vec::new(),
            sidedefs: Vec::new(),
            segments: Vec::new(),
            open_line: None,
        };
        let mut subsectors = Vec::with_capacity(self.rooms.len());

        for (i, room) in self.rooms.iter().enumerate() {
            let start_seg = geometry.segments.len() as u32;

            // west edge
            if i == 0 || self.boundaries[i - 1] == Boundary::Solid {
                geometry.one_sided(south(i), north(i), i, room.wall);
            } else {
                // the shared line was made when the previous room was built,
                // this is the front seg of it
                geometry.front_seg_of_open_line();
            }

            // south wall heads west, north wall heads east, so the right side
            // of each faces in to the room
            geometry.one_sided(south(i + 1), south(i), i, room.wall);
            geometry.one_sided(north(i), north(i + 1), i, room.wall);

            // east edge
            if i == self.rooms.len() - 1 || self.boundaries[i] == Boundary::Solid {
                geometry.one_sided(north(i + 1), south(i + 1), i, room.wall);
            } else {
                let next = &self.rooms[i + 1];
                let (mid, flags) = match self.boundaries[i] {
                    Boundary::Grate {
                        texture,
                        translucent: true,
                    } => (Some(texture), LineDefFlags::Translucent as u32),
                    Boundary::Grate { texture, .. } => (Some(texture), 0),
                    _ => (None, 0),
                };
                geometry.two_sided(
                    (south(i + 1), north(i + 1)),
                    (i + 1, i),
                    (next.wall, room.wall),
                    mid,
                    flags,
                );
            }

            subsectors.push(SubSector {
                sector: i,
                seg_count: geometry.segments.len() as u32 - start_seg,
                start_seg,
            });
        }

        let room_box = |lo: usize, hi: usize| BBox {
            top: depth,
            bottom: 0,
            left: edges[lo],
            right: edges[hi + 1],
        };
        let mut nodes = Vec::new();
        if self.rooms.len() > 1 {
            build_nodes(&mut nodes, 0, self.rooms.len() - 1, depth, &edges, &room_box);
        }

        let mut reject = RejectMatrix::empty(sectors.len());
        if self.build_reject {
            for a in 0..sectors.len() {
                for b in 0..sectors.len() {
                    let (lo, hi) = (a.min(b), a.max(b));
                    if self.boundaries[lo..hi].contains(&Boundary::Solid) {
                        reject.set_rejected(a, b);
                    }
                }
            }
        }

        debug!(
            "Built corridor of {} rooms, {} nodes",
            self.rooms.len(),
            nodes.len()
        );
        let Geometry {
            linedefs,
            sidedefs,
            segments,
            ..
        } = geometry;
        MapData::new(
            vertexes, linedefs, sectors, sidedefs, subsectors, segments, nodes, reject,
        )
    }
}

/// Split the rooms `lo..=hi` on the west edge of the middle room. The east
/// half is on the right of the northward partition and becomes child 0.
/// Children are pushed first so the root ends up last.
fn build_nodes(
    nodes: &mut Vec<Node>,
    lo: usize,
    hi: usize,
    depth: Fixed,
    edges: &[Fixed],
    room_box: &impl Fn(usize, usize) -> BBox,
) -> u32 {
    if lo == hi {
        return lo as u32 | IS_SSECTOR_MASK;
    }
    let mid = (lo + hi).div_ceil(2);
    let front = build_nodes(nodes, mid, hi, depth, edges, room_box);
    let back = build_nodes(nodes, lo, mid - 1, depth, edges, room_box);
    nodes.push(Node {
        divline: Divline::new(edges[mid], 0, 0, depth),
        bboxes: [room_box(mid, hi), room_box(lo, mid - 1)],
        children: [front, back],
    });
    (nodes.len() - 1) as u32
}

struct Geometry<'a> {
    vertexes: &'a [Vertex],
    linedefs: Vec<LineDef>,
    sidedefs: Vec<SideDef>,
    segments: Vec<Segment>,
    /// Two-sided line still waiting for the seg on its front side
    open_line: Option<usize>,
}

impl Geometry<'_> {
    fn line(&mut self, v1: usize, v2: usize, flags: u32, front_side: usize, back_side: Option<usize>) {
        let (a, b) = (self.vertexes[v1], self.vertexes[v2]);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let slopetype = if dx == 0 {
            SlopeType::Vertical
        } else if dy == 0 {
            SlopeType::Horizontal
        } else if (dx > 0) == (dy > 0) {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        };
        self.linedefs.push(LineDef {
            v1,
            v2,
            dx,
            dy,
            flags,
            slopetype,
            front_sidedef: front_side,
            back_sidedef: back_side,
            frontsector: self.sidedefs[front_side].sector,
            backsector: back_side.map(|s| self.sidedefs[s].sector),
        });
    }

    fn seg(&mut self, v1: usize, v2: usize, linedef: usize, sidedef: usize, back: Option<usize>) {
        let (a, b) = (self.vertexes[v1], self.vertexes[v2]);
        let dx = (b.x as i64 - a.x as i64) as f64;
        let dy = (b.y as i64 - a.y as i64) as f64;
        self.segments.push(Segment {
            v1,
            v2,
            offset: 0,
            angle: point_to_angle_wide(a.x, a.y, b.x, b.y),
            length: ((dx * dx + dy * dy).sqrt() / 2.0) as u32,
            sidedef,
            linedef,
            frontsector: self.sidedefs[sidedef].sector,
            backsector: back,
        });
    }

    fn one_sided(&mut self, v1: usize, v2: usize, sector: usize, wall: usize) {
        let side = self.sidedefs.len();
        self.sidedefs.push(SideDef {
            midtexture: Some(wall),
            sector,
            ..SideDef::default()
        });
        let line = self.linedefs.len();
        self.line(v1, v2, 0, side, None);
        self.seg(v1, v2, line, side, None);
    }

    /// Line facing `front` with `back` behind it. Only the back seg is added
    /// here, the front seg belongs to the next subsector.
    fn two_sided(
        &mut self,
        (v1, v2): (usize, usize),
        (front, back): (usize, usize),
        (front_wall, back_wall): (usize, usize),
        midtexture: Option<usize>,
        flags: u32,
    ) {
        let front_side = self.sidedefs.len();
        self.sidedefs.push(SideDef {
            toptexture: Some(front_wall),
            bottomtexture: Some(front_wall),
            midtexture,
            sector: front,
            ..SideDef::default()
        });
        let back_side = self.sidedefs.len();
        self.sidedefs.push(SideDef {
            toptexture: Some(back_wall),
            bottomtexture: Some(back_wall),
            midtexture,
            sector: back,
            ..SideDef::default()
        });
        let line = self.linedefs.len();
        self.line(
            v1,
            v2,
            LineDefFlags::TwoSided as u32 | flags,
            front_side,
            Some(back_side),
        );
        self.seg(v2, v1, line, back_side, Some(front));
        self.open_line = Some(line);
    }

    fn front_seg_of_open_line(&mut self) {
        if let Some(line) = self.open_line.take() {
            let l = &self.linedefs[line];
            let (v1, v2, side, back) = (l.v1, l.v2, l.front_sidedef, l.backsector);
            self.seg(v1, v2, line, side, back);
        }
    }
}
