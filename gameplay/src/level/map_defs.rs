use math::{Angle, Divline, FRACBITS, Fixed, fixed_mul};

use crate::level::flags::{LineDefFlags, render_flags};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vertex {
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

/// The SECTORS record, at runtime.
#[derive(Debug, Default, Clone)]
pub struct Sector {
    /// An incremented "ID" of sorts.
    pub num: u32,
    pub floorheight: Fixed,
    pub ceilingheight: Fixed,
    /// Index in to the flats
    pub floorpic: usize,
    /// Index in to the flats
    pub ceilingpic: usize,
    pub lightlevel: i32,
    /// Scrolling flat effect. 100..=102 rotate, 200..=239 scroll in one of
    /// eight directions at one of five speeds, anything else is static.
    pub flow: i16,
}

impl Sector {
    pub fn new(
        num: u32,
        floorheight: Fixed,
        ceilingheight: Fixed,
        floorpic: usize,
        ceilingpic: usize,
        lightlevel: i32,
    ) -> Self {
        Self {
            num,
            floorheight,
            ceilingheight,
            floorpic,
            ceilingpic,
            lightlevel,
            flow: 0,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SideDef {
    // add this to the calculated texture column
    pub textureoffset: Fixed,
    // add this to the calculated texture top
    pub rowoffset: Fixed,
    pub toptexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    pub midtexture: Option<usize>,
    /// Sector the SideDef is facing.
    pub sector: usize,
}

/// Axis aligned box. Order follows the map format, `top, bottom, left, right`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Fixed,
    pub right: Fixed,
}

impl BBox {
    pub fn new(v1: Vertex, v2: Vertex) -> Self {
        Self {
            top: v1.y.max(v2.y),
            bottom: v1.y.min(v2.y),
            left: v1.x.min(v2.x),
            right: v1.x.max(v2.x),
        }
    }

    /// Grow to enclose `other`
    pub fn add(&mut self, other: &BBox) {
        self.top = self.top.max(other.top);
        self.bottom = self.bottom.min(other.bottom);
        self.left = self.left.min(other.left);
        self.right = self.right.max(other.right);
    }
}

#[derive(Debug, Clone)]
pub struct LineDef {
    // Vertices, from v1 to v2.
    pub v1: usize,
    pub v2: usize,
    pub dx: Fixed,
    pub dy: Fixed,
    pub flags: u32,
    pub slopetype: SlopeType,
    pub front_sidedef: usize,
    pub back_sidedef: Option<usize>,
    // Front and back sector.
    pub frontsector: usize,
    pub backsector: Option<usize>,
}

impl LineDef {
    pub fn is_two_sided(&self) -> bool {
        LineDefFlags::TwoSided.is_set(self.flags)
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    // Vertices, from v1 to v2.
    pub v1: usize,
    pub v2: usize,
    /// Offset distance along the linedef (from `start_vertex`) to the start
    /// of this `Segment`
    pub offset: Fixed,
    /// Angle from v1 to v2, computed with the overflow safe point-to-angle.
    pub angle: Angle,
    /// Half the length in map units. Zero for degenerate segs.
    pub length: u32,
    pub sidedef: usize,
    /// The Linedef this segment travels along.
    pub linedef: usize,
    pub frontsector: usize,
    pub backsector: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SubSector {
    pub sector: usize,
    /// How many `Segment`s line this `SubSector`
    pub seg_count: u32,
    /// The `Segment` to start with
    pub start_seg: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The partition line
    pub divline: Divline,
    /// Bounding boxes of the front (0) and back (1) children
    pub bboxes: [BBox; 2],
    /// The node children. Doom uses a clever trick where if one node is
    /// selected then the other can also be checked with the same/minimal
    /// code by inverting the last bit.
    /// The final 'leaf' is bitmasked to find the index to subsector array
    pub children: [u32; 2],
}

impl Node {
    /// Which child the point is in, `0` front or `1` back. Doom function name
    /// `R_PointOnSide`.
    pub fn point_on_side(&self, x: Fixed, y: Fixed) -> usize {
        let Divline {
            x: nx,
            y: ny,
            dx: ndx,
            dy: ndy,
        } = self.divline;

        if ndx == 0 {
            return if x <= nx {
                (ndy > 0) as usize
            } else {
                (ndy < 0) as usize
            };
        }
        if ndy == 0 {
            return if y <= ny {
                (ndx < 0) as usize
            } else {
                (ndx > 0) as usize
            };
        }

        let x = x.wrapping_sub(nx);
        let y = y.wrapping_sub(ny);

        // Try to quickly decide by looking at sign bits.
        if (ndy ^ ndx ^ x ^ y) < 0 {
            return ((ndy ^ x) < 0) as usize;
        }

        (fixed_mul(y, ndx >> FRACBITS) >= fixed_mul(ndy >> FRACBITS, x)) as usize
    }
}

/// Classify a two-sided line for the current heights. Doom function name
/// `R_RecalcLineFlags`.
pub fn line_render_flags(
    line: &LineDef,
    front_side: &SideDef,
    front: &Sector,
    back: &Sector,
    sky_num: usize,
) -> u32 {
    let closed = !line.is_two_sided()
        || back.ceilingheight <= front.floorheight
        || back.floorheight >= front.ceilingheight
        || (back.ceilingheight <= back.floorheight
            && (back.ceilingheight >= front.ceilingheight || front_side.toptexture.is_some())
            && (back.floorheight <= front.floorheight || front_side.bottomtexture.is_some())
            && !(back.ceilingpic == sky_num && front.ceilingpic == sky_num));
    if closed {
        return render_flags::CLOSED;
    }

    if back.ceilingheight == front.ceilingheight
        && back.floorheight == front.floorheight
        && back.ceilingpic == front.ceilingpic
        && back.floorpic == front.floorpic
        && back.lightlevel == front.lightlevel
        && back.flow == front.flow
        && front_side.midtexture.is_none()
    {
        return render_flags::IGNORE;
    }
    0
}

#[cfg(test)]
mod tests {
    use math::{Divline, FRACUNIT};

    use super::{BBox, LineDef, Node, Sector, SideDef, SlopeType, line_render_flags};
    use crate::level::flags::{LineDefFlags, render_flags};

    fn node(x: i32, y: i32, dx: i32, dy: i32) -> Node {
        Node {
            divline: Divline::new(x * FRACUNIT, y * FRACUNIT, dx * FRACUNIT, dy * FRACUNIT),
            bboxes: [BBox::default(); 2],
            children: [0, 0],
        }
    }

    #[test]
    fn node_side_axis_aligned() {
        // pointing north, right side is front
        let n = node(64, 0, 0, 128);
        assert_eq!(n.point_on_side(100 * FRACUNIT, 10 * FRACUNIT), 0);
        assert_eq!(n.point_on_side(10 * FRACUNIT, 10 * FRACUNIT), 1);
        // pointing east, right side is south
        let n = node(0, 64, 128, 0);
        assert_eq!(n.point_on_side(10 * FRACUNIT, 0), 0);
        assert_eq!(n.point_on_side(10 * FRACUNIT, 100 * FRACUNIT), 1);
    }

    #[test]
    fn node_side_diagonal() {
        let n = node(0, 0, 64, 64);
        assert_eq!(n.point_on_side(32 * FRACUNIT, 0), 0);
        assert_eq!(n.point_on_side(0, 32 * FRACUNIT), 1);
        assert_eq!(n.point_on_side(-32 * FRACUNIT, -64 * FRACUNIT), 0);
    }

    fn sector(floor: i32, ceil: i32) -> Sector {
        Sector::new(0, floor * FRACUNIT, ceil * FRACUNIT, 1, 2, 160)
    }

    fn line() -> LineDef {
        LineDef {
            v1: 0,
            v2: 1,
            dx: 0,
            dy: FRACUNIT,
            flags: LineDefFlags::TwoSided as u32,
            slopetype: SlopeType::Vertical,
            front_sidedef: 0,
            back_sidedef: Some(1),
            frontsector: 0,
            backsector: Some(1),
        }
    }

    #[test]
    fn render_flags_for_identical_sectors() {
        let side = SideDef::default();
        let flags = line_render_flags(&line(), &side, &sector(0, 128), &sector(0, 128), 99);
        assert_eq!(flags, render_flags::IGNORE);
    }

    #[test]
    fn render_flags_for_shut_door() {
        let side = SideDef {
            toptexture: Some(1),
            ..SideDef::default()
        };
        let flags = line_render_flags(&line(), &side, &sector(0, 128), &sector(0, 0), 99);
        assert_eq!(flags, render_flags::CLOSED);
        // a raised ceiling is just a normal two-sided line
        let flags = line_render_flags(&line(), &side, &sector(0, 128), &sector(0, 200), 99);
        assert_eq!(flags, 0);
    }
}
