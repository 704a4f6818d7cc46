use log::{debug, warn};
use math::Fixed;

use crate::level::MapError;
use crate::level::map_defs::{LineDef, Node, Sector, Segment, SideDef, SubSector, Vertex};

pub const IS_SSECTOR_MASK: u32 = 0x8000_0000;

/// Index of the subsector a leaf child points to. A child of `u32::MAX` is
/// what a map with no nodes at all produces and means subsector 0.
#[inline]
pub const fn subsector_index(child: u32) -> usize {
    if child == u32::MAX {
        0
    } else {
        (child & !IS_SSECTOR_MASK) as usize
    }
}

/// The REJECT lump. One bit per sector pair, set when nothing in the first
/// sector can ever see anything in the second.
#[derive(Debug, Default, Clone)]
pub struct RejectMatrix {
    bits: Vec<u8>,
    num_sectors: usize,
}

impl RejectMatrix {
    /// Short lumps are padded out with zeroes so every pair is addressable.
    pub fn new(mut bits: Vec<u8>, num_sectors: usize) -> Self {
        let min_len = (num_sectors * num_sectors).div_ceil(8);
        if bits.len() < min_len {
            warn!(
                "REJECT is {} bytes, expected {min_len}; padding",
                bits.len()
            );
            bits.resize(min_len, 0);
        }
        Self { bits, num_sectors }
    }

    /// Every pair may see each other
    pub fn empty(num_sectors: usize) -> Self {
        Self::new(Vec::new(), num_sectors)
    }

    #[inline]
    fn bit(&self, s1: usize, s2: usize) -> (usize, u8) {
        let pnum = s1 * self.num_sectors + s2;
        (pnum >> 3, 1 << (pnum & 7))
    }

    pub fn set_rejected(&mut self, s1: usize, s2: usize) {
        let (byte, bit) = self.bit(s1, s2);
        self.bits[byte] |= bit;
    }

    #[inline]
    pub fn is_rejected(&self, s1: usize, s2: usize) -> bool {
        let (byte, bit) = self.bit(s1, s2);
        self.bits[byte] & bit != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

/// Everything required to draw and trace a level. Built once on level load
/// and immutable while a frame is drawn or a sight line traced.
///
/// `nodes`, `subsectors`, and `segments` are what get used most to render the
/// basic level
#[derive(Debug, Default)]
pub struct MapData {
    pub vertexes: Vec<Vertex>,
    pub linedefs: Vec<LineDef>,
    pub sectors: Vec<Sector>,
    pub sidedefs: Vec<SideDef>,
    pub subsectors: Vec<SubSector>,
    pub segments: Vec<Segment>,
    pub nodes: Vec<Node>,
    reject: RejectMatrix,
    pub start_node: u32,
}

impl MapData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vertexes: Vec<Vertex>,
        linedefs: Vec<LineDef>,
        sectors: Vec<Sector>,
        sidedefs: Vec<SideDef>,
        subsectors: Vec<SubSector>,
        segments: Vec<Segment>,
        nodes: Vec<Node>,
        reject: RejectMatrix,
    ) -> Result<Self, MapError> {
        let start_node = if nodes.is_empty() {
            IS_SSECTOR_MASK
        } else {
            (nodes.len() - 1) as u32
        };
        let map = Self {
            vertexes,
            linedefs,
            sectors,
            sidedefs,
            subsectors,
            segments,
            nodes,
            reject,
            start_node,
        };
        map.validate()?;
        debug!(
            "Map: {} sectors, {} lines, {} segs, {} subsectors, {} nodes",
            map.sectors.len(),
            map.linedefs.len(),
            map.segments.len(),
            map.subsectors.len(),
            map.nodes.len()
        );
        Ok(map)
    }

    /// Every index stored in the level must land inside its table. The
    /// renderer and sight check rely on this and index without checks.
    fn validate(&self) -> Result<(), MapError> {
        let check = |kind: &'static str, index: usize, len: usize| {
            if index >= len {
                Err(MapError::BadIndex { kind, index, len })
            } else {
                Ok(())
            }
        };

        if self.subsectors.is_empty() {
            return Err(MapError::Empty);
        }
        for line in &self.linedefs {
            check("vertex", line.v1, self.vertexes.len())?;
            check("vertex", line.v2, self.vertexes.len())?;
            check("sidedef", line.front_sidedef, self.sidedefs.len())?;
            check("sector", line.frontsector, self.sectors.len())?;
            if let Some(back) = line.back_sidedef {
                check("sidedef", back, self.sidedefs.len())?;
            }
            if let Some(back) = line.backsector {
                check("sector", back, self.sectors.len())?;
            }
        }
        for side in &self.sidedefs {
            check("sector", side.sector, self.sectors.len())?;
        }
        for seg in &self.segments {
            check("vertex", seg.v1, self.vertexes.len())?;
            check("vertex", seg.v2, self.vertexes.len())?;
            check("linedef", seg.linedef, self.linedefs.len())?;
            check("sidedef", seg.sidedef, self.sidedefs.len())?;
            check("sector", seg.frontsector, self.sectors.len())?;
            if let Some(back) = seg.backsector {
                check("sector", back, self.sectors.len())?;
            }
        }
        for ssect in &self.subsectors {
            check("sector", ssect.sector, self.sectors.len())?;
            let end = ssect.start_seg as usize + ssect.seg_count as usize;
            if end > self.segments.len() {
                return Err(MapError::BadIndex {
                    kind: "segment",
                    index: end,
                    len: self.segments.len(),
                });
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.divline.is_degenerate() {
                return Err(MapError::DegenerateNode(i));
            }
            for child in node.children {
                if child & IS_SSECTOR_MASK != 0 {
                    check("subsector", subsector_index(child), self.subsectors.len())?;
                } else {
                    check("node", child as usize, self.nodes.len())?;
                }
            }
        }
        Ok(())
    }

    pub fn reject(&self) -> &RejectMatrix {
        &self.reject
    }

    pub fn set_reject(&mut self, reject: RejectMatrix) {
        self.reject = reject;
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> Vertex {
        self.vertexes[index]
    }

    /// The segs bounding a subsector
    #[inline]
    pub fn subsector_segs(&self, subsector: &SubSector) -> &[Segment] {
        let start = subsector.start_seg as usize;
        &self.segments[start..start + subsector.seg_count as usize]
    }

    /// Walk the BSP down to the leaf containing the point. Doom function name
    /// `R_PointInSubsector`.
    pub fn point_in_subsector(&self, x: Fixed, y: Fixed) -> usize {
        let mut node_id = self.start_node;
        while node_id & IS_SSECTOR_MASK == 0 {
            let node = &self.nodes[node_id as usize];
            node_id = node.children[node.point_on_side(x, y)];
        }
        subsector_index(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{IS_SSECTOR_MASK, RejectMatrix, subsector_index};

    #[test]
    fn reject_bits() {
        let mut reject = RejectMatrix::empty(3);
        assert_eq!(reject.as_bytes().len(), 2);
        reject.set_rejected(2, 1);
        assert!(reject.is_rejected(2, 1));
        assert!(!reject.is_rejected(1, 2));
        // pair (2, 1) is bit 7 of the first byte
        assert_eq!(reject.as_bytes()[0], 0x80);
    }

    #[test]
    fn reject_pads_short_lump() {
        let reject = RejectMatrix::new(vec![0xff], 4);
        assert_eq!(reject.as_bytes().len(), 2);
        assert!(reject.is_rejected(0, 3));
        assert!(!reject.is_rejected(3, 3));
    }

    #[test]
    fn leaf_index() {
        assert_eq!(subsector_index(IS_SSECTOR_MASK | 5), 5);
        assert_eq!(subsector_index(u32::MAX), 0);
    }
}
