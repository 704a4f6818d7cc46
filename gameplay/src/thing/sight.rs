//! Line of sight between two things. The REJECT table answers most checks
//! without touching geometry, the rest trace a line through the BSP and
//! narrow a vertical window at each two-sided line crossed.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::trace;
use math::{Divline, Fixed, LineSide, fixed_div, intercept_vector};

use crate::level::map_data::{IS_SSECTOR_MASK, MapData, subsector_index};
use crate::thing::MapObject;

/// Per trace state. Lives only for one `check_sight` call.
struct Trace {
    strace: Divline,
    t2x: Fixed,
    t2y: Fixed,
    sight_z_start: Fixed,
    top_slope: Fixed,
    bottom_slope: Fixed,
}

/// Scratch data for sight checks, kept between calls so the per line visit
/// tags never need clearing.
pub struct SightTracer {
    line_valid: Vec<u32>,
    valid_count: u32,
    sight_counts: [u32; 2],
    traversals: u32,
}

impl SightTracer {
    pub fn new(num_lines: usize) -> Self {
        Self {
            line_valid: vec![0; num_lines],
            valid_count: 0,
            sight_counts: [0; 2],
            traversals: 0,
        }
    }

    pub fn sight_counts(&self) -> [u32; 2] {
        self.sight_counts
    }

    pub fn traversals(&self) -> u32 {
        self.traversals
    }

    /// Returns true if a straight line between `t1` and `t2` is unobstructed.
    /// Doom function name `P_CheckSight`.
    pub fn check_sight(&mut self, map: &MapData, t1: &MapObject, t2: &MapObject) -> bool {
        #[cfg(feature = "hprof")]
        profile!("check_sight");
        let s1 = t1.sector(map);
        let s2 = t2.sector(map);
        if map.reject().is_rejected(s1, s2) {
            self.sight_counts[0] += 1;
            // can't possibly be connected
            return false;
        }
        self.sight_counts[1] += 1;

        if self.line_valid.len() != map.linedefs.len() {
            self.line_valid = vec![0; map.linedefs.len()];
            self.valid_count = 0;
        }
        self.valid_count = self.valid_count.wrapping_add(1);
        if self.valid_count == 0 {
            self.line_valid.fill(0);
            self.valid_count = 1;
        }

        let sight_z_start = t1.sight_z();
        let mut trace = Trace {
            strace: Divline::from_points(t1.x, t1.y, t2.x, t2.y),
            t2x: t2.x,
            t2y: t2.y,
            sight_z_start,
            top_slope: (t2.z + t2.height) - sight_z_start,
            bottom_slope: t2.z - sight_z_start,
        };

        let seen = self.cross_bsp_node(map, map.start_node, &mut trace);
        trace!("Sight from sector {s1} to {s2}: {seen}");
        seen
    }

    /// Returns true if the trace crosses the given node successfully.
    /// Doom function name `P_CrossBSPNode`.
    fn cross_bsp_node(&mut self, map: &MapData, node_id: u32, trace: &mut Trace) -> bool {
        self.traversals += 1;
        if node_id & IS_SSECTOR_MASK != 0 {
            return self.cross_subsector(map, subsector_index(node_id), trace);
        }

        let node = &map.nodes[node_id as usize];
        if node.divline.is_degenerate() {
            panic!(
                "node {node_id} has a zero length partition at ({}, {})",
                node.divline.x, node.divline.y
            );
        }

        // an "on" should cross both sides
        let side = match node.divline.side(trace.strace.x, trace.strace.y) {
            LineSide::Back => 1,
            _ => 0,
        };
        if !self.cross_bsp_node(map, node.children[side], trace) {
            return false;
        }

        // the partition plane is crossed here
        if side == node.divline.side(trace.t2x, trace.t2y) as usize {
            // the line doesn't touch the other side
            return true;
        }
        self.cross_bsp_node(map, node.children[side ^ 1], trace)
    }

    /// Returns true if the trace crosses the given subsector successfully.
    /// Doom function name `P_CrossSubsector`.
    fn cross_subsector(&mut self, map: &MapData, num: usize, trace: &mut Trace) -> bool {
        if num >= map.subsectors.len() {
            panic!(
                "subsector {num} out of range, level has {}",
                map.subsectors.len()
            );
        }

        for seg in map.subsector_segs(&map.subsectors[num]) {
            // already checked other side?
            if self.line_valid[seg.linedef] == self.valid_count {
                continue;
            }
            self.line_valid[seg.linedef] = self.valid_count;

            let line = &map.linedefs[seg.linedef];
            let v1 = map.vertex(line.v1);
            let v2 = map.vertex(line.v2);
            let divl = Divline::from_points(v1.x, v1.y, v2.x, v2.y);
            // a zero length line can't block anything
            if divl.is_degenerate() {
                continue;
            }

            // line isn't crossed?
            if trace.strace.side(v1.x, v1.y) == trace.strace.side(v2.x, v2.y) {
                continue;
            }
            if divl.side(trace.strace.x, trace.strace.y) == divl.side(trace.t2x, trace.t2y) {
                continue;
            }

            // stop because it is not two sided anyway
            let Some(back) = seg.backsector else {
                return false;
            };
            if !line.is_two_sided() {
                return false;
            }

            // crosses a two sided line
            let front = &map.sectors[seg.frontsector];
            let back = &map.sectors[back];

            // no wall to block sight with?
            if front.floorheight == back.floorheight && front.ceilingheight == back.ceilingheight {
                continue;
            }

            let open_top = front.ceilingheight.min(back.ceilingheight);
            let open_bottom = front.floorheight.max(back.floorheight);
            // quick test for totally closed doors
            if open_bottom >= open_top {
                return false;
            }

            let frac = intercept_vector(&trace.strace, &divl);
            if front.floorheight != back.floorheight {
                let slope = fixed_div(open_bottom - trace.sight_z_start, frac);
                if slope > trace.bottom_slope {
                    trace.bottom_slope = slope;
                }
            }
            if front.ceilingheight != back.ceilingheight {
                let slope = fixed_div(open_top - trace.sight_z_start, frac);
                if slope < trace.top_slope {
                    trace.top_slope = slope;
                }
            }
            if trace.top_slope <= trace.bottom_slope {
                return false;
            }
        }
        // passed the subsector ok
        true
    }
}
