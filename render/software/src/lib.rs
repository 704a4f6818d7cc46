//! A column and span software renderer for a Doom style BSP level.
//!
//! One frame walks the BSP front to back, clips and projects every visible
//! wall into screen columns, collects the floors and ceilings those walls
//! uncover into visplanes, then sweeps the planes into spans and finally draws
//! the masked middle textures back to front.

use gameplay::log::debug;
use gameplay::{MapData, PicData};

use self::defs::{ClipSource, DrawSeg, MAXDRAWSEGS, MAXOPENINGS};
use self::planes::VisPlaneRender;
use self::portals::PortalClip;
use self::utilities::ViewPoint;

mod bsp;
mod defs;
mod draw;
mod planes;
mod portals;
mod segs;
mod swirl;
mod utilities;

pub use bsp::{RenderOptions, SoftwareRenderer};
pub use draw::{ColumnStyle, DrawColumn, DrawSpan, FUZZTABLE, FuzzState};

/// Counters for the last frame drawn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Wall ranges that went through the column loop
    pub rendered_segs: u32,
    /// Visplanes that had at least one column to draw
    pub rendered_visplanes: u32,
    /// Visplanes found or split, including empty ones
    pub visplanes: usize,
    pub drawsegs: usize,
    /// Openings entries used for sprite clip and masked columns
    pub openings: usize,
}

/// The borrowed inputs of one frame
pub(crate) struct Frame<'a> {
    pub view: ViewPoint,
    pub map: &'a MapData,
    pub pic_data: &'a PicData,
}

/// We store most of what is needed for rendering in various functions here to
/// avoid having to pass too many things in args through multiple function
/// calls. This is due to the Doom C relying a fair bit on global state.
///
/// Drawsegs refer to `openings` by offset, never by reference, so both lists
/// can grow in the middle of a frame.
pub(crate) struct RenderData {
    /// One per wall range stored, in front to back order
    pub drawsegs: Vec<DrawSeg>,
    /// Scratch space for sprite clip copies and masked texture columns
    pub openings: Vec<i32>,
    pub lastopening: usize,
    pub portal_clip: PortalClip,
    pub visplanes: VisPlaneRender,
    pub rendered_segs: u32,
}

impl RenderData {
    pub(crate) fn new(view_width: usize, view_height: usize) -> Self {
        Self {
            drawsegs: Vec::with_capacity(MAXDRAWSEGS),
            openings: vec![0; MAXOPENINGS],
            lastopening: 0,
            portal_clip: PortalClip::new(view_width, view_height),
            visplanes: VisPlaneRender::new(view_width, view_height),
            rendered_segs: 0,
        }
    }

    /// At the start of each frame
    pub(crate) fn clear_data(&mut self) {
        self.portal_clip.clear();
        self.drawsegs.clear();
        self.lastopening = 0;
        self.visplanes.clear_planes();
        self.rendered_segs = 0;
    }

    /// Reserve `count` openings and return the offset of the first. The buffer
    /// doubles as needed.
    pub(crate) fn alloc_openings(&mut self, count: usize) -> usize {
        let start = self.lastopening;
        let needed = start + count;
        if needed > self.openings.len() {
            let mut len = self.openings.len().max(MAXOPENINGS);
            while needed > len {
                len *= 2;
            }
            debug!("Openings grown to {len}");
            self.openings.resize(len, 0);
        }
        self.lastopening = needed;
        start
    }

    pub(crate) fn push_drawseg(&mut self, ds: DrawSeg) {
        if self.drawsegs.len() == self.drawsegs.capacity() {
            let len = self.drawsegs.capacity().max(MAXDRAWSEGS) * 2;
            debug!("Drawsegs grown to {len}");
            self.drawsegs.reserve_exact(len - self.drawsegs.len());
        }
        self.drawsegs.push(ds);
    }

    /// The sprite clip of a drawseg at column `x`. A missing clip is the
    /// unclipped `default`.
    pub(crate) fn clip_value(
        &self,
        source: Option<ClipSource>,
        ds_x1: i32,
        x: i32,
        default: i32,
    ) -> i32 {
        match source {
            Some(ClipSource::ScreenHeight) => self.portal_clip.view_height(),
            Some(ClipSource::NegOne) => -1,
            Some(ClipSource::Openings(at)) => self.openings[at + (x - ds_x1) as usize],
            None => default,
        }
    }

    pub(crate) fn stats(&self) -> RenderStats {
        RenderStats {
            rendered_segs: self.rendered_segs,
            rendered_visplanes: self.visplanes.rendered_visplanes,
            visplanes: self.visplanes.planes().len(),
            drawsegs: self.drawsegs.len(),
            openings: self.lastopening,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::RenderData;
    use crate::defs::{ClipSource, DrawSeg, MAXDRAWSEGS, MAXOPENINGS};

    #[test]
    fn default_render_data() {
        let mut rd = RenderData::new(640, 400);
        rd.clear_data();
        assert_eq!(rd.stats().drawsegs, 0);
        assert_eq!(rd.portal_clip.floorclip[0], 400);
    }

    #[test]
    fn openings_grow_and_keep_offsets() {
        let mut rd = RenderData::new(320, 200);
        let first = rd.alloc_openings(100);
        rd.openings[first + 99] = 42;
        let big = rd.alloc_openings(MAXOPENINGS * 3);
        assert_eq!(big, 100);
        assert!(rd.openings.len() >= MAXOPENINGS * 3 + 100);
        assert_eq!(rd.openings[first + 99], 42);
        rd.clear_data();
        assert_eq!(rd.alloc_openings(1), 0);
    }

    #[test]
    fn drawsegs_grow_past_the_initial_size() {
        let mut rd = RenderData::new(320, 200);
        for i in 0..MAXDRAWSEGS * 4 + 1 {
            rd.push_drawseg(DrawSeg::new(i, 0, 1));
        }
        assert_eq!(rd.drawsegs.len(), MAXDRAWSEGS * 4 + 1);
        assert_eq!(rd.drawsegs[MAXDRAWSEGS * 4].curline, MAXDRAWSEGS * 4);
    }

    #[test]
    fn clip_sources() {
        let mut rd = RenderData::new(320, 200);
        let at = rd.alloc_openings(3);
        rd.openings[at..at + 3].copy_from_slice(&[7, 8, 9]);
        assert_eq!(rd.clip_value(Some(ClipSource::Openings(at)), 10, 11, 0), 8);
        assert_eq!(rd.clip_value(Some(ClipSource::ScreenHeight), 10, 11, 0), 200);
        assert_eq!(rd.clip_value(Some(ClipSource::NegOne), 10, 11, 0), -1);
        assert_eq!(rd.clip_value(None, 10, 11, 5), 5);
    }
}
