use std::fmt::Debug;

use math::Fixed;

pub const SIL_NONE: u8 = 0;
pub const SIL_BOTTOM: u8 = 1;
pub const SIL_TOP: u8 = 2;
pub const SIL_BOTH: u8 = 3;

/// Starting size of the drawseg list, doubled whenever it fills
pub const MAXDRAWSEGS: usize = 128;
/// Starting size of the openings scratch buffer, doubled whenever it fills
pub const MAXOPENINGS: usize = 16384;

/// Where the per column sprite clip of a drawseg is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSource {
    /// Nothing clipped from below, every column is `view_height`
    ScreenHeight,
    /// Nothing clipped from above, every column is `-1`
    NegOne,
    /// Offset in to `openings` holding the value for column `x1`
    Openings(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct DrawSeg {
    /// Index in to the level segments
    pub curline: usize,
    pub x1: i32,
    pub x2: i32,

    pub scale1: Fixed,
    pub scale2: Fixed,
    pub scalestep: Fixed,

    /// 0=none, 1=bottom, 2=top, 3=both
    pub silhouette: u8,

    /// do not clip sprites above this
    pub bsilheight: Fixed,

    /// do not clip sprites below this
    pub tsilheight: Fixed,

    pub sprtopclip: Option<ClipSource>,
    pub sprbottomclip: Option<ClipSource>,

    /// Offset in to `openings` of the texture column for `x1`, only set when
    /// the seg has a masked middle texture
    pub maskedtexturecol: Option<usize>,
}

impl DrawSeg {
    pub fn new(curline: usize, x1: i32, x2: i32) -> Self {
        DrawSeg {
            curline,
            x1,
            x2,
            scale1: 0,
            scale2: 0,
            scalestep: 0,
            silhouette: SIL_NONE,
            bsilheight: 0,
            tsilheight: 0,
            sprtopclip: None,
            sprbottomclip: None,
            maskedtexturecol: None,
        }
    }
}

/// Marks a column of a visplane that has no span recorded yet
pub const SENTINEL: u32 = u32::MAX;

/// Now what is a visplane, anyway?
///
/// One visible floor or ceiling fragment sharing a height, flat, light level
/// and flow. `top` and `bottom` carry one padding column on each side so the
/// span sweep can read `x - 1` and `x + 1` at the edges.
#[derive(Clone)]
pub struct Visplane {
    pub height: Fixed,
    pub picnum: usize,
    pub lightlevel: i32,
    pub flow: i16,
    pub minx: i32,
    pub maxx: i32,
    pub(crate) top: Vec<u32>,
    pub(crate) bottom: Vec<u32>,
    /// Next plane in the same hash chain
    pub(crate) next: Option<usize>,
}

impl Debug for Visplane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visplane")
            .field("height", &self.height)
            .field("picnum", &self.picnum)
            .field("lightlevel", &self.lightlevel)
            .field("flow", &self.flow)
            .field("minx", &self.minx)
            .field("maxx", &self.maxx)
            .finish_non_exhaustive()
    }
}

impl Visplane {
    pub fn new(view_width: usize) -> Self {
        Visplane {
            height: 0,
            picnum: 0,
            lightlevel: 0,
            flow: 0,
            minx: view_width as i32,
            maxx: -1,
            top: vec![SENTINEL; view_width + 2],
            bottom: vec![0; view_width + 2],
            next: None,
        }
    }

    /// Set up as an empty plane with a new key
    pub(crate) fn reset(&mut self, height: Fixed, picnum: usize, lightlevel: i32, flow: i16) {
        self.height = height;
        self.picnum = picnum;
        self.lightlevel = lightlevel;
        self.flow = flow;
        self.minx = self.top.len() as i32 - 2;
        self.maxx = -1;
        self.top.fill(SENTINEL);
        self.next = None;
    }

    /// Column `x` may be `-1` or `view_width` to reach the padding
    #[inline]
    pub fn top(&self, x: i32) -> u32 {
        self.top[(x + 1) as usize]
    }

    #[inline]
    pub fn bottom(&self, x: i32) -> u32 {
        self.bottom[(x + 1) as usize]
    }

    #[inline]
    pub fn set_column(&mut self, x: i32, top: i32, bottom: i32) {
        self.top[(x + 1) as usize] = top as u32;
        self.bottom[(x + 1) as usize] = bottom as u32;
    }

    #[inline]
    pub(crate) fn close_column(&mut self, x: i32) {
        self.top[(x + 1) as usize] = SENTINEL;
    }
}
