//! Floors, ceilings and the sky. Walls mark the columns each plane covers,
//! then the planes are swept in to horizontal spans once the BSP walk is
//! done.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use gameplay::log::debug;
use gameplay::{Brightmap, Colourmap, LIGHTSEGSHIFT, PicData};
use math::{Fixed, fixed_mul};
use render_trait::PixelBuffer;

use super::defs::{SENTINEL, Visplane};
use super::draw::{ColumnStyle, DrawColumn, DrawSpan};
use super::swirl::SwirlCache;
use super::utilities::{ANGLETOSKYSHIFT, SKY_TEXTUREMID, ViewPoint, ViewTables, flow_offsets};

/// Hash buckets for plane lookup, must be a power of two
pub const MAXVISPLANES: usize = 128;

#[inline]
fn visplane_hash(picnum: usize, lightlevel: i32, height: Fixed) -> usize {
    (picnum as u32)
        .wrapping_mul(3)
        .wrapping_add(lightlevel as u32)
        .wrapping_add((height as u32).wrapping_mul(7)) as usize
        & (MAXVISPLANES - 1)
}

/// Per row values for the flat mapping, valid while the plane height stays the
/// same. Reset every frame.
struct RowCache {
    height: Vec<Fixed>,
    distance: Vec<Fixed>,
    xstep: Vec<Fixed>,
    ystep: Vec<Fixed>,
}

/// What one flat plane is drawn with
struct PlaneSpan<'a> {
    height: Fixed,
    light: i32,
    source: &'a [u8],
    brightmap: Option<(&'a Brightmap, &'a Colourmap)>,
    flow: (Fixed, Fixed),
}

pub(crate) struct VisPlaneRender {
    // Here comes the obnoxious "visplane".
    planes: Vec<Visplane>,
    /// Planes in use this frame, the rest are kept for reuse
    live: usize,
    buckets: [Option<usize>; MAXVISPLANES],
    /// Index of current visplane in `self.planes` for floor
    pub floorplane: Option<usize>,
    /// Index of current visplane in `self.planes` for ceiling
    pub ceilingplane: Option<usize>,
    /// spanstart holds the start of a plane span
    spanstart: Vec<i32>,
    rows: RowCache,
    view_width: usize,
    pub rendered_visplanes: u32,
}

impl VisPlaneRender {
    pub fn new(view_width: usize, view_height: usize) -> Self {
        VisPlaneRender {
            planes: Vec::with_capacity(MAXVISPLANES),
            live: 0,
            buckets: [None; MAXVISPLANES],
            floorplane: None,
            ceilingplane: None,
            spanstart: vec![0; view_height],
            rows: RowCache {
                height: vec![0; view_height],
                distance: vec![0; view_height],
                xstep: vec![0; view_height],
                ystep: vec![0; view_height],
            },
            view_width,
            rendered_visplanes: 0,
        }
    }

    /// Planes found or created since the last clear
    pub fn planes(&self) -> &[Visplane] {
        &self.planes[..self.live]
    }

    #[inline]
    pub fn plane_mut(&mut self, index: usize) -> &mut Visplane {
        &mut self.planes[index]
    }

    /// At the start of each frame. Doom function name `R_ClearPlanes`.
    pub fn clear_planes(&mut self) {
        self.buckets = [None; MAXVISPLANES];
        self.live = 0;
        self.floorplane = None;
        self.ceilingplane = None;
        self.rows.height.fill(0);
        self.rendered_visplanes = 0;
    }

    /// Take the next free plane, growing the arena when they are all in use,
    /// and put it at the head of its hash chain.
    fn new_plane(&mut self, height: Fixed, picnum: usize, lightlevel: i32, flow: i16) -> usize {
        if self.live == self.planes.len() {
            self.planes.push(Visplane::new(self.view_width));
            if self.live >= MAXVISPLANES && self.live.is_power_of_two() {
                debug!("Visplanes grown to {}", self.live);
            }
        }
        let index = self.live;
        self.live += 1;

        let hash = visplane_hash(picnum, lightlevel, height);
        let plane = &mut self.planes[index];
        plane.reset(height, picnum, lightlevel, flow);
        plane.next = self.buckets[hash];
        self.buckets[hash] = Some(index);
        index
    }

    /// Find a plane matching height, picnum, light level and flow. Otherwise
    /// return a new plane. Sky planes all share one key. Doom function name
    /// `R_FindPlane`.
    pub fn find_plane(
        &mut self,
        mut height: Fixed,
        picnum: usize,
        mut lightlevel: i32,
        mut flow: i16,
        sky_num: usize,
    ) -> usize {
        if picnum == sky_num {
            // all skies map together
            height = 0;
            lightlevel = 0;
            flow = 0;
        }

        let mut check = self.buckets[visplane_hash(picnum, lightlevel, height)];
        while let Some(index) = check {
            let plane = &self.planes[index];
            if plane.height == height
                && plane.picnum == picnum
                && plane.lightlevel == lightlevel
                && plane.flow == flow
            {
                return index;
            }
            check = plane.next;
        }

        self.new_plane(height, picnum, lightlevel, flow)
    }

    /// Extend `index` over `start..=stop` if none of the overlapping columns
    /// are taken yet, otherwise split off a new plane with the same key.
    /// Doom function name `R_CheckPlane`.
    pub fn check_plane(&mut self, index: usize, start: i32, stop: i32) -> usize {
        let plane = &mut self.planes[index];
        let (intrl, unionl) = if start < plane.minx {
            (plane.minx, start)
        } else {
            (start, plane.minx)
        };
        let (intrh, unionh) = if stop > plane.maxx {
            (plane.maxx, stop)
        } else {
            (stop, plane.maxx)
        };

        let mut x = intrl;
        while x <= intrh && plane.top(x) == SENTINEL {
            x += 1;
        }
        if x > intrh {
            // Use the same plane
            plane.minx = unionl;
            plane.maxx = unionh;
            return index;
        }

        // Otherwise make a new plane
        self.dup_plane(index, start, stop)
    }

    /// A fresh plane with the same key covering `start..=stop`. Doom function
    /// name `R_DupPlane`.
    pub fn dup_plane(&mut self, index: usize, start: i32, stop: i32) -> usize {
        let plane = &self.planes[index];
        let (height, picnum, lightlevel, flow) =
            (plane.height, plane.picnum, plane.lightlevel, plane.flow);
        let new = self.new_plane(height, picnum, lightlevel, flow);
        let plane = &mut self.planes[new];
        plane.minx = start;
        plane.maxx = stop;
        new
    }

    /// Sweep every marked plane in to spans, or sky columns. Doom function
    /// name `R_DrawPlanes`.
    pub fn draw_planes(
        &mut self,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        swirl: &mut SwirlCache,
        pixels: &mut impl PixelBuffer,
    ) {
        #[cfg(feature = "hprof")]
        profile!("draw_planes");
        let Self {
            planes,
            live,
            spanstart,
            rows,
            rendered_visplanes,
            ..
        } = self;
        let bright = pic_data.fixed_colourmap().unwrap_or(pic_data.colourmap(0));

        for plane in planes[..*live].iter_mut() {
            if plane.minx > plane.maxx {
                continue;
            }
            *rendered_visplanes += 1;

            if plane.picnum == pic_data.sky_num() {
                draw_sky(plane, view, tables, pic_data, pixels);
                continue;
            }

            let flat = pic_data.flat_pic(plane.picnum);
            let source = if flat.swirl {
                swirl.distorted(plane.picnum, &flat.data, view.level_time)
            } else {
                &flat.data
            };
            let span = PlaneSpan {
                height: (plane.height - view.z).abs(),
                light: (plane.lightlevel >> LIGHTSEGSHIFT) + view.extralight,
                source,
                brightmap: flat.brightmap.map(|b| (pic_data.brightmap(b), bright)),
                flow: flow_offsets(plane.flow, view.level_time),
            };

            plane.close_column(plane.maxx + 1);
            plane.close_column(plane.minx - 1);
            for x in plane.minx..=plane.maxx + 1 {
                make_spans(
                    x,
                    plane.top(x - 1),
                    plane.bottom(x - 1),
                    plane.top(x),
                    plane.bottom(x),
                    spanstart,
                    |y, x1, x2| rows.map_plane(y, x1, x2, &span, view, tables, pic_data, pixels),
                );
            }
        }
    }
}

/// Sky columns are drawn as a wall texture at a fixed distance, indexed by
/// view angle.
fn draw_sky(
    plane: &Visplane,
    view: &ViewPoint,
    tables: &ViewTables,
    pic_data: &PicData,
    pixels: &mut impl PixelBuffer,
) {
    let sky = pic_data.wall_pic(pic_data.sky_pic());
    // the sky is full bright unless the fixed map is allowed to tint it
    let colourmap = match pic_data.fixed_colourmap() {
        Some(fixed) if view.invul_sky => fixed,
        _ => pic_data.colourmap(0),
    };

    for x in plane.minx..=plane.maxx {
        let top = plane.top(x);
        let bottom = plane.bottom(x);
        if top > bottom {
            continue;
        }
        let angle = (view.angle + tables.xtoviewangle[x as usize]).bam() >> ANGLETOSKYSHIFT;
        DrawColumn {
            source: sky.column(angle as i32),
            colourmap,
            brightmap: None,
            style: ColumnStyle::Opaque,
            x,
            yl: top as i32,
            yh: bottom as i32,
            iscale: tables.sky_iscale,
            texturemid: SKY_TEXTUREMID,
            centery: tables.centery,
            detail_shift: tables.detail_shift,
        }
        .draw(pixels);
    }
}

/// Compare the column `x - 1` (`t1..=b1`) with column `x` (`t2..=b2`). Rows
/// that end at `x - 1` are emitted through `map` as `(y, x1, x2)`, rows that
/// begin at `x` are recorded in `spanstart`. Doom function name
/// `R_MakeSpans`.
pub(crate) fn make_spans(
    x: i32,
    mut t1: u32,
    mut b1: u32,
    mut t2: u32,
    mut b2: u32,
    spanstart: &mut [i32],
    mut map: impl FnMut(i32, i32, i32),
) {
    while t1 < t2 && t1 <= b1 {
        map(t1 as i32, spanstart[t1 as usize], x - 1);
        t1 += 1;
    }
    while b1 > b2 && b1 >= t1 {
        map(b1 as i32, spanstart[b1 as usize], x - 1);
        b1 -= 1;
    }
    while t2 < t1 && t2 <= b2 {
        spanstart[t2 as usize] = x;
        t2 += 1;
    }
    while b2 > b1 && b2 >= t2 {
        spanstart[b2 as usize] = x;
        b2 -= 1;
    }
}

impl RowCache {
    /// Texture coordinates and light for one span. Doom function name
    /// `R_MapPlane`.
    #[allow(clippy::too_many_arguments)]
    fn map_plane(
        &mut self,
        y: i32,
        x1: i32,
        x2: i32,
        span: &PlaneSpan,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        if y == tables.centery {
            return;
        }
        let row = y as usize;
        if self.height[row] != span.height {
            let dy = (tables.centery - y).abs();
            self.height[row] = span.height;
            self.distance[row] = fixed_mul(span.height, tables.yslope[row]);
            self.xstep[row] = fixed_mul(view.sin, span.height) / dy;
            self.ystep[row] = fixed_mul(view.cos, span.height) / dy;
        }
        let distance = self.distance[row];
        let dx = x1 - tables.centerx;

        let xfrac = view
            .x
            .wrapping_add(fixed_mul(view.cos, distance))
            .wrapping_add(dx.wrapping_mul(self.xstep[row]))
            .wrapping_add(span.flow.0);
        let yfrac = view
            .y
            .wrapping_neg()
            .wrapping_sub(fixed_mul(view.sin, distance))
            .wrapping_add(dx.wrapping_mul(self.ystep[row]))
            .wrapping_add(span.flow.1);

        let index = (distance >> pic_data.light_z().light_z_shift()).max(0) as usize;
        DrawSpan {
            source: span.source,
            colourmap: pic_data.flat_light_colourmap(span.light, index),
            brightmap: span.brightmap,
            y,
            x1,
            x2,
            xfrac,
            yfrac,
            xstep: self.xstep[row],
            ystep: self.ystep[row],
            detail_shift: tables.detail_shift,
        }
        .draw(pixels);
    }
}
