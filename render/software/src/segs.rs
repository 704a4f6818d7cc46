#[cfg(feature = "hprof")]
use coarse_prof::profile;
use gameplay::{
    Colourmap, LIGHTSEGSHIFT, LineDefFlags, PicData, Vertex, WallPic, line_render_flags,
    render_flags,
};
use math::{ANG90, Angle, FRACBITS, FRACUNIT, Fixed, finetangent, fixed_mul};
use render_trait::PixelBuffer;

use super::defs::{ClipSource, DrawSeg, SIL_BOTH, SIL_BOTTOM, SIL_NONE, SIL_TOP};
use super::draw::{ColumnStyle, DrawColumn};
use super::utilities::{ViewPoint, ViewTables, WallScale, scale_from_global_angle, wiggle_fix};
use super::{Frame, RenderData};

/// Small nudge to texture steps that hides the gaps between wall columns
const SPARKLEFIX: Fixed = 64;

/// All of the state in this struct is unique to it as it is used once per seg
/// to be rendered.
#[derive(Default)]
pub(crate) struct SegRender {
    /// True if any of the segs textures might be visible.
    segtextured: bool,
    /// False if the back side is the same plane.
    markfloor: bool,
    markceiling: bool,
    maskedtexture: bool,
    /// Offset in to `openings` for the column at `rw_start`
    maskedtexturecol: Option<usize>,
    toptexture: Option<usize>,
    bottomtexture: Option<usize>,
    midtexture: Option<usize>,

    rw_normalangle: Angle,
    // regular wall
    rw_start: i32,
    rw_x: i32,
    rw_stopx: i32,
    rw_centerangle: Angle,
    rw_offset: Fixed,
    rw_distance: Fixed,
    rw_scale: Fixed,
    rw_scalestep: Fixed,
    rw_midtexturemid: Fixed,
    rw_toptexturemid: Fixed,
    rw_bottomtexturemid: Fixed,

    pixhigh: i64,
    pixlow: i64,
    pixhighstep: Fixed,
    pixlowstep: Fixed,

    topfrac: i64,
    topstep: Fixed,
    bottomfrac: i64,
    bottomstep: Fixed,

    worldtop: Fixed,
    worldbottom: Fixed,
    worldhigh: Fixed,
    worldlow: Fixed,

    wall_scale: WallScale,
    /// Light level for the wall
    wall_lights: i32,
    /// A column was closed off while drawing this range
    didsolidcol: bool,
}

/// Sector light shifted to a light table row, axis aligned walls nudged one
/// step apart.
fn seg_light(lightlevel: i32, v1: Vertex, v2: Vertex, view: &ViewPoint) -> i32 {
    let lightnum = (lightlevel >> LIGHTSEGSHIFT) + view.extralight;
    if !view.fake_contrast {
        lightnum
    } else if v1.y == v2.y {
        lightnum - 1
    } else if v1.x == v2.x {
        lightnum + 1
    } else {
        lightnum
    }
}

#[inline]
fn texture_height(pic_data: &PicData, texture: Option<usize>) -> Fixed {
    texture.map_or(0, |t| (pic_data.wall_pic(t).height as i32) << FRACBITS)
}

impl SegRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wall range for a drawseg is `start..=stop`, the columns of the seg
    /// that survived the solid wall clip. Doom function name
    /// `R_StoreWallRange`.
    #[allow(clippy::too_many_arguments)]
    pub fn store_wall_range(
        &mut self,
        start: i32,
        stop: i32,
        seg_id: usize,
        frame: &Frame,
        tables: &ViewTables,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        #[cfg(feature = "hprof")]
        profile!("store_wall_range");
        if start < 0 || stop >= tables.view_width || start > stop {
            panic!("Bad R_RenderWallRange: {start} to {stop}");
        }

        let map = frame.map;
        let view = &frame.view;
        let pic_data = frame.pic_data;
        let sky_num = pic_data.sky_num();
        let seg = &map.segments[seg_id];
        // a zero length seg has no facing and nothing to draw
        let len = seg.length as i64;
        if len == 0 {
            return;
        }
        let linedef = &map.linedefs[seg.linedef];
        let sidedef = &map.sidedefs[seg.sidedef];
        let frontsector = &map.sectors[seg.frontsector];
        let backsector = seg.backsector.map(|b| &map.sectors[b]);
        let v1 = map.vertex(seg.v1);
        let v2 = map.vertex(seg.v2);

        // calculate rw_distance for scale calculation
        self.rw_normalangle = seg.angle + ANG90;
        let dx = (v2.x as i64 - v1.x as i64) >> 1;
        let dy = (v2.y as i64 - v1.y as i64) >> 1;
        let dx1 = (view.x as i64 - v1.x as i64) >> 1;
        let dy1 = (view.y as i64 - v1.y as i64) >> 1;
        let dist = ((dy * dx1 - dx * dy1) / len) << 1;
        self.rw_distance = dist.clamp(i32::MIN as i64, i32::MAX as i64) as Fixed;

        self.wall_scale = wiggle_fix(frontsector.floorheight, frontsector.ceilingheight);
        self.rw_start = start;
        self.rw_x = start;
        self.rw_stopx = stop + 1;
        self.didsolidcol = false;

        let mut ds = DrawSeg::new(seg_id, start, stop);

        // calculate scale at both ends and step
        self.rw_scale = scale_from_global_angle(
            view.angle + tables.xtoviewangle[start as usize],
            view,
            self.rw_normalangle,
            self.rw_distance,
            tables.projection,
            self.wall_scale.max_rwscale,
        );
        ds.scale1 = self.rw_scale;
        if stop > start {
            ds.scale2 = scale_from_global_angle(
                view.angle + tables.xtoviewangle[stop as usize],
                view,
                self.rw_normalangle,
                self.rw_distance,
                tables.projection,
                self.wall_scale.max_rwscale,
            );
            self.rw_scalestep = (ds.scale2 - self.rw_scale) / (stop - start);
        } else {
            ds.scale2 = ds.scale1;
            self.rw_scalestep = 0;
        }
        ds.scalestep = self.rw_scalestep;

        // calculate texture boundaries
        //  and decide if floor / ceiling marks are needed
        self.worldtop = frontsector.ceilingheight - view.z;
        self.worldbottom = frontsector.floorheight - view.z;
        self.midtexture = None;
        self.toptexture = None;
        self.bottomtexture = None;
        self.maskedtexture = false;
        self.maskedtexturecol = None;

        match backsector {
            None => {
                // single sided line
                self.midtexture = sidedef.midtexture;
                // a single sided line is terminal, so it must mark ends
                self.markfloor = true;
                self.markceiling = true;
                self.rw_midtexturemid = if LineDefFlags::UnpegBottom.is_set(linedef.flags) {
                    // bottom of texture at bottom
                    frontsector.floorheight + texture_height(pic_data, self.midtexture) - view.z
                } else {
                    // top of texture at top
                    self.worldtop
                };
                self.rw_midtexturemid += sidedef.rowoffset;

                ds.silhouette = SIL_BOTH;
                ds.sprtopclip = Some(ClipSource::ScreenHeight);
                ds.sprbottomclip = Some(ClipSource::NegOne);
                ds.bsilheight = i32::MAX;
                ds.tsilheight = i32::MIN;
            }
            Some(backsector) => {
                // two sided line
                ds.sprtopclip = None;
                ds.sprbottomclip = None;
                ds.silhouette = SIL_NONE;

                let closed = line_render_flags(linedef, sidedef, frontsector, backsector, sky_num)
                    & render_flags::CLOSED
                    != 0;
                if closed {
                    ds.silhouette = SIL_BOTH;
                    ds.sprbottomclip = Some(ClipSource::NegOne);
                    ds.bsilheight = i32::MAX;
                    ds.sprtopclip = Some(ClipSource::ScreenHeight);
                    ds.tsilheight = i32::MIN;
                } else {
                    if frontsector.floorheight > backsector.floorheight {
                        ds.silhouette = SIL_BOTTOM;
                        ds.bsilheight = frontsector.floorheight;
                    } else if backsector.floorheight > view.z {
                        ds.silhouette = SIL_BOTTOM;
                        ds.bsilheight = i32::MAX;
                    }
                    if frontsector.ceilingheight < backsector.ceilingheight {
                        ds.silhouette |= SIL_TOP;
                        ds.tsilheight = frontsector.ceilingheight;
                    } else if backsector.ceilingheight < view.z {
                        ds.silhouette |= SIL_TOP;
                        ds.tsilheight = i32::MIN;
                    }
                }

                self.worldhigh = backsector.ceilingheight - view.z;
                self.worldlow = backsector.floorheight - view.z;

                // hack to allow height changes in outdoor areas
                if frontsector.ceilingpic == sky_num && backsector.ceilingpic == sky_num {
                    self.worldtop = self.worldhigh;
                }

                self.markfloor = self.worldlow != self.worldbottom
                    || backsector.floorpic != frontsector.floorpic
                    || backsector.lightlevel != frontsector.lightlevel
                    || backsector.flow != frontsector.flow;
                self.markceiling = self.worldhigh != self.worldtop
                    || backsector.ceilingpic != frontsector.ceilingpic
                    || backsector.lightlevel != frontsector.lightlevel;

                if backsector.ceilingheight <= frontsector.floorheight
                    || backsector.floorheight >= frontsector.ceilingheight
                {
                    // closed door
                    self.markceiling = true;
                    self.markfloor = true;
                }

                if self.worldhigh < self.worldtop {
                    // top texture
                    self.toptexture = sidedef.toptexture;
                    self.rw_toptexturemid = if LineDefFlags::UnpegTop.is_set(linedef.flags) {
                        // top of texture at top
                        self.worldtop
                    } else {
                        // bottom of texture
                        backsector.ceilingheight + texture_height(pic_data, self.toptexture)
                            - view.z
                    };
                }
                if self.worldlow > self.worldbottom {
                    // bottom texture
                    self.bottomtexture = sidedef.bottomtexture;
                    self.rw_bottomtexturemid = if LineDefFlags::UnpegBottom.is_set(linedef.flags) {
                        // bottom of texture at bottom
                        // top of texture at top
                        self.worldtop
                    } else {
                        self.worldlow
                    };
                }
                self.rw_toptexturemid += sidedef.rowoffset;
                self.rw_bottomtexturemid += sidedef.rowoffset;

                // allocate space for masked texture tables
                if sidedef.midtexture.is_some() {
                    // masked midtexture
                    self.maskedtexture = true;
                    let at = rdata.alloc_openings((self.rw_stopx - self.rw_x) as usize);
                    self.maskedtexturecol = Some(at);
                    ds.maskedtexturecol = Some(at);
                }
            }
        }

        // calculate rw_offset (only needed for textured lines)
        self.segtextured = self.midtexture.is_some()
            || self.toptexture.is_some()
            || self.bottomtexture.is_some()
            || self.maskedtexture;

        if self.segtextured {
            let offset = (((dx * dx1 + dy * dy1) / len) << 1) as Fixed;
            self.rw_offset = offset
                .wrapping_add(sidedef.textureoffset)
                .wrapping_add(seg.offset);
            self.rw_centerangle = Angle::new(ANG90) + view.angle - self.rw_normalangle;
            self.wall_lights = seg_light(frontsector.lightlevel, v1, v2, view);
        }

        // if a floor / ceiling plane is on the wrong side
        //  of the view plane, it is definitely invisible
        //  and doesn't need to be marked.
        if frontsector.floorheight >= view.z {
            // above view plane
            self.markfloor = false;
        }
        if frontsector.ceilingheight <= view.z && frontsector.ceilingpic != sky_num {
            // below view plane
            self.markceiling = false;
        }

        // calculate incremental stepping values for texture edges
        let invhgtbits = self.wall_scale.invhgtbits;
        let centeryfrac = (tables.centeryfrac as i64) >> invhgtbits;
        self.worldtop >>= invhgtbits;
        self.worldbottom >>= invhgtbits;

        self.topstep = -fixed_mul(self.rw_scalestep, self.worldtop);
        self.topfrac = centeryfrac - ((self.worldtop as i64 * self.rw_scale as i64) >> FRACBITS);
        self.bottomstep = -fixed_mul(self.rw_scalestep, self.worldbottom);
        self.bottomfrac =
            centeryfrac - ((self.worldbottom as i64 * self.rw_scale as i64) >> FRACBITS);

        if backsector.is_some() {
            self.worldhigh >>= invhgtbits;
            self.worldlow >>= invhgtbits;

            if self.worldhigh < self.worldtop {
                self.pixhigh =
                    centeryfrac - ((self.worldhigh as i64 * self.rw_scale as i64) >> FRACBITS);
                self.pixhighstep = -fixed_mul(self.rw_scalestep, self.worldhigh);
            }
            if self.worldlow > self.worldbottom {
                self.pixlow =
                    centeryfrac - ((self.worldlow as i64 * self.rw_scale as i64) >> FRACBITS);
                self.pixlowstep = -fixed_mul(self.rw_scalestep, self.worldlow);
            }
        }

        // render it
        let planes = &mut rdata.visplanes;
        if self.markceiling {
            match planes.ceilingplane {
                Some(ceiling) => {
                    planes.ceilingplane =
                        Some(planes.check_plane(ceiling, self.rw_x, self.rw_stopx - 1));
                }
                None => self.markceiling = false,
            }
        }
        if self.markfloor {
            match planes.floorplane {
                Some(floor) => {
                    let floor = if self.markceiling && planes.ceilingplane == planes.floorplane {
                        planes.dup_plane(floor, self.rw_x, self.rw_stopx - 1)
                    } else {
                        planes.check_plane(floor, self.rw_x, self.rw_stopx - 1)
                    };
                    planes.floorplane = Some(floor);
                }
                None => self.markfloor = false,
            }
        }

        self.render_seg_loop(frame, tables, rdata, pixels);

        // a fully closed off range hides sprites behind it at the back
        // sector heights
        if let Some(backsector) = backsector {
            if self.didsolidcol {
                if ds.silhouette & SIL_BOTTOM == 0 {
                    ds.silhouette |= SIL_BOTTOM;
                    ds.bsilheight = backsector.floorheight;
                }
                if ds.silhouette & SIL_TOP == 0 {
                    ds.silhouette |= SIL_TOP;
                    ds.tsilheight = backsector.ceilingheight;
                }
            }
        }

        // save sprite clipping info
        let count = (self.rw_stopx - start) as usize;
        let range = start as usize..self.rw_stopx as usize;
        if (ds.silhouette & SIL_TOP != 0 || self.maskedtexture) && ds.sprtopclip.is_none() {
            let at = rdata.alloc_openings(count);
            rdata.openings[at..at + count]
                .copy_from_slice(&rdata.portal_clip.ceilingclip[range.clone()]);
            ds.sprtopclip = Some(ClipSource::Openings(at));
        }
        if (ds.silhouette & SIL_BOTTOM != 0 || self.maskedtexture) && ds.sprbottomclip.is_none() {
            let at = rdata.alloc_openings(count);
            rdata.openings[at..at + count]
                .copy_from_slice(&rdata.portal_clip.floorclip[range]);
            ds.sprbottomclip = Some(ClipSource::Openings(at));
        }

        if self.maskedtexture && ds.silhouette & SIL_TOP == 0 {
            ds.silhouette |= SIL_TOP;
            ds.tsilheight = i32::MIN;
        }
        if self.maskedtexture && ds.silhouette & SIL_BOTTOM == 0 {
            ds.silhouette |= SIL_BOTTOM;
            ds.bsilheight = i32::MAX;
        }
        rdata.push_drawseg(ds);
    }

    /// Doom function name `R_RenderSegLoop`
    fn render_seg_loop(
        &mut self,
        frame: &Frame,
        tables: &ViewTables,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        let pic_data = frame.pic_data;
        let heightbits = self.wall_scale.heightbits;
        let heightunit = self.wall_scale.heightunit;
        let mid_pic = self.midtexture.map(|t| pic_data.wall_pic(t));
        let top_pic = self.toptexture.map(|t| pic_data.wall_pic(t));
        let bottom_pic = self.bottomtexture.map(|t| pic_data.wall_pic(t));
        let bright = pic_data.fixed_colourmap().unwrap_or(pic_data.colourmap(0));

        let RenderData {
            portal_clip: clip,
            visplanes: planes,
            openings,
            rendered_segs,
            ..
        } = rdata;
        *rendered_segs += 1;

        while self.rw_x < self.rw_stopx {
            let x = self.rw_x as usize;

            // mark floor / ceiling areas
            let mut yl = to_row((self.topfrac + heightunit - 1) >> heightbits);
            // no space above wall?
            let top = clip.ceilingclip[x] + 1;
            if yl < top {
                yl = top;
            }

            if self.markceiling {
                let mut bottom = yl - 1;
                if bottom >= clip.floorclip[x] {
                    bottom = clip.floorclip[x] - 1;
                }
                if top <= bottom {
                    if let Some(ceiling) = planes.ceilingplane {
                        planes.plane_mut(ceiling).set_column(self.rw_x, top, bottom);
                    }
                }
                clip.ceilingclip[x] = bottom;
            }

            let mut yh = to_row(self.bottomfrac >> heightbits);
            let bottom = clip.floorclip[x] - 1;
            if yh > bottom {
                yh = bottom;
            }

            if self.markfloor {
                let top = yh.max(clip.ceilingclip[x]) + 1;
                if top <= bottom {
                    if let Some(floor) = planes.floorplane {
                        planes.plane_mut(floor).set_column(self.rw_x, top, bottom);
                    }
                }
                clip.floorclip[x] = top;
            }

            // texturecolumn and lighting are independent of wall tiers
            let mut texturecolumn = 0;
            let mut colourmap = pic_data.colourmap(0);
            let mut iscale = 0;
            if self.segtextured {
                // calculate texture offset
                let angle = self.rw_centerangle + tables.xtoviewangle[x];
                texturecolumn = self
                    .rw_offset
                    .wrapping_sub(fixed_mul(finetangent(angle.fine()), self.rw_distance))
                    >> FRACBITS;
                let index = ((self.rw_scale as u32) >> tables.light_scale_shift) as usize;
                colourmap = pic_data.wall_light_colourmap(self.wall_lights, index);
                iscale = (0xffff_ffffu32 / self.rw_scale.max(1) as u32).wrapping_sub(SPARKLEFIX as u32)
                    as Fixed;
            }
            let column = WallColumn {
                texturecolumn,
                colourmap,
                bright,
                pic_data,
                x: self.rw_x,
                iscale,
            };

            // draw the wall tiers
            if let Some(pic) = mid_pic {
                // single sided line
                column.draw(pic, yl, yh, self.rw_midtexturemid, tables, pixels);
                clip.ceilingclip[x] = tables.view_height;
                clip.floorclip[x] = -1;
            } else {
                // two sided line
                if let Some(pic) = top_pic {
                    // top wall
                    let mut mid = to_row(self.pixhigh >> heightbits);
                    self.pixhigh += self.pixhighstep as i64;
                    if mid >= clip.floorclip[x] {
                        mid = clip.floorclip[x] - 1;
                    }
                    if mid >= yl {
                        let texturemid =
                            self.rw_toptexturemid + (yl - tables.centery + 1) * SPARKLEFIX;
                        column.draw(pic, yl, mid, texturemid, tables, pixels);
                        clip.ceilingclip[x] = mid;
                    } else {
                        clip.ceilingclip[x] = yl - 1;
                    }
                } else if self.markceiling {
                    // no top wall
                    clip.ceilingclip[x] = yl - 1;
                }

                if let Some(pic) = bottom_pic {
                    // bottom wall
                    let mut mid = to_row((self.pixlow + heightunit - 1) >> heightbits);
                    self.pixlow += self.pixlowstep as i64;
                    // no space above wall?
                    if mid <= clip.ceilingclip[x] {
                        mid = clip.ceilingclip[x] + 1;
                    }
                    if mid <= yh {
                        let texturemid =
                            self.rw_bottomtexturemid + (mid - tables.centery + 1) * SPARKLEFIX;
                        column.draw(pic, mid, yh, texturemid, tables, pixels);
                        clip.floorclip[x] = mid;
                    } else {
                        clip.floorclip[x] = yh + 1;
                    }
                } else if self.markfloor {
                    // no bottom wall
                    clip.floorclip[x] = yh + 1;
                }

                // nothing more can be seen through this column
                if (self.markceiling || self.markfloor)
                    && clip.floorclip[x] <= clip.ceilingclip[x] + 1
                {
                    clip.solidcol[x] = true;
                    self.didsolidcol = true;
                }

                if let Some(at) = self.maskedtexturecol {
                    // save texturecol
                    //  for backdrawing of masked mid texture
                    openings[at + (self.rw_x - self.rw_start) as usize] = texturecolumn;
                }
            }

            self.rw_scale = self.rw_scale.wrapping_add(self.rw_scalestep);
            self.topfrac += self.topstep as i64;
            self.bottomfrac += self.bottomstep as i64;
            self.rw_x += 1;
        }
    }
}

#[inline]
fn to_row(frac: i64) -> i32 {
    frac.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// The parts of a wall column shared by every tier at one `x`
struct WallColumn<'a> {
    texturecolumn: i32,
    colourmap: &'a Colourmap,
    bright: &'a Colourmap,
    pic_data: &'a PicData,
    x: i32,
    iscale: Fixed,
}

impl WallColumn<'_> {
    fn draw(
        &self,
        pic: &WallPic,
        yl: i32,
        yh: i32,
        texturemid: Fixed,
        tables: &ViewTables,
        pixels: &mut impl PixelBuffer,
    ) {
        DrawColumn {
            source: pic.column(self.texturecolumn),
            colourmap: self.colourmap,
            brightmap: pic.brightmap.map(|b| (self.pic_data.brightmap(b), self.bright)),
            style: ColumnStyle::Opaque,
            x: self.x,
            yl,
            yh,
            iscale: self.iscale,
            texturemid,
            centery: tables.centery,
            detail_shift: tables.detail_shift,
        }
        .draw(pixels);
    }
}

/// Draw the masked middle texture of a two sided line over `x1..=x2`, after
/// all walls and planes are done. Doom function name
/// `R_RenderMaskedSegRange`.
pub(crate) fn render_masked_seg_range(
    ds: &DrawSeg,
    x1: i32,
    x2: i32,
    frame: &Frame,
    tables: &ViewTables,
    rdata: &mut RenderData,
    pixels: &mut impl PixelBuffer,
) {
    let Some(cols) = ds.maskedtexturecol else {
        return;
    };
    let map = frame.map;
    let view = &frame.view;
    let pic_data = frame.pic_data;
    let seg = &map.segments[ds.curline];
    let sidedef = &map.sidedefs[seg.sidedef];
    let linedef = &map.linedefs[seg.linedef];
    let (Some(texnum), Some(backsector)) = (sidedef.midtexture, seg.backsector) else {
        return;
    };
    let frontsector = &map.sectors[seg.frontsector];
    let backsector = &map.sectors[backsector];
    let pic = pic_data.wall_pic(texnum);

    let lightnum = seg_light(
        frontsector.lightlevel,
        map.vertex(seg.v1),
        map.vertex(seg.v2),
        view,
    );
    let style = if LineDefFlags::Translucent.is_set(linedef.flags) {
        ColumnStyle::Translucent(pic_data.tint_map(0))
    } else {
        ColumnStyle::Opaque
    };
    let bright = pic_data.fixed_colourmap().unwrap_or(pic_data.colourmap(0));
    let brightmap = pic.brightmap.map(|b| (pic_data.brightmap(b), bright));

    // find positioning
    let texheight = (pic.height as i32) << FRACBITS;
    let mut texturemid = if LineDefFlags::UnpegBottom.is_set(linedef.flags) {
        frontsector.floorheight.max(backsector.floorheight) + texheight - view.z
    } else {
        frontsector.ceilingheight.min(backsector.ceilingheight) - view.z
    };
    texturemid += sidedef.rowoffset;

    let mut spryscale = ds
        .scale1
        .wrapping_add((x1 - ds.x1).wrapping_mul(ds.scalestep));
    let screen_limit = (tables.view_height as i64) << (FRACBITS * 2);

    // draw the columns
    for x in x1..=x2 {
        let col_index = cols + (x - ds.x1) as usize;
        let texturecolumn = rdata.openings[col_index];
        if texturecolumn != i32::MAX {
            let index = ((spryscale as u32) >> tables.light_scale_shift) as usize;
            let colourmap = pic_data.wall_light_colourmap(lightnum, index);

            // skip columns whose projection lands wholly off screen, the
            // 32 bit top would have overflowed
            let t = ((tables.centeryfrac as i64) << FRACBITS) - texturemid as i64 * spryscale as i64;
            if spryscale > 0 && t + texheight as i64 * spryscale as i64 >= 0 && t <= screen_limit {
                let sprtopscreen = t >> FRACBITS;
                let bottomscreen = sprtopscreen + spryscale as i64 * pic.height as i64;
                let mut yl = to_row((sprtopscreen + FRACUNIT as i64 - 1) >> FRACBITS);
                let mut yh = to_row((bottomscreen - 1) >> FRACBITS);

                let floorclip = rdata.clip_value(ds.sprbottomclip, ds.x1, x, tables.view_height);
                let ceilingclip = rdata.clip_value(ds.sprtopclip, ds.x1, x, -1);
                if yh >= floorclip {
                    yh = floorclip - 1;
                }
                if yl <= ceilingclip {
                    yl = ceilingclip + 1;
                }

                if yl <= yh {
                    DrawColumn {
                        source: pic.column(texturecolumn),
                        colourmap,
                        brightmap,
                        style,
                        x,
                        yl,
                        yh,
                        iscale: (0xffff_ffffu32 / spryscale as u32) as Fixed,
                        texturemid,
                        centery: tables.centery,
                        detail_shift: tables.detail_shift,
                    }
                    .draw(pixels);
                }
            }
            rdata.openings[col_index] = i32::MAX;
        }
        spryscale = spryscale.wrapping_add(ds.scalestep);
    }
}

#[cfg(test)]
mod tests {
    use gameplay::{CorridorBuilder, LightZ, MapData, PicData, Room};
    use math::{Angle, FRACUNIT};
    use render_trait::FrameBuffer;

    use super::SegRender;
    use crate::defs::{ClipSource, SIL_BOTH};
    use crate::utilities::{ViewPoint, ViewTables};
    use crate::{Frame, RenderData};

    struct Scene {
        map: MapData,
        pics: PicData,
        tables: ViewTables,
        rdata: RenderData,
        buffer: FrameBuffer,
    }

    fn scene(map: MapData) -> Scene {
        let mut pics = PicData::generated(LightZ::Smooth);
        pics.set_view_light_scale(320, 320);
        let mut rdata = RenderData::new(320, 200);
        rdata.clear_data();
        Scene {
            map,
            pics,
            tables: ViewTables::new(320, 200, false),
            rdata,
            buffer: FrameBuffer::new(320, 200),
        }
    }

    /// Standing in the middle of the west room looking east
    fn view() -> ViewPoint {
        let angle = Angle::default();
        ViewPoint {
            x: 64 * FRACUNIT,
            y: 64 * FRACUNIT,
            z: 41 * FRACUNIT,
            angle,
            sin: angle.sin(),
            cos: angle.cos(),
            fake_contrast: true,
            ..ViewPoint::default()
        }
    }

    /// Store columns `140..=180` of `seg_id` with the planes of room 0 set up
    fn store(s: &mut Scene, seg_id: usize) -> SegRender {
        let sector = &s.map.sectors[0];
        let sky = s.pics.sky_num();
        let planes = &mut s.rdata.visplanes;
        planes.floorplane = Some(planes.find_plane(
            sector.floorheight,
            sector.floorpic,
            sector.lightlevel,
            0,
            sky,
        ));
        planes.ceilingplane = Some(planes.find_plane(
            sector.ceilingheight,
            sector.ceilingpic,
            sector.lightlevel,
            0,
            sky,
        ));

        let frame = Frame {
            view: view(),
            map: &s.map,
            pic_data: &s.pics,
        };
        let mut segs = SegRender::new();
        segs.store_wall_range(
            140,
            180,
            seg_id,
            &frame,
            &s.tables,
            &mut s.rdata,
            &mut s.buffer,
        );
        segs
    }

    /// The seg of the room 0 to room 1 line facing back in to room 0
    fn boundary(map: &MapData) -> usize {
        map.segments
            .iter()
            .position(|seg| seg.frontsector == 0 && seg.backsector == Some(1))
            .unwrap()
    }

    #[test]
    fn matching_sectors_mark_no_planes() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 128))
            .build()
            .unwrap();
        let mut s = scene(map);
        let seg_id = boundary(&s.map);
        let segs = store(&mut s, seg_id);
        assert!(!segs.markfloor);
        assert!(!segs.markceiling);
        assert!(segs.toptexture.is_none());
        assert_eq!(s.rdata.drawsegs.len(), 1);
        assert_eq!(s.rdata.rendered_segs, 1);
        // nothing was closed, nothing behind is hidden
        assert!(s.rdata.portal_clip.any_open(140, 181));
        assert!(s.rdata.visplanes.planes().iter().all(|p| p.minx > p.maxx));
    }

    #[test]
    fn lower_back_ceiling_gives_top_tier() {
        // low enough that the whole top tier is on screen
        let map = CorridorBuilder::new(128, Room::new(128, 0, 64))
            .open(Room::new(128, 0, 56))
            .build()
            .unwrap();
        let mut s = scene(map);
        let seg_id = boundary(&s.map);
        let segs = store(&mut s, seg_id);
        assert!(segs.toptexture.is_some());
        assert!(segs.markceiling);
        assert!(!segs.markfloor);

        let ceiling = s.rdata.visplanes.ceilingplane.unwrap();
        let plane = &s.rdata.visplanes.planes()[ceiling];
        assert_eq!((plane.minx, plane.maxx), (140, 180));
        // the top tier pulled the ceiling clip down past the ceiling plane
        for x in 140..=180 {
            assert!(plane.top(x as i32) <= plane.bottom(x as i32));
            assert!(s.rdata.portal_clip.ceilingclip[x] > plane.bottom(x as i32) as i32);
        }
    }

    #[test]
    fn one_sided_wall_closes_its_columns() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .build()
            .unwrap();
        let mut s = scene(map);
        // the east wall, straight ahead
        let east = s.map.vertex(2).x;
        let seg_id = s
            .map
            .segments
            .iter()
            .position(|seg| s.map.vertex(seg.v1).x == east && s.map.vertex(seg.v2).x == east)
            .unwrap();
        let segs = store(&mut s, seg_id);
        assert!(segs.markfloor);
        assert!(segs.markceiling);

        let ds = s.rdata.drawsegs[0];
        assert_eq!(ds.silhouette, SIL_BOTH);
        assert_eq!(ds.sprtopclip, Some(ClipSource::ScreenHeight));
        assert_eq!(ds.sprbottomclip, Some(ClipSource::NegOne));
        assert!(ds.scale1 > 0 && ds.scale2 > 0);
        for x in 140..=180 {
            assert!(s.rdata.portal_clip.ceilingclip[x] >= s.rdata.portal_clip.floorclip[x] - 1);
        }
    }

    #[test]
    fn masked_mid_reserves_openings() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .grate(Room::new(128, 0, 128), 1, false)
            .build()
            .unwrap();
        let mut s = scene(map);
        let seg_id = boundary(&s.map);
        store(&mut s, seg_id);
        let ds = s.rdata.drawsegs[0];
        let cols = ds.maskedtexturecol.unwrap();
        // one texture column per screen column, then both sprite clips
        assert!(s.rdata.lastopening >= cols + 41 * 3);
        assert!(matches!(ds.sprtopclip, Some(ClipSource::Openings(_))));
    }
}
