//! The front to back BSP walk that feeds walls to the seg renderer, and the
//! frame entry point tying walls, planes and masked textures together.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use gameplay::log::{debug, trace};
use gameplay::{
    BBox, COLOURMAP_LEN, IS_SSECTOR_MASK, Level, PicData, Player, line_render_flags,
    render_flags, subsector_index,
};
use math::{ANG180, Angle, point_to_angle_wide};
use render_trait::{PixelBuffer, PlayViewRenderer};

use super::segs::{SegRender, render_masked_seg_range};
use super::swirl::SwirlCache;
use super::utilities::{ViewPoint, ViewTables};
use super::{Frame, RenderData, RenderStats};

/// Which bounding box corners bound the view angle, by the position of the
/// view relative to the box. Indexes `[top, bottom, left, right]` as
/// `x1, y1, x2, y2`.
const CHECKCOORD: [[usize; 4]; 11] = [
    [3, 0, 2, 1],
    [3, 0, 2, 0],
    [3, 1, 2, 0],
    [0; 4],
    [2, 0, 2, 1],
    [0, 0, 0, 0],
    [3, 1, 3, 0],
    [0; 4],
    [2, 0, 3, 1],
    [2, 1, 3, 1],
    [2, 1, 3, 0],
];

/// Switches that change how a frame looks, but not what is in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Half resolution in both directions, each view pixel a 2x2 block
    pub low_detail: bool,
    /// Shade walls running along the map axes one light step apart
    pub fake_contrast: bool,
    /// Let the invulnerability colourmap tint the sky
    pub invul_sky: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            low_detail: false,
            fake_contrast: true,
            invul_sky: false,
        }
    }
}

/// The software renderer proper. Owns every per frame buffer so nothing is
/// allocated while drawing unless a level outgrows the current sizes.
///
/// - R_RenderPlayerView, r_main.c
/// - R_RenderBSPNode, r_bsp.c, walks front to back
/// - R_StoreWallRange, r_segs.c, stores one drawseg per visible wall range
/// - R_DrawPlanes, r_plane.c, once all walls are in
/// - R_DrawMasked, r_things.c, masked mid textures back to front
pub struct SoftwareRenderer {
    pub(super) r_data: RenderData,
    pub(super) seg_renderer: SegRender,
    tables: ViewTables,
    swirl: SwirlCache,
    options: RenderOptions,
    screen_width: usize,
    screen_height: usize,
    /// View width the light tables in `PicData` were last scaled for
    light_scale_width: Option<usize>,
    /// BSP nodes visited last frame
    traversals: u32,
}

impl SoftwareRenderer {
    pub fn new(screen_width: usize, screen_height: usize, options: RenderOptions) -> Self {
        let tables = ViewTables::new(screen_width, screen_height, options.low_detail);
        debug!(
            "Software renderer for {screen_width}x{screen_height}, low detail {}",
            options.low_detail
        );
        Self {
            r_data: RenderData::new(tables.view_width as usize, tables.view_height as usize),
            seg_renderer: SegRender::new(),
            tables,
            swirl: SwirlCache::new(),
            options,
            screen_width,
            screen_height,
            light_scale_width: None,
            traversals: 0,
        }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Change options. The view tables are rebuilt if the detail level
    /// changed. Doom function name `R_SetViewSize`.
    pub fn set_options(&mut self, options: RenderOptions) {
        let resize = options.low_detail != self.options.low_detail;
        self.options = options;
        if resize {
            self.resize(self.screen_width, self.screen_height);
        }
    }

    /// Counters from the last frame drawn
    pub fn stats(&self) -> RenderStats {
        self.r_data.stats()
    }

    fn resize(&mut self, screen_width: usize, screen_height: usize) {
        debug!("Renderer resized to {screen_width}x{screen_height}");
        self.screen_width = screen_width;
        self.screen_height = screen_height;
        self.tables = ViewTables::new(screen_width, screen_height, self.options.low_detail);
        self.r_data = RenderData::new(
            self.tables.view_width as usize,
            self.tables.view_height as usize,
        );
        self.light_scale_width = None;
    }

    /// Doom function name `R_SetupFrame`
    fn setup_frame(&self, player: &Player, level: &Level) -> ViewPoint {
        let angle = player.mobj.angle;
        ViewPoint {
            x: player.mobj.x,
            y: player.mobj.y,
            z: player.viewz,
            angle,
            sin: angle.sin(),
            cos: angle.cos(),
            extralight: player.extralight,
            level_time: level.level_time,
            fake_contrast: self.options.fake_contrast,
            invul_sky: self.options.invul_sky,
        }
    }

    /// Walk the BSP front to back. Back sides of a node are skipped when
    /// their bounding box is completely hidden. Doom function name
    /// `R_RenderBSPNode`.
    fn render_bsp_node(&mut self, frame: &Frame, node_id: u32, pixels: &mut impl PixelBuffer) {
        self.traversals += 1;

        if node_id & IS_SSECTOR_MASK != 0 {
            self.draw_subsector(frame, subsector_index(node_id), pixels);
            return;
        }

        let node = &frame.map.nodes[node_id as usize];
        // Decide which side the view point is on.
        let side = node.point_on_side(frame.view.x, frame.view.y);
        // Recursively divide front space.
        self.render_bsp_node(frame, node.children[side], pixels);

        // Possibly divide back space.
        if self.check_bbox(&frame.view, &node.bboxes[side ^ 1]) {
            self.render_bsp_node(frame, node.children[side ^ 1], pixels);
        }
    }

    /// Set up the floor and ceiling planes of a subsector then clip and
    /// draw each of its segs. Doom function name `R_Subsector`.
    fn draw_subsector(&mut self, frame: &Frame, subsect: usize, pixels: &mut impl PixelBuffer) {
        let map = frame.map;
        if subsect >= map.subsectors.len() {
            panic!(
                "R_Subsector: ss {subsect} with numss = {}",
                map.subsectors.len()
            );
        }
        let subsector = &map.subsectors[subsect];
        let front = &map.sectors[subsector.sector];
        let sky_num = frame.pic_data.sky_num();

        let planes = &mut self.r_data.visplanes;
        planes.floorplane = (front.floorheight < frame.view.z).then(|| {
            planes.find_plane(
                front.floorheight,
                front.floorpic,
                front.lightlevel,
                front.flow,
                sky_num,
            )
        });
        planes.ceilingplane =
            (front.ceilingheight > frame.view.z || front.ceilingpic == sky_num).then(|| {
                planes.find_plane(
                    front.ceilingheight,
                    front.ceilingpic,
                    front.lightlevel,
                    0,
                    sky_num,
                )
            });

        let start = subsector.start_seg as usize;
        for seg_id in start..start + subsector.seg_count as usize {
            self.add_line(frame, seg_id, pixels);
        }
    }

    /// Clip a seg to the view and send the visible columns off to be drawn.
    /// Doom function name `R_AddLine`.
    fn add_line(&mut self, frame: &Frame, seg_id: usize, pixels: &mut impl PixelBuffer) {
        let map = frame.map;
        let view = &frame.view;
        let seg = &map.segments[seg_id];
        let v1 = map.vertex(seg.v1);
        let v2 = map.vertex(seg.v2);

        // OPTIMIZE: quickly reject orthogonal back sides.
        let mut angle1 = point_to_angle_wide(view.x, view.y, v1.x, v1.y).bam();
        let mut angle2 = point_to_angle_wide(view.x, view.y, v2.x, v2.y).bam();

        // Back side? I.e. backface culling
        let span = angle1.wrapping_sub(angle2);
        if span >= ANG180 {
            return;
        }

        angle1 = angle1.wrapping_sub(view.angle.bam());
        angle2 = angle2.wrapping_sub(view.angle.bam());
        let Some((angle1, angle2)) = self.clip_to_fov(angle1, angle2, span) else {
            return;
        };

        let x1 = self.tables.angle_to_x(Angle::new(angle1));
        let x2 = self.tables.angle_to_x(Angle::new(angle2));
        // Does not cross a pixel?
        if x1 >= x2 {
            return;
        }

        let solid = match seg.backsector {
            None => true,
            Some(back) => {
                let flags = line_render_flags(
                    &map.linedefs[seg.linedef],
                    &map.sidedefs[seg.sidedef],
                    &map.sectors[seg.frontsector],
                    &map.sectors[back],
                    frame.pic_data.sky_num(),
                );
                if flags & render_flags::IGNORE != 0 {
                    return;
                }
                flags & render_flags::CLOSED != 0
            }
        };
        self.clip_wall_segment(x1, x2, solid, seg_id, frame, pixels);
    }

    /// Clamp the view relative angles `angle1` (left) and `angle2` (right)
    /// to the field of view. `None` if nothing is left.
    fn clip_to_fov(&self, mut angle1: u32, mut angle2: u32, span: u32) -> Option<(u32, u32)> {
        let clipangle = self.tables.clipangle.bam();
        let fov = clipangle.wrapping_mul(2);

        let mut tspan = angle1.wrapping_add(clipangle);
        if tspan > fov {
            tspan -= fov;
            // Totally off the left edge?
            if tspan >= span {
                return None;
            }
            angle1 = clipangle;
        }
        tspan = clipangle.wrapping_sub(angle2);
        if tspan > fov {
            tspan -= fov;
            // Totally off the right edge?
            if tspan >= span {
                return None;
            }
            angle2 = clipangle.wrapping_neg();
        }
        Some((angle1, angle2))
    }

    /// Store every run of open columns in `first..last` as a wall range.
    /// Solid segs also close those columns to everything behind. Doom
    /// function name `R_ClipWallSegment`, using a per column flag instead of
    /// a list of solid ranges.
    fn clip_wall_segment(
        &mut self,
        mut first: i32,
        last: i32,
        solid: bool,
        seg_id: usize,
        frame: &Frame,
        pixels: &mut impl PixelBuffer,
    ) {
        let last = last as usize;
        while (first as usize) < last {
            let from = first as usize;
            let solidcol = &self.r_data.portal_clip.solidcol;
            if solidcol[from] {
                match solidcol[from..last].iter().position(|s| !s) {
                    Some(open) => first += open as i32,
                    None => return,
                }
                continue;
            }

            let to = solidcol[from..last]
                .iter()
                .position(|s| *s)
                .map_or(last, |closed| from + closed);
            self.seg_renderer.store_wall_range(
                first,
                to as i32 - 1,
                seg_id,
                frame,
                &self.tables,
                &mut self.r_data,
                pixels,
            );
            if solid {
                self.r_data.portal_clip.solidcol[from..to].fill(true);
            }
            first = to as i32;
        }
    }

    /// Checks BSP node/subtree bounding box. Returns true if some part of
    /// the bbox might be visible. Doom function name `R_CheckBBox`.
    fn check_bbox(&self, view: &ViewPoint, bbox: &BBox) -> bool {
        // Find the corners of the box that define the edges from current
        // viewpoint.
        let boxx = if view.x <= bbox.left {
            0
        } else if view.x < bbox.right {
            1
        } else {
            2
        };
        let boxy = if view.y >= bbox.top {
            0
        } else if view.y > bbox.bottom {
            1
        } else {
            2
        };

        let boxpos = (boxy << 2) + boxx;
        if boxpos == 5 {
            return true;
        }

        let coord = [bbox.top, bbox.bottom, bbox.left, bbox.right];
        let check = CHECKCOORD[boxpos];
        let (x1, y1) = (coord[check[0]], coord[check[1]]);
        let (x2, y2) = (coord[check[2]], coord[check[3]]);

        // check clip list for an open space
        let angle1 = point_to_angle_wide(view.x, view.y, x1, y1)
            .bam()
            .wrapping_sub(view.angle.bam());
        let angle2 = point_to_angle_wide(view.x, view.y, x2, y2)
            .bam()
            .wrapping_sub(view.angle.bam());
        let span = angle1.wrapping_sub(angle2);

        // Sitting on a line?
        if span >= ANG180 {
            return true;
        }

        let Some((angle1, angle2)) = self.clip_to_fov(angle1, angle2, span) else {
            return false;
        };

        // Find the first clippost that touches the source post (adjacent
        // pixels are touching).
        let sx1 = self.tables.angle_to_x(Angle::new(angle1));
        let sx2 = self.tables.angle_to_x(Angle::new(angle2));
        // Does not cross a pixel.
        if sx1 == sx2 {
            return false;
        }
        let (lo, hi) = (sx1.min(sx2) as usize, sx1.max(sx2) as usize);
        self.r_data.portal_clip.any_open(lo, hi)
    }

    /// Masked mid textures, furthest first. Doom function name
    /// `R_DrawMasked`.
    fn draw_masked(&mut self, frame: &Frame, pixels: &mut impl PixelBuffer) {
        #[cfg(feature = "hprof")]
        profile!("draw_masked");
        for i in (0..self.r_data.drawsegs.len()).rev() {
            let ds = self.r_data.drawsegs[i];
            if ds.maskedtexturecol.is_some() {
                render_masked_seg_range(
                    &ds,
                    ds.x1,
                    ds.x2,
                    frame,
                    &self.tables,
                    &mut self.r_data,
                    pixels,
                );
            }
        }
    }
}

impl PlayViewRenderer for SoftwareRenderer {
    fn render_player_view(
        &mut self,
        player: &Player,
        level: &Level,
        pic_data: &mut PicData,
        buffer: &mut impl PixelBuffer,
    ) {
        #[cfg(feature = "hprof")]
        profile!("render_player_view");
        let size = *buffer.size();
        if size.width_usize() != self.screen_width || size.height_usize() != self.screen_height {
            self.resize(size.width_usize(), size.height_usize());
        }

        let view_width = (self.tables.view_width as usize) << self.tables.detail_shift;
        if self.light_scale_width != Some(view_width) {
            pic_data.set_view_light_scale(self.screen_width, view_width);
            self.light_scale_width = Some(view_width);
        }
        pic_data.set_fixed_colourmap(player.fixedcolormap);
        let pic_data: &PicData = pic_data;

        let frame = Frame {
            view: self.setup_frame(player, level),
            map: &level.map_data,
            pic_data,
        };

        // Clear buffers.
        self.r_data.clear_data();
        // Anything the walls and planes miss shows up as solid black
        buffer.clear_with_colour(pic_data.colourmap(COLOURMAP_LEN - 1)[0]);
        self.traversals = 0;

        self.render_bsp_node(&frame, frame.map.start_node, buffer);
        trace!("BSP traversals for render: {}", self.traversals);

        self.r_data.visplanes.draw_planes(
            &frame.view,
            &self.tables,
            pic_data,
            &mut self.swirl,
            buffer,
        );
        self.draw_masked(&frame, buffer);

        let stats = self.r_data.stats();
        trace!(
            "Rendered {} segs, {} of {} visplanes, {} drawsegs, {} openings",
            stats.rendered_segs,
            stats.rendered_visplanes,
            stats.visplanes,
            stats.drawsegs,
            stats.openings
        );
    }
}

#[cfg(test)]
mod tests {
    use gameplay::{
        Colourmap, CorridorBuilder, Level, LightZ, MapData, PicData, Player, Room, WallPic,
    };
    use math::{ANG45, ANG90, ANG180, Angle, FRACUNIT};
    use render_trait::{FrameBuffer, PixelBuffer, PlayViewRenderer};

    use super::{RenderOptions, SoftwareRenderer};
    use crate::utilities::ANGLETOSKYSHIFT;

    const BRICK: usize = 0;
    const CHECK72: usize = 1;
    const BLUE: std::ops::Range<u8> = 128..160;
    const F_SKY1: usize = 4;

    fn render(
        map: MapData,
        x: i32,
        angle: Angle,
        options: RenderOptions,
    ) -> (SoftwareRenderer, FrameBuffer) {
        let level = Level::new(map);
        let player = Player::new(&level.map_data, x * FRACUNIT, 64 * FRACUNIT, angle);
        let mut pics = PicData::generated(LightZ::Smooth);
        let mut renderer = SoftwareRenderer::new(320, 200, options);
        let mut buffer = FrameBuffer::new(320, 200);
        renderer.render_player_view(&player, &level, &mut pics, &mut buffer);
        (renderer, buffer)
    }

    fn column_has(buffer: &FrameBuffer, x: usize, colours: std::ops::Range<u8>) -> bool {
        (0..buffer.size().height_usize()).any(|y| colours.contains(&buffer.read_pixel(x, y)))
    }

    #[test]
    fn counters_are_filled() {
        let map = CorridorBuilder::new(128, Room::new(256, 0, 128))
            .build()
            .unwrap();
        let (renderer, _) = render(map, 64, Angle::default(), RenderOptions::default());
        let stats = renderer.stats();
        assert!(stats.rendered_segs > 0);
        assert_eq!(stats.rendered_visplanes, 2);
        assert!(stats.drawsegs > 0);
        assert!(renderer.traversals > 0);
    }

    #[test]
    fn ignored_seam_shares_planes() {
        let single = CorridorBuilder::new(128, Room::new(256, 0, 128))
            .build()
            .unwrap();
        let split = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 128))
            .build()
            .unwrap();
        let (a, _) = render(single, 64, Angle::default(), RenderOptions::default());
        let (b, _) = render(split, 64, Angle::default(), RenderOptions::default());
        assert_eq!(a.stats().visplanes, 2);
        assert_eq!(a.stats().visplanes, b.stats().visplanes);
        assert_eq!(a.stats().rendered_visplanes, b.stats().rendered_visplanes);
    }

    #[test]
    fn step_down_ceiling_draws_top_tier_and_two_ceilings() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128).wall(BRICK))
            .open(Room::new(128, 0, 200).wall(CHECK72))
            .build()
            .unwrap();
        // in the east room looking back west
        let (renderer, buffer) = render(map, 192, Angle::new(ANG180), RenderOptions::default());

        let planes = renderer.r_data.visplanes.planes();
        let drawn_at = |height| {
            planes
                .iter()
                .any(|p| p.height == height && p.minx <= p.maxx)
        };
        assert!(drawn_at(200 * FRACUNIT));
        assert!(drawn_at(128 * FRACUNIT));
        // the only blue in the middle of the view is the upper texture
        assert!(column_has(&buffer, 160, BLUE));
    }

    #[test]
    fn grate_is_drawn_after_the_walls() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128).wall(BRICK))
            .grate(Room::new(128, 0, 128).wall(BRICK), CHECK72, false)
            .build()
            .unwrap();
        let (renderer, buffer) = render(map, 64, Angle::default(), RenderOptions::default());
        assert!(
            renderer
                .r_data
                .drawsegs
                .iter()
                .any(|ds| ds.maskedtexturecol.is_some())
        );
        assert!(column_has(&buffer, 160, BLUE));
    }

    #[test]
    fn low_detail_fills_two_by_two_blocks() {
        let map = CorridorBuilder::new(128, Room::new(128, 0, 128))
            .open(Room::new(128, 0, 200).wall(CHECK72))
            .build()
            .unwrap();
        let options = RenderOptions {
            low_detail: true,
            ..RenderOptions::default()
        };
        let (renderer, buffer) = render(map, 64, Angle::default(), options);
        assert_eq!(renderer.tables.view_width, 160);
        for y in (0..200).step_by(2) {
            for x in (0..320).step_by(2) {
                let p = buffer.read_pixel(x, y);
                assert_eq!(p, buffer.read_pixel(x + 1, y));
                assert_eq!(p, buffer.read_pixel(x, y + 1));
                assert_eq!(p, buffer.read_pixel(x + 1, y + 1));
            }
        }
    }

    #[test]
    fn follows_the_buffer_size() {
        let map = CorridorBuilder::new(128, Room::new(256, 0, 128))
            .build()
            .unwrap();
        let level = Level::new(map);
        let player = Player::new(&level.map_data, 64 * FRACUNIT, 64 * FRACUNIT, Angle::default());
        let mut pics = PicData::generated(LightZ::Smooth);
        let mut renderer = SoftwareRenderer::new(320, 200, RenderOptions::default());
        let mut buffer = FrameBuffer::new(640, 400);
        renderer.render_player_view(&player, &level, &mut pics, &mut buffer);
        assert_eq!(renderer.tables.view_width, 640);
        assert_eq!(renderer.r_data.portal_clip.floorclip.len(), 640);
        assert!(renderer.stats().rendered_segs > 0);

        renderer.set_options(RenderOptions {
            low_detail: true,
            ..RenderOptions::default()
        });
        assert_eq!(renderer.tables.view_width, 320);
    }

    /// Draw one frame in a big dim room open to the sky, using a sky whose
    /// texels are their own column number
    fn render_sky(
        angle: Angle,
        fixedcolormap: Option<usize>,
        invul_sky: bool,
    ) -> (SoftwareRenderer, FrameBuffer, PicData) {
        let map = CorridorBuilder::new(1024, Room::new(1024, 0, 128).pics(0, F_SKY1).light(64))
            .build()
            .unwrap();
        let level = Level::new(map);
        let mut player = Player::new(&level.map_data, 512 * FRACUNIT, 512 * FRACUNIT, angle);
        player.fixedcolormap = fixedcolormap;

        let mut pics = PicData::generated(LightZ::Smooth);
        let stripes = pics.add_wall(WallPic::new(
            "STRIPES",
            (0..256).map(|x| vec![x as u8; 128]).collect(),
        ));
        pics.set_sky(pics.sky_num(), stripes);

        let options = RenderOptions {
            invul_sky,
            ..RenderOptions::default()
        };
        let mut renderer = SoftwareRenderer::new(320, 200, options);
        let mut buffer = FrameBuffer::new(320, 200);
        renderer.render_player_view(&player, &level, &mut pics, &mut buffer);
        (renderer, buffer, pics)
    }

    /// Every pixel above the walls must be the sky column picked by the view
    /// angle, lit through `colourmap`
    fn assert_sky(
        renderer: &SoftwareRenderer,
        buffer: &FrameBuffer,
        angle: Angle,
        colourmap: &Colourmap,
    ) {
        // no wall is nearer than 362 along the view, so wall tops stay below
        // row 60
        for x in 0..320 {
            let column = (angle + renderer.tables.xtoviewangle[x]).bam() >> ANGLETOSKYSHIFT;
            let texel = (column % 256) as usize;
            for y in 0..48 {
                assert_eq!(buffer.read_pixel(x, y), colourmap[texel], "x {x} y {y}");
            }
        }
    }

    #[test]
    fn sky_columns_follow_the_view_angle() {
        for angle in [0, ANG45 + 12345, ANG90, ANG180 + ANG45] {
            let angle = Angle::new(angle);
            let (renderer, buffer, pics) = render_sky(angle, None, false);
            // sector light does not reach the sky
            assert_sky(&renderer, &buffer, angle, pics.colourmap(0));
            assert!(renderer.stats().rendered_visplanes >= 2);
        }
    }

    #[test]
    fn invulnerability_tints_the_sky_only_when_asked() {
        let angle = Angle::new(ANG90);
        let pics = PicData::generated(LightZ::Smooth);
        assert_ne!(pics.colourmap(0), pics.colourmap(32));

        let (renderer, buffer, pics) = render_sky(angle, Some(32), false);
        assert_sky(&renderer, &buffer, angle, pics.colourmap(0));

        let (renderer, buffer, pics) = render_sky(angle, Some(32), true);
        assert_sky(&renderer, &buffer, angle, pics.colourmap(32));
    }

}
