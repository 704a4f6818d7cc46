//! All data and functions related to pictures in Doom.
//! These are:
//! - Wall textures
//! - Flat/span textures
//! - Palettes
//! - Coloumaps and light scaling
//! - Brightmaps, translations and translucency tables
//!
//! Pixel data arrives already decoded. Nothing here reads a WAD.

mod generated;

use log::{debug, warn};
use math::{FRACUNIT, fixed_div};

pub const LIGHTLEVELS: usize = 16;
/// Sector light level to light table row
pub const LIGHTSEGSHIFT: i32 = 4;
pub const MAXLIGHTSCALE: usize = 48;
pub const LIGHTSCALESHIFT: u32 = 12;
pub const NUMCOLORMAPS: usize = 32;
pub const INVERSECOLORMAP: usize = 32;
/// Number of colourmaps a full COLORMAP lump has, including the inverse and
/// the all black map
pub const COLOURMAP_LEN: usize = 34;
const DISTMAP: i32 = 2;

pub const FLAT_SIZE: usize = 64;
/// Size in bytes of a blend table, indexed by `(dest << 8) + src`
pub const TINTMAP_LEN: usize = 256 * 256;

pub type Colourmap = [u8; 256];
/// Per source colour, non-zero keeps that colour at full brightness
pub type Brightmap = [u8; 256];

/// How distance fades floors and ceilings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LightZ {
    /// 128 steps, as vanilla Doom did
    Vanilla,
    /// 1024 steps for a gradient without visible bands
    #[default]
    Smooth,
}

impl LightZ {
    pub const fn max_light_z(self) -> usize {
        match self {
            LightZ::Vanilla => 128,
            LightZ::Smooth => 1024,
        }
    }

    /// Distance to zlight column
    pub const fn light_z_shift(self) -> u32 {
        match self {
            LightZ::Vanilla => 20,
            LightZ::Smooth => 17,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlatPic {
    pub name: String,
    /// 64 * 64, row major
    pub data: Vec<u8>,
    pub brightmap: Option<usize>,
    /// Liquid flats that ripple
    pub swirl: bool,
}

impl FlatPic {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        let mut data = data;
        if data.len() != FLAT_SIZE * FLAT_SIZE {
            warn!("Flat {name} was not 64x64 in size");
            data.resize(FLAT_SIZE * FLAT_SIZE, 0);
        }
        Self {
            name: name.to_string(),
            data,
            brightmap: None,
            swirl: false,
        }
    }
}

/// A composed wall texture, stored column major so a wall column is a slice.
#[derive(Debug, Clone)]
pub struct WallPic {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub data: Vec<Vec<u8>>,
    pub brightmap: Option<usize>,
}

impl WallPic {
    pub fn new(name: &str, data: Vec<Vec<u8>>) -> Self {
        let width = data.len();
        let height = data.first().map(|c| c.len()).unwrap_or(0);
        Self {
            name: name.to_string(),
            width,
            height,
            data,
            brightmap: None,
        }
    }

    /// Texture columns wrap on the width, as a power of two mask would
    #[inline]
    pub fn column(&self, texture_column: i32) -> &[u8] {
        let x = texture_column.rem_euclid(self.width as i32) as usize;
        &self.data[x]
    }
}

#[derive(Debug)]
pub struct PicData {
    /// Colours for pixels, used only when the framebuffer is written out
    palette: Vec<[u8; 3]>,
    /// 34 maps of 256, each u8 being an index in to the palette
    colourmaps: Vec<Colourmap>,
    /// 16 groups of 48 indexes to colourmaps. Depends on the view size.
    light_scale: [[usize; MAXLIGHTSCALE]; LIGHTLEVELS],
    /// 16 groups of `max_light_z` indexes to colourmaps
    zlight_scale: Vec<Vec<usize>>,
    light_z: LightZ,
    /// Colourmap forced on for every light level, such as invulnerability
    fixed_colourmap: Option<usize>,
    brightmaps: Vec<Brightmap>,
    /// Player colour remaps: gray, brown, red
    translations: [[u8; 256]; 3],
    tint_maps: Vec<Vec<u8>>,
    walls: Vec<WallPic>,
    flats: Vec<FlatPic>,
    /// The number flats use to signify a sky should be drawn
    sky_num: usize,
    /// The index number of the texture to use for skybox
    sky_pic: usize,
}

impl PicData {
    pub fn new(palette: Vec<[u8; 3]>, mut colourmaps: Vec<Colourmap>, light_z: LightZ) -> Self {
        if colourmaps.len() < COLOURMAP_LEN {
            warn!(
                "Only {} colourmaps, padding to {COLOURMAP_LEN}",
                colourmaps.len()
            );
            let last = colourmaps.last().copied().unwrap_or([0; 256]);
            colourmaps.resize(COLOURMAP_LEN, last);
        }
        Self {
            palette,
            colourmaps,
            light_scale: Self::init_light_scales(1, 1),
            zlight_scale: Self::init_zlight_scales(light_z),
            light_z,
            fixed_colourmap: None,
            brightmaps: Vec::new(),
            translations: Self::init_translations(),
            tint_maps: Vec::new(),
            walls: Vec::new(),
            flats: Vec::new(),
            sky_num: usize::MAX,
            sky_pic: 0,
        }
    }

    /// A self contained set of palette, colourmaps and pictures with no
    /// external data required
    pub fn generated(light_z: LightZ) -> Self {
        generated::build(light_z)
    }

    fn init_translations() -> [[u8; 256]; 3] {
        let mut tables = [[0u8; 256]; 3];
        for i in 0..256usize {
            for (t, table) in tables.iter_mut().enumerate() {
                table[i] = if (0x70..=0x7f).contains(&i) {
                    // map green ramp to gray, brown, red
                    [0x60, 0x40, 0x20][t] + (i & 0xf) as u8
                } else {
                    i as u8
                };
            }
        }
        tables
    }

    /// Light level and wall scale to colourmap. Changes with the view size:
    /// `view_width` is the rendered width in screen pixels (already shifted
    /// up for low detail).
    fn init_light_scales(screen_width: usize, view_width: usize) -> [[usize; MAXLIGHTSCALE]; LIGHTLEVELS] {
        let mut tmp = [[0; MAXLIGHTSCALE]; LIGHTLEVELS];
        let (screen_width, view_width) = (screen_width as i32, view_width.max(1) as i32);
        for (i, row) in tmp.iter_mut().enumerate() {
            let startmap = ((LIGHTLEVELS - 1 - i) * 2 * NUMCOLORMAPS / LIGHTLEVELS) as i32;
            for (j, level) in row.iter_mut().enumerate() {
                let l = startmap - j as i32 * screen_width / view_width / DISTMAP;
                *level = l.clamp(0, NUMCOLORMAPS as i32 - 1) as usize;
            }
        }
        tmp
    }

    fn init_zlight_scales(light_z: LightZ) -> Vec<Vec<usize>> {
        (0..LIGHTLEVELS)
            .map(|i| {
                let startmap = ((LIGHTLEVELS - 1 - i) * 2 * NUMCOLORMAPS / LIGHTLEVELS) as i32;
                (0..light_z.max_light_z())
                    .map(|j| {
                        let scale = fixed_div(160 * FRACUNIT, ((j + 1) << light_z.light_z_shift()) as i32)
                            >> LIGHTSCALESHIFT;
                        (startmap - scale / DISTMAP).clamp(0, NUMCOLORMAPS as i32 - 1) as usize
                    })
                    .collect()
            })
            .collect()
    }

    /// Recalculate the wall light table for a new view size
    pub fn set_view_light_scale(&mut self, screen_width: usize, view_width: usize) {
        debug!("Light scale for view width {view_width} of {screen_width}");
        self.light_scale = Self::init_light_scales(screen_width, view_width);
    }

    pub fn light_z(&self) -> LightZ {
        self.light_z
    }

    /// A `Some` value is the colourmap forced for all light levels
    pub fn set_fixed_colourmap(&mut self, colourmap: Option<usize>) {
        self.fixed_colourmap = colourmap.map(|c| c.min(self.colourmaps.len() - 1));
    }

    pub fn fixed_colourmap(&self) -> Option<&Colourmap> {
        self.fixed_colourmap.map(|c| &self.colourmaps[c])
    }

    pub fn palette(&self) -> &[[u8; 3]] {
        &self.palette
    }

    pub fn colourmap(&self, index: usize) -> &Colourmap {
        &self.colourmaps[index]
    }

    #[inline]
    fn clamp_light(light_level: i32) -> usize {
        light_level.clamp(0, LIGHTLEVELS as i32 - 1) as usize
    }

    /// Colourmap for a wall column. `light_level` is already shifted down to
    /// `0..LIGHTLEVELS` and may be out of range after contrast adjustment.
    pub fn wall_light_colourmap(&self, light_level: i32, scale_index: usize) -> &Colourmap {
        if let Some(fixed) = self.fixed_colourmap {
            return &self.colourmaps[fixed];
        }
        let row = &self.light_scale[Self::clamp_light(light_level)];
        &self.colourmaps[row[scale_index.min(MAXLIGHTSCALE - 1)]]
    }

    /// Colourmap for a floor or ceiling span at `distance_index`
    pub fn flat_light_colourmap(&self, light_level: i32, distance_index: usize) -> &Colourmap {
        if let Some(fixed) = self.fixed_colourmap {
            return &self.colourmaps[fixed];
        }
        let row = &self.zlight_scale[Self::clamp_light(light_level)];
        &self.colourmaps[row[distance_index.min(row.len() - 1)]]
    }

    pub fn add_wall(&mut self, pic: WallPic) -> usize {
        self.walls.push(pic);
        self.walls.len() - 1
    }

    pub fn add_flat(&mut self, pic: FlatPic) -> usize {
        self.flats.push(pic);
        self.flats.len() - 1
    }

    pub fn add_brightmap(&mut self, map: Brightmap) -> usize {
        self.brightmaps.push(map);
        self.brightmaps.len() - 1
    }

    /// Add a `(dest << 8) + src` blend table
    pub fn add_tint_map(&mut self, mut table: Vec<u8>) -> usize {
        if table.len() != TINTMAP_LEN {
            warn!("Tint map is {} bytes, expected {TINTMAP_LEN}", table.len());
            table.resize(TINTMAP_LEN, 0);
        }
        self.tint_maps.push(table);
        self.tint_maps.len() - 1
    }

    pub fn set_sky(&mut self, sky_num: usize, sky_pic: usize) {
        self.sky_num = sky_num;
        self.sky_pic = sky_pic;
    }

    pub fn wall_pic(&self, num: usize) -> &WallPic {
        &self.walls[num]
    }

    pub fn wallpic_num_for_name(&self, name: &str) -> Option<usize> {
        self.walls.iter().position(|p| p.name == name)
    }

    pub fn flat_pic(&self, num: usize) -> &FlatPic {
        &self.flats[num]
    }

    pub fn flat_num_for_name(&self, name: &str) -> Option<usize> {
        self.flats.iter().position(|p| p.name == name)
    }

    pub fn num_walls(&self) -> usize {
        self.walls.len()
    }

    pub fn num_flats(&self) -> usize {
        self.flats.len()
    }

    pub fn brightmap(&self, num: usize) -> &Brightmap {
        &self.brightmaps[num]
    }

    pub fn translation(&self, num: usize) -> &[u8; 256] {
        &self.translations[num.min(2)]
    }

    pub fn tint_map(&self, num: usize) -> &[u8] {
        &self.tint_maps[num]
    }

    /// Get the number of the flat used for the sky texture. Sectors using this
    /// number for the flat will be rendered with the skybox.
    pub fn sky_num(&self) -> usize {
        self.sky_num
    }

    /// Get the index used by `wall_pic()` to return a texture.
    pub fn sky_pic(&self) -> usize {
        self.sky_pic
    }
}

#[cfg(test)]
mod tests {
    use super::{LIGHTLEVELS, LightZ, MAXLIGHTSCALE, NUMCOLORMAPS, PicData};

    #[test]
    fn zlight_darkens_with_distance() {
        for light_z in [LightZ::Vanilla, LightZ::Smooth] {
            let table = PicData::init_zlight_scales(light_z);
            assert_eq!(table.len(), LIGHTLEVELS);
            for row in &table {
                assert_eq!(row.len(), light_z.max_light_z());
                assert!(row.windows(2).all(|w| w[0] <= w[1]));
            }
            // full bright sector up close uses the brightest map
            assert_eq!(table[LIGHTLEVELS - 1][0], 0);
            // anything far enough away is fully dark
            assert_eq!(table[0][light_z.max_light_z() - 1], NUMCOLORMAPS - 1);
        }
    }

    #[test]
    fn light_scale_follows_view_width() {
        let full = PicData::init_light_scales(320, 320);
        let half = PicData::init_light_scales(320, 160);
        // level 15 starts at map 0 and drops one map every 2 scale steps
        assert_eq!(full[15][0], 0);
        assert_eq!(full[15][MAXLIGHTSCALE - 1], 0);
        assert_eq!(full[8][0], 28);
        assert_eq!(full[8][4], 26);
        // a smaller view darkens faster
        assert_eq!(half[8][4], 24);
    }

    #[test]
    fn translations_remap_green_ramp() {
        let pics = PicData::generated(LightZ::Vanilla);
        assert_eq!(pics.translation(0)[0x70], 0x60);
        assert_eq!(pics.translation(1)[0x7f], 0x4f);
        assert_eq!(pics.translation(2)[0x75], 0x25);
        assert_eq!(pics.translation(2)[0x80], 0x80);
        assert_eq!(pics.translation(0)[3], 3);
    }

    #[test]
    fn fixed_colourmap_overrides_light() {
        let mut pics = PicData::generated(LightZ::Vanilla);
        let lit = *pics.wall_light_colourmap(15, 40);
        pics.set_fixed_colourmap(Some(32));
        assert_eq!(pics.wall_light_colourmap(0, 0), pics.colourmap(32));
        assert_eq!(pics.flat_light_colourmap(3, 900), pics.colourmap(32));
        pics.set_fixed_colourmap(None);
        assert_eq!(*pics.wall_light_colourmap(15, 40), lit);
    }
}
