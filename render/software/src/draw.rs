//! The inner loops. Every wall, sky and masked column goes through
//! [`DrawColumn`], every floor and ceiling row through [`DrawSpan`].
//!
//! Coordinates are in view pixels. In low detail each view pixel is written
//! as a 2x2 block of the screen buffer.

use gameplay::{Brightmap, Colourmap};
use math::{FRACBITS, Fixed};
use render_trait::PixelBuffer;

/// How a column's texels end up on screen
#[derive(Clone, Copy)]
pub enum ColumnStyle<'a> {
    Opaque,
    /// Palette remap applied to the texel before lighting, for player colours.
    /// Selected by sprite callers, walls never use it.
    Translated(&'a [u8; 256]),
    /// Blend with what is already on screen through a `(dest << 8) + src`
    /// table
    Translucent(&'a [u8]),
}

/// One vertical run of texels. Doom function name `R_DrawColumn`.
pub struct DrawColumn<'a> {
    /// A single texture column, top to bottom
    pub source: &'a [u8],
    pub colourmap: &'a Colourmap,
    /// Texels the brightmap marks are lit with the second colourmap instead
    pub brightmap: Option<(&'a Brightmap, &'a Colourmap)>,
    pub style: ColumnStyle<'a>,
    pub x: i32,
    pub yl: i32,
    pub yh: i32,
    pub iscale: Fixed,
    pub texturemid: Fixed,
    pub centery: i32,
    pub detail_shift: u32,
}

impl DrawColumn<'_> {
    #[inline]
    fn shade(&self, texel: u8, dest: u8) -> u8 {
        let mapped = match self.style {
            ColumnStyle::Translated(table) => table[texel as usize],
            _ => texel,
        };
        let colourmap = match self.brightmap {
            Some((bright, full)) if bright[texel as usize] != 0 => full,
            _ => self.colourmap,
        };
        let lit = colourmap[mapped as usize];
        match self.style {
            ColumnStyle::Translucent(tint) => tint[((dest as usize) << 8) + lit as usize],
            _ => lit,
        }
    }

    pub fn draw(&self, pixels: &mut impl PixelBuffer) {
        let count = self.yh - self.yl;
        // Zero length, column does not exceed a pixel.
        if count < 0 || self.source.is_empty() {
            return;
        }
        let height = self.source.len() as i32;
        let pitch = pixels.pitch();
        let row = pitch << self.detail_shift;
        let mut pos = pixels.get_buf_index(
            (self.x as usize) << self.detail_shift,
            (self.yl as usize) << self.detail_shift,
        );
        let buf = pixels.buf_mut();

        if height & (height - 1) == 0 {
            let mask = height - 1;
            let mut frac = self
                .texturemid
                .wrapping_add((self.yl - self.centery).wrapping_mul(self.iscale));
            for _ in 0..=count {
                let texel = self.source[((frac >> FRACBITS) & mask) as usize];
                let colour = self.shade(texel, buf[pos]);
                plot(buf, pos, pitch, self.detail_shift, colour);
                pos += row;
                frac = frac.wrapping_add(self.iscale);
            }
        } else {
            // Textures with heights like 72 or 128+8 repeat on their real
            // height instead of the next power of two.
            let heightmask = (height as i64) << FRACBITS;
            let step = self.iscale as i64;
            let mut frac = (self.texturemid as i64 + (self.yl - self.centery) as i64 * step)
                .rem_euclid(heightmask);
            for _ in 0..=count {
                let texel = self.source[(frac >> FRACBITS) as usize];
                let colour = self.shade(texel, buf[pos]);
                plot(buf, pos, pitch, self.detail_shift, colour);
                pos += row;
                frac += step;
                if frac >= heightmask {
                    frac %= heightmask;
                }
            }
        }
    }
}

#[inline(always)]
fn plot(buf: &mut [u8], pos: usize, pitch: usize, detail_shift: u32, colour: u8) {
    buf[pos] = colour;
    if detail_shift != 0 {
        buf[pos + 1] = colour;
        buf[pos + pitch] = colour;
        buf[pos + pitch + 1] = colour;
    }
}

/// Rows offsets for the shimmer of partially invisible things
pub const FUZZTABLE: [i32; 50] = [
    1, -1, 1, -1, 1, 1, -1, 1, 1, -1, 1, 1, 1, -1, 1, 1, 1, -1, -1, -1, -1, 1, -1, -1, 1, 1, 1, 1,
    -1, 1, -1, 1, 1, -1, -1, 1, 1, -1, -1, -1, -1, 1, 1, 1, 1, -1, 1, 1, -1, 1,
];

/// Position in [`FUZZTABLE`]. Carries on across columns and frames so the
/// pattern crawls. Sprite callers draw shadow things through this, walls
/// never do.
#[derive(Debug, Default)]
pub struct FuzzState {
    pos: usize,
}

impl FuzzState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Darken what is already on screen using a neighbouring row. Doom
    /// function name `R_DrawFuzzColumn`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_column(
        &mut self,
        x: i32,
        yl: i32,
        yh: i32,
        view_height: i32,
        colourmap: &Colourmap,
        detail_shift: u32,
        pixels: &mut impl PixelBuffer,
    ) {
        // Adjust borders. Low...
        let yl = yl.max(1);
        // .. and high.
        let cutoff = yh >= view_height - 1;
        let yh = if cutoff { view_height - 2 } else { yh };
        if yh < yl {
            return;
        }

        let pitch = pixels.pitch();
        let row = (pitch << detail_shift) as isize;
        let mut pos = pixels.get_buf_index(
            (x as usize) << detail_shift,
            (yl as usize) << detail_shift,
        ) as isize;
        let buf = pixels.buf_mut();

        for _ in yl..=yh {
            let src = (pos + FUZZTABLE[self.pos] as isize * row) as usize;
            let colour = colourmap[buf[src] as usize];
            plot(buf, pos as usize, pitch, detail_shift, colour);
            self.pos = (self.pos + 1) % FUZZTABLE.len();
            pos += row;
        }

        if cutoff {
            // the last row only looks up, never past the bottom edge
            let src = (pos + ((FUZZTABLE[self.pos] - 1) / 2) as isize * row) as usize;
            let colour = colourmap[buf[src] as usize];
            plot(buf, pos as usize, pitch, detail_shift, colour);
        }
    }
}

/// One horizontal run across a flat. Doom function name `R_DrawSpan`.
pub struct DrawSpan<'a> {
    /// 64x64, row major
    pub source: &'a [u8],
    pub colourmap: &'a Colourmap,
    pub brightmap: Option<(&'a Brightmap, &'a Colourmap)>,
    pub y: i32,
    pub x1: i32,
    pub x2: i32,
    pub xfrac: Fixed,
    pub yfrac: Fixed,
    pub xstep: Fixed,
    pub ystep: Fixed,
    pub detail_shift: u32,
}

impl DrawSpan<'_> {
    pub fn draw(&self, pixels: &mut impl PixelBuffer) {
        if self.x2 < self.x1 {
            return;
        }
        let pitch = pixels.pitch();
        let step = 1 << self.detail_shift;
        let mut pos = pixels.get_buf_index(
            (self.x1 as usize) << self.detail_shift,
            (self.y as usize) << self.detail_shift,
        );
        let buf = pixels.buf_mut();
        let mut xfrac = self.xfrac;
        let mut yfrac = self.yfrac;

        for _ in self.x1..=self.x2 {
            // Current texture index in u,v.
            let spot = (((yfrac >> (16 - 6)) & (63 * 64)) | ((xfrac >> 16) & 63)) as usize;
            let texel = self.source[spot];
            let colourmap = match self.brightmap {
                Some((bright, full)) if bright[texel as usize] != 0 => full,
                _ => self.colourmap,
            };
            plot(buf, pos, pitch, self.detail_shift, colourmap[texel as usize]);
            pos += step;
            xfrac = xfrac.wrapping_add(self.xstep);
            yfrac = yfrac.wrapping_add(self.ystep);
        }
    }
}

#[cfg(test)]
mod tests {
    use gameplay::{Brightmap, Colourmap};
    use math::{FRACBITS, FRACUNIT};
    use render_trait::{FrameBuffer, PixelBuffer};

    use super::{ColumnStyle, DrawColumn, DrawSpan, FUZZTABLE, FuzzState};

    fn identity() -> Colourmap {
        std::array::from_fn(|i| i as u8)
    }

    fn column<'a>(source: &'a [u8], colourmap: &'a Colourmap) -> DrawColumn<'a> {
        DrawColumn {
            source,
            colourmap,
            brightmap: None,
            style: ColumnStyle::Opaque,
            x: 3,
            yl: 0,
            yh: 99,
            iscale: FRACUNIT,
            texturemid: 0,
            centery: 50,
            detail_shift: 0,
        }
    }

    #[test]
    fn power_of_two_column_wraps_on_mask() {
        let cmap = identity();
        let source: Vec<u8> = (0..64).collect();
        let mut buf = FrameBuffer::new(8, 100);
        column(&source, &cmap).draw(&mut buf);
        for y in 0..100 {
            let expected = (y as i32 - 50).rem_euclid(64) as u8;
            assert_eq!(buf.read_pixel(3, y), expected, "row {y}");
        }
    }

    #[test]
    fn odd_height_column_wraps_on_real_height() {
        let cmap = identity();
        let source: Vec<u8> = (0..72).collect();
        let mut buf = FrameBuffer::new(8, 100);
        // big steps and a negative start both have to land in 0..72
        for (iscale, texturemid) in [
            (FRACUNIT, 0),
            (FRACUNIT * 3 + 12345, -40 * FRACUNIT),
            (FRACUNIT * 200 + 7, 1000 * FRACUNIT),
            (FRACUNIT / 3, 71 * FRACUNIT),
        ] {
            let mut col = column(&source, &cmap);
            col.iscale = iscale;
            col.texturemid = texturemid;
            col.draw(&mut buf);
            for y in 0..100i64 {
                let frac = texturemid as i64 + (y - 50) * iscale as i64;
                let expected = (frac.rem_euclid(72 << FRACBITS) >> FRACBITS) as u8;
                assert_eq!(buf.read_pixel(3, y as usize), expected, "row {y}");
            }
        }
    }

    #[test]
    fn brightmap_overrides_light() {
        let dark: Colourmap = [0; 256];
        let full = identity();
        let mut bright: Brightmap = [0; 256];
        bright[5] = 1;
        let source = [5u8, 6, 5, 6];
        let mut buf = FrameBuffer::new(8, 8);
        let mut col = column(&source, &dark);
        col.brightmap = Some((&bright, &full));
        col.yh = 3;
        col.centery = 0;
        col.draw(&mut buf);
        assert_eq!(buf.read_pixel(3, 0), 5);
        assert_eq!(buf.read_pixel(3, 1), 0);
        assert_eq!(buf.read_pixel(3, 2), 5);
        assert_eq!(buf.read_pixel(3, 3), 0);
    }

    #[test]
    fn translated_and_translucent_styles() {
        let cmap = identity();
        let mut table = [0u8; 256];
        table[10] = 20;
        let source = [10u8; 4];
        let mut buf = FrameBuffer::new(8, 8);
        let mut col = column(&source, &cmap);
        col.style = ColumnStyle::Translated(&table);
        col.yh = 3;
        col.draw(&mut buf);
        assert_eq!(buf.read_pixel(3, 0), 20);

        // blend table that returns the dest colour plus one
        let tint: Vec<u8> = (0..256 * 256).map(|i| ((i >> 8) as u8).wrapping_add(1)).collect();
        let mut col = column(&source, &cmap);
        col.style = ColumnStyle::Translucent(&tint);
        col.yh = 3;
        col.draw(&mut buf);
        assert_eq!(buf.read_pixel(3, 0), 21);
        assert_eq!(buf.read_pixel(3, 4), 0);
    }

    #[test]
    fn low_detail_fills_blocks() {
        let cmap = identity();
        let source = [9u8; 8];
        let mut buf = FrameBuffer::new(8, 8);
        let mut col = column(&source, &cmap);
        col.x = 1;
        col.yl = 1;
        col.yh = 2;
        col.centery = 2;
        col.detail_shift = 1;
        col.draw(&mut buf);
        for y in 2..6 {
            assert_eq!(buf.read_pixel(2, y), 9);
            assert_eq!(buf.read_pixel(3, y), 9);
        }
        assert_eq!(buf.read_pixel(2, 1), 0);
        assert_eq!(buf.read_pixel(2, 6), 0);
        assert_eq!(buf.read_pixel(4, 3), 0);
    }

    #[test]
    fn fuzz_stays_inside_the_view() {
        let dark: Colourmap = std::array::from_fn(|i| (i as u8).wrapping_add(100));
        let mut buf = FrameBuffer::new(4, 10);
        for y in 0..10 {
            for x in 0..4 {
                buf.set_pixel(x, y, y as u8);
            }
        }
        let mut fuzz = FuzzState::new();
        fuzz.draw_column(1, 0, 9, 10, &dark, 0, &mut buf);
        // top and bottom rows are left for the neighbours
        assert_eq!(buf.read_pixel(1, 0), 0);
        assert_eq!(fuzz.position(), 8);
        // first drawn row is row 1, reading row 1 + FUZZTABLE[0]
        assert_eq!(buf.read_pixel(1, 1), (1 + FUZZTABLE[0]) as u8 + 100);
        // everything is darkened somewhere between 100 and 109
        for y in 1..10 {
            let p = buf.read_pixel(1, y);
            assert!((100..=210).contains(&p), "row {y} is {p}");
        }
        // the crawl carries on from where it stopped
        fuzz.draw_column(2, 2, 4, 10, &dark, 0, &mut buf);
        assert_eq!(fuzz.position(), 11);
    }

    #[test]
    fn span_walks_the_flat() {
        let cmap = identity();
        let flat: Vec<u8> = (0..64 * 64).map(|i| (i % 251) as u8).collect();
        let mut buf = FrameBuffer::new(80, 4);
        DrawSpan {
            source: &flat,
            colourmap: &cmap,
            brightmap: None,
            y: 2,
            x1: 0,
            x2: 79,
            xfrac: 60 * FRACUNIT,
            yfrac: 3 * FRACUNIT,
            xstep: FRACUNIT,
            ystep: 0,
            detail_shift: 0,
        }
        .draw(&mut buf);
        for x in 0..80 {
            let u = (60 + x) % 64;
            assert_eq!(buf.read_pixel(x, 2), ((3 * 64 + u) % 251) as u8);
        }
        assert_eq!(buf.read_pixel(0, 1), 0);
    }
}
