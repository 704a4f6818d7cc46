use gameplay::{Level, PicData, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize {
    hi_res: bool,
    width_usize: usize,
    height_usize: usize,
    width: i32,
    height: i32,
}

impl BufferSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            hi_res: width > 320,
            width_usize: width,
            height_usize: height,
            width: width as i32,
            height: height as i32,
        }
    }

    /// Anything wider than the 320 pixel vanilla screen. Shifts the wall light
    /// scale by one.
    pub const fn hi_res(&self) -> bool {
        self.hi_res
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn width_usize(&self) -> usize {
        self.width_usize
    }

    pub const fn height_usize(&self) -> usize {
        self.height_usize
    }
}

/// A framebuffer of palette indexes, one byte per pixel
pub trait PixelBuffer {
    fn size(&self) -> &BufferSize;
    fn clear(&mut self);
    fn clear_with_colour(&mut self, colour: u8);
    fn set_pixel(&mut self, x: usize, y: usize, colour: u8);
    fn read_pixel(&self, x: usize, y: usize) -> u8;
    fn buf(&self) -> &[u8];
    fn buf_mut(&mut self) -> &mut [u8];
    /// The pitch that should be added/subtracted to go up or down the Y while
    /// keeping X position
    fn pitch(&self) -> usize;
    /// Get an index point for this coord
    fn get_buf_index(&self, x: usize, y: usize) -> usize;
}

/// Linear, row major, `width * height` bytes
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    size: BufferSize,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: BufferSize::new(width, height),
            data: vec![0; width * height],
        }
    }
}

impl PixelBuffer for FrameBuffer {
    #[inline]
    fn size(&self) -> &BufferSize {
        &self.size
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }

    fn clear_with_colour(&mut self, colour: u8) {
        self.data.fill(colour);
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, colour: u8) {
        let i = self.get_buf_index(x, y);
        self.data[i] = colour;
    }

    #[inline]
    fn read_pixel(&self, x: usize, y: usize) -> u8 {
        self.data[self.get_buf_index(x, y)]
    }

    #[inline]
    fn buf(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn pitch(&self) -> usize {
        self.size.width_usize
    }

    #[inline]
    fn get_buf_index(&self, x: usize, y: usize) -> usize {
        y * self.size.width_usize + x
    }
}

pub trait PlayViewRenderer {
    /// Doom function name `R_RenderPlayerView`
    fn render_player_view(
        &mut self,
        player: &Player,
        level: &Level,
        pic_data: &mut PicData,
        buffer: &mut impl PixelBuffer,
    );
}
