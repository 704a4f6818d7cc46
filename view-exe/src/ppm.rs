//! Palette indexed frame to a binary PPM image

use std::io::{self, Write};

use render_trait::PixelBuffer;

pub fn write_ppm(
    out: &mut impl Write,
    buffer: &impl PixelBuffer,
    palette: &[[u8; 3]],
) -> io::Result<()> {
    let size = buffer.size();
    write!(out, "P6\n{} {}\n255\n", size.width(), size.height())?;
    let pitch = buffer.pitch();
    let mut rgb = Vec::with_capacity(size.width_usize() * size.height_usize() * 3);
    for row in buffer.buf().chunks(pitch).take(size.height_usize()) {
        for &index in &row[..size.width_usize()] {
            rgb.extend_from_slice(&palette[index as usize]);
        }
    }
    out.write_all(&rgb)
}
