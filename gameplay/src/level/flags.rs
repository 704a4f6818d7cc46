/// Linedef flags as stored in the map. Only the ones the renderer or the
/// sight check look at are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefFlags {
    /// The linedef's two sidedefs can have "-" as a texture, which in this case
    /// means "transparent". Without it the line is treated as solid by the
    /// sight check even if a sector lies on the other side
    TwoSided = 1 << 2,
    /// The upper texture is pasted onto the wall from the top down instead of
    /// from the bottom up like usual
    UnpegTop = 1 << 3,
    /// Lower and middle textures are drawn from the bottom up, instead of from
    /// the top down like usual
    UnpegBottom = 1 << 4,
    /// A masked middle texture is blended with what is behind it
    Translucent = 1 << 12,
}

impl LineDefFlags {
    #[inline]
    pub const fn is_set(self, flags: u32) -> bool {
        flags & self as u32 != 0
    }
}

/// Per-frame classification of a two-sided line, recalculated by the BSP walk
/// before the line is clipped.
pub mod render_flags {
    /// Nothing visible changes across the line
    pub const IGNORE: u32 = 1;
    /// The line closes off the view as if it were one-sided
    pub const CLOSED: u32 = 1 << 1;
}

#[test]
fn check_flags_enum() {
    let flag = 28; // upper and lower unpegged, twosided
    let compare = LineDefFlags::TwoSided as u32
        | LineDefFlags::UnpegTop as u32
        | LineDefFlags::UnpegBottom as u32;
    assert_eq!(compare, flag);
    assert!(LineDefFlags::TwoSided.is_set(29));
    assert!(!LineDefFlags::UnpegTop.is_set(4));
}
