//! Fine-angle lookup tables. Built once on first use, with the same formulae
//! the Doom `tables.c` data was generated from.

use std::f64::consts::PI;

use lazy_static::lazy_static;

use crate::{FRACUNIT, Fixed};

/// Number of fine angles in a full circle
pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// `angle >> ANGLETOFINESHIFT` gives the fine angle index of a BAM
pub const ANGLETOFINESHIFT: u32 = 19;

pub const SLOPERANGE: u32 = 2048;

lazy_static! {
    /// Sine table, with an extra quarter turn on the end so that cosine can be
    /// read from the same data at an offset of `FINEANGLES / 4`
    static ref FINESINE: Vec<Fixed> = (0..5 * FINEANGLES / 4)
        .map(|i| {
            let a = (i as f64 + 0.5) * 2.0 * PI / FINEANGLES as f64;
            (a.sin() * FRACUNIT as f64) as Fixed
        })
        .collect();

    /// Tangent for the half circle `-90..90` degrees
    static ref FINETANGENT: Vec<Fixed> = (0..FINEANGLES / 2)
        .map(|i| {
            let a = (i as f64 - (FINEANGLES / 4) as f64 + 0.5) * PI * 2.0 / FINEANGLES as f64;
            let t = a.tan() * FRACUNIT as f64;
            t.clamp(i32::MIN as f64, i32::MAX as f64) as Fixed
        })
        .collect();

    /// `atan(i / SLOPERANGE)` as a BAM
    static ref TANTOANGLE: Vec<u32> = (0..=SLOPERANGE)
        .map(|i| {
            let a = (i as f64 / SLOPERANGE as f64).atan();
            (a / (2.0 * PI) * 4_294_967_296.0) as u32
        })
        .collect();
}

/// Force table creation ahead of the first frame
pub fn init_tables() {
    lazy_static::initialize(&FINESINE);
    lazy_static::initialize(&FINETANGENT);
    lazy_static::initialize(&TANTOANGLE);
}

#[inline]
pub fn finesine(fine: usize) -> Fixed {
    FINESINE[fine & FINEMASK]
}

#[inline]
pub fn finecosine(fine: usize) -> Fixed {
    FINESINE[(fine & FINEMASK) + FINEANGLES / 4]
}

/// Only valid for indexes `0..FINEANGLES / 2`, which is what a BAM shifted
/// down after adding `ANG90` to a view-relative angle produces.
#[inline]
pub fn finetangent(fine: usize) -> Fixed {
    FINETANGENT[fine & (FINEANGLES / 2 - 1)]
}

#[inline]
pub fn tantoangle(slope: usize) -> u32 {
    TANTOANGLE[slope.min(SLOPERANGE as usize)]
}

/// Doom function name `SlopeDiv`
#[inline]
pub fn slope_div(num: u32, den: u32) -> usize {
    if den < 512 {
        return SLOPERANGE as usize;
    }
    let ans = (num << 3) / (den >> 8);
    ans.min(SLOPERANGE) as usize
}

/// 64-bit variant of [`slope_div`] that does not lose the top bits of `num`
/// on very long distances
#[inline]
pub fn slope_div_wide(num: u32, den: u32) -> usize {
    if den < 512 {
        return SLOPERANGE as usize;
    }
    let ans = ((num as u64) << 3) / (den as u64 >> 8);
    ans.min(SLOPERANGE as u64) as usize
}
