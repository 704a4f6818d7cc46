use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::trig::{ANGLETOFINESHIFT, finecosine, finesine, slope_div, slope_div_wide};
use crate::{Fixed, tantoangle};

pub const ANG45: u32 = 0x2000_0000;
pub const ANG90: u32 = 0x4000_0000;
pub const ANG180: u32 = 0x8000_0000;
pub const ANG270: u32 = 0xc000_0000;

/// Binary Angle Measure. The full `u32` range is one turn, so all arithmetic
/// wraps the same way Doom's `angle_t` does.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(u32);

impl Angle {
    #[inline]
    pub const fn new(bam: u32) -> Self {
        Angle(bam)
    }

    #[inline]
    pub const fn bam(&self) -> u32 {
        self.0
    }

    /// Index in to the fine-angle tables
    #[inline]
    pub const fn fine(&self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    #[inline]
    pub fn sin(&self) -> Fixed {
        finesine(self.fine())
    }

    #[inline]
    pub fn cos(&self) -> Fixed {
        finecosine(self.fine())
    }
}

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: Angle) -> Angle {
        Angle(self.0.wrapping_add(other.0))
    }
}

impl Add<u32> for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: u32) -> Angle {
        Angle(self.0.wrapping_add(other))
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, other: Angle) {
        self.0 = self.0.wrapping_add(other.0);
    }
}

impl AddAssign<u32> for Angle {
    #[inline]
    fn add_assign(&mut self, other: u32) {
        self.0 = self.0.wrapping_add(other);
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: Angle) -> Angle {
        Angle(self.0.wrapping_sub(other.0))
    }
}

impl Sub<u32> for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: u32) -> Angle {
        Angle(self.0.wrapping_sub(other))
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, other: Angle) {
        self.0 = self.0.wrapping_sub(other.0);
    }
}

impl Neg for Angle {
    type Output = Angle;
    #[inline]
    fn neg(self) -> Angle {
        Angle(self.0.wrapping_neg())
    }
}

fn octant_angle(mut x: i64, mut y: i64, slope: impl Fn(u32, u32) -> usize) -> Angle {
    if x == 0 && y == 0 {
        return Angle(0);
    }
    let bam = if x >= 0 {
        if y >= 0 {
            if x > y {
                // octant 0
                tantoangle(slope(y as u32, x as u32))
            } else {
                // octant 1
                ANG90 - 1 - tantoangle(slope(x as u32, y as u32))
            }
        } else {
            y = -y;
            if x > y {
                // octant 8
                tantoangle(slope(y as u32, x as u32)).wrapping_neg()
            } else {
                // octant 7
                ANG270 + tantoangle(slope(x as u32, y as u32))
            }
        }
    } else {
        x = -x;
        if y >= 0 {
            if x > y {
                // octant 3
                ANG180 - 1 - tantoangle(slope(y as u32, x as u32))
            } else {
                // octant 2
                ANG90 + tantoangle(slope(x as u32, y as u32))
            }
        } else {
            y = -y;
            if x > y {
                // octant 4
                ANG180 + tantoangle(slope(y as u32, x as u32))
            } else {
                // octant 5
                ANG270 - 1 - tantoangle(slope(x as u32, y as u32))
            }
        }
    };
    Angle(bam)
}

/// Angle of the vector `(dx, dy)`. Doom function name `R_PointToAngle`
/// with the view origin already subtracted.
pub fn point_to_angle(dx: Fixed, dy: Fixed) -> Angle {
    octant_angle(dx as i64, dy as i64, slope_div)
}

/// Angle from `(from_x, from_y)` to `(x, y)` that stays correct when the
/// difference of the two points overflows 32 bits. Both deltas are halved in
/// that case, which keeps the direction.
pub fn point_to_angle_wide(from_x: Fixed, from_y: Fixed, x: Fixed, y: Fixed) -> Angle {
    let mut dx = x as i64 - from_x as i64;
    let mut dy = y as i64 - from_y as i64;
    if dx < i32::MIN as i64 || dx > i32::MAX as i64 || dy < i32::MIN as i64 || dy > i32::MAX as i64
    {
        dx /= 2;
        dy /= 2;
    }
    octant_angle(dx, dy, slope_div_wide)
}
