use crate::{FRACBITS, Fixed, fixed_div, fixed_mul};

/// An origin plus a direction. Used both for BSP partition lines and for
/// sight traces. Doom type `divline_t`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Divline {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

/// Which side of a divline a point is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSide {
    Front = 0,
    Back = 1,
    On = 2,
}

impl Divline {
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, dx: Fixed, dy: Fixed) -> Self {
        Self { x, y, dx, dy }
    }

    /// Line from `(x1, y1)` to `(x2, y2)`
    #[inline]
    pub const fn from_points(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Self {
        Self {
            x: x1,
            y: y1,
            dx: x2.wrapping_sub(x1),
            dy: y2.wrapping_sub(y1),
        }
    }

    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Tri-state side test. Axis aligned lines compare coordinates directly,
    /// everything else compares the integer parts of the cross product.
    /// Doom function name `P_DivlineSide`
    pub fn side(&self, x: Fixed, y: Fixed) -> LineSide {
        let back = |b: bool| if b { LineSide::Back } else { LineSide::Front };
        if self.dx == 0 {
            if x == self.x {
                return LineSide::On;
            }
            return if x <= self.x {
                back(self.dy > 0)
            } else {
                back(self.dy < 0)
            };
        }

        if self.dy == 0 {
            if y == self.y {
                return LineSide::On;
            }
            return if y <= self.y {
                back(self.dx < 0)
            } else {
                back(self.dx > 0)
            };
        }

        let right = ((y.wrapping_sub(self.y)) >> FRACBITS) as i64 * (self.dx >> FRACBITS) as i64;
        let left = ((x.wrapping_sub(self.x)) >> FRACBITS) as i64 * (self.dy >> FRACBITS) as i64;
        if right < left {
            LineSide::Front
        } else if right == left {
            LineSide::On
        } else {
            LineSide::Back
        }
    }
}

/// Returns the fractional intercept point along the first divline.
///
/// The lines can be pictured as `v2` being the trace, and `v1` being the
/// line to check if intersected by the trace. Parallel lines give 0.
///
/// P_InterceptVector2
#[inline]
pub fn intercept_vector(v2: &Divline, v1: &Divline) -> Fixed {
    let den = fixed_mul(v1.dy >> 8, v2.dx).wrapping_sub(fixed_mul(v1.dx >> 8, v2.dy));
    if den == 0 {
        return 0;
    }
    let num = fixed_mul((v1.x.wrapping_sub(v2.x)) >> 8, v1.dy)
        .wrapping_add(fixed_mul((v2.y.wrapping_sub(v1.y)) >> 8, v1.dx));
    fixed_div(num, den)
}

#[cfg(test)]
mod tests {
    use super::{Divline, LineSide, intercept_vector};
    use crate::FRACUNIT;

    #[test]
    fn side_of_vertical_line() {
        // pointing north along x = 0
        let dl = Divline::new(0, 0, 0, 64 * FRACUNIT);
        assert_eq!(dl.side(-FRACUNIT, 0), LineSide::Back);
        assert_eq!(dl.side(FRACUNIT, 0), LineSide::Front);
        assert_eq!(dl.side(0, 5 * FRACUNIT), LineSide::On);
    }

    #[test]
    fn side_of_diagonal_line() {
        let dl = Divline::new(0, 0, 64 * FRACUNIT, 64 * FRACUNIT);
        assert_eq!(dl.side(10 * FRACUNIT, 0), LineSide::Front);
        assert_eq!(dl.side(0, 10 * FRACUNIT), LineSide::Back);
        assert_eq!(dl.side(10 * FRACUNIT, 10 * FRACUNIT), LineSide::On);
    }

    #[test]
    fn intercept_halfway() {
        let trace = Divline::new(-64 * FRACUNIT, 0, 128 * FRACUNIT, 0);
        let wall = Divline::new(0, -32 * FRACUNIT, 0, 64 * FRACUNIT);
        let frac = intercept_vector(&trace, &wall);
        assert!((frac - FRACUNIT / 2).abs() <= 2);
    }
}
