//! Fixed-point numbers, binary angles and the lookup tables shared by the
//! renderer and the gameplay side (line of sight).

mod angle;
mod fixed;
mod intercept;
mod trig;

pub use angle::*;
pub use fixed::*;
pub use intercept::*;
pub use trig::*;

#[cfg(test)]
mod tests {
    use crate::{
        ANG45, ANG90, ANG180, Angle, FINEANGLES, FRACUNIT, SLOPERANGE, fixed_div, fixed_mul,
        finecosine, finesine, finetangent, init_tables, point_to_angle, tantoangle,
    };

    #[test]
    fn fixed_mul_widens() {
        // the raw product of these overflows i32 before the shift
        let a = 15000 * FRACUNIT;
        assert_eq!(fixed_mul(a, 2 * FRACUNIT), 30000 * FRACUNIT);
        assert_eq!(fixed_mul(-FRACUNIT / 2, FRACUNIT / 2), -FRACUNIT / 4);
    }

    #[test]
    fn fixed_div_saturates() {
        assert_eq!(fixed_div(FRACUNIT, 2 * FRACUNIT), FRACUNIT / 2);
        assert_eq!(fixed_div(i32::MAX, 1), i32::MAX);
        assert_eq!(fixed_div(-i32::MAX, 1), i32::MIN);
        assert_eq!(fixed_div(FRACUNIT, 0), i32::MAX);
    }

    #[test]
    fn tables_built_up_front() {
        init_tables();
        assert_eq!(tantoangle(SLOPERANGE as usize), ANG45);
        assert_eq!(tantoangle(0), 0);
        // tangent runs -90..90 and is odd about the middle
        let last = FINEANGLES / 2 - 1;
        assert!(finetangent(0) < -100 * FRACUNIT);
        assert!((finetangent(0) + finetangent(last)).abs() <= 1);
        assert!(finetangent(FINEANGLES / 4) > 0 && finetangent(FINEANGLES / 4) < 100);
    }

    #[test]
    fn sine_cosine_quadrants() {
        assert!(finesine(0) >= 0 && finesine(0) < 100);
        assert!(finesine(2048) > FRACUNIT - 10);
        assert!(finecosine(4096) < -FRACUNIT + 10);
        assert_eq!(Angle::new(ANG90).sin(), finesine(2048));
    }

    #[test]
    fn point_angles_by_octant() {
        assert_eq!(point_to_angle(FRACUNIT, 0), Angle::default());
        assert_eq!(point_to_angle(0, FRACUNIT).bam(), ANG90 - 1);
        assert_eq!(point_to_angle(-FRACUNIT, 0).bam(), ANG180 - 1);
        let a = point_to_angle(0, -FRACUNIT).bam();
        assert!(a > ANG180 + ANG90 - 2 && a <= ANG180 + ANG90);
    }
}
