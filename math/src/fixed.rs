/// Doom `fixed_t`. 16.16 signed fixed-point.
pub type Fixed = i32;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: Fixed = 1 << FRACBITS;

/// Multiply two fixed-point values, widening to 64 bits so that the
/// intermediate product can never overflow. Doom function name `FixedMul`.
#[inline(always)]
pub const fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    ((a as i64 * b as i64) >> FRACBITS) as Fixed
}

/// Divide two fixed-point values. Saturates to `i32::MAX`/`i32::MIN` when the
/// quotient would not fit, which also covers division by zero. Doom function
/// name `FixedDiv`.
#[inline(always)]
pub const fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if (a.unsigned_abs() >> 14) >= b.unsigned_abs() {
        if (a ^ b) < 0 { i32::MIN } else { i32::MAX }
    } else {
        (((a as i64) << FRACBITS) / b as i64) as Fixed
    }
}
