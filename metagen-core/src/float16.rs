//! IEEE 754 binary16 conversions used by half-precision score columns.

/// Convert an `f32` to binary16 bits, rounding to nearest (ties to even).
///
/// Values too large for binary16 become infinity; values too small become a
/// signed zero. NaN stays NaN.
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x007F_FFFF;

    if exponent == 0xFF {
        // Inf/NaN
        let nan_bit = if mantissa != 0 { 0x0200 } else { 0 };
        return sign | 0x7C00 | nan_bit;
    }

    let half_exponent = exponent - 127 + 15;
    if half_exponent >= 0x1F {
        return sign | 0x7C00;
    }

    if half_exponent <= 0 {
        // subnormal result, or underflow to zero
        if half_exponent < -10 {
            return sign;
        }
        let full = mantissa | 0x0080_0000;
        let shift = (14 - half_exponent) as u32;
        let round_bit = 1u32 << (shift - 1);
        let mut half_mantissa = full >> shift;
        if full & round_bit != 0 && full & (3 * round_bit - 1) != 0 {
            half_mantissa += 1;
        }
        return sign | half_mantissa as u16;
    }

    let round_bit = 0x1000;
    let mut half = ((half_exponent as u32) << 10) | (mantissa >> 13);
    if mantissa & round_bit != 0 && mantissa & (3 * round_bit - 1) != 0 {
        // a carry into the exponent is the correct rounding
        half += 1;
    }
    sign | half as u16
}

/// Convert binary16 bits to an `f32`. Exact for every input.
pub fn f16_to_f32(half: u16) -> f32 {
    let sign = ((half & 0x8000) as u32) << 16;
    let exponent = ((half >> 10) & 0x1F) as u32;
    let mantissa = (half & 0x03FF) as u32;

    let bits = match (exponent, mantissa) {
        (0, 0) => sign,
        (0, m) => {
            // normalize the subnormal
            let mut e: i32 = -14;
            let mut m = m;
            while m & 0x0400 == 0 {
                m <<= 1;
                e -= 1;
            }
            sign | (((e + 127) as u32) << 23) | ((m & 0x03FF) << 13)
        }
        (0x1F, m) => sign | 0x7F80_0000 | (m << 13),
        (e, m) => sign | ((e + 127 - 15) << 23) | (m << 13),
    };
    f32::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0.0, 0x0000)]
    #[case(-0.0, 0x8000)]
    #[case(1.0, 0x3C00)]
    #[case(5.0, 0x4500)]
    #[case(-2.0, 0xC000)]
    #[case(65504.0, 0x7BFF)]
    #[case(100000.0, 0x7C00)]
    #[case(f32::INFINITY, 0x7C00)]
    #[case(5.960_464_5e-8, 0x0001)]
    fn test_f32_to_f16(#[case] value: f32, #[case] expected: u16) {
        assert_eq!(f32_to_f16(value), expected);
    }

    #[rstest]
    #[case(0x3C00, 1.0)]
    #[case(0x4500, 5.0)]
    #[case(0x0001, 5.960_464_5e-8)]
    #[case(0x0400, 6.103_515_6e-5)]
    #[case(0xFC00, f32::NEG_INFINITY)]
    fn test_f16_to_f32(#[case] half: u16, #[case] expected: f32) {
        assert_eq!(f16_to_f32(half), expected);
    }

    #[rstest]
    fn test_nan_stays_nan() {
        assert!(f16_to_f32(f32_to_f16(f32::NAN)).is_nan());
    }

    #[rstest]
    fn test_ties_round_to_even() {
        // 1 + 2^-11 lies exactly between 1.0 and the next binary16 value
        assert_eq!(f32_to_f16(1.0 + 2f32.powi(-11)), 0x3C00);
        // 1 + 3 * 2^-11 rounds up to the even mantissa
        assert_eq!(f32_to_f16(1.0 + 3.0 * 2f32.powi(-11)), 0x3C02);
    }

    #[rstest]
    fn test_every_half_value_round_trips() {
        for half in 0u16..0x7C00 {
            assert_eq!(f32_to_f16(f16_to_f32(half)), half);
        }
    }
}
