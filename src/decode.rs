use crate::bits::{self, BitFields, Bits, Class};
use crate::error::Error;
use crate::format::{Format, Precision};
use crate::result::CodecResult;
use crate::round::{round_to_nearest_even, shift_right_with_grs};

/// Decode a bit pattern of the given precision into its classification,
/// numeric value and field breakdown. Accepts a raw integer, exact-width
/// binary text or `0x`-prefixed hex text; malformed input fails with
/// [`Error::MalformedBits`]. Every in-range pattern decodes to exactly one
/// of the five classifications.
pub fn from_ieee754<'a>(
    bits: impl Into<Bits<'a>>,
    precision: Precision,
) -> Result<CodecResult, Error> {
    let fields = bits::unpack(bits.into(), precision.format())?;
    Ok(decode_fields(fields, precision))
}

/// Build the full result record for already-validated fields. The encoder
/// finishes through here too, so an encode result's value is always exactly
/// what its bit pattern represents.
pub(crate) fn decode_fields(fields: BitFields, precision: Precision) -> CodecResult {
    let fmt = precision.format();
    let class = fields.classify(fmt);
    let raw = bits::pack(fields, fmt);
    CodecResult {
        precision,
        value: field_value(&fields, fmt, class),
        class,
        fields,
        pattern: bits::format_bits(raw, fmt),
        rounding: None,
        original: None,
        reason: None,
    }
}

/// The numeric value of classified fields:
/// subnormal = fraction × 2^(1 − bias − frac_bits),
/// normal = (2^frac_bits + fraction) × 2^(exponent − bias − frac_bits).
fn field_value(fields: &BitFields, fmt: Format, class: Class) -> f64 {
    match class {
        Class::Zero => {
            if fields.sign {
                -0.0
            } else {
                0.0
            }
        }
        Class::Infinity => {
            if fields.sign {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        }
        // The payload/signaling distinction is not preserved.
        Class::Nan => f64::NAN,
        Class::Subnormal => {
            let scale = fmt.min_normal_exp() - fmt.fraction_bits() as i32;
            significand_to_f64(fields.sign, fields.fraction, scale)
        }
        Class::Normal => {
            let significand = (1u128 << fmt.fraction_bits()) | fields.fraction;
            let scale = fields.exponent as i32 - fmt.bias() - fmt.fraction_bits() as i32;
            significand_to_f64(fields.sign, significand, scale)
        }
    }
}

/// Materialize `significand × 2^scale` as the nearest host double, built
/// directly from bits. Half/single/double values convert exactly; wider
/// significands round to nearest-even, overflow to infinity and underflow
/// gradually through the host subnormals.
fn significand_to_f64(sign: bool, significand: u128, scale: i32) -> f64 {
    debug_assert!(significand != 0);
    const FRAC: u32 = 52;
    const BIAS: i32 = 1023;
    const MIN_EXP: i32 = -1022;
    const INF: u64 = 0x7FF << FRAC;

    let msb = 127 - significand.leading_zeros() as i32;
    let mut exp = msb + scale;
    let magnitude: u64;
    if exp > BIAS {
        magnitude = INF;
    } else if exp >= MIN_EXP {
        // Normal host double: align the significand to 53 bits.
        let drop = msb - FRAC as i32;
        let (kept, guard, round, sticky) = if drop > 0 {
            shift_right_with_grs(significand, drop as u32)
        } else {
            (significand << ((-drop) as u32), false, false, false)
        };
        let (mantissa, carry) = round_to_nearest_even(kept, FRAC + 1, guard, round, sticky);
        if carry {
            // 1.11…1 rounded up to 10.00…0: the wrapped mantissa is already
            // the right fraction, only the exponent moves.
            exp += 1;
        }
        magnitude = if exp > BIAS {
            INF
        } else {
            (((exp + BIAS) as u64) << FRAC) | (mantissa as u64 & ((1 << FRAC) - 1))
        };
    } else {
        // Below the normal range: re-express as fraction × 2^(-1022 − 52).
        let shift = scale - (MIN_EXP - FRAC as i32);
        let (mantissa, carry) = if shift >= 0 {
            // exp < MIN_EXP bounds the shifted value under 2^52.
            (significand << shift as u32, false)
        } else {
            let (kept, guard, round, sticky) =
                shift_right_with_grs(significand, (-shift) as u32);
            round_to_nearest_even(kept, FRAC, guard, round, sticky)
        };
        // A carry promotes the value to the smallest normal (exponent field
        // 1, fraction 0), which is exactly what the bit layout yields.
        magnitude = if carry { 1u64 << FRAC } else { mantissa as u64 };
    }
    f64::from_bits(magnitude | ((sign as u64) << 63))
}

#[test]
fn test_decode_known_singles() {
    use crate::format::SINGLE;

    let one = from_ieee754(0x3F80_0000u32, Precision::Single).unwrap();
    assert_eq!(one.value, 1.0);
    assert_eq!(one.class, Class::Normal);
    assert_eq!(one.fields.exponent, 127);
    assert_eq!(one.fields.unbiased_exponent(SINGLE), 0);
    assert_eq!(one.pattern.hex, "0x3F800000");

    assert_eq!(
        from_ieee754(0x7F80_0000u32, Precision::Single).unwrap().value,
        f64::INFINITY
    );
    assert_eq!(
        from_ieee754(0xFF80_0000u32, Precision::Single).unwrap().value,
        f64::NEG_INFINITY
    );

    let nan = from_ieee754(0x7FC0_0000u32, Precision::Single).unwrap();
    assert_eq!(nan.class, Class::Nan);
    assert!(nan.value.is_nan());

    // Signed zeros decode with their sign.
    let zero = from_ieee754(0x8000_0000u32, Precision::Single).unwrap();
    assert_eq!(zero.class, Class::Zero);
    assert!(zero.value.is_sign_negative());
    assert_eq!(zero.value, 0.0);

    // Smallest subnormal and smallest normal.
    assert_eq!(
        from_ieee754(1u32, Precision::Single).unwrap().value,
        2f64.powi(-149)
    );
    assert_eq!(
        from_ieee754(0x0080_0000u32, Precision::Single).unwrap().value,
        2f64.powi(-126)
    );
}

#[test]
fn test_decode_half_totality() {
    // Every 16-bit pattern decodes into exactly one classification, and the
    // value follows the field formulas.
    for raw in 0..=u16::MAX {
        let out = from_ieee754(raw, Precision::Half).unwrap();
        let fields = out.fields;
        let sign = if fields.sign { -1.0 } else { 1.0 };
        match out.class {
            Class::Zero => {
                assert_eq!((fields.exponent, fields.fraction), (0, 0));
                assert_eq!(out.value, 0.0);
                assert_eq!(out.value.is_sign_negative(), fields.sign);
            }
            Class::Subnormal => {
                assert_eq!(fields.exponent, 0);
                let expect = sign * fields.fraction as f64 * 2f64.powi(-24);
                assert_eq!(out.value, expect);
            }
            Class::Normal => {
                let expect = sign
                    * (1.0 + fields.fraction as f64 / 1024.0)
                    * 2f64.powi(fields.exponent as i32 - 15);
                assert_eq!(out.value, expect);
            }
            Class::Infinity => {
                assert_eq!(fields.fraction, 0);
                assert!(out.value.is_infinite());
            }
            Class::Nan => {
                assert!(fields.fraction != 0);
                assert!(out.value.is_nan());
            }
        }
    }
}

#[test]
fn test_decode_single_matches_host() {
    use crate::utils::Lfsr;
    use core::num::FpCategory;

    let mut lfsr = Lfsr::new();
    for _ in 0..50000 {
        let bits = lfsr.get64() as u32;
        let out = from_ieee754(bits, Precision::Single).unwrap();
        let host = f32::from_bits(bits);
        let expect = match host.classify() {
            FpCategory::Nan => Class::Nan,
            FpCategory::Infinite => Class::Infinity,
            FpCategory::Zero => Class::Zero,
            FpCategory::Subnormal => Class::Subnormal,
            FpCategory::Normal => Class::Normal,
        };
        assert_eq!(out.class, expect, "bits {bits:#010x}");
        if !host.is_nan() {
            assert_eq!(out.value, host as f64, "bits {bits:#010x}");
            assert_eq!(out.value.is_sign_negative(), host.is_sign_negative());
        }
    }
}

#[test]
fn test_decode_double_matches_host() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..50000 {
        let bits = lfsr.get64();
        let out = from_ieee754(bits, Precision::Double).unwrap();
        let host = f64::from_bits(bits);
        if host.is_nan() {
            assert_eq!(out.class, Class::Nan);
        } else {
            // Bit-exact round trip through the decoder.
            assert_eq!(out.value.to_bits(), bits, "bits {bits:#018x}");
        }
    }
    // The denormal floor decodes exactly.
    assert_eq!(
        from_ieee754(1u64, Precision::Double).unwrap().value,
        f64::from_bits(1)
    );
}

#[test]
fn test_decode_quad_rounds_to_host_double() {
    // 1.0: biased exponent 16383, zero fraction.
    let one = from_ieee754(0x3FFF_u128 << 112, Precision::Quad).unwrap();
    assert_eq!(one.value, 1.0);
    assert_eq!(one.class, Class::Normal);

    // Double-representable powers of two survive exactly.
    let big = from_ieee754((16383u128 + 1000) << 112, Precision::Quad).unwrap();
    assert_eq!(big.value, 2f64.powi(1000));

    // 1 + 2^-112 is between doubles; it rounds down to 1.0.
    let near_one = from_ieee754((0x3FFF_u128 << 112) | 1, Precision::Quad).unwrap();
    assert_eq!(near_one.value, 1.0);
    assert_eq!(near_one.class, Class::Normal);

    // 1 + 2^-53 sits exactly halfway between doubles: ties to even (1.0).
    let tie = from_ieee754((0x3FFF_u128 << 112) | (1 << 59), Precision::Quad).unwrap();
    assert_eq!(tie.value, 1.0);

    // Just above the tie rounds up to the next double.
    let above =
        from_ieee754((0x3FFF_u128 << 112) | (1 << 59) | 1, Precision::Quad).unwrap();
    assert_eq!(above.value, 1.0 + 2f64.powi(-52));

    // Beyond the host exponent range the value saturates, while the
    // classification stays what the pattern says.
    let huge = from_ieee754((16383u128 + 2000) << 112, Precision::Quad).unwrap();
    assert_eq!(huge.value, f64::INFINITY);
    assert_eq!(huge.class, Class::Normal);

    let tiny = from_ieee754((16383u128 - 2000) << 112, Precision::Quad).unwrap();
    assert_eq!(tiny.value, 0.0);
    assert_eq!(tiny.class, Class::Normal);

    // Values in the host subnormal range degrade gradually: 2^-1074 is
    // quad-normal but lands on the smallest host subnormal.
    let floor = from_ieee754((16383u128 - 1074) << 112, Precision::Quad).unwrap();
    assert_eq!(floor.value, f64::from_bits(1));
    assert_eq!(floor.class, Class::Normal);
}

#[test]
fn test_decode_rejects_malformed() {
    assert!(matches!(
        from_ieee754("10101", Precision::Half),
        Err(Error::MalformedBits(_))
    ));
    assert!(matches!(
        from_ieee754(0x1_0000_0000u64, Precision::Single),
        Err(Error::MalformedBits(_))
    ));
    assert!(matches!(
        from_ieee754("0xGG", Precision::Half),
        Err(Error::MalformedBits(_))
    ));
}
