//! Decimal value → rounded, packed bit pattern.

use crate::bits::BitFields;
use crate::decode::decode_fields;
use crate::format::{Format, Precision};
use crate::result::{CodecResult, RoundingInfo};
use crate::round::{round_to_nearest_even, shift_right_with_grs};

/// Decimal input accepted by the encoder: a native number or a literal.
#[derive(Debug, Clone, Copy)]
pub enum Decimal<'a> {
    Num(f64),
    Text(&'a str),
}

impl<'a> From<f64> for Decimal<'a> {
    fn from(value: f64) -> Self {
        Decimal::Num(value)
    }
}

impl<'a> From<f32> for Decimal<'a> {
    fn from(value: f32) -> Self {
        Decimal::Num(f64::from(value))
    }
}

impl<'a> From<&'a str> for Decimal<'a> {
    fn from(text: &'a str) -> Self {
        Decimal::Text(text)
    }
}

/// Encode a decimal value into the given precision. Never fails: an
/// unparseable literal is recovered as a `nan` result carrying the reason,
/// so the decimal-entry path always produces a displayable record.
///
/// The returned value is exactly what the produced bit pattern represents;
/// the difference from the input is the controlled rounding error, and the
/// attached [`RoundingInfo`] says how it came about.
pub fn to_ieee754<'a>(value: impl Into<Decimal<'a>>, precision: Precision) -> CodecResult {
    let value = match value.into() {
        Decimal::Num(value) => value,
        Decimal::Text(text) => match text.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => return invalid_literal(text, precision),
        },
    };

    let fmt = precision.format();
    // Specials bypass all rounding logic.
    if value.is_nan() {
        return finish(quiet_nan(fmt), precision, None, Some(value));
    }
    if value.is_infinite() {
        return finish(infinity(value.is_sign_negative(), fmt), precision, None, Some(value));
    }
    if value == 0.0 {
        let zero = BitFields {
            sign: value.is_sign_negative(),
            exponent: 0,
            fraction: 0,
        };
        return finish(zero, precision, None, Some(value));
    }

    encode_magnitude(value, precision)
}

/// Encode a finite, non-zero value.
fn encode_magnitude(value: f64, precision: Precision) -> CodecResult {
    let fmt = precision.format();
    let sign = value.is_sign_negative();
    let (significand, binary_exponent) = decompose(value.abs());

    if binary_exponent < fmt.min_normal_exp() {
        return encode_subnormal(sign, significand, binary_exponent, value, precision);
    }

    // Overflow before rounding: the biased exponent already saturates.
    let mut exponent = (binary_exponent + fmt.bias()) as u32;
    if exponent >= fmt.exp_max() {
        return finish(infinity(sign, fmt), precision, None, Some(value));
    }

    // The fractional mantissa (s − 1) × 2^frac_bits, exact in integer space:
    // widening formats take the 52 fraction bits as-is, narrowing ones shift
    // them down through the rounding engine.
    let frac = (significand - (1u64 << 52)) as u128;
    let target = fmt.fraction_bits();
    let (kept, guard, round, sticky) = if target >= 52 {
        (frac << (target - 52), false, false, false)
    } else {
        shift_right_with_grs(frac, 52 - target)
    };

    let (mantissa, carry) = round_to_nearest_even(kept, target, guard, round, sticky);
    let rounding = RoundingInfo {
        binary_exponent,
        pre_round_exponent: exponent,
        pre_round_mantissa: kept,
        exponent_carry: carry,
    };
    if carry {
        exponent += 1;
        // Overflow after rounding: 1.11…1 rounded up past the largest normal.
        if exponent >= fmt.exp_max() {
            return finish(infinity(sign, fmt), precision, Some(rounding), Some(value));
        }
    }

    let fields = BitFields {
        sign,
        exponent,
        fraction: mantissa,
    };
    finish(fields, precision, Some(rounding), Some(value))
}

/// Encode below the smallest normal exponent: scale the magnitude by
/// 2^(frac_bits + bias − 1) and round it to an integer mantissa stored with
/// biased exponent 0. Rounding to exactly zero degrades the classification
/// to zero; a rounding carry lands on the smallest normal (exponent 1,
/// mantissa 0), the correctly rounded result at the boundary.
fn encode_subnormal(
    sign: bool,
    significand: u64,
    binary_exponent: i32,
    value: f64,
    precision: Precision,
) -> CodecResult {
    let fmt = precision.format();
    // magnitude × 2^(frac_bits + bias − 1) == significand × 2^shift.
    let shift = binary_exponent - 52 + fmt.fraction_bits() as i32 + fmt.bias() - 1;
    let (kept, guard, round, sticky) = if shift >= 0 {
        ((significand as u128) << shift as u32, false, false, false)
    } else {
        shift_right_with_grs(significand as u128, (-shift) as u32)
    };
    debug_assert!(kept <= fmt.frac_mask());

    let (mantissa, carry) = round_to_nearest_even(kept, fmt.fraction_bits(), guard, round, sticky);
    let rounding = RoundingInfo {
        binary_exponent,
        pre_round_exponent: 0,
        pre_round_mantissa: kept,
        exponent_carry: carry,
    };
    let fields = BitFields {
        sign,
        exponent: carry as u32,
        fraction: mantissa,
    };
    finish(fields, precision, Some(rounding), Some(value))
}

/// Split a finite, non-zero magnitude into its exact 53-bit significand and
/// unbiased exponent: `magnitude == significand × 2^(exponent − 52)` with
/// the top significand bit at position 52, so `exponent` is exactly
/// `floor(log2(magnitude))`. Subnormal doubles are normalized by shifting.
/// Working on the bit pattern keeps the split exact where `log2` + `floor`
/// would drift at the boundaries.
fn decompose(magnitude: f64) -> (u64, i32) {
    debug_assert!(magnitude.is_finite() && magnitude > 0.0);
    let bits = magnitude.to_bits();
    let raw_exponent = ((bits >> 52) & 0x7FF) as i32;
    let raw_fraction = bits & ((1u64 << 52) - 1);
    if raw_exponent == 0 {
        // Subnormal double: shift the top bit up to position 52.
        let shift = raw_fraction.leading_zeros() - 11;
        (raw_fraction << shift, -1022 - shift as i32)
    } else {
        (raw_fraction | (1u64 << 52), raw_exponent - 1023)
    }
}

/// Pack the fields and decode them back, so the returned value and strings
/// describe the bit pattern itself.
fn finish(
    fields: BitFields,
    precision: Precision,
    rounding: Option<RoundingInfo>,
    original: Option<f64>,
) -> CodecResult {
    let mut out = decode_fields(fields, precision);
    out.rounding = rounding;
    out.original = original;
    out
}

/// The canonical quiet-NaN pattern: positive sign, all-ones exponent,
/// mantissa MSB set.
fn quiet_nan(fmt: Format) -> BitFields {
    BitFields {
        sign: false,
        exponent: fmt.exp_max(),
        fraction: 1u128 << (fmt.fraction_bits() - 1),
    }
}

fn infinity(sign: bool, fmt: Format) -> BitFields {
    BitFields {
        sign,
        exponent: fmt.exp_max(),
        fraction: 0,
    }
}

fn invalid_literal(text: &str, precision: Precision) -> CodecResult {
    let mut out = decode_fields(quiet_nan(precision.format()), precision);
    out.reason = Some(format!("invalid decimal literal: `{text}`"));
    out
}

#[test]
fn test_encode_known_singles() {
    use crate::bits::Class;

    let two = to_ieee754(2.0, Precision::Single);
    assert_eq!(two.bits(), 0x4000_0000);
    assert_eq!(two.class, Class::Normal);
    assert_eq!(two.value, 2.0);

    let neg_two = to_ieee754(-2.0, Precision::Single);
    assert_eq!(neg_two.bits(), 0xC000_0000);
    assert!(neg_two.fields.sign);

    assert_eq!(to_ieee754(1.0, Precision::Single).bits(), 0x3F80_0000);
    assert_eq!(to_ieee754(0.5, Precision::Single).bits(), 0x3F00_0000);
    assert_eq!(to_ieee754(0.15625, Precision::Single).bits(), 0x3E20_0000);

    // 0.1 is inexact: the returned value is the pattern's value, the input
    // survives in `original`.
    let tenth = to_ieee754(0.1, Precision::Single);
    assert_eq!(tenth.bits(), 0x3DCC_CCCD);
    assert_eq!(tenth.value, 0.1f32 as f64);
    assert_ne!(tenth.value, 0.1);
    assert_eq!(tenth.original, Some(0.1));
}

#[test]
fn test_encode_specials() {
    use crate::bits::Class;

    let nan = to_ieee754(f64::NAN, Precision::Single);
    assert_eq!(nan.class, Class::Nan);
    assert_eq!(nan.bits(), 0x7FC0_0000);
    assert!(nan.reason.is_none());

    // Negative NaN canonicalizes to the positive quiet pattern.
    assert_eq!(to_ieee754(-f64::NAN, Precision::Single).bits(), 0x7FC0_0000);

    assert_eq!(to_ieee754(f64::INFINITY, Precision::Single).bits(), 0x7F80_0000);
    assert_eq!(
        to_ieee754(f64::NEG_INFINITY, Precision::Single).bits(),
        0xFF80_0000
    );
    assert_eq!(to_ieee754(f64::INFINITY, Precision::Half).bits(), 0x7C00);

    let zero = to_ieee754(0.0, Precision::Single);
    assert_eq!(zero.bits(), 0);
    assert_eq!(zero.class, Class::Zero);
    let neg_zero = to_ieee754(-0.0, Precision::Single);
    assert_eq!(neg_zero.bits(), 0x8000_0000);
    assert!(neg_zero.value.is_sign_negative());

    assert_eq!(to_ieee754(f64::NAN, Precision::Quad).bits(), (0x7FFF_u128 << 112) | (1 << 111));
}

#[test]
fn test_encode_literals() {
    use crate::bits::Class;

    assert_eq!(to_ieee754("3.5", Precision::Half).bits(), 0x4300);
    assert_eq!(to_ieee754(" 1.0 ", Precision::Single).bits(), 0x3F80_0000);
    assert_eq!(to_ieee754("1e3", Precision::Single).value, 1000.0);
    assert_eq!(to_ieee754("-inf", Precision::Half).bits(), 0xFC00);

    let bad = to_ieee754("12.5.1", Precision::Single);
    assert_eq!(bad.class, Class::Nan);
    assert_eq!(bad.bits(), 0x7FC0_0000);
    assert_eq!(bad.original, None);
    assert!(bad.reason.unwrap().contains("12.5.1"));

    let empty = to_ieee754("", Precision::Half);
    assert_eq!(empty.class, Class::Nan);
    assert!(empty.reason.is_some());
}

#[test]
fn test_round_ties_to_even() {
    // Halfway between mantissa 0 and 1: down to the even 0.
    let down = to_ieee754(1.0 + 2f64.powi(-24), Precision::Single);
    assert_eq!(down.bits(), 0x3F80_0000);

    // Halfway between mantissa 1 and 2: up to the even 2.
    let up = to_ieee754(1.0 + 3.0 * 2f64.powi(-24), Precision::Single);
    assert_eq!(up.bits(), 0x3F80_0002);
    let info = up.rounding.unwrap();
    assert_eq!(info.binary_exponent, 0);
    assert_eq!(info.pre_round_mantissa, 1);
    assert!(!info.exponent_carry);

    // Just above a tie always rounds up.
    let above = to_ieee754(1.0 + 2f64.powi(-24) + 2f64.powi(-40), Precision::Single);
    assert_eq!(above.bits(), 0x3F80_0001);

    // Same ladder at half precision.
    assert_eq!(to_ieee754(1.0 + 2f64.powi(-11), Precision::Half).bits(), 0x3C00);
    assert_eq!(
        to_ieee754(1.0 + 3.0 * 2f64.powi(-11), Precision::Half).bits(),
        0x3C02
    );
}

#[test]
fn test_mantissa_carry_into_exponent() {
    use crate::bits::Class;

    // 2 − 2^-12 rounds its half mantissa up and carries into the exponent.
    let carried = to_ieee754(2.0 - 2f64.powi(-12), Precision::Half);
    assert_eq!(carried.bits(), 0x4000);
    assert_eq!(carried.value, 2.0);
    assert!(carried.rounding.unwrap().exponent_carry);

    // At the top of the range the same carry overflows to infinity.
    let top = to_ieee754(65535.0, Precision::Half);
    assert_eq!(top.class, Class::Infinity);
    assert_eq!(top.bits(), 0x7C00);
    assert!(top.rounding.unwrap().exponent_carry);
    assert_eq!(top.original, Some(65535.0));
}

#[test]
fn test_overflow_to_infinity() {
    use crate::bits::Class;

    // Exponent saturates before rounding.
    let big = to_ieee754(1e39, Precision::Single);
    assert_eq!(big.class, Class::Infinity);
    assert_eq!(big.bits(), 0x7F80_0000);
    assert_eq!(big.original, Some(1e39));
    assert_eq!(to_ieee754(-1e39, Precision::Single).bits(), 0xFF80_0000);

    // The largest finite values survive.
    assert_eq!(
        to_ieee754(f32::MAX as f64, Precision::Single).bits(),
        0x7F7F_FFFF
    );
    assert_eq!(to_ieee754(65504.0, Precision::Half).bits(), 0x7BFF);

    // The tie between the largest finite single and 2^128 rounds up and away.
    let tie = to_ieee754((2.0 - 2f64.powi(-24)) * 2f64.powi(127), Precision::Single);
    assert_eq!(tie.class, Class::Infinity);

    // Half overflows at 65520, stays finite just below it.
    assert_eq!(to_ieee754(65520.0, Precision::Half).class, Class::Infinity);
    assert_eq!(to_ieee754(65519.5, Precision::Half).bits(), 0x7BFF);
}

#[test]
fn test_subnormal_boundaries() {
    use crate::bits::Class;
    use crate::format::SINGLE;

    // Smallest normal single.
    let min_normal = to_ieee754(2f64.powi(-126), Precision::Single);
    assert_eq!(min_normal.class, Class::Normal);
    assert_eq!(min_normal.bits(), 0x0080_0000);

    // Smallest positive subnormal.
    let min_sub = to_ieee754(2f64.powi(-149), Precision::Single);
    assert_eq!(min_sub.class, Class::Subnormal);
    assert_eq!(min_sub.fields.fraction, 1);
    assert_eq!(min_sub.bits(), 1);

    // Half of that ties to even zero; anything smaller truncates to zero.
    assert_eq!(to_ieee754(2f64.powi(-150), Precision::Single).class, Class::Zero);
    assert_eq!(to_ieee754(2f64.powi(-160), Precision::Single).class, Class::Zero);

    // Three quarters of the smallest subnormal rounds up to it.
    let three_quarters = to_ieee754(3.0 * 2f64.powi(-151), Precision::Single);
    assert_eq!(three_quarters.class, Class::Subnormal);
    assert_eq!(three_quarters.fields.fraction, 1);

    // At the subnormal/normal boundary the carry promotes to the smallest
    // normal.
    let promoted = to_ieee754(2f64.powi(-126) - 2f64.powi(-150), Precision::Single);
    assert_eq!(promoted.class, Class::Normal);
    assert_eq!(promoted.bits(), 0x0080_0000);
    assert!(promoted.rounding.unwrap().exponent_carry);

    // Just below the halfway point stays the largest subnormal.
    let largest_sub = to_ieee754(2f64.powi(-126) - 2f64.powi(-149), Precision::Single);
    assert_eq!(largest_sub.class, Class::Subnormal);
    assert_eq!(largest_sub.fields.fraction, SINGLE.frac_mask());

    // Negative subnormals keep their sign.
    let neg = to_ieee754(-2f64.powi(-149), Precision::Single);
    assert_eq!(neg.class, Class::Subnormal);
    assert_eq!(neg.bits(), 0x8000_0001);
}

#[test]
fn test_encode_host_subnormal_inputs() {
    use crate::bits::Class;

    // Host-subnormal doubles go through the normalizing decomposition.
    let floor = to_ieee754(f64::from_bits(1), Precision::Double);
    assert_eq!(floor.bits(), 1);
    assert_eq!(floor.class, Class::Subnormal);

    let top_sub = to_ieee754(f64::from_bits(0x000F_FFFF_FFFF_FFFF), Precision::Double);
    assert_eq!(top_sub.bits(), 0x000F_FFFF_FFFF_FFFF);
    assert_eq!(top_sub.class, Class::Subnormal);

    // The same values are normal numbers in quad.
    let in_quad = to_ieee754(f64::from_bits(1), Precision::Quad);
    assert_eq!(in_quad.class, Class::Normal);
    assert_eq!(in_quad.value, f64::from_bits(1));
    assert_eq!(in_quad.rounding.unwrap().binary_exponent, -1074);
}

#[test]
fn test_encode_double_is_identity_on_bits() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..50000 {
        let bits = lfsr.get64();
        let host = f64::from_bits(bits);
        if !host.is_finite() {
            continue;
        }
        let out = to_ieee754(host, Precision::Double);
        assert_eq!(out.bits(), bits as u128, "value {host:e}");
        assert_eq!(out.value.to_bits(), bits);
    }
}

#[test]
fn test_encode_single_matches_host_cast() {
    use crate::utils::{special_test_values, Lfsr};

    // The host's f64 → f32 cast is round-to-nearest-even too, so finite
    // inputs must agree bit for bit, overflow and underflow included.
    let check = |host: f64| {
        if !host.is_finite() {
            return;
        }
        let out = to_ieee754(host, Precision::Single);
        let cast = host as f32;
        assert_eq!(out.bits(), cast.to_bits() as u128, "value {host:e}");
        assert_eq!(out.value, cast as f64);
    };

    for value in special_test_values() {
        check(value);
    }
    let mut lfsr = Lfsr::new();
    for _ in 0..50000 {
        check(f64::from_bits(lfsr.get64()));
    }
}

#[test]
fn test_encode_quad_widens_exactly() {
    use crate::utils::Lfsr;

    // Every finite double is exactly representable in quad: widening never
    // rounds, and decoding back to the host double is the identity.
    let mut lfsr = Lfsr::new();
    for _ in 0..20000 {
        let host = f64::from_bits(lfsr.get64());
        if !host.is_finite() {
            continue;
        }
        let out = to_ieee754(host, Precision::Quad);
        assert_eq!(out.value.to_bits(), host.to_bits(), "value {host:e}");
        if let Some(info) = out.rounding {
            assert!(!info.exponent_carry);
            assert_eq!(info.pre_round_mantissa, out.fields.fraction);
        }
    }
}
