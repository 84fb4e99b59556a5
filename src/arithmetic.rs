//! Add and multiply composed from the codec: decode both operands, compute
//! on host doubles, re-encode at the operand precision.

use crate::bits::Bits;
use crate::decode::from_ieee754;
use crate::encode::to_ieee754;
use crate::error::Error;
use crate::format::Precision;
use crate::result::CodecResult;

/// Outcome of an arithmetic request: the re-encoded result and a report on
/// whether encoding it changed the computed value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArithResult {
    pub result: CodecResult,
    pub verification: Verification,
}

/// `exact_match` is true when the encoded result's value equals the host's
/// double-precision computation on the decoded operands, so the operation
/// introduced no rounding beyond the operands themselves. A mismatch is
/// data, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verification {
    pub exact_match: bool,
}

/// Add two bit patterns of the given precision.
pub fn fp_add<'a, 'b>(
    a: impl Into<Bits<'a>>,
    b: impl Into<Bits<'b>>,
    precision: Precision,
) -> Result<ArithResult, Error> {
    binary_op(a.into(), b.into(), precision, |x, y| x + y)
}

/// Multiply two bit patterns of the given precision.
pub fn fp_multiply<'a, 'b>(
    a: impl Into<Bits<'a>>,
    b: impl Into<Bits<'b>>,
    precision: Precision,
) -> Result<ArithResult, Error> {
    binary_op(a.into(), b.into(), precision, |x, y| x * y)
}

fn binary_op(
    a: Bits<'_>,
    b: Bits<'_>,
    precision: Precision,
    op: impl Fn(f64, f64) -> f64,
) -> Result<ArithResult, Error> {
    let lhs = from_ieee754(a, precision)?;
    let rhs = from_ieee754(b, precision)?;
    // TODO: run the alignment through round::round_to_nearest_even at the
    // operand precision so quad results stop double-rounding through the
    // host.
    let computed = op(lhs.value, rhs.value);
    let result = to_ieee754(computed, precision);
    // Bitwise fallback so a NaN outcome with the host's payload is not
    // reported as a mismatch against itself.
    let exact_match =
        result.value == computed || result.value.to_bits() == computed.to_bits();
    Ok(ArithResult {
        result,
        verification: Verification { exact_match },
    })
}

#[test]
fn test_add_exact() {
    use crate::bits::Class;

    let a = to_ieee754(1.5, Precision::Single);
    let b = to_ieee754(2.5, Precision::Single);
    let sum = fp_add(a.bits(), b.bits(), Precision::Single).unwrap();
    assert_eq!(sum.result.value, 4.0);
    assert_eq!(sum.result.class, Class::Normal);
    assert_eq!(sum.result.bits(), 0x4080_0000);
    assert!(sum.verification.exact_match);
}

#[test]
fn test_add_rounds() {
    // f32(0.1) + f32(0.2) needs 26 mantissa bits, single keeps 23.
    let a = to_ieee754(0.1, Precision::Single);
    let b = to_ieee754(0.2, Precision::Single);
    let sum = fp_add(a.bits(), b.bits(), Precision::Single).unwrap();
    assert_eq!(sum.result.bits(), 0x3E99_999A);
    assert!(!sum.verification.exact_match);
}

#[test]
fn test_add_with_text_operands() {
    let sum = fp_add("0x3FC00000", "0x40200000", Precision::Single).unwrap();
    assert_eq!(sum.result.value, 4.0);
    assert!(sum.verification.exact_match);
}

#[test]
fn test_add_opposite_infinities_is_nan() {
    use crate::bits::Class;

    let sum = fp_add(0x7C00u16, 0xFC00u16, Precision::Half).unwrap();
    assert_eq!(sum.result.class, Class::Nan);
    assert_eq!(sum.result.bits(), 0x7E00);
}

#[test]
fn test_multiply_exact() {
    let six = fp_multiply(
        to_ieee754(2.0, Precision::Single).bits(),
        to_ieee754(3.0, Precision::Single).bits(),
        Precision::Single,
    )
    .unwrap();
    assert_eq!(six.result.value, 6.0);
    assert!(six.verification.exact_match);
}

#[test]
fn test_multiply_overflows_to_infinity() {
    use crate::bits::Class;

    // 65504 is the largest finite half; doubling it leaves the range.
    let prod = fp_multiply(0x7BFFu16, 0x4000u16, Precision::Half).unwrap();
    assert_eq!(prod.result.class, Class::Infinity);
    assert!(!prod.verification.exact_match);
}

#[test]
fn test_multiply_underflows_to_zero() {
    use crate::bits::Class;

    // Half of the smallest half subnormal ties to even zero.
    let prod = fp_multiply(0x0001u16, 0x3800u16, Precision::Half).unwrap();
    assert_eq!(prod.result.class, Class::Zero);
    assert!(!prod.verification.exact_match);
}

#[test]
fn test_exactness_is_judged_against_the_host() {
    // Quad could hold 1 + 2^-80 exactly, but the sum is computed in host
    // doubles, so verification compares against the double-rounded value.
    let one = to_ieee754(1.0, Precision::Quad);
    let tiny = to_ieee754(2f64.powi(-80), Precision::Quad);
    let sum = fp_add(one.bits(), tiny.bits(), Precision::Quad).unwrap();
    assert_eq!(sum.result.value, 1.0);
    assert!(sum.verification.exact_match);
}

#[test]
fn test_malformed_operand_fails() {
    assert!(matches!(
        fp_add("0xZZZZ", 0u16, Precision::Half),
        Err(Error::MalformedBits(_))
    ));
    assert!(fp_multiply(1u128 << 20, 0u32, Precision::Half).is_err());
}
