use binfloat::{fp_add, fp_multiply, from_ieee754, to_ieee754, Class, Error, Precision};

#[track_caller]
fn check_decode_single(bits: u32, expected: f64, class: Class) {
    let out = from_ieee754(bits, Precision::Single).unwrap();
    assert_eq!(out.value, expected, "bits {bits:#010x}");
    assert_eq!(out.class, class, "bits {bits:#010x}");
}

#[track_caller]
fn check_encode(value: f64, precision: Precision, bits: u128) {
    let out = to_ieee754(value, precision);
    assert_eq!(out.bits(), bits, "value {value:e}");
}

#[test]
fn known_single_decodes() {
    check_decode_single(0x3F80_0000, 1.0, Class::Normal);
    check_decode_single(0xBF80_0000, -1.0, Class::Normal);
    check_decode_single(0x4080_0000, 4.0, Class::Normal);
    check_decode_single(0x3E20_0000, 0.15625, Class::Normal);
    check_decode_single(0x7F80_0000, f64::INFINITY, Class::Infinity);
    check_decode_single(0xFF80_0000, f64::NEG_INFINITY, Class::Infinity);

    let nan = from_ieee754(0x7FC0_0000u32, Precision::Single).unwrap();
    assert_eq!(nan.class, Class::Nan);
    assert!(nan.value.is_nan());
}

#[test]
fn known_single_encodes() {
    check_encode(2.0, Precision::Single, 0x4000_0000);
    check_encode(-2.0, Precision::Single, 0xC000_0000);
    check_encode(1.0, Precision::Single, 0x3F80_0000);
    check_encode(0.1, Precision::Single, 0x3DCC_CCCD);
    check_encode(f32::MAX as f64, Precision::Single, 0x7F7F_FFFF);
}

#[test]
fn single_subnormal_boundary() {
    // The smallest normal, the smallest subnormal, and below it.
    let min_normal = to_ieee754(2f64.powi(-126), Precision::Single);
    assert_eq!(min_normal.class, Class::Normal);
    assert_eq!(min_normal.bits(), 0x0080_0000);

    let min_sub = to_ieee754(2f64.powi(-149), Precision::Single);
    assert_eq!(min_sub.class, Class::Subnormal);
    assert_eq!(min_sub.fields.fraction, 1);

    let below = to_ieee754(2f64.powi(-150), Precision::Single);
    assert_eq!(below.class, Class::Zero);
    assert_eq!(below.bits(), 0);
}

#[test]
fn known_half_values() {
    // The largest finite half and the first magnitude that overflows.
    check_encode(65504.0, Precision::Half, 0x7BFF);
    assert_eq!(to_ieee754(65520.0, Precision::Half).class, Class::Infinity);

    check_encode(1.0, Precision::Half, 0x3C00);
    check_encode(-2.0, Precision::Half, 0xC000);
    assert_eq!(
        from_ieee754(0x3555u16, Precision::Half).unwrap().value,
        0.333251953125
    );
}

#[test]
fn known_double_values() {
    check_encode(0.1, Precision::Double, 0x3FB9_9999_9999_999A);
    check_encode(1.0, Precision::Double, 0x3FF0_0000_0000_0000);
    let out = from_ieee754(0x3FB9_9999_9999_999Au64, Precision::Double).unwrap();
    assert_eq!(out.value, 0.1);
    assert_eq!(out.pattern.hex, "0x3FB999999999999A");
}

#[test]
fn known_quad_values() {
    let one = to_ieee754(1.0, Precision::Quad);
    assert_eq!(one.bits(), 0x3FFF_u128 << 112);
    assert_eq!(one.fields.exponent, 16383);
    assert_eq!(one.pattern.binary.len(), 128);

    let decoded = from_ieee754(0x3FFF_u128 << 112, Precision::Quad).unwrap();
    assert_eq!(decoded.value, 1.0);
    assert_eq!(decoded.class, Class::Normal);
}

#[test]
fn add_one_and_a_half_plus_two_and_a_half() {
    let a = to_ieee754(1.5, Precision::Single);
    let b = to_ieee754(2.5, Precision::Single);
    let sum = fp_add(a.bits(), b.bits(), Precision::Single).unwrap();
    assert_eq!(sum.result.value, 4.0);
    assert_eq!(sum.result.class, Class::Normal);
    assert!(sum.verification.exact_match);
}

#[test]
fn multiply_reports_rounding() {
    // f32(0.1)² is not representable in single precision.
    let tenth = to_ieee754(0.1, Precision::Single);
    let prod = fp_multiply(tenth.bits(), tenth.bits(), Precision::Single).unwrap();
    assert!(!prod.verification.exact_match);
    assert_eq!(prod.result.value, (0.1f32 as f64 * 0.1f32 as f64) as f32 as f64);
}

#[test]
fn unknown_precision_name_fails() {
    assert!(matches!(
        "quadruple".parse::<Precision>(),
        Err(Error::UnknownPrecision(_))
    ));
    assert_eq!("quad".parse::<Precision>().unwrap(), Precision::Quad);
}

#[test]
fn text_inputs_round_trip() {
    let out = to_ieee754("2.0", Precision::Single);
    assert_eq!(out.bits(), 0x4000_0000);

    let back = from_ieee754(out.pattern.binary.as_str(), Precision::Single).unwrap();
    assert_eq!(back.value, 2.0);
    let back = from_ieee754(out.pattern.hex.as_str(), Precision::Single).unwrap();
    assert_eq!(back.value, 2.0);
}
