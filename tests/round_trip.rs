use binfloat::{from_ieee754, to_ieee754, Class, Precision};

#[track_caller]
fn round_trip(value: f64, precision: Precision) {
    let encoded = to_ieee754(value, precision);
    let decoded = from_ieee754(encoded.bits(), precision).unwrap();

    assert_eq!(decoded.value, encoded.value, "value {value:e}");
    assert_eq!(decoded.class, encoded.class, "value {value:e}");
    assert_eq!(decoded.fields, encoded.fields);

    // Re-encoding the decoded value reproduces the pattern.
    let again = to_ieee754(decoded.value, precision);
    assert_eq!(again.bits(), encoded.bits(), "value {value:e}");
}

fn ladder(seed: f64, precision: Precision) {
    // Walk up by doubling until the encoding overflows.
    let mut val = seed;
    loop {
        if to_ieee754(val, precision).class == Class::Infinity {
            break;
        }
        round_trip(val, precision);
        round_trip(-val, precision);
        val *= 2.0;
        if val.is_infinite() {
            break;
        }
    }

    // Walk down by halving until the encoding degrades to zero, passing
    // through the whole subnormal range on the way.
    let mut val = seed;
    loop {
        if to_ieee754(val, precision).class == Class::Zero {
            break;
        }
        round_trip(val, precision);
        round_trip(-val, precision);
        val *= 0.5;
        if val == 0.0 {
            break;
        }
    }
}

#[test]
fn test_power_ladders() {
    for precision in Precision::ALL {
        // 1.0 stays exact at every step; 1.5 and 1.75 keep low mantissa bits
        // set through the subnormal range.
        ladder(1.0, precision);
        ladder(1.5, precision);
        ladder(1.75, precision);
    }
}

#[test]
fn test_inexact_ladder() {
    // 0.3 is inexact in every format; the round trip still holds because it
    // compares against the encoded value, not the input.
    for precision in Precision::ALL {
        ladder(0.3, precision);
    }
}

#[test]
fn test_specials_round_trip() {
    for precision in Precision::ALL {
        round_trip(0.0, precision);
        round_trip(-0.0, precision);
        round_trip(f64::INFINITY, precision);
        round_trip(f64::NEG_INFINITY, precision);

        let nan = to_ieee754(f64::NAN, precision);
        let back = from_ieee754(nan.bits(), precision).unwrap();
        assert_eq!(back.class, Class::Nan);
        assert!(back.value.is_nan());
    }
}

#[test]
fn test_random_patterns_reencode_exactly() {
    // Half, single and double patterns decode to an exact host double, so
    // re-encoding the decoded value must reproduce the pattern bit for bit.
    // NaN payloads are skipped: the encoder canonicalizes them.
    let mut state = 0x243F_6A88_85A3_08D3u64;
    for _ in 0..20000 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        for precision in [Precision::Half, Precision::Single, Precision::Double] {
            let bits = (state as u128) & precision.format().pattern_mask();
            let out = from_ieee754(bits, precision).unwrap();
            if out.class == Class::Nan {
                continue;
            }
            assert_eq!(
                to_ieee754(out.value, precision).bits(),
                bits,
                "{precision} bits {bits:#x}"
            );
        }
    }
}

#[test]
fn test_random_quad_patterns_decode_totally() {
    // Quad decoding can lose precision against the host double, but it never
    // fails and always lands on one of the five classifications.
    let mut state = 0xB7E1_5162_8AED_2A6Au64;
    for _ in 0..20000 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let bits = ((state as u128) << 64) | state.rotate_left(17) as u128;
        let out = from_ieee754(bits, Precision::Quad).unwrap();
        match out.class {
            Class::Zero => assert_eq!(out.value, 0.0),
            Class::Subnormal | Class::Normal => assert!(!out.value.is_nan()),
            Class::Infinity => assert!(out.value.is_infinite()),
            Class::Nan => assert!(out.value.is_nan()),
        }
        assert_eq!(out.fields.sign, bits >> 127 == 1);
    }
}
