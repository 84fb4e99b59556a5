//! Round-to-nearest-even over scaled-integer mantissas.

/// Shift `value` right by `drop` bits and summarize the discarded fraction as
/// guard/round/sticky bits: guard is the most significant discarded bit,
/// round the next one, sticky the OR of everything below. Total for any
/// `drop`, including shifts past the word width (everything collapses into
/// the sticky bit).
pub(crate) fn shift_right_with_grs(value: u128, drop: u32) -> (u128, bool, bool, bool) {
    if drop == 0 {
        return (value, false, false, false);
    }
    let kept = if drop >= 128 { 0 } else { value >> drop };
    let guard = bit_is_set(value, drop - 1);
    let round = drop >= 2 && bit_is_set(value, drop - 2);
    let sticky = any_bit_below(value, drop.saturating_sub(2));
    (kept, guard, round, sticky)
}

fn bit_is_set(value: u128, index: u32) -> bool {
    index < 128 && (value >> index) & 1 == 1
}

/// True when any bit strictly below `index` is set.
fn any_bit_below(value: u128, index: u32) -> bool {
    if index >= 128 {
        value != 0
    } else {
        value & ((1u128 << index) - 1) != 0
    }
}

/// Round `mantissa` to nearest-even given the guard/round/sticky summary of
/// its discarded fraction. Rounds up on "more than half" (guard and any lower
/// bit) and on an exact tie when the mantissa is odd.
///
/// Returns the rounded mantissa and a carry-out flag. When the increment
/// overflows the fraction field (`mantissa + 1 == 2^frac_bits`) the mantissa
/// wraps to zero and the flag tells the caller to bump the exponent by one.
pub(crate) fn round_to_nearest_even(
    mantissa: u128,
    frac_bits: u32,
    guard: bool,
    round: bool,
    sticky: bool,
) -> (u128, bool) {
    let more_than_half = guard && (round || sticky);
    let exact_half = guard && !round && !sticky;
    let round_up = more_than_half || (exact_half && mantissa & 1 == 1);
    if !round_up {
        return (mantissa, false);
    }
    let rounded = mantissa + 1;
    if rounded == 1u128 << frac_bits {
        (0, true)
    } else {
        (rounded, false)
    }
}

#[test]
fn test_shift_right_grs() {
    // No shift discards nothing.
    assert_eq!(shift_right_with_grs(0xFF, 0), (0xFF, false, false, false));
    // A single discarded bit is the guard.
    assert_eq!(shift_right_with_grs(0b11, 1), (0b1, true, false, false));
    assert_eq!(shift_right_with_grs(0b10, 1), (0b1, false, false, false));
    // Two discarded bits: guard then round.
    assert_eq!(shift_right_with_grs(0b111, 2), (0b1, true, true, false));
    // Guard clear, lower bits land in round/sticky.
    assert_eq!(
        shift_right_with_grs(0b1000_0111, 4),
        (0b1000, false, true, true)
    );
    // Exact half: guard set, nothing below.
    assert_eq!(
        shift_right_with_grs(0b0101_1000, 4),
        (0b101, true, false, false)
    );
    // Shifts past the word width collapse into sticky.
    assert_eq!(shift_right_with_grs(0b1, 200), (0, false, false, true));
    // A shift of exactly the top bit's position keeps it as guard.
    assert_eq!(
        shift_right_with_grs(1u128 << 127, 128),
        (0, true, false, false)
    );
}

#[test]
fn test_round_to_nearest_even() {
    // More than half rounds up.
    assert_eq!(round_to_nearest_even(4, 10, true, true, false), (5, false));
    assert_eq!(round_to_nearest_even(4, 10, true, false, true), (5, false));
    assert_eq!(round_to_nearest_even(4, 10, true, true, true), (5, false));
    // Less than half rounds down, whatever sits below the guard.
    assert_eq!(round_to_nearest_even(4, 10, false, true, true), (4, false));
    assert_eq!(round_to_nearest_even(4, 10, false, false, false), (4, false));
    // An exact tie keeps the even mantissa and bumps the odd one.
    assert_eq!(round_to_nearest_even(4, 10, true, false, false), (4, false));
    assert_eq!(round_to_nearest_even(5, 10, true, false, false), (6, false));
    // Rounding up out of the fraction field signals a carry and wraps to 0.
    assert_eq!(round_to_nearest_even(0x3FF, 10, true, true, false), (0, true));
    assert_eq!(round_to_nearest_even(0x3FF, 10, true, false, false), (0, true));
    // The same all-ones mantissa stays put when below half.
    assert_eq!(
        round_to_nearest_even(0x3FF, 10, false, true, true),
        (0x3FF, false)
    );
}
