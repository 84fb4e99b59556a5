//! Raw bit patterns: assembly, disassembly, validation and printable forms.

use core::fmt::{self, Display};

use crate::error::Error;
use crate::format::Format;

/// Bit-pattern input accepted by the decoder: a raw unsigned integer, or a
/// text form (exact-width binary digits, or `0x`-prefixed hexadecimal).
#[derive(Debug, Clone, Copy)]
pub enum Bits<'a> {
    Raw(u128),
    Text(&'a str),
}

impl<'a> From<u16> for Bits<'a> {
    fn from(bits: u16) -> Self {
        Bits::Raw(bits as u128)
    }
}

impl<'a> From<u32> for Bits<'a> {
    fn from(bits: u32) -> Self {
        Bits::Raw(bits as u128)
    }
}

impl<'a> From<u64> for Bits<'a> {
    fn from(bits: u64) -> Self {
        Bits::Raw(bits as u128)
    }
}

impl<'a> From<u128> for Bits<'a> {
    fn from(bits: u128) -> Self {
        Bits::Raw(bits)
    }
}

impl<'a> From<&'a str> for Bits<'a> {
    fn from(text: &'a str) -> Self {
        Bits::Text(text)
    }
}

/// Validate a pattern input against the format and return the raw integer.
pub(crate) fn parse_bits(input: Bits<'_>, fmt: Format) -> Result<u128, Error> {
    match input {
        Bits::Raw(bits) => {
            if bits > fmt.pattern_mask() {
                return Err(Error::MalformedBits(format!(
                    "integer {:#x} does not fit in {} bits",
                    bits,
                    fmt.total_bits()
                )));
            }
            Ok(bits)
        }
        Bits::Text(text) => parse_bit_text(text, fmt),
    }
}

fn parse_bit_text(text: &str, fmt: Format) -> Result<u128, Error> {
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        // Validate the alphabet first: from_str_radix would tolerate a `+`.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::MalformedBits(format!(
                "`{text}` contains non-hexadecimal digits"
            )));
        }
        let bits = u128::from_str_radix(digits, 16).map_err(|_| {
            Error::MalformedBits(format!("hex value `{text}` exceeds 128 bits"))
        })?;
        if bits > fmt.pattern_mask() {
            return Err(Error::MalformedBits(format!(
                "hex value `{text}` does not fit in {} bits",
                fmt.total_bits()
            )));
        }
        Ok(bits)
    } else {
        let total = fmt.total_bits() as usize;
        if text.len() != total {
            return Err(Error::MalformedBits(format!(
                "binary pattern `{text}` must be exactly {total} digits, got {}",
                text.len()
            )));
        }
        if !text.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::MalformedBits(format!(
                "`{text}` contains non-binary digits"
            )));
        }
        // Width and alphabet were checked above, so this cannot fail.
        u128::from_str_radix(text, 2)
            .map_err(|_| Error::MalformedBits(format!("`{text}` is not a binary pattern")))
    }
}

/// Five-way classification of a bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Class {
    Zero,
    Subnormal,
    Normal,
    Infinity,
    Nan,
}

impl Class {
    /// Returns the lowercase classification name.
    pub const fn name(&self) -> &'static str {
        match self {
            Class::Zero => "zero",
            Class::Subnormal => "subnormal",
            Class::Normal => "normal",
            Class::Infinity => "infinity",
            Class::Nan => "nan",
        }
    }

    pub const fn is_zero(&self) -> bool {
        matches!(self, Class::Zero)
    }

    pub const fn is_normal(&self) -> bool {
        matches!(self, Class::Normal)
    }

    pub const fn is_subnormal(&self) -> bool {
        matches!(self, Class::Subnormal)
    }

    pub const fn is_infinity(&self) -> bool {
        matches!(self, Class::Infinity)
    }

    pub const fn is_nan(&self) -> bool {
        matches!(self, Class::Nan)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The disassembled fields of one pattern: sign, biased exponent and
/// fraction, consistent with one format's widths. Built fresh on every
/// encode/decode call and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitFields {
    /// True when the sign bit is set (negative).
    pub sign: bool,
    /// The stored (biased) exponent.
    pub exponent: u32,
    /// The stored fraction, without the implicit leading bit.
    pub fraction: u128,
}

impl BitFields {
    /// Classify the fields: an all-ones exponent splits infinity/nan on the
    /// fraction, a zero exponent splits zero/subnormal, everything else is a
    /// normal number.
    pub fn classify(&self, fmt: Format) -> Class {
        if self.exponent == fmt.exp_max() {
            if self.fraction == 0 {
                Class::Infinity
            } else {
                Class::Nan
            }
        } else if self.exponent == 0 {
            if self.fraction == 0 {
                Class::Zero
            } else {
                Class::Subnormal
            }
        } else {
            Class::Normal
        }
    }

    /// The unbiased exponent: stored − bias for normals, and the fixed
    /// 1 − bias that zero and subnormal patterns scale by.
    pub fn unbiased_exponent(&self, fmt: Format) -> i32 {
        if self.exponent == 0 {
            fmt.min_normal_exp()
        } else {
            self.exponent as i32 - fmt.bias()
        }
    }
}

/// Assemble a raw pattern from fields. The caller guarantees the ranges; the
/// encoder and rounding engine only ever produce in-range fields.
pub(crate) fn pack(fields: BitFields, fmt: Format) -> u128 {
    debug_assert!(fields.exponent <= fmt.exp_max());
    debug_assert!(fields.fraction <= fmt.frac_mask());
    ((fields.sign as u128) << (fmt.total_bits() - 1))
        | ((fields.exponent as u128) << fmt.fraction_bits())
        | (fields.fraction & fmt.frac_mask())
}

/// Disassemble a validated raw pattern into fields.
pub(crate) fn split(bits: u128, fmt: Format) -> BitFields {
    BitFields {
        sign: (bits >> (fmt.total_bits() - 1)) & 1 == 1,
        exponent: ((bits >> fmt.fraction_bits()) & fmt.exp_max() as u128) as u32,
        fraction: bits & fmt.frac_mask(),
    }
}

/// Validate and disassemble a pattern input.
pub(crate) fn unpack(input: Bits<'_>, fmt: Format) -> Result<BitFields, Error> {
    Ok(split(parse_bits(input, fmt)?, fmt))
}

/// Printable forms of one packed pattern. Hex digits are uppercase and
/// zero-padded to the nibble-rounded width; the binary string is zero-padded
/// to the exact width; the three substrings slice the binary string at the
/// fixed field offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitPattern {
    /// The raw packed integer.
    pub bits: u128,
    pub hex: String,
    pub binary: String,
    pub sign_bit: String,
    pub exponent_bits: String,
    pub fraction_bits: String,
}

/// Render the printable forms of a packed pattern.
pub(crate) fn format_bits(bits: u128, fmt: Format) -> BitPattern {
    let binary = format!("{bits:0width$b}", width = fmt.total_bits() as usize);
    let hex = format!("0x{bits:0width$X}", width = fmt.hex_width());
    let exp_end = 1 + fmt.exponent_bits() as usize;
    BitPattern {
        bits,
        hex,
        sign_bit: binary[..1].to_string(),
        exponent_bits: binary[1..exp_end].to_string(),
        fraction_bits: binary[exp_end..].to_string(),
        binary,
    }
}

#[test]
fn test_pack_split_fields() {
    use crate::format::{HALF, QUAD, SINGLE};

    // 1.0 in single precision: sign 0, exponent 127, fraction 0.
    let one = BitFields {
        sign: false,
        exponent: 127,
        fraction: 0,
    };
    assert_eq!(pack(one, SINGLE), 0x3F80_0000);
    assert_eq!(split(0x3F80_0000, SINGLE), one);

    // -2.0 in half precision.
    let neg_two = BitFields {
        sign: true,
        exponent: 16,
        fraction: 0,
    };
    assert_eq!(pack(neg_two, HALF), 0xC000);
    assert_eq!(split(0xC000, HALF), neg_two);

    // The quad sign bit lands on bit 127.
    let neg_zero = BitFields {
        sign: true,
        exponent: 0,
        fraction: 0,
    };
    assert_eq!(pack(neg_zero, QUAD), 1u128 << 127);

    // Split and pack are inverses over arbitrary patterns.
    for bits in [0u128, 1, 0x7FFF, 0xDEAD_BEEF, u128::MAX] {
        for fmt in [HALF, SINGLE, QUAD] {
            let masked = bits & fmt.pattern_mask();
            assert_eq!(pack(split(masked, fmt), fmt), masked);
        }
    }
}

#[test]
fn test_classify_table() {
    use crate::format::SINGLE;

    let class = |exponent, fraction| {
        BitFields {
            sign: false,
            exponent,
            fraction,
        }
        .classify(SINGLE)
    };
    assert_eq!(class(0, 0), Class::Zero);
    assert_eq!(class(0, 1), Class::Subnormal);
    assert_eq!(class(0, SINGLE.frac_mask()), Class::Subnormal);
    assert_eq!(class(1, 0), Class::Normal);
    assert_eq!(class(254, SINGLE.frac_mask()), Class::Normal);
    assert_eq!(class(255, 0), Class::Infinity);
    assert_eq!(class(255, 1), Class::Nan);
    assert_eq!(class(255, 1 << 22), Class::Nan);
}

#[test]
fn test_unbiased_exponent() {
    use crate::format::{DOUBLE, SINGLE};

    let fields = |exponent| BitFields {
        sign: false,
        exponent,
        fraction: 0,
    };
    assert_eq!(fields(127).unbiased_exponent(SINGLE), 0);
    assert_eq!(fields(254).unbiased_exponent(SINGLE), 127);
    // Zero and subnormal patterns scale by the fixed minimum.
    assert_eq!(fields(0).unbiased_exponent(SINGLE), -126);
    assert_eq!(fields(0).unbiased_exponent(DOUBLE), -1022);
}

#[test]
fn test_parse_bits_forms() {
    use crate::format::{HALF, SINGLE};

    let parse = |input: Bits<'_>| parse_bits(input, SINGLE).unwrap();
    assert_eq!(parse(Bits::from(0x3F80_0000u32)), 0x3F80_0000);
    assert_eq!(parse(Bits::from("0x3F800000")), 0x3F80_0000);
    // Hex digits and the prefix tolerate either case.
    assert_eq!(parse(Bits::from("0x3f800000")), 0x3F80_0000);
    assert_eq!(parse(Bits::from("0X3F800000")), 0x3F80_0000);
    assert_eq!(
        parse(Bits::from("00111111100000000000000000000000")),
        0x3F80_0000
    );
    // Short hex is allowed; binary must be exact width.
    assert_eq!(parse_bits(Bits::from("0x1"), HALF).unwrap(), 1);
    assert!(matches!(
        parse_bits(Bits::from("1010"), HALF),
        Err(Error::MalformedBits(_))
    ));
}

#[test]
fn test_parse_bits_rejects_garbage() {
    use crate::format::{HALF, QUAD, SINGLE};

    let half_err = |text: &str| {
        assert!(
            matches!(parse_bits(Bits::from(text), HALF), Err(Error::MalformedBits(_))),
            "`{text}` should be rejected"
        );
    };
    half_err("0x");
    half_err("0x12G4");
    half_err("0x+12");
    half_err("0x1FFFF"); // 17 bits into a 16-bit format
    half_err("1111000011112222"); // right width, wrong alphabet
    half_err("111100001111000"); // one digit short
    half_err(" 0x1234"); // stray whitespace
    half_err("");

    // Out-of-range integers are rejected, in-range ones pass.
    assert!(parse_bits(Bits::from(0xFFFFu32), HALF).is_ok());
    assert!(matches!(
        parse_bits(Bits::from(0x1_0000u32), HALF),
        Err(Error::MalformedBits(_))
    ));
    assert!(matches!(
        parse_bits(Bits::from(0x1_0000_0000u64), SINGLE),
        Err(Error::MalformedBits(_))
    ));

    // 33 nibbles overflow even the widest format.
    assert!(matches!(
        parse_bits(
            Bits::from("0x100000000000000000000000000000000"),
            QUAD
        ),
        Err(Error::MalformedBits(_))
    ));
    assert!(parse_bits(Bits::from(u128::MAX), QUAD).is_ok());
}

#[test]
fn test_format_bits_widths() {
    use crate::format::{HALF, QUAD, SINGLE};

    let pattern = format_bits(0x3F80_0000, SINGLE);
    assert_eq!(pattern.hex, "0x3F800000");
    assert_eq!(pattern.binary, "00111111100000000000000000000000");
    assert_eq!(pattern.sign_bit, "0");
    assert_eq!(pattern.exponent_bits, "01111111");
    assert_eq!(pattern.fraction_bits, "00000000000000000000000");
    assert_eq!(pattern.bits, 0x3F80_0000);

    let pattern = format_bits(1, HALF);
    assert_eq!(pattern.hex, "0x0001");
    assert_eq!(pattern.binary, "0000000000000001");
    assert_eq!(pattern.sign_bit, "0");
    assert_eq!(pattern.exponent_bits, "00000");
    assert_eq!(pattern.fraction_bits, "0000000001");

    let pattern = format_bits(u128::MAX, QUAD);
    assert_eq!(pattern.hex.len(), 2 + 32);
    assert_eq!(pattern.binary.len(), 128);
    assert_eq!(pattern.sign_bit, "1");
    assert_eq!(pattern.exponent_bits.len(), 15);
    assert_eq!(pattern.fraction_bits.len(), 112);
}
