use crate::bits::{BitFields, BitPattern, Class};
use crate::format::Precision;

/// Rounding metadata attached to encode results, so callers can see what the
/// rounding engine did to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundingInfo {
    /// The unbiased binary exponent of the input magnitude.
    pub binary_exponent: i32,
    /// The biased exponent before any rounding carry.
    pub pre_round_exponent: u32,
    /// The truncated integer mantissa before rounding.
    pub pre_round_mantissa: u128,
    /// Whether mantissa rounding overflowed the fraction field and carried
    /// into the exponent.
    pub exponent_carry: bool,
}

/// The result of one encode or decode call. Plain data with no identity:
/// every call builds a fresh, independent value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecResult {
    /// The format this pattern belongs to.
    pub precision: Precision,
    /// The numeric value the bit pattern represents: exactly what decoding
    /// the bits yields, not the pre-rounding input. Exact through double
    /// precision; quad patterns are rounded to the nearest host double.
    pub value: f64,
    /// Five-way classification of the pattern.
    pub class: Class,
    /// The disassembled sign/exponent/fraction fields.
    pub fields: BitFields,
    /// Printable forms of the packed pattern.
    pub pattern: BitPattern,
    /// Rounding metadata; present on encode results only.
    pub rounding: Option<RoundingInfo>,
    /// The signed input value handed to the encoder, echoed back for error
    /// reporting. `None` on decode results and on literal recoveries where
    /// no numeric value exists.
    pub original: Option<f64>,
    /// Human-readable note set when an invalid decimal literal was recovered
    /// into this `nan` result.
    pub reason: Option<String>,
}

impl CodecResult {
    /// The raw packed pattern.
    pub fn bits(&self) -> u128 {
        self.pattern.bits
    }
}
