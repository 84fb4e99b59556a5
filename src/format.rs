use core::fmt::{self, Display};
use core::str::FromStr;

use crate::error::Error;

/// The four supported binary interchange formats, used as the registry key.
/// Parsing a name (`"half"`, `"single"`, `"double"`, `"quad"`) that is not in
/// the registry fails with [`Error::UnknownPrecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Precision {
    Half,
    Single,
    Double,
    Quad,
}

impl Precision {
    /// All registry entries, in increasing width order.
    pub const ALL: [Precision; 4] = [
        Precision::Half,
        Precision::Single,
        Precision::Double,
        Precision::Quad,
    ];

    /// Returns the field layout of this format.
    pub const fn format(&self) -> Format {
        match self {
            Precision::Half => HALF,
            Precision::Single => SINGLE,
            Precision::Double => DOUBLE,
            Precision::Quad => QUAD,
        }
    }

    /// Returns the canonical lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Precision::Half => "half",
            Precision::Single => "single",
            Precision::Double => "double",
            Precision::Quad => "quad",
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "half" => Ok(Precision::Half),
            "single" => Ok(Precision::Single),
            "double" => Ok(Precision::Double),
            "quad" => Ok(Precision::Quad),
            _ => Err(Error::UnknownPrecision(name.to_string())),
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field layout of one interchange format: the stored exponent and fraction
/// widths, with the derived constants (bias, all-ones exponent, masks)
/// computed from them.
/// See IEEE 754-2019 section 3.4 and table 3.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    exponent_bits: u32,
    fraction_bits: u32,
}

/// binary16: 16 bits, 5-bit exponent, 10-bit fraction, bias 15.
pub const HALF: Format = Format::new(5, 10);
/// binary32: 32 bits, 8-bit exponent, 23-bit fraction, bias 127.
pub const SINGLE: Format = Format::new(8, 23);
/// binary64: 64 bits, 11-bit exponent, 52-bit fraction, bias 1023.
pub const DOUBLE: Format = Format::new(11, 52);
/// binary128: 128 bits, 15-bit exponent, 112-bit fraction, bias 16383.
pub const QUAD: Format = Format::new(15, 112);

impl Format {
    pub(crate) const fn new(exponent_bits: u32, fraction_bits: u32) -> Self {
        Format {
            exponent_bits,
            fraction_bits,
        }
    }

    /// The number of bits in the stored exponent field.
    pub const fn exponent_bits(&self) -> u32 {
        self.exponent_bits
    }

    /// The number of bits in the stored fraction field (the mantissa without
    /// the implicit leading bit).
    pub const fn fraction_bits(&self) -> u32 {
        self.fraction_bits
    }

    /// Total storage width: sign + exponent + fraction.
    pub const fn total_bits(&self) -> u32 {
        1 + self.exponent_bits + self.fraction_bits
    }

    /// The exponent bias, as a positive number.
    pub const fn bias(&self) -> i32 {
        (1 << (self.exponent_bits - 1)) - 1
    }

    /// The all-ones stored exponent, reserved for infinities and NaNs.
    pub const fn exp_max(&self) -> u32 {
        (1 << self.exponent_bits) - 1
    }

    /// A mask of `fraction_bits` ones.
    pub const fn frac_mask(&self) -> u128 {
        (1 << self.fraction_bits) - 1
    }

    /// A mask covering the whole stored width.
    pub const fn pattern_mask(&self) -> u128 {
        if self.total_bits() >= 128 {
            u128::MAX
        } else {
            (1 << self.total_bits()) - 1
        }
    }

    /// The smallest unbiased exponent a normal number can carry.
    pub const fn min_normal_exp(&self) -> i32 {
        1 - self.bias()
    }

    /// Hex digits needed to print a full pattern (nibble-rounded).
    pub(crate) const fn hex_width(&self) -> usize {
        (self.total_bits() as usize + 3) / 4
    }
}

#[test]
fn test_format_table() {
    // Width / exponent / fraction / bias, per IEEE 754-2019 table 3.5.
    assert_eq!(HALF.total_bits(), 16);
    assert_eq!(HALF.bias(), 15);
    assert_eq!(SINGLE.total_bits(), 32);
    assert_eq!(SINGLE.bias(), 127);
    assert_eq!(SINGLE.exp_max(), 255);
    assert_eq!(DOUBLE.total_bits(), 64);
    assert_eq!(DOUBLE.bias(), 1023);
    assert_eq!(QUAD.total_bits(), 128);
    assert_eq!(QUAD.bias(), 16383);
    assert_eq!(QUAD.frac_mask(), (1u128 << 112) - 1);
    assert_eq!(QUAD.pattern_mask(), u128::MAX);

    for precision in Precision::ALL {
        let fmt = precision.format();
        assert_eq!(
            fmt.total_bits(),
            1 + fmt.exponent_bits() + fmt.fraction_bits()
        );
        assert_eq!(fmt.bias(), (1 << (fmt.exponent_bits() - 1)) - 1);
        assert_eq!(fmt.min_normal_exp(), 1 - fmt.bias());
    }
}

#[test]
fn test_precision_names() {
    assert_eq!("half".parse::<Precision>().unwrap(), Precision::Half);
    assert_eq!("single".parse::<Precision>().unwrap(), Precision::Single);
    assert_eq!("double".parse::<Precision>().unwrap(), Precision::Double);
    assert_eq!("quad".parse::<Precision>().unwrap(), Precision::Quad);
    assert!(matches!(
        "octuple".parse::<Precision>(),
        Err(Error::UnknownPrecision(_))
    ));
    // Names are case sensitive.
    assert!("Half".parse::<Precision>().is_err());
    assert_eq!(Precision::Double.to_string(), "double");
}

#[test]
fn test_hex_width() {
    assert_eq!(HALF.hex_width(), 4);
    assert_eq!(SINGLE.hex_width(), 8);
    assert_eq!(DOUBLE.hex_width(), 16);
    assert_eq!(QUAD.hex_width(), 32);
}
