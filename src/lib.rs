mod arithmetic;
mod bits;
mod decode;
mod encode;
mod error;
mod format;
mod result;
mod round;
#[cfg(test)]
mod utils;

pub use self::arithmetic::{fp_add, fp_multiply, ArithResult, Verification};
pub use self::bits::{BitFields, BitPattern, Bits, Class};
pub use self::decode::from_ieee754;
pub use self::encode::{to_ieee754, Decimal};
pub use self::error::Error;
pub use self::format::{Format, Precision, DOUBLE, HALF, QUAD, SINGLE};
pub use self::result::{CodecResult, RoundingInfo};
