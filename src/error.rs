use thiserror::Error;

/// Errors returned by the fallible codec entry points.
///
/// Unparseable decimal literals are deliberately not represented here: the
/// encoder recovers them into a `nan`-classified result carrying a reason
/// string, so the decimal-entry path always produces a displayable record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The precision name is not one of the recognized formats.
    #[error("unknown precision `{0}`, expected one of: half, single, double, quad")]
    UnknownPrecision(String),

    /// A bit pattern that does not describe a value of the requested format:
    /// wrong-length binary text, characters outside the digit alphabet, or an
    /// integer wider than the format.
    #[error("malformed bit pattern: {0}")]
    MalformedBits(String),
}
