//! Lowercase hex encoding for keys, seeds and proof values.

use thiserror::Error;

/// Hex decoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// The input has an odd number of characters.
    #[error("hex string must have even length, got {0}")]
    OddLength(usize),

    /// A character pair is not valid hex.
    #[error("invalid hex at position {0}")]
    InvalidDigit(usize),

    /// The decoded length does not match what the caller expected.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Expected byte count.
        expected: usize,
        /// Decoded byte count.
        actual: usize,
    },
}

/// Encode bytes as a lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string. Surrounding whitespace is ignored, case is not.
pub fn decode(hex: &str) -> Result<Vec<u8>, HexError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(HexError::OddLength(hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or(HexError::InvalidDigit(i))
        })
        .collect()
}

/// Decode a hex string into a fixed-size array.
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], HexError> {
    let bytes = decode(hex)?;
    bytes.try_into().map_err(|v: Vec<u8>| HexError::WrongLength {
        expected: N,
        actual: v.len(),
    })
}

/// First four bytes as hex, for `Debug` output.
pub(crate) fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}
