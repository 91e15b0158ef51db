//! Error types for bus decoding and planning.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// The top-level error type for treegen operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cannot plan a merge tree for bus '{0}': it has no channels")]
    EmptyBus(String),

    #[error("Cannot plan a merge tree for bus '{bus}': channel {index} has zero width")]
    ZeroWidth { bus: String, index: usize },

    #[error(
        "Cannot plan bus '{bus}' with divdp: subset-sum table needs {cells} cells (limit {limit})"
    )]
    TableTooLarge { bus: String, cells: u64, limit: u64 },

    #[error("Unknown divide strategy '{name}' (choices: {choices})")]
    UnknownStrategy { name: String, choices: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A packed bus record could not be decoded.
///
/// Every variant names the record field it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} comma-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field '{field}': '{value}' is not an unsigned integer")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}': malformed hex ({reason})")]
    InvalidHex { field: &'static str, reason: String },

    #[error(
        "field '{field}': {digits} hex digits cannot hold {count} entries of {unit} digits each"
    )]
    Length {
        field: &'static str,
        digits: usize,
        count: usize,
        unit: usize,
    },

    #[error("field '{field}': channel {index} has zero width")]
    ZeroWidth { field: &'static str, index: usize },

    #[error("field '{field}': name '{name}' {reason}")]
    InvalidName {
        field: &'static str,
        name: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_field() {
        let err = Error::Decode(DecodeError::InvalidHex {
            field: "width_hex",
            reason: "Invalid character 'z' at position 3".into(),
        });
        assert!(err.to_string().contains("width_hex"));
        assert!(err.to_string().contains("position 3"));
    }

    #[test]
    fn length_error_displays_unit() {
        let err = DecodeError::Length {
            field: "logb_name_hex",
            digits: 100,
            count: 2,
            unit: 64,
        };
        assert!(err.to_string().contains("100 hex digits"));
        assert!(err.to_string().contains("64 digits"));
    }
}
