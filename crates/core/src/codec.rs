//! Packed hex payloads of a bus record.
//!
//! A payload is a hex string holding `count` fixed-size units. Unit `i`
//! (0-based) is stored at the *end* of the string: unit 0 occupies the last
//! `unit` hex digits, unit 1 the digits before it, and so on. Inside a unit
//! bytes are big-endian.
//!
//! ```text
//!  width_hex = "00000024" "00000020"
//!               leaf 1     leaf 0
//! ```
//!
//! Decoding converts the string to bytes once and walks fixed-size chunks
//! from the back, so no substring arithmetic is involved.

use crate::error::DecodeError;

/// Bits of one channel width entry.
pub const CHANNEL_WIDTH_BITS: usize = 32;

/// Bits of one channel name entry.
pub const CHANNEL_NAME_BITS: usize = 32 * 8;

const WIDTH_BYTES: usize = CHANNEL_WIDTH_BITS / 8;
const NAME_BYTES: usize = CHANNEL_NAME_BITS / 8;

/// Decode `count` channel widths from a packed payload.
pub fn decode_widths(
    field: &'static str,
    payload: &str,
    count: usize,
) -> Result<Vec<u32>, DecodeError> {
    let bytes = unpack(field, payload, count, WIDTH_BYTES)?;
    Ok(bytes
        .rchunks_exact(WIDTH_BYTES)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode `count` channel names from a packed payload.
///
/// Zero bytes anywhere in a name slot are dropped; they do not terminate
/// the name.
pub fn decode_names(
    field: &'static str,
    payload: &str,
    count: usize,
) -> Result<Vec<String>, DecodeError> {
    let bytes = unpack(field, payload, count, NAME_BYTES)?;
    Ok(bytes
        .rchunks_exact(NAME_BYTES)
        .map(|slot| {
            slot.iter()
                .filter(|&&b| b != 0)
                .map(|&b| char::from(b))
                .collect()
        })
        .collect())
}

/// Encode channel widths into a packed payload (leaf 0 last).
pub fn encode_widths(widths: &[u32]) -> String {
    let bytes: Vec<u8> = widths
        .iter()
        .rev()
        .flat_map(|w| w.to_be_bytes())
        .collect();
    hex::encode(bytes)
}

/// Encode channel names into a packed payload (name 0 last).
///
/// Names are right-aligned in their slot and padded with zero bytes. A name
/// must be ASCII, non-NUL and at most 32 bytes long.
pub fn encode_names(field: &'static str, names: &[impl AsRef<str>]) -> Result<String, DecodeError> {
    let mut bytes = Vec::with_capacity(names.len() * NAME_BYTES);
    for name in names.iter().rev() {
        let name = name.as_ref();
        if !name.is_ascii() || name.bytes().any(|b| b == 0) {
            return Err(DecodeError::InvalidName {
                field,
                name: name.to_string(),
                reason: "must be non-NUL ASCII".into(),
            });
        }
        if name.len() > NAME_BYTES {
            return Err(DecodeError::InvalidName {
                field,
                name: name.to_string(),
                reason: format!("is longer than {NAME_BYTES} bytes"),
            });
        }
        bytes.extend(std::iter::repeat_n(0u8, NAME_BYTES - name.len()));
        bytes.extend_from_slice(name.as_bytes());
    }
    Ok(hex::encode(bytes))
}

/// Validate the payload size and convert it to bytes.
fn unpack(
    field: &'static str,
    payload: &str,
    count: usize,
    unit_bytes: usize,
) -> Result<Vec<u8>, DecodeError> {
    let payload = payload.trim();
    let unit = unit_bytes * 2;
    if payload.len() != count * unit {
        return Err(DecodeError::Length {
            field,
            digits: payload.len(),
            count,
            unit,
        });
    }
    hex::decode(payload).map_err(|e| DecodeError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}
