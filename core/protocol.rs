// Bus frame codec - pure data transformations, no I/O
//
// Frame layout:
//   [4-byte length][1-byte function code][payload...]
// where length counts the function code byte plus the payload.
use crate::error::{ProtocolError, Result};
use crate::types::{FunctionCode, Status};

pub const LENGTH_HEADER_SIZE: usize = 4;
pub const FUNCTION_CODE_OFFSET: usize = LENGTH_HEADER_SIZE;
pub const PAYLOAD_OFFSET: usize = FUNCTION_CODE_OFFSET + 1;

// Positional weight of every length byte. The bus weights digits by 0xff, not
// 0x100. This looks like a bug but the existing peer computes sizes this way,
// so it has to stay for wire compatibility.
pub const LENGTH_BASE: u64 = 0xff;

/// Encode `n` into `width` bytes, most significant digit first, using the
/// 255-weighted positional scheme of the bus.
pub fn length_prefix(n: u64, width: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; width];
    let mut rest = n;
    for digit in bytes.iter_mut().rev() {
        *digit = (rest % LENGTH_BASE) as u8;
        rest /= LENGTH_BASE;
    }
    if rest != 0 {
        return Err(ProtocolError::LengthOverflow {
            value: n as usize,
            width,
        });
    }
    Ok(bytes)
}

/// Inverse of [`length_prefix`]: `sum(b_i * 255^(w-1-i))`.
pub fn decode_length(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc * LENGTH_BASE + b as u64)
}

/// Build a complete request frame.
pub fn encode_frame(function: FunctionCode, payload: &[u8]) -> Result<Vec<u8>> {
    let content_len = 1 + payload.len();
    let mut bytes = Vec::with_capacity(LENGTH_HEADER_SIZE + content_len);
    bytes.extend_from_slice(&length_prefix(content_len as u64, LENGTH_HEADER_SIZE)?);
    bytes.push(function.as_u8());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// Validate the envelope of a received frame and return its payload.
///
/// The whole buffer is treated as one frame; nothing past it is read.
pub fn decode_frame(bytes: &[u8], expected: FunctionCode) -> Result<Vec<u8>> {
    if bytes.len() < PAYLOAD_OFFSET {
        return Err(ProtocolError::FrameTooShort {
            expected: PAYLOAD_OFFSET,
            actual: bytes.len(),
        });
    }

    let actual = bytes[FUNCTION_CODE_OFFSET];
    if actual != expected.as_u8() {
        return Err(ProtocolError::FunctionCodeMismatch { expected, actual });
    }

    Ok(bytes[PAYLOAD_OFFSET..].to_vec())
}

/// Length announced by the header of a received frame.
pub fn declared_length(bytes: &[u8]) -> Option<u64> {
    bytes.get(..LENGTH_HEADER_SIZE).map(decode_length)
}

/// True if the header length equals the function code plus payload actually received.
pub fn frame_length_matches(bytes: &[u8]) -> bool {
    match declared_length(bytes) {
        Some(len) => len == (bytes.len() - LENGTH_HEADER_SIZE) as u64,
        None => false,
    }
}

/// Accept only the SUCCESS marker as the payload of `function`'s reply.
pub fn expect_status(function: FunctionCode, payload: &[u8]) -> Result<()> {
    match Status::from_payload(payload) {
        Some(Status::Success) => Ok(()),
        _ => Err(ProtocolError::UnexpectedStatus {
            function,
            payload: payload.to_vec(),
        }),
    }
}

/// Count followed by comma-terminated names, as used for flat name lists.
pub fn encode_name_list<S: AsRef<str>>(names: &[S], count_width: usize) -> Result<Vec<u8>> {
    let mut bytes = length_prefix(names.len() as u64, count_width)?;
    for name in names {
        let name = name.as_ref();
        if name.contains(',') {
            return Err(ProtocolError::DelimiterInName(name.to_string()));
        }
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(b',');
    }
    Ok(bytes)
}
