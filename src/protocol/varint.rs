//! Varint and zig-zag helpers
//!
//! Unsigned LEB128: seven payload bits per byte, high bit set on every byte
//! except the last. Signed integers are zig-zag mapped first so that small
//! negative numbers stay short.

use bytes::BufMut;

use crate::error::{CarbonError, Result};

/// Longest encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Map a signed integer onto the unsigned range (`0, -1, 1, -2, ...` -> `0, 1, 2, 3, ...`)
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Append `value` as a varint
#[inline]
pub fn encode_varint<B: BufMut>(mut value: u64, buf: &mut B) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Decode a varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        let payload = (byte & 0x7F) as u64;
        // The tenth byte may only contribute the single top bit.
        if i == MAX_VARINT_LEN - 1 && payload > 1 {
            return Err(CarbonError::InvalidVarint { max_len: MAX_VARINT_LEN });
        }
        value |= payload << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= MAX_VARINT_LEN {
        Err(CarbonError::InvalidVarint { max_len: MAX_VARINT_LEN })
    } else {
        Err(CarbonError::underrun(bytes.len() + 1, bytes.len()))
    }
}

/// Number of bytes `value` occupies as a varint
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}
