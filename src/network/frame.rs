//! Transport framing
//!
//! Wraps one encoded Carbon struct for the socket.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬────────────┬──────────┬──────────┬─────────────────────┐
//! │ Kind (1) │ TypeId (1) │ Len (4)  │ CRC (4)  │       Payload       │
//! └──────────┴────────────┴──────────┴──────────┴─────────────────────┘
//! ```
//!
//! ### Kinds
//! - 0x01: REQUEST - Payload: encoded request struct
//! - 0x02: REPLY   - Payload: encoded reply struct
//! - 0x03: ERROR   - Payload: UTF-8 error message

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::CodecConfig;
use crate::error::{CarbonError, Result};
use crate::protocol::{serialize_message, CarbonMessage, CarbonRequest};

/// Header size: kind (1) + type id (1) + length (4) + crc (4)
pub const FRAME_HEADER_SIZE: usize = 10;

/// Frame kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Request = 0x01,
    Reply = 0x02,
    Error = 0x03,
}

impl TryFrom<u8> for FrameKind {
    type Error = CarbonError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(FrameKind::Request),
            0x02 => Ok(FrameKind::Reply),
            0x03 => Ok(FrameKind::Error),
            _ => Err(CarbonError::Protocol(format!(
                "Unknown frame kind: 0x{:02x}",
                byte
            ))),
        }
    }
}

/// One message on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,

    /// Request type the frame belongs to (see `CarbonRequest::TYPE_ID`)
    pub type_id: u8,

    pub payload: Bytes,
}

impl Frame {
    /// Frame an encoded request
    pub fn request<R: CarbonRequest>(request: &R, codec: &CodecConfig) -> Result<Self> {
        Ok(Self {
            kind: FrameKind::Request,
            type_id: R::TYPE_ID,
            payload: serialize_message(request, codec)?.freeze(),
        })
    }

    /// Frame an encoded reply to request type `type_id`
    pub fn reply<M: CarbonMessage>(type_id: u8, reply: &M, codec: &CodecConfig) -> Result<Self> {
        Ok(Self {
            kind: FrameKind::Reply,
            type_id,
            payload: serialize_message(reply, codec)?.freeze(),
        })
    }

    /// Frame a protocol error for request type `type_id`
    pub fn error(type_id: u8, message: &str) -> Self {
        Self {
            kind: FrameKind::Error,
            type_id,
            payload: Bytes::copy_from_slice(message.as_bytes()),
        }
    }

    /// Error text of an `Error` frame
    pub fn error_message(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode a frame to bytes
///
/// Fails with `FrameTooLarge` when the payload length does not fit the
/// 4-byte length field.
pub fn encode_frame(frame: &Frame) -> Result<BytesMut> {
    let payload_len = wire_len(frame.payload.len())?;

    let mut message = BytesMut::with_capacity(FRAME_HEADER_SIZE + frame.payload.len());
    message.put_u8(frame.kind as u8);
    message.put_u8(frame.type_id);
    message.put_u32(payload_len);
    message.put_u32(crc32fast::hash(&frame.payload));
    message.put_slice(&frame.payload);
    Ok(message)
}

fn wire_len(payload_len: usize) -> Result<u32> {
    u32::try_from(payload_len).map_err(|_| CarbonError::FrameTooLarge {
        size: payload_len,
        max: u32::MAX as usize,
    })
}

/// Decode one complete frame from bytes
pub fn decode_frame(bytes: &[u8], max_frame_size: usize) -> Result<Frame> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(CarbonError::Protocol(format!(
            "Incomplete frame header: expected {} bytes, got {}",
            FRAME_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = [0u8; FRAME_HEADER_SIZE];
    header.copy_from_slice(&bytes[..FRAME_HEADER_SIZE]);
    let (kind, type_id, payload_len, crc) = parse_header(&header, max_frame_size)?;

    let total_len = FRAME_HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(CarbonError::Protocol(format!(
            "Incomplete frame payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[FRAME_HEADER_SIZE..total_len];
    verify_checksum(payload, crc)?;

    Ok(Frame {
        kind,
        type_id,
        payload: Bytes::copy_from_slice(payload),
    })
}

fn parse_header(
    header: &[u8; FRAME_HEADER_SIZE],
    max_frame_size: usize,
) -> Result<(FrameKind, u8, usize, u32)> {
    let kind = FrameKind::try_from(header[0])?;
    let type_id = header[1];
    let payload_len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
    let crc = u32::from_be_bytes([header[6], header[7], header[8], header[9]]);

    if payload_len > max_frame_size {
        return Err(CarbonError::FrameTooLarge {
            size: payload_len,
            max: max_frame_size,
        });
    }

    Ok((kind, type_id, payload_len, crc))
}

fn verify_checksum(payload: &[u8], expected: u32) -> Result<()> {
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(CarbonError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Frame> {
    // Read header first
    let mut header = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let (kind, type_id, payload_len, crc) = parse_header(&header, max_frame_size)?;

    // Read payload
    let mut payload = BytesMut::zeroed(payload_len);
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }
    verify_checksum(&payload, crc)?;

    Ok(Frame {
        kind,
        type_id,
        payload: payload.freeze(),
    })
}

/// Write a frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = encode_frame(frame)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
