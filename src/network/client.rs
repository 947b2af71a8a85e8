//! Blocking client
//!
//! Sends typed requests and decodes the matching replies.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::{CodecConfig, DEFAULT_MAX_FRAME_SIZE};
use crate::error::{CarbonError, Result};
use crate::protocol::{deserialize_message, CarbonRequest};

use super::{read_frame, write_frame, Frame, FrameKind};

/// A connection to a Carbon server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    codec: CodecConfig,
    max_frame_size: usize,
}

impl Client {
    /// Connect with the default codec configuration
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        Self::connect_with(addr, CodecConfig::default())
    }

    pub fn connect_with(addr: impl ToSocketAddrs, codec: CodecConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            codec,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        })
    }

    /// Set a read timeout for replies
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Set the largest frame payload this client sends or accepts
    pub fn set_max_frame_size(&mut self, size: usize) {
        self.max_frame_size = size;
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Send one request and wait for its reply
    pub fn call<R: CarbonRequest>(&mut self, request: &R) -> Result<R::Reply> {
        let frame = Frame::request(request, &self.codec)?;
        self.send_frame(&frame)?;

        let reply = read_frame(&mut self.reader, self.max_frame_size)?;
        match reply.kind {
            FrameKind::Reply if reply.type_id == R::TYPE_ID => {
                deserialize_message(&reply.payload, &self.codec)
            }
            FrameKind::Error => Err(CarbonError::Protocol(reply.error_message())),
            kind => Err(CarbonError::Protocol(format!(
                "Unexpected {:?} frame for type {} in reply to {}",
                kind,
                reply.type_id,
                R::NAME
            ))),
        }
    }

    /// Send a raw frame and return the raw reply
    pub fn call_raw(&mut self, frame: &Frame) -> Result<Frame> {
        self.send_frame(frame)?;
        read_frame(&mut self.reader, self.max_frame_size)
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.payload.len() > self.max_frame_size {
            return Err(CarbonError::FrameTooLarge {
                size: frame.payload.len(),
                max: self.max_frame_size,
            });
        }

        tracing::trace!("Sending {:?} frame (type {})", frame.kind, frame.type_id);
        write_frame(&mut self.writer, frame)
    }
}
