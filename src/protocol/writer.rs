//! Carbon protocol writer
//!
//! Appends tagged values to a caller-owned buffer.

use bytes::BufMut;

use crate::config::CodecConfig;
use crate::error::{CarbonError, Result};

use super::varint::{encode_varint, varint_len, zigzag_encode};
use super::{CarbonType, FieldId, FieldType, MAX_FIELD_DELTA};

/// Encodes one message into a borrowed buffer
///
/// The writer never allocates the output itself: every byte goes into the
/// `BufMut` handed to it, which stays owned by the caller.
pub struct CarbonProtocolWriter<'a, B: BufMut> {
    /// Output sink
    buf: &'a mut B,
    config: CodecConfig,
    /// Id of the last field header written in the current struct
    last_field_id: FieldId,
    /// Saved `last_field_id` of each enclosing struct
    id_stack: Vec<FieldId>,
    /// Open structs and containers
    depth: usize,
    /// Bytes appended by this writer
    written: usize,
}

impl<'a, B: BufMut> CarbonProtocolWriter<'a, B> {
    /// Create a writer with the default codec configuration
    pub fn new(buf: &'a mut B) -> Self {
        Self::with_config(buf, CodecConfig::default())
    }

    pub fn with_config(buf: &'a mut B, config: CodecConfig) -> Self {
        Self {
            buf,
            config,
            last_field_id: 0,
            id_stack: Vec::new(),
            depth: 0,
            written: 0,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of bytes this writer has appended
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    // =========================================================================
    // Struct Framing
    // =========================================================================

    /// Open a struct: field ids restart from zero inside it
    pub fn write_struct_begin(&mut self) -> Result<()> {
        self.enter()?;
        self.id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    /// Close a struct opened by `write_struct_begin`.
    ///
    /// Callers emit `write_stop` first; the writer does not check the order.
    pub fn write_struct_end(&mut self) {
        if let Some(id) = self.id_stack.pop() {
            self.last_field_id = id;
        }
        self.leave();
    }

    /// Terminate the current struct's field list
    pub fn write_stop(&mut self) {
        self.put_u8(FieldType::Stop as u8);
    }

    /// Emit a field header, delta-encoding the id when possible
    pub fn write_field_header(&mut self, tag: FieldType, id: FieldId) {
        let delta = id as i32 - self.last_field_id as i32;
        if self.config.compact_field_ids && (1..=MAX_FIELD_DELTA).contains(&delta) {
            self.put_u8(((delta as u8) << 4) | tag as u8);
        } else {
            self.put_u8(tag as u8);
            self.put_varint(zigzag_encode(id as i64));
        }
        self.last_field_id = id;
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// Write a field header followed by the value's encoding
    pub fn write_field<T: CarbonType>(&mut self, id: FieldId, value: &T) -> Result<()> {
        self.write_field_header(value.field_type(), id);
        value.write_value(self)
    }

    /// Write the field only when it is set
    pub fn write_optional_field<T: CarbonType>(
        &mut self,
        id: FieldId,
        value: &Option<T>,
    ) -> Result<()> {
        match value {
            Some(value) => self.write_field(id, value),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Primitive Values
    // =========================================================================

    /// A bool inside a container: one byte holding its tag value
    pub fn write_bool_element(&mut self, value: bool) {
        self.put_u8(FieldType::from_bool(value) as u8);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_i64(value as i64);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_i64(value as i64);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_i64(value as i64);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.put_varint(zigzag_encode(value));
    }

    pub fn write_double(&mut self, value: f64) {
        self.buf.put_f64_le(value);
        self.written += 8;
    }

    pub fn write_float(&mut self, value: f32) {
        self.buf.put_f32_le(value);
        self.written += 4;
    }

    pub fn write_binary(&mut self, value: &[u8]) {
        self.put_varint(value.len() as u64);
        self.buf.put_slice(value);
        self.written += value.len();
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_binary(value.as_bytes());
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Begin a list or set of `count` elements of type `elem`
    pub fn write_list_begin(&mut self, elem: FieldType, count: usize) -> Result<()> {
        elem.element_encoding()?;
        self.enter()?;
        self.put_u8(elem as u8);
        self.put_varint(count as u64);
        Ok(())
    }

    pub fn write_list_end(&mut self) {
        self.leave();
    }

    /// Begin a map of `count` pairs
    pub fn write_map_begin(&mut self, key: FieldType, value: FieldType, count: usize) -> Result<()> {
        key.element_encoding()?;
        value.element_encoding()?;
        self.enter()?;
        self.put_u8(key as u8);
        self.put_u8(value as u8);
        self.put_varint(count as u64);
        Ok(())
    }

    pub fn write_map_end(&mut self) {
        self.leave();
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(CarbonError::DepthExceeded { max: self.config.max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
        self.written += 1;
    }

    #[inline]
    fn put_varint(&mut self, value: u64) {
        encode_varint(value, &mut *self.buf);
        self.written += varint_len(value);
    }
}
