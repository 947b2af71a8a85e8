//! Carbon protocol reader
//!
//! Decodes tagged values from a borrowed byte slice and skips values it has
//! no schema for.

use std::borrow::Cow;

use crate::config::CodecConfig;
use crate::error::{CarbonError, Result};

use super::varint::{decode_varint, zigzag_decode};
use super::{CarbonType, Encoding, FieldId, FieldType};

/// Decodes one message from a borrowed buffer
///
/// The input is never modified; only the internal cursor moves. After any
/// error other than a handled type mismatch the cursor position is
/// unspecified and the reader should be dropped.
pub struct CarbonProtocolReader<'a> {
    buf: &'a [u8],
    /// Read cursor
    pos: usize,
    config: CodecConfig,
    /// Id of the last field header read in the current struct
    last_field_id: FieldId,
    /// Saved `last_field_id` of each enclosing struct
    id_stack: Vec<FieldId>,
    /// Open structs and containers
    depth: usize,
}

/// Reader state to rewind to when a typed read turns out to mismatch
struct Checkpoint {
    pos: usize,
    last_field_id: FieldId,
    stack_len: usize,
    depth: usize,
}

impl<'a> CarbonProtocolReader<'a> {
    /// Create a reader with the default codec configuration
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_config(buf, CodecConfig::default())
    }

    pub fn with_config(buf: &'a [u8], config: CodecConfig) -> Self {
        Self {
            buf,
            pos: 0,
            config,
            last_field_id: 0,
            id_stack: Vec::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    // =========================================================================
    // Struct Framing
    // =========================================================================

    pub fn read_struct_begin(&mut self) -> Result<()> {
        self.enter()?;
        self.id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    pub fn read_struct_end(&mut self) -> Result<()> {
        if let Some(id) = self.id_stack.pop() {
            self.last_field_id = id;
        }
        self.leave();
        Ok(())
    }

    /// Read the next field header.
    ///
    /// A `Stop` tag means the current struct has no more fields. Only the
    /// single byte 0x00 is a Stop; a zero tag nibble under a non-zero delta
    /// is rejected.
    pub fn read_field_header(&mut self) -> Result<(FieldType, FieldId)> {
        let byte = self.read_u8()?;
        if byte == FieldType::Stop as u8 {
            return Ok((FieldType::Stop, 0));
        }

        let tag = match FieldType::try_from(byte & 0x0F) {
            Ok(FieldType::Stop) | Err(_) => return Err(CarbonError::UnknownTag(byte)),
            Ok(tag) => tag,
        };

        let delta = (byte >> 4) as i64;
        let id = if delta != 0 {
            narrow(self.last_field_id as i64 + delta, "field id")?
        } else {
            self.read_i16()?
        };

        self.last_field_id = id;
        Ok((tag, id))
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// Decode a value whose tag the caller already checked.
    ///
    /// Fails with `TypeMismatch` if `tag` is not what `T` is encoded as;
    /// generated code should use `read_field_or_skip` instead.
    pub fn read_field<T: CarbonType>(&mut self, target: &mut T, tag: FieldType) -> Result<()> {
        if !T::accepts(tag) {
            return Err(CarbonError::TypeMismatch {
                expected: T::ELEMENT_TYPE,
                actual: tag,
            });
        }
        *target = T::read_value(self, tag)?;
        Ok(())
    }

    /// Decode into `target`, or skip the value if its type does not match.
    ///
    /// A mismatch anywhere inside a container (element, key or value type)
    /// rewinds and skips the whole field, leaving `target` untouched.
    pub fn read_field_or_skip<T: CarbonType>(
        &mut self,
        target: &mut T,
        tag: FieldType,
    ) -> Result<()> {
        if let Some(value) = self.try_read_value::<T>(tag)? {
            *target = value;
        }
        Ok(())
    }

    /// Like `read_field_or_skip`, storing the value as set
    pub fn read_optional_field<T: CarbonType>(
        &mut self,
        target: &mut Option<T>,
        tag: FieldType,
    ) -> Result<()> {
        if let Some(value) = self.try_read_value::<T>(tag)? {
            *target = Some(value);
        }
        Ok(())
    }

    fn try_read_value<T: CarbonType>(&mut self, tag: FieldType) -> Result<Option<T>> {
        if !T::accepts(tag) {
            tracing::trace!(expected = %T::ELEMENT_TYPE, actual = %tag, "skipping mismatched field");
            self.skip(tag)?;
            return Ok(None);
        }

        let checkpoint = self.checkpoint();
        match T::read_value(self, tag) {
            Ok(value) => Ok(Some(value)),
            Err(CarbonError::TypeMismatch { expected, actual }) => {
                tracing::trace!(%expected, %actual, "skipping field with mismatched contents");
                self.restore(checkpoint);
                self.skip(tag)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Skip
    // =========================================================================

    /// Consume exactly the bytes of one value announced by `tag` in a field
    /// header, without materializing it.
    pub fn skip(&mut self, tag: FieldType) -> Result<()> {
        self.skip_encoded(tag.encoding())
    }

    /// Consume one container element of type `tag`
    pub fn skip_element(&mut self, tag: FieldType) -> Result<()> {
        self.skip_encoded(tag.element_encoding()?)
    }

    fn skip_encoded(&mut self, encoding: Encoding) -> Result<()> {
        match encoding {
            Encoding::Empty => Ok(()),
            Encoding::Fixed(n) => self.read_bytes(n).map(|_| ()),
            Encoding::Varint => self.read_varint().map(|_| ()),
            Encoding::LengthPrefixed => self.read_binary().map(|_| ()),
            Encoding::List => {
                let (elem, count) = self.read_list_begin()?;
                for _ in 0..count {
                    self.skip_element(elem)?;
                }
                self.read_list_end()
            }
            Encoding::Map => {
                let (key, value, count) = self.read_map_begin()?;
                for _ in 0..count {
                    self.skip_element(key)?;
                    self.skip_element(value)?;
                }
                self.read_map_end()
            }
            Encoding::Struct => {
                self.read_struct_begin()?;
                loop {
                    let (tag, id) = self.read_field_header()?;
                    if tag == FieldType::Stop {
                        break;
                    }
                    tracing::trace!(field_id = id, field_type = %tag, "skipping nested field");
                    self.skip(tag)?;
                }
                self.read_struct_end()
            }
        }
    }

    // =========================================================================
    // Primitive Values
    // =========================================================================

    /// A bool inside a container: one byte holding its tag value
    pub fn read_bool_element(&mut self) -> Result<bool> {
        match FieldType::try_from(self.read_u8()?)? {
            FieldType::BoolTrue => Ok(true),
            FieldType::BoolFalse => Ok(false),
            other => Err(CarbonError::TypeMismatch {
                expected: FieldType::BoolTrue,
                actual: other,
            }),
        }
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        narrow(self.read_i64()?, "i8")
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        narrow(self.read_i64()?, "i16")
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        narrow(self.read_i64()?, "i32")
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.read_varint()?))
    }

    pub fn read_double(&mut self) -> Result<f64> {
        let bytes = self.read_array::<8>()?;
        Ok(f64::from_le_bytes(bytes))
    }

    pub fn read_float(&mut self) -> Result<f32> {
        let bytes = self.read_array::<4>()?;
        Ok(f32::from_le_bytes(bytes))
    }

    /// Length-prefixed bytes, borrowed from the input
    pub fn read_binary(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read_bytes(len)
    }

    /// Length-prefixed UTF-8, borrowed when valid.
    ///
    /// Outside strict mode invalid sequences are replaced instead of failing.
    pub fn read_str(&mut self) -> Result<Cow<'a, str>> {
        let bytes = self.read_binary()?;
        if self.config.strict_utf8 {
            Ok(Cow::Borrowed(std::str::from_utf8(bytes)?))
        } else {
            Ok(String::from_utf8_lossy(bytes))
        }
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(&self.buf[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Read a list or set header: element type and count
    pub fn read_list_begin(&mut self) -> Result<(FieldType, usize)> {
        self.enter()?;
        let elem = FieldType::try_from(self.read_u8()?)?;
        let min_len = elem.element_encoding()?.min_len();
        let count = self.read_count(min_len)?;
        Ok((elem, count))
    }

    pub fn read_list_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    /// Read a map header: key type, value type and pair count
    pub fn read_map_begin(&mut self) -> Result<(FieldType, FieldType, usize)> {
        self.enter()?;
        let key = FieldType::try_from(self.read_u8()?)?;
        let value = FieldType::try_from(self.read_u8()?)?;
        let min_len = key.element_encoding()?.min_len() + value.element_encoding()?.min_len();
        let count = self.read_count(min_len)?;
        Ok((key, value, count))
    }

    pub fn read_map_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Read an element count and reject counts the remaining bytes cannot hold
    fn read_count(&mut self, min_element_len: usize) -> Result<usize> {
        let count = usize::try_from(self.read_varint()?).unwrap_or(usize::MAX);
        let needed = count.saturating_mul(min_element_len);
        if needed > self.remaining() {
            return Err(CarbonError::underrun(needed, self.remaining()));
        }
        Ok(count)
    }

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

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            last_field_id: self.last_field_id,
            stack_len: self.id_stack.len(),
            depth: self.depth,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.last_field_id = checkpoint.last_field_id;
        self.id_stack.truncate(checkpoint.stack_len);
        self.depth = checkpoint.depth;
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| CarbonError::underrun(1, 0))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CarbonError::underrun(len, self.remaining()));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }
}

/// Narrow a decoded integer to a smaller width
fn narrow<T: TryFrom<i64>>(value: i64, target: &'static str) -> Result<T> {
    T::try_from(value).map_err(|_| CarbonError::IntegerOutOfRange { value, target })
}
