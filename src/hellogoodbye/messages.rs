//! HelloGoodbye messages
//!
//! Request/reply pairs of the hellogoodbye schema, laid out exactly as the
//! schema compiler emits them.

use std::hash::{Hash, Hasher};

use bytes::BufMut;

use crate::error::Result;
use crate::protocol::{
    CarbonMessage, CarbonProtocolReader, CarbonProtocolWriter, CarbonRequest, CarbonType,
    FieldType,
};

// =============================================================================
// Result Code
// =============================================================================

/// Outcome carried by every reply
///
/// Values compare by wire code, so `Other(1)` equals `Ok`.
#[derive(Debug, Clone, Copy, Default)]
pub enum ResultCode {
    #[default]
    Unknown,
    Ok,
    NotFound,
    Timeout,
    RemoteError,
    LocalError,
    /// A code added by a newer schema. Decoding never produces it for a
    /// code that has a named variant.
    Other(i16),
}

impl ResultCode {
    pub fn code(self) -> i16 {
        match self {
            ResultCode::Unknown => 0,
            ResultCode::Ok => 1,
            ResultCode::NotFound => 2,
            ResultCode::Timeout => 3,
            ResultCode::RemoteError => 4,
            ResultCode::LocalError => 5,
            ResultCode::Other(code) => code,
        }
    }

    /// Map a wire code to its named variant, or `Other` when there is none
    pub fn from_code(code: i16) -> Self {
        match code {
            0 => ResultCode::Unknown,
            1 => ResultCode::Ok,
            2 => ResultCode::NotFound,
            3 => ResultCode::Timeout,
            4 => ResultCode::RemoteError,
            5 => ResultCode::LocalError,
            other => ResultCode::Other(other),
        }
    }

    /// `Other(n)` becomes the named variant for `n` when one exists
    pub fn normalized(self) -> Self {
        Self::from_code(self.code())
    }

    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }
}

impl PartialEq for ResultCode {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for ResultCode {}

impl Hash for ResultCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl From<i16> for ResultCode {
    fn from(code: i16) -> Self {
        Self::from_code(code)
    }
}

impl CarbonType for ResultCode {
    const ELEMENT_TYPE: FieldType = FieldType::Int16;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_i16(self.code());
        Ok(())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        Ok(ResultCode::from_code(reader.read_i16()?))
    }
}

// =============================================================================
// Hello
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelloRequest {
    pub key: String,
    pub shard_id: i32,
}

impl HelloRequest {
    pub fn new(key: impl Into<String>, shard_id: i32) -> Self {
        Self {
            key: key.into(),
            shard_id,
        }
    }
}

impl CarbonMessage for HelloRequest {
    const NAME: &'static str = "hello";

    fn serialize<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_struct_begin()?;
        writer.write_field(1, &self.key)?;
        writer.write_field(2, &self.shard_id)?;
        writer.write_stop();
        writer.write_struct_end();
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut CarbonProtocolReader<'_>) -> Result<()> {
        reader.read_struct_begin()?;
        loop {
            let (field_type, field_id) = reader.read_field_header()?;
            if field_type == FieldType::Stop {
                break;
            }

            match field_id {
                1 => reader.read_field_or_skip(&mut self.key, field_type)?,
                2 => reader.read_field_or_skip(&mut self.shard_id, field_type)?,
                _ => reader.skip(field_type)?,
            }
        }
        reader.read_struct_end()
    }
}

impl CarbonRequest for HelloRequest {
    type Reply = HelloReply;
    const TYPE_ID: u8 = 1;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelloReply {
    pub result: ResultCode,
}

impl HelloReply {
    pub fn new(result: ResultCode) -> Self {
        Self { result }
    }
}

impl CarbonMessage for HelloReply {
    const NAME: &'static str = "hello_reply";

    fn serialize<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_struct_begin()?;
        writer.write_field(1, &self.result)?;
        writer.write_stop();
        writer.write_struct_end();
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut CarbonProtocolReader<'_>) -> Result<()> {
        reader.read_struct_begin()?;
        loop {
            let (field_type, field_id) = reader.read_field_header()?;
            if field_type == FieldType::Stop {
                break;
            }

            match field_id {
                1 => reader.read_field_or_skip(&mut self.result, field_type)?,
                _ => reader.skip(field_type)?,
            }
        }
        reader.read_struct_end()
    }
}

// =============================================================================
// Goodbye
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoodbyeRequest {
    pub key: String,
    pub shard_id: i32,
}

impl GoodbyeRequest {
    pub fn new(key: impl Into<String>, shard_id: i32) -> Self {
        Self {
            key: key.into(),
            shard_id,
        }
    }
}

impl CarbonMessage for GoodbyeRequest {
    const NAME: &'static str = "goodbye";

    fn serialize<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_struct_begin()?;
        writer.write_field(1, &self.key)?;
        writer.write_field(2, &self.shard_id)?;
        writer.write_stop();
        writer.write_struct_end();
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut CarbonProtocolReader<'_>) -> Result<()> {
        reader.read_struct_begin()?;
        loop {
            let (field_type, field_id) = reader.read_field_header()?;
            if field_type == FieldType::Stop {
                break;
            }

            match field_id {
                1 => reader.read_field_or_skip(&mut self.key, field_type)?,
                2 => reader.read_field_or_skip(&mut self.shard_id, field_type)?,
                _ => reader.skip(field_type)?,
            }
        }
        reader.read_struct_end()
    }
}

impl CarbonRequest for GoodbyeRequest {
    type Reply = GoodbyeReply;
    const TYPE_ID: u8 = 2;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoodbyeReply {
    pub result: ResultCode,
    pub message: String,
}

impl GoodbyeReply {
    pub fn new(result: ResultCode, message: impl Into<String>) -> Self {
        Self {
            result,
            message: message.into(),
        }
    }
}

impl CarbonMessage for GoodbyeReply {
    const NAME: &'static str = "goodbye_reply";

    fn serialize<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_struct_begin()?;
        writer.write_field(1, &self.result)?;
        writer.write_field(2, &self.message)?;
        writer.write_stop();
        writer.write_struct_end();
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut CarbonProtocolReader<'_>) -> Result<()> {
        reader.read_struct_begin()?;
        loop {
            let (field_type, field_id) = reader.read_field_header()?;
            if field_type == FieldType::Stop {
                break;
            }

            match field_id {
                1 => reader.read_field_or_skip(&mut self.result, field_type)?,
                2 => reader.read_field_or_skip(&mut self.message, field_type)?,
                _ => reader.skip(field_type)?,
            }
        }
        reader.read_struct_end()
    }
}

crate::carbon_struct!(HelloRequest, HelloReply, GoodbyeRequest, GoodbyeReply);
