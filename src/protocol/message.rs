//! Message contract
//!
//! Every request or reply struct implements `CarbonMessage`. Implementations
//! follow one shape:
//!
//! - `serialize`: `write_struct_begin`, one `write_field` per set field in
//!   ascending id order, `write_stop`, `write_struct_end`.
//! - `deserialize`: `read_struct_begin`, then read field headers until
//!   `Stop`, dispatching known ids to `read_field_or_skip` and every other id
//!   to `skip`, then `read_struct_end`.
//!
//! Old readers therefore drop fields added by newer writers, and new readers
//! keep defaults for fields older writers never sent.

use bytes::{BufMut, BytesMut};

use crate::config::CodecConfig;
use crate::error::{CarbonError, Result};

use super::{CarbonProtocolReader, CarbonProtocolWriter};

/// A struct that can be encoded as a top-level or nested Carbon struct
pub trait CarbonMessage: Default {
    /// Stable name used for dispatch and logging; never written to the wire
    const NAME: &'static str;

    fn serialize<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()>;

    fn deserialize(&mut self, reader: &mut CarbonProtocolReader<'_>) -> Result<()>;
}

/// A request message paired with the reply it produces
pub trait CarbonRequest: CarbonMessage {
    type Reply: CarbonMessage;

    /// Transport-level type id identifying this request in a frame
    const TYPE_ID: u8;
}

/// Encode `message` into a fresh buffer
pub fn serialize_message<M: CarbonMessage>(message: &M, config: &CodecConfig) -> Result<BytesMut> {
    let mut buf = BytesMut::new();
    serialize_into(message, &mut buf, config)?;
    Ok(buf)
}

/// Append the encoding of `message` to `buf`, returning the bytes written
pub fn serialize_into<M: CarbonMessage, B: BufMut>(
    message: &M,
    buf: &mut B,
    config: &CodecConfig,
) -> Result<usize> {
    let mut writer = CarbonProtocolWriter::with_config(buf, *config);
    message.serialize(&mut writer)?;
    Ok(writer.bytes_written())
}

/// Decode exactly one top-level struct from `bytes`
pub fn deserialize_message<M: CarbonMessage>(bytes: &[u8], config: &CodecConfig) -> Result<M> {
    let mut reader = CarbonProtocolReader::with_config(bytes, *config);
    let mut message = M::default();
    message.deserialize(&mut reader)?;

    if !reader.is_empty() {
        return Err(CarbonError::TrailingBytes(reader.remaining()));
    }
    Ok(message)
}

/// Register message structs as field values with the Struct tag.
///
/// ```ignore
/// carbon_struct!(Address, Person);
/// ```
#[macro_export]
macro_rules! carbon_struct {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::protocol::CarbonType for $ty {
                const ELEMENT_TYPE: $crate::protocol::FieldType =
                    $crate::protocol::FieldType::Struct;

                fn write_value<B: $crate::bytes::BufMut>(
                    &self,
                    writer: &mut $crate::protocol::CarbonProtocolWriter<'_, B>,
                ) -> $crate::Result<()> {
                    $crate::protocol::CarbonMessage::serialize(self, writer)
                }

                fn read_value(
                    reader: &mut $crate::protocol::CarbonProtocolReader<'_>,
                    _tag: $crate::protocol::FieldType,
                ) -> $crate::Result<Self> {
                    let mut value = <$ty as ::std::default::Default>::default();
                    $crate::protocol::CarbonMessage::deserialize(&mut value, reader)?;
                    Ok(value)
                }
            }
        )+
    };
}
