//! Protocol Module
//!
//! The Carbon wire format: a self-describing, tagged binary encoding for
//! request/reply structs.
//!
//! ## Struct Format
//! ```text
//! ┌──────────────┬─────────┬──────────────┬─────────┬─────┬──────────┐
//! │ FieldHeader  │  Value  │ FieldHeader  │  Value  │ ... │ Stop (1) │
//! └──────────────┴─────────┴──────────────┴─────────┴─────┴──────────┘
//! ```
//!
//! ### Field Header
//! ```text
//! short form (1 <= id delta <= 15):   ┌─────────────────────┐
//!                                     │ delta(4) │ tag(4)   │
//!                                     └─────────────────────┘
//! absolute form:                      ┌───────────┬──────────────────┐
//!                                     │ 0000 tag  │ zigzag varint id │
//!                                     └───────────┴──────────────────┘
//! ```
//!
//! ### Values
//! - bool:          carried by the header tag (BoolTrue / BoolFalse)
//! - i8..i64:       zig-zag varint
//! - double/float:  8 / 4 bytes little-endian
//! - string/binary: varint length + bytes
//! - list/set:      element tag (1) + varint count + elements
//! - map:           key tag (1) + value tag (1) + varint count + pairs
//! - struct:        nested field headers and values, then Stop

mod field_type;
mod message;
mod reader;
mod types;
mod varint;
mod writer;

pub use field_type::{Encoding, FieldType};
pub use message::{
    deserialize_message, serialize_into, serialize_message, CarbonMessage, CarbonRequest,
};
pub use reader::CarbonProtocolReader;
pub use types::CarbonType;
pub use varint::{
    decode_varint, encode_varint, varint_len, zigzag_decode, zigzag_encode, MAX_VARINT_LEN,
};
pub use writer::CarbonProtocolWriter;

/// Field identifier within one struct's schema
pub type FieldId = i16;

/// Largest id gap the short header form can carry
pub const MAX_FIELD_DELTA: i32 = 15;
