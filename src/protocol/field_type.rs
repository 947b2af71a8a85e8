//! Field type tags
//!
//! The closed vocabulary of wire types. Every tag fits in the low nibble of
//! a field header byte.

use std::fmt;

use crate::error::{CarbonError, Result};

/// Wire-level type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Stop = 0x0,
    BoolTrue = 0x1,
    BoolFalse = 0x2,
    Int8 = 0x3,
    Int16 = 0x4,
    Int32 = 0x5,
    Int64 = 0x6,
    Double = 0x7,
    Binary = 0x8,
    List = 0x9,
    Set = 0xA,
    Map = 0xB,
    Struct = 0xC,
    Float = 0xD,
    String = 0xE,
}

/// How the bytes following a tag are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Nothing follows; the tag is the whole value
    Empty,

    /// Exactly this many bytes follow
    Fixed(usize),

    /// One (zig-zag) varint follows
    Varint,

    /// Varint byte count, then that many bytes
    LengthPrefixed,

    /// Element tag, varint count, then the elements
    List,

    /// Key tag, value tag, varint count, then key/value pairs
    Map,

    /// Field headers and values until a Stop tag
    Struct,
}

impl Encoding {
    /// Smallest number of bytes a value with this encoding can occupy
    pub fn min_len(self) -> usize {
        match self {
            Encoding::Empty => 0,
            Encoding::Fixed(n) => n,
            Encoding::Varint | Encoding::LengthPrefixed | Encoding::Struct => 1,
            Encoding::List => 2,
            Encoding::Map => 3,
        }
    }
}

impl FieldType {
    /// Encoding of a value announced by a field header.
    pub fn encoding(self) -> Encoding {
        match self {
            FieldType::Stop | FieldType::BoolTrue | FieldType::BoolFalse => Encoding::Empty,
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64 => {
                Encoding::Varint
            }
            FieldType::Double => Encoding::Fixed(8),
            FieldType::Float => Encoding::Fixed(4),
            FieldType::Binary | FieldType::String => Encoding::LengthPrefixed,
            FieldType::List | FieldType::Set => Encoding::List,
            FieldType::Map => Encoding::Map,
            FieldType::Struct => Encoding::Struct,
        }
    }

    /// Encoding of one container element of this type.
    ///
    /// Elements have no header to carry a boolean, so each bool element is a
    /// single byte holding the BoolTrue/BoolFalse tag value.
    pub fn element_encoding(self) -> Result<Encoding> {
        match self {
            FieldType::Stop => Err(CarbonError::InvalidElementType(self)),
            FieldType::BoolTrue | FieldType::BoolFalse => Ok(Encoding::Fixed(1)),
            other => Ok(other.encoding()),
        }
    }

    pub fn is_bool(self) -> bool {
        matches!(self, FieldType::BoolTrue | FieldType::BoolFalse)
    }

    /// Tag that carries `value` in a field header
    pub fn from_bool(value: bool) -> Self {
        if value {
            FieldType::BoolTrue
        } else {
            FieldType::BoolFalse
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Stop => "stop",
            FieldType::BoolTrue => "bool(true)",
            FieldType::BoolFalse => "bool(false)",
            FieldType::Int8 => "i8",
            FieldType::Int16 => "i16",
            FieldType::Int32 => "i32",
            FieldType::Int64 => "i64",
            FieldType::Double => "double",
            FieldType::Binary => "binary",
            FieldType::List => "list",
            FieldType::Set => "set",
            FieldType::Map => "map",
            FieldType::Struct => "struct",
            FieldType::Float => "float",
            FieldType::String => "string",
        }
    }
}

impl TryFrom<u8> for FieldType {
    type Error = CarbonError;

    fn try_from(byte: u8) -> Result<Self> {
        let tag = match byte {
            0x0 => FieldType::Stop,
            0x1 => FieldType::BoolTrue,
            0x2 => FieldType::BoolFalse,
            0x3 => FieldType::Int8,
            0x4 => FieldType::Int16,
            0x5 => FieldType::Int32,
            0x6 => FieldType::Int64,
            0x7 => FieldType::Double,
            0x8 => FieldType::Binary,
            0x9 => FieldType::List,
            0xA => FieldType::Set,
            0xB => FieldType::Map,
            0xC => FieldType::Struct,
            0xD => FieldType::Float,
            0xE => FieldType::String,
            _ => return Err(CarbonError::UnknownTag(byte)),
        };
        Ok(tag)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
