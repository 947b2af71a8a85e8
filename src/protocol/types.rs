//! Rust value <-> wire type mapping
//!
//! `CarbonType` is implemented for every value a message field can hold.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use bytes::{BufMut, Bytes};

use crate::error::{CarbonError, Result};

use super::{CarbonProtocolReader, CarbonProtocolWriter, FieldType};

/// A value with a Carbon wire encoding
pub trait CarbonType: Sized {
    /// Tag announcing this type as a container element
    const ELEMENT_TYPE: FieldType;

    /// Tag written in the field header for this value
    fn field_type(&self) -> FieldType {
        Self::ELEMENT_TYPE
    }

    /// Whether a value announced by `tag` can be decoded as this type
    fn accepts(tag: FieldType) -> bool {
        tag == Self::ELEMENT_TYPE
    }

    /// Encode the value that follows a field header
    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()>;

    /// Decode the value that follows a field header carrying `tag`
    fn read_value(reader: &mut CarbonProtocolReader<'_>, tag: FieldType) -> Result<Self>;

    /// Encode the value as a container element
    fn write_element<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        self.write_value(writer)
    }

    /// Decode one container element of type `tag`
    fn read_element(reader: &mut CarbonProtocolReader<'_>, tag: FieldType) -> Result<Self> {
        Self::read_value(reader, tag)
    }
}

// =============================================================================
// Scalars
// =============================================================================

impl CarbonType for bool {
    const ELEMENT_TYPE: FieldType = FieldType::BoolTrue;

    fn field_type(&self) -> FieldType {
        FieldType::from_bool(*self)
    }

    fn accepts(tag: FieldType) -> bool {
        tag.is_bool()
    }

    // The header tag already carries the value.
    fn write_value<B: BufMut>(&self, _writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        Ok(())
    }

    fn read_value(_reader: &mut CarbonProtocolReader<'_>, tag: FieldType) -> Result<Self> {
        Ok(tag == FieldType::BoolTrue)
    }

    fn write_element<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_bool_element(*self);
        Ok(())
    }

    fn read_element(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        reader.read_bool_element()
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $tag:ident, $write:ident, $read:ident;)+) => {
        $(
            impl CarbonType for $ty {
                const ELEMENT_TYPE: FieldType = FieldType::$tag;

                fn write_value<B: BufMut>(
                    &self,
                    writer: &mut CarbonProtocolWriter<'_, B>,
                ) -> Result<()> {
                    writer.$write(*self);
                    Ok(())
                }

                fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
                    reader.$read()
                }
            }
        )+
    };
}

impl_integer! {
    i8 => Int8, write_i8, read_i8;
    i16 => Int16, write_i16, read_i16;
    i32 => Int32, write_i32, read_i32;
    i64 => Int64, write_i64, read_i64;
}

// Unsigned fields travel as the signed type of the same width, bit for bit.
macro_rules! impl_unsigned {
    ($($ty:ty as $signed:ty => $tag:ident, $write:ident, $read:ident;)+) => {
        $(
            impl CarbonType for $ty {
                const ELEMENT_TYPE: FieldType = FieldType::$tag;

                fn write_value<B: BufMut>(
                    &self,
                    writer: &mut CarbonProtocolWriter<'_, B>,
                ) -> Result<()> {
                    writer.$write(*self as $signed);
                    Ok(())
                }

                fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
                    Ok(reader.$read()? as $ty)
                }
            }
        )+
    };
}

impl_unsigned! {
    u8 as i8 => Int8, write_i8, read_i8;
    u16 as i16 => Int16, write_i16, read_i16;
    u32 as i32 => Int32, write_i32, read_i32;
    u64 as i64 => Int64, write_i64, read_i64;
}

impl CarbonType for f64 {
    const ELEMENT_TYPE: FieldType = FieldType::Double;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_double(*self);
        Ok(())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        reader.read_double()
    }
}

impl CarbonType for f32 {
    const ELEMENT_TYPE: FieldType = FieldType::Float;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_float(*self);
        Ok(())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        reader.read_float()
    }
}

impl CarbonType for String {
    const ELEMENT_TYPE: FieldType = FieldType::String;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_string(self);
        Ok(())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        Ok(reader.read_str()?.into_owned())
    }
}

impl CarbonType for Bytes {
    const ELEMENT_TYPE: FieldType = FieldType::Binary;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        writer.write_binary(self);
        Ok(())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        Ok(Bytes::copy_from_slice(reader.read_binary()?))
    }
}

// =============================================================================
// Containers
// =============================================================================

fn element_mismatch<T: CarbonType>(actual: FieldType) -> CarbonError {
    CarbonError::TypeMismatch {
        expected: T::ELEMENT_TYPE,
        actual,
    }
}

fn write_sequence<'i, T, I, B>(
    writer: &mut CarbonProtocolWriter<'_, B>,
    items: I,
    count: usize,
) -> Result<()>
where
    T: CarbonType + 'i,
    I: IntoIterator<Item = &'i T>,
    B: BufMut,
{
    writer.write_list_begin(T::ELEMENT_TYPE, count)?;
    for item in items {
        item.write_element(writer)?;
    }
    writer.write_list_end();
    Ok(())
}

fn read_sequence<T, C>(reader: &mut CarbonProtocolReader<'_>) -> Result<C>
where
    T: CarbonType,
    C: Default + Extend<T>,
{
    let (elem, count) = reader.read_list_begin()?;
    if !T::accepts(elem) {
        return Err(element_mismatch::<T>(elem));
    }
    let mut out = C::default();
    for _ in 0..count {
        out.extend(std::iter::once(T::read_element(reader, elem)?));
    }
    reader.read_list_end()?;
    Ok(out)
}

impl<T: CarbonType> CarbonType for Vec<T> {
    const ELEMENT_TYPE: FieldType = FieldType::List;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        write_sequence(writer, self, self.len())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        read_sequence::<T, Vec<T>>(reader)
    }
}

impl<T: CarbonType + Ord> CarbonType for BTreeSet<T> {
    const ELEMENT_TYPE: FieldType = FieldType::Set;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        write_sequence(writer, self, self.len())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        read_sequence::<T, BTreeSet<T>>(reader)
    }
}

impl<T: CarbonType + Eq + Hash> CarbonType for HashSet<T> {
    const ELEMENT_TYPE: FieldType = FieldType::Set;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        write_sequence(writer, self, self.len())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        read_sequence::<T, HashSet<T>>(reader)
    }
}

fn write_pairs<'i, K, V, I, B>(
    writer: &mut CarbonProtocolWriter<'_, B>,
    pairs: I,
    count: usize,
) -> Result<()>
where
    K: CarbonType + 'i,
    V: CarbonType + 'i,
    I: IntoIterator<Item = (&'i K, &'i V)>,
    B: BufMut,
{
    writer.write_map_begin(K::ELEMENT_TYPE, V::ELEMENT_TYPE, count)?;
    for (key, value) in pairs {
        key.write_element(writer)?;
        value.write_element(writer)?;
    }
    writer.write_map_end();
    Ok(())
}

fn read_pairs<K, V, C>(reader: &mut CarbonProtocolReader<'_>) -> Result<C>
where
    K: CarbonType,
    V: CarbonType,
    C: Default + Extend<(K, V)>,
{
    let (key_tag, value_tag, count) = reader.read_map_begin()?;
    if !K::accepts(key_tag) {
        return Err(element_mismatch::<K>(key_tag));
    }
    if !V::accepts(value_tag) {
        return Err(element_mismatch::<V>(value_tag));
    }
    let mut out = C::default();
    for _ in 0..count {
        let key = K::read_element(reader, key_tag)?;
        let value = V::read_element(reader, value_tag)?;
        out.extend(std::iter::once((key, value)));
    }
    reader.read_map_end()?;
    Ok(out)
}

impl<K: CarbonType + Ord, V: CarbonType> CarbonType for BTreeMap<K, V> {
    const ELEMENT_TYPE: FieldType = FieldType::Map;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        write_pairs(writer, self, self.len())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        read_pairs::<K, V, BTreeMap<K, V>>(reader)
    }
}

impl<K: CarbonType + Eq + Hash, V: CarbonType> CarbonType for HashMap<K, V> {
    const ELEMENT_TYPE: FieldType = FieldType::Map;

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        write_pairs(writer, self, self.len())
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, _tag: FieldType) -> Result<Self> {
        read_pairs::<K, V, HashMap<K, V>>(reader)
    }
}

// =============================================================================
// Indirection
// =============================================================================

// Recursive structs hold their children boxed.
impl<T: CarbonType> CarbonType for Box<T> {
    const ELEMENT_TYPE: FieldType = T::ELEMENT_TYPE;

    fn field_type(&self) -> FieldType {
        (**self).field_type()
    }

    fn accepts(tag: FieldType) -> bool {
        T::accepts(tag)
    }

    fn write_value<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        (**self).write_value(writer)
    }

    fn read_value(reader: &mut CarbonProtocolReader<'_>, tag: FieldType) -> Result<Self> {
        T::read_value(reader, tag).map(Box::new)
    }

    fn write_element<B: BufMut>(&self, writer: &mut CarbonProtocolWriter<'_, B>) -> Result<()> {
        (**self).write_element(writer)
    }

    fn read_element(reader: &mut CarbonProtocolReader<'_>, tag: FieldType) -> Result<Self> {
        T::read_element(reader, tag).map(Box::new)
    }
}
