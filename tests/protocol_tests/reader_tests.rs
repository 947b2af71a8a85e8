//! Tests for CarbonProtocolReader
//!
//! These tests verify:
//! - Decoding of both field header forms
//! - Rejection of malformed input with the right error
//! - Borrowing of string and binary payloads
//! - Integer narrowing

use std::borrow::Cow;

use carbon::hellogoodbye::HelloRequest;
use carbon::protocol::{
    deserialize_message, encode_varint, serialize_message, zigzag_encode, CarbonProtocolReader,
    FieldType,
};
use carbon::{CarbonError, CodecConfig};

use crate::schemas::KeyOnly;

// =============================================================================
// Helper Functions
// =============================================================================

fn decode_hello(bytes: &[u8]) -> carbon::Result<HelloRequest> {
    deserialize_message(bytes, &CodecConfig::default())
}

/// A struct holding a single Int32 field 2 whose raw varint is `value`
fn int32_field_with(value: i64) -> Vec<u8> {
    let mut bytes = vec![0x25];
    encode_varint(zigzag_encode(value), &mut bytes);
    bytes.push(0x00);
    bytes
}

// =============================================================================
// Header Forms
// =============================================================================

#[test]
fn test_decode_short_form() {
    let decoded = decode_hello(&[0x1E, 0x01, b'k', 0x15, 0x0E, 0x00]).unwrap();
    assert_eq!(decoded, HelloRequest::new("k", 7));
}

#[test]
fn test_decode_absolute_form() {
    let decoded = decode_hello(&[0x0E, 0x02, 0x01, b'k', 0x05, 0x04, 0x0E, 0x00]).unwrap();
    assert_eq!(decoded, HelloRequest::new("k", 7));
}

#[test]
fn test_decode_mixed_forms() {
    // field 1 absolute, field 2 as delta 1 from it
    let decoded = decode_hello(&[0x0E, 0x02, 0x01, b'k', 0x15, 0x0E, 0x00]).unwrap();
    assert_eq!(decoded, HelloRequest::new("k", 7));
}

#[test]
fn test_decode_fields_out_of_order() {
    // field 2 first (delta 2), then field 1 (absolute)
    let decoded = decode_hello(&[0x25, 0x0E, 0x0E, 0x02, 0x01, b'k', 0x00]).unwrap();
    assert_eq!(decoded, HelloRequest::new("k", 7));
}

#[test]
fn test_empty_struct_decodes_to_defaults() {
    assert_eq!(decode_hello(&[0x00]).unwrap(), HelloRequest::default());
}

#[test]
fn test_header_positions() {
    let bytes = [0x1E, 0x01, b'k', 0x15, 0x0E, 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);

    reader.read_struct_begin().unwrap();
    assert_eq!(reader.read_field_header().unwrap(), (FieldType::String, 1));
    assert_eq!(reader.read_str().unwrap(), "k");
    assert_eq!(reader.position(), 3);
    assert_eq!(reader.read_field_header().unwrap(), (FieldType::Int32, 2));
    assert_eq!(reader.read_i32().unwrap(), 7);
    assert_eq!(reader.read_field_header().unwrap().0, FieldType::Stop);
    reader.read_struct_end().unwrap();
    assert!(reader.is_empty());
}

// =============================================================================
// Malformed Input
// =============================================================================

#[test]
fn test_empty_input_underruns() {
    assert!(matches!(
        decode_hello(&[]),
        Err(CarbonError::BufferUnderrun { .. })
    ));
}

#[test]
fn test_unknown_tag_nibble() {
    assert!(matches!(decode_hello(&[0x1F]), Err(CarbonError::UnknownTag(0x1F))));
}

#[test]
fn test_stop_nibble_with_delta_is_rejected() {
    assert!(matches!(decode_hello(&[0x10]), Err(CarbonError::UnknownTag(0x10))));
}

#[test]
fn test_invalid_utf8_strict() {
    let bytes = [0x1E, 0x02, 0xFF, 0xFE, 0x00];
    assert!(matches!(decode_hello(&bytes), Err(CarbonError::InvalidUtf8(_))));
}

#[test]
fn test_invalid_utf8_lossy() {
    let bytes = [0x1E, 0x02, 0xFF, 0xFE, 0x00];
    let config = CodecConfig::default().with_strict_utf8(false);
    let decoded: HelloRequest = deserialize_message(&bytes, &config).unwrap();
    assert_eq!(decoded.key, "\u{FFFD}\u{FFFD}");
}

#[test]
fn test_integer_out_of_range() {
    let bytes = int32_field_with(1 << 40);
    match decode_hello(&bytes) {
        Err(CarbonError::IntegerOutOfRange { value, target }) => {
            assert_eq!(value, 1 << 40);
            assert_eq!(target, "i32");
        }
        other => panic!("Expected IntegerOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_integer_at_range_edges() {
    assert_eq!(decode_hello(&int32_field_with(i32::MAX as i64)).unwrap().shard_id, i32::MAX);
    assert_eq!(decode_hello(&int32_field_with(i32::MIN as i64)).unwrap().shard_id, i32::MIN);
    assert!(decode_hello(&int32_field_with(i32::MAX as i64 + 1)).is_err());
}

#[test]
fn test_overlong_varint() {
    let mut bytes = vec![0x25];
    bytes.extend_from_slice(&[0xFF; 11]);
    assert!(matches!(
        decode_hello(&bytes),
        Err(CarbonError::InvalidVarint { .. })
    ));
}

#[test]
fn test_tenth_varint_byte_overflow() {
    let mut bytes = vec![0x26];
    bytes.extend_from_slice(&[0xFF; 9]);
    bytes.push(0x02);
    bytes.push(0x00);

    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    reader.read_field_header().unwrap();
    assert!(matches!(reader.read_i64(), Err(CarbonError::InvalidVarint { .. })));
}

#[test]
fn test_field_id_overflow() {
    // absolute id 32767, then a delta of 1
    let bytes = [0x05, 0xFE, 0xFF, 0x03, 0x00, 0x15, 0x00, 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    assert_eq!(reader.read_field_header().unwrap(), (FieldType::Int32, i16::MAX));
    reader.read_i32().unwrap();
    assert!(matches!(
        reader.read_field_header(),
        Err(CarbonError::IntegerOutOfRange { .. })
    ));
}

#[test]
fn test_absolute_field_id_out_of_range() {
    let mut bytes = vec![0x05];
    encode_varint(zigzag_encode(40_000), &mut bytes);
    let mut reader = CarbonProtocolReader::new(&bytes);
    assert!(matches!(
        reader.read_field_header(),
        Err(CarbonError::IntegerOutOfRange { .. })
    ));
}

#[test]
fn test_huge_list_count_fails_before_reading_elements() {
    // list<binary> claiming u32::MAX elements with nothing behind it
    let bytes = [0x19, 0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x00];
    let result: carbon::Result<KeyOnly> = deserialize_message(&bytes, &CodecConfig::default());
    assert!(matches!(result, Err(CarbonError::BufferUnderrun { .. })));
}

#[test]
fn test_huge_map_count_fails_before_reading_pairs() {
    let mut bytes = vec![0x1B, 0x05, 0x05];
    encode_varint(1 << 40, &mut bytes);
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    let (tag, _) = reader.read_field_header().unwrap();
    assert!(matches!(reader.skip(tag), Err(CarbonError::BufferUnderrun { .. })));
}

#[test]
fn test_huge_string_length() {
    let mut bytes = vec![0x1E];
    encode_varint(u64::MAX, &mut bytes);
    assert!(matches!(
        decode_hello(&bytes),
        Err(CarbonError::BufferUnderrun { .. })
    ));
}

#[test]
fn test_stop_element_type() {
    let result: carbon::Result<KeyOnly> =
        deserialize_message(&[0x19, 0x00, 0x00, 0x00], &CodecConfig::default());
    assert!(matches!(
        result,
        Err(CarbonError::InvalidElementType(FieldType::Stop))
    ));
}

#[test]
fn test_unknown_element_type() {
    let result: carbon::Result<KeyOnly> =
        deserialize_message(&[0x19, 0x0F, 0x00, 0x00], &CodecConfig::default());
    assert!(matches!(result, Err(CarbonError::UnknownTag(0x0F))));
}

#[test]
fn test_bad_bool_element() {
    // list<bool> whose element byte is not a bool tag
    let bytes = [0x19, 0x01, 0x01, 0x05];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    reader.read_field_header().unwrap();
    let (elem, count) = reader.read_list_begin().unwrap();
    assert_eq!((elem, count), (FieldType::BoolTrue, 1));
    assert!(reader.read_bool_element().is_err());
}

// =============================================================================
// Typed Reads
// =============================================================================

#[test]
fn test_read_field_type_mismatch() {
    let bytes = [0x1E, 0x01, b'k', 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    let (tag, _) = reader.read_field_header().unwrap();

    let mut target = 0i32;
    match reader.read_field(&mut target, tag) {
        Err(CarbonError::TypeMismatch { expected, actual }) => {
            assert_eq!(expected, FieldType::Int32);
            assert_eq!(actual, FieldType::String);
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
    assert!(!reader.read_field(&mut target, tag).unwrap_err().is_decode_error());
}

#[test]
fn test_read_field_accepts_both_bool_tags() {
    let bytes = [0x11, 0x12, 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();

    let mut first = false;
    let (tag, _) = reader.read_field_header().unwrap();
    reader.read_field(&mut first, tag).unwrap();
    let mut second = true;
    let (tag, id) = reader.read_field_header().unwrap();
    reader.read_field(&mut second, tag).unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(id, 2);
}

#[test]
fn test_strings_are_borrowed_in_strict_mode() {
    let bytes = [0x1E, 0x03, b'a', b'b', b'c', 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    reader.read_field_header().unwrap();

    match reader.read_str().unwrap() {
        Cow::Borrowed(s) => {
            assert_eq!(s, "abc");
            assert_eq!(s.as_ptr(), bytes[2..].as_ptr());
        }
        Cow::Owned(_) => panic!("valid UTF-8 should be borrowed"),
    }
}

#[test]
fn test_binary_is_borrowed() {
    let bytes = [0x18, 0x02, 0xAB, 0xCD, 0x00];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.read_struct_begin().unwrap();
    reader.read_field_header().unwrap();

    let blob = reader.read_binary().unwrap();
    assert_eq!(blob, &[0xAB, 0xCD]);
    assert_eq!(blob.as_ptr(), bytes[2..].as_ptr());
    assert_eq!(reader.remaining(), 1);
}

#[test]
fn test_zigzag_i64_extremes() {
    for value in [0i64, -1, 1, i64::MIN, i64::MAX] {
        let mut bytes = vec![0x16];
        encode_varint(zigzag_encode(value), &mut bytes);
        let mut reader = CarbonProtocolReader::new(&bytes);
        reader.read_field_header().unwrap();
        assert_eq!(reader.read_i64().unwrap(), value);
        assert!(reader.is_empty());
    }
}

#[test]
fn test_reader_does_not_modify_input() {
    let encoded = serialize_message(&HelloRequest::new("key", 3), &CodecConfig::default()).unwrap();
    let copy = encoded.clone();
    let _ = decode_hello(&encoded).unwrap();
    assert_eq!(encoded, copy);
}
