//! Tests for skipping unknown fields
//!
//! Each test places a value the reader has no schema for in front of a
//! sentinel field and checks the sentinel still decodes.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use carbon::hellogoodbye::HelloRequest;
use carbon::protocol::{
    deserialize_message, serialize_message, CarbonProtocolReader, CarbonProtocolWriter,
    CarbonType, FieldType,
};
use carbon::{CarbonError, CodecConfig};

use crate::schemas::{Everything, HelloRequestV2, Node, NodeValue};

const SENTINEL: i32 = 0x5EED;

// =============================================================================
// Helper Functions
// =============================================================================

/// Encode `{1: value, 2: SENTINEL}`
fn with_sentinel<T: CarbonType>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut writer = CarbonProtocolWriter::new(&mut buf);
    writer.write_struct_begin().unwrap();
    writer.write_field(1, value).unwrap();
    writer.write_field(2, &SENTINEL).unwrap();
    writer.write_stop();
    writer.write_struct_end();
    buf
}

/// Skip field 1 and check the sentinel and the final position
fn assert_skips<T: CarbonType>(value: &T) {
    let bytes = with_sentinel(value);
    let mut reader = CarbonProtocolReader::new(&bytes);

    reader.read_struct_begin().unwrap();
    let (tag, id) = reader.read_field_header().unwrap();
    assert_eq!(id, 1);
    reader.skip(tag).unwrap();

    assert_eq!(reader.read_field_header().unwrap(), (FieldType::Int32, 2));
    assert_eq!(reader.read_i32().unwrap(), SENTINEL);
    assert_eq!(reader.read_field_header().unwrap().0, FieldType::Stop);
    reader.read_struct_end().unwrap();

    assert_eq!(reader.position(), bytes.len());
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_skip_bools() {
    assert_skips(&true);
    assert_skips(&false);
}

#[test]
fn test_skip_integers() {
    assert_skips(&-5i8);
    assert_skips(&i16::MIN);
    assert_skips(&i32::MAX);
    assert_skips(&i64::MIN);
    assert_skips(&u64::MAX);
}

#[test]
fn test_skip_floating_point() {
    assert_skips(&1.25f32);
    assert_skips(&-3.5e300f64);
}

#[test]
fn test_skip_string_and_binary() {
    assert_skips(&String::new());
    assert_skips(&"x".repeat(300));
    assert_skips(&Bytes::from_static(&[0, 1, 2, 3]));
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_skip_lists() {
    assert_skips(&Vec::<i32>::new());
    assert_skips(&vec![1i64, -2, 3]);
    assert_skips(&vec![true, false, false]);
    assert_skips(&vec!["a".to_string(), String::new()]);
    assert_skips(&vec![vec![1.0f64], vec![], vec![2.0, 3.0]]);
}

#[test]
fn test_skip_sets() {
    let set: BTreeSet<i16> = [3, 1, 2].into_iter().collect();
    assert_skips(&set);
}

#[test]
fn test_skip_maps() {
    let mut map = BTreeMap::new();
    map.insert("a".to_string(), vec![true]);
    map.insert("b".to_string(), vec![]);
    assert_skips(&map);

    let mut nested = BTreeMap::new();
    nested.insert(1i8, map);
    assert_skips(&nested);
}

#[test]
fn test_skip_structs() {
    assert_skips(&HelloRequest::new("k", 7));
    assert_skips(&vec![HelloRequest::new("a", 1), HelloRequest::default()]);
    assert_skips(&Node::chain(5));
}

#[test]
fn test_skip_struct_with_absolute_ids() {
    let mut buf = Vec::new();
    let config = CodecConfig::default().with_compact_field_ids(false);
    let mut writer = CarbonProtocolWriter::with_config(&mut buf, config);
    writer.write_struct_begin().unwrap();
    writer.write_field(1, &HelloRequest::new("k", 7)).unwrap();
    writer.write_field(2, &SENTINEL).unwrap();
    writer.write_stop();
    writer.write_struct_end();

    let mut reader = CarbonProtocolReader::new(&buf);
    reader.read_struct_begin().unwrap();
    let (tag, _) = reader.read_field_header().unwrap();
    reader.skip(tag).unwrap();
    assert_eq!(reader.read_field_header().unwrap(), (FieldType::Int32, 2));
}

// =============================================================================
// Whole Messages
// =============================================================================

#[test]
fn test_skip_entire_message() {
    let bytes = serialize_message(&Everything::sample(), &CodecConfig::default()).unwrap();
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.skip(FieldType::Struct).unwrap();
    assert!(reader.is_empty());
}

#[test]
fn test_skip_nested_chain_via_value_reader() {
    let bytes = serialize_message(&Node::chain(20), &CodecConfig::default()).unwrap();
    let decoded: NodeValue = deserialize_message(&bytes, &CodecConfig::default()).unwrap();
    assert_eq!(decoded.value, 0);
}

#[test]
fn test_skip_respects_depth_limit() {
    let bytes = serialize_message(&Node::chain(20), &CodecConfig::default()).unwrap();
    let config = CodecConfig::default().with_max_depth(10);

    let result: carbon::Result<NodeValue> = deserialize_message(&bytes, &config);
    assert!(matches!(result, Err(CarbonError::DepthExceeded { max: 10 })));
}

#[test]
fn test_skip_truncated_value() {
    let bytes = serialize_message(&HelloRequestV2::sample(), &CodecConfig::default()).unwrap();
    let truncated = &bytes[..bytes.len() - 3];

    let mut reader = CarbonProtocolReader::new(truncated);
    assert!(matches!(
        reader.skip(FieldType::Struct),
        Err(CarbonError::BufferUnderrun { .. })
    ));
}

#[test]
fn test_skip_bool_elements() {
    let bytes = [0x01, 0x02, 0x01, b'z'];
    let mut reader = CarbonProtocolReader::new(&bytes);
    reader.skip_element(FieldType::BoolTrue).unwrap();
    reader.skip_element(FieldType::BoolFalse).unwrap();
    assert_eq!(reader.position(), 2);
    reader.skip_element(FieldType::String).unwrap();
    assert!(reader.is_empty());
}
