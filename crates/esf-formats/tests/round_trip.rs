#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Encode/decode round trips across every supported variant

use esf_formats::{
    ArrayNode, Codec, CodecOptions, EsfError, EsfFile, EsfWriter, Node, RawNode, RecordBlockNode,
    RecordNode, TypeCode, Type26, Value, ValueNode, Variant,
};
use pretty_assertions::assert_eq;

const SUPPORTED: [Variant; 5] = [
    Variant::Abcd,
    Variant::Abce,
    Variant::Abcf,
    Variant::Abca,
    Variant::Abcb,
];

/// A tree touching every node kind and most value kinds
fn kitchen_sink() -> Node {
    let arrays = RecordNode::new("ARRAYS")
        .with_child(
            ArrayNode::new(
                TypeCode::INT32_ARRAY,
                vec![Value::I32(-1), Value::I32(0), Value::I32(i32::MAX)],
            )
            .expect("Test operation should succeed"),
        )
        .with_child(
            ArrayNode::new(
                TypeCode::ASCII_ARRAY,
                vec![Value::Ascii("x".into()), Value::Ascii(String::new())],
            )
            .expect("Test operation should succeed"),
        )
        .with_child(
            ArrayNode::new(TypeCode::UTF16_ARRAY, vec![Value::Utf16("\u{3042}".into())])
                .expect("Test operation should succeed"),
        )
        .with_child(ArrayNode::empty(esf_formats::ValueKind::Coord3d));

    RecordNode::new("ROOT")
        .with_version(1)
        .with_child(ValueNode::boolean(false))
        .with_child(Value::I8(-8))
        .with_child(Value::I16(-16))
        .with_child(Value::I64(-64))
        .with_child(Value::U8(8))
        .with_child(Value::U16(16))
        .with_child(Value::U64(u64::MAX))
        .with_child(Value::F64(std::f64::consts::PI))
        .with_child(ValueNode::coord2d(1.5, -2.5))
        .with_child(ValueNode::coord3d(1.0, 2.0, 3.0))
        .with_child(Value::Angle(180))
        .with_child(Value::Type26(Type26 {
            first: 2,
            data: vec![0, 1, 2, 3, 4, 5, 6],
        }))
        .with_child(ValueNode::ascii("faction"))
        .with_child(ValueNode::utf16("\u{00c9}mile"))
        .with_child(RawNode::new(vec![0xFF; 10]))
        .with_child(arrays)
        .with_child(
            RecordBlockNode::new("REGIONS")
                .with_version(3)
                .with_entry(vec![ValueNode::ascii("north").into()])
                .with_entry(vec![
                    ValueNode::ascii("south").into(),
                    RecordNode::new("ARMY").into(),
                ]),
        )
        .into()
}

#[test]
fn every_variant_round_trips() {
    let root = kitchen_sink();
    for variant in SUPPORTED {
        let file = EsfFile::new(variant, root.clone());
        let bytes = file.build().expect("Test operation should succeed");
        let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
        assert_eq!(parsed.variant(), variant);
        assert_eq!(parsed.root(), &root, "variant {variant}");
        assert_eq!(
            parsed.build().expect("Test operation should succeed"),
            bytes,
            "re-encode of {variant}"
        );
    }
}

#[test]
fn minimal_abca_document() {
    let root: Node = RecordNode::new("A").with_child(ValueNode::int32(42)).into();
    let bytes = EsfFile::new(Variant::Abca, root)
        .build()
        .expect("Test operation should succeed");

    let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
    let record = parsed.root().as_record().expect("Test operation should succeed");
    assert_eq!(record.name, "A");
    assert_eq!(record.children.len(), 1);
    let Node::Value(value) = &record.children[0] else {
        panic!("expected a value node, got {:?}", record.children[0]);
    };
    assert_eq!(value.code().to_string(), "INT32");
    assert_eq!(value.value(), &Value::I32(42));
}

#[test]
fn array_length_is_byte_count() {
    let array = ArrayNode::new(
        TypeCode::UINT16_ARRAY,
        vec![Value::U16(1), Value::U16(2), Value::U16(3)],
    )
    .expect("Test operation should succeed");
    let root: Node = RecordNode::new("A").with_child(array).into();

    // Compact variants: varint byte count, not element count
    let bytes = EsfFile::new(Variant::Abcb, root.clone())
        .build()
        .expect("Test operation should succeed");
    assert_eq!(&bytes[19..21], &[0x47, 6]);
    assert_eq!(&bytes[21..27], &[1, 0, 2, 0, 3, 0]);

    // Classic variants: absolute end offset of the elements
    let bytes = EsfFile::new(Variant::Abce, root)
        .build()
        .expect("Test operation should succeed");
    let end = 24 + 1 + 4 + 6;
    assert_eq!(bytes[24], 0x47);
    assert_eq!(&bytes[25..29], &(end as u32).to_le_bytes());
}

#[test]
fn array_length_must_cover_whole_elements() {
    let array = ArrayNode::new(TypeCode::INT32_ARRAY, vec![Value::I32(1), Value::I32(2)])
        .expect("Test operation should succeed");
    let root: Node = RecordNode::new("A").with_child(array).into();
    let mut bytes = EsfFile::new(Variant::Abcb, root)
        .build()
        .expect("Test operation should succeed");

    // Record size 10 -> 9 and array size 8 -> 6: the second element straddles the end
    assert_eq!(&bytes[16..20], &[0x80, 0x00, 10, 0x44]);
    bytes[18] = 8;
    bytes[20] = 6;
    assert!(EsfFile::parse(&bytes).is_err());
}

#[test]
fn truncated_document_reports_offset() {
    let root: Node = RecordNode::new("A").with_child(ValueNode::int32(7)).into();
    let bytes = EsfFile::new(Variant::Abce, root)
        .build()
        .expect("Test operation should succeed");

    let err = EsfFile::parse(&bytes[..10]).unwrap_err();
    assert!(matches!(err, EsfError::Truncated { offset: 0, needed: 16, .. }));
}

#[test]
fn edited_compact_values_re_encode() {
    let root: Node = RecordNode::new("A")
        .with_child(
            ValueNode::new(TypeCode::UINT32_ONE, Value::U32(1)).expect("Test operation should succeed"),
        )
        .with_child(
            ArrayNode::new(TypeCode::INT32_BYTE_ARRAY, vec![Value::I32(1), Value::I32(-1)])
                .expect("Test operation should succeed"),
        )
        .into();
    let mut file = EsfFile::new(Variant::Abca, root);

    let record = file
        .root_mut()
        .as_record_mut()
        .expect("Test operation should succeed");
    if let Node::Value(value) = &mut record.children[0] {
        value
            .set_value(Value::U32(5_000_000))
            .expect("Test operation should succeed");
    }
    if let Node::Array(array) = &mut record.children[1] {
        array
            .push(Value::I32(1000))
            .expect("Test operation should succeed");
    }

    let bytes = file.build().expect("Test operation should succeed");
    let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
    let record = parsed.root().as_record().expect("Test operation should succeed");
    assert_eq!(record.children[0].type_code(), TypeCode::UINT32_24BIT);
    assert_eq!(record.children[0].as_value(), Some(&Value::U32(5_000_000)));
    assert_eq!(record.children[1].type_code(), TypeCode::INT32_ARRAY);
    assert_eq!(record.children[1].to_string(), "1 -1 1000");
}

fn type26(trailer: bool) -> Value {
    let mut data = vec![0; 7];
    if trailer {
        data.push(0x9C);
    }
    Value::Type26(Type26 { first: 1, data })
}

#[test]
fn record_after_type26_never_starts_with_trailer_byte() {
    // Version 14, name index 1: the short info byte would be 0x9C
    let root: Node = RecordNode::new("ROOT")
        .with_child(type26(false))
        .with_child(RecordNode::new("X").with_version(14))
        .into();
    let bytes = EsfFile::new(Variant::Abca, root.clone())
        .build()
        .expect("Test operation should succeed");
    assert_eq!(&bytes[16..21], &[0x80, 0x00, 14, 0x26, 0x01]);
    assert_eq!(&bytes[28..33], &[0xA0, 0x01, 0x00, 14, 0x00]);

    let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
    assert_eq!(parsed.root(), &root);
    assert_eq!(parsed.build().expect("Test operation should succeed"), bytes);

    // With a trailer present the short form is unambiguous
    let root: Node = RecordNode::new("ROOT")
        .with_child(type26(true))
        .with_child(RecordNode::new("X").with_version(14))
        .into();
    let bytes = EsfFile::new(Variant::Abca, root.clone())
        .build()
        .expect("Test operation should succeed");
    assert_eq!(&bytes[28..31], &[0x9C, 0x9C, 0x01]);
    let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
    assert_eq!(parsed.root(), &root);
}

#[test]
fn type26_trailer_is_not_read_past_its_record() {
    let root: Node = RecordNode::new("ROOT")
        .with_child(RecordNode::new("A").with_child(type26(false)))
        .with_child(RecordNode::new("X").with_version(14))
        .into();
    for variant in [Variant::Abca, Variant::Abcb] {
        let bytes = EsfFile::new(variant, root.clone())
            .build()
            .expect("Test operation should succeed");
        // A spans 19..31; X follows it in short form, starting with 0x9C
        assert_eq!(&bytes[19..22], &[0x80, 0x01, 9]);
        assert_eq!(&bytes[31..34], &[0x9C, 0x02, 0x00]);

        let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
        assert_eq!(parsed.root(), &root, "variant {variant}");
    }
}

/// ABCB document of `depth` records nested one inside the other
fn nested_records(depth: usize) -> Vec<u8> {
    let template = EsfFile::new(Variant::Abcb, RecordNode::new("R").into())
        .build()
        .expect("Test operation should succeed");
    let tables = template[19..].to_vec();

    let mut headers = Vec::with_capacity(depth);
    let mut inner_len = 0usize;
    for _ in 0..depth {
        let mut writer = EsfWriter::new();
        writer.write_u8(0x80);
        writer.write_u8(0x00);
        writer
            .write_varint(inner_len as u32)
            .expect("Test operation should succeed");
        inner_len += writer.position();
        headers.push(writer.into_inner());
    }

    let mut out = template[..16].to_vec();
    for header in headers.iter().rev() {
        out.extend_from_slice(header);
    }
    let table_offset = out.len() as u32;
    out[12..16].copy_from_slice(&table_offset.to_le_bytes());
    out.extend_from_slice(&tables);
    out
}

#[test]
fn deep_nesting_is_an_error() {
    let bytes = nested_records(100_000);
    let err = EsfFile::parse(&bytes).unwrap_err();
    assert!(matches!(err, EsfError::NestingTooDeep { limit: 256, .. }));

    let shallow = nested_records(40);
    let options = CodecOptions::default().with_max_depth(40);
    assert!(EsfFile::parse_with_options(&shallow, options.clone()).is_ok());
    assert!(matches!(
        EsfFile::parse_with_options(&shallow, options.with_max_depth(39)).unwrap_err(),
        EsfError::NestingTooDeep { limit: 39, .. }
    ));
}

#[test]
fn codec_reports_header_and_tables() {
    let root: Node = RecordNode::new("ROOT")
        .with_child(RecordNode::new("CHILD"))
        .with_child(ValueNode::ascii("one"))
        .into();
    let bytes = Codec::new(Variant::Abcf)
        .encode_root(&root)
        .expect("Test operation should succeed");
    let (codec, _) = Codec::parse(&bytes).expect("Test operation should succeed");

    assert_eq!(codec.variant(), Variant::Abcf);
    assert_eq!(codec.node_names().iter().collect::<Vec<_>>(), vec!["ROOT", "CHILD"]);
    assert_eq!(codec.string_tables().ascii.get(0), Some("one"));
    assert!(codec.header().edit_time().is_some());
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::I32),
            any::<u32>().prop_map(Value::U32),
            any::<i64>().prop_map(Value::I64),
            (-1.0e6f32..1.0e6).prop_map(Value::F32),
            "[a-zA-Z0-9 _]{0,12}".prop_map(Value::Ascii),
            "\\PC{0,8}".prop_map(Value::Utf16),
            (1u8..8, any::<[u8; 7]>(), any::<bool>()).prop_map(|(first, data, trailer)| {
                let mut data = data.to_vec();
                if trailer {
                    data.push(0x9C);
                }
                Value::Type26(Type26 { first, data })
            }),
        ]
    }

    fn node() -> impl Strategy<Value = Node> {
        let leaf = value().prop_map(Node::from);
        leaf.prop_recursive(3, 32, 4, |inner| {
            (
                "[A-Z]{1,6}",
                0u8..40,
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(name, version, children)| {
                    Node::Record(RecordNode {
                        name,
                        version,
                        children,
                    })
                })
        })
    }

    fn variant() -> impl Strategy<Value = Variant> {
        prop::sample::select(SUPPORTED.to_vec())
    }

    proptest! {
        /// Any tree survives encode then decode unchanged
        #[test]
        fn tree_round_trip(child in node(), variant in variant()) {
            let root: Node = RecordNode::new("ROOT").with_child(child).into();
            let file = EsfFile::new(variant, root.clone());
            let bytes = file.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
            let parsed = EsfFile::parse(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(parsed.root(), &root);
        }
    }
}
