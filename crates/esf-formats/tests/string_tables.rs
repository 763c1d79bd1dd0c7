#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! String-table id stability on hand-built documents

use esf_formats::{
    CodecOptions, EsfFile, Node, RecordNode, StringTableMode, Value, ValueNode, Variant,
};
use pretty_assertions::assert_eq;

/// 16-byte header for `magic` with the given table offset
fn header(magic: u32, table_offset: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&magic.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0x6000_0000u32.to_le_bytes());
    out.extend_from_slice(&table_offset.to_le_bytes());
    out
}

fn ascii_entry(out: &mut Vec<u8>, value: &str, id: u32) {
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(&id.to_le_bytes());
}

/// ABCA document whose ASCII ids are sparse: {0: "a", 2: "b", 3: "c"}
fn sparse_ids_document() -> Vec<u8> {
    let mut out = header(0xABCA, 34);
    // ROOT, short info form, 15 bytes of children
    out.extend_from_slice(&[0x80, 0x00, 0x0F]);
    for id in [0u32, 2, 3] {
        out.push(0x0F);
        out.extend_from_slice(&id.to_le_bytes());
    }
    assert_eq!(out.len(), 34);

    out.extend_from_slice(&[1, 0, 4, 0]);
    out.extend_from_slice(b"ROOT");
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&3u32.to_le_bytes());
    ascii_entry(&mut out, "a", 0);
    ascii_entry(&mut out, "b", 2);
    ascii_entry(&mut out, "c", 3);
    out
}

fn strings(file: &EsfFile) -> Vec<String> {
    file.root()
        .as_record()
        .expect("Test operation should succeed")
        .values()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[test]
fn unmodified_document_rebuilds_byte_identical() {
    let data = sparse_ids_document();
    let file = EsfFile::parse(&data).expect("Test operation should succeed");
    assert_eq!(strings(&file), vec!["a", "b", "c"]);
    assert_eq!(file.build().expect("Test operation should succeed"), data);
}

#[test]
fn new_value_takes_lowest_free_id() {
    let data = sparse_ids_document();
    let mut file = EsfFile::parse(&data).expect("Test operation should succeed");
    file.root_mut()
        .as_record_mut()
        .expect("Test operation should succeed")
        .push(ValueNode::ascii("new"));

    let rebuilt = file.build().expect("Test operation should succeed");
    let reparsed = EsfFile::parse(&rebuilt).expect("Test operation should succeed");
    let ascii = &reparsed.codec().string_tables().ascii;
    assert_eq!(
        ascii.iter().collect::<Vec<_>>(),
        vec![(0, "a"), (1, "new"), (2, "b"), (3, "c")]
    );
    assert_eq!(strings(&reparsed), vec!["a", "b", "c", "new"]);

    // The existing references still point at their original ids
    assert_eq!(&rebuilt[20..24], &0u32.to_le_bytes());
    assert_eq!(&rebuilt[25..29], &2u32.to_le_bytes());
    assert_eq!(&rebuilt[30..34], &3u32.to_le_bytes());
    assert_eq!(&rebuilt[35..39], &1u32.to_le_bytes());
}

#[test]
fn reset_mode_renumbers_from_zero() {
    let data = sparse_ids_document();
    let options = CodecOptions::default().with_string_tables(StringTableMode::Reset);
    let file = EsfFile::parse_with_options(&data, options).expect("Test operation should succeed");

    let rebuilt = file.build().expect("Test operation should succeed");
    let reparsed = EsfFile::parse(&rebuilt).expect("Test operation should succeed");
    assert_eq!(
        reparsed.codec().string_tables().ascii.iter().collect::<Vec<_>>(),
        vec![(0, "a"), (1, "b"), (2, "c")]
    );
    assert_eq!(reparsed.root(), file.root());
}

#[test]
fn duplicate_ids_resolve_to_first_entry() {
    let mut data = header(0xABCF, 29);
    data.extend_from_slice(&[0x80, 0, 0, 0]);
    data.extend_from_slice(&29u32.to_le_bytes());
    data.push(0x0F);
    data.extend_from_slice(&3u32.to_le_bytes());
    data.extend_from_slice(&[1, 0, 4, 0]);
    data.extend_from_slice(b"ROOT");
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&2u32.to_le_bytes());
    ascii_entry(&mut data, "first", 3);
    ascii_entry(&mut data, "second", 3);

    let file = EsfFile::parse(&data).expect("Test operation should succeed");
    assert_eq!(strings(&file), vec!["first"]);
    assert_eq!(file.codec().string_tables().ascii.len(), 1);
}

#[test]
fn unresolved_id_is_an_error_except_zero() {
    let mut data = header(0xABCF, 29);
    data.extend_from_slice(&[0x80, 0, 0, 0]);
    data.extend_from_slice(&29u32.to_le_bytes());
    data.push(0x0F);
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&[1, 0, 4, 0]);
    data.extend_from_slice(b"ROOT");
    data.extend_from_slice(&[0; 8]);

    let file = EsfFile::parse(&data).expect("Test operation should succeed");
    assert_eq!(strings(&file), vec![""]);

    // Point the value at id 9, which has no entry
    data[25] = 9;
    assert!(EsfFile::parse(&data).is_err());
}

#[test]
fn empty_string_does_not_consume_an_id() {
    let root: Node = RecordNode::new("ROOT")
        .with_child(ValueNode::ascii(""))
        .with_child(ValueNode::ascii("x"))
        .into();
    let bytes = EsfFile::new(Variant::Abcf, root.clone())
        .build()
        .expect("Test operation should succeed");
    let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");

    assert_eq!(parsed.root(), &root);
    assert_eq!(
        parsed.codec().string_tables().ascii.iter().collect::<Vec<_>>(),
        vec![(1, "x")]
    );
}

#[test]
fn inline_variants_write_no_string_tables() {
    let root: Node = RecordNode::new("ROOT")
        .with_child(ValueNode::utf16("inline"))
        .into();
    for variant in [Variant::Abcd, Variant::Abce, Variant::Abcb] {
        let bytes = EsfFile::new(variant, root.clone())
            .build()
            .expect("Test operation should succeed");
        // Node-name table is the last thing in the stream
        assert!(bytes.ends_with(b"\x01\x00\x04\x00ROOT"), "{variant}");
        let parsed = EsfFile::parse(&bytes).expect("Test operation should succeed");
        assert!(parsed.codec().string_tables().utf16.is_empty());
    }
}
