//! Document helpers shared by module tests

use crate::error::EsfError;
use crate::file::EsfFile;
use crate::node::Node;
use crate::variant::Variant;

/// Variants that can be both parsed and built
pub const BUILDABLE: [Variant; 5] = [
    Variant::Abcd,
    Variant::Abce,
    Variant::Abcf,
    Variant::Abca,
    Variant::Abcb,
];

/// Build `root` as a `variant` document, parse it back and build it again
///
/// Fails unless the parsed tree equals `root` and the second build matches
/// the first byte for byte. Returns the built document.
pub fn round_trip(variant: Variant, root: &Node) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let bytes = EsfFile::new(variant, root.clone()).build()?;
    let parsed = EsfFile::parse(&bytes)?;

    if parsed.variant() != variant || parsed.root() != root {
        return Err(format!(
            "{variant} round trip changed the tree:\nOriginal: {root:?}\nParsed: {:?}",
            parsed.root()
        )
        .into());
    }
    if parsed.build()? != bytes {
        return Err(format!("{variant} re-encode differs from the first build").into());
    }

    Ok(bytes)
}

/// [`round_trip`] in every buildable variant
pub fn round_trip_all(root: &Node) -> Result<(), Box<dyn std::error::Error>> {
    for variant in BUILDABLE {
        round_trip(variant, root)?;
    }
    Ok(())
}

/// Error that parsing `data` must fail with
pub fn parse_error(data: &[u8]) -> Result<EsfError, Box<dyn std::error::Error>> {
    match EsfFile::parse(data) {
        Ok(file) => Err(format!(
            "expected parsing {} bytes to fail, got {:?}",
            data.len(),
            file.root()
        )
        .into()),
        Err(err) => Ok(err),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::node::{RecordNode, ValueNode};

    #[test]
    fn test_round_trip_reports_bytes() {
        let root: Node = RecordNode::new("A").with_child(ValueNode::int32(5)).into();
        let bytes = round_trip(Variant::Abcd, &root).expect("Test operation should succeed");
        assert_eq!(&bytes[..4], &0xABCDu32.to_le_bytes());
    }

    #[test]
    fn test_parse_error_on_valid_document() {
        let root: Node = RecordNode::new("A").into();
        let bytes = round_trip(Variant::Abca, &root).expect("Test operation should succeed");
        assert!(parse_error(&bytes).is_err());
        assert!(matches!(
            parse_error(&bytes[..2]).expect("Test operation should succeed"),
            EsfError::Truncated { .. }
        ));
    }
}
