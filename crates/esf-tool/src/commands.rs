//! Subcommand implementations
//!
//! Every command returns the process exit status on success; errors are
//! reported by `main`.

use anyhow::{Context, Result, bail};
use esf_formats::compare::{self, Comparison};
use esf_formats::{CodecOptions, EsfFile, Node, Value};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

pub const EXIT_EQUAL: u8 = 0;
pub const EXIT_MISMATCH: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_ALLOWED_ONLY: u8 = 3;

/// Whether `err` was caused by a missing file
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    })
}

fn load(path: &Path, options: CodecOptions) -> Result<EsfFile> {
    EsfFile::load_with_options(path, options)
        .with_context(|| format!("failed to load {}", path.display()))
}

pub fn compare(left: &Path, right: &Path, allow: Option<&str>) -> Result<u8> {
    let a = load(left, CodecOptions::default())?;
    let b = load(right, CodecOptions::default())?;

    if a.variant() != b.variant() {
        println!("Different codec IDs: {} vs {}", a.variant(), b.variant());
    }

    let outcome = match allow {
        Some(suffix) => compare::first_mismatch_allowing(a.root(), b.root(), suffix),
        None => compare::first_mismatch(a.root(), b.root())
            .map_or(Comparison::Equal, Comparison::Mismatch),
    };

    Ok(match outcome {
        Comparison::Equal => {
            println!("Files are structurally equal");
            EXIT_EQUAL
        }
        Comparison::AllowedOnly => {
            println!("Files differ only under the allowed path");
            EXIT_ALLOWED_ONLY
        }
        Comparison::Mismatch(mismatch) => {
            println!("{mismatch}");
            EXIT_MISMATCH
        }
    })
}

/// Load, decode and rewrite a document, optionally replacing one integer
///
/// `mutation` is a record path and the integer to store in the first
/// integer value directly under it. With a mutation the output is compared
/// back against the input, allowing differences under that path only.
pub fn probe(
    input: &Path,
    output: &Path,
    keep_time: bool,
    mutation: Option<&(String, i64)>,
) -> Result<u8> {
    let started = Instant::now();
    info!("t={:?} load", started.elapsed());
    let mut file = load(input, CodecOptions::default())?;
    file.codec_mut().options_mut().stamp_edit_time = !keep_time;

    if let Some((path, value)) = mutation {
        let path = path.trim_matches('/');
        info!("t={:?} locate {}", started.elapsed(), path);
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(root) = file.root_mut().as_record_mut() else {
            bail!("root of {} is not a record", input.display());
        };
        let Some(children) = descend(&mut root.children, &parts) else {
            println!("Record {path} not found");
            return Ok(EXIT_MISMATCH);
        };
        let mutated = set_first_integer(children, *value)?;
        info!("t={:?} mutated={}", started.elapsed(), mutated);
    }

    info!("t={:?} write", started.elapsed());
    file.save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("t={:?} done", started.elapsed());

    let Some((path, _)) = mutation else {
        return Ok(EXIT_EQUAL);
    };
    let status = compare(input, output, Some(path.trim_matches('/')))?;
    if status == EXIT_ALLOWED_ONLY {
        println!("New file matches original except for intended mutation");
    } else {
        println!("New file has unexpected difference");
    }
    Ok(status)
}

/// Children of the record reached by following `parts` from `children`
///
/// Path components are record names, `NAME - i` for block entries and
/// `COMPRESSED_DATA` for a nested document.
fn descend<'a>(children: &'a mut [Node], parts: &[&str]) -> Option<&'a mut [Node]> {
    let Some((first, rest)) = parts.split_first() else {
        return Some(children);
    };
    let child = children
        .iter_mut()
        .find(|child| child.name() == Some(*first))?;
    enter(child, rest)
}

fn enter<'a>(node: &'a mut Node, rest: &[&str]) -> Option<&'a mut [Node]> {
    match node {
        Node::Record(record) => descend(&mut record.children, rest),
        Node::Block(block) => {
            let (first, rest) = rest.split_first()?;
            let index = (0..block.entries.len()).find(|&i| block.entry_name(i) == *first)?;
            descend(block.entries.get_mut(index)?, rest)
        }
        Node::Compressed(compressed) => {
            let root = compressed.document_mut().root_mut();
            match rest.split_first() {
                Some((first, rest)) if root.name() == Some(*first) => enter(root, rest),
                _ => None,
            }
        }
        Node::Value(_) | Node::Array(_) | Node::Raw(_) => None,
    }
}

/// Store `value` in the first signed or unsigned 32-bit value of `children`
fn set_first_integer(children: &mut [Node], value: i64) -> Result<bool> {
    for child in children {
        let Node::Value(node) = child else {
            continue;
        };
        let replacement = match node.value() {
            Value::I32(_) => Value::I32(
                i32::try_from(value).with_context(|| format!("{value} does not fit an int32"))?,
            ),
            Value::U32(_) => Value::U32(
                u32::try_from(value).with_context(|| format!("{value} does not fit a uint32"))?,
            ),
            _ => continue,
        };
        debug!("Replacing {} with {}", node.value(), replacement);
        node.set_value(replacement)?;
        return Ok(true);
    }
    Ok(false)
}

pub fn dump(input: &Path, tree_only: bool, expand: bool) -> Result<u8> {
    let options = CodecOptions::default().with_expand_compressed(expand);
    let file = load(input, options)?;
    let json = if tree_only {
        serde_json::to_string_pretty(file.root())?
    } else {
        serde_json::to_string_pretty(&file)?
    };
    println!("{json}");
    Ok(EXIT_EQUAL)
}

/// Node totals gathered by [`count_nodes`]
#[derive(Debug, Default, PartialEq, Eq)]
struct NodeCounts {
    nodes: usize,
    records: usize,
    nested: usize,
}

fn count_nodes(node: &Node, counts: &mut NodeCounts) {
    counts.nodes += 1;
    match node {
        Node::Record(record) => {
            counts.records += 1;
            for child in &record.children {
                count_nodes(child, counts);
            }
        }
        Node::Block(block) => {
            counts.records += block.entries.len();
            for child in block.entries.iter().flatten() {
                count_nodes(child, counts);
            }
        }
        Node::Compressed(compressed) => {
            counts.nested += 1;
            count_nodes(compressed.root(), counts);
        }
        Node::Value(_) | Node::Array(_) | Node::Raw(_) => {}
    }
}

pub fn info(input: &Path) -> Result<u8> {
    let file = load(input, CodecOptions::default())?;
    let codec = file.codec();
    let header = codec.header();

    println!("Variant:        {}", file.variant());
    println!("Header size:    {} bytes", file.variant().header_size());
    println!("Table offset:   0x{:X}", header.table_offset);
    if let Some(time) = header.edit_time() {
        let secs = time
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        println!("Edit time:      {secs} (unix seconds)");
    }
    println!("Node names:     {}", codec.node_names().len());
    if file.variant().uses_string_tables() {
        println!("UTF-16 strings: {}", codec.string_tables().utf16.len());
        println!("ASCII strings:  {}", codec.string_tables().ascii.len());
    }

    let mut counts = NodeCounts::default();
    count_nodes(file.root(), &mut counts);
    println!("Root:           {}", file.root());
    println!("Nodes:          {}", counts.nodes);
    println!("Records:        {}", counts.records);
    println!("Nested docs:    {}", counts.nested);
    Ok(EXIT_EQUAL)
}
