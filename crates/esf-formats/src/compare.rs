//! Structural comparison of node trees
//!
//! Walks two trees in step and reports the first place they differ: the
//! path of record names leading there plus a one-line summary of each side.
//! Record blocks contribute one path component per entry (`NAME - i`), and
//! a compressed node compares as a `COMPRESSED_DATA` record whose only
//! child is the nested root. Record and block versions are compared along
//! with names; block entries carry no version of their own.

use serde::Serialize;
use std::fmt;

use crate::compressed::CompressedNode;
use crate::node::Node;
use crate::types::TypeCode;

/// First difference between two trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Slash-separated record path, with sibling indices appended
    pub path: String,
    /// Summary of the left-hand node
    pub left: String,
    /// Summary of the right-hand node
    pub right: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "First mismatch at path: {}", self.path)?;
        writeln!(f, "A: {}", self.left)?;
        write!(f, "B: {}", self.right)
    }
}

/// Outcome of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// The trees are structurally identical
    Equal,
    /// The trees differ only under the allowed path
    AllowedOnly,
    /// The trees differ elsewhere
    Mismatch(Mismatch),
}

/// First difference between two trees, if any
pub fn first_mismatch(left: &Node, right: &Node) -> Option<Mismatch> {
    match compare(left, right, None) {
        Comparison::Mismatch(mismatch) => Some(mismatch),
        Comparison::Equal | Comparison::AllowedOnly => None,
    }
}

/// Compare two trees, ignoring differences at paths ending in `allowed`
pub fn first_mismatch_allowing(left: &Node, right: &Node, allowed: &str) -> Comparison {
    compare(left, right, Some(allowed))
}

fn compare(left: &Node, right: &Node, allowed: Option<&str>) -> Comparison {
    let mut walker = Walker {
        allowed,
        path: Vec::new(),
        skipped: false,
    };
    match walker.visit(&Item::Node(left), &Item::Node(right)) {
        Some(mismatch) => Comparison::Mismatch(mismatch),
        None if walker.skipped => Comparison::AllowedOnly,
        None => Comparison::Equal,
    }
}

/// A node, or one entry of a record block viewed as a record
enum Item<'a> {
    Node(&'a Node),
    Entry { name: String, children: &'a [Node] },
}

struct Parent<'a> {
    name: String,
    version: u8,
    children: Vec<Item<'a>>,
}

impl<'a> Item<'a> {
    fn type_code(&self) -> TypeCode {
        match self {
            Self::Node(node) => node.type_code(),
            Self::Entry { .. } => TypeCode::RECORD,
        }
    }

    fn as_parent(&self) -> Option<Parent<'a>> {
        match self {
            Self::Node(Node::Record(record)) => Some(Parent {
                name: record.name.clone(),
                version: record.version,
                children: record.children.iter().map(Item::Node).collect(),
            }),
            Self::Node(Node::Block(block)) => Some(Parent {
                name: block.name.clone(),
                version: block.version,
                children: block
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, children)| Item::Entry {
                        name: block.entry_name(i),
                        children,
                    })
                    .collect(),
            }),
            Self::Node(Node::Compressed(compressed)) => Some(Parent {
                name: CompressedNode::NAME.to_string(),
                version: compressed.version(),
                children: vec![Item::Node(compressed.root())],
            }),
            Self::Entry { name, children } => Some(Parent {
                name: name.clone(),
                version: 0,
                children: children.iter().map(Item::Node).collect(),
            }),
            Self::Node(Node::Value(_) | Node::Array(_) | Node::Raw(_)) => None,
        }
    }

    fn summary(&self) -> String {
        match self.as_parent() {
            Some(parent) => format!("{} \"{}\"", self.type_code(), parent.name),
            None => match self {
                Self::Node(node) => format!("{} {}", node.type_code(), node),
                Self::Entry { name, .. } => name.clone(),
            },
        }
    }

    fn leaf_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Node(a), Self::Node(b)) => a == b,
            _ => false,
        }
    }
}

struct Walker<'p> {
    allowed: Option<&'p str>,
    path: Vec<String>,
    skipped: bool,
}

impl Walker<'_> {
    fn joined(&self) -> String {
        self.path.join("/")
    }

    fn is_allowed(&mut self) -> bool {
        let joined = self.joined();
        let allowed = self.allowed.is_some_and(|suffix| joined.ends_with(suffix));
        self.skipped |= allowed;
        allowed
    }

    fn mismatch(&self, left: &Item<'_>, right: &Item<'_>) -> Mismatch {
        Mismatch {
            path: format!("/{}", self.joined()),
            left: left.summary(),
            right: right.summary(),
        }
    }

    fn visit(&mut self, left: &Item<'_>, right: &Item<'_>) -> Option<Mismatch> {
        if left.type_code() != right.type_code() && !self.is_allowed() {
            return Some(self.mismatch(left, right));
        }

        let (Some(left_parent), Some(right_parent)) = (left.as_parent(), right.as_parent()) else {
            if !left.leaf_eq(right) && !self.is_allowed() {
                return Some(self.mismatch(left, right));
            }
            return None;
        };

        if left_parent.name != right_parent.name {
            return Some(self.mismatch(left, right));
        }
        if left_parent.version != right_parent.version && !self.is_allowed() {
            return Some(Mismatch {
                path: format!("/{}", self.joined()),
                left: format!("{} (Version={})", left.summary(), left_parent.version),
                right: format!("{} (Version={})", right.summary(), right_parent.version),
            });
        }
        if left_parent.children.len() != right_parent.children.len() {
            return Some(Mismatch {
                path: format!("/{}/{}", self.joined(), left_parent.name),
                left: format!(
                    "{} (Children={})",
                    left.summary(),
                    left_parent.children.len()
                ),
                right: format!(
                    "{} (Children={})",
                    right.summary(),
                    right_parent.children.len()
                ),
            });
        }

        self.path.push(left_parent.name);
        let mut found = None;
        for (i, (l, r)) in left_parent
            .children
            .iter()
            .zip(&right_parent.children)
            .enumerate()
        {
            if let Some(mut mismatch) = self.visit(l, r) {
                mismatch.path.push_str(&format!(" [index {i}]"));
                found = Some(mismatch);
                break;
            }
        }
        self.path.pop();
        found
    }
}
