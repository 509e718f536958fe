// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! The node model shared by the working tree and the importer.

mod encoding;
pub mod hash;

use std::fmt;

pub use encoding::NODE_KEY_STORAGE_LENGTH;
pub use hash::{CryptoHash, HASH_LENGTH};

use crate::{Error, ExportNode, Result, Version};

/// Identity of a node: the version that created it and its position within
/// that version. Doubles as the node's storage key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub version: Version,
    pub position: u32,
}

impl NodeKey {
    /// Position of the root node within its version.
    pub const ROOT_POSITION: u32 = 1;

    pub fn new(version: Version, position: u32) -> Self {
        Self { version, position }
    }

    /// Identity under which the root of `version` is stored.
    pub fn root(version: Version) -> Self {
        Self::new(version, Self::ROOT_POSITION)
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.version, self.position)
    }
}

/// The part of a materialized node its parent needs: enough to link to it and
/// to compute the parent's size and hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeSummary {
    pub node_key: NodeKey,
    pub hash: CryptoHash,
    pub height: i8,
    pub size: i64,
}

/// A tree node.
///
/// Leaves carry a value and no children. Inner nodes carry no value, link to
/// both children by [NodeKey] and store the key of the leftmost leaf of their
/// right subtree.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) key: Vec<u8>,
    pub(crate) value: Option<Vec<u8>>,
    pub(crate) node_key: NodeKey,
    pub(crate) height: i8,
    pub(crate) size: i64,
    pub(crate) hash: Option<CryptoHash>,
    pub(crate) left_node_key: Option<NodeKey>,
    pub(crate) right_node_key: Option<NodeKey>,
    // Only set while a node is being built from its children; never encoded.
    pub(crate) left_node: Option<NodeSummary>,
    pub(crate) right_node: Option<NodeSummary>,
}

impl Node {
    /// Builds a node from an exported record and the already materialized
    /// children it adopts. Size and child links are derived from the
    /// children; nothing is validated yet.
    pub(crate) fn from_export(
        export: ExportNode,
        left: Option<NodeSummary>,
        right: Option<NodeSummary>,
    ) -> Self {
        let mut size = if export.height == 0 { 1 } else { 0 };
        size += left.map_or(0, |child| child.size);
        size += right.map_or(0, |child| child.size);

        Self {
            key: export.key,
            value: export.value,
            node_key: export.node_key,
            height: export.height,
            size,
            hash: None,
            left_node_key: left.map(|child| child.node_key),
            right_node_key: right.map(|child| child.node_key),
            left_node: left,
            right_node: right,
        }
    }

    #[inline]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    #[inline]
    pub fn node_key(&self) -> NodeKey {
        self.node_key
    }

    #[inline]
    pub fn height(&self) -> i8 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> i64 {
        self.size
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.height == 0
    }

    /// Identity of the left (`true`) or right (`false`) child, if any.
    #[inline]
    pub fn child_key(&self, left: bool) -> Option<NodeKey> {
        if left {
            self.left_node_key
        } else {
            self.right_node_key
        }
    }

    /// Returns the node hash, computing and caching it on first use.
    ///
    /// Inner nodes decoded from storage carry their hash. Inner nodes built
    /// during import need both in-memory children to be hashed.
    pub fn hash(&mut self) -> Result<CryptoHash> {
        if let Some(hash) = self.hash {
            return Ok(hash);
        }

        let version = self.node_key.version;
        let hash = if self.is_leaf() {
            hash::leaf_hash(
                self.height,
                self.size,
                version,
                &self.key,
                self.value.as_deref().unwrap_or_default(),
            )
        } else {
            match (&self.left_node, &self.right_node) {
                (Some(left), Some(right)) => {
                    hash::inner_hash(self.height, self.size, version, &left.hash, &right.hash)
                }
                _ => {
                    return Err(Error::StructuralInvariantViolation(format!(
                        "inner node {:?} is missing a child",
                        self.node_key
                    )))
                }
            }
        };

        self.hash = Some(hash);
        Ok(hash)
    }

    /// Checks the structural invariants of a single node.
    pub fn validate(&self) -> Result<()> {
        let violation = |message: String| Err(Error::StructuralInvariantViolation(message));

        if self.node_key.version <= 0 {
            return violation(format!(
                "node version must be greater than 0, got {}",
                self.node_key.version
            ));
        }
        if self.height < 0 {
            return violation(format!("height cannot be less than 0, got {}", self.height));
        }
        if self.size < 1 {
            return violation(format!("size must be at least 1, got {}", self.size));
        }

        let has_children = self.left_node_key.is_some() || self.right_node_key.is_some();
        if self.is_leaf() {
            if self.value.is_none() {
                return violation("value cannot be absent for leaf node".to_string());
            }
            if has_children {
                return violation("leaf node cannot have children".to_string());
            }
            if self.size != 1 {
                return violation(format!("leaf nodes must have size 1, got {}", self.size));
            }
        } else {
            if self.value.is_some() {
                return violation("value must be absent for non-leaf node".to_string());
            }
            if !has_children {
                return violation("inner node must have children".to_string());
            }
        }

        Ok(())
    }

    /// Reduces a hashed node to what its future parent needs.
    pub(crate) fn summary(&self) -> Result<NodeSummary> {
        let hash = self.hash.ok_or_else(|| {
            Error::StructuralInvariantViolation(format!("node {:?} was not hashed", self.node_key))
        })?;
        Ok(NodeSummary {
            node_key: self.node_key,
            hash,
            height: self.height,
            size: self.size,
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &hex::encode(&self.key))
            .field("value", &self.value.as_ref().map(hex::encode))
            .field("node_key", &self.node_key)
            .field("height", &self.height)
            .field("size", &self.size)
            .field("hash", &self.hash.map(hex::encode))
            .field("left", &self.left_node_key)
            .field("right", &self.right_node_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn leaf(key: &[u8], value: &[u8], version: Version, position: u32) -> ExportNode {
        ExportNode {
            key: key.to_vec(),
            value: Some(value.to_vec()),
            node_key: NodeKey::new(version, position),
            height: 0,
        }
    }

    fn summary_of(export: ExportNode) -> NodeSummary {
        let mut node = Node::from_export(export, None, None);
        node.hash().unwrap();
        node.summary().unwrap()
    }

    #[test]
    fn leaf_from_export() {
        let mut node = Node::from_export(leaf(b"a", b"1", 1, 2), None, None);
        assert_eq!(node.size(), 1);
        assert!(node.is_leaf());
        node.validate().expect("leaf should be valid");
        assert_eq!(
            hex::encode(node.hash().unwrap()),
            "bbe33cd0a785b97b9fb1f964aa71159dacd9e0ade84df7403dc0f9dc24818404"
        );
    }

    #[test]
    fn inner_node_sums_children() {
        let left = summary_of(leaf(b"a", b"1", 1, 2));
        let right = summary_of(leaf(b"b", b"2", 1, 3));
        let export = ExportNode {
            key: b"b".to_vec(),
            value: None,
            node_key: NodeKey::root(1),
            height: 1,
        };
        let mut node = Node::from_export(export, Some(left), Some(right));
        assert_eq!(node.size(), 2);
        assert_eq!(node.child_key(true), Some(NodeKey::new(1, 2)));
        assert_eq!(node.child_key(false), Some(NodeKey::new(1, 3)));
        node.validate().unwrap();
        assert_eq!(
            hex::encode(node.hash().unwrap()),
            "94b037ab65e50f94eb827902a873ee796cb04e3c9ad38c9860d84cbad668a9e7"
        );
    }

    #[test]
    fn inner_node_with_one_child_cannot_be_hashed() {
        let left = summary_of(leaf(b"a", b"1", 1, 2));
        let export = ExportNode {
            key: b"b".to_vec(),
            value: None,
            node_key: NodeKey::root(1),
            height: 1,
        };
        let mut node = Node::from_export(export, Some(left), None);
        assert_matches!(node.hash(), Err(Error::StructuralInvariantViolation(_)));
        assert!(node.summary().is_err());
    }

    #[test]
    fn leaf_without_value_is_invalid() {
        let mut export = leaf(b"a", b"", 1, 1);
        export.value = None;
        let node = Node::from_export(export, None, None);
        assert_matches!(node.validate(), Err(Error::StructuralInvariantViolation(_)));
    }

    #[test]
    fn leaf_with_empty_value_is_valid() {
        let node = Node::from_export(leaf(b"a", b"", 1, 1), None, None);
        node.validate().unwrap();
    }

    #[test]
    fn inner_node_with_value_is_invalid() {
        let left = summary_of(leaf(b"a", b"1", 1, 2));
        let right = summary_of(leaf(b"b", b"2", 1, 3));
        let export = ExportNode {
            key: b"b".to_vec(),
            value: Some(b"x".to_vec()),
            node_key: NodeKey::root(1),
            height: 1,
        };
        let node = Node::from_export(export, Some(left), Some(right));
        assert_matches!(node.validate(), Err(Error::StructuralInvariantViolation(_)));
    }

    #[test]
    fn version_zero_is_invalid() {
        let node = Node::from_export(leaf(b"a", b"1", 0, 1), None, None);
        assert_matches!(node.validate(), Err(Error::StructuralInvariantViolation(_)));
    }

    #[test]
    fn negative_height_is_invalid() {
        let mut export = leaf(b"a", b"1", 1, 1);
        export.height = -1;
        let node = Node::from_export(export, None, None);
        assert_matches!(node.validate(), Err(Error::StructuralInvariantViolation(_)));
    }

    #[test]
    fn childless_inner_node_has_no_size() {
        let export = ExportNode {
            key: b"a".to_vec(),
            value: None,
            node_key: NodeKey::root(1),
            height: 3,
        };
        let node = Node::from_export(export, None, None);
        assert_eq!(node.size(), 0);
        assert_matches!(node.validate(), Err(Error::StructuralInvariantViolation(_)));
    }
}
