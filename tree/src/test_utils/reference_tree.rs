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

//! In-memory trees built independently of the importer, used as the source
//! of export streams and expected hashes.

use std::collections::BTreeMap;

use rand::prelude::*;

use crate::{
    tree::hash::{empty_hash, inner_hash, leaf_hash},
    CryptoHash, ExportNode, NodeKey, Version,
};

/// Fully materialized node of a [ReferenceTree]
#[derive(Debug, Clone)]
pub struct ReferenceNode {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
    pub node_key: NodeKey,
    pub height: i8,
    pub size: i64,
    pub hash: CryptoHash,
    pub left: Option<Box<ReferenceNode>>,
    pub right: Option<Box<ReferenceNode>>,
}

impl ReferenceNode {
    fn build(
        entries: &[(Vec<u8>, Vec<u8>)],
        first: usize,
        version: Version,
        split: &mut dyn FnMut(usize) -> usize,
    ) -> Self {
        if let [(key, value)] = entries {
            // spread leaves over all versions up to the tree version
            let leaf_version = 1 + first as Version % version;
            return ReferenceNode {
                key: key.clone(),
                value: Some(value.clone()),
                node_key: NodeKey::new(leaf_version, 0),
                height: 0,
                size: 1,
                hash: Default::default(),
                left: None,
                right: None,
            };
        }

        let mid = split(entries.len()).clamp(1, entries.len() - 1);
        let left = Self::build(&entries[..mid], first, version, split);
        let right = Self::build(&entries[mid..], first + mid, version, split);
        ReferenceNode {
            key: entries[mid].0.clone(),
            value: None,
            node_key: NodeKey::new(left.node_key.version.max(right.node_key.version), 0),
            height: left.height.max(right.height) + 1,
            size: left.size + right.size,
            hash: Default::default(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Numbers nodes in pre-order, separately for every version.
    fn assign_positions(&mut self, next: &mut BTreeMap<Version, u32>) {
        let position = next.entry(self.node_key.version).or_insert(NodeKey::ROOT_POSITION);
        self.node_key.position = *position;
        *position += 1;
        for child in [&mut self.left, &mut self.right].into_iter().flatten() {
            child.assign_positions(next);
        }
    }

    fn rehash(&mut self) -> CryptoHash {
        let version = self.node_key.version;
        self.hash = match (&mut self.left, &mut self.right) {
            (Some(left), Some(right)) => {
                let (left, right) = (left.rehash(), right.rehash());
                inner_hash(self.height, self.size, version, &left, &right)
            }
            _ => leaf_hash(
                self.height,
                self.size,
                version,
                &self.key,
                self.value.as_deref().unwrap_or_default(),
            ),
        };
        self.hash
    }

    fn export_into(&self, out: &mut Vec<ExportNode>) {
        for child in [&self.left, &self.right].into_iter().flatten() {
            child.export_into(out);
        }
        out.push(ExportNode {
            key: self.key.clone(),
            value: self.value.clone(),
            node_key: self.node_key,
            height: self.height,
        });
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a ReferenceNode)) {
        f(self);
        for child in [&self.left, &self.right].into_iter().flatten() {
            child.visit(f);
        }
    }
}

/// A tree at a given version, built from sorted entries
#[derive(Debug, Clone)]
pub struct ReferenceTree {
    root: Option<ReferenceNode>,
    version: Version,
}

impl ReferenceTree {
    /// Empty tree at `version`
    pub fn empty(version: Version) -> Self {
        Self {
            root: None,
            version,
        }
    }

    /// Height balanced tree over sorted, distinct `entries`. Leaves get
    /// versions spread over `1..=version`, inner nodes the newest version
    /// below them and the root `version` itself.
    pub fn balanced(entries: Vec<(Vec<u8>, Vec<u8>)>, version: Version) -> Self {
        Self::with_split(entries, version, &mut |len| len / 2)
    }

    /// Tree of arbitrary shape over sorted, distinct `entries`
    pub fn random_shape(entries: Vec<(Vec<u8>, Vec<u8>)>, version: Version, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::with_split(entries, version, &mut |len| rng.gen_range(1..len))
    }

    /// Same shape, keys and values, but every node created at `node_version`
    /// while the tree is published as `version`.
    pub fn uniform(
        entries: Vec<(Vec<u8>, Vec<u8>)>,
        node_version: Version,
        version: Version,
    ) -> Self {
        let mut tree = Self::balanced(entries, node_version);
        if let Some(root) = &mut tree.root {
            root.visit_mut(&mut |node| node.node_key.version = node_version);
            root.assign_positions(&mut BTreeMap::new());
            root.rehash();
        }
        tree.version = version;
        tree
    }

    fn with_split(
        entries: Vec<(Vec<u8>, Vec<u8>)>,
        version: Version,
        split: &mut dyn FnMut(usize) -> usize,
    ) -> Self {
        assert!(version > 0, "non-empty trees need a positive version");
        let root = (!entries.is_empty()).then(|| {
            let mut root = ReferenceNode::build(&entries, 0, version, split);
            root.node_key.version = version;
            root.assign_positions(&mut BTreeMap::new());
            root.rehash();
            root
        });
        Self { root, version }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn root(&self) -> Option<&ReferenceNode> {
        self.root.as_ref()
    }

    pub fn root_hash(&self) -> CryptoHash {
        self.root.as_ref().map_or_else(empty_hash, |root| root.hash)
    }

    pub fn size(&self) -> i64 {
        self.root.as_ref().map_or(0, |root| root.size)
    }

    pub fn height(&self) -> i8 {
        self.root.as_ref().map_or(0, |root| root.height)
    }

    /// Depth-first post-order (LRN) export stream
    pub fn export(&self) -> Vec<ExportNode> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.export_into(&mut out);
        }
        out
    }

    /// Leaf entries in key order
    pub fn leaves(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.visit(&mut |node| {
                if let Some(value) = &node.value {
                    out.push((node.key.clone(), value.clone()));
                }
            });
        }
        out
    }
}

impl ReferenceNode {
    fn visit_mut(&mut self, f: &mut impl FnMut(&mut ReferenceNode)) {
        f(self);
        for child in [&mut self.left, &mut self.right].into_iter().flatten() {
            child.visit_mut(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_utils::make_entries_seq;

    #[test]
    fn balanced_tree_shape() {
        let tree = ReferenceTree::balanced(make_entries_seq(0..7), 3);
        let root = tree.root().unwrap();
        assert_eq!(root.node_key, NodeKey::root(3));
        assert_eq!(tree.size(), 7);
        assert_eq!(tree.height(), 3);
        assert_eq!(root.key, 3u64.to_be_bytes().to_vec());
        assert_eq!(tree.leaves(), make_entries_seq(0..7));
    }

    #[test]
    fn export_is_post_order() {
        let tree = ReferenceTree::balanced(make_entries_seq(0..2), 1);
        let export = tree.export();
        assert_eq!(export.len(), 3);
        assert_eq!(export[0].height, 0);
        assert_eq!(export[1].height, 0);
        assert_eq!(export[2].node_key, NodeKey::root(1));
        assert!(export[2].value.is_none());
    }

    #[test]
    fn identities_are_unique() {
        let tree = ReferenceTree::random_shape(make_entries_seq(0..200), 5, 7);
        let export = tree.export();
        let identities: HashSet<_> = export.iter().map(|node| node.node_key).collect();
        assert_eq!(identities.len(), export.len());
        assert!(export.iter().all(|node| node.version() <= 5));
    }

    #[test]
    fn uniform_tree_keeps_old_root() {
        let tree = ReferenceTree::uniform(make_entries_seq(0..4), 1, 3);
        assert_eq!(tree.version(), 3);
        assert_eq!(tree.root().unwrap().node_key, NodeKey::root(1));
    }
}
