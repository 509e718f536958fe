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

//! Working state of a versioned tree.

use avlplus_storage::Storage;
use tracing::{debug, instrument};

use crate::{
    node_db::{NodeDb, RootEntry},
    tree::hash,
    CryptoHash, Error, ImportOptions, Importer, Node, Result, Version, COMPONENT,
};

/// A versioned tree over a backing store.
///
/// Only the root of the loaded version is held in memory; lookups descend
/// through stored nodes.
pub struct MutableTree<S> {
    pub(crate) ndb: NodeDb<S>,
    root: Option<Node>,
    version: Version,
}

impl<S: Storage> MutableTree<S> {
    /// Opens a tree over `storage`. No version is loaded; the working state
    /// starts out empty.
    pub fn new(storage: S) -> Result<Self> {
        Ok(Self {
            ndb: NodeDb::new(storage)?,
            root: None,
            version: 0,
        })
    }

    /// Whether the working state holds no nodes
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Version currently loaded into the working state
    pub fn version(&self) -> Version {
        self.version
    }

    /// Latest version visible in storage
    pub fn latest_version(&self) -> Version {
        self.ndb.latest_version()
    }

    /// Root hash of the working state. The empty tree hashes to the digest
    /// of no input.
    pub fn root_hash(&self) -> CryptoHash {
        self.root
            .as_ref()
            .and_then(|root| root.hash)
            .unwrap_or_else(hash::empty_hash)
    }

    /// Number of leaves
    pub fn size(&self) -> i64 {
        self.root.as_ref().map_or(0, Node::size)
    }

    /// Height of the root, 0 for empty and single leaf trees
    pub fn height(&self) -> i8 {
        self.root.as_ref().map_or(0, Node::height)
    }

    pub fn node_db(&self) -> &NodeDb<S> {
        &self.ndb
    }

    /// Loads `version` into the working state.
    #[instrument(target = COMPONENT, skip(self), err)]
    pub fn load_version(&mut self, version: Version) -> Result<Version> {
        let root = match self.ndb.get_root(version)? {
            RootEntry::Missing => return Err(Error::VersionNotFound(version)),
            RootEntry::Empty => None,
            RootEntry::Node(mut root) => {
                root.hash()?;
                Some(root)
            }
        };

        self.root = root;
        self.version = version;
        debug!(target: COMPONENT, version, size = self.size(), "loaded version");
        Ok(version)
    }

    /// Looks up the value stored under `key` in the working state.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };

        let mut next = match Self::step(root, key)? {
            Step::Found(value) => return Ok(value),
            Step::Descend(node_key) => node_key,
        };
        loop {
            let node = self.ndb.get_node(next)?.ok_or_else(|| {
                Error::CorruptedData(format!("node {next:?} is referenced but missing"))
            })?;
            next = match Self::step(&node, key)? {
                Step::Found(value) => return Ok(value),
                Step::Descend(node_key) => node_key,
            };
        }
    }

    fn step(node: &Node, key: &[u8]) -> Result<Step> {
        if node.is_leaf() {
            return Ok(Step::Found(
                (node.key() == key).then(|| node.value().unwrap_or_default().to_vec()),
            ));
        }
        let go_left = key < node.key();
        node.child_key(go_left).map(Step::Descend).ok_or_else(|| {
            Error::CorruptedData(format!(
                "inner node {:?} has no {} child",
                node.node_key(),
                if go_left { "left" } else { "right" }
            ))
        })
    }

    /// Starts importing an exported tree as `version`, using default options.
    pub fn import(&mut self, version: Version) -> Result<Importer<'_, S>> {
        self.import_with_options(version, ImportOptions::default())
    }

    /// Starts importing an exported tree as `version`.
    ///
    /// The tree must be empty and the store must not hold any version yet.
    pub fn import_with_options(
        &mut self,
        version: Version,
        options: ImportOptions,
    ) -> Result<Importer<'_, S>> {
        Importer::new(self, version, options)
    }
}

enum Step {
    Found(Option<Vec<u8>>),
    Descend(crate::NodeKey),
}
