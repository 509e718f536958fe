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

//! Layout of tree nodes and version metadata in the backing store.

use avlplus_storage::Storage;
use tracing::debug;

use crate::{
    tree::NODE_KEY_STORAGE_LENGTH, Error, Node, NodeKey, Result, Version, COMPONENT,
};

/// Prefix of node records in the data namespace.
pub const NODE_KEY_PREFIX: u8 = b's';
/// Prefix of root references for versions whose root was created earlier.
pub const ROOT_REFERENCE_PREFIX: u8 = b'r';
/// Metadata key of the latest visible version.
pub const LATEST_VERSION_KEY: &[u8] = b"latest_version";

/// What is stored for the root of a version.
#[derive(Debug)]
pub enum RootEntry {
    /// Nothing was ever committed for the version
    Missing,
    /// The version holds the empty tree
    Empty,
    /// The version's root node
    Node(Node),
}

/// Node database: maps node identities and versions onto storage keys.
pub struct NodeDb<S> {
    storage: S,
    latest_version: Version,
}

impl<S: Storage> NodeDb<S> {
    /// Opens the node database, reading the latest visible version.
    pub fn new(storage: S) -> Result<Self> {
        let latest_version = match storage
            .get_meta(LATEST_VERSION_KEY)
            .map_err(Error::StorageError)?
        {
            None => 0,
            Some(bytes) => {
                let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    Error::CorruptedData(format!(
                        "latest version entry has {} bytes, expected 8",
                        bytes.len()
                    ))
                })?;
                Version::from_be_bytes(bytes)
            }
        };

        Ok(Self {
            storage,
            latest_version,
        })
    }

    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Latest version made visible by a commit, 0 for a fresh store.
    #[inline]
    pub fn latest_version(&self) -> Version {
        self.latest_version
    }

    /// Storage key of a node.
    pub fn node_key(node_key: NodeKey) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + NODE_KEY_STORAGE_LENGTH);
        key.push(NODE_KEY_PREFIX);
        key.extend_from_slice(&node_key.to_storage_bytes());
        key
    }

    /// Storage key of the root reference of a version.
    pub fn root_reference_key(version: Version) -> Vec<u8> {
        let mut key = Vec::with_capacity(9);
        key.push(ROOT_REFERENCE_PREFIX);
        key.extend_from_slice(&version.to_be_bytes());
        key
    }

    /// Loads a node by identity.
    pub fn get_node(&self, node_key: NodeKey) -> Result<Option<Node>> {
        let Some(bytes) = self
            .storage
            .get(Self::node_key(node_key))
            .map_err(Error::StorageError)?
        else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Err(Error::CorruptedData(format!(
                "node {node_key:?} is an empty tree marker"
            )));
        }
        Node::decode(node_key, &bytes)
            .map(Some)
            .map_err(Error::EdError)
    }

    /// Loads what is stored for the root of `version`.
    pub fn get_root(&self, version: Version) -> Result<RootEntry> {
        let root_key = NodeKey::root(version);
        if let Some(bytes) = self
            .storage
            .get(Self::node_key(root_key))
            .map_err(Error::StorageError)?
        {
            if bytes.is_empty() {
                return Ok(RootEntry::Empty);
            }
            let node = Node::decode(root_key, &bytes).map_err(Error::EdError)?;
            return Ok(RootEntry::Node(node));
        }

        let Some(reference) = self
            .storage
            .get(Self::root_reference_key(version))
            .map_err(Error::StorageError)?
        else {
            return Ok(RootEntry::Missing);
        };
        let node_key = NodeKey::from_storage_bytes(&reference).ok_or_else(|| {
            Error::CorruptedData(format!("malformed root reference for version {version}"))
        })?;
        match self.get_node(node_key)? {
            Some(node) => Ok(RootEntry::Node(node)),
            None => Err(Error::CorruptedData(format!(
                "root {node_key:?} of version {version} is missing"
            ))),
        }
    }

    /// Makes `version` the latest visible version.
    pub fn reset_latest_version(&mut self, version: Version) -> Result<()> {
        self.storage
            .put_meta(LATEST_VERSION_KEY, &version.to_be_bytes())
            .map_err(Error::StorageError)?;
        debug!(target: COMPONENT, version, previous = self.latest_version, "latest version reset");
        self.latest_version = version;
        Ok(())
    }
}
