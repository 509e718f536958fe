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

//! Bulk import of exported trees.
//!
//! An [Importer] rebuilds a tree from the [ExportNode] stream of a depth-first
//! post-order (LRN) walk, writing nodes to storage as they are completed, and
//! publishes the result as a new version on [Importer::commit].

mod batch;
mod stack;

use avlplus_storage::Storage;
use tracing::{info, instrument, warn};

use self::{batch::BatchWriter, stack::ReconstructionStack};
use crate::{
    node_db::NodeDb, Error, ExportNode, ImportOptions, MutableTree, Node, NodeKey, Result,
    Version, COMPONENT,
};

/// Imports data into an empty [MutableTree].
///
/// Nodes must be added in the order produced by an export, i.e. depth-first
/// post-order. Nodes are periodically flushed to storage, but the imported
/// version only becomes visible once [Importer::commit] succeeds.
///
/// The importer borrows the tree mutably for its whole lifetime, so nothing
/// else can read or modify the tree while an import is in progress.
pub struct Importer<'t, S: Storage> {
    tree: Option<&'t mut MutableTree<S>>,
    version: Version,
    batch: Option<BatchWriter<S::Batch>>,
    stack: ReconstructionStack,
}

impl<'t, S: Storage> Importer<'t, S> {
    /// `version` should be the version that was exported. It must be greater
    /// than or equal to the version of every node added.
    pub(crate) fn new(
        tree: &'t mut MutableTree<S>,
        version: Version,
        options: ImportOptions,
    ) -> Result<Self> {
        if version < 0 {
            return Err(Error::Precondition(
                "imported version cannot be negative".to_string(),
            ));
        }
        if tree.latest_version() > 0 {
            return Err(Error::Precondition(format!(
                "found database at version {}, must be 0",
                tree.latest_version()
            )));
        }
        if !tree.is_empty() {
            return Err(Error::Precondition("tree must be empty".to_string()));
        }

        let batch = BatchWriter::new(tree.ndb.storage(), options.max_batch_size);
        Ok(Self {
            tree: Some(tree),
            version,
            batch: Some(batch),
            stack: ReconstructionStack::new(),
        })
    }

    /// Version the import will be published as
    pub fn version(&self) -> Version {
        self.version
    }

    /// Subtrees built so far that still wait for their parent
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Node writes buffered and not yet flushed
    pub fn buffered_writes(&self) -> usize {
        self.batch.as_ref().map_or(0, BatchWriter::buffered)
    }

    /// Intermediate flushes performed so far
    pub fn flushes(&self) -> usize {
        self.batch.as_ref().map_or(0, BatchWriter::flushes)
    }

    /// Whether the importer can still accept nodes
    pub fn is_active(&self) -> bool {
        self.tree.is_some()
    }

    /// Adds the next exported node.
    ///
    /// On error the importer state is left as it was before the call, but
    /// the import as a whole should be abandoned.
    pub fn add(&mut self, export: ExportNode) -> Result<()> {
        let (Some(tree), Some(batch)) = (self.tree.as_deref(), self.batch.as_mut()) else {
            return Err(Error::NoActiveImport);
        };
        if export.version() > self.version {
            return Err(Error::InvalidRecord(format!(
                "node version {} can't be greater than import version {}",
                export.version(),
                self.version
            )));
        }

        // The stack is only changed once the node has been built, validated
        // and accepted by the batch.
        let children = self.stack.children_for(export.height);
        let mut node = Node::from_export(export, children.left(), children.right());
        node.hash()?;
        node.validate()?;

        let bytes = node.encode().map_err(Error::EdError)?;
        batch.set(
            tree.ndb.storage(),
            &NodeDb::<S>::node_key(node.node_key()),
            &bytes,
        )?;

        self.stack.attach(&children, node.summary()?);
        Ok(())
    }

    /// Adds nodes in order, stopping at the first error.
    pub fn add_all<I>(&mut self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = ExportNode>,
    {
        nodes.into_iter().try_for_each(|node| self.add(node))
    }

    /// Flushes all outstanding nodes, makes the version visible and loads it
    /// into the tree.
    ///
    /// Commit can only be attempted once: the importer is closed afterwards
    /// whether it succeeded or not.
    #[instrument(target = COMPONENT, skip_all, fields(version = self.version), err)]
    pub fn commit(&mut self) -> Result<()> {
        let result = self.publish();
        self.close();
        result
    }

    fn publish(&mut self) -> Result<()> {
        let (Some(tree), Some(mut batch)) = (self.tree.as_deref_mut(), self.batch.take()) else {
            return Err(Error::NoActiveImport);
        };
        let version = self.version;
        let root_key = NodeKey::root(version);

        match self.stack.len() {
            0 => batch.set(tree.ndb.storage(), &NodeDb::<S>::node_key(root_key), &[])?,
            1 => {
                // The root itself was written by the last add. If it was
                // created at an older version it is not found under the root
                // identity of this one, so point to it.
                let root = self.stack.root().map(|root| root.node_key);
                if let Some(node_key) = root.filter(|node_key| *node_key != root_key) {
                    batch.set(
                        tree.ndb.storage(),
                        &NodeDb::<S>::root_reference_key(version),
                        &node_key.to_storage_bytes(),
                    )?;
                }
            }
            size => {
                warn!(target: COMPONENT, stack_size = size, "malformed import structure");
                return Err(Error::MalformedImportStructure(size));
            }
        }

        batch.finish(tree.ndb.storage())?;
        tree.ndb.reset_latest_version(version)?;
        tree.load_version(version)?;

        info!(
            target: COMPONENT,
            version,
            size = tree.size(),
            root_hash = %hex::encode(tree.root_hash()),
            "import committed"
        );
        Ok(())
    }

    /// Frees all resources. Safe to call multiple times. Nodes flushed before
    /// closing stay in storage but are never visible.
    pub fn close(&mut self) {
        self.batch = None;
        self.tree = None;
    }
}

impl<'t, S: Storage> Drop for Importer<'t, S> {
    fn drop(&mut self) {
        self.close();
    }
}
