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

//! Versioned Merkle AVL+ tree with bulk import.
//!
//! Nodes are identified by the version that created them and a position
//! within that version, and are stored under that identity. A tree can be
//! rebuilt from the post-order node stream of an export in a single pass with
//! [MutableTree::import]; the imported version only becomes visible once the
//! import is committed.

/// Error and Result types.
mod error;
/// Exported node records.
mod export;
/// Bulk import sessions.
pub mod import;
/// The top-level tree API.
mod mutable_tree;
/// Storage layout of nodes and versions.
pub mod node_db;
mod options;
/// Various helpers useful for tests or benchmarks.
#[cfg(feature = "test_utils")]
pub mod test_utils;
/// The node model.
pub mod tree;

pub use avlplus_storage as storage;
pub use error::{Error, Result};
pub use export::ExportNode;
pub use import::Importer;
pub use mutable_tree::MutableTree;
pub use options::{ImportOptions, DEFAULT_MAX_BATCH_SIZE};
pub use tree::{CryptoHash, Node, NodeKey, NodeSummary, HASH_LENGTH};

/// Tree versions. Committed versions are positive; 0 denotes a store that
/// holds no version yet.
pub type Version = i64;

/// Logging target of this crate.
pub const COMPONENT: &str = "avlplus-tree";
