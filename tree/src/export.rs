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

//! Records produced by walking a tree version in depth-first post-order.

use crate::{NodeKey, Version};

/// A single node of an exported tree.
///
/// Leaves carry `value: Some(..)` (possibly empty bytes) and `height == 0`.
/// Inner nodes carry `value: None`; their key is the key of the leftmost leaf
/// of their right subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportNode {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
    pub node_key: NodeKey,
    pub height: i8,
}

impl ExportNode {
    /// Exported leaf
    pub fn leaf(key: Vec<u8>, value: Vec<u8>, version: Version, position: u32) -> Self {
        Self {
            key,
            value: Some(value),
            node_key: NodeKey::new(version, position),
            height: 0,
        }
    }

    /// Exported inner node
    pub fn inner(key: Vec<u8>, height: i8, version: Version, position: u32) -> Self {
        Self {
            key,
            value: None,
            node_key: NodeKey::new(version, position),
            height,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.node_key.version
    }
}
