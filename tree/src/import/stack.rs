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

use crate::tree::NodeSummary;

/// Children adopted by an incoming node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Children {
    None,
    Left(NodeSummary),
    Both(NodeSummary, NodeSummary),
}

impl Children {
    pub(crate) fn left(&self) -> Option<NodeSummary> {
        match self {
            Children::None => None,
            Children::Left(left) | Children::Both(left, _) => Some(*left),
        }
    }

    pub(crate) fn right(&self) -> Option<NodeSummary> {
        match self {
            Children::Both(_, right) => Some(*right),
            _ => None,
        }
    }

    fn count(&self) -> usize {
        match self {
            Children::None => 0,
            Children::Left(_) => 1,
            Children::Both(..) => 2,
        }
    }
}

/// Roots of the subtrees built so far that no ancestor has adopted yet, in
/// the order they were completed.
///
/// A post-order stream is folded bottom-left up: a node adopts the most
/// recently completed subtrees as its children when they are strictly lower
/// than itself. Pending subtrees of equal or greater height belong to a
/// branch further left and stay on the stack until their own parent arrives.
#[derive(Debug, Default)]
pub(crate) struct ReconstructionStack {
    entries: Vec<NodeSummary>,
}

impl ReconstructionStack {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::with_capacity(8),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Works out which pending subtrees a node of `height` adopts, without
    /// touching the stack.
    pub(crate) fn children_for(&self, height: i8) -> Children {
        match self.entries.as_slice() {
            [.., left, right] if left.height < height && right.height < height => {
                Children::Both(*left, *right)
            }
            [.., top] if top.height < height => Children::Left(*top),
            _ => Children::None,
        }
    }

    /// Replaces the adopted children with their new parent.
    pub(crate) fn attach(&mut self, children: &Children, parent: NodeSummary) {
        let remaining = self.entries.len() - children.count();
        debug_assert_eq!(
            self.entries[remaining..].first().copied(),
            children.left(),
            "adopted children must be the top of the stack"
        );
        self.entries.truncate(remaining);
        self.entries.push(parent);
    }

    /// The single remaining subtree, once the stream is complete
    pub(crate) fn root(&self) -> Option<&NodeSummary> {
        match self.entries.as_slice() {
            [root] => Some(root),
            _ => None,
        }
    }
}
