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

//! Test utils

mod faulty_storage;
mod reference_tree;

use std::ops::Range;

pub use faulty_storage::{Fault, FaultyBatch, FaultyStorage};
use rand::prelude::*;
pub use reference_tree::{ReferenceNode, ReferenceTree};

use crate::{storage::Storage, MutableTree, Result};

/// Sorted entries with big-endian `u64` keys taken from `range`
pub fn make_entries_seq(range: Range<u64>) -> Vec<(Vec<u8>, Vec<u8>)> {
    range
        .map(|n| (n.to_be_bytes().to_vec(), format!("value{n}").into_bytes()))
        .collect()
}

/// `count` sorted entries with distinct random keys and random values, some
/// of them empty
pub fn make_entries_rand(count: usize, seed: u64) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut entries = std::collections::BTreeMap::new();
    while entries.len() < count {
        let key_len = rng.gen_range(1..16);
        let value_len = rng.gen_range(0..32);
        let key: Vec<u8> = (0..key_len).map(|_| rng.gen()).collect();
        let value: Vec<u8> = (0..value_len).map(|_| rng.gen()).collect();
        entries.insert(key, value);
    }
    entries.into_iter().collect()
}

/// Imports the post-order export of `reference` into a fresh tree over
/// `storage` and commits it.
pub fn import_reference<S: Storage>(
    storage: S,
    reference: &ReferenceTree,
) -> Result<MutableTree<S>> {
    let mut tree = MutableTree::new(storage)?;
    let mut importer = tree.import(reference.version())?;
    importer.add_all(reference.export())?;
    importer.commit()?;
    drop(importer);
    Ok(tree)
}
