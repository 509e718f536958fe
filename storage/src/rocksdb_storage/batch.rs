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

use std::collections::BTreeMap;

use crate::{Batch, Error};

/// Deferred puts for [super::RocksDbStorage]. The RocksDB write batch is only
/// built when the batch is written, so the operations survive a failed write.
#[derive(Default)]
pub struct RocksDbBatch {
    operations: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl RocksDbBatch {
    pub(super) fn build_write_batch(&self) -> rocksdb::WriteBatch {
        let mut batch = rocksdb::WriteBatch::default();
        for (key, value) in &self.operations {
            batch.put(key, value);
        }
        batch
    }
}

impl Batch for RocksDbBatch {
    fn put<K: AsRef<[u8]>>(&mut self, key: K, value: &[u8]) -> Result<(), Error> {
        self.operations.insert(key.as_ref().to_vec(), value.to_vec());
        Ok(())
    }

    fn len(&self) -> usize {
        self.operations.len()
    }
}
