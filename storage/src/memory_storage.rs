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

//! In-memory storage backend.
//!
//! Keeps data and metadata in ordered maps. There is no durability, so plain
//! and synchronous batch writes behave the same; they are only counted
//! separately so callers can observe how a tree flushes.

use std::{cell::RefCell, collections::BTreeMap};

use tracing::trace;

use crate::{Batch, Error, Storage, COMPONENT};

/// Counters describing how batches reached the storage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    /// Number of non-durable batch writes
    pub batch_writes: usize,
    /// Number of durable batch writes
    pub sync_batch_writes: usize,
    /// Largest number of operations carried by a single batch
    pub largest_batch: usize,
}

#[derive(Default)]
struct Inner {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    meta: BTreeMap<Vec<u8>, Vec<u8>>,
    stats: WriteStats,
}

/// Storage which keeps everything in memory.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RefCell<Inner>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch write counters collected so far
    pub fn stats(&self) -> WriteStats {
        self.inner.borrow().stats
    }

    /// Number of records in the data namespace
    pub fn len(&self) -> usize {
        self.inner.borrow().data.len()
    }

    /// Data namespace emptiness predicate
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the data namespace in key order
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.inner
            .borrow()
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn apply(&self, batch: &MemoryBatch, sync: bool) {
        let mut inner = self.inner.borrow_mut();
        let len = batch.operations.len();
        inner.stats.largest_batch = inner.stats.largest_batch.max(len);
        if sync {
            inner.stats.sync_batch_writes += 1;
        } else {
            inner.stats.batch_writes += 1;
        }
        inner
            .data
            .extend(batch.operations.iter().map(|(k, v)| (k.clone(), v.clone())));
        trace!(target: COMPONENT, operations = len, sync, "applied memory batch");
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryStorage")
            .field("records", &inner.data.len())
            .field("meta", &inner.meta.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

/// Batch of deferred puts for [MemoryStorage]
#[derive(Default)]
pub struct MemoryBatch {
    operations: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Batch for MemoryBatch {
    fn put<K: AsRef<[u8]>>(&mut self, key: K, value: &[u8]) -> Result<(), Error> {
        self.operations
            .insert(key.as_ref().to_vec(), value.to_vec());
        Ok(())
    }

    fn len(&self) -> usize {
        self.operations.len()
    }
}

impl std::fmt::Debug for MemoryBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for (key, value) in &self.operations {
            list.entry(&(hex::encode(key), hex::encode(value)));
        }
        list.finish()
    }
}

impl Storage for MemoryStorage {
    type Batch = MemoryBatch;

    fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.inner.borrow().data.get(key.as_ref()).cloned())
    }

    fn get_meta<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.inner.borrow().meta.get(key.as_ref()).cloned())
    }

    fn put_meta<K: AsRef<[u8]>>(&self, key: K, value: &[u8]) -> Result<(), Error> {
        self.inner
            .borrow_mut()
            .meta
            .insert(key.as_ref().to_vec(), value.to_vec());
        Ok(())
    }

    fn new_batch(&self) -> Self::Batch {
        MemoryBatch::default()
    }

    fn write_batch(&self, batch: &Self::Batch) -> Result<(), Error> {
        self.apply(batch, false);
        Ok(())
    }

    fn write_batch_sync(&self, batch: &Self::Batch) -> Result<(), Error> {
        self.apply(batch, true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_invisible_until_written() {
        let storage = MemoryStorage::new();
        let mut batch = storage.new_batch();
        batch.put(b"key1", b"value1").expect("cannot put into batch");
        batch.put(b"key2", b"value2").expect("cannot put into batch");
        assert_eq!(batch.len(), 2);

        assert!(storage.get(b"key1").unwrap().is_none());

        storage.write_batch(&batch).expect("cannot write batch");
        assert_eq!(storage.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(storage.len(), 2);
        assert_eq!(
            storage.stats(),
            WriteStats {
                batch_writes: 1,
                sync_batch_writes: 0,
                largest_batch: 2,
            }
        );
    }

    #[test]
    fn dropped_batch_is_discarded() {
        let storage = MemoryStorage::new();
        {
            let mut batch = storage.new_batch();
            batch.put(b"key", b"value").unwrap();
        }
        assert!(storage.is_empty());
        assert_eq!(storage.stats(), WriteStats::default());
    }

    #[test]
    fn sync_writes_are_counted_separately() {
        let storage = MemoryStorage::new();
        let mut batch = storage.new_batch();
        batch.put(b"a", b"").unwrap();
        storage.write_batch_sync(&batch).unwrap();
        storage.write_batch_sync(&storage.new_batch()).unwrap();

        let stats = storage.stats();
        assert_eq!(stats.sync_batch_writes, 2);
        assert_eq!(stats.batch_writes, 0);
        assert_eq!(storage.get(b"a").unwrap(), Some(vec![]));
    }

    #[test]
    fn meta_is_separate_from_data() {
        let storage = MemoryStorage::new();
        storage.put_meta(b"key", b"meta").unwrap();
        assert!(storage.get(b"key").unwrap().is_none());
        assert_eq!(storage.get_meta(b"key").unwrap(), Some(b"meta".to_vec()));
    }

    #[test]
    fn storage_reference_delegates() {
        fn write_through<S: Storage>(storage: S) {
            let mut batch = storage.new_batch();
            batch.put(b"k", b"v").unwrap();
            storage.write_batch(&batch).unwrap();
        }

        let storage = MemoryStorage::new();
        write_through(&storage);
        assert_eq!(storage.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn written_batch_is_left_intact() {
        let storage = MemoryStorage::new();
        let mut batch = storage.new_batch();
        batch.put(b"a", b"1").unwrap();
        storage.write_batch(&batch).unwrap();
        assert_eq!(batch.len(), 1);

        batch.put(b"b", b"2").unwrap();
        storage.write_batch(&batch).unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.stats().batch_writes, 2);
    }
}
