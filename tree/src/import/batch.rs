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

use avlplus_storage::{Batch, Storage};
use tracing::debug;

use crate::{Error, Result, COMPONENT};

/// Buffers node writes and hands them to storage in bounded batches.
///
/// Intermediate flushes are plain writes. Only [BatchWriter::finish] asks the
/// storage for a durable write.
pub(crate) struct BatchWriter<B> {
    batch: B,
    batch_size: usize,
    max_batch_size: usize,
    flushes: usize,
}

impl<B: Batch> BatchWriter<B> {
    pub(crate) fn new<S: Storage<Batch = B>>(storage: &S, max_batch_size: usize) -> Self {
        Self {
            batch: storage.new_batch(),
            batch_size: 0,
            max_batch_size: max_batch_size.max(1),
            flushes: 0,
        }
    }

    /// Writes currently buffered
    #[inline]
    pub(crate) fn buffered(&self) -> usize {
        self.batch_size
    }

    /// Intermediate flushes performed so far
    #[inline]
    pub(crate) fn flushes(&self) -> usize {
        self.flushes
    }

    /// Buffers a put, flushing the batch once it reaches the threshold.
    pub(crate) fn set<S: Storage<Batch = B>>(
        &mut self,
        storage: &S,
        key: &[u8],
        value: &[u8],
    ) -> Result<()> {
        self.batch.put(key, value).map_err(Error::StorageError)?;
        self.batch_size += 1;

        // A failed flush keeps the batch and its size, so the next write
        // retries it.
        if self.batch_size >= self.max_batch_size {
            storage
                .write_batch(&self.batch)
                .map_err(Error::StorageError)?;
            self.batch = storage.new_batch();
            self.flushes += 1;
            debug!(
                target: COMPONENT,
                writes = self.batch_size,
                flushes = self.flushes,
                "flushed import batch"
            );
            self.batch_size = 0;
        }

        Ok(())
    }

    /// Durably writes whatever is still buffered.
    pub(crate) fn finish<S: Storage<Batch = B>>(self, storage: &S) -> Result<()> {
        storage
            .write_batch_sync(&self.batch)
            .map_err(Error::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use avlplus_storage::MemoryStorage;

    use super::*;

    #[test]
    fn flushes_when_threshold_is_reached() {
        let storage = MemoryStorage::new();
        let mut writer = BatchWriter::new(&storage, 3);

        for i in 0u8..7 {
            writer.set(&storage, &[i], &[i]).unwrap();
            assert!(writer.buffered() < 3);
        }
        assert_eq!(writer.flushes(), 2);
        assert_eq!(writer.buffered(), 1);
        assert_eq!(storage.len(), 6);
        assert_eq!(storage.stats().largest_batch, 3);

        writer.finish(&storage).unwrap();
        assert_eq!(storage.len(), 7);
        assert_eq!(storage.stats().sync_batch_writes, 1);
        assert_eq!(storage.stats().batch_writes, 2);
    }

    #[test]
    fn dropping_discards_buffered_writes() {
        let storage = MemoryStorage::new();
        let mut writer = BatchWriter::new(&storage, 10);
        writer.set(&storage, b"a", b"1").unwrap();
        drop(writer);
        assert!(storage.is_empty());
    }

    #[test]
    #[cfg(feature = "test_utils")]
    fn failed_flush_is_retried_with_next_write() {
        use crate::test_utils::{Fault, FaultyStorage};

        let storage = FaultyStorage::new(MemoryStorage::new(), Fault::BatchWrite(0));
        let mut writer = BatchWriter::new(&storage, 2);

        writer.set(&storage, b"a", b"1").unwrap();
        assert_matches!(
            writer.set(&storage, b"b", b"2"),
            Err(Error::StorageError(_))
        );
        assert_eq!(writer.flushes(), 0);
        assert_eq!(writer.buffered(), 2);
        assert!(storage.inner().is_empty());

        writer.set(&storage, b"c", b"3").unwrap();
        assert_eq!(writer.flushes(), 1);
        assert_eq!(writer.buffered(), 0);
        assert_eq!(
            storage.inner().entries(),
            vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
                (b"c".to_vec(), b"3".to_vec()),
            ]
        );
    }

    #[test]
    fn zero_threshold_flushes_every_write() {
        let storage = MemoryStorage::new();
        let mut writer = BatchWriter::new(&storage, 0);
        writer.set(&storage, b"a", b"1").unwrap();
        writer.set(&storage, b"b", b"2").unwrap();
        assert_eq!(writer.flushes(), 2);
        assert_eq!(writer.buffered(), 0);
    }
}
