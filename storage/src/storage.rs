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

//! Storage traits

use crate::Error;

/// Key-value store backing a versioned tree.
///
/// Node records live in the data namespace and are only written through
/// batches. The metadata namespace holds bookkeeping such as the latest
/// visible version and is written directly.
pub trait Storage {
    /// Storage batch type
    type Batch: Batch;

    /// Get entry by `key` from data storage
    fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error>;

    /// Get entry by `key` from metadata storage
    fn get_meta<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error>;

    /// Durably put `value` into metadata storage with `key`
    fn put_meta<K: AsRef<[u8]>>(&self, key: K, value: &[u8]) -> Result<(), Error>;

    /// Initialize a new batch
    fn new_batch(&self) -> Self::Batch;

    /// Applies the batch to the data storage. The write is not required to be
    /// durable. The batch is left as it was, so a failed write can be retried.
    fn write_batch(&self, batch: &Self::Batch) -> Result<(), Error>;

    /// Applies the batch to the data storage and waits for it to be durable.
    fn write_batch_sync(&self, batch: &Self::Batch) -> Result<(), Error>;
}

/// Database batch. Dropping a batch without writing it discards its
/// operations.
pub trait Batch {
    /// Appends to the batch a put operation for a data record.
    fn put<K: AsRef<[u8]>>(&mut self, key: K, value: &[u8]) -> Result<(), Error>;

    /// Number of operations buffered in the batch
    fn len(&self) -> usize;

    /// Batch emptiness predicate
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    type Batch = S::Batch;

    fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        (**self).get(key)
    }

    fn get_meta<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        (**self).get_meta(key)
    }

    fn put_meta<K: AsRef<[u8]>>(&self, key: K, value: &[u8]) -> Result<(), Error> {
        (**self).put_meta(key, value)
    }

    fn new_batch(&self) -> Self::Batch {
        (**self).new_batch()
    }

    fn write_batch(&self, batch: &Self::Batch) -> Result<(), Error> {
        (**self).write_batch(batch)
    }

    fn write_batch_sync(&self, batch: &Self::Batch) -> Result<(), Error> {
        (**self).write_batch_sync(batch)
    }
}
