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

//! Storage wrapper failing on demand.

use std::{cell::Cell, rc::Rc};

use crate::storage::{Batch, Error, Storage};

/// Operation a [FaultyStorage] fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The n-th (0-based) put into any batch
    BatchPut(usize),
    /// The n-th (0-based) non-durable batch write
    BatchWrite(usize),
    /// Every durable batch write
    SyncBatchWrite,
    /// Every metadata put
    MetaPut,
}

/// Wraps a storage and fails exactly the operations selected by its
/// [Fault]. Everything else is passed through.
pub struct FaultyStorage<S> {
    inner: S,
    fault: Fault,
    puts: Rc<Cell<usize>>,
    writes: Cell<usize>,
}

impl<S: Storage> FaultyStorage<S> {
    pub fn new(inner: S, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            puts: Rc::new(Cell::new(0)),
            writes: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// Batch of a [FaultyStorage]
pub struct FaultyBatch<B> {
    inner: B,
    fail_at: Option<usize>,
    puts: Rc<Cell<usize>>,
}

impl<B: Batch> Batch for FaultyBatch<B> {
    fn put<K: AsRef<[u8]>>(&mut self, key: K, value: &[u8]) -> Result<(), Error> {
        let n = self.puts.get();
        self.puts.set(n + 1);
        if self.fail_at == Some(n) {
            return Err(Error::Injected("batch put"));
        }
        self.inner.put(key, value)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<S: Storage> Storage for FaultyStorage<S> {
    type Batch = FaultyBatch<S::Batch>;

    fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        self.inner.get(key)
    }

    fn get_meta<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        self.inner.get_meta(key)
    }

    fn put_meta<K: AsRef<[u8]>>(&self, key: K, value: &[u8]) -> Result<(), Error> {
        if self.fault == Fault::MetaPut {
            return Err(Error::Injected("meta put"));
        }
        self.inner.put_meta(key, value)
    }

    fn new_batch(&self) -> Self::Batch {
        let fail_at = match self.fault {
            Fault::BatchPut(n) => Some(n),
            _ => None,
        };
        FaultyBatch {
            inner: self.inner.new_batch(),
            fail_at,
            puts: Rc::clone(&self.puts),
        }
    }

    fn write_batch(&self, batch: &Self::Batch) -> Result<(), Error> {
        let n = self.writes.get();
        self.writes.set(n + 1);
        if self.fault == Fault::BatchWrite(n) {
            return Err(Error::Injected("batch write"));
        }
        self.inner.write_batch(&batch.inner)
    }

    fn write_batch_sync(&self, batch: &Self::Batch) -> Result<(), Error> {
        if self.fault == Fault::SyncBatchWrite {
            return Err(Error::Injected("sync batch write"));
        }
        self.inner.write_batch_sync(&batch.inner)
    }
}
