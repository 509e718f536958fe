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

//! Implementation for a storage abstraction over RocksDB.
use std::path::Path;

use lazy_static::lazy_static;
use rocksdb::{ColumnFamily, WriteOptions, DB};
use tracing::{debug, trace};

use super::{column_families, default_db_opts, RocksDbBatch, META_CF_NAME};
use crate::{Batch, Error, Storage, COMPONENT};

lazy_static! {
    static ref DEFAULT_OPTS: rocksdb::Options = default_db_opts();
}

/// Storage which uses RocksDB as its backend.
pub struct RocksDbStorage {
    db: DB,
}

impl RocksDbStorage {
    /// Opens (creating if missing) a RocksDB database at `path`.
    pub fn default_rocksdb_with_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let db = DB::open_cf_descriptors(&DEFAULT_OPTS, &path, column_families())?;
        debug!(target: COMPONENT, path = %path.as_ref().display(), "opened rocksdb storage");
        Ok(RocksDbStorage { db })
    }

    fn cf_meta(&self) -> Result<&ColumnFamily, Error> {
        self.db
            .cf_handle(META_CF_NAME)
            .ok_or(Error::MissingColumnFamily(META_CF_NAME))
    }

    fn write(&self, batch: &RocksDbBatch, sync: bool) -> Result<(), Error> {
        let mut opts = WriteOptions::default();
        opts.set_sync(sync);
        let len = batch.len();
        self.db.write_opt(batch.build_write_batch(), &opts)?;
        trace!(target: COMPONENT, operations = len, sync, "applied rocksdb batch");
        Ok(())
    }
}

impl Storage for RocksDbStorage {
    type Batch = RocksDbBatch;

    fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.db.get(key)?)
    }

    fn get_meta<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.db.get_cf(self.cf_meta()?, key)?)
    }

    fn put_meta<K: AsRef<[u8]>>(&self, key: K, value: &[u8]) -> Result<(), Error> {
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        Ok(self.db.put_cf_opt(self.cf_meta()?, key, value, &opts)?)
    }

    fn new_batch(&self) -> Self::Batch {
        RocksDbBatch::default()
    }

    fn write_batch(&self, batch: &Self::Batch) -> Result<(), Error> {
        self.write(batch, false)
    }

    fn write_batch_sync(&self, batch: &Self::Batch) -> Result<(), Error> {
        self.write(batch, true)
    }
}
