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

//! Import benches

use avlplus_tree::{
    storage::MemoryStorage,
    test_utils::{import_reference, make_entries_rand, make_entries_seq, ReferenceTree},
    ImportOptions, MutableTree,
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

/// Import of a balanced 100k leaf tree
pub fn import_100k_seq(c: &mut Criterion) {
    let reference = ReferenceTree::balanced(make_entries_seq(0..100_000), 10);

    c.bench_function("import_100k_seq", |b| {
        b.iter_batched(
            MemoryStorage::new,
            |storage| {
                import_reference(&storage, &reference).expect("import failed");
            },
            BatchSize::LargeInput,
        );
    });
}

/// Import of a randomly shaped 10k leaf tree
pub fn import_10k_rand(c: &mut Criterion) {
    let reference = ReferenceTree::random_shape(make_entries_rand(10_000, 0), 10, 0);

    c.bench_function("import_10k_rand", |b| {
        b.iter_batched(
            MemoryStorage::new,
            |storage| {
                import_reference(&storage, &reference).expect("import failed");
            },
            BatchSize::LargeInput,
        );
    });
}

/// Same 100k leaf import flushed every 1k writes
pub fn import_100k_small_batches(c: &mut Criterion) {
    let reference = ReferenceTree::balanced(make_entries_seq(0..100_000), 10);
    let nodes = reference.export();

    c.bench_function("import_100k_small_batches", |b| {
        b.iter_batched(
            || (MemoryStorage::new(), nodes.clone()),
            |(storage, nodes)| {
                let mut tree = MutableTree::new(&storage).expect("cannot open tree");
                let mut importer = tree
                    .import_with_options(10, ImportOptions::with_max_batch_size(1_000))
                    .expect("cannot start import");
                importer.add_all(nodes).expect("add failed");
                importer.commit().expect("commit failed");
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    import_100k_seq,
    import_10k_rand,
    import_100k_small_batches
);
criterion_main!(benches);
