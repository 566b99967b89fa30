//! Full-table scan throughput, with the table cached and with a pool too
//! small to hold it.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heapdb::storage::write_heap_file;
use heapdb::{BufferPool, Catalog, DbFileIterator, Field, HeapFile, TransactionId, Tuple};
use heapdb::{TupleDesc, Type};
use tempfile::tempdir;

const ROWS: usize = 20_000;

fn bench_scan(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.dat");
    let td = TupleDesc::new([Type::Int, Type::Int, Type::Int]);
    let rows = (0..ROWS as i32).map(|i| Tuple::new(vec![Field::Int(i), Field::Int(i % 7), Field::Int(-i)]));
    let pages = write_heap_file(&path, &td, rows).unwrap();

    let file = Arc::new(HeapFile::new(&path, td).unwrap());
    let catalog = Arc::new(Catalog::new());
    catalog.add_table(file.clone(), "bench");

    let mut group = c.benchmark_group("heap_scan");
    group.throughput(Throughput::Elements(ROWS as u64));

    for pool_size in [pages, 4] {
        let pool = BufferPool::new(pool_size, Arc::clone(&catalog));
        group.bench_with_input(BenchmarkId::new("frames", pool_size), &pool, |b, pool| {
            b.iter(|| {
                let mut cursor = file.cursor(pool, TransactionId::next());
                cursor.open().unwrap();
                let mut n = 0;
                while cursor.has_next().unwrap() {
                    cursor.next().unwrap();
                    n += 1;
                }
                assert_eq!(n, ROWS);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
