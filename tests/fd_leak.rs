//! `read_page` and `write_page` release their file handles on every path.
//!
//! Counts `/proc/self/fd`, so it's Linux only and kept in its own binary.

#![cfg(target_os = "linux")]

use heapdb::storage::write_heap_file_pages;
use heapdb::{DbFile, Field, HeapFile, PageId, Tuple, TupleDesc, Type};
use tempfile::tempdir;

fn open_fds() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

#[test]
fn test_reads_and_writes_do_not_leak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.dat");
    let td = TupleDesc::new([Type::Int]);
    let pages = (0..3).map(|i| vec![Tuple::new(vec![Field::Int(i)])]);
    write_heap_file_pages(&path, &td, pages).unwrap();

    let file = HeapFile::new(&path, td).unwrap();
    let foreign = heapdb::TableId(file.id().0.wrapping_add(1));

    let before = open_fds();
    for i in 0..200u32 {
        let ok = file.read_page(PageId::new(file.id(), i % 3)).unwrap();
        file.write_page(&ok).unwrap();
        assert!(file.read_page(PageId::new(file.id(), 3 + i)).is_err());
        assert!(file.read_page(PageId::new(foreign, 0)).is_err());
    }
    assert_eq!(open_fds(), before);
}
