//! Heap file - an unordered collection of tuples stored as fixed-size pages.
//!
//! A [`HeapFile`] owns one backing file and handles:
//! - Table identity (derived from the canonical path)
//! - Page-number ↔ file-offset translation
//! - Whole-page reads and writes
//! - Tuple insert/delete through the buffer pool
//! - Cursors over every tuple

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::buffer::BufferPool;
use crate::common::config::page_size;
use crate::common::{Error, PageId, Result, TableId, TransactionId};
use crate::storage::page::{HeapPage, Page};
use crate::storage::{DbFile, DbFileIterator, HeapFileCursor};
use crate::tuple::{Tuple, TupleDesc};

/// Stores the tuples of one table in a single file.
///
/// # File Layout
/// The file is nothing but page images laid out back to back:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0   page_size  2×page_size  ...  N×page_size
/// ```
/// No header, no trailer. A trailing partial page (torn write, external
/// truncation) is not counted by [`num_pages`](DbFile::num_pages) and can't
/// be read.
///
/// # Thread Safety
/// `HeapFile` holds no open file handle. Every read or write opens its own
/// handle and drops it before returning, so concurrent calls on distinct
/// pages never share a file position. Appending a page is serialized by an
/// internal lock so two inserters can't claim the same new page number.
///
/// # Caching
/// The heap file never caches pages. Tuple operations and cursors fetch
/// pages from the [`BufferPool`], which calls back into
/// [`read_page`](DbFile::read_page) on a miss.
pub struct HeapFile {
    /// Canonical path of the backing file.
    path: PathBuf,
    td: TupleDesc,
    id: TableId,
    /// Held while appending a page.
    append_lock: Mutex<()>,
}

impl HeapFile {
    /// Open a heap file over an existing regular file.
    ///
    /// Only the path is resolved; no page is read.
    ///
    /// # Errors
    /// - `Error::Io` if the path can't be resolved
    /// - `Error::NotARegularFile` if it names a directory or similar
    pub fn new<P: AsRef<Path>>(path: P, td: TupleDesc) -> Result<Self> {
        let path = std::fs::canonicalize(path.as_ref())?;
        if !std::fs::metadata(&path)?.is_file() {
            return Err(Error::NotARegularFile(path));
        }

        let id = TableId::from_path(&path);
        debug!("heap file {} has table id {}", path.display(), id);

        Ok(Self {
            path,
            td,
            id,
            append_lock: Mutex::new(()),
        })
    }

    /// Canonical path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh cursor over every tuple, bound to `tid`.
    ///
    /// The page count is captured now; pages appended later are not visited
    /// by this cursor.
    pub fn cursor<'a>(&'a self, pool: &'a BufferPool, tid: TransactionId) -> HeapFileCursor<'a> {
        HeapFileCursor::new(self, pool, tid)
    }

    fn check_table(&self, pid: PageId) -> Result<()> {
        if pid.table_id != self.id {
            return Err(Error::TableMismatch {
                expected: self.id,
                actual: pid.table_id,
            });
        }
        Ok(())
    }

    /// Append an empty page and insert `tuple` into it.
    ///
    /// Callers make sure a tuple fits on an empty page, so this terminates.
    fn append_and_insert(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: Tuple,
    ) -> Result<Vec<PageId>> {
        let _append = self.append_lock.lock();

        loop {
            let pid = PageId::new(self.id, self.num_pages() as u32);
            self.write_page(&Page::Heap(HeapPage::empty(pid, self.td.clone())))?;
            debug!("appended {} to {}", pid, self.path.display());

            // A concurrent inserter scanning existing pages may claim the new
            // page before we do.
            let mut guard = match pool.fetch_page_write(tid, pid) {
                Ok(guard) => guard,
                Err(Error::WriteConflict { .. }) => continue,
                Err(e) => return Err(e),
            };
            if guard.as_heap().num_empty_slots() == 0 {
                continue;
            }
            guard.as_heap_mut().insert_tuple(tuple)?;
            return Ok(vec![pid]);
        }
    }
}

impl DbFile for HeapFile {
    #[inline]
    fn id(&self) -> TableId {
        self.id
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.td
    }

    /// Read page `pid` from disk.
    ///
    /// # Errors
    /// - `Error::TableMismatch` if `pid` belongs to another table
    /// - `Error::InvalidPage` if the page is past the end of the file or the
    ///   read comes up short
    /// - `Error::Io` for any other I/O failure
    /// - `Error::MalformedPage` if the bytes don't decode
    fn read_page(&self, pid: PageId) -> Result<Page> {
        self.check_table(pid)?;

        let page_size = page_size();
        let offset = pid.offset(page_size);
        let invalid = || Error::InvalidPage {
            table: pid.table_id,
            page: pid.page_number,
        };

        let mut file = File::open(&self.path)?;
        if offset + page_size as u64 > file.metadata()?.len() {
            return Err(invalid());
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; page_size];
        match file.read_exact(&mut data) {
            Ok(()) => {}
            // file shrank between the length check and the read
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(invalid()),
            Err(e) => return Err(e.into()),
        }

        debug!("read {} from {}", pid, self.path.display());
        Ok(Page::Heap(HeapPage::new(pid, &data, self.td.clone())?))
    }

    /// Write `page` at its offset, then fsync.
    ///
    /// The page may be one past the last whole page, which appends it.
    ///
    /// # Errors
    /// - `Error::TableMismatch` if the page belongs to another table
    /// - `Error::MalformedPage` if the page doesn't serialize to `page_size()`
    /// - `Error::InvalidPage` if writing would leave a gap in the file
    fn write_page(&self, page: &Page) -> Result<()> {
        let pid = page.id();
        self.check_table(pid)?;

        let page_size = page_size();
        let data = page.page_data();
        if data.len() != page_size {
            return Err(Error::MalformedPage {
                page: pid,
                reason: format!("serialized to {} bytes, page size is {}", data.len(), page_size),
            });
        }

        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        let whole_pages = file.metadata()?.len() / page_size as u64;
        if u64::from(pid.page_number) > whole_pages {
            return Err(Error::InvalidPage {
                table: pid.table_id,
                page: pid.page_number,
            });
        }

        file.seek(SeekFrom::Start(pid.offset(page_size)))?;
        file.write_all(&data)?;
        file.sync_all()?;

        debug!("wrote {} to {}", pid, self.path.display());
        Ok(())
    }

    /// `⌊file length / page_size()⌋`, read fresh on every call.
    ///
    /// If the file can't be stat'ed it has no readable pages, so this logs a
    /// warning and reports zero.
    fn num_pages(&self) -> usize {
        match std::fs::metadata(&self.path) {
            Ok(meta) => (meta.len() / page_size() as u64) as usize,
            Err(e) => {
                warn!("cannot stat {}: {}; reporting 0 pages", self.path.display(), e);
                0
            }
        }
    }

    /// Insert into the first page with a free slot that no other transaction
    /// has pending changes on, appending a page if none qualifies.
    fn insert_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: Tuple,
    ) -> Result<Vec<PageId>> {
        if !self.td.matches(&tuple) {
            return Err(Error::SchemaMismatch(self.td.to_string()));
        }
        if HeapPage::slots_per_page(&self.td) == 0 {
            return Err(Error::SchemaMismatch(format!("{} does not fit on a page", self.td)));
        }

        for page_number in 0..self.num_pages() {
            let pid = PageId::new(self.id, page_number as u32);

            // Look first with a shared guard so full pages aren't dirtied.
            if pool.fetch_page_read(tid, pid)?.as_heap().num_empty_slots() == 0 {
                continue;
            }

            let mut guard = match pool.fetch_page_write(tid, pid) {
                Ok(guard) => guard,
                // Holds another transaction's pending changes.
                Err(Error::WriteConflict { .. }) => continue,
                Err(e) => return Err(e),
            };
            // Another writer may have filled it in between.
            if guard.as_heap().num_empty_slots() == 0 {
                continue;
            }
            guard.as_heap_mut().insert_tuple(tuple)?;
            return Ok(vec![pid]);
        }

        self.append_and_insert(pool, tid, tuple)
    }

    fn delete_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &Tuple,
    ) -> Result<Vec<PageId>> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        self.check_table(rid.page_id)?;

        let mut guard = pool.fetch_page_write(tid, rid.page_id)?;
        guard.as_heap_mut().delete_tuple(tuple)?;
        Ok(vec![rid.page_id])
    }

    fn iterator<'a>(
        &'a self,
        pool: &'a BufferPool,
        tid: TransactionId,
    ) -> Box<dyn DbFileIterator + 'a> {
        Box::new(self.cursor(pool, tid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::write_heap_file_pages;
    use crate::tuple::{Field, Type};
    use tempfile::tempdir;

    fn desc() -> TupleDesc {
        TupleDesc::new([Type::Int, Type::Int])
    }

    fn row(a: i32) -> Tuple {
        Tuple::new(vec![Field::Int(a), Field::Int(a * 2)])
    }

    #[test]
    fn test_new_requires_existing_file() {
        let dir = tempdir().unwrap();

        let missing = HeapFile::new(dir.path().join("missing.dat"), desc());
        assert!(matches!(missing, Err(Error::Io(_))));

        let directory = HeapFile::new(dir.path(), desc());
        assert!(matches!(directory, Err(Error::NotARegularFile(_))));
    }

    #[test]
    fn test_id_follows_canonical_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        File::create(&path).unwrap();

        let a = HeapFile::new(&path, desc()).unwrap();
        let b = HeapFile::new(dir.path().join(".").join("t.dat"), desc()).unwrap();
        assert_eq!(a.id(), a.id());
        assert_eq!(a.id(), b.id());
        assert_eq!(a.path(), b.path());

        let other_path = dir.path().join("u.dat");
        File::create(&other_path).unwrap();
        let c = HeapFile::new(&other_path, desc()).unwrap();
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_tuple_desc_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        File::create(&path).unwrap();

        let td = TupleDesc::with_names([(Type::Int, "a"), (Type::String, "b")]);
        let hf = HeapFile::new(&path, td.clone()).unwrap();
        assert_eq!(hf.tuple_desc(), &td);
        assert_eq!(hf.tuple_desc().field_name(1), Some("b"));
    }

    #[test]
    fn test_read_page_decodes_tuples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        write_heap_file_pages(&path, &desc(), [vec![row(1), row(2)], vec![row(3)]]).unwrap();

        let hf = HeapFile::new(&path, desc()).unwrap();
        assert_eq!(hf.num_pages(), 2);

        let pid = PageId::new(hf.id(), 1);
        let page = hf.read_page(pid).unwrap();
        assert_eq!(page.id(), pid);
        let tuples: Vec<_> = page.iter().cloned().collect();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].fields(), row(3).fields());
    }

    #[test]
    fn test_read_page_wrong_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        write_heap_file_pages(&path, &desc(), [vec![row(1)]]).unwrap();

        let hf = HeapFile::new(&path, desc()).unwrap();
        let foreign = TableId(hf.id().0.wrapping_add(1));
        let result = hf.read_page(PageId::new(foreign, 0));
        assert!(matches!(result, Err(Error::TableMismatch { .. })));
    }

    #[test]
    fn test_read_past_end_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        write_heap_file_pages(&path, &desc(), [vec![row(1)]]).unwrap();

        let hf = HeapFile::new(&path, desc()).unwrap();
        let result = hf.read_page(PageId::new(hf.id(), 1));
        match result {
            Err(Error::InvalidPage { table, page }) => {
                assert_eq!(table, hf.id());
                assert_eq!(page, 1);
            }
            other => panic!("expected InvalidPage, got {:?}", other.map(|p| p.id())),
        }
    }

    #[test]
    fn test_write_page_overwrites_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        File::create(&path).unwrap();
        let hf = HeapFile::new(&path, desc()).unwrap();

        // append page 0
        let mut page = HeapPage::empty(PageId::new(hf.id(), 0), desc());
        page.insert_tuple(row(5)).unwrap();
        hf.write_page(&Page::Heap(page)).unwrap();
        assert_eq!(hf.num_pages(), 1);

        // append page 1
        let page = HeapPage::empty(PageId::new(hf.id(), 1), desc());
        hf.write_page(&Page::Heap(page)).unwrap();
        assert_eq!(hf.num_pages(), 2);

        // overwrite page 0
        let mut page = HeapPage::empty(PageId::new(hf.id(), 0), desc());
        page.insert_tuple(row(6)).unwrap();
        page.insert_tuple(row(7)).unwrap();
        hf.write_page(&Page::Heap(page)).unwrap();
        assert_eq!(hf.num_pages(), 2);

        let reread = hf.read_page(PageId::new(hf.id(), 0)).unwrap();
        assert_eq!(reread.iter().count(), 2);
    }

    #[test]
    fn test_write_page_rejects_gap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        File::create(&path).unwrap();
        let hf = HeapFile::new(&path, desc()).unwrap();

        let page = HeapPage::empty(PageId::new(hf.id(), 2), desc());
        let result = hf.write_page(&Page::Heap(page));
        assert!(matches!(result, Err(Error::InvalidPage { page: 2, .. })));
        assert_eq!(hf.num_pages(), 0);
    }

    #[test]
    fn test_num_pages_rounds_down() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        let file = File::create(&path).unwrap();
        let hf = HeapFile::new(&path, desc()).unwrap();

        file.set_len(page_size() as u64 - 1).unwrap();
        assert_eq!(hf.num_pages(), 0);
        file.set_len(3 * page_size() as u64 + 10).unwrap();
        assert_eq!(hf.num_pages(), 3);
    }

    #[test]
    fn test_num_pages_of_deleted_file_is_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        write_heap_file_pages(&path, &desc(), [vec![row(1)]]).unwrap();
        let hf = HeapFile::new(&path, desc()).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert_eq!(hf.num_pages(), 0);
        assert!(hf.read_page(PageId::new(hf.id(), 0)).unwrap_err().is_page_unavailable());
    }
}
