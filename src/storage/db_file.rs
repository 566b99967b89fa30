//! File and cursor abstractions.
//!
//! [`DbFile`] is everything the catalog and buffer pool need from a table's
//! backing file; [`DbFileIterator`] is the cursor protocol every file scan
//! speaks. [`HeapFile`](super::HeapFile) is the only implementation so far.

use crate::buffer::BufferPool;
use crate::common::{PageId, Result, TableId, TransactionId};
use crate::storage::page::Page;
use crate::tuple::{Tuple, TupleDesc};

/// A table's on-disk storage.
///
/// Page reads and writes go straight to disk; tuple-level operations go
/// through the buffer pool so that cached pages stay the single source of
/// truth.
pub trait DbFile: Send + Sync {
    /// Stable identifier of this file, used as the table id.
    fn id(&self) -> TableId;

    /// Schema of the tuples stored in this file.
    fn tuple_desc(&self) -> &TupleDesc;

    /// Read one page from disk.
    fn read_page(&self, pid: PageId) -> Result<Page>;

    /// Write one page to disk, appending if it's the page just past the end.
    fn write_page(&self, page: &Page) -> Result<()>;

    /// Number of whole pages currently in the file.
    fn num_pages(&self) -> usize;

    /// Add `tuple` to the file on behalf of `tid`.
    ///
    /// Returns the pages that were dirtied.
    fn insert_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: Tuple,
    ) -> Result<Vec<PageId>>;

    /// Remove `tuple` (located by its record id) on behalf of `tid`.
    ///
    /// Returns the pages that were dirtied.
    fn delete_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &Tuple,
    ) -> Result<Vec<PageId>>;

    /// A fresh, unopened cursor over every tuple in the file.
    fn iterator<'a>(
        &'a self,
        pool: &'a BufferPool,
        tid: TransactionId,
    ) -> Box<dyn DbFileIterator + 'a>;
}

/// A restartable forward cursor over tuples.
///
/// `has_next` / `next` / `rewind` fail with `CursorNotOpen` until `open` is
/// called and again after `close`.
pub trait DbFileIterator {
    /// Position before the first tuple. May be called in any state.
    fn open(&mut self) -> Result<()>;

    /// Whether another tuple is available. Does not consume it.
    fn has_next(&mut self) -> Result<bool>;

    /// The next tuple, or `NoSuchElement`.
    fn next(&mut self) -> Result<Tuple>;

    /// Start over from the first tuple.
    fn rewind(&mut self) -> Result<()>;

    /// Release the cursor's position. Idempotent.
    fn close(&mut self);

    /// Drain every remaining tuple.
    fn collect_remaining(&mut self) -> Result<Vec<Tuple>> {
        let mut tuples = Vec::new();
        while self.has_next()? {
            tuples.push(self.next()?);
        }
        Ok(tuples)
    }
}
