//! Cursor over every tuple of a heap file.

use std::iter::Peekable;
use std::vec;

use log::trace;

use crate::buffer::{BufferPool, Permissions};
use crate::common::{Error, PageId, Result, TransactionId};
use crate::storage::{DbFile, DbFileIterator, HeapFile};
use crate::tuple::Tuple;

/// Where a cursor is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Constructed, never opened.
    Fresh,
    /// Open; more tuples may follow.
    Active,
    /// Open; every page has been drained.
    Exhausted,
    /// Closed; must be reopened before use.
    Closed,
}

/// Forward, restartable cursor over a [`HeapFile`].
///
/// Yields tuples page by page (page 0 first), and within a page in slot
/// order. Pages with no tuples are skipped.
///
/// # Paging
/// Every page is fetched from the [`BufferPool`] with
/// [`Permissions::ReadOnly`] on behalf of the cursor's transaction; the
/// cursor never reads the file itself. A page's tuples are copied out when
/// the page is loaded, so the cursor holds no pin between calls.
///
/// # Page count
/// The number of pages is captured when the cursor is built and is never
/// refreshed, not even by `rewind`. Pages appended afterwards are visible
/// only to cursors created later.
///
/// # Errors
/// Failures from the pool (including `TransactionAborted`) are returned
/// as is. A page that fails to load leaves the cursor where it was; the
/// caller should `close` it.
pub struct HeapFileCursor<'a> {
    file: &'a HeapFile,
    pool: &'a BufferPool,
    tid: TransactionId,
    /// Snapshot of `file.num_pages()` at construction.
    num_pages: usize,
    current_page: usize,
    /// Remaining tuples of `current_page`; `None` unless open.
    tuples: Option<Peekable<vec::IntoIter<Tuple>>>,
    state: CursorState,
}

impl<'a> HeapFileCursor<'a> {
    pub(crate) fn new(file: &'a HeapFile, pool: &'a BufferPool, tid: TransactionId) -> Self {
        Self {
            file,
            pool,
            tid,
            num_pages: file.num_pages(),
            current_page: 0,
            tuples: None,
            state: CursorState::Fresh,
        }
    }

    #[inline]
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Pages this cursor will visit.
    #[inline]
    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Page the cursor is positioned on.
    #[inline]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[inline]
    pub fn transaction_id(&self) -> TransactionId {
        self.tid
    }

    fn load_page(&self, page_number: usize) -> Result<Peekable<vec::IntoIter<Tuple>>> {
        let pid = PageId::new(self.file.id(), page_number as u32);
        let page = self.pool.get_page(self.tid, pid, Permissions::ReadOnly)?;
        let tuples: Vec<Tuple> = page.iter().cloned().collect();
        trace!("{} loaded {} with {} tuples", self.tid, pid, tuples.len());
        Ok(tuples.into_iter().peekable())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            CursorState::Fresh | CursorState::Closed => Err(Error::CursorNotOpen),
            CursorState::Active | CursorState::Exhausted => Ok(()),
        }
    }
}

impl DbFileIterator for HeapFileCursor<'_> {
    fn open(&mut self) -> Result<()> {
        self.close();

        if self.num_pages == 0 {
            self.current_page = 0;
            self.tuples = Some(Vec::new().into_iter().peekable());
            self.state = CursorState::Exhausted;
            return Ok(());
        }

        let tuples = self.load_page(0)?;
        self.current_page = 0;
        self.tuples = Some(tuples);
        self.state = CursorState::Active;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        self.ensure_open()?;

        loop {
            if self.state == CursorState::Exhausted {
                return Ok(false);
            }
            if let Some(tuples) = self.tuples.as_mut() {
                if tuples.peek().is_some() {
                    return Ok(true);
                }
            }

            let next_page = self.current_page + 1;
            if next_page >= self.num_pages {
                self.state = CursorState::Exhausted;
                return Ok(false);
            }
            // Only move once the page is in hand, so a failed load can be retried.
            let tuples = self.load_page(next_page)?;
            self.current_page = next_page;
            self.tuples = Some(tuples);
        }
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.has_next()? {
            return Err(Error::NoSuchElement);
        }
        self.tuples
            .as_mut()
            .and_then(Iterator::next)
            .ok_or(Error::NoSuchElement)
    }

    fn rewind(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.close();
        self.open()
    }

    fn close(&mut self) {
        self.tuples = None;
        self.state = CursorState::Closed;
    }
}
