//! RAII guards for page access.
//!
//! - [`PageReadGuard`] - Shared read access (multiple allowed)
//! - [`PageWriteGuard`] - Exclusive write access (marks dirty on release)
//! - [`PageGuard`] - Either of the above, as chosen by [`Permissions`]
//!
//! Every guard unpins its page when dropped.
//!
//! [`Permissions`]: super::Permissions

use std::ops::{Deref, DerefMut};

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};

use crate::common::{FrameId, PageId, TransactionId};
use crate::storage::page::Page;

use super::buffer_pool::BufferPool;

/// Guard for read-only page access.
///
/// # Example
/// ```ignore
/// let guard = pool.fetch_page_read(tid, pid)?;
/// let n = guard.iter().count();  // Deref to &Page
/// // guard drops here, page unpinned
/// ```
pub struct PageReadGuard<'a> {
    pool: &'a BufferPool,
    frame_id: FrameId,
    page_id: PageId,
    lock: MappedRwLockReadGuard<'a, Page>,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        frame_id: FrameId,
        page_id: PageId,
        lock: MappedRwLockReadGuard<'a, Page>,
    ) -> Self {
        Self {
            pool,
            frame_id,
            page_id,
            lock,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        self.pool.unpin_page_internal(self.frame_id, None);
    }
}

/// Guard for exclusive write access to a page.
///
/// The page is marked dirty by the guard's transaction and unpinned when the
/// guard is dropped. Marking happens while the page lock is still held, so a
/// concurrent flush either sees the change or sees the page as dirty.
pub struct PageWriteGuard<'a> {
    pool: &'a BufferPool,
    frame_id: FrameId,
    page_id: PageId,
    tid: TransactionId,
    lock: MappedRwLockWriteGuard<'a, Page>,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        frame_id: FrameId,
        page_id: PageId,
        tid: TransactionId,
        lock: MappedRwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            pool,
            frame_id,
            page_id,
            tid,
            lock,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        self.pool.unpin_page_internal(self.frame_id, Some(self.tid));
    }
}

/// A page guard obtained through [`BufferPool::get_page`].
pub enum PageGuard<'a> {
    Read(PageReadGuard<'a>),
    Write(PageWriteGuard<'a>),
}

impl PageGuard<'_> {
    pub fn page_id(&self) -> PageId {
        match self {
            PageGuard::Read(guard) => guard.page_id(),
            PageGuard::Write(guard) => guard.page_id(),
        }
    }
}

impl Deref for PageGuard<'_> {
    type Target = Page;

    fn deref(&self) -> &Page {
        match self {
            PageGuard::Read(guard) => &**guard,
            PageGuard::Write(guard) => &**guard,
        }
    }
}
