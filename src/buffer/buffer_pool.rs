//! Buffer Pool - the shared page cache.
//!
//! The [`BufferPool`] provides:
//! - One cached copy per page across every table
//! - Pin-based reference counting through RAII guards
//! - LRU replacement of clean pages (dirty pages are never stolen)
//! - One writing transaction per dirty page
//! - Write-back on flush or commit, roll back on abort

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::replacer::LruReplacer;
use crate::buffer::{
    BufferPoolStats, Frame, PageGuard, PageReadGuard, PageWriteGuard, Permissions,
};
use crate::catalog::Catalog;
use crate::common::config::DEFAULT_POOL_SIZE;
use crate::common::{Error, FrameId, PageId, Result, TableId, TransactionId};
use crate::tuple::Tuple;

/// Caches pages of every table registered in a [`Catalog`].
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                        BufferPool                           │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │ page_table   │  │        frames: Vec<Frame>         │   │
/// │  │PageId → Fid  │─▶│  [Frame0] [Frame1] [Frame2] ...   │   │
/// │  └──────────────┘  └───────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
/// │  │  free_list   │  │   replacer   │  │   catalog    │      │
/// │  │ Vec<FrameId> │  │ LruReplacer  │  │TableId → File│      │
/// │  └──────────────┘  └──────────────┘  └──────────────┘      │
/// └─────────────────────────────────────────────────────────────┘
/// ```
/// On a miss the pool looks the page's table up in the catalog and calls
/// [`DbFile::read_page`](crate::storage::DbFile::read_page).
///
/// # Write ownership
/// A dirty page belongs to the transaction that dirtied it until that
/// transaction commits (write-back) or aborts (roll back). Write fetches by
/// any other transaction fail with `Error::WriteConflict` meanwhile.
///
/// # Thread Safety
/// - `page_table`: `RwLock`; hits take it shared, installing a page and
///   evicting take it exclusive, so a page is never loaded into two frames.
///   Disk reads happen outside it.
/// - `free_list`, `replacer`, `aborted`: `Mutex`
/// - `frames`: no lock, fixed size, each Frame has internal locks
/// - `stats`: atomic counters
///
/// # Usage
/// ```ignore
/// let pool = BufferPool::with_catalog(catalog);
/// let tid = TransactionId::next();
///
/// let guard = pool.get_page(tid, pid, Permissions::ReadOnly)?;
/// for tuple in guard.iter() { /* ... */ }
/// ```
pub struct BufferPool {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Maps page IDs to frame IDs.
    page_table: RwLock<HashMap<PageId, FrameId>>,

    /// Stack of free frame IDs.
    free_list: Mutex<Vec<FrameId>>,

    replacer: Mutex<LruReplacer>,

    /// Where pages are read from and written back to.
    catalog: Arc<Catalog>,

    /// Transactions that aborted; they may not fetch pages again.
    aborted: Mutex<HashSet<TransactionId>>,

    stats: BufferPoolStats,

    /// Bumped after every write-back; a miss whose read overlapped one rereads.
    flush_epoch: AtomicU64,

    pool_size: usize,
}

impl BufferPool {
    /// Create a pool of `pool_size` frames over the tables in `catalog`.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, catalog: Arc<Catalog>) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list: Vec<FrameId> = (0..pool_size).rev().map(FrameId::new).collect();

        Self {
            frames,
            page_table: RwLock::new(HashMap::new()),
            free_list: Mutex::new(free_list),
            replacer: Mutex::new(LruReplacer::new()),
            catalog,
            aborted: Mutex::new(HashSet::new()),
            stats: BufferPoolStats::new(),
            flush_epoch: AtomicU64::new(0),
            pool_size,
        }
    }

    /// Create a pool of [`DEFAULT_POOL_SIZE`] frames.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self::new(DEFAULT_POOL_SIZE, catalog)
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page with the access `perm` asks for.
    ///
    /// # Errors
    /// - `Error::TransactionAborted` if `tid` has aborted
    /// - `Error::UnknownTable` if the page's table isn't in the catalog
    /// - `Error::InvalidPage` / `Error::Io` if the page can't be read
    /// - `Error::NoFreeFrames` if every frame is pinned or dirty
    pub fn get_page(
        &self,
        tid: TransactionId,
        page_id: PageId,
        perm: Permissions,
    ) -> Result<PageGuard<'_>> {
        match perm {
            Permissions::ReadOnly => self.fetch_page_read(tid, page_id).map(PageGuard::Read),
            Permissions::ReadWrite => self.fetch_page_write(tid, page_id).map(PageGuard::Write),
        }
    }

    /// Fetch a page for reading (shared access).
    pub fn fetch_page_read(&self, tid: TransactionId, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let frame_id = self.fetch_page_internal(tid, page_id)?;

        match RwLockReadGuard::try_map(self.frames[frame_id.0].page(), |page| page.as_ref()) {
            Ok(lock) => Ok(PageReadGuard::new(self, frame_id, page_id, lock)),
            Err(_) => {
                self.unpin_page_internal(frame_id, None);
                Err(Error::FrameEmpty(frame_id))
            }
        }
    }

    /// Fetch a page for writing (exclusive access).
    ///
    /// The page is marked dirty on behalf of `tid` when the guard drops.
    ///
    /// # Errors
    /// As [`get_page`](Self::get_page), plus `Error::WriteConflict` if another
    /// transaction has uncommitted changes on the page.
    pub fn fetch_page_write(
        &self,
        tid: TransactionId,
        page_id: PageId,
    ) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.fetch_page_internal(tid, page_id)?;
        let frame = &self.frames[frame_id.0];

        let lock = match RwLockWriteGuard::try_map(frame.page_mut(), |page| page.as_mut()) {
            Ok(lock) => lock,
            Err(_) => {
                self.unpin_page_internal(frame_id, None);
                return Err(Error::FrameEmpty(frame_id));
            }
        };

        // Owners are only set and cleared under the page lock.
        match frame.dirtied_by() {
            Some(holder) if holder != tid => {
                drop(lock);
                self.unpin_page_internal(frame_id, None);
                Err(Error::WriteConflict {
                    page: page_id,
                    holder,
                })
            }
            _ => Ok(PageWriteGuard::new(self, frame_id, page_id, tid, lock)),
        }
    }

    // ========================================================================
    // Public API: Tuple operations
    // ========================================================================

    /// Insert `tuple` into table `table_id` on behalf of `tid`.
    ///
    /// Returns the pages that were dirtied.
    pub fn insert_tuple(
        &self,
        tid: TransactionId,
        table_id: TableId,
        tuple: Tuple,
    ) -> Result<Vec<PageId>> {
        let file = self.catalog.database_file(table_id)?;
        file.insert_tuple(self, tid, tuple)
    }

    /// Delete `tuple` from the table its record id points into.
    ///
    /// Returns the pages that were dirtied.
    pub fn delete_tuple(&self, tid: TransactionId, tuple: &Tuple) -> Result<Vec<PageId>> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let file = self.catalog.database_file(rid.page_id.table_id)?;
        file.delete_tuple(self, tid, tuple)
    }

    // ========================================================================
    // Public API: Write-back and transaction completion
    // ========================================================================

    /// Write a page back to its file if it's dirty.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let frame_id = {
            let pt = self.page_table.read();
            match pt.get(&page_id) {
                Some(&fid) => fid,
                None => return Ok(()),
            }
        };

        self.flush_frame(frame_id, page_id)
    }

    /// Write every dirty page back to its file.
    pub fn flush_all_pages(&self) -> Result<()> {
        let pages: Vec<(PageId, FrameId)> = {
            let pt = self.page_table.read();
            pt.iter().map(|(&pid, &fid)| (pid, fid)).collect()
        };

        for (page_id, frame_id) in pages {
            self.flush_frame(frame_id, page_id)?;
        }

        Ok(())
    }

    /// Drop a page from the pool without writing it back.
    ///
    /// # Errors
    /// - `Error::PagePinned` if a guard on the page is alive
    pub fn discard_page(&self, page_id: PageId) -> Result<()> {
        let mut pt = self.page_table.write();

        let frame_id = match pt.get(&page_id) {
            Some(&fid) => fid,
            None => return Ok(()),
        };

        let frame = &self.frames[frame_id.0];
        if frame.is_pinned() {
            return Err(Error::PagePinned(page_id));
        }

        pt.remove(&page_id);
        drop(pt);

        frame.reset();
        self.replacer.lock().remove(frame_id);
        self.free_list.lock().push(frame_id);
        BufferPoolStats::bump(&self.stats.pages_discarded);

        debug!("discarded {} from {}", page_id, frame_id);
        Ok(())
    }

    /// Finish `tid`.
    ///
    /// On commit, every page `tid` dirtied is written back. On abort those
    /// pages are rolled back to their on-disk version and `tid` is refused
    /// from then on. An unpinned page is simply dropped; a pinned one is
    /// overwritten in place, waiting for current readers to let go, so `tid`
    /// must not hold guards of its own when aborting.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        let dirtied: Vec<(PageId, FrameId)> = {
            let pt = self.page_table.read();
            pt.iter()
                .filter(|(_, fid)| self.frames[fid.0].dirtied_by() == Some(tid))
                .map(|(&pid, &fid)| (pid, fid))
                .collect()
        };

        if commit {
            for (page_id, frame_id) in dirtied {
                self.flush_frame(frame_id, page_id)?;
            }
            debug!("{} committed", tid);
            return Ok(());
        }

        self.aborted.lock().insert(tid);
        for (page_id, frame_id) in dirtied {
            self.roll_back(tid, frame_id, page_id)?;
        }
        debug!("{} aborted", tid);
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn free_frame_count(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Number of pages currently cached.
    pub fn page_count(&self) -> usize {
        self.page_table.read().len()
    }

    pub fn is_cached(&self, page_id: PageId) -> bool {
        self.page_table.read().contains_key(&page_id)
    }

    // ========================================================================
    // Internal: Called by page guards on drop
    // ========================================================================

    /// Unpin a frame, marking it dirty first if a writer is releasing it.
    pub(crate) fn unpin_page_internal(&self, frame_id: FrameId, dirtied_by: Option<TransactionId>) {
        let frame = &self.frames[frame_id.0];

        if let Some(tid) = dirtied_by {
            frame.mark_dirty(tid);
        }

        if frame.unpin() == 0 {
            self.replacer.lock().set_evictable(frame_id, true);
        }
    }

    // ========================================================================
    // Internal: Core fetch logic
    // ========================================================================

    fn fetch_page_internal(&self, tid: TransactionId, page_id: PageId) -> Result<FrameId> {
        if self.aborted.lock().contains(&tid) {
            return Err(Error::TransactionAborted(tid));
        }

        // Fast path: shared lock only
        {
            let pt = self.page_table.read();
            if let Some(&frame_id) = pt.get(&page_id) {
                self.handle_cache_hit(frame_id);
                return Ok(frame_id);
            }
        }

        self.handle_cache_miss(page_id)
    }

    /// Pin the frame and update the replacer.
    ///
    /// Callers hold the page table lock, which keeps the frame from being
    /// evicted before it's pinned.
    fn handle_cache_hit(&self, frame_id: FrameId) {
        self.frames[frame_id.0].pin();

        {
            let mut replacer = self.replacer.lock();
            replacer.record_access(frame_id);
            replacer.set_evictable(frame_id, false);
        }

        BufferPoolStats::bump(&self.stats.cache_hits);
    }

    /// Load a page from its file into a frame.
    ///
    /// The read happens before the page table is locked, so hits and misses
    /// on other pages proceed meanwhile. A bad page never claims a frame.
    fn handle_cache_miss(&self, page_id: PageId) -> Result<FrameId> {
        let file = self.catalog.database_file(page_id.table_id)?;
        let epoch = self.flush_epoch.load(Ordering::Acquire);
        let mut page = file.read_page(page_id)?;
        BufferPoolStats::bump(&self.stats.pages_read);

        let mut pt = self.page_table.write();

        // Another thread may have loaded it while we were reading.
        if let Some(&frame_id) = pt.get(&page_id) {
            self.handle_cache_hit(frame_id);
            return Ok(frame_id);
        }

        // A write-back that overlapped the read may have been missed. With the
        // page absent from the table, no write-back of it can be in progress.
        if self.flush_epoch.load(Ordering::Acquire) != epoch {
            page = file.read_page(page_id)?;
            BufferPoolStats::bump(&self.stats.pages_read);
        }

        BufferPoolStats::bump(&self.stats.cache_misses);

        let frame_id = self.get_free_frame(&mut pt)?;
        let frame = &self.frames[frame_id.0];
        frame.install(page);
        frame.pin();
        pt.insert(page_id, frame_id);

        {
            let mut replacer = self.replacer.lock();
            replacer.record_access(frame_id);
            replacer.set_evictable(frame_id, false);
        }

        Ok(frame_id)
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    /// Get a free frame, evicting if necessary.
    fn get_free_frame(&self, pt: &mut HashMap<PageId, FrameId>) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.lock().pop() {
            return Ok(frame_id);
        }

        self.evict_page(pt)
    }

    /// Evict the least recently used clean, unpinned page.
    fn evict_page(&self, pt: &mut HashMap<PageId, FrameId>) -> Result<FrameId> {
        let frame_id = self
            .replacer
            .lock()
            .evict_where(|fid| self.frames[fid.0].is_evictable())
            .ok_or(Error::NoFreeFrames)?;

        BufferPoolStats::bump(&self.stats.evictions);

        let frame = &self.frames[frame_id.0];
        if let Some(old_page_id) = frame.page_id() {
            pt.remove(&old_page_id);
            debug!("evicted {} from {}", old_page_id, frame_id);
        }
        frame.reset();

        Ok(frame_id)
    }

    /// Write a frame back to its file if dirty.
    fn flush_frame(&self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id.0];
        if !frame.is_dirty() {
            return Ok(());
        }

        let file = self.catalog.database_file(page_id.table_id)?;

        // Clear the flag under the page lock: writers mark dirty while still
        // holding the write lock, so no update can slip between the two.
        let page = frame.page();
        if let Some(page) = page.as_ref() {
            file.write_page(page)?;
        }
        // Before the frame turns evictable, so a later miss on this page
        // sees the bump.
        self.flush_epoch.fetch_add(1, Ordering::Release);
        frame.clear_dirty();
        drop(page);

        BufferPoolStats::bump(&self.stats.pages_written);
        debug!("flushed {} from {}", page_id, frame_id);
        Ok(())
    }

    /// Undo `tid`'s changes to a page.
    fn roll_back(&self, tid: TransactionId, frame_id: FrameId, page_id: PageId) -> Result<()> {
        match self.discard_page(page_id) {
            Ok(()) => return Ok(()),
            Err(Error::PagePinned(_)) => {}
            Err(e) => return Err(e),
        }

        let file = self.catalog.database_file(page_id.table_id)?;
        let on_disk = file.read_page(page_id)?;
        BufferPoolStats::bump(&self.stats.pages_read);

        let frame = &self.frames[frame_id.0];
        let mut page = frame.page_mut();
        // Dropped or written back while we were reading.
        if frame.page_id() != Some(page_id) || frame.dirtied_by() != Some(tid) {
            return Ok(());
        }
        *page = Some(on_disk);
        frame.clear_dirty();
        drop(page);

        BufferPoolStats::bump(&self.stats.pages_discarded);
        debug!("rolled back pinned {} in {} for {}", page_id, frame_id, tid);
        Ok(())
    }
}
