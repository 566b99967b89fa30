//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds one decoded [`Page`] plus what the pool needs to manage it:
//! - Which page is loaded (if any)
//! - Pin count for reference counting
//! - Which transaction last dirtied it

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{PageId, TransactionId};
use crate::storage::page::Page;

/// A frame in the buffer pool.
///
/// # Thread Safety
/// - `page`: `RwLock` for read/write synchronization
/// - `page_id`, `dirtied_by`: `Mutex` for safe updates
/// - `pin_count`: `AtomicU32` for lock-free reference counting
pub struct Frame {
    /// The cached page, or None if the frame is free.
    page: RwLock<Option<Page>>,

    page_id: Mutex<Option<PageId>>,

    /// Number of live guards on this frame.
    pin_count: AtomicU32,

    /// Transaction that owns the dirty page until it commits or aborts; None when clean.
    dirtied_by: Mutex<Option<TransactionId>>,
}

impl Frame {
    /// Create a new empty frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(None),
            page_id: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            dirtied_by: Mutex::new(None),
        }
    }

    // ========================================================================
    // Page access (RwLock)
    // ========================================================================

    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Option<Page>> {
        self.page.read()
    }

    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Option<Page>> {
        self.page.write()
    }

    /// Load `page` into this frame as a clean page.
    pub fn install(&self, page: Page) {
        let page_id = page.id();
        *self.page_mut() = Some(page);
        self.set_page_id(Some(page_id));
        self.clear_dirty();
    }

    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        *self.page_id.lock()
    }

    #[inline]
    pub fn set_page_id(&self, page_id: Option<PageId>) {
        *self.page_id.lock() = page_id;
    }

    // ========================================================================
    // Pin count operations (Atomic)
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    /// Record that `tid` modified the page and now owns it.
    #[inline]
    pub fn mark_dirty(&self, tid: TransactionId) {
        *self.dirtied_by.lock() = Some(tid);
    }

    #[inline]
    pub fn clear_dirty(&self) {
        *self.dirtied_by.lock() = None;
    }

    #[inline]
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        *self.dirtied_by.lock()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirtied_by().is_some()
    }

    // ========================================================================
    // Frame state queries
    // ========================================================================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.page_id().is_none()
    }

    /// Whether the pool may reuse this frame: loaded, unpinned and clean.
    ///
    /// Dirty pages are never evicted; they leave the pool only by flush or
    /// discard.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        !self.is_empty() && !self.is_pinned() && !self.is_dirty()
    }

    /// Reset the frame to the free state.
    pub fn reset(&self) {
        *self.page_mut() = None;
        self.set_page_id(None);
        self.pin_count.store(0, Ordering::Relaxed);
        self.clear_dirty();
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
