//! Configuration constants for heapdb.
//!
//! The page size is the one value that can change at runtime: test suites
//! shrink it to get many small pages out of a handful of tuples. Everything
//! that lays out or addresses pages reads [`page_size()`] on each call.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so one page is one I/O.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Fixed width of a `String` field payload in bytes.
///
/// On disk a string is a 4-byte length followed by exactly this many bytes.
pub const STRING_LEN: usize = 128;

/// Default number of frames in a buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 50;

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_PAGE_SIZE);

/// Current page size in bytes.
#[inline]
pub fn page_size() -> usize {
    PAGE_SIZE.load(Ordering::Relaxed)
}

/// Override the page size.
///
/// Only safe to call while no heap files or buffer pools are in use: pages
/// already on disk or cached keep the layout they were written with.
///
/// # Panics
/// Panics if `size` is 0.
pub fn set_page_size(size: usize) {
    assert!(size > 0, "page size must be > 0");
    PAGE_SIZE.store(size, Ordering::Relaxed);
}

/// Restore the default page size.
pub fn reset_page_size() {
    PAGE_SIZE.store(DEFAULT_PAGE_SIZE, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_size() {
        assert!(DEFAULT_PAGE_SIZE.is_power_of_two());
        assert_eq!(DEFAULT_PAGE_SIZE, 4096);
    }

    #[test]
    fn test_string_fits_in_default_page() {
        // header bit + length prefix + payload must fit at least once
        assert!(STRING_LEN + 4 + 1 < DEFAULT_PAGE_SIZE);
    }
}
