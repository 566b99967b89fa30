//! Buffer pool management.
//!
//! The buffer pool is the shared page cache between table files and their
//! users. It owns every in-memory page and is the only way tuple-level code
//! reaches a page.
//!
//! # Components
//! - [`BufferPool`] - The page cache
//! - [`Frame`] - A slot in the pool holding a page + metadata
//! - [`PageReadGuard`] / [`PageWriteGuard`] / [`PageGuard`] - RAII page access
//! - [`Permissions`] - Read-only vs read-write requests
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool;
mod frame;
mod page_guard;
mod permissions;
pub mod replacer;
mod stats;

pub use buffer_pool::BufferPool;
pub use frame::Frame;
pub use page_guard::{PageGuard, PageReadGuard, PageWriteGuard};
pub use permissions::Permissions;
pub use stats::{BufferPoolStats, StatsSnapshot};
