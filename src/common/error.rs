//! Error types for heapdb.

use std::path::PathBuf;

use thiserror::Error;

use super::{FrameId, PageId, TableId, TransactionId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in heapdb.
///
/// A single error type keeps handling uniform from the page layer up to the
/// cursor: whatever the buffer pool raises surfaces unchanged to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Unexpected I/O error on a backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page lies outside the file, or reading it came up short.
    #[error("table {table} page {page} is invalid")]
    InvalidPage { table: TableId, page: u32 },

    /// A page id for one table was handed to another table's file.
    #[error("page belongs to table {actual}, file is table {expected}")]
    TableMismatch { expected: TableId, actual: TableId },

    /// A heap file must be backed by an existing regular file.
    #[error("{} is not a regular file", .0.display())]
    NotARegularFile(PathBuf),

    /// No file is registered under this table id.
    #[error("no table with id {0}")]
    UnknownTable(TableId),

    /// No file is registered under this name.
    #[error("no table named {0:?}")]
    NoSuchTable(String),

    /// The tuple's fields don't match the table schema.
    #[error("tuple does not match schema {0}")]
    SchemaMismatch(String),

    /// Every slot on the page is in use.
    #[error("{0} has no empty slots")]
    PageFull(PageId),

    /// Deleting from a slot that holds no tuple.
    #[error("{page} slot {slot} is empty")]
    SlotEmpty { page: PageId, slot: usize },

    /// The tuple was never read from (or inserted into) a page.
    #[error("tuple has no record id")]
    MissingRecordId,

    /// Page bytes don't decode under the table schema.
    #[error("malformed {page}: {reason}")]
    MalformedPage { page: PageId, reason: String },

    /// Cursor used before `open()` or after `close()`.
    #[error("cursor is not open")]
    CursorNotOpen,

    /// `next()` called with no tuple left.
    #[error("no more tuples")]
    NoSuchElement,

    /// The transaction was aborted; the caller must close its cursors.
    #[error("transaction {0} aborted")]
    TransactionAborted(TransactionId),

    /// The page holds uncommitted changes of another transaction.
    #[error("{page} has uncommitted changes from {holder}")]
    WriteConflict {
        page: PageId,
        holder: TransactionId,
    },

    /// Buffer pool has no frame it may evict.
    ///
    /// Every frame is pinned or dirty (dirty pages are never stolen).
    #[error("no evictable frames in buffer pool")]
    NoFreeFrames,

    /// The page is pinned and can't be dropped from the pool.
    #[error("{0} is pinned")]
    PagePinned(PageId),

    /// A frame mapped in the page table holds no page.
    #[error("{0} is empty")]
    FrameEmpty(FrameId),
}

impl Error {
    /// Whether this error means "the page is not available".
    ///
    /// Short reads and out-of-range pages surface as `InvalidPage`, other
    /// failures of the backing file as `Io`. Callers that only care whether
    /// they got the page treat both alike.
    pub fn is_page_unavailable(&self) -> bool {
        matches!(self, Error::InvalidPage { .. } | Error::Io(_))
    }
}
