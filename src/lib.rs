//! heapdb - page-structured heap files streamed through a shared buffer pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            heapdb                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Cursors (storage/heap_file_cursor.rs)             │   │
//! │  │     open → has_next / next → rewind → close              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓ get_page(tid, pid, ReadOnly)     │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Buffer Pool (buffer/)                      │   │
//! │  │   Frames + LRU replacer + page guards + statistics       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓ on miss: catalog → read_page     │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │  Catalog (catalog.rs)  →  HeapFile (storage/)            │   │
//! │  │     TableId → DbFile      page images back to back       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, TableId, Error, config)
//! - [`tuple`] - Schemas, field values and tuples
//! - [`storage`] - Heap files, their cursors and page formats
//! - [`buffer`] - The buffer pool
//! - [`catalog`] - Table registry
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use heapdb::{BufferPool, Catalog, DbFileIterator, HeapFile, TransactionId};
//! use heapdb::{Type, TupleDesc};
//!
//! let td = TupleDesc::new([Type::Int, Type::Int]);
//! let file = Arc::new(HeapFile::new("table.dat", td).unwrap());
//!
//! let catalog = Arc::new(Catalog::new());
//! catalog.add_table(file.clone(), "table");
//! let pool = BufferPool::with_catalog(catalog);
//!
//! let mut cursor = file.cursor(&pool, TransactionId::next());
//! cursor.open().unwrap();
//! while cursor.has_next().unwrap() {
//!     println!("{}", cursor.next().unwrap());
//! }
//! cursor.close();
//! ```

pub mod buffer;
pub mod catalog;
pub mod common;
pub mod storage;
pub mod tuple;

// Re-export commonly used items at crate root for convenience
pub use common::config::page_size;
pub use common::{Error, FrameId, PageId, Result, TableId, TransactionId};

pub use buffer::{BufferPool, BufferPoolStats, Permissions, StatsSnapshot};
pub use catalog::Catalog;
pub use storage::page::{HeapPage, Page};
pub use storage::{CursorState, DbFile, DbFileIterator, HeapFile, HeapFileCursor};
pub use tuple::{Field, RecordId, Tuple, TupleDesc, Type};
