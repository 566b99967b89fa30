//! Storage layer - table files and page formats.
//!
//! - [`DbFile`] / [`DbFileIterator`] - What a table file and its cursor provide
//! - [`HeapFile`] - Unordered tuples in fixed-size pages
//! - [`HeapFileCursor`] - Page-by-page tuple scan through the buffer pool
//! - [`page`] - Page types and layouts
//! - [`write_heap_file`] - Bulk loading into the heap file format

mod db_file;
mod heap_file;
mod heap_file_cursor;
mod heap_file_encoder;
pub mod page;

pub use db_file::{DbFile, DbFileIterator};
pub use heap_file::HeapFile;
pub use heap_file_cursor::{CursorState, HeapFileCursor};
pub use heap_file_encoder::{write_heap_file, write_heap_file_pages};
