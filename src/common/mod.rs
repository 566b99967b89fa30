//! Common types shared across heapdb.
//!
//! - Configuration (page size, string width, pool size)
//! - Error types
//! - Identifiers (TableId, PageId, FrameId, TransactionId)

pub mod config;
pub mod error;
mod frame_id;
mod page_id;
mod transaction_id;

pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::{PageId, TableId};
pub use transaction_id::TransactionId;
