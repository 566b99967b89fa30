//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - A decoded page, tagged by kind
//! - [`HeapPage`] - Slotted page of fixed-size tuples with a header bitmap

mod heap_page;
#[allow(clippy::module_inception)]
mod page;

pub use heap_page::HeapPage;
pub use page::Page;
