//! Writing heap files from tuples.
//!
//! Produces files in the exact on-disk format [`HeapFile`](super::HeapFile)
//! reads, without going through a buffer pool. Used to load tables in bulk
//! and to build fixtures.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::common::{Error, PageId, Result, TableId};
use crate::storage::page::HeapPage;
use crate::tuple::{Tuple, TupleDesc};

/// Write `tuples` to `path`, packing each page full before starting the next.
///
/// Any existing file is truncated. Returns the number of pages written.
///
/// # Errors
/// - `Error::SchemaMismatch` if a tuple doesn't fit `td`, or a single tuple
///   is larger than a page
/// - `Error::Io` on write failure
pub fn write_heap_file<P, I>(path: P, td: &TupleDesc, tuples: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Tuple>,
{
    let per_page = HeapPage::slots_per_page(td);
    if per_page == 0 {
        return Err(Error::SchemaMismatch(format!("{} does not fit on a page", td)));
    }

    let mut pages = Vec::new();
    let mut current = Vec::with_capacity(per_page);
    for tuple in tuples {
        current.push(tuple);
        if current.len() == per_page {
            pages.push(std::mem::replace(&mut current, Vec::with_capacity(per_page)));
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }

    write_heap_file_pages(path, td, pages)
}

/// Write one page per element of `pages`, each holding exactly those tuples
/// in slot order. An empty element writes an empty page.
///
/// Any existing file is truncated. Returns the number of pages written.
///
/// # Errors
/// - `Error::SchemaMismatch` if a tuple doesn't fit `td`
/// - `Error::PageFull` if a page is given more tuples than it has slots
/// - `Error::Io` on write failure
pub fn write_heap_file_pages<P, I>(path: P, td: &TupleDesc, pages: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Vec<Tuple>>,
{
    let mut file = File::create(path.as_ref())?;
    let mut written = 0;

    for tuples in pages {
        // The table id isn't part of the image; any value will do.
        let mut page = HeapPage::empty(PageId::new(TableId(0), written as u32), td.clone());
        for tuple in tuples {
            page.insert_tuple(tuple)?;
        }
        file.write_all(&page.page_data())?;
        written += 1;
    }

    file.sync_all()?;
    debug!("encoded {} pages into {}", written, path.as_ref().display());
    Ok(written)
}
