//! Table and page identifiers.

use std::fmt;
use std::path::Path;

/// Identifies a table, and with it the heap file that stores it.
///
/// Derived from the backing file's canonical path, so two heap files opened
/// over the same file agree on their id without consulting a catalog.
///
/// # Example
/// ```
/// use heapdb::TableId;
///
/// let a = TableId::from_path("/data/students.dat".as_ref());
/// let b = TableId::from_path("/data/students.dat".as_ref());
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl TableId {
    /// Hash a path into a table id.
    ///
    /// The caller is responsible for canonicalizing `path` first; the hash is
    /// over the raw path bytes.
    pub fn from_path(path: &Path) -> Self {
        TableId(crc32fast::hash(path.as_os_str().as_encoded_bytes()))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a page: which table it belongs to and where it sits in that
/// table's file.
///
/// Page `n` of a table lives at byte offset `n × page_size()` of the file.
/// The buffer pool keys its page table on this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub table_id: TableId,
    pub page_number: u32,
}

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(table_id: TableId, page_number: u32) -> Self {
        PageId {
            table_id,
            page_number,
        }
    }

    /// Byte offset of this page in its file.
    #[inline]
    pub fn offset(&self, page_size: usize) -> u64 {
        u64::from(self.page_number) * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({}, {})", self.table_id, self.page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_id_deterministic() {
        let path = Path::new("/tmp/some/table.dat");
        assert_eq!(TableId::from_path(path), TableId::from_path(path));
        assert_ne!(
            TableId::from_path(path),
            TableId::from_path(Path::new("/tmp/some/other.dat"))
        );
    }

    #[test]
    fn test_page_id_equality_covers_both_fields() {
        let a = PageId::new(TableId(1), 0);
        assert_eq!(a, PageId::new(TableId(1), 0));
        assert_ne!(a, PageId::new(TableId(2), 0));
        assert_ne!(a, PageId::new(TableId(1), 1));

        let set: HashSet<PageId> = [a, PageId::new(TableId(2), 0), a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_page_id_ordering() {
        // table-major, then page number
        assert!(PageId::new(TableId(1), 9) < PageId::new(TableId(2), 0));
        assert!(PageId::new(TableId(1), 1) < PageId::new(TableId(1), 2));
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(PageId::new(TableId(1), 0).offset(4096), 0);
        assert_eq!(PageId::new(TableId(1), 3).offset(4096), 3 * 4096);
        assert_eq!(
            PageId::new(TableId(1), u32::MAX).offset(4096),
            u64::from(u32::MAX) * 4096
        );
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(TableId(7), 42)), "Page(7, 42)");
    }
}
