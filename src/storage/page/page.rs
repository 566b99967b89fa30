//! Page - the unit the buffer pool caches.
//!
//! A [`Page`] is a decoded page image tagged with its kind. Only heap pages
//! exist today; other page kinds become further variants.

use crate::common::PageId;
use crate::tuple::Tuple;

use super::HeapPage;

/// A decoded page, tagged by kind.
#[derive(Debug, Clone)]
pub enum Page {
    Heap(HeapPage),
}

impl Page {
    #[inline]
    pub fn id(&self) -> PageId {
        match self {
            Page::Heap(page) => page.id(),
        }
    }

    /// Serialize into a page image of exactly `page_size()` bytes.
    pub fn page_data(&self) -> Vec<u8> {
        match self {
            Page::Heap(page) => page.page_data(),
        }
    }

    /// Tuples on this page in the page's own order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        match self {
            Page::Heap(page) => page.iter(),
        }
    }

    pub fn as_heap(&self) -> &HeapPage {
        match self {
            Page::Heap(page) => page,
        }
    }

    pub fn as_heap_mut(&mut self) -> &mut HeapPage {
        match self {
            Page::Heap(page) => page,
        }
    }
}

impl From<HeapPage> for Page {
    fn from(page: HeapPage) -> Self {
        Page::Heap(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TableId;
    use crate::tuple::{Field, TupleDesc, Type};

    #[test]
    fn test_page_delegates_to_heap_page() {
        let pid = PageId::new(TableId(3), 1);
        let mut heap = HeapPage::empty(pid, TupleDesc::new([Type::Int]));
        heap.insert_tuple(Tuple::new(vec![Field::Int(7)])).unwrap();

        let page = Page::from(heap);
        assert_eq!(page.id(), pid);
        assert_eq!(page.iter().count(), 1);
        assert_eq!(page.page_data(), page.as_heap().page_data());
    }
}
