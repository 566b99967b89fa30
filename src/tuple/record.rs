//! Tuples and record identifiers.

use std::fmt;

use crate::common::PageId;

use super::Field;

/// Where a tuple lives: a page and a slot on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: usize,
}

impl RecordId {
    #[inline]
    pub fn new(page_id: PageId, slot: usize) -> Self {
        RecordId { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot)
    }
}

/// A row: field values plus, once stored, its [`RecordId`].
///
/// Tuples read from a page carry the record id of their slot; that's what
/// `delete_tuple` uses to find them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            record_id: None,
        }
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, i: usize) -> Option<&Field> {
        self.fields.get(i)
    }

    #[inline]
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
