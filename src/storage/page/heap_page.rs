//! Heap page - a slotted page of fixed-size tuples.

use crate::common::config::page_size;
use crate::common::{Error, PageId, Result};
use crate::tuple::{Field, RecordId, Tuple, TupleDesc};

/// A decoded heap page.
///
/// # Layout
/// ```text
/// ┌──────────────┬─────────┬─────────┬─────┬──────────────┬──────────┐
/// │ header bits  │ slot 0  │ slot 1  │ ... │ slot N-1     │ 0 padding│
/// │ ⌈N/8⌉ bytes  │ tsize   │ tsize   │     │ tsize        │          │
/// └──────────────┴─────────┴─────────┴─────┴──────────────┴──────────┘
/// ```
/// - `N = ⌊page_size × 8 / (tsize × 8 + 1)⌋`: each tuple costs its bytes plus
///   one header bit.
/// - Slot `i` is in use iff bit `i % 8` (LSB first) of header byte `i / 8`
///   is set. Unused slots are zero on disk and never decoded.
///
/// An all-zero image is therefore a valid empty page, which is how new pages
/// are appended to a file.
#[derive(Debug, Clone)]
pub struct HeapPage {
    pid: PageId,
    td: TupleDesc,
    header: Vec<u8>,
    tuples: Vec<Option<Tuple>>,
}

impl HeapPage {
    /// Decode a page image.
    ///
    /// # Errors
    /// `MalformedPage` if `data` isn't exactly one page or a used slot doesn't
    /// decode under `td`.
    pub fn new(pid: PageId, data: &[u8], td: TupleDesc) -> Result<Self> {
        if data.len() != page_size() {
            return Err(Error::MalformedPage {
                page: pid,
                reason: format!("image is {} bytes, page size is {}", data.len(), page_size()),
            });
        }

        let num_slots = Self::slots_per_page(&td);
        let header_size = Self::header_size(num_slots);
        let tuple_size = td.size();
        let header = data[..header_size].to_vec();

        let mut tuples = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            if !bit_is_set(&header, slot) {
                tuples.push(None);
                continue;
            }
            let start = header_size + slot * tuple_size;
            let mut tuple = decode_tuple(&td, &data[start..start + tuple_size])
                .map_err(|reason| Error::MalformedPage {
                    page: pid,
                    reason: format!("slot {}: {}", slot, reason),
                })?;
            tuple.set_record_id(Some(RecordId::new(pid, slot)));
            tuples.push(Some(tuple));
        }

        Ok(Self {
            pid,
            td,
            header,
            tuples,
        })
    }

    /// A page with every slot free.
    pub fn empty(pid: PageId, td: TupleDesc) -> Self {
        let num_slots = Self::slots_per_page(&td);
        Self {
            pid,
            td,
            header: vec![0u8; Self::header_size(num_slots)],
            tuples: vec![None; num_slots],
        }
    }

    /// Bytes of an empty page.
    pub fn empty_page_data() -> Vec<u8> {
        vec![0u8; page_size()]
    }

    /// How many tuples of `td` fit on one page.
    pub fn slots_per_page(td: &TupleDesc) -> usize {
        (page_size() * 8) / (td.size() * 8 + 1)
    }

    /// Header bytes needed for `num_slots` slots.
    #[inline]
    pub fn header_size(num_slots: usize) -> usize {
        num_slots.div_ceil(8)
    }

    #[inline]
    pub fn id(&self) -> PageId {
        self.pid
    }

    pub fn tuple_desc(&self) -> &TupleDesc {
        &self.td
    }

    #[inline]
    pub fn num_slots(&self) -> usize {
        self.tuples.len()
    }

    pub fn num_empty_slots(&self) -> usize {
        self.tuples.iter().filter(|t| t.is_none()).count()
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        slot < self.num_slots() && bit_is_set(&self.header, slot)
    }

    /// Serialize back into a page image of exactly `page_size()` bytes.
    pub fn page_data(&self) -> Vec<u8> {
        let mut data = Self::empty_page_data();
        let header_size = self.header.len();
        let tuple_size = self.td.size();

        data[..header_size].copy_from_slice(&self.header);

        for (slot, tuple) in self.tuples.iter().enumerate() {
            if let Some(tuple) = tuple {
                let mut offset = header_size + slot * tuple_size;
                for field in tuple.fields() {
                    let size = field.field_type().size();
                    field.encode(&mut data[offset..offset + size]);
                    offset += size;
                }
            }
        }

        data
    }

    /// Put `tuple` into the first free slot.
    ///
    /// Returns the record id the tuple now has.
    ///
    /// # Errors
    /// - `SchemaMismatch` if the tuple doesn't fit the page's schema
    /// - `PageFull` if no slot is free
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> Result<RecordId> {
        if !self.td.matches(&tuple) {
            return Err(Error::SchemaMismatch(self.td.to_string()));
        }
        let slot = self
            .tuples
            .iter()
            .position(Option::is_none)
            .ok_or(Error::PageFull(self.pid))?;

        let rid = RecordId::new(self.pid, slot);
        tuple.set_record_id(Some(rid));
        self.tuples[slot] = Some(tuple);
        set_bit(&mut self.header, slot, true);
        Ok(rid)
    }

    /// Free the slot named by `tuple`'s record id.
    ///
    /// # Errors
    /// - `MissingRecordId` if the tuple was never stored
    /// - `TableMismatch` / `MalformedPage` if the record id points at another page
    /// - `SlotEmpty` if the slot is already free
    pub fn delete_tuple(&mut self, tuple: &Tuple) -> Result<()> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        if rid.page_id.table_id != self.pid.table_id {
            return Err(Error::TableMismatch {
                expected: self.pid.table_id,
                actual: rid.page_id.table_id,
            });
        }
        if rid.page_id != self.pid {
            return Err(Error::MalformedPage {
                page: self.pid,
                reason: format!("record {} is not on this page", rid),
            });
        }
        if !self.is_slot_used(rid.slot) {
            return Err(Error::SlotEmpty {
                page: self.pid,
                slot: rid.slot,
            });
        }

        self.tuples[rid.slot] = None;
        set_bit(&mut self.header, rid.slot, false);
        Ok(())
    }

    /// Tuples in slot order, skipping free slots.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter().flatten()
    }
}

fn decode_tuple(td: &TupleDesc, buf: &[u8]) -> std::result::Result<Tuple, String> {
    let mut fields = Vec::with_capacity(td.num_fields());
    let mut offset = 0;
    for item in td.iter() {
        let size = item.field_type.size();
        fields.push(Field::decode(item.field_type, &buf[offset..offset + size])?);
        offset += size;
    }
    Ok(Tuple::new(fields))
}

#[inline]
fn bit_is_set(header: &[u8], slot: usize) -> bool {
    header[slot / 8] & (1 << (slot % 8)) != 0
}

#[inline]
fn set_bit(header: &mut [u8], slot: usize, used: bool) {
    if used {
        header[slot / 8] |= 1 << (slot % 8);
    } else {
        header[slot / 8] &= !(1 << (slot % 8));
    }
}

// ============================================================================
// TESTS
// ============================================================================
