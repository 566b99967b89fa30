//! Tuple model: schemas, field values and records.
//!
//! - [`TupleDesc`] / [`Type`] - the typed column list of a table
//! - [`Field`] - a single typed value, with its fixed-width encoding
//! - [`Tuple`] / [`RecordId`] - a row and where it lives on disk

mod desc;
mod field;
mod record;

pub use desc::{TdItem, TupleDesc, Type};
pub use field::Field;
pub use record::{RecordId, Tuple};
