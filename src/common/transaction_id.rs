//! Transaction identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque token naming a logical transaction.
///
/// The heap file never interprets it; it only hands it to the buffer pool,
/// which uses it to attribute dirty pages and to refuse work from aborted
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Wrap a raw id.
    #[inline]
    pub fn new(id: u64) -> Self {
        TransactionId(id)
    }

    /// Allocate a process-unique id.
    pub fn next() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}
