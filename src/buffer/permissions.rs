//! Page access permissions.

/// How a transaction intends to use a page it asks the pool for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permissions {
    /// Shared access; many readers at once.
    ReadOnly,
    /// Exclusive access; the page is marked dirty when released.
    ReadWrite,
}
