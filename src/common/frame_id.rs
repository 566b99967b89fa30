//! Frame identifier type.

use std::fmt;

/// Index of a frame in the buffer pool.
///
/// `usize` so it indexes the pool's `Vec<Frame>` directly: `frames[frame_id.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
