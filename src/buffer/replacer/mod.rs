//! Eviction policy implementations (replacers).
//!
//! - [`LruReplacer`] - Least Recently Used

mod lru;

pub use lru::LruReplacer;
