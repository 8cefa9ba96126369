//! Stable keyframe identifiers and their allocator.

use serde::{Deserialize, Serialize};

/// Opaque handle for a keyframe. Unlike an index it survives re-sorting the
/// owning track, so an edit in progress can find "its" keyframe again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct KeyId(pub u32);

/// Monotonic allocator for KeyId. One per Document.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_key: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_key(&mut self) -> KeyId {
        let id = KeyId(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        id
    }
}
