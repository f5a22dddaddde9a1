//! Modification counter and the stamps detached cursors compare against it.
//!
//! ```text
//!   map.mod_count ──► 7 ──► 8 (insert) ──► 9 (remove) ...
//!                     │
//!   cursor.stamp ─────┘ captured at creation, compared before every step
//! ```
//!
//! Detection is best effort: a mismatch means some structural change happened
//! since the stamp was taken, but the absence of a mismatch proves nothing.

use crate::error::MapError;

/// Monotonically increasing count of structural changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModCount(u64);

impl ModCount {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Captures the current count.
    #[inline]
    pub fn stamp(&self) -> Stamp {
        Stamp(self.0)
    }
}

/// A captured [`ModCount`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp(u64);

impl Stamp {
    /// Fails with [`MapError::ConcurrentModification`] if `live` moved on.
    #[inline]
    pub fn check(&self, live: &ModCount) -> Result<(), MapError> {
        if self.0 == live.0 {
            Ok(())
        } else {
            Err(MapError::ConcurrentModification)
        }
    }

    /// Adopts the live count after the stamp holder changed the structure.
    #[inline]
    pub fn resync(&mut self, live: &ModCount) {
        self.0 = live.0;
    }
}
