//! Two-slot buffer pair for stencil ping-pong
//!
//! A stencil kernel cannot read and write the same field in one launch: a
//! neighbor may already have been overwritten. Every iterative operation
//! therefore reads from one slot and writes the other, then swaps. The pair
//! tracks which slot holds the authoritative values so callers never need
//! to count iterations themselves.

use crate::core_types::Cell;

/// Which half of a [`PingPong`] holds the authoritative values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The named field being solved for
    Primary,
    /// The shared scratch buffer
    Scratch,
}

impl Slot {
    /// The other slot
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Primary => Self::Scratch,
            Self::Scratch => Self::Primary,
        }
    }
}

/// A named field paired with the scratch buffer
pub struct PingPong<'a, T: Cell> {
    primary: &'a mut [T],
    scratch: &'a mut [T],
    settled: Slot,
}

impl<'a, T: Cell> PingPong<'a, T> {
    /// Pair a named field with scratch. The named field starts authoritative.
    ///
    /// # Panics
    ///
    /// Panics if the two buffers differ in length.
    pub fn new(primary: &'a mut [T], scratch: &'a mut [T]) -> Self {
        assert_eq!(
            primary.len(),
            scratch.len(),
            "Ping-pong buffers must have equal length"
        );
        Self {
            primary,
            scratch,
            settled: Slot::Primary,
        }
    }

    /// Slot currently holding the authoritative values
    #[must_use]
    pub fn settled_in(&self) -> Slot {
        self.settled
    }

    /// Authoritative buffer
    #[must_use]
    pub fn current(&self) -> &[T] {
        match self.settled {
            Slot::Primary => &*self.primary,
            Slot::Scratch => &*self.scratch,
        }
    }

    /// Authoritative buffer, mutably (for in-place border passes)
    pub fn current_mut(&mut self) -> &mut [T] {
        match self.settled {
            Slot::Primary => &mut *self.primary,
            Slot::Scratch => &mut *self.scratch,
        }
    }

    /// Split into `(read, write)`: the authoritative buffer and the other one
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        match self.settled {
            Slot::Primary => (&*self.primary, &mut *self.scratch),
            Slot::Scratch => (&*self.scratch, &mut *self.primary),
        }
    }

    /// Mark the write buffer of the last [`split`](Self::split) as authoritative
    pub fn swap(&mut self) {
        self.settled = self.settled.other();
    }

    /// Consume the pair, returning the authoritative slot, the named field
    /// and scratch
    pub fn into_parts(self) -> (Slot, &'a mut [T], &'a mut [T]) {
        (self.settled, self.primary, self.scratch)
    }
}
