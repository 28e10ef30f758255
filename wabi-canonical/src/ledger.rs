//! Allocation ledger tracking guest allocations made during one lowering.
//!
//! Every allocation the lowering engine performs is recorded here before
//! the allocated range is written. On failure the caller releases the
//! whole ledger in LIFO order; on success ownership of the ranges stays
//! with the guest and the ledger is merely reset.

use crate::memory::GuestAllocator;
use crate::prelude::*;

/// One recorded guest allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestAllocation {
    /// Guest address of the allocation.
    pub ptr: u32,
    /// Size in bytes.
    pub size: u32,
    /// Alignment the range was requested with.
    pub align: u32,
}

/// Short-lived, single-threaded record of pending-to-free allocations.
#[derive(Debug, Default)]
pub struct AllocationLedger {
    entries: Vec<GuestAllocation>,
}

impl AllocationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an allocation.
    pub fn add(&mut self, ptr: u32, size: u32, align: u32) {
        self.entries.push(GuestAllocation { ptr, size, align });
    }

    /// Number of recorded allocations.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry capacity, used by the pool to discard grown ledgers.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Recorded allocations, oldest first.
    pub fn entries(&self) -> &[GuestAllocation] {
        &self.entries
    }

    /// Forget all entries without releasing them; used after a successful
    /// lowering, when the guest owns the allocations.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Release every recorded allocation in LIFO order and clear the
    /// ledger.
    ///
    /// Freeing continues past individual failures; the first error is
    /// reported after the sweep so a partial release never strands later
    /// entries.
    pub fn free_all<A: GuestAllocator>(&mut self, allocator: &mut A) -> Result<()> {
        let mut first_err = None;
        while let Some(entry) = self.entries.pop() {
            if let Err(err) = allocator.free(entry.ptr, entry.size, entry.align) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Clear the ledger without an allocator to release through.
    ///
    /// The recorded ranges leak into the guest; the ledger itself stays
    /// valid and empty.
    pub fn free_all_or_leak(&mut self) {
        self.entries.clear();
    }
}
