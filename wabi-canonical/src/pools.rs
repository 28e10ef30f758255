//! Object pools for flat-slot buffers and allocation ledgers.
//!
//! Both pools hand out empty, usable objects and take them back cleared.
//! Objects whose internal capacity has grown past a fixed ceiling are
//! dropped instead of pooled so one atypically large call cannot pin
//! memory for the rest of the process.

use crate::ledger::AllocationLedger;
use crate::limits::{LEDGER_POOL_CEILING, SLOT_POOL_CEILING};
use crate::prelude::*;

/// Default number of objects a pool retains per kind.
const MAX_POOLED: usize = 16;

/// Pool of `Vec<u64>` flat-slot buffers.
#[derive(Debug, Default)]
pub struct SlotPool {
    buffers: Vec<Vec<u64>>,
}

impl SlotPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a cleared buffer from the pool, or allocate a fresh one.
    pub fn acquire(&mut self) -> Vec<u64> {
        self.buffers.pop().unwrap_or_default()
    }

    /// Return a buffer to the pool. Buffers grown past
    /// [`SLOT_POOL_CEILING`] are dropped.
    pub fn release(&mut self, mut buffer: Vec<u64>) {
        buffer.clear();
        if buffer.capacity() <= SLOT_POOL_CEILING && self.buffers.len() < MAX_POOLED {
            self.buffers.push(buffer);
        }
    }

    /// Number of buffers currently pooled.
    pub fn pooled(&self) -> usize {
        self.buffers.len()
    }
}

/// Pool of [`AllocationLedger`]s.
#[derive(Debug, Default)]
pub struct LedgerPool {
    ledgers: Vec<AllocationLedger>,
}

impl LedgerPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an empty ledger from the pool, or create a fresh one.
    pub fn acquire(&mut self) -> AllocationLedger {
        self.ledgers.pop().unwrap_or_default()
    }

    /// Return a ledger to the pool. The ledger is reset; ledgers whose
    /// entry capacity grew past [`LEDGER_POOL_CEILING`] are dropped.
    pub fn release(&mut self, mut ledger: AllocationLedger) {
        ledger.reset();
        if ledger.capacity() <= LEDGER_POOL_CEILING && self.ledgers.len() < MAX_POOLED {
            self.ledgers.push(ledger);
        }
    }

    /// Number of ledgers currently pooled.
    pub fn pooled(&self) -> usize {
        self.ledgers.len()
    }
}
