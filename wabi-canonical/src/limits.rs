//! Safety limits for canonical ABI operations.

/// Maximum string length in bytes (16 MiB).
pub const MAX_STRING_SIZE: usize = 16 * 1024 * 1024;

/// Maximum list length in elements.
pub const MAX_LIST_LENGTH: usize = 1024 * 1024;

/// Flat slot budget for guest call arguments; larger parameter lists spill
/// to linear memory (a higher-layer concern).
pub const MAX_FLAT_PARAMS: u32 = 16;

/// Flat slot budget for guest call results; larger results use a
/// caller-supplied return pointer (a higher-layer concern).
pub const MAX_FLAT_RESULTS: u32 = 1;

/// Pooled flat-slot buffers above this capacity are discarded instead of
/// returned to the pool.
pub const SLOT_POOL_CEILING: usize = 1024;

/// Pooled allocation ledgers above this entry capacity are discarded
/// instead of returned to the pool.
pub const LEDGER_POOL_CEILING: usize = 128;
