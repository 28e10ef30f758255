//! Prelude module for wabi-canonical
//!
//! This module provides a unified set of imports for both std and no_std
//! environments, re-exporting the types a codec embedder usually needs in
//! one place.

// Re-export from alloc for no_std environments
#[cfg(not(feature = "std"))]
pub use alloc::{
    boxed::Box,
    collections::BTreeMap as HashMap,
    format,
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};
pub use core::{
    fmt,
    fmt::{Debug, Display},
};
// Re-export from std when the std feature is enabled
#[cfg(feature = "std")]
pub use std::{
    boxed::Box,
    collections::HashMap,
    format,
    string::{String, ToString},
    sync::{Arc, Mutex, RwLock},
    vec,
    vec::Vec,
};

// Re-export from wabi-error
pub use wabi_error::{AbiPhase, Error, ErrorKind, Result};
// Re-export from wabi-foundation
pub use wabi_foundation::{
    FloatBits32,
    FloatBits64,
    MemoryLayout,
    Value,
    WitType,
    abi,
    flat_count,
    layout_of,
};

// Re-export the codec surface
pub use crate::compiled::{CompiledCase, CompiledField, CompiledType};
pub use crate::compiler::TypeCompiler;
pub use crate::host::{HostField, HostType};
pub use crate::ledger::{AllocationLedger, GuestAllocation};
pub use crate::lift::LiftContext;
pub use crate::limits::{MAX_FLAT_PARAMS, MAX_FLAT_RESULTS, MAX_LIST_LENGTH, MAX_STRING_SIZE};
pub use crate::lower::LowerContext;
#[cfg(feature = "std")]
pub use crate::memory::SimpleMemory;
pub use crate::memory::{BumpAllocator, GuestAllocator, Memory, MemoryDirect};
