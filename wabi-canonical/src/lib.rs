// WABI - wabi-canonical
// Module: Canonical ABI lowering and lifting engines
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![deny(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! Canonical ABI codec for the WebAssembly Component Model.
//!
//! This crate converts host values to and from the binary representation a
//! guest instance expects in its linear memory and on its core-function
//! calling boundary:
//!
//! - [`TypeCompiler`] binds a WIT type to a host type description and
//!   produces an immutable, cached [`CompiledType`] descriptor.
//! - [`LowerContext`] drives a descriptor and a host value into linear
//!   memory writes and flattened 64-bit slots, recording every guest
//!   allocation in an [`AllocationLedger`] so a failed call can be rolled
//!   back.
//! - [`LiftContext`] reads flattened slots and linear memory back into
//!   host values, with the same validation rules.
//!
//! # Example
//!
//! ```no_run
//! use wabi_canonical::prelude::*;
//!
//! let compiler = TypeCompiler::new();
//! let wit = Arc::new(WitType::U32);
//! let host = Arc::new(HostType::U32);
//! let compiled = compiler.compile(&wit, &host)?;
//!
//! let mut memory = SimpleMemory::new(64 * 1024);
//! let mut allocator = BumpAllocator::new(1024, 64 * 1024);
//! let mut ledger = AllocationLedger::new();
//!
//! let mut slots = Vec::new();
//! let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
//! cx.lower_to_stack(&compiled, &Value::U32(42), &mut slots)?;
//! assert_eq!(slots, [42]);
//! # Ok::<(), wabi_error::Error>(())
//! ```

extern crate alloc;

// Export our prelude module for consistent imports
pub mod prelude;

pub mod compiled;
pub mod compiler;
pub mod host;
pub mod ledger;
pub mod lift;
pub mod limits;
pub mod lower;
pub mod memory;
#[cfg(feature = "std")]
pub mod pools;

pub use compiled::{CompiledCase, CompiledField, CompiledType};
pub use compiler::TypeCompiler;
pub use host::{HostField, HostType};
pub use ledger::{AllocationLedger, GuestAllocation};
pub use lift::LiftContext;
pub use limits::{
    LEDGER_POOL_CEILING,
    MAX_FLAT_PARAMS,
    MAX_FLAT_RESULTS,
    MAX_LIST_LENGTH,
    MAX_STRING_SIZE,
    SLOT_POOL_CEILING,
};
pub use lower::LowerContext;
#[cfg(feature = "std")]
pub use memory::SimpleMemory;
pub use memory::{BumpAllocator, GuestAllocator, Memory, MemoryDirect};
#[cfg(feature = "std")]
pub use pools::{LedgerPool, SlotPool};
