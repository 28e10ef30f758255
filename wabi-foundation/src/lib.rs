// WABI - wabi-foundation
// Module: WIT type tree, dynamic values and layout calculation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![deny(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! Foundation types for the WABI canonical ABI codec.
//!
//! This crate holds the pieces every other WABI crate builds on:
//!
//! - [`abi`]: bit-level helpers (alignment rounding, checked multiplication,
//!   Unicode scalar validation, discriminant widths).
//! - [`float_repr`]: bit-pattern float wrappers and canonical NaN handling.
//! - [`types`]: the WIT type tree consumed by the layout calculator and the
//!   type compiler.
//! - [`values`]: the dynamic value representation crossing the codec API.
//! - [`layout`]: the canonical ABI layout calculator (sizes, alignments,
//!   field offsets, flat slot counts).

extern crate alloc;

// Export our prelude module for consistent imports
pub mod prelude;

pub mod abi;
pub mod float_repr;
pub mod layout;
pub mod types;
pub mod values;

pub use abi::{align_up, checked_mul_u32, discriminant_size, flags_byte_width, validate_char};
pub use float_repr::{
    FloatBits32,
    FloatBits64,
    canonicalize_f32_bits,
    canonicalize_f64_bits,
};
pub use layout::{
    MemoryLayout,
    flat_count,
    layout_of,
    payload_offset,
    record_field_offsets,
    tuple_field_offsets,
};
pub use types::WitType;
pub use values::Value;
