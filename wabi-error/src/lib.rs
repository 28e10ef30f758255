// WABI - wabi-error
// Module: Canonical ABI error taxonomy
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![deny(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! Error handling for the WABI canonical ABI codec.
//!
//! Every fallible operation in the codec reports a structured [`Error`]
//! carrying the pipeline phase it failed in, a machine-discriminable
//! [`ErrorKind`], the navigation path into the value tree, and a human
//! readable message. Callers dispatch on [`Error::kind`]; the path and
//! message exist to make user-facing diagnostics actionable.

extern crate alloc;

mod errors;

pub use errors::{AbiPhase, Error, ErrorKind, Result};
