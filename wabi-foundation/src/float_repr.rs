// WABI - wabi-foundation
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Wrapper types for f32 and f64 ensuring bit-pattern based equality and
//! hashing, plus canonical NaN normalization for the boundary.
//!
//! The canonical ABI requires every NaN crossing the boundary to be
//! replaced by the designated quiet NaN bit pattern; all other values,
//! including signed zeros, pass through bit-for-bit.

use core::hash::{
    Hash,
    Hasher,
};

/// Exponent mask for f32.
const F32_EXP_MASK: u32 = 0x7f80_0000;
/// Fraction mask for f32.
const F32_FRAC_MASK: u32 = 0x007f_ffff;
/// Exponent mask for f64.
const F64_EXP_MASK: u64 = 0x7ff0_0000_0000_0000;
/// Fraction mask for f64.
const F64_FRAC_MASK: u64 = 0x000f_ffff_ffff_ffff;

/// Normalize an f32 bit pattern to the canonical quiet NaN when it encodes
/// a NaN; any other pattern is returned unchanged.
pub const fn canonicalize_f32_bits(bits: u32) -> u32 {
    if bits & F32_EXP_MASK == F32_EXP_MASK && bits & F32_FRAC_MASK != 0 {
        FloatBits32::NAN.0
    } else {
        bits
    }
}

/// Normalize an f64 bit pattern to the canonical quiet NaN when it encodes
/// a NaN; any other pattern is returned unchanged.
pub const fn canonicalize_f64_bits(bits: u64) -> u64 {
    if bits & F64_EXP_MASK == F64_EXP_MASK && bits & F64_FRAC_MASK != 0 {
        FloatBits64::NAN.0
    } else {
        bits
    }
}

/// Wrapper for f32 that implements Hash, `PartialEq`, and Eq based on bit
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct FloatBits32(pub u32);

impl FloatBits32 {
    /// Represents the canonical Not-a-Number (`NaN`) value for f32.
    pub const NAN: Self = FloatBits32(0x7fc0_0000);

    /// Creates a new `FloatBits32` from an `f32` value.
    #[must_use]
    pub fn from_float(val: f32) -> Self {
        Self(val.to_bits())
    }

    /// Returns the `f32` value represented by this `FloatBits32`.
    #[must_use]
    pub const fn value(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Returns the underlying `u32` bits of this `FloatBits32`.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Creates a `FloatBits32` from raw `u32` bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns this value with any NaN replaced by the canonical quiet NaN.
    #[must_use]
    pub const fn canonicalize(self) -> Self {
        Self(canonicalize_f32_bits(self.0))
    }

    /// True when the bit pattern encodes a NaN.
    #[must_use]
    pub const fn is_nan(self) -> bool {
        self.0 & F32_EXP_MASK == F32_EXP_MASK && self.0 & F32_FRAC_MASK != 0
    }
}

impl Hash for FloatBits32 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl From<f32> for FloatBits32 {
    fn from(val: f32) -> Self {
        Self::from_float(val)
    }
}

/// Wrapper for f64 that implements Hash, `PartialEq`, and Eq based on bit
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct FloatBits64(pub u64);

impl FloatBits64 {
    /// Represents the canonical Not-a-Number (`NaN`) value for f64.
    pub const NAN: Self = FloatBits64(0x7ff8_0000_0000_0000);

    /// Creates a new `FloatBits64` from an `f64` value.
    #[must_use]
    pub fn from_float(val: f64) -> Self {
        Self(val.to_bits())
    }

    /// Returns the `f64` value represented by this `FloatBits64`.
    #[must_use]
    pub const fn value(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Returns the underlying `u64` bits of this `FloatBits64`.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Creates a `FloatBits64` from raw `u64` bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns this value with any NaN replaced by the canonical quiet NaN.
    #[must_use]
    pub const fn canonicalize(self) -> Self {
        Self(canonicalize_f64_bits(self.0))
    }

    /// True when the bit pattern encodes a NaN.
    #[must_use]
    pub const fn is_nan(self) -> bool {
        self.0 & F64_EXP_MASK == F64_EXP_MASK && self.0 & F64_FRAC_MASK != 0
    }
}

impl Hash for FloatBits64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl From<f64> for FloatBits64 {
    fn from(val: f64) -> Self {
        Self::from_float(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_nan_patterns() {
        assert_eq!(FloatBits32::NAN.to_bits(), 0x7fc0_0000);
        assert_eq!(FloatBits64::NAN.to_bits(), 0x7ff8_0000_0000_0000);
    }

    #[test]
    fn nan_payloads_collapse_to_canonical() {
        // Arbitrary signalling / payload-carrying NaNs
        assert_eq!(canonicalize_f32_bits(0x7f80_0001), FloatBits32::NAN.0);
        assert_eq!(canonicalize_f32_bits(0xffc0_1234), FloatBits32::NAN.0);
        assert_eq!(canonicalize_f64_bits(0x7ff0_0000_0000_0001), FloatBits64::NAN.0);
        assert_eq!(canonicalize_f64_bits(0xfff8_dead_beef_0000), FloatBits64::NAN.0);
    }

    #[test]
    fn non_nan_patterns_pass_through() {
        // Infinities are not NaNs
        assert_eq!(canonicalize_f32_bits(0x7f80_0000), 0x7f80_0000);
        assert_eq!(canonicalize_f32_bits(0xff80_0000), 0xff80_0000);
        assert_eq!(
            canonicalize_f64_bits(0x7ff0_0000_0000_0000),
            0x7ff0_0000_0000_0000
        );
        // Sign of zero is preserved
        assert_eq!(canonicalize_f32_bits((-0.0f32).to_bits()), 0x8000_0000);
        assert_eq!(canonicalize_f64_bits((-0.0f64).to_bits()), 0x8000_0000_0000_0000);
        // Ordinary values are untouched
        assert_eq!(canonicalize_f32_bits(1.5f32.to_bits()), 1.5f32.to_bits());
        assert_eq!(canonicalize_f64_bits(2.5f64.to_bits()), 2.5f64.to_bits());
    }

    #[test]
    fn wrapper_equality_is_bitwise() {
        assert_eq!(FloatBits32::from_float(0.0), FloatBits32::from_bits(0));
        assert_ne!(
            FloatBits32::from_float(-0.0),
            FloatBits32::from_float(0.0)
        );
        assert_eq!(FloatBits64::NAN, FloatBits64::NAN);
        assert!(FloatBits32::NAN.is_nan());
        assert!(!FloatBits32::from_float(1.0).is_nan());
    }
}
