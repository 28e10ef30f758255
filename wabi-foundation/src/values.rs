//! Dynamic value representation crossing the codec API.
//!
//! Host programs without generated bindings build [`Value`] trees and hand
//! them to the lowering engine; the lifting engine produces them back.
//! Floats travel as bit-pattern wrappers so values are `Eq` and NaN
//! comparisons in tests are exact.

use crate::float_repr::{FloatBits32, FloatBits64};
use crate::prelude::*;

/// Component model values as understood by the canonical ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Signed 8-bit integer
    S8(i8),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 16-bit integer
    S16(i16),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 32-bit integer
    S32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    S64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit floating point, stored as bits
    F32(FloatBits32),
    /// 64-bit floating point, stored as bits
    F64(FloatBits64),
    /// Unicode scalar value
    Char(char),
    /// UTF-8 string
    String(String),
    /// List of values
    List(Vec<Value>),
    /// Record with named fields in declaration order
    Record(Vec<(String, Value)>),
    /// Tuple of values
    Tuple(Vec<Value>),
    /// Variant with case name and optional payload
    Variant(String, Option<Box<Value>>),
    /// Enumeration case name
    Enum(String),
    /// Optional value
    Option(Option<Box<Value>>),
    /// Result value; the payload slot is `None` for unit cases, which is
    /// still distinguishable from the other branch being active.
    Result(core::result::Result<Option<Box<Value>>, Option<Box<Value>>>),
    /// Flags given as the set of active flag names
    Flags(Vec<String>),
    /// Owned resource handle
    Own(u32),
    /// Borrowed resource handle
    Borrow(u32),
}

impl Value {
    /// Convenience constructor for `F32` from a float.
    pub fn f32(val: f32) -> Self {
        Self::F32(FloatBits32::from_float(val))
    }

    /// Convenience constructor for `F64` from a float.
    pub fn f64(val: f64) -> Self {
        Self::F64(FloatBits64::from_float(val))
    }

    /// Short name of the value constructor, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::S8(_) => "s8",
            Self::U8(_) => "u8",
            Self::S16(_) => "s16",
            Self::U16(_) => "u16",
            Self::S32(_) => "s32",
            Self::U32(_) => "u32",
            Self::S64(_) => "s64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Tuple(_) => "tuple",
            Self::Variant(..) => "variant",
            Self::Enum(_) => "enum",
            Self::Option(_) => "option",
            Self::Result(_) => "result",
            Self::Flags(_) => "flags",
            Self::Own(_) => "own",
            Self::Borrow(_) => "borrow",
        }
    }

    /// Extract a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a list slice.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Extract record fields.
    pub fn as_record(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Extract a resource handle from either handle kind or a plain `u32`.
    pub fn as_handle(&self) -> Option<u32> {
        match self {
            Self::Own(h) | Self::Borrow(h) | Self::U32(h) => Some(*h),
            _ => None,
        }
    }

    /// Extract an unsigned integer of any width, widened to `u64`.
    ///
    /// Used for enum discriminants given as raw integers and for flags
    /// given as raw bit sets.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_values_compare_bitwise() {
        assert_eq!(Value::f32(1.5), Value::f32(1.5));
        assert_ne!(Value::f32(0.0), Value::f32(-0.0));
        assert_eq!(
            Value::F64(FloatBits64::NAN),
            Value::F64(FloatBits64::NAN)
        );
    }

    #[test]
    fn unit_result_payload_is_distinguishable() {
        let ok_unit = Value::Result(Ok(None));
        let err_unit = Value::Result(Err(None));
        assert_ne!(ok_unit, err_unit);
        assert_ne!(
            ok_unit,
            Value::Result(Ok(Some(Box::new(Value::U32(0)))))
        );
    }

    #[test]
    fn unsigned_widening() {
        assert_eq!(Value::U8(7).as_unsigned(), Some(7));
        assert_eq!(Value::U64(u64::MAX).as_unsigned(), Some(u64::MAX));
        assert_eq!(Value::S8(7).as_unsigned(), None);
        assert_eq!(Value::Own(9).as_handle(), Some(9));
        assert_eq!(Value::U32(9).as_handle(), Some(9));
    }
}
