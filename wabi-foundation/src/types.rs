//! WIT type tree consumed by the layout calculator and the type compiler.
//!
//! Child links are [`Arc`]s so that a type node has a stable identity: the
//! descriptor cache in `wabi-canonical` keys on node identity, and a
//! [`WitType::Named`] alias wrapping an existing node is a distinct cache
//! key even though it is structurally equal.

use crate::prelude::*;

/// Component model value types as understood by the canonical ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitType {
    /// Boolean type
    Bool,
    /// Signed 8-bit integer
    S8,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    S16,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 32-bit integer
    S32,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 64-bit integer
    S64,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// Unicode scalar value
    Char,
    /// UTF-8 string
    String,
    /// List of values
    List(Arc<WitType>),
    /// Record with ordered named fields
    Record(Vec<(String, Arc<WitType>)>),
    /// Tuple of values
    Tuple(Vec<Arc<WitType>>),
    /// Variant with cases, each with an optional payload
    Variant(Vec<(String, Option<Arc<WitType>>)>),
    /// Enumeration
    Enum(Vec<String>),
    /// Optional value
    Option(Arc<WitType>),
    /// Result type; either side may be absent
    Result {
        /// Payload type of the ok branch, if any.
        ok: Option<Arc<WitType>>,
        /// Payload type of the err branch, if any.
        err: Option<Arc<WitType>>,
    },
    /// Flags (bitset of named booleans)
    Flags(Vec<String>),
    /// Owned resource handle (opaque 32-bit index)
    Own(u32),
    /// Borrowed resource handle (opaque 32-bit index)
    Borrow(u32),
    /// Named alias; layout and flattening look through it, caching does not.
    Named {
        /// Alias name.
        name: String,
        /// Aliased type.
        ty: Arc<WitType>,
    },
}

impl WitType {
    /// Look through any chain of named aliases to the underlying type.
    pub fn unalias(&self) -> &WitType {
        let mut ty = self;
        while let WitType::Named { ty: inner, .. } = ty {
            ty = inner;
        }
        ty
    }

    /// Short name of the type constructor, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::S8 => "s8",
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::U16 => "u16",
            Self::S32 => "s32",
            Self::U32 => "u32",
            Self::S64 => "s64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Tuple(_) => "tuple",
            Self::Variant(_) => "variant",
            Self::Enum(_) => "enum",
            Self::Option(_) => "option",
            Self::Result { .. } => "result",
            Self::Flags(_) => "flags",
            Self::Own(_) => "own",
            Self::Borrow(_) => "borrow",
            Self::Named { .. } => "alias",
        }
    }

    /// True for types that occupy a fixed number of bytes with no
    /// out-of-line storage.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.unalias(),
            Self::Bool
                | Self::S8
                | Self::U8
                | Self::S16
                | Self::U16
                | Self::S32
                | Self::U32
                | Self::S64
                | Self::U64
                | Self::F32
                | Self::F64
                | Self::Char
        )
    }

    /// True for resource handle types.
    pub fn is_handle(&self) -> bool {
        matches!(self.unalias(), Self::Own(_) | Self::Borrow(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unalias_looks_through_chains() {
        let base = Arc::new(WitType::U32);
        let first = Arc::new(WitType::Named {
            name: "meters".to_string(),
            ty: base,
        });
        let second = WitType::Named {
            name: "distance".to_string(),
            ty: first,
        };
        assert_eq!(second.unalias(), &WitType::U32);
        assert_eq!(second.kind_name(), "alias");
        assert!(second.is_primitive());
    }

    #[test]
    fn alias_nodes_are_distinct_identities() {
        let base = Arc::new(WitType::U32);
        let alias = Arc::new(WitType::Named {
            name: "meters".to_string(),
            ty: Arc::clone(&base),
        });
        // The alias shares the inner node but is itself a separate identity.
        assert_ne!(Arc::as_ptr(&base), Arc::as_ptr(&alias));
        match alias.as_ref() {
            WitType::Named { ty, .. } => assert!(Arc::ptr_eq(ty, &base)),
            other => panic!("expected alias, got {other:?}"),
        }
    }
}
