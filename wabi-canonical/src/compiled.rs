//! Immutable compiled descriptors produced by the type compiler.
//!
//! A descriptor caches everything the engines would otherwise recompute
//! per call: layout, flat slot counts, discriminant widths, payload
//! offsets, and the pairing between WIT fields and host struct fields.
//! Descriptors are shared by reference between the lowering and lifting
//! engines and never mutated after construction.

use crate::limits::{MAX_FLAT_PARAMS, MAX_FLAT_RESULTS};
use crate::prelude::*;

/// Compiled descriptor binding one WIT type to one host type.
#[derive(Debug)]
pub struct CompiledType {
    /// Shape-specific data.
    pub(crate) shape: Shape,
    /// Canonical ABI layout of the WIT type.
    pub layout: MemoryLayout,
    /// Number of 64-bit slots the type occupies when flattened.
    pub flat_count: u32,
}

/// Shape-specific descriptor data.
#[derive(Debug)]
pub(crate) enum Shape {
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
    Char,
    String,
    List {
        element: Arc<CompiledType>,
    },
    Record {
        fields: Vec<CompiledField>,
    },
    Tuple {
        fields: Vec<CompiledField>,
    },
    Option {
        payload: Arc<CompiledType>,
        payload_offset: u32,
    },
    Result {
        ok: Option<Arc<CompiledType>>,
        err: Option<Arc<CompiledType>>,
        payload_offset: u32,
        payload_flat: u32,
    },
    Variant {
        cases: Vec<CompiledCase>,
        disc_size: u32,
        payload_offset: u32,
        payload_flat: u32,
    },
    Enum {
        names: Vec<String>,
        disc_size: u32,
    },
    Flags {
        names: Vec<String>,
        width: u32,
    },
    Handle {
        owned: bool,
    },
}

impl CompiledType {
    /// Short name of the bound WIT type constructor.
    pub fn wit_kind(&self) -> &'static str {
        match &self.shape {
            Shape::Bool => "bool",
            Shape::S8 => "s8",
            Shape::U8 => "u8",
            Shape::S16 => "s16",
            Shape::U16 => "u16",
            Shape::S32 => "s32",
            Shape::U32 => "u32",
            Shape::S64 => "s64",
            Shape::U64 => "u64",
            Shape::F32 => "f32",
            Shape::F64 => "f64",
            Shape::Char => "char",
            Shape::String => "string",
            Shape::List { .. } => "list",
            Shape::Record { .. } => "record",
            Shape::Tuple { .. } => "tuple",
            Shape::Option { .. } => "option",
            Shape::Result { .. } => "result",
            Shape::Variant { .. } => "variant",
            Shape::Enum { .. } => "enum",
            Shape::Flags { .. } => "flags",
            Shape::Handle { owned: true } => "own",
            Shape::Handle { owned: false } => "borrow",
        }
    }

    /// True when the type fits the flat argument budget of a guest call.
    pub fn fits_flat_params(&self) -> bool {
        self.flat_count <= MAX_FLAT_PARAMS
    }

    /// True when the type fits the flat result budget of a guest call.
    pub fn fits_flat_result(&self) -> bool {
        self.flat_count <= MAX_FLAT_RESULTS
    }

    /// Compiled record or tuple fields, empty for other shapes.
    pub fn fields(&self) -> &[CompiledField] {
        match &self.shape {
            Shape::Record { fields } | Shape::Tuple { fields } => fields,
            _ => &[],
        }
    }

    /// Compiled variant cases, empty for other shapes.
    pub fn cases(&self) -> &[CompiledCase] {
        match &self.shape {
            Shape::Variant { cases, .. } => cases,
            _ => &[],
        }
    }

    /// Element descriptor of a list or option payload, if any.
    pub fn element(&self) -> Option<&Arc<CompiledType>> {
        match &self.shape {
            Shape::List { element } => Some(element),
            Shape::Option { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// One compiled record or tuple field.
#[derive(Debug)]
pub struct CompiledField {
    /// WIT field name (the tuple index rendered as text for tuples).
    pub wit_name: String,
    /// Host field name the WIT field was bound to.
    pub host_name: String,
    /// Position of the bound field in the host struct declaration.
    pub host_index: usize,
    /// Byte offset of the field inside the WIT record layout.
    pub wit_offset: u32,
    /// Field descriptor.
    pub ty: Arc<CompiledType>,
}

/// One compiled variant case.
#[derive(Debug)]
pub struct CompiledCase {
    /// Case name.
    pub name: String,
    /// Discriminant value selecting this case.
    pub index: u32,
    /// Payload descriptor for non-unit cases.
    pub payload: Option<Arc<CompiledType>>,
}
