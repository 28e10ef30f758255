//! Memory layout calculation for the canonical ABI.
//!
//! The calculator is a stateless recursive evaluation over the WIT type
//! tree. Results are cheap to compute; callers that need them repeatedly
//! memoize at the compiled-descriptor level instead.

use crate::abi::{align_up, discriminant_size, flags_byte_width};
use crate::prelude::*;
use crate::types::WitType;

/// Memory layout information for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Size of the type in bytes
    pub size: u32,
    /// Alignment requirement in bytes
    pub align: u32,
}

impl MemoryLayout {
    /// Create a new memory layout.
    pub const fn new(size: u32, align: u32) -> Self {
        Self { size, align }
    }

    /// Size rounded up to the layout's own alignment.
    pub const fn aligned_size(&self) -> u32 {
        align_up(self.size, self.align)
    }
}

/// Byte offset of a discriminated payload: the discriminant occupies the
/// low bytes and the payload starts at the next boundary of its alignment.
pub const fn payload_offset(disc_size: u32, payload_align: u32) -> u32 {
    align_up(disc_size, payload_align)
}

/// Calculate the canonical ABI layout of a WIT type.
///
/// The only rejected input is a `flags` type with more than 64 declared
/// flags.
pub fn layout_of(ty: &WitType) -> Result<MemoryLayout> {
    match ty {
        WitType::Bool | WitType::S8 | WitType::U8 => Ok(MemoryLayout::new(1, 1)),
        WitType::S16 | WitType::U16 => Ok(MemoryLayout::new(2, 2)),
        WitType::S32 | WitType::U32 | WitType::F32 | WitType::Char => {
            Ok(MemoryLayout::new(4, 4))
        },
        WitType::S64 | WitType::U64 | WitType::F64 => Ok(MemoryLayout::new(8, 8)),
        // Pointer + length pair
        WitType::String | WitType::List(_) => Ok(MemoryLayout::new(8, 4)),
        WitType::Record(fields) => {
            let mut offset = 0;
            let mut max_align = 1;
            for (_, field_ty) in fields {
                let field = layout_of(field_ty)?;
                offset = align_up(offset, field.align);
                offset += field.size;
                max_align = max_align.max(field.align);
            }
            Ok(MemoryLayout::new(align_up(offset, max_align), max_align))
        },
        WitType::Tuple(types) => {
            let mut offset = 0;
            let mut max_align = 1;
            for elem_ty in types {
                let elem = layout_of(elem_ty)?;
                offset = align_up(offset, elem.align);
                offset += elem.size;
                max_align = max_align.max(elem.align);
            }
            Ok(MemoryLayout::new(align_up(offset, max_align), max_align))
        },
        WitType::Option(inner) => {
            let inner = layout_of(inner)?;
            let align = inner.align.max(1);
            Ok(MemoryLayout::new(payload_offset(1, inner.align) + inner.size, align))
        },
        WitType::Result { ok, err } => {
            let mut payload = MemoryLayout::new(0, 1);
            if let Some(ty) = ok {
                let l = layout_of(ty)?;
                payload.size = payload.size.max(l.size);
                payload.align = payload.align.max(l.align);
            }
            if let Some(ty) = err {
                let l = layout_of(ty)?;
                payload.size = payload.size.max(l.size);
                payload.align = payload.align.max(l.align);
            }
            Ok(discriminated_layout(1, payload))
        },
        WitType::Variant(cases) => {
            let disc = discriminant_size(cases.len());
            let mut payload = MemoryLayout::new(0, 1);
            for (_, case_ty) in cases {
                if let Some(ty) = case_ty {
                    let l = layout_of(ty)?;
                    payload.size = payload.size.max(l.size);
                    payload.align = payload.align.max(l.align);
                }
            }
            Ok(discriminated_layout(disc, payload))
        },
        WitType::Enum(cases) => {
            let disc = discriminant_size(cases.len());
            Ok(MemoryLayout::new(disc, disc))
        },
        WitType::Flags(names) => {
            let width = flags_byte_width(names.len()).ok_or_else(|| {
                Error::compile(
                    ErrorKind::Unsupported,
                    format!("flags with {} labels exceed the 64-flag limit", names.len()),
                )
            })?;
            Ok(MemoryLayout::new(width, width.max(1)))
        },
        WitType::Own(_) | WitType::Borrow(_) => Ok(MemoryLayout::new(4, 4)),
        WitType::Named { ty, .. } => layout_of(ty),
    }
}

/// Layout of a discriminant followed by an aligned payload area, rounded
/// to the combined alignment.
fn discriminated_layout(disc_size: u32, payload: MemoryLayout) -> MemoryLayout {
    let align = disc_size.max(payload.align);
    let size = payload_offset(disc_size, payload.align) + payload.size;
    MemoryLayout::new(align_up(size, align), align)
}

/// Byte offsets of each record field, in declaration order.
pub fn record_field_offsets(fields: &[(String, Arc<WitType>)]) -> Result<Vec<u32>> {
    let mut offsets = Vec::with_capacity(fields.len());
    let mut offset = 0;
    for (_, field_ty) in fields {
        let layout = layout_of(field_ty)?;
        offset = align_up(offset, layout.align);
        offsets.push(offset);
        offset += layout.size;
    }
    Ok(offsets)
}

/// Byte offsets of each tuple element, in order.
pub fn tuple_field_offsets(types: &[Arc<WitType>]) -> Result<Vec<u32>> {
    let mut offsets = Vec::with_capacity(types.len());
    let mut offset = 0;
    for elem_ty in types {
        let layout = layout_of(elem_ty)?;
        offset = align_up(offset, layout.align);
        offsets.push(offset);
        offset += layout.size;
    }
    Ok(offsets)
}

/// Number of 64-bit slots a type occupies in the flattened form.
pub fn flat_count(ty: &WitType) -> u32 {
    match ty {
        WitType::Bool
        | WitType::S8
        | WitType::U8
        | WitType::S16
        | WitType::U16
        | WitType::S32
        | WitType::U32
        | WitType::S64
        | WitType::U64
        | WitType::F32
        | WitType::F64
        | WitType::Char
        | WitType::Enum(_)
        | WitType::Own(_)
        | WitType::Borrow(_) => 1,
        // Pointer + length
        WitType::String | WitType::List(_) => 2,
        WitType::Record(fields) => fields.iter().map(|(_, ty)| flat_count(ty)).sum(),
        WitType::Tuple(types) => types.iter().map(|ty| flat_count(ty)).sum(),
        WitType::Option(inner) => 1 + flat_count(inner),
        WitType::Result { ok, err } => {
            let ok_count = ok.as_ref().map_or(0, |ty| flat_count(ty));
            let err_count = err.as_ref().map_or(0, |ty| flat_count(ty));
            1 + ok_count.max(err_count)
        },
        WitType::Variant(cases) => {
            let payload = cases
                .iter()
                .map(|(_, ty)| ty.as_ref().map_or(0, |ty| flat_count(ty)))
                .max()
                .unwrap_or(0);
            1 + payload
        },
        // Zero declared flags occupy zero slots; anything up to 64 bits
        // fits one slot.
        WitType::Flags(names) => u32::from(!names.is_empty()),
        WitType::Named { ty, .. } => flat_count(ty),
    }
}
