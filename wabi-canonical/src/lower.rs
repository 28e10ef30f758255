//! Lowering engine: host values into linear memory and flat slots.
//!
//! A [`LowerContext`] borrows the three per-call capabilities — memory,
//! allocator and ledger — for the duration of one guest call. Writes are
//! sequenced in depth-first order of the WIT type tree, so an observer
//! reading the final flat slots and chasing the addresses they contain
//! sees a fully initialized structure.
//!
//! On any error the engine returns immediately; the caller is expected to
//! run `ledger.free_all(allocator)` so every allocation made during the
//! failed call is released in LIFO order. After a successful call the
//! guest owns the allocations and `ledger.reset()` applies instead.

use wabi_foundation::abi::{checked_mul_u32, validate_char};

use crate::compiled::{CompiledField, CompiledType, Shape};
use crate::ledger::AllocationLedger;
use crate::limits::{MAX_LIST_LENGTH, MAX_STRING_SIZE};
use crate::memory::{GuestAllocator, Memory};
use crate::prelude::*;

/// One lowering call borrowing the guest's memory, allocator and an
/// allocation ledger.
#[derive(Debug)]
pub struct LowerContext<'a, M: Memory, A: GuestAllocator> {
    memory: &'a mut M,
    allocator: &'a mut A,
    ledger: &'a mut AllocationLedger,
}

impl<'a, M: Memory, A: GuestAllocator> LowerContext<'a, M, A> {
    /// Borrow the three capabilities for one call.
    pub fn new(
        memory: &'a mut M,
        allocator: &'a mut A,
        ledger: &'a mut AllocationLedger,
    ) -> Self {
        Self {
            memory,
            allocator,
            ledger,
        }
    }

    /// Lower `value` into flat 64-bit slots, appending to `slots`.
    ///
    /// Strings and lists always spill their contents to linear memory and
    /// contribute their `[addr, len]` pair. Returns the number of slots
    /// written, which always equals the descriptor's flat count.
    pub fn lower_to_stack(
        &mut self,
        ty: &CompiledType,
        value: &Value,
        slots: &mut Vec<u64>,
    ) -> Result<usize> {
        let start = slots.len();
        self.flatten(ty, value, slots)?;
        let written = slots.len() - start;
        #[cfg(feature = "std")]
        log::trace!("lowered {} into {written} flat slots", ty.wit_kind());
        Ok(written)
    }

    /// Lower `value` into linear memory at `addr`, which must be aligned
    /// to the descriptor's alignment.
    pub fn store(&mut self, ty: &CompiledType, value: &Value, addr: u32) -> Result<()> {
        match &ty.shape {
            Shape::Bool => self.memory.write_u8(addr, u8::from(expect_bool(value)?)),
            Shape::S8 => match value {
                Value::S8(v) => self.memory.write_u8(addr, *v as u8),
                other => Err(mismatch_value("s8", other)),
            },
            Shape::U8 => match value {
                Value::U8(v) => self.memory.write_u8(addr, *v),
                other => Err(mismatch_value("u8", other)),
            },
            Shape::S16 => match value {
                Value::S16(v) => self.memory.write_u16_le(addr, *v as u16),
                other => Err(mismatch_value("s16", other)),
            },
            Shape::U16 => match value {
                Value::U16(v) => self.memory.write_u16_le(addr, *v),
                other => Err(mismatch_value("u16", other)),
            },
            Shape::S32 => match value {
                Value::S32(v) => self.memory.write_u32_le(addr, *v as u32),
                other => Err(mismatch_value("s32", other)),
            },
            Shape::U32 => match value {
                Value::U32(v) => self.memory.write_u32_le(addr, *v),
                other => Err(mismatch_value("u32", other)),
            },
            Shape::S64 => match value {
                Value::S64(v) => self.memory.write_u64_le(addr, *v as u64),
                other => Err(mismatch_value("s64", other)),
            },
            Shape::U64 => match value {
                Value::U64(v) => self.memory.write_u64_le(addr, *v),
                other => Err(mismatch_value("u64", other)),
            },
            Shape::F32 => match value {
                Value::F32(bits) => {
                    self.memory.write_u32_le(addr, bits.canonicalize().to_bits())
                },
                other => Err(mismatch_value("f32", other)),
            },
            Shape::F64 => match value {
                Value::F64(bits) => {
                    self.memory.write_u64_le(addr, bits.canonicalize().to_bits())
                },
                other => Err(mismatch_value("f64", other)),
            },
            Shape::Char => {
                let scalar = char_scalar(value)?;
                self.memory.write_u32_le(addr, scalar)
            },
            Shape::String => {
                let s = value.as_str().ok_or_else(|| mismatch_value("string", value))?;
                let (ptr, len) = self.lower_string(s)?;
                self.memory.write_u32_le(addr, ptr)?;
                self.memory.write_u32_le(addr + 4, len)
            },
            Shape::List { element } => {
                let items = value.as_list().ok_or_else(|| mismatch_value("list", value))?;
                let (ptr, len) = self.lower_list(element, items)?;
                self.memory.write_u32_le(addr, ptr)?;
                self.memory.write_u32_le(addr + 4, len)
            },
            Shape::Record { fields } => {
                let entries = value
                    .as_record()
                    .ok_or_else(|| mismatch_value("record", value))?;
                for field in fields {
                    let item = record_field(entries, field)?;
                    self.store(&field.ty, item, addr + field.wit_offset)
                        .map_err(|e| e.in_field(&field.wit_name))?;
                }
                Ok(())
            },
            Shape::Tuple { fields } => {
                let items = expect_tuple(value, fields.len())?;
                for (i, (field, item)) in fields.iter().zip(items).enumerate() {
                    self.store(&field.ty, item, addr + field.wit_offset)
                        .map_err(|e| e.at_index(i))?;
                }
                Ok(())
            },
            Shape::Option {
                payload,
                payload_offset,
            } => {
                let Value::Option(opt) = value else {
                    return Err(mismatch_value("option", value));
                };
                match opt {
                    None => self.memory.write_u8(addr, 0),
                    Some(inner) => {
                        self.memory.write_u8(addr, 1)?;
                        self.store(payload, inner, addr + payload_offset)
                            .map_err(|e| e.push_path("some"))
                    },
                }
            },
            Shape::Result {
                ok,
                err,
                payload_offset,
                ..
            } => {
                let Value::Result(res) = value else {
                    return Err(mismatch_value("result", value));
                };
                match res {
                    Ok(payload) => {
                        self.memory.write_u8(addr, 0)?;
                        self.store_case_payload(
                            ok.as_deref(),
                            payload.as_deref(),
                            addr + payload_offset,
                            "ok",
                        )
                    },
                    Err(payload) => {
                        self.memory.write_u8(addr, 1)?;
                        self.store_case_payload(
                            err.as_deref(),
                            payload.as_deref(),
                            addr + payload_offset,
                            "err",
                        )
                    },
                }
            },
            Shape::Variant {
                cases,
                disc_size,
                payload_offset,
                ..
            } => {
                let Value::Variant(name, payload) = value else {
                    return Err(mismatch_value("variant", value));
                };
                let case = find_case(cases, name)?;
                self.write_disc(addr, *disc_size, case.index)?;
                self.store_case_payload(
                    case.payload.as_deref(),
                    payload.as_deref(),
                    addr + payload_offset,
                    &case.name,
                )
            },
            Shape::Enum { names, disc_size } => {
                let disc = enum_discriminant(names, value)?;
                self.write_disc(addr, *disc_size, disc as u32)
            },
            Shape::Flags { names, width } => {
                let bits = flags_bits(names, value)?;
                self.write_flags(addr, *width, bits)
            },
            Shape::Handle { .. } => {
                let handle = value.as_handle().ok_or_else(|| mismatch_value("handle", value))?;
                self.memory.write_u32_le(addr, handle)
            },
        }
    }

    fn flatten(&mut self, ty: &CompiledType, value: &Value, slots: &mut Vec<u64>) -> Result<()> {
        match &ty.shape {
            Shape::Bool => slots.push(u64::from(expect_bool(value)?)),
            Shape::S8 => match value {
                Value::S8(v) => slots.push(u64::from(*v as u8)),
                other => return Err(mismatch_value("s8", other)),
            },
            Shape::U8 => match value {
                Value::U8(v) => slots.push(u64::from(*v)),
                other => return Err(mismatch_value("u8", other)),
            },
            Shape::S16 => match value {
                Value::S16(v) => slots.push(u64::from(*v as u16)),
                other => return Err(mismatch_value("s16", other)),
            },
            Shape::U16 => match value {
                Value::U16(v) => slots.push(u64::from(*v)),
                other => return Err(mismatch_value("u16", other)),
            },
            Shape::S32 => match value {
                // Two's complement of the 32-bit value, zero-extended.
                Value::S32(v) => slots.push(u64::from(*v as u32)),
                other => return Err(mismatch_value("s32", other)),
            },
            Shape::U32 => match value {
                Value::U32(v) => slots.push(u64::from(*v)),
                other => return Err(mismatch_value("u32", other)),
            },
            Shape::S64 => match value {
                Value::S64(v) => slots.push(*v as u64),
                other => return Err(mismatch_value("s64", other)),
            },
            Shape::U64 => match value {
                Value::U64(v) => slots.push(*v),
                other => return Err(mismatch_value("u64", other)),
            },
            Shape::F32 => match value {
                Value::F32(bits) => slots.push(u64::from(bits.canonicalize().to_bits())),
                other => return Err(mismatch_value("f32", other)),
            },
            Shape::F64 => match value {
                Value::F64(bits) => slots.push(bits.canonicalize().to_bits()),
                other => return Err(mismatch_value("f64", other)),
            },
            Shape::Char => slots.push(u64::from(char_scalar(value)?)),
            Shape::String => {
                let s = value.as_str().ok_or_else(|| mismatch_value("string", value))?;
                let (ptr, len) = self.lower_string(s)?;
                slots.push(u64::from(ptr));
                slots.push(u64::from(len));
            },
            Shape::List { element } => {
                let items = value.as_list().ok_or_else(|| mismatch_value("list", value))?;
                let (ptr, len) = self.lower_list(element, items)?;
                slots.push(u64::from(ptr));
                slots.push(u64::from(len));
            },
            Shape::Record { fields } => {
                let entries = value
                    .as_record()
                    .ok_or_else(|| mismatch_value("record", value))?;
                for field in fields {
                    let item = record_field(entries, field)?;
                    self.flatten(&field.ty, item, slots)
                        .map_err(|e| e.in_field(&field.wit_name))?;
                }
            },
            Shape::Tuple { fields } => {
                let items = expect_tuple(value, fields.len())?;
                for (i, (field, item)) in fields.iter().zip(items).enumerate() {
                    self.flatten(&field.ty, item, slots).map_err(|e| e.at_index(i))?;
                }
            },
            Shape::Option { payload, .. } => {
                let Value::Option(opt) = value else {
                    return Err(mismatch_value("option", value));
                };
                let base = slots.len();
                match opt {
                    None => slots.push(0),
                    Some(inner) => {
                        slots.push(1);
                        self.flatten(payload, inner, slots)
                            .map_err(|e| e.push_path("some"))?;
                    },
                }
                pad_zero(slots, base + 1 + payload.flat_count as usize);
            },
            Shape::Result {
                ok,
                err,
                payload_flat,
                ..
            } => {
                let Value::Result(res) = value else {
                    return Err(mismatch_value("result", value));
                };
                let base = slots.len();
                match res {
                    Ok(payload) => {
                        slots.push(0);
                        self.flatten_case_payload(ok.as_deref(), payload.as_deref(), "ok", slots)?;
                    },
                    Err(payload) => {
                        slots.push(1);
                        self.flatten_case_payload(
                            err.as_deref(),
                            payload.as_deref(),
                            "err",
                            slots,
                        )?;
                    },
                }
                // The payload area is padded to the max case width
                // regardless of which case is active.
                pad_zero(slots, base + 1 + *payload_flat as usize);
            },
            Shape::Variant {
                cases,
                payload_flat,
                ..
            } => {
                let Value::Variant(name, payload) = value else {
                    return Err(mismatch_value("variant", value));
                };
                let case = find_case(cases, name)?;
                let base = slots.len();
                slots.push(u64::from(case.index));
                self.flatten_case_payload(
                    case.payload.as_deref(),
                    payload.as_deref(),
                    &case.name,
                    slots,
                )?;
                pad_zero(slots, base + 1 + *payload_flat as usize);
            },
            Shape::Enum { names, .. } => slots.push(enum_discriminant(names, value)?),
            Shape::Flags { names, width } => {
                // Zero declared flags occupy zero slots.
                if *width > 0 {
                    slots.push(flags_bits(names, value)?);
                }
            },
            Shape::Handle { .. } => {
                let handle = value.as_handle().ok_or_else(|| mismatch_value("handle", value))?;
                slots.push(u64::from(handle));
            },
        }
        Ok(())
    }

    fn flatten_case_payload(
        &mut self,
        compiled: Option<&CompiledType>,
        payload: Option<&Value>,
        label: &str,
        slots: &mut Vec<u64>,
    ) -> Result<()> {
        match (compiled, payload) {
            (Some(ty), Some(value)) => {
                self.flatten(ty, value, slots).map_err(|e| e.in_field(label))
            },
            // An elided payload leaves its slots zero-filled.
            (Some(_), None) | (None, None) => Ok(()),
            (None, Some(_)) => Err(Error::encode(
                ErrorKind::TypeMismatch,
                format!("case `{label}` does not take a payload"),
            )),
        }
    }

    fn store_case_payload(
        &mut self,
        compiled: Option<&CompiledType>,
        payload: Option<&Value>,
        addr: u32,
        label: &str,
    ) -> Result<()> {
        match (compiled, payload) {
            (Some(ty), Some(value)) => {
                self.store(ty, value, addr).map_err(|e| e.in_field(label))
            },
            // An elided payload leaves the payload bytes untouched.
            (Some(_), None) | (None, None) => Ok(()),
            (None, Some(_)) => Err(Error::encode(
                ErrorKind::TypeMismatch,
                format!("case `{label}` does not take a payload"),
            )),
        }
    }

    /// Spill a string to guest memory, returning its `[addr, len]` pair.
    /// Empty strings are encoded as `[0, 0]` with no allocation.
    fn lower_string(&mut self, s: &str) -> Result<(u32, u32)> {
        if s.len() > MAX_STRING_SIZE {
            return Err(Error::encode(
                ErrorKind::Overflow,
                format!(
                    "string of {} bytes exceeds the {MAX_STRING_SIZE} byte limit",
                    s.len()
                ),
            ));
        }
        if s.is_empty() {
            return Ok((0, 0));
        }
        let len = s.len() as u32;
        let ptr = self.allocator.alloc(len, 1)?;
        // Recorded before the content lands so a failed write still rolls
        // the allocation back.
        self.ledger.add(ptr, len, 1);
        self.memory.write_bytes(ptr, s.as_bytes())?;
        Ok((ptr, len))
    }

    /// Spill a list to guest memory, returning its `[addr, len]` pair.
    fn lower_list(&mut self, element: &CompiledType, items: &[Value]) -> Result<(u32, u32)> {
        if items.len() > MAX_LIST_LENGTH {
            return Err(Error::encode(
                ErrorKind::Overflow,
                format!(
                    "list of {} elements exceeds the {MAX_LIST_LENGTH} element limit",
                    items.len()
                ),
            ));
        }
        if items.is_empty() {
            return Ok((0, 0));
        }
        let stride = element.layout.size;
        let total = checked_mul_u32(items.len() as u32, stride).ok_or_else(|| {
            Error::encode(
                ErrorKind::Overflow,
                "list byte size overflows the 32-bit address range",
            )
        })?;
        if total == 0 {
            // Zero-sized elements need no storage; only the length matters.
            return Ok((0, items.len() as u32));
        }
        let align = element.layout.align;
        let ptr = self.allocator.alloc(total, align)?;
        self.ledger.add(ptr, total, align);
        if let Some(bytes) = bulk_encode(element, items)? {
            self.memory.write_bytes(ptr, &bytes)?;
        } else {
            for (i, item) in items.iter().enumerate() {
                self.store(element, item, ptr + i as u32 * stride)
                    .map_err(|e| e.at_index(i))?;
            }
        }
        Ok((ptr, items.len() as u32))
    }

    fn write_disc(&mut self, addr: u32, disc_size: u32, value: u32) -> Result<()> {
        match disc_size {
            1 => self.memory.write_u8(addr, value as u8),
            2 => self.memory.write_u16_le(addr, value as u16),
            _ => self.memory.write_u32_le(addr, value),
        }
    }

    fn write_flags(&mut self, addr: u32, width: u32, bits: u64) -> Result<()> {
        match width {
            0 => Ok(()),
            1 => self.memory.write_u8(addr, bits as u8),
            2 => self.memory.write_u16_le(addr, bits as u16),
            4 => self.memory.write_u32_le(addr, bits as u32),
            _ => self.memory.write_u64_le(addr, bits),
        }
    }
}

fn pad_zero(slots: &mut Vec<u64>, target_len: usize) {
    while slots.len() < target_len {
        slots.push(0);
    }
}

fn mismatch_value(expected: &str, value: &Value) -> Error {
    Error::encode(
        ErrorKind::TypeMismatch,
        format!("cannot lower {} value as {expected}", value.kind_name()),
    )
}

fn expect_bool(value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| mismatch_value("bool", value))
}

/// Scalar of a char value; a raw `u32` host scalar is validated against
/// the Unicode scalar range.
fn char_scalar(value: &Value) -> Result<u32> {
    match value {
        Value::Char(c) => Ok(*c as u32),
        Value::U32(scalar) => {
            if validate_char(*scalar) {
                Ok(*scalar)
            } else {
                Err(Error::encode(
                    ErrorKind::InvalidData,
                    format!("{scalar:#x} is not a Unicode scalar value"),
                ))
            }
        },
        other => Err(mismatch_value("char", other)),
    }
}

fn expect_tuple(value: &Value, arity: usize) -> Result<&[Value]> {
    let Value::Tuple(items) = value else {
        return Err(mismatch_value("tuple", value));
    };
    if items.len() != arity {
        return Err(Error::encode(
            ErrorKind::TypeMismatch,
            format!("tuple value of arity {} does not match arity {arity}", items.len()),
        ));
    }
    Ok(items)
}

/// Find a record field in a dynamic value, trying the compiled host index
/// first and falling back to a name scan.
fn record_field<'v>(
    entries: &'v [(String, Value)],
    field: &CompiledField,
) -> Result<&'v Value> {
    if let Some((name, value)) = entries.get(field.host_index) {
        if *name == field.host_name || *name == field.wit_name {
            return Ok(value);
        }
    }
    entries
        .iter()
        .find(|(name, _)| {
            *name == field.host_name
                || *name == field.wit_name
                || name.eq_ignore_ascii_case(&field.wit_name)
        })
        .map(|(_, value)| value)
        .ok_or_else(|| {
            Error::encode(
                ErrorKind::FieldMissing,
                format!("record value lacks field `{}`", field.wit_name),
            )
        })
}

fn find_case<'c>(
    cases: &'c [crate::compiled::CompiledCase],
    name: &str,
) -> Result<&'c crate::compiled::CompiledCase> {
    cases.iter().find(|case| case.name == name).ok_or_else(|| {
        Error::encode(
            ErrorKind::InvalidDiscriminant,
            format!("unknown case `{name}`"),
        )
    })
}

fn enum_discriminant(names: &[String], value: &Value) -> Result<u64> {
    match value {
        Value::Enum(name) => names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| index as u64)
            .ok_or_else(|| {
                Error::encode(
                    ErrorKind::InvalidDiscriminant,
                    format!("unknown enum case `{name}`"),
                )
            }),
        other => {
            let disc = other.as_unsigned().ok_or_else(|| mismatch_value("enum", other))?;
            if disc < names.len() as u64 {
                Ok(disc)
            } else {
                Err(Error::encode(
                    ErrorKind::InvalidDiscriminant,
                    format!("discriminant {disc} out of range for {} cases", names.len()),
                ))
            }
        },
    }
}

fn flags_bits(names: &[String], value: &Value) -> Result<u64> {
    match value {
        Value::Flags(active) => {
            let mut bits = 0u64;
            for flag in active {
                let index = names
                    .iter()
                    .position(|candidate| candidate == flag)
                    .ok_or_else(|| {
                        Error::encode(
                            ErrorKind::InvalidData,
                            format!("unknown flag `{flag}`"),
                        )
                    })?;
                bits |= 1 << index;
            }
            Ok(bits)
        },
        // Raw integers pass through with no check on undeclared bits.
        other => other.as_unsigned().ok_or_else(|| mismatch_value("flags", other)),
    }
}

/// Contiguous little-endian block encoding for primitive element lists.
/// Returns `None` when the element kind has no bulk path.
fn bulk_encode(element: &CompiledType, items: &[Value]) -> Result<Option<Vec<u8>>> {
    let mut bytes = Vec::with_capacity(items.len() * element.layout.size as usize);
    match &element.shape {
        Shape::U8 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::U8(v) => bytes.push(*v),
                    other => return Err(mismatch_value("u8", other).at_index(i)),
                }
            }
        },
        Shape::S8 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::S8(v) => bytes.push(*v as u8),
                    other => return Err(mismatch_value("s8", other).at_index(i)),
                }
            }
        },
        Shape::U16 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::U16(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("u16", other).at_index(i)),
                }
            }
        },
        Shape::S16 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::S16(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("s16", other).at_index(i)),
                }
            }
        },
        Shape::U32 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::U32(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("u32", other).at_index(i)),
                }
            }
        },
        Shape::S32 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::S32(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("s32", other).at_index(i)),
                }
            }
        },
        Shape::U64 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::U64(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("u64", other).at_index(i)),
                }
            }
        },
        Shape::S64 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::S64(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                    other => return Err(mismatch_value("s64", other).at_index(i)),
                }
            }
        },
        // Floats keep per-element NaN canonicalization on the bulk path.
        Shape::F32 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::F32(bits) => {
                        bytes.extend_from_slice(&bits.canonicalize().to_bits().to_le_bytes())
                    },
                    other => return Err(mismatch_value("f32", other).at_index(i)),
                }
            }
        },
        Shape::F64 => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::F64(bits) => {
                        bytes.extend_from_slice(&bits.canonicalize().to_bits().to_le_bytes())
                    },
                    other => return Err(mismatch_value("f64", other).at_index(i)),
                }
            }
        },
        _ => return Ok(None),
    }
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeCompiler;
    use crate::host::HostType;
    use crate::memory::{BumpAllocator, SimpleMemory};

    fn compile(wit: WitType, host: HostType) -> Arc<CompiledType> {
        TypeCompiler::new()
            .compile(&Arc::new(wit), &Arc::new(host))
            .unwrap()
    }

    fn harness() -> (SimpleMemory, BumpAllocator, AllocationLedger) {
        (
            SimpleMemory::new(64 * 1024),
            BumpAllocator::new(1024, 64 * 1024),
            AllocationLedger::new(),
        )
    }

    #[test]
    fn signed_values_flatten_as_twos_complement() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let mut slots = Vec::new();

        let s32 = compile(WitType::S32, HostType::S32);
        cx.lower_to_stack(&s32, &Value::S32(-1), &mut slots).unwrap();
        assert_eq!(slots, [0xFFFF_FFFF]);

        slots.clear();
        let s8 = compile(WitType::S8, HostType::S8);
        cx.lower_to_stack(&s8, &Value::S8(-2), &mut slots).unwrap();
        assert_eq!(slots, [0xFE]);
    }

    #[test]
    fn nan_is_canonicalized_on_the_way_out() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let mut slots = Vec::new();

        let f32_ty = compile(WitType::F32, HostType::F32);
        let payload_nan = Value::F32(FloatBits32::from_bits(0xffc0_1234));
        cx.lower_to_stack(&f32_ty, &payload_nan, &mut slots).unwrap();
        assert_eq!(slots, [u64::from(FloatBits32::NAN.to_bits())]);

        // Negative zero keeps its sign
        slots.clear();
        cx.lower_to_stack(&f32_ty, &Value::f32(-0.0), &mut slots).unwrap();
        assert_eq!(slots, [0x8000_0000]);
    }

    #[test]
    fn invalid_scalar_through_u32_host_fails() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let char_ty = compile(WitType::Char, HostType::U32);
        let mut slots = Vec::new();
        for scalar in [0xD800u32, 0x11_0000] {
            let err = cx
                .lower_to_stack(&char_ty, &Value::U32(scalar), &mut slots)
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidData);
        }
    }

    #[test]
    fn option_flat_form_is_padded() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let ty = compile(
            WitType::Option(Arc::new(WitType::U32)),
            HostType::Nullable(Box::new(HostType::U32)),
        );
        let mut slots = Vec::new();
        let n = cx.lower_to_stack(&ty, &Value::Option(None), &mut slots).unwrap();
        assert_eq!(n, 2);
        assert_eq!(slots, [0, 0]);

        slots.clear();
        cx.lower_to_stack(
            &ty,
            &Value::Option(Some(Box::new(Value::U32(42)))),
            &mut slots,
        )
        .unwrap();
        assert_eq!(slots, [1, 42]);
    }

    #[test]
    fn string_contents_spill_through_the_allocator() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let ty = compile(WitType::String, HostType::Str);
        let mut slots = Vec::new();
        {
            let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
            cx.lower_to_stack(&ty, &Value::String("hello world".to_string()), &mut slots)
                .unwrap();
        }
        assert_eq!(slots, [1024, 11]);
        assert_eq!(&memory.data()[1024..1035], b"hello world");
        assert_eq!(ledger.count(), 1);
        assert_eq!(ledger.entries()[0].ptr, 1024);

        // Empty strings allocate nothing
        slots.clear();
        {
            let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
            cx.lower_to_stack(&ty, &Value::String(String::new()), &mut slots).unwrap();
        }
        assert_eq!(slots, [0, 0]);
        assert_eq!(ledger.count(), 1);
    }

    #[test]
    fn failed_lowering_rolls_back_through_the_ledger() {
        let mut memory = SimpleMemory::new(64 * 1024);
        let mut allocator = BumpAllocator::new(1024, 64 * 1024);
        let mut ledger = AllocationLedger::new();
        // record { name: string, id: u32 } with a bad id value
        let ty = compile(
            WitType::Record(vec![
                ("name".to_string(), Arc::new(WitType::String)),
                ("id".to_string(), Arc::new(WitType::U32)),
            ]),
            HostType::Struct(vec![
                crate::host::HostField::new("name", HostType::Str),
                crate::host::HostField::new("id", HostType::U32),
            ]),
        );
        let bad = Value::Record(vec![
            ("name".to_string(), Value::String("kept".to_string())),
            ("id".to_string(), Value::String("not a number".to_string())),
        ]);
        let mut slots = Vec::new();
        let err = {
            let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
            cx.lower_to_stack(&ty, &bad, &mut slots).unwrap_err()
        };
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.path, ["id"]);
        // The string for `name` was already allocated; roll it back.
        assert_eq!(ledger.count(), 1);
        ledger.free_all(&mut allocator).unwrap();
        assert_eq!(allocator.freed().len(), 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn flags_validate_declared_names() {
        let (mut memory, mut allocator, mut ledger) = harness();
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let flags_ty = compile(
            WitType::Flags(vec!["read".to_string(), "write".to_string()]),
            HostType::U8,
        );
        let mut slots = Vec::new();
        let err = cx
            .lower_to_stack(
                &flags_ty,
                &Value::Flags(vec!["execute".to_string()]),
                &mut slots,
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidData);

        slots.clear();
        cx.lower_to_stack(
            &flags_ty,
            &Value::Flags(vec!["write".to_string()]),
            &mut slots,
        )
        .unwrap();
        assert_eq!(slots, [0b10]);
    }
}
