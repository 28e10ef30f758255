//! Lifting engine: flat slots and linear memory back into host values.
//!
//! A [`LiftContext`] borrows the guest memory read-only. The flat entry
//! point reports how many slots it consumed so callers can walk a packed
//! result sequence; consumption follows the padding laws — an option
//! always consumes `1 + flat_count(T)` slots even in the `None` case, and
//! results and variants always consume `1 + max(case flat counts)`.

use wabi_foundation::abi::{checked_mul_u32, discriminant_size, validate_char};
use wabi_foundation::layout::{payload_offset, record_field_offsets, tuple_field_offsets};
use wabi_foundation::{canonicalize_f32_bits, canonicalize_f64_bits};

use crate::compiled::{CompiledType, Shape};
use crate::limits::{MAX_LIST_LENGTH, MAX_STRING_SIZE};
use crate::memory::{Memory, MemoryDirect};
use crate::prelude::*;

/// One lifting call borrowing the guest memory.
#[derive(Debug)]
pub struct LiftContext<'a, M: Memory> {
    memory: &'a M,
}

impl<'a, M: Memory> LiftContext<'a, M> {
    /// Borrow the memory capability for one call.
    pub fn new(memory: &'a M) -> Self {
        Self { memory }
    }

    /// Lift a value from flat slots, returning it together with the
    /// number of slots consumed.
    pub fn lift_from_stack(&self, ty: &CompiledType, slots: &[u64]) -> Result<(Value, usize)> {
        let mut index = 0;
        let value = self.unflatten(ty, slots, &mut index)?;
        #[cfg(feature = "std")]
        log::trace!("lifted {} from {index} flat slots", ty.wit_kind());
        Ok((value, index))
    }

    /// Lift a value from linear memory at `addr`.
    pub fn load(&self, ty: &CompiledType, addr: u32) -> Result<Value> {
        match &ty.shape {
            Shape::Bool => Ok(Value::Bool(self.memory.read_u8(addr)? != 0)),
            Shape::S8 => Ok(Value::S8(self.memory.read_u8(addr)? as i8)),
            Shape::U8 => Ok(Value::U8(self.memory.read_u8(addr)?)),
            Shape::S16 => Ok(Value::S16(self.memory.read_u16_le(addr)? as i16)),
            Shape::U16 => Ok(Value::U16(self.memory.read_u16_le(addr)?)),
            Shape::S32 => Ok(Value::S32(self.memory.read_u32_le(addr)? as i32)),
            Shape::U32 => Ok(Value::U32(self.memory.read_u32_le(addr)?)),
            Shape::S64 => Ok(Value::S64(self.memory.read_u64_le(addr)? as i64)),
            Shape::U64 => Ok(Value::U64(self.memory.read_u64_le(addr)?)),
            Shape::F32 => {
                let bits = canonicalize_f32_bits(self.memory.read_u32_le(addr)?);
                Ok(Value::F32(FloatBits32::from_bits(bits)))
            },
            Shape::F64 => {
                let bits = canonicalize_f64_bits(self.memory.read_u64_le(addr)?);
                Ok(Value::F64(FloatBits64::from_bits(bits)))
            },
            Shape::Char => decode_char(self.memory.read_u32_le(addr)?),
            Shape::String => {
                let ptr = self.memory.read_u32_le(addr)?;
                let len = self.memory.read_u32_le(addr + 4)?;
                self.load_string_at(ptr, len)
            },
            Shape::List { element } => {
                let ptr = self.memory.read_u32_le(addr)?;
                let len = self.memory.read_u32_le(addr + 4)?;
                self.load_list(element, ptr, len)
            },
            Shape::Record { fields } => {
                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self
                        .load(&field.ty, addr + field.wit_offset)
                        .map_err(|e| e.in_field(&field.wit_name))?;
                    entries.push((field.wit_name.clone(), value));
                }
                Ok(Value::Record(entries))
            },
            Shape::Tuple { fields } => {
                let mut items = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    items.push(
                        self.load(&field.ty, addr + field.wit_offset)
                            .map_err(|e| e.at_index(i))?,
                    );
                }
                Ok(Value::Tuple(items))
            },
            Shape::Option {
                payload,
                payload_offset,
            } => match self.memory.read_u8(addr)? {
                0 => Ok(Value::Option(None)),
                1 => {
                    let inner = self
                        .load(payload, addr + payload_offset)
                        .map_err(|e| e.push_path("some"))?;
                    Ok(Value::Option(Some(Box::new(inner))))
                },
                disc => Err(bad_discriminant("option", u64::from(disc), 2)),
            },
            Shape::Result {
                ok,
                err,
                payload_offset,
                ..
            } => match self.memory.read_u8(addr)? {
                0 => Ok(Value::Result(Ok(self
                    .load_case_payload(ok.as_deref(), addr + payload_offset, "ok")?))),
                1 => Ok(Value::Result(Err(self
                    .load_case_payload(err.as_deref(), addr + payload_offset, "err")?))),
                disc => Err(bad_discriminant("result", u64::from(disc), 2)),
            },
            Shape::Variant {
                cases,
                disc_size,
                payload_offset,
                ..
            } => {
                let disc = self.read_disc(addr, *disc_size)?;
                let case = cases
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("variant", disc, cases.len()))?;
                let payload = self.load_case_payload(
                    case.payload.as_deref(),
                    addr + payload_offset,
                    &case.name,
                )?;
                Ok(Value::Variant(case.name.clone(), payload))
            },
            Shape::Enum { names, disc_size } => {
                let disc = self.read_disc(addr, *disc_size)?;
                let name = names
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("enum", disc, names.len()))?;
                Ok(Value::Enum(name.clone()))
            },
            Shape::Flags { names, width } => {
                let bits = self.read_flags_bits(addr, *width)?;
                Ok(flags_from_bits(names, bits))
            },
            Shape::Handle { owned } => {
                let handle = self.memory.read_u32_le(addr)?;
                Ok(make_handle(*owned, handle))
            },
        }
    }

    /// Lift a value from linear memory by WIT type alone, without a
    /// compiled descriptor. Convenience path for ad-hoc callers; records
    /// come back keyed by their WIT field names.
    pub fn load_value(&self, ty: &WitType, addr: u32) -> Result<Value> {
        match ty.unalias() {
            WitType::Bool => Ok(Value::Bool(self.memory.read_u8(addr)? != 0)),
            WitType::S8 => Ok(Value::S8(self.memory.read_u8(addr)? as i8)),
            WitType::U8 => Ok(Value::U8(self.memory.read_u8(addr)?)),
            WitType::S16 => Ok(Value::S16(self.memory.read_u16_le(addr)? as i16)),
            WitType::U16 => Ok(Value::U16(self.memory.read_u16_le(addr)?)),
            WitType::S32 => Ok(Value::S32(self.memory.read_u32_le(addr)? as i32)),
            WitType::U32 => Ok(Value::U32(self.memory.read_u32_le(addr)?)),
            WitType::S64 => Ok(Value::S64(self.memory.read_u64_le(addr)? as i64)),
            WitType::U64 => Ok(Value::U64(self.memory.read_u64_le(addr)?)),
            WitType::F32 => {
                let bits = canonicalize_f32_bits(self.memory.read_u32_le(addr)?);
                Ok(Value::F32(FloatBits32::from_bits(bits)))
            },
            WitType::F64 => {
                let bits = canonicalize_f64_bits(self.memory.read_u64_le(addr)?);
                Ok(Value::F64(FloatBits64::from_bits(bits)))
            },
            WitType::Char => decode_char(self.memory.read_u32_le(addr)?),
            WitType::String => {
                let ptr = self.memory.read_u32_le(addr)?;
                let len = self.memory.read_u32_le(addr + 4)?;
                self.load_string_at(ptr, len)
            },
            WitType::List(elem) => {
                let ptr = self.memory.read_u32_le(addr)?;
                let len = self.memory.read_u32_le(addr + 4)?;
                if len as usize > MAX_LIST_LENGTH {
                    return Err(list_too_long(len));
                }
                let stride = layout_of(elem)?.size;
                let total = checked_mul_u32(len, stride).ok_or_else(list_size_overflow)?;
                check_range(ptr, total)?;
                let mut values = Vec::with_capacity(len as usize);
                for i in 0..len {
                    values.push(
                        self.load_value(elem, ptr + i * stride)
                            .map_err(|e| e.at_index(i as usize))?,
                    );
                }
                Ok(Value::List(values))
            },
            WitType::Record(fields) => {
                let offsets = record_field_offsets(fields)?;
                let mut entries = Vec::with_capacity(fields.len());
                for ((name, field_ty), offset) in fields.iter().zip(offsets) {
                    let value = self
                        .load_value(field_ty, addr + offset)
                        .map_err(|e| e.in_field(name))?;
                    entries.push((name.clone(), value));
                }
                Ok(Value::Record(entries))
            },
            WitType::Tuple(types) => {
                let offsets = tuple_field_offsets(types)?;
                let mut items = Vec::with_capacity(types.len());
                for (i, (elem_ty, offset)) in types.iter().zip(offsets).enumerate() {
                    items.push(
                        self.load_value(elem_ty, addr + offset)
                            .map_err(|e| e.at_index(i))?,
                    );
                }
                Ok(Value::Tuple(items))
            },
            WitType::Option(inner) => {
                let offset = payload_offset(1, layout_of(inner)?.align);
                match self.memory.read_u8(addr)? {
                    0 => Ok(Value::Option(None)),
                    1 => Ok(Value::Option(Some(Box::new(
                        self.load_value(inner, addr + offset)
                            .map_err(|e| e.push_path("some"))?,
                    )))),
                    disc => Err(bad_discriminant("option", u64::from(disc), 2)),
                }
            },
            WitType::Result { ok, err } => {
                let mut align = 1;
                for side in [ok, err].into_iter().flatten() {
                    align = align.max(layout_of(side)?.align);
                }
                let offset = payload_offset(1, align);
                match self.memory.read_u8(addr)? {
                    0 => Ok(Value::Result(Ok(match ok {
                        Some(ty) => Some(Box::new(
                            self.load_value(ty, addr + offset).map_err(|e| e.in_field("ok"))?,
                        )),
                        None => None,
                    }))),
                    1 => Ok(Value::Result(Err(match err {
                        Some(ty) => Some(Box::new(
                            self.load_value(ty, addr + offset)
                                .map_err(|e| e.in_field("err"))?,
                        )),
                        None => None,
                    }))),
                    disc => Err(bad_discriminant("result", u64::from(disc), 2)),
                }
            },
            WitType::Variant(cases) => {
                let disc_size = discriminant_size(cases.len());
                let mut align = 1;
                for (_, case_ty) in cases {
                    if let Some(ty) = case_ty {
                        align = align.max(layout_of(ty)?.align);
                    }
                }
                let disc = self.read_disc(addr, disc_size)?;
                let (name, case_ty) = cases
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("variant", disc, cases.len()))?;
                let payload = match case_ty {
                    Some(ty) => Some(Box::new(
                        self.load_value(ty, addr + payload_offset(disc_size, align))
                            .map_err(|e| e.in_field(name))?,
                    )),
                    None => None,
                };
                Ok(Value::Variant(name.clone(), payload))
            },
            WitType::Enum(names) => {
                let disc = self.read_disc(addr, discriminant_size(names.len()))?;
                let name = names
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("enum", disc, names.len()))?;
                Ok(Value::Enum(name.clone()))
            },
            WitType::Flags(names) => {
                let width = layout_of(ty.unalias())?.size;
                let bits = self.read_flags_bits(addr, width)?;
                Ok(flags_from_bits(names, bits))
            },
            WitType::Own(_) => Ok(Value::Own(self.memory.read_u32_le(addr)?)),
            WitType::Borrow(_) => Ok(Value::Borrow(self.memory.read_u32_le(addr)?)),
            WitType::Named { .. } => Err(Error::decode(
                ErrorKind::Unsupported,
                "unresolved alias",
            )),
        }
    }

    fn unflatten(&self, ty: &CompiledType, slots: &[u64], index: &mut usize) -> Result<Value> {
        match &ty.shape {
            Shape::Bool => Ok(Value::Bool(take_slot(slots, index)? != 0)),
            Shape::S8 => Ok(Value::S8(take_slot(slots, index)? as u8 as i8)),
            Shape::U8 => Ok(Value::U8(take_slot(slots, index)? as u8)),
            Shape::S16 => Ok(Value::S16(take_slot(slots, index)? as u16 as i16)),
            Shape::U16 => Ok(Value::U16(take_slot(slots, index)? as u16)),
            Shape::S32 => Ok(Value::S32(take_slot(slots, index)? as u32 as i32)),
            Shape::U32 => Ok(Value::U32(take_slot(slots, index)? as u32)),
            Shape::S64 => Ok(Value::S64(take_slot(slots, index)? as i64)),
            Shape::U64 => Ok(Value::U64(take_slot(slots, index)?)),
            Shape::F32 => {
                let bits = canonicalize_f32_bits(take_slot(slots, index)? as u32);
                Ok(Value::F32(FloatBits32::from_bits(bits)))
            },
            Shape::F64 => {
                let bits = canonicalize_f64_bits(take_slot(slots, index)?);
                Ok(Value::F64(FloatBits64::from_bits(bits)))
            },
            Shape::Char => decode_char(take_slot(slots, index)? as u32),
            Shape::String => {
                let ptr = slot_to_u32(take_slot(slots, index)?)?;
                let len = slot_to_u32(take_slot(slots, index)?)?;
                self.load_string_at(ptr, len)
            },
            Shape::List { element } => {
                let ptr = slot_to_u32(take_slot(slots, index)?)?;
                let len = slot_to_u32(take_slot(slots, index)?)?;
                self.load_list(element, ptr, len)
            },
            Shape::Record { fields } => {
                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self
                        .unflatten(&field.ty, slots, index)
                        .map_err(|e| e.in_field(&field.wit_name))?;
                    entries.push((field.wit_name.clone(), value));
                }
                Ok(Value::Record(entries))
            },
            Shape::Tuple { fields } => {
                let mut items = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    items.push(
                        self.unflatten(&field.ty, slots, index)
                            .map_err(|e| e.at_index(i))?,
                    );
                }
                Ok(Value::Tuple(items))
            },
            Shape::Option { payload, .. } => {
                let base = *index;
                let disc = take_slot(slots, index)?;
                let value = match disc {
                    0 => Value::Option(None),
                    1 => Value::Option(Some(Box::new(
                        self.unflatten(payload, slots, index)
                            .map_err(|e| e.push_path("some"))?,
                    ))),
                    other => return Err(bad_discriminant("option", other, 2)),
                };
                self.consume_padded(slots, index, base, payload.flat_count)?;
                Ok(value)
            },
            Shape::Result {
                ok,
                err,
                payload_flat,
                ..
            } => {
                let base = *index;
                let disc = take_slot(slots, index)?;
                let value = match disc {
                    0 => Value::Result(Ok(self.unflatten_case_payload(
                        ok.as_deref(),
                        slots,
                        index,
                        "ok",
                    )?)),
                    1 => Value::Result(Err(self.unflatten_case_payload(
                        err.as_deref(),
                        slots,
                        index,
                        "err",
                    )?)),
                    other => return Err(bad_discriminant("result", other, 2)),
                };
                self.consume_padded(slots, index, base, *payload_flat)?;
                Ok(value)
            },
            Shape::Variant {
                cases,
                payload_flat,
                ..
            } => {
                let base = *index;
                let disc = take_slot(slots, index)?;
                let case = cases
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("variant", disc, cases.len()))?;
                let payload = self.unflatten_case_payload(
                    case.payload.as_deref(),
                    slots,
                    index,
                    &case.name,
                )?;
                let value = Value::Variant(case.name.clone(), payload);
                self.consume_padded(slots, index, base, *payload_flat)?;
                Ok(value)
            },
            Shape::Enum { names, .. } => {
                let disc = take_slot(slots, index)?;
                let name = names
                    .get(disc as usize)
                    .ok_or_else(|| bad_discriminant("enum", disc, names.len()))?;
                Ok(Value::Enum(name.clone()))
            },
            Shape::Flags { names, width } => {
                if *width == 0 {
                    return Ok(Value::Flags(Vec::new()));
                }
                let bits = take_slot(slots, index)?;
                Ok(flags_from_bits(names, bits))
            },
            Shape::Handle { owned } => {
                let handle = slot_to_u32(take_slot(slots, index)?)?;
                Ok(make_handle(*owned, handle))
            },
        }
    }

    fn load_case_payload(
        &self,
        compiled: Option<&CompiledType>,
        addr: u32,
        label: &str,
    ) -> Result<Option<Box<Value>>> {
        match compiled {
            Some(ty) => Ok(Some(Box::new(
                self.load(ty, addr).map_err(|e| e.in_field(label))?,
            ))),
            None => Ok(None),
        }
    }

    fn unflatten_case_payload(
        &self,
        compiled: Option<&CompiledType>,
        slots: &[u64],
        index: &mut usize,
        label: &str,
    ) -> Result<Option<Box<Value>>> {
        match compiled {
            Some(ty) => Ok(Some(Box::new(
                self.unflatten(ty, slots, index).map_err(|e| e.in_field(label))?,
            ))),
            None => Ok(None),
        }
    }

    /// Advance the cursor past the padded payload area so every branch of
    /// a discriminated type consumes the same slot count.
    fn consume_padded(
        &self,
        slots: &[u64],
        index: &mut usize,
        base: usize,
        payload_flat: u32,
    ) -> Result<()> {
        let target = base + 1 + payload_flat as usize;
        if target > slots.len() {
            return Err(Error::decode(
                ErrorKind::InvalidData,
                format!(
                    "flat form needs {target} slots but only {} are present",
                    slots.len()
                ),
            ));
        }
        *index = target;
        Ok(())
    }

    fn load_string_at(&self, ptr: u32, len: u32) -> Result<Value> {
        if len as usize > MAX_STRING_SIZE {
            return Err(Error::decode(
                ErrorKind::Overflow,
                format!("string of {len} bytes exceeds the {MAX_STRING_SIZE} byte limit"),
            ));
        }
        if len == 0 {
            return Ok(Value::String(String::new()));
        }
        let bytes = self.memory.read_bytes(ptr, len)?;
        let s = String::from_utf8(bytes).map_err(|_| {
            Error::decode(ErrorKind::InvalidUtf8, "string bytes are not valid UTF-8")
        })?;
        Ok(Value::String(s))
    }

    fn load_list(&self, element: &CompiledType, ptr: u32, len: u32) -> Result<Value> {
        if len as usize > MAX_LIST_LENGTH {
            return Err(list_too_long(len));
        }
        if len == 0 {
            return Ok(Value::List(Vec::new()));
        }
        let stride = element.layout.size;
        let total = checked_mul_u32(len, stride).ok_or_else(list_size_overflow)?;
        check_range(ptr, total)?;
        if let Some(values) = self.bulk_decode(element, ptr, len, total)? {
            return Ok(Value::List(values));
        }
        let mut values = Vec::with_capacity(len as usize);
        for i in 0..len {
            values.push(
                self.load(element, ptr + i * stride)
                    .map_err(|e| e.at_index(i as usize))?,
            );
        }
        Ok(Value::List(values))
    }

    /// Bulk reader for primitive element lists; one memory read, then a
    /// chunked decode with NaN canonicalization for floats.
    fn bulk_decode(
        &self,
        element: &CompiledType,
        ptr: u32,
        len: u32,
        total: u32,
    ) -> Result<Option<Vec<Value>>> {
        match &element.shape {
            Shape::U8
            | Shape::S8
            | Shape::U16
            | Shape::S16
            | Shape::U32
            | Shape::S32
            | Shape::U64
            | Shape::S64
            | Shape::F32
            | Shape::F64 => {},
            _ => return Ok(None),
        }
        let bytes = self.memory.read_bytes(ptr, total)?;
        let mut values = Vec::with_capacity(len as usize);
        match &element.shape {
            Shape::U8 => values.extend(bytes.iter().map(|b| Value::U8(*b))),
            Shape::S8 => values.extend(bytes.iter().map(|b| Value::S8(*b as i8))),
            Shape::U16 => values.extend(
                bytes
                    .chunks_exact(2)
                    .map(|c| Value::U16(u16::from_le_bytes([c[0], c[1]]))),
            ),
            Shape::S16 => values.extend(
                bytes
                    .chunks_exact(2)
                    .map(|c| Value::S16(i16::from_le_bytes([c[0], c[1]]))),
            ),
            Shape::U32 => values.extend(
                bytes
                    .chunks_exact(4)
                    .map(|c| Value::U32(u32::from_le_bytes([c[0], c[1], c[2], c[3]]))),
            ),
            Shape::S32 => values.extend(
                bytes
                    .chunks_exact(4)
                    .map(|c| Value::S32(i32::from_le_bytes([c[0], c[1], c[2], c[3]]))),
            ),
            Shape::U64 => values.extend(bytes.chunks_exact(8).map(|c| {
                Value::U64(u64::from_le_bytes([
                    c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                ]))
            })),
            Shape::S64 => values.extend(bytes.chunks_exact(8).map(|c| {
                Value::S64(i64::from_le_bytes([
                    c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                ]))
            })),
            Shape::F32 => values.extend(bytes.chunks_exact(4).map(|c| {
                let bits = canonicalize_f32_bits(u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
                Value::F32(FloatBits32::from_bits(bits))
            })),
            Shape::F64 => values.extend(bytes.chunks_exact(8).map(|c| {
                let bits = canonicalize_f64_bits(u64::from_le_bytes([
                    c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                ]));
                Value::F64(FloatBits64::from_bits(bits))
            })),
            _ => return Ok(None),
        }
        Ok(Some(values))
    }

    fn read_disc(&self, addr: u32, disc_size: u32) -> Result<u64> {
        match disc_size {
            1 => Ok(u64::from(self.memory.read_u8(addr)?)),
            2 => Ok(u64::from(self.memory.read_u16_le(addr)?)),
            _ => Ok(u64::from(self.memory.read_u32_le(addr)?)),
        }
    }

    fn read_flags_bits(&self, addr: u32, width: u32) -> Result<u64> {
        match width {
            0 => Ok(0),
            1 => Ok(u64::from(self.memory.read_u8(addr)?)),
            2 => Ok(u64::from(self.memory.read_u16_le(addr)?)),
            4 => Ok(u64::from(self.memory.read_u32_le(addr)?)),
            _ => self.memory.read_u64_le(addr),
        }
    }
}

impl<'a, M: MemoryDirect> LiftContext<'a, M> {
    /// Zero-copy string lift: borrow the bytes directly from linear
    /// memory. The returned slice is valid only while the memory view is
    /// unchanged, which the borrow checker enforces.
    pub fn load_string_borrowed(&self, addr: u32) -> Result<&'a str> {
        let ptr = self.memory.read_u32_le(addr)? as usize;
        let len = self.memory.read_u32_le(addr + 4)? as usize;
        if len > MAX_STRING_SIZE {
            return Err(Error::decode(
                ErrorKind::Overflow,
                format!("string of {len} bytes exceeds the {MAX_STRING_SIZE} byte limit"),
            ));
        }
        let bytes = self.memory.as_bytes();
        let end = ptr
            .checked_add(len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| {
                Error::decode(
                    ErrorKind::Overflow,
                    format!("string of {len} bytes at {ptr} out of bounds"),
                )
            })?;
        core::str::from_utf8(&bytes[ptr..end]).map_err(|_| {
            Error::decode(ErrorKind::InvalidUtf8, "string bytes are not valid UTF-8")
        })
    }
}

fn take_slot(slots: &[u64], index: &mut usize) -> Result<u64> {
    let slot = slots.get(*index).copied().ok_or_else(|| {
        Error::decode(
            ErrorKind::InvalidData,
            format!("flat slot {} out of range ({} slots)", *index, slots.len()),
        )
    })?;
    *index += 1;
    Ok(slot)
}

fn slot_to_u32(slot: u64) -> Result<u32> {
    u32::try_from(slot).map_err(|_| {
        Error::decode(
            ErrorKind::Overflow,
            format!("slot value {slot:#x} exceeds the 32-bit range"),
        )
    })
}

fn decode_char(scalar: u32) -> Result<Value> {
    if !validate_char(scalar) {
        return Err(Error::decode(
            ErrorKind::InvalidData,
            format!("{scalar:#x} is not a Unicode scalar value"),
        ));
    }
    char::from_u32(scalar)
        .map(Value::Char)
        .ok_or_else(|| {
            Error::decode(
                ErrorKind::InvalidData,
                format!("{scalar:#x} is not a Unicode scalar value"),
            )
        })
}

fn bad_discriminant(kind: &str, disc: u64, n_cases: usize) -> Error {
    Error::decode(
        ErrorKind::InvalidDiscriminant,
        format!("{kind} discriminant {disc} out of range for {n_cases} cases"),
    )
}

fn list_too_long(len: u32) -> Error {
    Error::decode(
        ErrorKind::Overflow,
        format!("list of {len} elements exceeds the {MAX_LIST_LENGTH} element limit"),
    )
}

fn list_size_overflow() -> Error {
    Error::decode(
        ErrorKind::Overflow,
        "list byte size overflows the 32-bit address range",
    )
}

fn check_range(ptr: u32, total: u32) -> Result<()> {
    ptr.checked_add(total).map(|_| ()).ok_or_else(|| {
        Error::decode(
            ErrorKind::Overflow,
            format!("list of {total} bytes at {ptr} wraps the 32-bit address range"),
        )
    })
}

fn flags_from_bits(names: &[String], bits: u64) -> Value {
    let mut active = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if bits & (1 << i) != 0 {
            active.push(name.clone());
        }
    }
    // Undeclared high bits are ignored, not rejected.
    Value::Flags(active)
}

fn make_handle(owned: bool, handle: u32) -> Value {
    if owned {
        Value::Own(handle)
    } else {
        Value::Borrow(handle)
    }
}
