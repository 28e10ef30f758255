//! Type compiler binding WIT types to host type descriptions.
//!
//! `compile` walks the two type trees together, validates that the host
//! shape can represent the WIT type, and produces an immutable
//! [`CompiledType`] with every offset, width and flat count the engines
//! need. Compiling the same `(WIT identity, host identity)` pair twice
//! returns the pointer-identical descriptor; the cache is the single
//! source of descriptor identity and never evicts.

use wabi_foundation::abi::{discriminant_size, flags_byte_width};
use wabi_foundation::layout::{payload_offset, record_field_offsets, tuple_field_offsets};

use crate::compiled::{CompiledCase, CompiledField, CompiledType, Shape};
use crate::host::{HostField, HostType, kebab_case, resolve_host_field};
use crate::prelude::*;

/// Compiles and caches type bindings.
///
/// The compiler exclusively owns its cache; the embedding runtime owns the
/// compiler. `compile` is safe to call from multiple threads — racing
/// compilations of the same pair are idempotent and both callers observe
/// the same descriptor identity.
#[derive(Debug, Default)]
pub struct TypeCompiler {
    #[cfg(feature = "std")]
    cache: RwLock<HashMap<(usize, usize), Arc<CompiledType>>>,
}

impl TypeCompiler {
    /// Create a compiler with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `wit` to `host`, reusing the cached descriptor when this exact
    /// pair of type nodes has been compiled before.
    pub fn compile(&self, wit: &Arc<WitType>, host: &Arc<HostType>) -> Result<Arc<CompiledType>> {
        #[cfg(feature = "std")]
        {
            let key = (Arc::as_ptr(wit) as usize, Arc::as_ptr(host) as usize);
            if let Some(hit) = self.cache.read().unwrap_or_else(|e| e.into_inner()).get(&key) {
                return Ok(Arc::clone(hit));
            }
            let built = Arc::new(build(wit, host)?);
            log::trace!(
                "compiled {} descriptor ({} flat slots, {} bytes)",
                built.wit_kind(),
                built.flat_count,
                built.layout.size
            );
            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            // First insert wins so threads racing the same key agree on
            // one identity.
            let entry = cache.entry(key).or_insert(built);
            Ok(Arc::clone(entry))
        }
        #[cfg(not(feature = "std"))]
        {
            Ok(Arc::new(build(wit, host)?))
        }
    }

    /// Number of cached descriptors.
    #[cfg(feature = "std")]
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn mismatch(wit: &WitType, host: &HostType) -> Error {
    Error::compile(
        ErrorKind::TypeMismatch,
        format!(
            "host {} cannot represent WIT {}",
            host.kind_name(),
            wit.kind_name()
        ),
    )
}

/// Recursively build a descriptor. Child descriptors are embedded in the
/// parent; only top-level `(Arc, Arc)` pairs go through the cache.
fn build(wit: &WitType, host: &HostType) -> Result<CompiledType> {
    let wit = wit.unalias();
    // One host reference level is transparent unless the WIT type is an
    // option, where nullability carries meaning.
    let host = match host {
        HostType::Ref(inner) if !matches!(wit, WitType::Option(_)) => inner.as_ref(),
        other => other,
    };

    let layout = layout_of(wit)?;
    let flat = flat_count(wit);

    let shape = match wit {
        WitType::Bool => primitive(wit, host, &HostType::Bool, Shape::Bool)?,
        WitType::S8 => primitive(wit, host, &HostType::S8, Shape::S8)?,
        WitType::U8 => primitive(wit, host, &HostType::U8, Shape::U8)?,
        WitType::S16 => primitive(wit, host, &HostType::S16, Shape::S16)?,
        WitType::U16 => primitive(wit, host, &HostType::U16, Shape::U16)?,
        WitType::S32 => primitive(wit, host, &HostType::S32, Shape::S32)?,
        WitType::U32 => primitive(wit, host, &HostType::U32, Shape::U32)?,
        WitType::S64 => primitive(wit, host, &HostType::S64, Shape::S64)?,
        WitType::U64 => primitive(wit, host, &HostType::U64, Shape::U64)?,
        WitType::F32 => primitive(wit, host, &HostType::F32, Shape::F32)?,
        WitType::F64 => primitive(wit, host, &HostType::F64, Shape::F64)?,
        // A char host may also be a plain unsigned 32-bit scalar; the
        // engines validate the scalar range per value.
        WitType::Char => match host {
            HostType::Char | HostType::U32 => Shape::Char,
            _ => return Err(mismatch(wit, host)),
        },
        WitType::String => match host {
            HostType::Str => Shape::String,
            _ => return Err(mismatch(wit, host)),
        },
        WitType::List(elem_wit) => match host {
            HostType::Seq(elem_host) => Shape::List {
                element: Arc::new(
                    build(elem_wit, elem_host).map_err(|e| e.push_path("[]"))?,
                ),
            },
            _ => return Err(mismatch(wit, host)),
        },
        WitType::Record(wit_fields) => {
            let HostType::Struct(host_fields) = host else {
                return Err(mismatch(wit, host));
            };
            Shape::Record {
                fields: build_record_fields(wit_fields, host_fields)?,
            }
        },
        WitType::Tuple(types) => Shape::Tuple {
            fields: build_tuple_fields(wit, types, host)?,
        },
        WitType::Variant(wit_cases) => {
            let HostType::Cases(host_cases) = host else {
                return Err(mismatch(wit, host));
            };
            build_variant(wit_cases, host_cases)?
        },
        WitType::Enum(names) => {
            let disc_size = discriminant_size(names.len());
            let width = host.int_width_bits().ok_or_else(|| mismatch(wit, host))?;
            if width < disc_size * 8 {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!(
                        "{width}-bit host integer is too narrow for an enum of {} cases",
                        names.len()
                    ),
                ));
            }
            Shape::Enum {
                names: names.clone(),
                disc_size,
            }
        },
        WitType::Option(inner) => {
            let HostType::Nullable(inner_host) = host else {
                return Err(mismatch(wit, host));
            };
            let payload =
                Arc::new(build(inner, inner_host).map_err(|e| e.push_path("some"))?);
            let offset = payload_offset(1, payload.layout.align);
            Shape::Option {
                payload,
                payload_offset: offset,
            }
        },
        WitType::Result { ok, err } => {
            let (host_ok, host_err) = resolve_result_host(wit, host)?;
            let ok = build_result_side(ok.as_deref(), host_ok, "ok")?;
            let err = build_result_side(err.as_deref(), host_err, "err")?;
            let mut payload_align = 1;
            let mut payload_flat = 0;
            for side in [&ok, &err].into_iter().flatten() {
                payload_align = payload_align.max(side.layout.align);
                payload_flat = payload_flat.max(side.flat_count);
            }
            Shape::Result {
                ok,
                err,
                payload_offset: payload_offset(1, payload_align),
                payload_flat,
            }
        },
        WitType::Flags(names) => {
            let width = flags_byte_width(names.len()).ok_or_else(|| {
                Error::compile(
                    ErrorKind::Unsupported,
                    format!("flags with {} labels exceed the 64-flag limit", names.len()),
                )
            })?;
            if !host.is_unsigned_int() {
                return Err(mismatch(wit, host));
            }
            let host_bits = host.int_width_bits().unwrap_or(0);
            if host_bits < width * 8 {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!(
                        "{host_bits}-bit host integer is too narrow for {} flags",
                        names.len()
                    ),
                ));
            }
            Shape::Flags {
                names: names.clone(),
                width,
            }
        },
        WitType::Own(_) => build_handle(wit, host, true)?,
        WitType::Borrow(_) => build_handle(wit, host, false)?,
        // `unalias` above removed every alias layer.
        WitType::Named { name, .. } => {
            return Err(Error::compile(
                ErrorKind::Unsupported,
                format!("unresolved alias `{name}`"),
            ));
        },
    };

    Ok(CompiledType {
        shape,
        layout,
        flat_count: flat,
    })
}

/// Primitive kinds must match exactly, signedness and width included.
fn primitive(wit: &WitType, host: &HostType, expected: &HostType, shape: Shape) -> Result<Shape> {
    if host == expected {
        Ok(shape)
    } else {
        Err(mismatch(wit, host))
    }
}

fn build_record_fields(
    wit_fields: &[(String, Arc<WitType>)],
    host_fields: &[HostField],
) -> Result<Vec<CompiledField>> {
    let offsets = record_field_offsets(wit_fields)?;
    let mut fields = Vec::with_capacity(wit_fields.len());
    for ((wit_name, wit_ty), wit_offset) in wit_fields.iter().zip(offsets) {
        let Some((host_index, host_field)) = resolve_host_field(host_fields, wit_name) else {
            return Err(Error::compile(
                ErrorKind::FieldMissing,
                format!("no host field binds record field `{wit_name}`"),
            ));
        };
        let ty = Arc::new(build(wit_ty, &host_field.ty).map_err(|e| e.in_field(wit_name))?);
        fields.push(CompiledField {
            wit_name: wit_name.clone(),
            host_name: host_field.name.clone(),
            host_index,
            wit_offset,
            ty,
        });
    }
    Ok(fields)
}

fn build_tuple_fields(
    wit: &WitType,
    types: &[Arc<WitType>],
    host: &HostType,
) -> Result<Vec<CompiledField>> {
    let offsets = tuple_field_offsets(types)?;
    let mut fields = Vec::with_capacity(types.len());
    match host {
        // A struct host binds tuple elements positionally.
        HostType::Struct(host_fields) => {
            if host_fields.len() != types.len() {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!(
                        "host struct of {} fields cannot represent a tuple of arity {}",
                        host_fields.len(),
                        types.len()
                    ),
                ));
            }
            for (i, ((wit_ty, wit_offset), host_field)) in
                types.iter().zip(offsets).zip(host_fields).enumerate()
            {
                let ty =
                    Arc::new(build(wit_ty, &host_field.ty).map_err(|e| e.at_index(i))?);
                fields.push(CompiledField {
                    wit_name: i.to_string(),
                    host_name: host_field.name.clone(),
                    host_index: i,
                    wit_offset,
                    ty,
                });
            }
        },
        HostType::Array(elem_host, len) => {
            if *len as usize != types.len() {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!(
                        "host array of length {len} cannot represent a tuple of arity {}",
                        types.len()
                    ),
                ));
            }
            for (i, (wit_ty, wit_offset)) in types.iter().zip(offsets).enumerate() {
                let ty = Arc::new(build(wit_ty, elem_host).map_err(|e| e.at_index(i))?);
                fields.push(CompiledField {
                    wit_name: i.to_string(),
                    host_name: i.to_string(),
                    host_index: i,
                    wit_offset,
                    ty,
                });
            }
        },
        _ => return Err(mismatch(wit, host)),
    }
    Ok(fields)
}

fn build_variant(
    wit_cases: &[(String, Option<Arc<WitType>>)],
    host_cases: &[(String, Option<HostType>)],
) -> Result<Shape> {
    let disc_size = discriminant_size(wit_cases.len());
    let mut payload_align = 1;
    let mut payload_flat = 0;
    let mut cases = Vec::with_capacity(wit_cases.len());
    for (index, (case_name, case_wit)) in wit_cases.iter().enumerate() {
        let host_case = host_cases
            .iter()
            .find(|(name, _)| {
                name.eq_ignore_ascii_case(case_name) || kebab_case(name) == *case_name
            })
            .ok_or_else(|| {
                Error::compile(
                    ErrorKind::FieldMissing,
                    format!("no host case binds variant case `{case_name}`"),
                )
            })?;
        let payload = match (case_wit, &host_case.1) {
            (Some(wit_ty), Some(host_ty)) => Some(Arc::new(
                build(wit_ty, host_ty).map_err(|e| e.in_field(case_name))?,
            )),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!("host case `{case_name}` lacks the payload the WIT case declares"),
                ));
            },
            (None, Some(_)) => {
                return Err(Error::compile(
                    ErrorKind::TypeMismatch,
                    format!("host case `{case_name}` declares a payload the WIT case lacks"),
                ));
            },
        };
        if let Some(payload) = &payload {
            payload_align = payload_align.max(payload.layout.align);
            payload_flat = payload_flat.max(payload.flat_count);
        }
        cases.push(CompiledCase {
            name: case_name.clone(),
            index: index as u32,
            payload,
        });
    }
    Ok(Shape::Variant {
        cases,
        disc_size,
        payload_offset: payload_offset(disc_size, payload_align),
        payload_flat,
    })
}

/// Extract the ok/err host payload types from either the tagged
/// [`HostType::Fallible`] form or the conventional struct of two nullable
/// fields named "ok"/"value" and "err"/"error".
fn resolve_result_host<'h>(
    wit: &WitType,
    host: &'h HostType,
) -> Result<(Option<&'h HostType>, Option<&'h HostType>)> {
    match host {
        HostType::Fallible { ok, err } => Ok((ok.as_deref(), err.as_deref())),
        HostType::Struct(fields) => {
            let side = |names: [&str; 2]| -> Result<Option<&'h HostType>> {
                let field = fields.iter().find(|f| {
                    names.iter().any(|name| f.name.eq_ignore_ascii_case(name))
                });
                match field {
                    None => Ok(None),
                    Some(HostField {
                        ty: HostType::Nullable(inner),
                        ..
                    }) => Ok(Some(inner.as_ref())),
                    Some(field) => Err(Error::compile(
                        ErrorKind::TypeMismatch,
                        format!("result field `{}` must be nullable", field.name),
                    )),
                }
            };
            Ok((side(["ok", "value"])?, side(["err", "error"])?))
        },
        _ => Err(mismatch(wit, host)),
    }
}

fn build_result_side(
    wit_side: Option<&WitType>,
    host_side: Option<&HostType>,
    label: &str,
) -> Result<Option<Arc<CompiledType>>> {
    match (wit_side, host_side) {
        (Some(wit_ty), Some(host_ty)) => Ok(Some(Arc::new(
            build(wit_ty, host_ty).map_err(|e| e.in_field(label))?,
        ))),
        // A host payload on a unit WIT side is ignored; the discriminant
        // alone carries the branch.
        (None, _) => Ok(None),
        (Some(_), None) => Err(Error::compile(
            ErrorKind::TypeMismatch,
            format!("host type lacks a payload for the {label} branch"),
        )
        .in_field(label)),
    }
}

fn build_handle(wit: &WitType, host: &HostType, owned: bool) -> Result<Shape> {
    match host {
        HostType::U32 => Ok(Shape::Handle { owned }),
        HostType::Struct(fields) => {
            let handle = fields
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case("handle"));
            match handle {
                Some(HostField {
                    ty: HostType::U32, ..
                }) => Ok(Shape::Handle { owned }),
                _ => Err(mismatch(wit, host)),
            }
        },
        _ => Err(mismatch(wit, host)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wit(ty: WitType) -> Arc<WitType> {
        Arc::new(ty)
    }

    fn host(ty: HostType) -> Arc<HostType> {
        Arc::new(ty)
    }

    #[test]
    fn compile_is_pointer_idempotent() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::List(Arc::new(WitType::U32)));
        let h = host(HostType::Seq(Box::new(HostType::U32)));
        let first = compiler.compile(&w, &h).unwrap();
        let second = compiler.compile(&w, &h).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compiler.cached_len(), 1);
    }

    #[test]
    fn distinct_wit_identities_compile_separately() {
        let compiler = TypeCompiler::new();
        let h = host(HostType::U32);
        let w1 = wit(WitType::U32);
        let w2 = wit(WitType::Named {
            name: "id".to_string(),
            ty: Arc::clone(&w1),
        });
        let c1 = compiler.compile(&w1, &h).unwrap();
        let c2 = compiler.compile(&w2, &h).unwrap();
        assert!(!Arc::ptr_eq(&c1, &c2));
        assert_eq!(c1.flat_count, c2.flat_count);
        assert_eq!(compiler.cached_len(), 2);
    }

    #[test]
    fn primitives_require_exact_kind() {
        let compiler = TypeCompiler::new();
        let err = compiler
            .compile(&wit(WitType::U32), &host(HostType::S32))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.phase, AbiPhase::Compile);
        // char additionally accepts an unsigned 32-bit scalar host
        compiler
            .compile(&wit(WitType::Char), &host(HostType::U32))
            .unwrap();
        compiler
            .compile(&wit(WitType::Char), &host(HostType::Char))
            .unwrap();
    }

    #[test]
    fn references_are_transparent_except_for_options() {
        let compiler = TypeCompiler::new();
        compiler
            .compile(
                &wit(WitType::U32),
                &host(HostType::Ref(Box::new(HostType::U32))),
            )
            .unwrap();
        // An option needs explicit nullability, not a plain reference.
        let err = compiler
            .compile(
                &wit(WitType::Option(Arc::new(WitType::U32))),
                &host(HostType::Ref(Box::new(HostType::U32))),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn record_binding_resolves_annotations_and_names() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Record(vec![
            ("user-id".to_string(), Arc::new(WitType::U32)),
            ("display-name".to_string(), Arc::new(WitType::String)),
        ]));
        let h = host(HostType::Struct(vec![
            HostField::skipped("cache", HostType::U64),
            HostField::new("userId", HostType::U32),
            HostField::renamed("label", "display-name", HostType::Str),
        ]));
        let compiled = compiler.compile(&w, &h).unwrap();
        let fields = compiled.fields();
        assert_eq!(fields[0].host_name, "userId");
        assert_eq!(fields[0].host_index, 1);
        assert_eq!(fields[0].wit_offset, 0);
        assert_eq!(fields[1].host_name, "label");
        assert_eq!(fields[1].host_index, 2);
        assert_eq!(fields[1].wit_offset, 4);
    }

    #[test]
    fn missing_record_field_is_a_hard_error() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Record(vec![(
            "name".to_string(),
            Arc::new(WitType::String),
        )]));
        let h = host(HostType::Struct(vec![HostField::new(
            "unrelated",
            HostType::Str,
        )]));
        let err = compiler.compile(&w, &h).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldMissing);
    }

    #[test]
    fn tuple_hosts_may_be_structs_or_arrays() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Tuple(vec![
            Arc::new(WitType::U32),
            Arc::new(WitType::U64),
        ]));
        compiler
            .compile(
                &w,
                &host(HostType::Struct(vec![
                    HostField::new("first", HostType::U32),
                    HostField::new("second", HostType::U64),
                ])),
            )
            .unwrap();
        let err = compiler
            .compile(
                &w,
                &host(HostType::Struct(vec![HostField::new(
                    "only",
                    HostType::U32,
                )])),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);

        let uniform = wit(WitType::Tuple(vec![
            Arc::new(WitType::U16),
            Arc::new(WitType::U16),
        ]));
        compiler
            .compile(&uniform, &host(HostType::Array(Box::new(HostType::U16), 2)))
            .unwrap();
    }

    #[test]
    fn enum_hosts_must_be_wide_enough() {
        let compiler = TypeCompiler::new();
        let many: Vec<String> = (0..300).map(|i| format!("c{i}")).collect();
        let w = wit(WitType::Enum(many));
        let err = compiler.compile(&w, &host(HostType::U8)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        compiler.compile(&w, &host(HostType::U16)).unwrap();
        compiler.compile(&w, &host(HostType::S32)).unwrap();
    }

    #[test]
    fn flags_hosts_must_be_unsigned_and_at_most_64() {
        let compiler = TypeCompiler::new();
        let names = |n: usize| -> Vec<String> { (0..n).map(|i| format!("f{i}")).collect() };
        compiler
            .compile(&wit(WitType::Flags(names(3))), &host(HostType::U8))
            .unwrap();
        let err = compiler
            .compile(&wit(WitType::Flags(names(3))), &host(HostType::S8))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let err = compiler
            .compile(&wit(WitType::Flags(names(9))), &host(HostType::U8))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let err = compiler
            .compile(&wit(WitType::Flags(names(65))), &host(HostType::U64))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unsupported);
    }

    #[test]
    fn result_accepts_tagged_and_struct_hosts() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Result {
            ok: Some(Arc::new(WitType::U32)),
            err: Some(Arc::new(WitType::String)),
        });
        compiler
            .compile(
                &w,
                &host(HostType::Fallible {
                    ok: Some(Box::new(HostType::U32)),
                    err: Some(Box::new(HostType::Str)),
                }),
            )
            .unwrap();
        compiler
            .compile(
                &w,
                &host(HostType::Struct(vec![
                    HostField::new("Value", HostType::Nullable(Box::new(HostType::U32))),
                    HostField::new("Error", HostType::Nullable(Box::new(HostType::Str))),
                ])),
            )
            .unwrap();
        // An ok branch with no host payload cannot carry the WIT payload.
        let err = compiler
            .compile(
                &w,
                &host(HostType::Fallible {
                    ok: None,
                    err: Some(Box::new(HostType::Str)),
                }),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.path, ["ok"]);
    }

    #[test]
    fn variant_cases_are_name_matched() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Variant(vec![
            ("none".to_string(), None),
            ("some-value".to_string(), Some(Arc::new(WitType::U64))),
        ]));
        let compiled = compiler
            .compile(
                &w,
                &host(HostType::Cases(vec![
                    ("SomeValue".to_string(), Some(HostType::U64)),
                    ("None".to_string(), None),
                ])),
            )
            .unwrap();
        let cases = compiled.cases();
        assert_eq!(cases[0].name, "none");
        assert_eq!(cases[0].index, 0);
        assert!(cases[0].payload.is_none());
        assert_eq!(cases[1].name, "some-value");
        assert!(cases[1].payload.is_some());

        let err = compiler
            .compile(
                &w,
                &host(HostType::Cases(vec![("none".to_string(), None)])),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldMissing);
    }

    #[test]
    fn handles_accept_u32_or_handle_structs() {
        let compiler = TypeCompiler::new();
        compiler
            .compile(&wit(WitType::Own(7)), &host(HostType::U32))
            .unwrap();
        compiler
            .compile(
                &wit(WitType::Borrow(7)),
                &host(HostType::Struct(vec![HostField::new(
                    "Handle",
                    HostType::U32,
                )])),
            )
            .unwrap();
        let err = compiler
            .compile(&wit(WitType::Own(7)), &host(HostType::U64))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn nested_compile_errors_carry_paths() {
        let compiler = TypeCompiler::new();
        let w = wit(WitType::Record(vec![(
            "items".to_string(),
            Arc::new(WitType::List(Arc::new(WitType::U8))),
        )]));
        let h = host(HostType::Struct(vec![HostField::new(
            "items",
            HostType::Seq(Box::new(HostType::U16)),
        )]));
        let err = compiler.compile(&w, &h).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.path, ["items", "[]"]);
    }
}
