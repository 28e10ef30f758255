//! Byte-exact assertions for the linear-memory form of discriminated and
//! bit-set types.

use std::sync::Arc;

use wabi_canonical::prelude::*;

fn compile(wit: WitType, host: HostType) -> Arc<CompiledType> {
    TypeCompiler::new()
        .compile(&Arc::new(wit), &Arc::new(host))
        .expect("binding should compile")
}

fn store_at_zero(ty: &CompiledType, value: &Value) -> SimpleMemory {
    let mut memory = SimpleMemory::new(4096);
    let mut allocator = BumpAllocator::new(1024, 4096);
    let mut ledger = AllocationLedger::new();
    let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
    cx.store(ty, value, 0).expect("store failed");
    drop(cx);
    memory
}

#[test]
fn option_memory_form_writes_only_the_discriminant_when_none() {
    let ty = compile(
        WitType::Option(Arc::new(WitType::U32)),
        HostType::Nullable(Box::new(HostType::U32)),
    );
    let memory = store_at_zero(&ty, &Value::Option(None));
    assert_eq!(memory.data()[0], 0);
    // The payload bytes stay untouched (zero in a fresh memory)
    assert_eq!(&memory.data()[4..8], &[0, 0, 0, 0]);

    let memory = store_at_zero(&ty, &Value::Option(Some(Box::new(Value::U32(0x0102_0304)))));
    assert_eq!(memory.data()[0], 1);
    // Payload is aligned to the u32, leaving bytes 1..4 as padding
    assert_eq!(&memory.data()[4..8], &[0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn variant_memory_form_uses_the_discriminant_width() {
    // Two cases: one discriminant byte, payload aligned to 8
    let small = compile(
        WitType::Variant(vec![
            ("a".to_string(), None),
            ("b".to_string(), Some(Arc::new(WitType::U64))),
        ]),
        HostType::Cases(vec![
            ("a".to_string(), None),
            ("b".to_string(), Some(HostType::U64)),
        ]),
    );
    let memory = store_at_zero(
        &small,
        &Value::Variant("b".to_string(), Some(Box::new(Value::U64(0x1122_3344_5566_7788)))),
    );
    assert_eq!(memory.data()[0], 1);
    assert_eq!(
        &memory.data()[8..16],
        &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
    );

    // 300 cases: two discriminant bytes, little-endian
    let wide = compile(
        WitType::Variant((0..300).map(|i| (format!("c{i}"), None)).collect()),
        HostType::Cases((0..300).map(|i| (format!("c{i}"), None)).collect()),
    );
    let memory = store_at_zero(&wide, &Value::Variant("c257".to_string(), None));
    assert_eq!(&memory.data()[0..2], &[0x01, 0x01]);
}

#[test]
fn enum_memory_form_is_little_endian_at_its_width() {
    let wide = compile(
        WitType::Enum((0..70_000).map(|i| format!("e{i}")).collect()),
        HostType::U32,
    );
    assert_eq!(wide.layout.size, 4);
    let memory = store_at_zero(&wide, &Value::Enum("e65793".to_string()));
    // 65793 == 0x010101
    assert_eq!(&memory.data()[0..4], &[0x01, 0x01, 0x01, 0x00]);
}

#[test]
fn flags_memory_form_packs_bits_at_the_derived_width() {
    let ty = compile(
        WitType::Flags((0..9).map(|i| format!("f{i}")).collect()),
        HostType::U16,
    );
    assert_eq!(ty.layout.size, 2);
    let memory = store_at_zero(
        &ty,
        &Value::Flags(vec!["f0".to_string(), "f3".to_string(), "f8".to_string()]),
    );
    assert_eq!(&memory.data()[0..2], &[0b0000_1001, 0b0000_0001]);

    // Raw integers pass through verbatim, undeclared bits included
    let memory = store_at_zero(&ty, &Value::U16(0xFFFF));
    assert_eq!(&memory.data()[0..2], &[0xFF, 0xFF]);
}

#[test]
fn bool_and_char_memory_forms() {
    let bool_ty = compile(WitType::Bool, HostType::Bool);
    let memory = store_at_zero(&bool_ty, &Value::Bool(true));
    assert_eq!(memory.data()[0], 1);

    let char_ty = compile(WitType::Char, HostType::Char);
    let memory = store_at_zero(&char_ty, &Value::Char('\u{10348}'));
    assert_eq!(&memory.data()[0..4], &[0x48, 0x03, 0x01, 0x00]);
}

#[test]
fn handles_are_little_endian_u32() {
    let ty = compile(WitType::Own(4), HostType::U32);
    let memory = store_at_zero(&ty, &Value::Own(0xAABB_CCDD));
    assert_eq!(&memory.data()[0..4], &[0xDD, 0xCC, 0xBB, 0xAA]);

    let lifted = LiftContext::new(&memory).load(&ty, 0).unwrap();
    assert_eq!(lifted, Value::Own(0xAABB_CCDD));
}
