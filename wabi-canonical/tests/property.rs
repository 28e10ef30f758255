//! Property tests: arbitrary values survive the round trip through both
//! the flat form and linear memory.

use std::sync::Arc;

use proptest::prelude::*;
use wabi_canonical::prelude::*;

fn roundtrip_both(ty: &CompiledType, value: &Value) -> (Value, Value) {
    let mut memory = SimpleMemory::new(1024 * 1024);
    let mut allocator = BumpAllocator::new(8192, 1024 * 1024);
    let mut ledger = AllocationLedger::new();
    let mut slots = Vec::new();
    {
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        cx.lower_to_stack(ty, value, &mut slots).unwrap();
        cx.store(ty, value, 64).unwrap();
    }
    let lift = LiftContext::new(&memory);
    let (flat, consumed) = lift.lift_from_stack(ty, &slots).unwrap();
    assert_eq!(consumed, slots.len());
    let mem = lift.load(ty, 64).unwrap();
    (flat, mem)
}

proptest! {
    #[test]
    fn u32_lists_roundtrip(items in proptest::collection::vec(any::<u32>(), 0..64)) {
        let ty = TypeCompiler::new()
            .compile(
                &Arc::new(WitType::List(Arc::new(WitType::U32))),
                &Arc::new(HostType::Seq(Box::new(HostType::U32))),
            )
            .unwrap();
        let value = Value::List(items.into_iter().map(Value::U32).collect());
        let (flat, mem) = roundtrip_both(&ty, &value);
        prop_assert_eq!(&flat, &value);
        prop_assert_eq!(&mem, &value);
    }

    #[test]
    fn strings_roundtrip(s in ".*") {
        let ty = TypeCompiler::new()
            .compile(&Arc::new(WitType::String), &Arc::new(HostType::Str))
            .unwrap();
        let value = Value::String(s);
        let (flat, mem) = roundtrip_both(&ty, &value);
        prop_assert_eq!(&flat, &value);
        prop_assert_eq!(&mem, &value);
    }

    #[test]
    fn f64_bit_patterns_canonicalize(bits in any::<u64>()) {
        let ty = TypeCompiler::new()
            .compile(&Arc::new(WitType::F64), &Arc::new(HostType::F64))
            .unwrap();
        let value = Value::F64(FloatBits64::from_bits(bits));
        let expected = Value::F64(FloatBits64::from_bits(bits).canonicalize());
        let (flat, mem) = roundtrip_both(&ty, &value);
        prop_assert_eq!(&flat, &expected);
        prop_assert_eq!(&mem, &expected);
    }

    #[test]
    fn optional_pairs_roundtrip(opt in proptest::option::of((any::<u16>(), ".{0,12}"))) {
        let ty = TypeCompiler::new()
            .compile(
                &Arc::new(WitType::Option(Arc::new(WitType::Tuple(vec![
                    Arc::new(WitType::U16),
                    Arc::new(WitType::String),
                ])))),
                &Arc::new(HostType::Nullable(Box::new(HostType::Struct(vec![
                    HostField::new("a", HostType::U16),
                    HostField::new("b", HostType::Str),
                ])))),
            )
            .unwrap();
        let value = Value::Option(opt.map(|(n, s)| {
            Box::new(Value::Tuple(vec![Value::U16(n), Value::String(s)]))
        }));
        let (flat, mem) = roundtrip_both(&ty, &value);
        prop_assert_eq!(&flat, &value);
        prop_assert_eq!(&mem, &value);
    }

    #[test]
    fn results_keep_their_branch(is_ok in any::<bool>(), n in any::<u8>()) {
        let ty = TypeCompiler::new()
            .compile(
                &Arc::new(WitType::Result {
                    ok: Some(Arc::new(WitType::List(Arc::new(WitType::U8)))),
                    err: Some(Arc::new(WitType::U8)),
                }),
                &Arc::new(HostType::Fallible {
                    ok: Some(Box::new(HostType::Seq(Box::new(HostType::U8)))),
                    err: Some(Box::new(HostType::U8)),
                }),
            )
            .unwrap();
        let value = if is_ok {
            Value::Result(Ok(Some(Box::new(Value::List(vec![Value::U8(n)])))))
        } else {
            Value::Result(Err(Some(Box::new(Value::U8(n)))))
        };
        let (flat, mem) = roundtrip_both(&ty, &value);
        prop_assert_eq!(&flat, &value);
        prop_assert_eq!(&mem, &value);
    }
}
