//! Simulated guest call: lower two arguments, let the "guest" compute,
//! lift the result back.
//!
//! Run with `cargo run --example guest_call`.

use std::sync::Arc;

use wabi_canonical::prelude::*;

fn main() -> wabi_error::Result<()> {
    let compiler = TypeCompiler::new();

    // greet: func(name: string, times: u32) -> list<string>
    let name_ty = compiler.compile(&Arc::new(WitType::String), &Arc::new(HostType::Str))?;
    let times_ty = compiler.compile(&Arc::new(WitType::U32), &Arc::new(HostType::U32))?;
    let result_ty = compiler.compile(
        &Arc::new(WitType::List(Arc::new(WitType::String))),
        &Arc::new(HostType::Seq(Box::new(HostType::Str))),
    )?;

    let mut memory = SimpleMemory::new(64 * 1024);
    let mut allocator = BumpAllocator::new(1024, 64 * 1024);
    let mut ledger = AllocationLedger::new();

    // Lower the arguments into flat slots.
    let mut args = Vec::new();
    {
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        let outcome = cx
            .lower_to_stack(&name_ty, &Value::String("component".into()), &mut args)
            .and_then(|_| cx.lower_to_stack(&times_ty, &Value::U32(3), &mut args));
        if let Err(err) = outcome {
            ledger.free_all(&mut allocator)?;
            return Err(err);
        }
    }
    ledger.reset();
    println!("flat arguments: {args:?}");

    // A real runtime would pass `args` to the guest export here; this
    // example plays the guest itself and writes the result into memory.
    let greeting = {
        let lift = LiftContext::new(&memory);
        let (name, consumed) = lift.lift_from_stack(&name_ty, &args)?;
        let (times, _) = lift.lift_from_stack(&times_ty, &args[consumed..])?;
        let (Value::String(name), Value::U32(times)) = (name, times) else {
            unreachable!("descriptors guarantee the shapes");
        };
        Value::List(
            (0..times)
                .map(|i| Value::String(format!("hello {name} #{i}")))
                .collect(),
        )
    };

    let ret_area = 512;
    {
        let mut cx = LowerContext::new(&mut memory, &mut allocator, &mut ledger);
        cx.store(&result_ty, &greeting, ret_area)?;
    }
    ledger.reset();

    // Back on the host side: lift the returned list.
    let result = LiftContext::new(&memory).load(&result_ty, ret_area)?;
    println!("lifted result: {result:?}");
    assert_eq!(result, greeting);
    Ok(())
}
