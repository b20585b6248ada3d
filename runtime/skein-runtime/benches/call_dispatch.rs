use criterion::{Criterion, black_box, criterion_group, criterion_main};
use skein_obj_model::builders::{ClassBuilder, FuncBuilder, instance};
use skein_obj_model::{Ctx, Value};
use skein_runtime::{call_method, call_value, call_value0};

fn bench_function_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_dispatch");
    let mut ctx = Ctx::new();

    let nullary = FuncBuilder::new("nop", |_ctx, _frame| Ok(Value::None)).build();
    group.bench_function("function0", |b| {
        b.iter(|| black_box(call_value0(&mut ctx, &nullary)));
    });

    let binary = FuncBuilder::new("add", |_ctx, frame| {
        Ok(Value::from_int(
            frame[0].as_int().unwrap_or(0) + frame[1].as_int().unwrap_or(0),
        ))
    })
    .params(&["a", "b"])
    .build();
    let args = [Value::from_int(1), Value::from_int(2)];
    group.bench_function("function2", |b| {
        b.iter(|| black_box(call_value(&mut ctx, &binary, &args)));
    });

    let defaulted = FuncBuilder::new("scale", |_ctx, frame| {
        Ok(Value::from_int(
            frame[0].as_int().unwrap_or(0) * frame[1].as_int().unwrap_or(1),
        ))
    })
    .params(&["x", "k"])
    .defaults(vec![Value::from_int(2)])
    .build();
    let one = [Value::from_int(21)];
    group.bench_function("function_defaults", |b| {
        b.iter(|| black_box(call_value(&mut ctx, &defaulted, &one)));
    });
    group.finish();
}

fn bench_method_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_dispatch");
    let mut ctx = Ctx::new();

    let step = FuncBuilder::new("step", |_ctx, frame| {
        Ok(Value::from_int(frame[1].as_int().unwrap_or(0) + 1))
    })
    .params(&["self", "x"])
    .build();
    let cls = ClassBuilder::new("Stepper").set("step", step).build();
    let inst = instance(&cls);
    let args = [Value::from_int(5)];
    group.bench_function("fused_method", |b| {
        b.iter(|| black_box(call_method(&mut ctx, &inst, "step", &args)));
    });

    let call = FuncBuilder::new("__call__", |_ctx, frame| {
        Ok(Value::from_int(frame[1].as_int().unwrap_or(0) - 1))
    })
    .params(&["self", "x"])
    .build();
    let callable_cls = ClassBuilder::new("Dec").set("__call__", call).build();
    let callable = instance(&callable_cls);
    group.bench_function("callable_instance", |b| {
        b.iter(|| black_box(call_value(&mut ctx, &callable, &args)));
    });
    group.finish();
}

criterion_group!(call_dispatch_benches, bench_function_dispatch, bench_method_fusion);
criterion_main!(call_dispatch_benches);
