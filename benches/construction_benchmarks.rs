//! Benchmarks for type definition, instance construction and member dispatch.
//!
//! ```bash
//! cargo bench --bench construction_benchmarks
//! cargo bench --features profiling -- "construct"
//! ```

use std::hint::black_box;

use classweave::prelude::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn define_chain(system: &TypeSystem, depth: usize) -> TypeDescriptor {
    let mut ty = system
        .def(
            TypeBuilder::new("Level0")
                .field("value", 0)
                .method("value", 0, |this, _| Ok(this.fields().value("value")))
                .event("changed"),
        )
        .expect("Failed to define root level");
    for level in 1..depth {
        ty = system
            .def(
                TypeBuilder::new(format!("Level{}", level))
                    .extends(&ty)
                    .method(format!("m{}", level), 1, |_, args| Ok(args[0].clone())),
            )
            .expect("Failed to define level");
    }
    ty
}

fn bench_define(c: &mut Criterion) {
    let system = TypeSystem::new().expect("Failed to create type system");
    let mut group = c.benchmark_group("define");
    for depth in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| black_box(define_chain(&system, depth)))
        });
    }
    group.finish();
}

fn bench_construct(c: &mut Criterion) {
    let system = TypeSystem::new().expect("Failed to create type system");
    let args = Args::new().with("value", 1);
    let mut group = c.benchmark_group("construct");
    for depth in [1usize, 4, 16] {
        let ty = define_chain(&system, depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &ty, |b, ty| {
            b.iter(|| black_box(ty.new_instance(&args).expect("construct")))
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let system = TypeSystem::new().expect("Failed to create type system");
    let ty = define_chain(&system, 8);
    let obj = ty.new_instance(&Args::new()).expect("construct");
    obj.subscribe("changed", EventHandler::new(|_, _| Ok(())))
        .expect("subscribe");

    c.bench_function("dispatch/inherited_method", |b| {
        b.iter(|| black_box(obj.call("value", &[]).expect("call")))
    });
    c.bench_function("dispatch/raise_event", |b| {
        b.iter(|| obj.raise("changed", black_box(&Value::Null), None).expect("raise"))
    });
}

fn bench_using(c: &mut Criterion) {
    let mut system = TypeSystem::new().expect("Failed to create type system");
    let paths: Vec<String> = (0..8).map(|i| format!("app.module{}", i)).collect();
    for (i, path) in paths.iter().enumerate() {
        for j in 0..16 {
            system
                .define_in(path, TypeBuilder::new(format!("Type{}_{}", i, j)))
                .expect("define");
        }
    }

    c.bench_function("using/8_namespaces", |b| {
        b.iter(|| black_box(system.using(paths.as_slice()).expect("using")))
    });
}

criterion_group!(benches, bench_define, bench_construct, bench_dispatch, bench_using);
criterion_main!(benches);
