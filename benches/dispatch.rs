//! Benchmarks for call dispatch.
//!
//! Compares the cost of calling an operation:
//! - on an unwoven instance (direct call to the original)
//! - on a woven instance whose advice chain is cached
//! - on a woven operation no advice matches (cached empty chain)
//! - on a woven instance whose chain is dropped before every call

extern crate crosscut;

use criterion::{criterion_group, criterion_main, Criterion};
use crosscut::{Aspect, Class, Registry, Value};
use std::{hint::black_box, sync::Arc};

fn class() -> Arc<Class> {
    Class::builder("Bench")
        .operation("x", |_this, _args, _block| Ok(Value::from(1)))
        .operation("y", |_this, _args, _block| Ok(Value::from(2)))
        .build()
}

fn passthrough(name: &str) -> Arc<Aspect> {
    Aspect::builder(name)
        .register("pass", "x", |target| target.proceed())
        .build()
}

fn bench_unwoven(c: &mut Criterion) {
    let instance = Registry::new().instantiate(&class(), ());

    c.bench_function("dispatch_unwoven", |b| {
        b.iter(|| black_box(instance.call(black_box("x"), vec![]).unwrap()));
    });
}

fn bench_woven_cached(c: &mut Criterion) {
    let registry = Registry::new();
    let class = class();
    for name in ["a", "b", "c"] {
        registry.apply(&class, passthrough(name)).unwrap();
    }
    let instance = registry.instantiate(&class, ());

    c.bench_function("dispatch_woven_three_layers", |b| {
        b.iter(|| black_box(instance.call(black_box("x"), vec![]).unwrap()));
    });
    c.bench_function("dispatch_woven_unmatched", |b| {
        b.iter(|| black_box(instance.call(black_box("y"), vec![]).unwrap()));
    });
}

fn bench_woven_uncached(c: &mut Criterion) {
    let registry = Registry::new();
    let class = class();
    for name in ["a", "b", "c"] {
        registry.apply(&class, passthrough(name)).unwrap();
    }
    let instance = registry.instantiate(&class, ());

    c.bench_function("dispatch_woven_resolve_every_call", |b| {
        b.iter(|| {
            registry.invalidate(&class, "x");
            black_box(instance.call(black_box("x"), vec![]).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_unwoven,
    bench_woven_cached,
    bench_woven_uncached
);
criterion_main!(benches);
