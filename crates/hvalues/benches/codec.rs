// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Measures encoding and decoding of a value tree with a nested value, a
//! list and an index, for growing collection sizes. Decoding includes the
//! sentinel comparison that ends each collection scan.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hvalues::{
    decode, encode, Contract, ContractDecl, DescriptorRegistry, FlatMap, PrimitiveType, Scalar,
    ValueInstance,
};

struct Inventory;
struct Slot;

impl Contract for Inventory {
    fn declare() -> ContractDecl {
        ContractDecl::new()
            .primitive("site", PrimitiveType::Scalar(Scalar::String))
            .primitive("updated", PrimitiveType::Optional(Scalar::Date))
            .list::<Slot>("slots")
            .index::<Slot>("bySku", "sku")
    }
}

impl Contract for Slot {
    fn declare() -> ContractDecl {
        ContractDecl::new()
            .primitive("sku", PrimitiveType::Scalar(Scalar::String))
            .primitive("count", PrimitiveType::Scalar(Scalar::Int))
            .primitive("weights", PrimitiveType::Array(Scalar::Double))
    }
}

fn inventory(registry: &DescriptorRegistry, entries: usize) -> ValueInstance {
    let mut inv = registry.new_instance::<Inventory>().expect("resolve Inventory");
    inv.set("site", "warehouse-7").expect("site");
    for n in 0..entries {
        let mut slot = registry.new_instance::<Slot>().expect("resolve Slot");
        slot.set("sku", format!("SKU-{:05}", n)).expect("sku");
        slot.set("count", n as i32).expect("count");
        slot.set("weights", vec![0.5f64, 1.25, n as f64]).expect("weights");
        inv.list_mut("slots").expect("slots").push(slot.clone());
        inv.insert_indexed("bySku", slot).expect("bySku");
    }
    inv
}

fn bench_encode(c: &mut Criterion) {
    let registry = DescriptorRegistry::new();
    let mut group = c.benchmark_group("encode");
    for entries in [1usize, 16, 256] {
        let inv = inventory(&registry, entries);
        group.bench_with_input(BenchmarkId::from_parameter(entries), &inv, |b, inv| {
            b.iter(|| {
                let mut store = FlatMap::new();
                encode(black_box(inv), "", &mut store);
                store
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = DescriptorRegistry::new();
    let mut group = c.benchmark_group("decode");
    for entries in [1usize, 16, 256] {
        let mut store = FlatMap::new();
        encode(&inventory(&registry, entries), "", &mut store);
        group.bench_with_input(BenchmarkId::from_parameter(entries), &store, |b, store| {
            b.iter(|| {
                let mut inv = registry.new_instance::<Inventory>().expect("resolve Inventory");
                decode(black_box(store), "", &mut inv).expect("decode");
                inv
            });
        });
    }
    group.finish();
}

fn bench_resolve_cached(c: &mut Criterion) {
    let registry = DescriptorRegistry::new();
    registry.resolve::<Inventory>().expect("resolve Inventory");
    c.bench_function("resolve_cached", |b| {
        b.iter(|| registry.resolve::<Inventory>().expect("cached"));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_resolve_cached);
criterion_main!(benches);
