use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use inheritmap::hierarchy::registry::MemberDef;
use inheritmap::{
    build_hierarchy, BuildOptions, SimilarityEngine, SimilarityMethod, TypeDef, TypeRegistry,
};
use std::collections::BTreeMap;
use std::hint::black_box;

fn source(variant: usize, statements: usize) -> String {
    let mut src = String::from("def handle(self, request):\n");
    for i in 0..statements {
        if i % 7 == variant % 7 {
            src.push_str(&format!("    value_{i} = request.field_{variant} + {i}\n"));
        } else {
            src.push_str(&format!("    value_{i} = request.field_{i} * 2\n"));
        }
    }
    src.push_str("    return value_0\n");
    src
}

fn sources(count: usize, statements: usize) -> BTreeMap<usize, String> {
    (1..=count).map(|id| (id, source(id, statements))).collect()
}

/// Wide tree: one root with `fanout` children, each with `fanout` children
fn wide_registry(fanout: usize) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    let root = TypeDef::new("bench", "Root").member(
        "handle",
        MemberDef::new("root.py", 1).source(source(0, 10)),
    );
    // registering the fixed tree shape cannot collide
    registry.register(root).unwrap();
    for i in 0..fanout {
        let mid = format!("Mid{i}");
        let handle = MemberDef::new("mid.py", i as u32 + 1).source(source(i, 10));
        registry
            .register(
                TypeDef::new("bench", mid.clone())
                    .parent("bench.Root")
                    .member("handle", handle),
            )
            .unwrap();
        for j in 0..fanout {
            let leaf = TypeDef::new("bench", format!("Leaf{i}_{j}")).parent(format!("bench.{mid}"));
            registry.register(leaf).unwrap();
        }
    }
    registry
}

fn bench_permute(c: &mut Criterion) {
    let engine = SimilarityEngine::new(SimilarityMethod::Permute);
    let mut group = c.benchmark_group("permute");
    for count in [4, 16, 32] {
        let input = sources(count, 20);
        group.bench_with_input(BenchmarkId::new("sources", count), &input, |b, input| {
            b.iter(|| engine.permute(black_box(input)))
        });
    }
    group.finish();
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");
    for fanout in [10, 30] {
        let registry = wide_registry(fanout);
        group.bench_with_input(BenchmarkId::new("fanout", fanout), &registry, |b, registry| {
            b.iter(|| build_hierarchy(registry, "bench.Root", BuildOptions::tracking("handle")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_permute, bench_discovery);
criterion_main!(benches);
