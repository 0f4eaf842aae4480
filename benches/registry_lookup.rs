// Run with: cargo bench --bench registry_lookup

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use toolhub_core::features::{handler_for, registry};
use toolhub_core::registry::{ToolKey, ToolRegistry, CATEGORIES, DEFAULT_TOOL};

fn benchmark_registry(c: &mut Criterion) {
    c.bench_function("registry_build", |b| {
        b.iter(|| {
            let reg = ToolRegistry::build(black_box(CATEGORIES), DEFAULT_TOOL, handler_for);
            black_box(reg.len());
        })
    });

    let reg = registry();
    c.bench_function("resolve_every_key", |b| {
        b.iter(|| {
            for key in ToolKey::ALL {
                black_box(reg.resolve(*key));
            }
        })
    });

    c.bench_function("key_from_string", |b| {
        b.iter(|| black_box(ToolKey::from_key(black_box("spotifyDownloader"))))
    });
}

criterion_group!(benches, benchmark_registry);
criterion_main!(benches);
