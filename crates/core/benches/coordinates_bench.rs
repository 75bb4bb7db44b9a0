mod common;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use unifex_core::{CoordinateUnit, Document};

use common::{XorShift64, bench_config, blocks_throughput, configure_group, synthetic_page};

fn bench_convert_document(c: &mut Criterion) {
    let cfg = bench_config();
    let mut rng = XorShift64::new(cfg.seed);
    let words = cfg.tier.words_per_page();
    let pages = (0..16).map(|n| synthetic_page(&mut rng, n, words)).collect();
    let doc = Document::new("bench.pdf", pages);

    let mut group = c.benchmark_group("convert_document");
    configure_group(&mut group, &cfg);
    group.throughput(blocks_throughput(words * doc.pages.len()));

    for (target, dpi) in [
        (CoordinateUnit::Pixels, Some(300.0)),
        (CoordinateUnit::Inches, None),
        (CoordinateUnit::Normalized, None),
    ] {
        group.bench_with_input(BenchmarkId::new("to", target), &doc, |b, doc| {
            b.iter(|| black_box(doc.convert(target, dpi).expect("convert").pages.len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convert_document);
criterion_main!(benches);
