use criterion::{black_box, criterion_group, criterion_main, Criterion};

use popmap::data::{PopulationRecord, Year, YEARS};
use popmap::format::format_population;
use popmap::map::{LayerIndex, MapRenderer, Viewport};
use popmap::metrics::{compute_top_n, compute_world_totals, TOP_N};

/// Roughly the size of the real dataset
fn records() -> Vec<PopulationRecord> {
    (0..240u64)
        .map(|i| {
            YEARS.iter().fold(PopulationRecord::new(format!("Country {i}")), |r, y| {
                r.with(y.0, (i * 7_919 + y.0 as u64 * 13) % 1_500_000_000)
            })
        })
        .collect()
}

fn bench_metrics(c: &mut Criterion) {
    let records = records();
    c.bench_function("world_totals", |b| {
        b.iter(|| compute_world_totals(black_box(&records), &YEARS))
    });
    c.bench_function("top_n", |b| {
        b.iter(|| compute_top_n(black_box(&records), Year(2022), TOP_N))
    });
}

fn bench_format(c: &mut Criterion) {
    c.bench_function("format_population", |b| {
        b.iter(|| {
            for v in [0, 999, 12_345, 7_950_000, 1_402_112_000] {
                black_box(format_population(Some(black_box(v))));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut renderer = MapRenderer::new();
    popmap::data::basemap::generate_simple_world(&mut renderer);
    let viewport = Viewport::world(240, 160);
    let layer = LayerIndex::empty();
    c.bench_function("render_world", |b| {
        b.iter(|| renderer.render(120, 40, black_box(&viewport), &layer, None))
    });
}

criterion_group!(benches, bench_metrics, bench_format, bench_render);
criterion_main!(benches);
