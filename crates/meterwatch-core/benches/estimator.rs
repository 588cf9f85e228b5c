use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meterwatch_core::{estimate, ingest, Sample, Series, SeriesWindow, SignalGenerator};

fn full_window() -> Series {
    Series::from_history(
        SignalGenerator::new(42, 0.0).take(200),
        SeriesWindow::default(),
    )
}

fn bench_estimate(c: &mut Criterion) {
    let series = full_window();
    c.bench_function("estimate_200_no_crossing", |b| {
        b.iter(|| estimate(black_box(series.as_slice()), black_box(1_000.0), black_box(0.0)))
    });
    c.bench_function("estimate_200_early_crossing", |b| {
        b.iter(|| estimate(black_box(series.as_slice()), black_box(60.0), black_box(0.0)))
    });
}

fn bench_ingest(c: &mut Criterion) {
    c.bench_function("ingest_full_window", |b| {
        let mut series = full_window();
        let mut t = 200.0;
        b.iter(|| {
            t += 1.0;
            series = ingest(std::mem::take(&mut series), Sample::new(t, 50.0));
        })
    });
}

criterion_group!(benches, bench_estimate, bench_ingest);
criterion_main!(benches);
