use criterion::{Criterion, criterion_group, criterion_main};
use datavis3d_rs::core::{
    Axis, AxisOrientation, BarDataProxy, LabelFormatCache, LogValueAxisFormatter, Series,
};
use datavis3d_rs::render::NullBackend;
use datavis3d_rs::{GraphConfig, GraphController, GraphKind};
use std::hint::black_box;

fn bench_value_formatter_recalculate(c: &mut Criterion) {
    c.bench_function("value_formatter_recalculate_64x8", |b| {
        let mut axis = Axis::value();
        axis.set_segment_count(64);
        axis.set_sub_segment_count(8);
        let mut max = 100.0f32;
        b.iter(|| {
            max += 1.0;
            axis.set_range(0.0, black_box(max));
            let _ = axis.labels();
        })
    });
}

fn bench_log_formatter_recalculate(c: &mut Criterion) {
    c.bench_function("log_formatter_recalculate_decades", |b| {
        let mut axis = Axis::value();
        axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
        let mut max = 1.0e6f32;
        b.iter(|| {
            max *= 1.0001;
            axis.set_range(1.0, black_box(max));
            let _ = axis.labels();
        })
    });
}

fn bench_label_format_cache(c: &mut Criterion) {
    let mut cache = LabelFormatCache::default();
    c.bench_function("label_format_cached_1k", |b| {
        b.iter(|| {
            for index in 0..1_000 {
                let _ = cache.format(black_box("%.3f units"), f64::from(index) * 0.25);
            }
        })
    });
}

fn bench_bar_sync_pass(c: &mut Criterion) {
    let mut graph = GraphController::new(NullBackend::new(), GraphConfig::new(GraphKind::Bars))
        .expect("engine init");
    let rows: Vec<Vec<f32>> = (0..100)
        .map(|row| (0..100).map(|column| (row * column) as f32 * 0.01).collect())
        .collect();
    for _ in 0..4 {
        let proxy = BarDataProxy::from_rows(rows.clone()).expect("finite rows");
        let id = graph.create_series(Series::bar(proxy));
        graph.add_series(id).expect("bar series fits a bar graph");
    }
    graph.synchronize().expect("initial sync");
    let first = graph.series_list()[0];

    c.bench_function("bar_sync_pass_4x100x100", |b| {
        let mut value = 0.0f32;
        b.iter(|| {
            value += 0.5;
            graph
                .series_mut(first)
                .and_then(Series::bar_proxy_mut)
                .expect("bar proxy")
                .set_value(0, 0, black_box(value))
                .expect("in range");
            let report = graph.synchronize().expect("sync");
            black_box(report);
        })
    });

    let y = graph.render_state().axis(AxisOrientation::Y).map(|axis| axis.max());
    black_box(y);
}

criterion_group!(
    benches,
    bench_value_formatter_recalculate,
    bench_log_formatter_recalculate,
    bench_label_format_cache,
    bench_bar_sync_pass
);
criterion_main!(benches);
