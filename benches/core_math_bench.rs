use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use dsl_graphs::api::{BitsGraph, Graph, GraphParams, SnrGraph};
use dsl_graphs::core::codec::encode_float_series;
use dsl_graphs::core::path_builders::{FillScale, build_fill_path};
use dsl_graphs::core::{BinDataset, BinSeries, Path, decode_series};
use dsl_graphs::render::ApproxTextMeasure;
use std::hint::black_box;

const BINS: usize = 8192;

fn synthetic_snr() -> Vec<f64> {
    (0..BINS)
        .map(|bin| {
            let t = bin as f64 / BINS as f64;
            (55.0 - 40.0 * t + 3.0 * (bin as f64 * 0.05).sin()).max(0.0)
        })
        .collect()
}

fn synthetic_dataset() -> Arc<BinDataset> {
    let snr = synthetic_snr();
    let mut data = BinDataset::default();
    data.bits.downstream = BinSeries::new(
        1,
        snr.iter().map(|value| Some((value / 3.0).floor().min(15.0))).collect(),
    );
    data.snr.downstream = BinSeries::new(1, snr.into_iter().map(Some).collect());
    Arc::new(data)
}

fn bench_decode_8k_series(c: &mut Criterion) {
    let encoded = encode_float_series(&synthetic_snr());

    c.bench_function("decode_8k_series", |b| {
        b.iter(|| {
            let _ = decode_series(black_box(&encoded));
        })
    });
}

fn bench_fill_path_8k(c: &mut Criterion) {
    let series = BinSeries::new(1, synthetic_snr().into_iter().map(Some).collect());
    let scale = FillScale {
        scale_y: 1.4,
        offset_y: 0.0,
        max_y: 65.0,
        valid_min: -32.0,
        valid_max: 95.0,
    };

    c.bench_function("fill_path_8k", |b| {
        b.iter(|| {
            let mut path = Path::with_precision(1);
            build_fill_path(&mut path, black_box(&series), scale);
            black_box(path);
        })
    });
}

fn bench_full_frames(c: &mut Criterion) {
    let data = synthetic_dataset();
    let params = GraphParams::default().with_size(1120, 228).with_scale_factor(2.0);

    c.bench_function("bits_frame_8k", |b| {
        let mut graph = BitsGraph::new(params, Some(Arc::clone(&data)));
        b.iter(|| {
            let _ = graph.build_frame(black_box(&ApproxTextMeasure));
        })
    });

    c.bench_function("snr_frame_8k", |b| {
        let mut graph = SnrGraph::new(params, Some(Arc::clone(&data)), None);
        b.iter(|| {
            let _ = graph.build_frame(black_box(&ApproxTextMeasure));
        })
    });
}

criterion_group!(
    benches,
    bench_decode_8k_series,
    bench_fill_path_8k,
    bench_full_frames
);
criterion_main!(benches);
