use cl_core::{Histogram1D, Histogram2D};
use cl_inference::{AnalysisConfig, GeneratorConfig, SignalHypothesis, generate_llr, run_shared_background};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn falling_background(n: usize) -> Vec<f64> {
    (0..n).map(|i| 80.0 * (-(i as f64) / n as f64 * 3.0).exp()).collect()
}

fn peaked_signal(n: usize) -> Vec<f64> {
    let mid = n as f64 / 2.0;
    (0..n).map(|i| 6.0 * (-((i as f64 - mid) / 3.0).powi(2)).exp()).collect()
}

fn bench_generate_1d_bin_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator/1d/n_bins");
    let cfg = GeneratorConfig::default().with_seed(42);
    for n_bins in [10usize, 50, 200] {
        let b = Histogram1D::with_unit_bins(falling_background(n_bins)).unwrap();
        let s = Histogram1D::with_unit_bins(peaked_signal(n_bins)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n_bins), &(b, s), |bench, (b, s)| {
            bench.iter(|| {
                let out = generate_llr(black_box(b), black_box(s), &cfg).unwrap();
                black_box(out.b_like.len());
            });
        });
    }
    group.finish();
}

fn bench_generate_2d(c: &mut Criterion) {
    let (nx, ny) = (20usize, 20usize);
    let x: Vec<f64> = (0..=nx).map(|i| i as f64).collect();
    let y: Vec<f64> = (0..=ny).map(|i| i as f64 * 0.1).collect();
    let b = Histogram2D::from_flat(x.clone(), y.clone(), falling_background(nx * ny)).unwrap();
    let s = Histogram2D::from_flat(x, y, peaked_signal(nx * ny)).unwrap();
    let cfg = GeneratorConfig::default().with_seed(7);

    c.bench_function("generator/2d/20x20", |bench| {
        bench.iter(|| {
            let out = generate_llr(black_box(&b), black_box(&s), &cfg).unwrap();
            black_box(out.sb_like.len());
        });
    });
}

fn bench_three_mass_points(c: &mut Criterion) {
    let b = Histogram1D::with_unit_bins(falling_background(40)).unwrap();
    let hyps: Vec<_> = [85.0, 90.0, 95.0]
        .iter()
        .map(|&m| SignalHypothesis {
            label: format!("m{m}"),
            mass_gev: Some(m),
            signal: Histogram1D::with_unit_bins(peaked_signal(40)).unwrap(),
        })
        .collect();
    let cfg = AnalysisConfig {
        generator: GeneratorConfig::default().with_seed(1),
        ..Default::default()
    };

    c.bench_function("analysis/shared_background/3_hypotheses", |bench| {
        bench.iter(|| black_box(run_shared_background(&b, &b, &hyps, &cfg)).len());
    });
}

criterion_group!(benches, bench_generate_1d_bin_scaling, bench_generate_2d, bench_three_mass_points);
criterion_main!(benches);
