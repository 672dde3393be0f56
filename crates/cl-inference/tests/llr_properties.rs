//! End-to-end properties of the LLR engine.
//!
//! - zero signal: both sample sets and any observed LLR are identically zero
//! - closed-form observed LLR with a zero-background bin
//! - fixed seeds reproduce the generator output exactly, for any thread count
//! - 2D layouts give the same statistic as their row-major flattening
//! - delta PDFs collapse all quantiles onto one edge

use approx::assert_relative_eq;
use cl_core::{Error, Histogram1D, Histogram2D};
use cl_inference::{
    EmpiricalPdf, GeneratorConfig, generate_llr, llr_binning, observed_llr,
    observed_llrs_shared_background, quantiles,
};

fn hist(contents: &[f64]) -> Histogram1D {
    Histogram1D::with_unit_bins(contents.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Observed LLR
// ---------------------------------------------------------------------------

#[test]
fn observed_closed_form_with_zero_background_bin() {
    let b = hist(&[10.0, 0.0, 5.0]);
    let s = hist(&[2.0, 3.0, 1.0]);
    let data = hist(&[10.0, 0.0, 5.0]);

    let got = observed_llr(&b, &s, &data).unwrap();

    let bin0 = 2.0 * 2.0 - 2.0 * 10.0 * (1.0_f64 + 2.0 / 10.0).ln();
    let bin1 = 2.0 * 3.0;
    let bin2 = 2.0 * 1.0 - 2.0 * 5.0 * (1.0_f64 + 1.0 / 5.0).ln();
    assert_relative_eq!(got.value, bin0 + bin1 + bin2, epsilon = 1e-12);
}

#[test]
fn observed_zero_signal_independent_of_label() {
    let b = hist(&[8.0, 3.0, 0.5]);
    let data = hist(&[11.0, 1.0, 0.0]);
    let zero = hist(&[0.0, 0.0, 0.0]);
    let results = observed_llrs_shared_background(&b, &[zero.clone(), zero.clone(), zero], &data);
    let values: Vec<f64> = results.into_iter().map(|r| r.unwrap().value).collect();
    assert_eq!(values, vec![0.0, 0.0, 0.0]);
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[test]
fn zero_signal_sample_sets_coincide() {
    let b = hist(&[12.0, 7.0, 3.0, 0.0]);
    let s = hist(&[0.0, 0.0, 0.0, 0.0]);
    let cfg = GeneratorConfig::default().with_experiments(1000).with_seed(2024);
    let out = generate_llr(&b, &s, &cfg).unwrap();
    assert!(out.b_like.iter().all(|&v| v == 0.0));
    assert_eq!(out.b_like, out.sb_like);
    // With every sample equal there is nothing to bin.
    assert!(matches!(llr_binning(&out.b_like, &out.sb_like, 30), Err(Error::Degenerate(_))));
}

#[test]
fn fixed_seed_reproduces_output() {
    let b = hist(&[25.0, 14.0, 6.0, 2.0, 0.0]);
    let s = hist(&[1.0, 3.0, 5.0, 2.0, 1.0]);
    let cfg = GeneratorConfig::default().with_experiments(3000).with_seed(99);
    let first = generate_llr(&b, &s, &cfg).unwrap();
    let second = generate_llr(&b, &s, &cfg).unwrap();
    assert_eq!(first.b_like, second.b_like);
    assert_eq!(first.sb_like, second.sb_like);
}

#[test]
fn output_independent_of_thread_count() {
    let b = hist(&[25.0, 14.0, 6.0]);
    let s = hist(&[1.0, 3.0, 5.0]);
    let cfg = GeneratorConfig::default().with_experiments(1500).with_seed(5);

    let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let multi = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let a = single.install(|| generate_llr(&b, &s, &cfg).unwrap());
    let c = multi.install(|| generate_llr(&b, &s, &cfg).unwrap());
    assert_eq!(a.b_like, c.b_like);
    assert_eq!(a.sb_like, c.sb_like);
}

#[test]
fn unseeded_run_reports_its_seed() {
    let b = hist(&[9.0, 4.0]);
    let s = hist(&[2.0, 2.0]);
    let cfg = GeneratorConfig::default().with_experiments(400);
    let out = generate_llr(&b, &s, &cfg).unwrap();
    let replay = generate_llr(&b, &s, &cfg.clone().with_seed(out.seed)).unwrap();
    assert_eq!(out.b_like, replay.b_like);
    assert_eq!(out.sb_like, replay.sb_like);
}

#[test]
fn two_d_generator_matches_flattened_layout() {
    let x = vec![0.0, 10.0, 20.0, 30.0];
    let y = vec![0.0, 0.5, 1.0];
    let b2 = Histogram2D::new(
        x.clone(),
        y.clone(),
        vec![vec![9.0, 4.0], vec![0.0, 6.0], vec![2.0, 0.0]],
    )
    .unwrap();
    let s2 = Histogram2D::new(x, y, vec![vec![1.0, 0.5], vec![2.0, 1.0], vec![0.5, 0.0]]).unwrap();
    let cfg = GeneratorConfig::default().with_experiments(800).with_seed(31);

    let two = generate_llr(&b2, &s2, &cfg).unwrap();
    let one = generate_llr(&hist(b2.contents()), &hist(s2.contents()), &cfg).unwrap();
    assert_eq!(two.b_like, one.b_like);
    assert_eq!(two.sb_like, one.sb_like);
    assert_eq!(two.diagnostics.empty_bins, 800);
    assert_eq!(two.diagnostics.empty_bins, one.diagnostics.empty_bins);
}

// ---------------------------------------------------------------------------
// PDF / quantiles
// ---------------------------------------------------------------------------

#[test]
fn generated_pdfs_are_normalised() {
    let b = hist(&[30.0, 20.0, 10.0, 5.0]);
    let s = hist(&[2.0, 4.0, 4.0, 2.0]);
    for n in [1usize, 7, 250, 4000] {
        let cfg = GeneratorConfig::default().with_experiments(n).with_seed(n as u64);
        let out = generate_llr(&b, &s, &cfg).unwrap();
        let edges = match llr_binning(&out.b_like, &out.sb_like, 30) {
            Ok(e) => e,
            Err(Error::Degenerate(_)) => continue,
            Err(e) => panic!("unexpected error: {e}"),
        };
        for samples in [&out.b_like, &out.sb_like] {
            let pdf = EmpiricalPdf::from_samples(samples, &edges).unwrap();
            assert!((pdf.total() - 1.0).abs() < 1e-9, "n={n} total={}", pdf.total());
        }
    }
}

#[test]
fn delta_pdf_quantiles_equal_one_edge() {
    let edges: Vec<f64> = (0..=8).map(|i| -4.0 + i as f64).collect();
    for k in 1..8 {
        let mut density = vec![0.0; 8];
        density[k] = 1.0;
        let q = quantiles(&density, &edges).unwrap();
        let e = edges[k - 1];
        assert_eq!(q.as_nested(), (e, [e, e], [e, e]), "k={k}");
    }
}

#[test]
fn quantiles_of_generated_pdf_are_ordered() {
    let b = hist(&[40.0, 32.0, 25.0, 18.0, 12.0, 8.0]);
    let s = hist(&[1.0, 3.0, 6.0, 6.0, 3.0, 1.0]);
    let cfg = GeneratorConfig::default().with_experiments(5000).with_seed(17);
    let out = generate_llr(&b, &s, &cfg).unwrap();
    let edges = llr_binning(&out.b_like, &out.sb_like, 30).unwrap();
    let b_pdf = EmpiricalPdf::from_samples(&out.b_like, &edges).unwrap();
    let sb_pdf = EmpiricalPdf::from_samples(&out.sb_like, &edges).unwrap();
    let qb = b_pdf.quantiles().unwrap();
    let qsb = sb_pdf.quantiles().unwrap();
    assert!(qb.is_ordered());
    assert!(qsb.is_ordered());
    // Signal pulls -2lnQ down.
    assert!(qsb.median < qb.median);
}
