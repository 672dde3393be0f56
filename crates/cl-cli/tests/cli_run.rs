use std::path::PathBuf;
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_countllr"))
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let out = run(args);
    assert!(
        out.status.success(),
        "{:?} should succeed, stderr={}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON")
}

fn tmp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("countllr_cli_{}_{}", std::process::id(), name))
}

#[test]
fn run_contract_shared_background() {
    let input = fixture_path("lep_higgs_1d.json");
    assert!(input.exists(), "missing fixture: {}", input.display());

    let v = run_json(&[
        "run",
        "--input",
        input.to_string_lossy().as_ref(),
        "--n-experiments",
        "2000",
        "--seed",
        "7",
        "--threads",
        "1",
    ]);

    assert_eq!(v["mode"], "shared_background");
    assert_eq!(v["n_experiments"], 2000);
    assert_eq!(v["seed"], 7);
    let hyps = v["hypotheses"].as_array().expect("hypotheses should be array");
    assert_eq!(hyps.len(), 3);
    for h in hyps {
        assert_eq!(h["status"], "completed", "{h}");
        assert!(h.get("b_like").is_none(), "samples are dropped by default");
        assert_eq!(h["edges"].as_array().unwrap().len(), 30);
        let c = &h["confidence"];
        for key in ["one_minus_clb", "clsb", "clb", "cls"] {
            let p = c[key].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&p), "{key} = {p}");
        }
        let q = &h["b_like_quantiles"];
        assert!(q["two_sigma"][0].as_f64().unwrap() <= q["median"].as_f64().unwrap());
    }
    assert_eq!(hyps[1]["label"], "mH=90");
    assert_eq!(hyps[1]["mass_gev"], 90.0);
}

#[test]
fn run_is_independent_of_thread_count() {
    let input = fixture_path("lep_higgs_1d.json");
    let input = input.to_string_lossy();
    let common = ["run", "--input", input.as_ref(), "--n-experiments", "1000", "--seed", "3"];

    let with_threads = |n: &'static str| {
        let mut args = common.to_vec();
        args.extend(["--threads", n]);
        run_json(&args)
    };
    let one = with_threads("1");
    let four = with_threads("4");
    assert_eq!(one["hypotheses"], four["hypotheses"]);
}

#[test]
fn generate_matches_batch_samples() {
    let input = fixture_path("lep_higgs_1d.json");
    let input = input.to_string_lossy();

    let batch = run_json(&[
        "run",
        "--input",
        input.as_ref(),
        "--n-experiments",
        "300",
        "--seed",
        "5",
        "--include-samples",
    ]);
    let single = run_json(&[
        "generate",
        "--input",
        input.as_ref(),
        "--n-experiments",
        "300",
        "--seed",
        "5",
        "--hypothesis",
        "1",
    ]);

    assert_eq!(single["label"], "mH=90");
    assert_eq!(single["n_experiments"], 300);
    assert_eq!(single["b_like"].as_array().unwrap().len(), 300);
    assert_eq!(single["b_like"], batch["hypotheses"][1]["b_like"]);
    assert_eq!(single["sb_like"], batch["hypotheses"][1]["sb_like"]);
    assert_eq!(single["seed"], batch["hypotheses"][1]["seed"]);
    assert_eq!(single["diagnostics"]["n_experiments"], 300);
}

#[test]
fn generate_rejects_bad_index() {
    let input = fixture_path("lep_higgs_1d.json");
    let out = run(&["generate", "--input", input.to_string_lossy().as_ref(), "--hypothesis", "3"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("out of range"));
}

#[test]
fn run_per_hypothesis_and_two_d_inputs() {
    let per_mass = fixture_path("lep_higgs_per_mass.json");
    let v = run_json(&["run", "--input", per_mass.to_string_lossy().as_ref(), "--n-experiments", "2000"]);
    assert_eq!(v["mode"], "per_hypothesis");
    assert_eq!(v["hypotheses"].as_array().unwrap().len(), 3);

    let two_d = fixture_path("lep_higgs_2d.json");
    let v = run_json(&["run", "--input", two_d.to_string_lossy().as_ref(), "--n-experiments", "2000"]);
    assert_eq!(v["mode"], "shared_background");
    for h in v["hypotheses"].as_array().unwrap() {
        assert_eq!(h["status"], "completed", "{h}");
        assert_eq!(h["diagnostics"]["bins_per_experiment"], 12);
    }
}

#[test]
fn mixed_input_modes_are_rejected() {
    let path = tmp_path("mixed.json");
    let h = r#"{"edges": [0, 1, 2], "contents": [4.0, 2.0]}"#;
    let doc = format!(
        r#"{{"background": {h}, "data": {h},
            "hypotheses": [{{"label": "m1", "signal": {h}, "background": {h}, "data": {h}}}]}}"#
    );
    std::fs::write(&path, doc).unwrap();

    let out = run(&["run", "--input", path.to_string_lossy().as_ref()]);
    let _ = std::fs::remove_file(&path);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("one mode or the other"));
}

#[test]
fn observed_contract() {
    let input = fixture_path("lep_higgs_1d.json");
    let out_path = tmp_path("observed.json");
    let out = run(&[
        "observed",
        "--input",
        input.to_string_lossy().as_ref(),
        "--output",
        out_path.to_string_lossy().as_ref(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&out_path).unwrap()).unwrap();
    let _ = std::fs::remove_file(&out_path);
    let hyps = v["hypotheses"].as_array().unwrap();
    assert_eq!(hyps.len(), 3);
    for h in hyps {
        assert_eq!(h["status"], "completed");
        assert!(h["observed"].as_f64().unwrap().is_finite());
    }
}

#[test]
fn version_prints_name() {
    let out = run(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("countllr "));
}

#[test]
fn warnings_go_to_stderr_not_stdout() {
    // Zero-background bin with signal and counts, and data far below the generated range.
    let input = fixture_path("zero_background_out_of_range.json");
    assert!(input.exists(), "missing fixture: {}", input.display());
    let input = input.to_string_lossy();

    let out = run(&["run", "--input", input.as_ref(), "--n-experiments", "2000", "--seed", "9"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("below the generated range"), "stderr={stderr}");
    assert!(stderr.contains("no background"), "stderr={stderr}");
    assert!(stderr.contains("zero-background bins had nonzero pseudo-counts"), "stderr={stderr}");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout should be pure JSON");
    let h = &v["hypotheses"][0];
    assert_eq!(h["status"], "completed", "{h}");
    let c = &h["confidence"];
    assert_eq!(c["out_of_range"], true);
    assert_eq!(c["position"], 0);
    let one_minus_clb = c["one_minus_clb"].as_f64().unwrap();
    assert!(one_minus_clb == 0.0 && one_minus_clb.is_sign_positive(), "{c}");
    assert!(c["significance"].as_f64().is_some_and(f64::is_finite), "{c}");
    assert_eq!(h["observed"]["ignored_counts"].as_array().unwrap().len(), 1);

    let out = run(&["observed", "--input", input.as_ref()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no background"));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout should be pure JSON");
    assert_eq!(v["hypotheses"][0]["ignored_counts"].as_array().unwrap().len(), 1);

    let out = run(&["viz", "llr", "--input", input.as_ref(), "--n-experiments", "2000"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout should be pure JSON");
    assert_eq!(v["panels"][0]["observed_in_range"], false);
}
