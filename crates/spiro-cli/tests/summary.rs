use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::{error::Error, path::PathBuf};

#[test]
fn summary_reports_ramp_plateau_metrics() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("spiro");
    cmd.args([
        "summary",
        "--input",
        &sample_path("test_data/ramp_plateau.txt"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&output)?;

    assert_eq!(report["sample_count"].as_u64(), Some(1000));
    assert_eq!(report["onset_index"].as_u64(), Some(5));
    let metrics = &report["metrics"];
    assert_close(metrics["pef"].as_f64().unwrap_or_default(), 10.0, 1e-12);
    // Flow never drops back under 0.05 L/s, so the blow runs to the last sample.
    assert_eq!(metrics["end_index"].as_u64(), Some(999));
    assert_close(
        metrics["blow_duration"].as_f64().unwrap_or_default(),
        994.0 * 0.005,
        1e-9,
    );
    assert_close(metrics["fef25_75"].as_f64().unwrap_or_default(), 10.0, 1e-6);
    assert!(report.get("coarse").is_none());
    Ok(())
}

#[test]
fn summary_reads_csv_column_and_config() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("spiro");
    cmd.args([
        "summary",
        "--input",
        &sample_path("test_data/capture.csv"),
        "--csv-column",
        "voltage",
        "--config",
        &sample_path("test_data/pipeline.toml"),
        "--baseline",
        "0.0",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&output)?;

    // gain 4 from the config file, baseline overridden to 0.
    assert_close(report["metrics"]["pef"].as_f64().unwrap_or_default(), 40.0, 1e-9);
    let coarse = &report["coarse"];
    assert_eq!(coarse["flow"].as_array().map(Vec::len), Some(500));
    assert_close(coarse["rate_hz"].as_f64().unwrap_or_default(), 100.0, 0.0);
    Ok(())
}

#[test]
fn metrics_only_prints_flat_metric_set() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("spiro");
    cmd.args(["summary", "--metrics-only"])
        .write_stdin("0\n0\n0\n0\n0\n0\n0\n0\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let metrics: Value = serde_json::from_slice(&output)?;

    assert_eq!(metrics["fvc"].as_f64(), Some(0.0));
    // Degenerate mid-expiratory window serialises as null.
    assert!(metrics["fef25_75"].is_null());
    Ok(())
}

#[test]
fn summary_rejects_non_integer_decimation() {
    let mut cmd = cargo_bin_cmd!("spiro");
    cmd.args([
        "summary",
        "--input",
        &sample_path("test_data/ramp_plateau.txt"),
        "--source-rate",
        "200",
        "--target-rate",
        "150",
    ]);
    cmd.assert().failure();
}

#[test]
fn summary_rejects_non_numeric_input() {
    let mut cmd = cargo_bin_cmd!("spiro");
    cmd.arg("summary").write_stdin("0.1\nnot-a-number\n");
    cmd.assert().failure();
}

fn assert_close(a: f64, b: f64, tol: f64) {
    let diff = (a - b).abs();
    assert!(
        diff <= tol,
        "diff {} exceeded tol {} ({} vs {})",
        diff,
        tol,
        a,
        b
    );
}

fn sample_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative)
        .to_string_lossy()
        .to_string()
}
