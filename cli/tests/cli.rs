use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
analysis:
  confidence_level: 0.95
  initial_investment: 1000000
  num_simulations: 2000
  weights:
    AAPL: 0.6
    MSFT: 0.4
data:
  range:
    start: 2024-01-01
    end: 2024-06-30
  sources:
    - type: csv
      files:
        AAPL: missing/AAPL.csv
        MSFT: missing/MSFT.csv
    - type: synthetic
      seed: 7
      assets:
        AAPL:
          initial_price: 180.0
        MSFT:
          initial_price: 370.0
          volatility: 0.015
"#;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, CONFIG).unwrap();
    path
}

#[test]
fn test_text_report_from_fallback_source() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = Command::cargo_bin("ag-var")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("HISTORICAL VAR"));
    assert!(stdout.contains("Price Source: synthetic"));
    assert!(stdout.contains("COMPARISON"));
    assert!(stdout.contains("Asset Returns Statistics"));
}

#[test]
fn test_json_report_written_to_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let report = dir.path().join("report.json");

    Command::cargo_bin("ag-var")
        .unwrap()
        .args(["--format", "json", "--output"])
        .arg(&report)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let contents = fs::read_to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["source"], "synthetic");
    assert!(value["asset_summaries"]["AAPL"]["count"].as_u64().unwrap() > 100);
    assert!(value["asset_summaries"]["MSFT"]["std_dev"].as_f64().unwrap() > 0.0);
    assert_eq!(value["report"]["entries"].as_array().unwrap().len(), 3);
    assert!(value["report"]["entries"][0]["var_fraction"].as_f64().unwrap() < 0.0);
}

#[test]
fn test_missing_config_fails() {
    Command::cargo_bin("ag-var")
        .unwrap()
        .args(["--config", "/nonexistent/config.yaml"])
        .assert()
        .failure();
}
