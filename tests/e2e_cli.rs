
use assert_cmd::prelude::*;
use cli_helpers::{base_cmd, read_json, run_cmd, run_cmd_json, write_config};
use predicates::prelude::*;
use tempfile::TempDir;

const TWO_HOLDINGS: &str = r##"
currency = "USD"

[[platforms]]
id = "demo"
display_name = "Demo"
color = "#336699"

[[platforms.holdings]]
ticker = "AAA"
weight = 0.75
display_name = "Alpha Fund"
currency = "USD"
sample = { base_price = 50.0, annual_return = 0.10, volatility = 0.02 }

[[platforms.holdings]]
ticker = "BBB"
weight = 0.25
display_name = "Beta Fund"
currency = "USD"
"##;

#[test]
fn offline_fetch_writes_default_report_and_table() {
    let workdir = TempDir::new().unwrap();

    base_cmd(&workdir)
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Racional"))
        .stdout(predicate::str::contains("Fintual"))
        .stdout(predicate::str::contains("QQQM"))
        .stdout(predicate::str::contains("Report written to data/latest.json"))
        .stdout(predicate::str::contains("\u{001b}[").not());

    let report = read_json(&workdir.path().join("data").join("latest.json")).unwrap();
    assert_eq!(report["source"]["provider"], "offline_sample");
    assert_eq!(report["currency"], "USD");
    assert_eq!(report["platforms"].as_array().unwrap().len(), 2);
    assert_eq!(
        report["charts"]["timeseries_5y"]["datasets"].as_array().unwrap().len(),
        14
    );
    assert_eq!(
        report["charts"]["timeseries_5y"]["labels"].as_array().unwrap().len(),
        1825
    );
    for platform in report["platforms"].as_array().unwrap() {
        for holding in platform["holdings"].as_array().unwrap() {
            assert!(holding.get("status").is_none(), "{} has status", holding["ticker"]);
            assert_eq!(holding["series"]["normalized_5y"][0]["value"], 100.0);
        }
    }
}

#[test]
fn fetch_then_validate_round_trip() {
    let workdir = TempDir::new().unwrap();
    run_cmd(&workdir, &["fetch", "--output", "out/report.json"]).unwrap();

    base_cmd(&workdir)
        .args(["validate", "out/report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passes structure validation"));

    let value = run_cmd_json(&workdir, &["--json", "validate", "out/report.json"]).unwrap();
    assert_eq!(value["valid"], true);
}

#[test]
fn fetch_to_stdout_emits_only_the_report() {
    let workdir = TempDir::new().unwrap();
    let config = write_config(&workdir, TWO_HOLDINGS);

    let report = run_cmd_json(
        &workdir,
        &["fetch", "--output", "-", "--config", config.to_str().unwrap()],
    )
    .unwrap();

    let platform = &report["platforms"][0];
    assert_eq!(platform["id"], "demo");
    assert_eq!(platform["summary"]["total_weight"], 1.0);
    assert!(platform["summary"]["avg_return_1y"].is_number());
    assert_eq!(platform["holdings"][0]["display_name"], "Alpha Fund");
    assert_eq!(
        report["charts"]["timeseries_5y"]["datasets"][1]["backgroundColor"],
        "rgba(51, 102, 153, 0.15)"
    );
    assert!(!workdir.path().join("data").exists());
}

#[test]
fn fetch_json_summary() {
    let workdir = TempDir::new().unwrap();
    let summary = run_cmd_json(&workdir, &["--json", "fetch", "-o", "r.json"]).unwrap();
    assert_eq!(summary["output"], "r.json");
    assert_eq!(summary["provider"], "offline_sample");
    assert_eq!(summary["holdings"], 14);
    assert_eq!(summary["missing"], 0);
    assert!(workdir.path().join("r.json").exists());
}

#[test]
fn config_from_environment_variable() {
    let workdir = TempDir::new().unwrap();
    let config = write_config(&workdir, TWO_HOLDINGS);

    base_cmd(&workdir)
        .env("TRACKER_CONFIG", &config)
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 platform(s), 2 holding(s)"))
        .stdout(predicate::str::contains("Alpha Fund"));
}

#[test]
fn invalid_config_is_rejected_before_fetching() {
    let workdir = TempDir::new().unwrap();
    let duplicated = TWO_HOLDINGS.replace("ticker = \"BBB\"", "ticker = \"AAA\"");
    let config = write_config(&workdir, &duplicated);

    base_cmd(&workdir)
        .args(["fetch", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate ticker 'AAA'"));

    assert!(!workdir.path().join("data").exists());
}

#[test]
fn validate_reports_structure_errors() {
    let workdir = TempDir::new().unwrap();
    let path = workdir.path().join("bad.json");
    std::fs::write(&path, r#"{"generated_at": 5, "currency": "USD"}"#).unwrap();

    base_cmd(&workdir)
        .args(["validate", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generated_at must be a string"))
        .stderr(predicate::str::contains("missing required key: platforms"));
}

#[test]
fn validate_missing_file_fails() {
    let workdir = TempDir::new().unwrap();
    base_cmd(&workdir)
        .args(["validate", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn platforms_json_lists_embedded_table() {
    let workdir = TempDir::new().unwrap();
    let value = run_cmd_json(&workdir, &["--json", "platforms"]).unwrap();
    let ids: Vec<_> = value["platforms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["racional", "fintual"]);
    assert_eq!(value["currency"], "USD");
}
