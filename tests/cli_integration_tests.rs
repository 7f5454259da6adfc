//! Integration tests for the phonestat binary

mod utils;

use predicates::prelude::*;
use utils::{Fixtures, OUTLIER_CSV, SINGLE_REPLY_CSV, UNMAPPABLE_CSV};

#[test]
fn test_text_report_single_reply() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("response times (1 pairs)"))
        .stdout(predicate::str::contains("average 300.0s"))
        .stdout(predicate::str::contains("555-1234"));
}

#[test]
fn test_json_report_parses() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--format").arg("json").arg(&input);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["format"], "phonestat-json-v1");
    assert_eq!(parsed["summary"]["analyzed"], 1);

    let times = &parsed["files"][0]["response_times"];
    assert_eq!(times["average_response_time_seconds"], 300.0);
    assert_eq!(times["median_response_time_seconds"], 300.0);
    assert_eq!(times["per_contact_average"]["555-1234"], 300.0);
    assert_eq!(times["by_day_average"]["Monday"], 300.0);
}

#[test]
fn test_outlier_listing_in_json() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", OUTLIER_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--format").arg("json").arg(&input);

    let output = cmd.output().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let outliers = parsed["files"][0]["outliers"].as_array().unwrap();

    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0]["contact"], "(555) 000-1111");
    assert_eq!(outliers[0]["received_ts"], "2024-01-05T08:00:00");
    assert_eq!(outliers[0]["sent_ts"], "2024-01-05T18:00:00");
    assert_eq!(outliers[0]["response_time_seconds"], 36000.0);
    assert_eq!(outliers[0]["is_outlier"], true);
}

#[test]
fn test_outliers_csv_export() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", OUTLIER_CSV);
    let export = fixtures.path("outliers.csv");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--outliers-csv").arg(&export).arg(&input);
    cmd.assert().success();

    let csv = std::fs::read_to_string(&export).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "source,contact,received_ts,sent_ts,response_time_seconds,is_outlier"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1]
        .contains("(555) 000-1111,2024-01-05T08:00:00,2024-01-05T18:00:00,36000.0,true"));
}

#[test]
fn test_output_file() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);
    let report = fixtures.path("report.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&report)
        .arg(&input);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&report).unwrap();
    assert!(written.contains("\"phonestat-json-v1\""));
}

#[test]
fn test_restricted_direction_labels_give_no_pairs() {
    let fixtures = Fixtures::new();
    let input = fixtures.file(
        "calls.csv",
        "Date,Phone,Direction\n\
         2024-01-01 12:00:00,555-1234,Incoming\n\
         2024-01-01 12:05:00,555-1234,Outgoing\n",
    );
    let config = fixtures.file(
        "phonestat.toml",
        "[directions]\nsent = [\"sent\"]\nreceived = [\"received\"]\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .arg(&input);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file = &parsed["files"][0];
    assert!(file["response_times"].is_null());
    assert_eq!(file["row_issues"].as_array().unwrap().len(), 2);
    assert!(file["outliers"].as_array().unwrap().is_empty());
}

#[test]
fn test_one_failed_file_does_not_stop_others() {
    let fixtures = Fixtures::new();
    let good = fixtures.file("good.csv", SINGLE_REPLY_CSV);
    let bad = fixtures.file("bad.csv", UNMAPPABLE_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg(&bad).arg(&good);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("mapping failed"))
        .stdout(predicate::str::contains("average 300.0s"))
        .stderr(predicate::str::contains("Could not map required columns"));
}

#[test]
fn test_all_files_failed_exit_code() {
    let fixtures = Fixtures::new();
    let bad = fixtures.file("bad.csv", UNMAPPABLE_CSV);
    let missing = fixtures.path("missing.csv");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg(&bad).arg(&missing);

    cmd.assert().code(2);
}

#[test]
fn test_unsupported_extension_is_unreadable() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.pdf", SINGLE_REPLY_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg(&input);

    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("unreadable"));
}

#[test]
fn test_invalid_config_exit_code() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);
    let config = fixtures.file("bad.toml", "[response]\niqr_multiplier = 0.0\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--config").arg(&config).arg(&input);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("iqr_multiplier"));
}

#[test]
fn test_invalid_flag_value_exit_code() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--iqr-multiplier").arg("-2").arg(&input);
    cmd.assert().code(1);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--format").arg("yaml").arg(&input);
    cmd.assert().code(1);
}

#[test]
fn test_missing_files_argument() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.assert().code(1).stderr(predicate::str::contains("FILES"));
}

#[test]
fn test_column_override_flag() {
    let fixtures = Fixtures::new();
    let input = fixtures.file(
        "calls.csv",
        "When,Peer,Kind\n\
         2024-01-01 12:00:00,bob,received\n\
         2024-01-01 12:00:30,bob,sent\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.arg("--timestamp-column")
        .arg("When")
        .arg("--contact-column")
        .arg("Peer")
        .arg("--direction-column")
        .arg("Kind")
        .arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("average 30.0s"));
}

#[test]
fn test_debug_logging_on_stderr() {
    let fixtures = Fixtures::new();
    let input = fixtures.file("calls.csv", SINGLE_REPLY_CSV);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phonestat");
    cmd.env_remove("RUST_LOG").arg("--debug").arg(&input);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("analyzed file"));
}
