use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "\
Acme Widgets Inc.
From: Acme Widgets Inc.
Invoice Number: INV-1001
Invoice Date: January 25, 2016
Total Due $93.50
";

fn invex(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn help_describes_config_and_verbosity() {
    let dir = TempDir::new().unwrap();

    invex(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("invex/config.json"))
        .stdout(predicate::str::contains("candidate traces"));
}

#[test]
fn process_prints_json_record() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "invoice.txt", INVOICE);

    invex(&dir)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invoice_number\": \"INV-1001\""))
        .stdout(predicate::str::contains("\"status\": \"COMPLETE\""))
        .stdout(predicate::str::contains("\"total_amount\": \"93.50\""));
}

#[test]
fn process_text_format_with_confidence() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "invoice.txt", "Total Due $93.50\n");

    invex(&dir)
        .args(["process", "--format", "text", "--show-confidence"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: PARTIAL"))
        .stdout(predicate::str::contains("AMOUNT: pattern 10 (total-due) matched \"$93.50\""))
        .stdout(predicate::str::contains("VENDOR: no match"));
}

#[test]
fn process_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    invex(&dir)
        .arg("process")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_with_custom_patterns_reports_invalid_ones() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "invoice.txt", "Amount payable: 42.00");
    let patterns = write(
        dir.path(),
        "patterns.json",
        r#"[
            { "id": 1, "name": "broken", "category": "AMOUNT", "expression": "payable: (\\d+", "priority": 1, "confidence_weight": 1.0 },
            { "id": 2, "name": "payable", "category": "AMOUNT", "expression": "payable:\\s*(\\d+\\.\\d{2})", "priority": 2, "confidence_weight": 0.5 }
        ]"#,
    );

    invex(&dir)
        .args(["process", "--format", "csv", "--patterns"])
        .arg(&patterns)
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping pattern 1 (broken)"))
        .stdout(predicate::str::contains(",42.00,"));
}

#[test]
fn inactive_patterns_are_listed_but_never_used() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "invoice.txt", "Total 1.00 due 2.00");
    let patterns = write(
        dir.path(),
        "patterns.json",
        r#"[
            { "id": 1, "name": "retired-total", "category": "AMOUNT", "expression": "total\\s*(\\d+\\.\\d{2})", "priority": 1, "confidence_weight": 1.0, "is_active": false },
            { "id": 2, "name": "due", "category": "AMOUNT", "expression": "due\\s*(\\d+\\.\\d{2})", "priority": 2, "confidence_weight": 1.0 }
        ]"#,
    );

    invex(&dir)
        .args(["process", "--format", "csv", "--patterns"])
        .arg(&patterns)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(",2.00,"))
        .stdout(predicate::str::contains(",1.00,").not());

    invex(&dir)
        .args(["patterns", "list", "--all", "--patterns"])
        .arg(&patterns)
        .assert()
        .success()
        .stdout(predicate::str::contains("retired-total"));

    invex(&dir)
        .args(["patterns", "list", "--patterns"])
        .arg(&patterns)
        .assert()
        .success()
        .stdout(predicate::str::contains("retired-total").not());
}

#[test]
fn batch_writes_outputs_summary_and_usage() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "a.txt", INVOICE);
    write(&inputs, "b.txt", "Total Due $5.00\n");
    let usage = dir.path().join("usage.json");

    invex(&dir)
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .args(["-j", "2", "--summary", "--output-dir"])
        .arg(&out)
        .arg("--usage-out")
        .arg(&usage)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains("a.txt,COMPLETE,INV-1001"));

    let deltas: serde_json::Value = serde_json::from_str(&fs::read_to_string(&usage).unwrap()).unwrap();
    let total_due = deltas
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["pattern_id"] == 10)
        .unwrap();
    assert_eq!(total_due["uses"], 2);
}

#[test]
fn batch_stops_on_error_unless_asked_to_continue() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.txt", INVOICE);
    write(dir.path(), "empty.txt", "   \n");
    let pattern = format!("{}/*.txt", dir.path().display());

    invex(&dir)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File contains no text"));

    invex(&dir)
        .args(["batch", &pattern, "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));
}

#[test]
fn patterns_check_and_show() {
    let dir = TempDir::new().unwrap();

    invex(&dir)
        .args(["patterns", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("patterns compiled"));

    invex(&dir)
        .args(["patterns", "show", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"total-due\""));

    invex(&dir)
        .args(["patterns", "list", "--category", "due-date"])
        .assert()
        .success()
        .stdout(predicate::str::contains("due-date-long"))
        .stdout(predicate::str::contains("total-due").not());

    let bad = write(
        dir.path(),
        "bad.json",
        r#"[{ "id": 3, "name": "no-format", "category": "DATE", "expression": "dated (.+)", "priority": 1, "confidence_weight": 0.5 }]"#,
    );
    invex(&dir)
        .args(["patterns", "check"])
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("3 (no-format, DATE)"));
}

#[test]
fn config_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    invex(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.unvalidated_penalty", "0.5"])
        .assert()
        .success();

    invex(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.unvalidated_penalty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5"));

    invex(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.unvalidated_penalty", "2.0"])
        .assert()
        .failure();

    invex(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
