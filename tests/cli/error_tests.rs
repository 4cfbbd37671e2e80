use super::common::stepwise;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn unknown_demo_fails() {
    stepwise()
        .args(["run", "nosuch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown demo 'nosuch'"));
}

#[test]
fn malformed_breakpoints_fail() {
    stepwise()
        .args(["run", "sum", "--breakpoints", "3,x", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --breakpoints value"));
}

#[test]
fn missing_config_file_fails() {
    stepwise()
        .args(["--config", "/definitely/not/here.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn broken_config_file_fails() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[pool").unwrap();
    stepwise()
        .arg("--config")
        .arg(config.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn verbose_and_quiet_conflict() {
    stepwise().args(["-v", "-q", "list"]).assert().code(2);
}
