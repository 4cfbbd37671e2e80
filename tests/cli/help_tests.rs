use super::common::stepwise;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    stepwise()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn run_help_shows_debug_flags() {
    stepwise()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--breakpoints"))
        .stdout(predicate::str::contains("--step"))
        .stdout(predicate::str::contains("--output"));
}
