use super::common::stepwise;
use predicates::prelude::*;

#[test]
fn sum_from_arguments() {
    stepwise()
        .args(["run", "sum", "2", "-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sum = -3"))
        .stdout(predicate::str::contains("Program finished"));
}

#[test]
fn sum_from_stdin() {
    stepwise()
        .args(["run", "sum"])
        .write_stdin("4\n5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("sum = 9"));
}

#[test]
fn invalid_console_input_is_reported() {
    stepwise()
        .args(["run", "sum"])
        .write_stdin("four\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("The value entered is not a valid integer"));
}

#[test]
fn division_by_zero_exits_with_error() {
    stepwise()
        .args(["run", "divide"])
        .write_stdin("1\n0\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Division by zero is not allowed"))
        .stdout(predicate::str::contains("at line 5, column 11"));
}

#[test]
fn index_error_names_the_index() {
    stepwise()
        .args(["run", "bounds"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("The index [10] is invalid"))
        .stdout(predicate::str::contains("at line 4"));
}

#[test]
fn bad_program_argument_is_unhandled() {
    stepwise()
        .args(["run", "countdown", "100"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("n must be between 1 and 20"));
}

#[test]
fn breakpoint_then_quit_interrupts() {
    stepwise()
        .args(["run", "countdown", "--breakpoints", "5", "3"])
        .write_stdin("c\nc\nq\n")
        .assert()
        .code(130)
        .stdout(predicate::str::contains("=>   5 |"))
        .stdout(predicate::str::contains("Program interrupted"));
}

#[test]
fn step_then_continue_runs_to_completion() {
    stepwise()
        .args(["run", "grid", "--step"])
        .write_stdin("s\nstep\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("=>   2 |"))
        .stdout(predicate::str::contains("=>   3 |"))
        .stdout(predicate::str::contains("8"));
}

#[test]
fn closed_stdin_while_paused_quits() {
    stepwise()
        .args(["run", "sum", "--step", "1", "2"])
        .assert()
        .code(130);
}

#[test]
fn unknown_command_is_rejected_then_reprompted() {
    stepwise()
        .args(["run", "sum", "--breakpoints", "6", "1", "2"])
        .write_stdin("jump\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown command 'jump'"))
        .stdout(predicate::str::contains("sum = 3"));
}
