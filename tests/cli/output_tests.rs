use super::common::stepwise;
use serde_json::Value;

#[test]
fn list_shows_every_demo() {
    let output = stepwise().arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["sum", "countdown", "divide", "bounds", "grid"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn list_json_is_an_array() {
    let output = stepwise().args(["list", "--output", "json"]).output().unwrap();
    assert!(output.status.success());
    let demos: Value = serde_json::from_slice(&output.stdout).unwrap();
    let demos = demos.as_array().unwrap();
    assert_eq!(demos.len(), 5);
    assert_eq!(demos[0]["name"], "sum");
    assert_eq!(demos[0]["lines"], 7);
}

#[test]
fn json_run_keeps_program_output_off_stdout() {
    let output = stepwise()
        .args(["-q", "run", "sum", "--output", "json", "2", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["termination"], "normal");
    assert!(result["error"].is_null());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sum = 5"));
}
