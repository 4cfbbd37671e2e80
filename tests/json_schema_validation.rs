use assert_cmd::Command;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;

const SCHEMA_PATH: &str = "tests/schemas/execution_result.json";

fn run_json(args: &[&str], stdin: &str) -> (Option<i32>, Value) {
    let mut cmd = Command::cargo_bin("stepwise").unwrap();
    let output = cmd
        .env_remove("STEPWISE_CONFIG")
        .arg("--quiet")
        .arg("run")
        .args(args)
        .arg("--output")
        .arg("json")
        .write_stdin(stdin)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8(output.stdout).expect("Stdout is not valid UTF-8");
    let json_val: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Failed to parse JSON output ({}): {}", e, stdout));
    (output.status.code(), json_val)
}

fn validate(json_val: &Value) {
    let schema_content = fs::read_to_string(SCHEMA_PATH).expect("Failed to read schema file");
    let schema_json: Value =
        serde_json::from_str(&schema_content).expect("Failed to parse schema JSON");

    let compiled = JSONSchema::compile(&schema_json).expect("Failed to compile schema");
    let result = compiled.validate(json_val);

    if let Err(errors) = result {
        let mut error_msgs = Vec::new();
        for error in errors {
            error_msgs.push(format!(
                "Property: {}, Error: {}",
                error.instance_path, error
            ));
        }
        panic!("JSON Schema validation failed:\n{}", error_msgs.join("\n"));
    }
}

#[test]
fn test_successful_run_matches_schema() {
    let (code, json_val) = run_json(&["divide"], "6\n3\n");
    assert_eq!(code, Some(0));
    assert_eq!(json_val["termination"], "normal");
    validate(&json_val);
}

#[test]
fn test_failed_run_matches_schema() {
    let (code, json_val) = run_json(&["bounds"], "");
    assert_eq!(code, Some(1));
    assert_eq!(json_val["error"]["kind"], "index_out_of_bounds");
    assert_eq!(json_val["error"]["line"], 4);
    validate(&json_val);
}

#[test]
fn test_interrupted_run_matches_schema() {
    let (code, json_val) = run_json(&["sum", "--step"], "q\n");
    assert_eq!(code, Some(130));
    assert_eq!(json_val["termination"], "interrupted");
    assert!(json_val["error"].is_null());
    validate(&json_val);
}
