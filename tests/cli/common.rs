use assert_cmd::Command;

/// The `stepwise` binary with a clean, uncolored environment.
pub fn stepwise() -> Command {
    let mut cmd = Command::cargo_bin("stepwise").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("STEPWISE_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}
