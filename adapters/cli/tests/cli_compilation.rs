use std::process::{Command, Stdio};

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "valor"])
        .status()
        .expect("failed to invoke cargo check for the valor CLI binary");

    assert!(status.success(), "cargo check --bin valor should succeed");
}

#[test]
fn zero_round_session_reports_the_chosen_settings() {
    let output = Command::new(env!("CARGO_BIN_EXE_valor"))
        .args(["--difficulty", "hard", "--seed", "7", "--rounds", "0"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run the valor binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Difficulty hard, seed 7."), "{stdout}");
    assert!(stdout.contains("Round limit reached without a winner."), "{stdout}");
}

#[test]
fn unknown_difficulty_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_valor"))
        .args(["--difficulty", "nightmare"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run the valor binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown difficulty `nightmare`"), "{stderr}");
}
