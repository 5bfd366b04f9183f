use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "astrobots"])
        .status()
        .expect("failed to invoke cargo check for astrobots CLI binary");

    assert!(status.success(), "cargo check --bin astrobots should succeed");
}

#[test]
fn cli_plays_a_short_match() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "astrobots",
            "--",
            "--max-turns",
            "3",
        ])
        .output()
        .expect("failed to invoke astrobots CLI binary");

    assert!(output.status.success(), "astrobots should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hunter script cost"));
    assert!(
        stdout.lines().any(|line| line.starts_with("3;")),
        "final state string should report turn 3: {stdout}"
    );
}
