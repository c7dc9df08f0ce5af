use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "vsm-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_vsm-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    std::fs::remove_file(output_path).expect("cleanup");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("legacy-migration"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_vsm-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "all",
            "--iterations",
            "2",
            "--steps",
            "30",
            "--seeds",
            "1,0x2a",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VSM Automated Tester"));

    let report = std::fs::read_to_string(&output_path).expect("read report");
    std::fs::remove_file(output_path).expect("cleanup");
    let parsed: serde_json::Value = serde_json::from_str(&report).expect("json report");
    let results = parsed.as_array().expect("array");
    assert_eq!(results.len(), 8 * 2);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_file_backed_run_leaves_state_on_disk() {
    let exe = env!("CARGO_BIN_EXE_vsm-tester");
    let state_dir = temp_path("state");
    let status = Command::new(exe)
        .args(["--scenarios", "persistence-roundtrip", "--iterations", "1"])
        .args(["--seeds", "7", "--report", "markdown", "--state-dir"])
        .arg(&state_dir)
        .status()
        .expect("run cli");
    assert!(status.success());
    let stats = state_dir
        .join("persistence-roundtrip-7")
        .join("vsm-stats.json");
    assert!(stats.exists(), "missing {}", stats.display());
    std::fs::remove_dir_all(state_dir).expect("cleanup");
}

#[test]
fn cli_rejects_bad_seed_tokens() {
    let exe = env!("CARGO_BIN_EXE_vsm-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}
