use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "backline-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_backline-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("smoke"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_runs_smoke_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_backline-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke,unknown",
            "--iterations",
            "1",
            "--seeds",
            "1",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Backline Balance Tester"));
    assert!(stderr.contains("Unknown scenario"));

    let content = std::fs::read_to_string(&output_path).expect("read output");
    let json_end = content.find("\n\n").unwrap_or(content.len());
    let report: serde_json::Value =
        serde_json::from_str(&content[..json_end]).expect("json report");
    assert_eq!(report.as_array().map(Vec::len), Some(1));
    assert_eq!(report[0]["passed"], serde_json::json!(true));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_rejects_bad_seeds() {
    let exe = env!("CARGO_BIN_EXE_backline-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
