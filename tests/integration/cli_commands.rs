//! End-to-end runs of the orgtrack binary.

use super::test_utils::{run_orgtrack, stderr, stdout, write_file};
use tempfile::TempDir;

const SCRIPT: &str = r#"
stages = ["Creating new sandbox", "Refreshing org", "Authenticating"]

[[steps]]
advance = "Creating new sandbox"

[[steps]]
advance = "Refreshing org"

[[steps]]
advance = "Authenticating"
stop = true
"#;

#[test]
fn test_duration_command() {
    let temp = TempDir::new().unwrap();
    let output = run_orgtrack(temp.path(), &["--quiet", "duration", "90061"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "1 day 1 hour 1 minute 1 second");
}

#[test]
fn test_replay_prints_json_summary() {
    let temp = TempDir::new().unwrap();
    let script = write_file(temp.path(), "script.toml", SCRIPT);
    let output = run_orgtrack(
        temp.path(),
        &[
            "--quiet",
            "--workspace",
            temp.path().to_str().unwrap(),
            "replay",
            script.to_str().unwrap(),
            "--format",
            "json",
        ],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["finished"], true);
    let statuses: Vec<&str> = value["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["completed", "completed", "completed"]);
}

#[test]
fn test_replay_text_frames() {
    let temp = TempDir::new().unwrap();
    let script = write_file(temp.path(), "script.toml", SCRIPT);
    let config = write_file(temp.path(), "orgtrack.toml", "[render]\ncolor = false\n");
    let output = run_orgtrack(
        temp.path(),
        &[
            "--quiet",
            "--config",
            config.to_str().unwrap(),
            "replay",
            script.to_str().unwrap(),
            "--frames",
        ],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("step 1: advance Creating new sandbox"));
    assert!(out.contains("step 3: advance Authenticating (stop)"));
    assert!(out.contains("✔ Refreshing org"));
    assert!(out.trim_end().ends_with("3 stages: 3 completed"));
}

#[test]
fn test_invalid_script_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let script = write_file(
        temp.path(),
        "bad.toml",
        "stages = [\"A\"]\n[[steps]]\nset = \"A\"\n",
    );
    let output = run_orgtrack(
        temp.path(),
        &["--quiet", "replay", script.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("step 1"));
}

#[test]
fn test_sandbox_failure_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let feed = write_file(
        temp.path(),
        "feed.json",
        r#"[
            {"SandboxName": "uat", "Status": "Processing", "CopyProgress": 20},
            {"SandboxName": "uat", "Status": "Failed", "CopyProgress": 20, "Description": "quota exceeded"}
        ]"#,
    );
    let events = temp.path().join("events.jsonl");
    let output = run_orgtrack(
        temp.path(),
        &[
            "--quiet",
            "sandbox",
            feed.to_str().unwrap(),
            "--interval-ms",
            "1",
            "--format",
            "json",
            "--events",
            events.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("quota exceeded"));

    let recorded = orgtrack::telemetry::sinks::read_jsonl(&events).unwrap();
    let last = recorded.last().unwrap();
    assert_eq!(last.event_type, "session_ended");
    assert_eq!(last.data["status"], "failed");
    assert!(recorded
        .iter()
        .any(|e| e.event_type == "sandbox_progress" && e.data["status"] == "Failed"));
}

#[test]
fn test_env_overrides_render_format() {
    let temp = TempDir::new().unwrap();
    let script = write_file(temp.path(), "script.toml", SCRIPT);
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_orgtrack"))
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("ORGTRACK__RENDER__FORMAT", "json")
        .args([
            "--quiet",
            "--workspace",
            temp.path().to_str().unwrap(),
            "replay",
            script.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(serde_json::from_str::<serde_json::Value>(&stdout(&output)).is_ok());
}
