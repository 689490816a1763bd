#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn stagegate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stagegate").unwrap();
    cmd.current_dir(dir.path())
        .env("STAGEGATE_ROOT", dir.path())
        .env_remove("STAGEGATE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_transcript(dir: &TempDir, lines: &[Value]) -> PathBuf {
    let path = dir.path().join("session.jsonl");
    let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
    std::fs::write(&path, body).unwrap();
    path
}

fn todo_write(statuses: &[&str]) -> Value {
    let todos: Vec<Value> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| json!({"content": format!("task {i}"), "status": s, "activeForm": "Working"}))
        .collect();
    json!({"type": "tool_use", "name": "TodoWrite", "input": {"todos": todos}})
}

fn assistant_tool(name: &str, input: Value) -> Value {
    json!({
        "type": "assistant",
        "timestamp": "2025-01-01T00:00:00Z",
        "message": {"content": [
            {"type": "text", "text": "working"},
            {"type": "tool_use", "id": "toolu_1", "name": name, "input": input}
        ]}
    })
}

fn reviewer() -> Value {
    assistant_tool("Task", json!({"subagent_type": "code-reviewer", "prompt": "review"}))
}

fn filler() -> Value {
    assistant_tool("Read", json!({"file_path": "src/lib.rs"}))
}

fn todo_request(path: &Path, statuses: &[&str]) -> Value {
    let todos: Vec<Value> = statuses
        .iter()
        .map(|s| json!({"content": "t", "status": s}))
        .collect();
    json!({
        "tool_name": "TodoWrite",
        "tool_input": {"todos": todos},
        "tool_response": {},
        "transcript_path": path,
        "session_id": "s1",
        "hook_event_name": "PostToolUse"
    })
}

fn bash_request(path: &Path, exit_code: i64, output: &str) -> Value {
    json!({
        "tool_name": "Bash",
        "tool_input": {"command": "npx tsc --noEmit"},
        "tool_response": {"exit_code": exit_code, "output": output},
        "transcript_path": path
    })
}

fn mcp_request(path: &Path, severities: &[i64]) -> Value {
    let diagnostics: Vec<Value> = severities
        .iter()
        .map(|s| json!({"severity": s, "message": "m"}))
        .collect();
    json!({
        "tool_name": "mcp__vscode-mcp__get_diagnostics",
        "tool_input": {},
        "tool_response": {"diagnostics": diagnostics},
        "transcript_path": path
    })
}

fn review_request(path: &Path, role: &str) -> Value {
    json!({
        "tool_name": "Task",
        "tool_input": {"subagent_type": role, "prompt": "review the changes"},
        "tool_response": {},
        "transcript_path": path
    })
}

/// Run a hook and return its parsed stdout; asserts exit 0.
fn hook(dir: &TempDir, detector: &str, stdin: impl Into<Vec<u8>>) -> Value {
    let out = stagegate(dir)
        .args(["hook", detector])
        .write_stdin(stdin)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

#[test]
fn malformed_stdin_yields_empty_object_for_every_detector() {
    let dir = TempDir::new().unwrap();
    for detector in ["todos", "diagnostics", "review", "auto"] {
        for body in ["", "not json", "[1,2]", "{\"tool_name\":", "null"] {
            stagegate(&dir)
                .args(["hook", detector])
                .write_stdin(body)
                .assert()
                .success()
                .stdout("{}\n");
        }
    }
}

#[test]
fn missing_transcript_reference_yields_empty_object() {
    let dir = TempDir::new().unwrap();
    let body = json!({
        "tool_name": "TodoWrite",
        "tool_input": {"todos": [{"content": "a", "status": "completed"}]}
    });
    assert_eq!(hook(&dir, "todos", body.to_string()), json!({}));
}

#[test]
fn nonexistent_transcript_is_treated_as_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone.jsonl");
    assert_eq!(
        hook(&dir, "todos", todo_request(&path, &["completed", "completed"]).to_string()),
        json!({})
    );
    assert_eq!(
        hook(&dir, "diagnostics", bash_request(&path, 0, "ok").to_string()),
        json!({})
    );
    assert_eq!(
        hook(&dir, "review", review_request(&path, "code-reviewer").to_string()),
        json!({})
    );
}

#[test]
fn broken_config_degrades_to_empty_object() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".stagegate")).unwrap();
    std::fs::write(dir.path().join(".stagegate/config.yaml"), "tools: [unclosed").unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);
    let body = todo_request(&path, &["completed"]).to_string();
    assert_eq!(hook(&dir, "todos", body), json!({}));
}

// ---------------------------------------------------------------------------
// Stage 1 → 2
// ---------------------------------------------------------------------------

#[test]
fn three_completed_tasks_request_diagnostics() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed", "completed", "completed"])]);
    let out = hook(&dir, "todos", todo_request(&path, &["completed"; 3]).to_string());

    assert_eq!(out["decision"], "block");
    assert!(out["reason"]
        .as_str()
        .unwrap()
        .starts_with("All tasks from the todo list have been completed!"));
    assert_eq!(
        out["hookSpecificOutput"],
        json!({
            "hookEventName": "PostToolUse",
            "stage": "tasks_complete_to_diagnostics",
            "additionalContext": "Todo list completion detected: 3 tasks all marked as completed.",
            "completedTasks": 3
        })
    );
}

#[test]
fn incomplete_or_empty_task_list_does_not_fire() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed", "in_progress"])]);
    let body = todo_request(&path, &["completed", "in_progress"]).to_string();
    assert_eq!(hook(&dir, "todos", body), json!({}));

    let path = write_transcript(&dir, &[todo_write(&[])]);
    let body = todo_request(&path, &[]).to_string();
    assert_eq!(hook(&dir, "todos", body), json!({}));
}

#[test]
fn same_request_twice_gives_same_decision() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed", "completed"])]);
    let body = todo_request(&path, &["completed", "completed"]).to_string();
    let first = hook(&dir, "todos", body.clone());
    let second = hook(&dir, "todos", body);
    assert_eq!(first, second);
    assert_eq!(first["hookSpecificOutput"]["completedTasks"], 2);
}

// ---------------------------------------------------------------------------
// Stage 2 → 3
// ---------------------------------------------------------------------------

#[test]
fn clean_bash_after_completed_tasks_requests_review() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed", "completed"]), filler()]);
    let out = hook(&dir, "diagnostics", bash_request(&path, 0, "No issues.").to_string());

    assert_eq!(out["decision"], "block");
    assert!(out["reason"]
        .as_str()
        .unwrap()
        .starts_with("Project-wide diagnostics are clean!"));
    assert_eq!(out["hookSpecificOutput"]["stage"], "diagnostics_clean_to_code_review");
    assert_eq!(out["hookSpecificOutput"]["diagnosticsTool"], "Bash");
}

#[test]
fn failing_or_noisy_bash_does_not_fire() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);
    for (code, output) in [
        (2, "clean text"),
        (0, "ERROR: Cannot find module './util'"),
        (0, "Found 4 errors in 2 files."),
        (0, "\u{2716} 1 problem"),
    ] {
        let body = bash_request(&path, code, output).to_string();
        assert_eq!(hook(&dir, "diagnostics", body), json!({}), "{code} {output}");
    }
}

#[test]
fn structured_diagnostics_block_on_warning() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);

    let out = hook(&dir, "diagnostics", mcp_request(&path, &[2, 3]).to_string());
    assert_eq!(
        out["hookSpecificOutput"]["diagnosticsTool"],
        "mcp__vscode-mcp__get_diagnostics"
    );

    let out = hook(&dir, "diagnostics", mcp_request(&path, &[3, 1]).to_string());
    assert_eq!(out, json!({}));
}

#[test]
fn cycle_guard_follows_latest_positions() {
    let dir = TempDir::new().unwrap();
    // task list @3, review @7, task list @10 → fresh cycle
    let mut lines: Vec<Value> = (0..11).map(|_| filler()).collect();
    lines[3] = todo_write(&["completed"]);
    lines[7] = reviewer();
    lines[10] = todo_write(&["completed", "completed"]);
    let path = write_transcript(&dir, &lines);
    let out = hook(&dir, "diagnostics", bash_request(&path, 0, "ok").to_string());
    assert_eq!(out["decision"], "block");

    // task list @3, review @7 → stale
    let path = write_transcript(&dir, &lines[..8]);
    assert_eq!(
        hook(&dir, "diagnostics", bash_request(&path, 0, "ok").to_string()),
        json!({})
    );
}

#[test]
fn diagnostics_need_a_completed_task_list() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed", "pending"]), filler()]);
    assert_eq!(
        hook(&dir, "diagnostics", bash_request(&path, 0, "ok").to_string()),
        json!({})
    );

    let path = write_transcript(&dir, &[filler()]);
    assert_eq!(
        hook(&dir, "diagnostics", bash_request(&path, 0, "ok").to_string()),
        json!({})
    );
}

// ---------------------------------------------------------------------------
// Stage 3 → 4
// ---------------------------------------------------------------------------

#[test]
fn reviewer_invocation_requests_final_report() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"]), reviewer()]);
    let out = hook(&dir, "review", review_request(&path, "code-reviewer").to_string());

    assert_eq!(out["decision"], "block");
    assert!(out["reason"]
        .as_str()
        .unwrap()
        .starts_with("Code review has been completed!"));
    assert_eq!(
        out["hookSpecificOutput"],
        json!({
            "hookEventName": "PostToolUse",
            "stage": "code_review_to_final_report",
            "subagentType": "code-reviewer"
        })
    );
}

#[test]
fn other_subagent_role_does_not_fire() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);
    let body = review_request(&path, "general-purpose").to_string();
    assert_eq!(hook(&dir, "review", body), json!({}));
}

#[test]
fn reviewer_without_task_list_does_not_fire() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[filler(), reviewer()]);
    let body = review_request(&path, "code-reviewer").to_string();
    assert_eq!(hook(&dir, "review", body), json!({}));
}

// ---------------------------------------------------------------------------
// auto dispatch and config
// ---------------------------------------------------------------------------

#[test]
fn auto_dispatches_on_tool_name() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);

    let out = hook(&dir, "auto", todo_request(&path, &["completed"]).to_string());
    assert_eq!(out["hookSpecificOutput"]["stage"], "tasks_complete_to_diagnostics");

    let out = hook(&dir, "auto", bash_request(&path, 0, "ok").to_string());
    assert_eq!(out["hookSpecificOutput"]["stage"], "diagnostics_clean_to_code_review");

    let out = hook(&dir, "auto", review_request(&path, "code-reviewer").to_string());
    assert_eq!(out["hookSpecificOutput"]["stage"], "code_review_to_final_report");

    let read = json!({"tool_name": "Read", "transcript_path": path});
    assert_eq!(hook(&dir, "auto", read.to_string()), json!({}));
}

#[test]
fn configured_reviewer_role_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".stagegate")).unwrap();
    std::fs::write(
        dir.path().join(".stagegate/config.yaml"),
        "reviewer_role: security-reviewer\n",
    )
    .unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);

    let out = hook(&dir, "review", review_request(&path, "security-reviewer").to_string());
    assert_eq!(out["hookSpecificOutput"]["subagentType"], "security-reviewer");
    assert_eq!(
        hook(&dir, "review", review_request(&path, "code-reviewer").to_string()),
        json!({})
    );
}

#[test]
fn extra_failure_pattern_blocks_diagnostics() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.yaml");
    std::fs::write(
        &config,
        "diagnostics:\n  extra_failure_patterns:\n    - id: panic\n      pattern: panicked at\n      meaning: rust panic\n",
    )
    .unwrap();
    let path = write_transcript(&dir, &[todo_write(&["completed"])]);
    let body = bash_request(&path, 0, "thread 'main' panicked at src/main.rs").to_string();

    assert_eq!(hook(&dir, "diagnostics", body.clone())["decision"], "block");

    let out = stagegate(&dir)
        .args(["--config", config.to_str().unwrap(), "hook", "diagnostics"])
        .write_stdin(body)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(serde_json::from_slice::<Value>(&out).unwrap(), json!({}));
}

#[test]
fn config_init_show_validate() {
    let dir = TempDir::new().unwrap();
    stagegate(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(dir.path().join(".stagegate/config.yaml").exists());

    stagegate(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    stagegate(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewer_role: code-reviewer"));

    stagegate(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_fails_on_bad_pattern() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".stagegate")).unwrap();
    std::fs::write(
        dir.path().join(".stagegate/config.yaml"),
        "diagnostics:\n  extra_failure_patterns:\n    - id: broken\n      pattern: \"(\"\n      meaning: x\n",
    )
    .unwrap();

    stagegate(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

// ---------------------------------------------------------------------------
// status and patterns
// ---------------------------------------------------------------------------

#[test]
fn status_reports_cycle_positions() {
    let dir = TempDir::new().unwrap();
    let path = write_transcript(
        &dir,
        &[todo_write(&["completed", "completed"]), filler(), reviewer()],
    );

    let out = stagegate(&dir)
        .args(["--json", "status", "--transcript", path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let status: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(status["rule"], "review_invoked");
    assert_eq!(status["positions"]["last_task_list"], 0);
    assert_eq!(status["positions"]["last_review"], 2);
    assert_eq!(status["review_in_current_cycle"], true);
    assert_eq!(status["summary"], "2/2 completed, 0 in progress, 0 pending");

    stagegate(&dir)
        .args(["status", "--transcript", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("final report requested"));
}

#[test]
fn status_of_missing_transcript_fails() {
    let dir = TempDir::new().unwrap();
    stagegate(&dir)
        .args(["status", "--transcript", "nope.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn patterns_list_and_check() {
    let dir = TempDir::new().unwrap();
    stagegate(&dir)
        .arg("patterns")
        .assert()
        .success()
        .stdout(predicate::str::contains("error_marker"))
        .stdout(predicate::str::contains("mypy_error"));

    let out = stagegate(&dir)
        .args(["--json", "patterns", "--check", "-"])
        .write_stdin("build FAILED\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["clean"], false);
    assert_eq!(report["matches"][0]["id"], "failed_marker");

    stagegate(&dir)
        .args(["patterns", "--check", "-"])
        .write_stdin("Finished in 0.2s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No failure markers found."));

    stagegate(&dir)
        .args(["patterns", "--check", "-"])
        .write_stdin("build FAILED\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failure marker(s) found:"))
        .stdout(predicate::str::is_match(r"(?m)^\* failed_marker\s").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^  error_marker\s").unwrap());
}
