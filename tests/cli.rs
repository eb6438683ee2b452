use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn prweave() -> Command {
    Command::cargo_bin("prweave").unwrap()
}

#[test]
fn help_lists_subcommands() {
    prweave()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("refine"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn schema_prints_config_schema() {
    prweave()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Config\""))
        .stdout(predicate::str::contains("concurrency"));
}

#[test]
fn inspect_expands_patch() {
    let dir = tempfile::tempdir().unwrap();
    let patch = dir.path().join("change.patch");
    fs::write(
        &patch,
        "@@ -10,3 +10,4 @@\n context\n-old line\n+new line A\n+new line B\n context\n",
    )
    .unwrap();

    prweave()
        .arg("inspect")
        .arg(&patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"new_start\": 10"))
        .stdout(predicate::str::contains("\"status\": \"removed\""));

    prweave()
        .arg("inspect")
        .arg(&patch)
        .arg("--segments")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"new_end\": 13"))
        .stdout(predicate::str::contains("\"is_commented\": false"));
}

#[test]
fn refine_emits_record_via_replay_fetcher() {
    let dir = tempfile::tempdir().unwrap();

    let pr_line = serde_json::json!({
        "number": 42,
        "commit_shas": ["base", "c1", "c2"],
        "pr_commits": [
            {"sha": "base", "commit": {"author": {"date": "2024-03-01T08:00:00+08:00"}}},
            {"sha": "c1", "commit": {"author": {"date": "2024-03-02T08:00:00+08:00"}}},
            {"sha": "c2", "commit": {"author": {"date": "2024-03-05T08:00:00+08:00"}}}
        ],
        "pr_files": [
            {"patch": {
                "old_path": "src/account.cpp",
                "new_path": "src/account.cpp",
                "diff": "@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context"
            }}
        ],
        "diff_comments": [{
            "position": {"old_path": "src/account.cpp", "new_path": "src/account.cpp"},
            "diff_position": {"start_new_line": 11, "end_new_line": 12},
            "created_at": "2024-03-03T00:00:00+08:00",
            "body": "please null-check",
            "html_url": "https://example.com/c/1"
        }]
    });
    fs::write(dir.path().join("input.jsonl"), format!("{pr_line}\n")).unwrap();

    let patch = "@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context";
    let replays = [
        serde_json::json!({"base": "base", "head": "c1",
            "files": [{"filename": "src/account.cpp", "patch": patch}]}),
        serde_json::json!({"base": "c1", "head": "c2",
            "files": [{"filename": "src/account.cpp", "patch": patch}]}),
    ];
    fs::write(
        dir.path().join("replay.jsonl"),
        replays.map(|r| r.to_string()).join("\n") + "\n",
    )
    .unwrap();

    prweave()
        .current_dir(dir.path())
        .args([
            "refine",
            "input.jsonl",
            "--replay-file",
            "replay.jsonl",
            "--output",
            "refinements.jsonl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 refinement records"));

    let emitted = fs::read_to_string(dir.path().join("refinements.jsonl")).unwrap();
    assert_eq!(emitted.lines().count(), 1);
    assert!(emitted.contains("\"pr_number\":42"));
    assert!(emitted.contains("\"before_file\""));
    // URL fields are scrubbed from emitted records.
    assert!(!emitted.contains("html_url"));

    // Summary and resume state land beside the run.
    assert!(dir.path().join("out/summary.json").exists());
    assert!(dir.path().join(".prweave/state.json").exists());

    // A resumed run processes nothing new and emits no duplicates.
    prweave()
        .current_dir(dir.path())
        .args([
            "refine",
            "input.jsonl",
            "--replay-file",
            "replay.jsonl",
            "--output",
            "refinements.jsonl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 refinement records"));
    let emitted = fs::read_to_string(dir.path().join("refinements.jsonl")).unwrap();
    assert_eq!(emitted.lines().count(), 1);
}

#[test]
fn build_assembles_dataset() {
    let dir = tempfile::tempdir().unwrap();

    fs::write(
        dir.path().join("issues.jsonl"),
        format!(
            "{}\n",
            serde_json::json!({"number": 42, "title": "Fix account lifecycle", "state": "merged"})
        ),
    )
    .unwrap();
    fs::write(dir.path().join("commits.jsonl"), "\n").unwrap();
    fs::write(
        dir.path().join("refinements.jsonl"),
        format!(
            "{}\n",
            serde_json::json!({
                "pr_number": 42,
                "diff_comment": {
                    "position": {"old_path": "src/account.cpp", "new_path": "src/account.cpp"},
                    "diff_position": {"start_new_line": 11, "end_new_line": 12},
                    "created_at": "2024-03-03T00:00:00+08:00"
                },
                "before_file": {"filename": "src/account.cpp",
                    "patch": "@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context"},
                "after_file": {"filename": "src/account.cpp",
                    "patch": "@@ -10,4 +10,4 @@\n context\n-a\n+a2\n b\n context"}
            })
        ),
    )
    .unwrap();

    prweave()
        .current_dir(dir.path())
        .args([
            "build",
            "--pr-issue",
            "issues.jsonl",
            "--pr-commit",
            "commits.jsonl",
            "--refinement",
            "refinements.jsonl",
            "--repo",
            "openharmony/account_os_account",
            "--output",
            "dataset.jsonl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 samples"));

    let dataset = fs::read_to_string(dir.path().join("dataset.jsonl")).unwrap();
    assert!(dataset.contains("\"repo\":\"openharmony/account_os_account\""));
    assert!(dataset.contains("\"has_comment\":true"));
    assert!(dataset.contains("\"title\":\"Fix account lifecycle\""));
}
