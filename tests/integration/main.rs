//! Integration tests for Corescope
//!
//! These tests verify that the crates and the CLI work together correctly.

use corescope_core::{decompose, read_edge_list, Edge, NodeId};
use corescope_timeline::{Action, RevisionId, Script, SessionRegistry, Timeline};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn corescope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_corescope"))
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = corescope().arg("--help").output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("k-core decomposition"));
}

#[test]
fn test_cli_decompose() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.txt");
    fs::write(&path, "1 2\n2 3\n3 1\n3 4\n").unwrap();

    let output = corescope()
        .current_dir(dir.path())
        .args(["--compact", "decompose"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["2"]["nodes"], serde_json::json!([1, 2, 3]));
    assert_eq!(value["1"]["pruned_edges"], serde_json::json!([[3, 4]]));
}

#[test]
fn test_cli_rejects_empty_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    fs::write(&path, "[]").unwrap();

    let output = corescope()
        .current_dir(dir.path())
        .arg("decompose")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("edge list cannot be empty"));
}

#[test]
fn test_cli_replay_and_plan() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("edits.txt");
    fs::write(&script, "add 1 2\nadd 2 3\nremove 1 2\n").unwrap();

    let output = corescope()
        .current_dir(dir.path())
        .args(["--compact", "replay"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["current"], 4);
    assert_eq!(report["edges"], serde_json::json!([[2, 3]]));
    assert_eq!(report["tree"]["children"][0]["id"], 2);

    let output = corescope()
        .current_dir(dir.path())
        .args(["--compact", "plan", "--to", "2"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["relation"]["kind"], "ancestor");
    assert_eq!(
        plan["steps"],
        serde_json::json!([
            { "action": "add", "source": 1, "target": 2 },
            { "action": "remove", "source": 2, "target": 3 }
        ])
    );
}

/// Snapshot file → timeline → edits → navigation → decomposition
#[test]
fn test_snapshot_to_timeline_flow() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, "[[1, 2], [2, 3], [3, 1]]").unwrap();

    let edges = read_edge_list(&path).unwrap();
    let mut timeline = Timeline::from_edges(edges).unwrap();
    let triangle = timeline.current();
    assert_eq!(triangle, RevisionId(4));

    Script::parse("add 3 4\nadd 4 1\n")
        .unwrap()
        .replay(&mut timeline)
        .unwrap();
    let result = timeline.decompose(&Default::default()).unwrap();
    assert_eq!(result.level_of(NodeId(4)), Some(2));

    timeline.navigate(triangle).unwrap();
    timeline.add_change(Action::Remove, 1, 2).unwrap();
    let result = decompose(&timeline.current_edges()).unwrap();
    assert_eq!(result.max_core(), 1);
    assert_eq!(timeline.find(triangle).unwrap().children().len(), 2);
}

#[test]
fn test_concurrent_sessions() {
    let registry = std::sync::Arc::new(SessionRegistry::new());
    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                let session = registry.get_or_create(&format!("user-{i}"));
                let mut session = session.lock();
                let timeline = session.timeline_mut();
                for j in 0..10 {
                    timeline.add_change(Action::Add, i * 100 + j, i * 100 + j + 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 4);
    let session = registry.get("user-2").unwrap();
    let session = session.lock();
    assert_eq!(session.timeline().tree().len(), 11);
    assert!(session
        .timeline()
        .current_edges()
        .contains(&Edge::new(200, 201)));
}
