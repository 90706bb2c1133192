use std::{fs, path::PathBuf, process::Command};

use serde_json::{json, Value};

fn snapshot_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("outpost-{}-{name}.json", std::process::id()));
    let status = Command::new(env!("CARGO_BIN_EXE_outpost"))
        .args(["run", "--seed", "3", "--turns", "1", "--output"])
        .arg(&path)
        .env("RUST_LOG", "outpost=warn")
        .status()
        .expect("failed to launch outpost binary");
    assert!(status.success(), "run failed");
    path
}

fn inspect_edited(name: &str, edit: impl FnOnce(&mut Value)) -> (bool, String) {
    let path = snapshot_file(name);
    let mut snapshot: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("snapshot written"))
            .expect("snapshot is JSON");
    edit(&mut snapshot);
    fs::write(&path, snapshot.to_string()).expect("snapshot rewritten");

    let output = Command::new(env!("CARGO_BIN_EXE_outpost"))
        .arg("inspect")
        .arg(&path)
        .env("RUST_LOG", "outpost=warn")
        .output()
        .expect("failed to launch outpost inspect");
    let _ = fs::remove_file(&path);
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn untouched_snapshot_inspects_cleanly() {
    let (success, stderr) = inspect_edited("untouched", |_| {});

    assert!(success, "inspect failed: {stderr}");
}

#[test]
fn oversized_board_is_refused() {
    let (success, stderr) = inspect_edited("oversized", |snapshot| {
        snapshot["width"] = json!(4_000_000_000_u32);
        snapshot["height"] = json!(4_000_000_000_u32);
    });

    assert!(!success);
    assert!(stderr.contains("is larger than 1024x1024"), "{stderr}");
}

#[test]
fn dead_citizen_is_refused() {
    let (success, stderr) = inspect_edited("dead-citizen", |snapshot| {
        snapshot["citizens"][0]["hp"] = json!(0);
    });

    assert!(!success);
    assert!(stderr.contains("is recorded with no hit points"), "{stderr}");
}
