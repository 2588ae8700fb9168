//! Integration tests for the `meshherd` CLI binary.
//!
//! Every test runs against a database in a temp directory with the
//! offline adapter, so no radio or user configuration is involved.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `meshherd` binary with env isolation.
fn meshherd_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("meshherd");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG")
        .env_remove("MESHHERD_CONFIG_FILE")
        .env_remove("MESHHERD_DB_FILE")
        .env_remove("MESHHERD_OUTPUT")
        .env_remove("MESHHERD_LOG_LEVEL");
    cmd
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("database.db")
    }

    fn write_db(&self, contents: &str) {
        std::fs::write(self.db(), contents).unwrap();
    }

    fn read_db(&self) -> String {
        std::fs::read_to_string(self.db()).unwrap()
    }

    /// `meshherd --database <tmp>/database.db <args>`
    fn cmd<const N: usize>(&self, args: [&str; N]) -> assert_cmd::Command {
        let mut cmd = meshherd_cmd(self.dir.path());
        cmd.arg("--database").arg(self.db()).args(args);
        cmd
    }
}

const LIGHT: &str = r#"{"id":1,"type":"Router","ieeeAddr":"0x00124b0000000001","nwkAddr":4097,"modelId":"bulb","epList":[1,2],"endpoints":{"1":{"profId":260,"inClusterList":[0,4,6]}}}"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = meshherd_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected 'Usage' in output:\n{stderr}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    meshherd_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("groups")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("db")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    meshherd_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("meshherd"));
}

// ── Groups ──────────────────────────────────────────────────────────

#[test]
fn test_groups_create_writes_record() {
    let ws = Workspace::new();
    ws.cmd(["groups", "create", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Group 10 created"));

    assert_eq!(
        ws.read_db(),
        r#"{"id":1,"type":"Group","groupID":10,"members":[],"meta":{}}"#
    );
}

#[test]
fn test_groups_list_json() {
    let ws = Workspace::new();
    ws.cmd(["groups", "create", "3"]).assert().success();
    ws.cmd(["groups", "create", "1"]).assert().success();

    let output = ws.cmd(["groups", "list", "-o", "json-compact"]).output().unwrap();
    assert!(output.status.success());
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let addresses: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["groupAddress"].as_u64().unwrap())
        .collect();
    assert_eq!(addresses, vec![1, 3]);
}

#[test]
fn test_groups_create_duplicate_is_conflict() {
    let ws = Workspace::new();
    ws.cmd(["groups", "create", "5"]).assert().success();
    ws.cmd(["groups", "create", "5"]).assert().code(6);
}

#[test]
fn test_groups_create_out_of_range_is_usage_error() {
    let ws = Workspace::new();
    ws.cmd(["groups", "create", "70000"]).assert().code(2);
    ws.cmd(["groups", "create", "-1"]).assert().code(2);
    assert!(!ws.db().exists());
}

#[test]
fn test_groups_show_missing_is_not_found() {
    let ws = Workspace::new();
    ws.cmd(["groups", "show", "42"])
        .assert()
        .code(4);
}

#[test]
fn test_groups_member_round_trip() {
    let ws = Workspace::new();
    ws.write_db(LIGHT);
    ws.cmd(["groups", "create", "7"]).assert().success();

    ws.cmd(["groups", "add-member", "7", "00:12:4b:00:00:00:00:01", "1"])
        .assert()
        .success();
    assert!(ws.read_db().contains(
        r#""members":[{"deviceIeeeAddr":"0x00124b0000000001","endpointID":1}]"#
    ));

    ws.cmd(["groups", "show", "7", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0x00124b0000000001/1"));

    ws.cmd(["groups", "remove-member", "7", "0x00124b0000000001", "1"])
        .assert()
        .success();
    assert!(ws.read_db().contains(r#""members":[]"#));
}

#[test]
fn test_groups_add_unknown_endpoint_is_not_found() {
    let ws = Workspace::new();
    ws.write_db(LIGHT);
    ws.cmd(["groups", "create", "7"]).assert().success();
    ws.cmd(["groups", "add-member", "7", "0x00124b0000000001", "9"])
        .assert()
        .code(4);
}

#[test]
fn test_groups_delete_offline_still_removes_record() {
    let ws = Workspace::new();
    ws.write_db(LIGHT);
    ws.cmd(["groups", "create", "7"]).assert().success();
    ws.cmd(["groups", "add-member", "7", "0x00124b0000000001", "1"])
        .assert()
        .success();

    ws.cmd(["groups", "delete", "7"])
        .assert()
        .success()
        .stderr(predicate::str::contains("did not leave the group"));

    assert_eq!(ws.read_db(), LIGHT);
}

// ── Database and devices ────────────────────────────────────────────

#[test]
fn test_db_inspect_counts_kinds() {
    let ws = Workspace::new();
    ws.write_db(LIGHT);
    ws.cmd(["groups", "create", "2"]).assert().success();

    let output = ws.cmd(["db", "inspect", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 2);
}

#[test]
fn test_untyped_lines_survive_group_create() {
    let ws = Workspace::new();
    let untyped = r#"{"id":4,"ieeeAddr":"0x00124b0000000004"}"#;
    ws.write_db(&format!("{LIGHT}\n{untyped}"));
    ws.cmd(["groups", "create", "9"]).assert().success();

    assert_eq!(
        ws.read_db(),
        format!("{LIGHT}\n{untyped}\n{}", r#"{"id":5,"type":"Group","groupID":9,"members":[],"meta":{}}"#)
    );

    let output = ws.cmd(["db", "inspect", "-o", "json"]).output().unwrap();
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["untyped"], 1);
}

#[test]
fn test_db_inspect_malformed_is_data_error() {
    let ws = Workspace::new();
    ws.write_db("{not json");
    ws.cmd(["db", "inspect"])
        .assert()
        .code(9);
}

#[test]
fn test_devices_list_plain() {
    let ws = Workspace::new();
    ws.write_db(LIGHT);
    ws.cmd(["devices", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0x00124b0000000001"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");
    meshherd_cmd(home.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");

    meshherd_cmd(home.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    meshherd_cmd(home.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .code(6);

    meshherd_cmd(home.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_reads_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");
    std::fs::write(&path, "log_level = \"debug\"\n\n[network]\ndefault_source_endpoint = 3\n").unwrap();

    let output = meshherd_cmd(home.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["log_level"], "debug");
    assert_eq!(shown["network"]["default_source_endpoint"], 3);
}
