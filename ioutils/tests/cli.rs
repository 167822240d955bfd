//! CLI tests for the `ioutils` binary.
//!
//! Spawns the binary and checks stdout and exit codes.

use std::process::Command;

use ioutils::exit_codes;
use ioutils::io::config::{IoConfig, load_config};

fn ioutils(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ioutils"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn atoi_prints_integer() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = ioutils(temp.path())
        .args(["call", "atoi", "\"42\""])
        .output()
        .expect("ioutils call");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "42\n");
}

#[test]
fn atoi_failure_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = ioutils(temp.path())
        .args(["call", "atoi", "\"abc\""])
        .output()
        .expect("ioutils call");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("atoi"));
}

#[cfg(unix)]
#[test]
fn exec_prints_result_record() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = ioutils(temp.path())
        .args(["call", "IOExec", "[\"echo\", \"hello\"]"])
        .output()
        .expect("ioutils call");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "[exitValue |-> 0, stdout |-> \"hello\\n\", stderr |-> \"\"]\n"
    );
}

#[test]
fn backends_follow_config_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("ioutils.toml"),
        "serializers = [\"JSON\", \"RAW\"]\n",
    )
    .expect("write config");

    let output = ioutils(temp.path())
        .arg("backends")
        .output()
        .expect("ioutils backends");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "JSON\nRAW\n");
}

#[test]
fn invalid_config_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("ioutils.toml"), "serializers = [\"XML\"]\n")
        .expect("write config");
    let output = ioutils(temp.path())
        .arg("backends")
        .output()
        .expect("ioutils backends");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn serialize_round_trip_via_json_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("value.json");
    let path_arg = serde_json::to_string(&path.display().to_string()).expect("path json");

    let written = ioutils(temp.path())
        .args([
            "call",
            "Serialize",
            "{\"a\": [1, 2]}",
            &path_arg,
            "\"JSON\"",
            "{}",
        ])
        .output()
        .expect("serialize");
    assert_eq!(String::from_utf8_lossy(&written.stdout), "TRUE\n");

    let read = ioutils(temp.path())
        .args(["call", "--json", "Deserialize", &path_arg, "\"JSON\"", "{}"])
        .output()
        .expect("deserialize");
    let parsed: serde_json::Value = serde_json::from_slice(&read.stdout).expect("json output");
    assert_eq!(parsed, serde_json::json!({"a": [1, 2]}));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("ioutils.toml");

    let output = ioutils(temp.path()).arg("init").output().expect("init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), IoConfig::default());

    std::fs::write(&path, "serializers = [\"JSON\"]\n").expect("edit config");
    let output = ioutils(temp.path()).arg("init").output().expect("init");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));
    assert_eq!(load_config(&path).expect("load").serializers, vec!["JSON"]);

    let output = ioutils(temp.path())
        .args(["init", "--force"])
        .output()
        .expect("init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), IoConfig::default());
}

#[test]
fn init_honors_config_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = ioutils(temp.path())
        .args(["init", "--config", "conf/custom.toml"])
        .output()
        .expect("init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let output = ioutils(temp.path())
        .args(["backends", "--config", "conf/custom.toml"])
        .output()
        .expect("backends");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "RAW\nJSON\n");
}
