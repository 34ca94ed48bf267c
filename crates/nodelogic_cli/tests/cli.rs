// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runs the `nodelogic` binary against blueprints on disk.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const NOT_BLUEPRINT: &str = r#"{
  "Nodes": [
    {"NodeGUID": "a", "NodePositionX": 0.0, "NodePositionY": 0.0, "NodeType": 7, "NodeName": "A", "NodeDisplayName": "INPUT", "NodeState": false},
    {"NodeGUID": "n", "NodePositionX": 150.0, "NodePositionY": 0.0, "NodeType": 3, "NodeName": null, "NodeDisplayName": "NOT", "NodeState": false},
    {"NodeGUID": "b", "NodePositionX": 300.0, "NodePositionY": 0.0, "NodeType": 8, "NodeName": "B", "NodeDisplayName": "OUTPUT", "NodeState": false}
  ],
  "Connections": [
    {"OutputPort": "a", "InputPort": "n"},
    {"OutputPort": "n", "InputPort": "b"}
  ]
}"#;

fn nodelogic(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nodelogic"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run nodelogic")
}

fn compile_not_gate(dir: &Path) {
    let blueprint = dir.join("Inverter.graph");
    fs::write(&blueprint, NOT_BLUEPRINT).expect("Failed to write blueprint");
    let output = nodelogic(&["compile", blueprint.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_compile_writes_both_documents() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    compile_not_gate(temp_dir.path());

    assert!(temp_dir.path().join("Inverter components.json").exists());
    let names = fs::read_to_string(temp_dir.path().join("Inverter names.json")).unwrap();
    let names: serde_json::Value = serde_json::from_str(&names).unwrap();
    assert_eq!(names["A"], "a");
    assert_eq!(names["B"], "b");
}

#[test]
fn test_run_prints_output_events() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    compile_not_gate(temp_dir.path());
    let dir = temp_dir.path().to_str().unwrap();

    let output = nodelogic(&["run", dir, "Inverter", "-s", "A=1", "-s", "A"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["B -> 0", "B -> 1", "B = 1"]);
}

#[test]
fn test_run_rejects_unknown_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    compile_not_gate(temp_dir.path());
    let dir = temp_dir.path().to_str().unwrap();

    let output = nodelogic(&["run", dir, "Inverter", "-s", "Missing=1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown name"));
}

#[test]
fn test_check_reports_clean_graph() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    compile_not_gate(temp_dir.path());
    let dir = temp_dir.path().to_str().unwrap();

    let output = nodelogic(&["check", dir, "Inverter"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("inputs [A], outputs [B]"));
}

#[test]
fn test_check_fails_on_feedback_loop() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let components = r#"{
        "x": {"type": 3, "GUID": "x", "InputPort1": "y", "InputPort2": "", "OutputPort1": "y", "OutputPort2": "", "State": false},
        "y": {"type": 3, "GUID": "y", "InputPort1": "x", "InputPort2": "", "OutputPort1": "x", "OutputPort2": "", "State": false}
    }"#;
    fs::write(temp_dir.path().join("Ring components.json"), components).unwrap();
    fs::write(temp_dir.path().join("Ring names.json"), "{}").unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    let output = nodelogic(&["check", dir, "Ring"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("feedback loop through"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 wiring issue(s)"));
}

#[test]
fn test_compile_warns_about_feedback_loop() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blueprint = temp_dir.path().join("Ring.graph");
    let ring = r#"{
      "Nodes": [
        {"NodeGUID": "x", "NodePositionX": 0.0, "NodePositionY": 0.0, "NodeType": 3, "NodeName": null, "NodeDisplayName": "NOT", "NodeState": false},
        {"NodeGUID": "y", "NodePositionX": 150.0, "NodePositionY": 0.0, "NodeType": 3, "NodeName": null, "NodeDisplayName": "NOT", "NodeState": false}
      ],
      "Connections": [
        {"OutputPort": "x", "InputPort": "y"},
        {"OutputPort": "y", "InputPort": "x"}
      ]
    }"#;
    fs::write(&blueprint, ring).expect("Failed to write blueprint");

    let output = Command::new(env!("CARGO_BIN_EXE_nodelogic"))
        .args(["compile", blueprint.to_str().unwrap()])
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run nodelogic");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Feedback loop through"));
    assert!(stderr.contains("never ends if the limit is 0"));
    assert!(!stderr.contains("refuse"));
}
