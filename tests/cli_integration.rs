//! End-to-end runs of the `inheritmap` binary against the fixture manifests.

mod common;

use assert_cmd::Command;
use common::{fixtures_dir, ROOT, TRACKED};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn inheritmap(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inheritmap").unwrap();
    cmd.current_dir(workdir)
        .env_remove("RUST_LOG")
        .arg("--search-path")
        .arg(fixtures_dir());
    cmd
}

#[test]
fn writes_dot_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graph.gv");

    inheritmap(temp_dir.path())
        .arg(ROOT)
        .arg(&output)
        .assert()
        .success();

    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("label=\"ClassForTesting5\""));
    assert!(dot.contains("4 -> 3;"));
}

#[test]
fn json_output_with_similarity() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graph.json");

    inheritmap(temp_dir.path())
        .args([ROOT, output.to_str().unwrap(), "--funcname", TRACKED, "--similarity"])
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["root"], ROOT);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(json["similarity_edges"][0]["a"], 1);
    assert_eq!(json["similarity_edges"][0]["b"], 2);
    assert_eq!(json["similarity"]["method"], "reference");
}

#[test]
fn import_list_and_text_format() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("tree.out");

    inheritmap(temp_dir.path())
        .args([
            ROOT,
            output.to_str().unwrap(),
            "--import-list",
            "helpers",
            "--output-format",
            "txt",
            "--funcname",
            TRACKED,
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("Auditing  [overrides at helpers.py:3]"));
}

#[test]
fn config_file_sets_exclusions_and_cutoff() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".inheritmap.toml"),
        "[hierarchy]\nexclude = [\"ClassForTesting2\"]\n\n[similarity]\nmethod = \"permute\"\n",
    )
    .unwrap();
    let output = temp_dir.path().join("graph.json");

    inheritmap(temp_dir.path())
        .args([ROOT, "graph.json", "--funcname", TRACKED, "--similarity"])
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let names: Vec<_> = json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["ClassForTesting", "ClassForTesting3"]);
    assert_eq!(json["similarity"]["method"], "permute");
}

#[test]
fn unknown_funcname_fails_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graph.gv");

    let assert = inheritmap(temp_dir.path())
        .args([ROOT, output.to_str().unwrap(), "--funcname", "missing_func"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("missing_func is not an attribute of"));
    assert!(!output.exists());
}

#[test]
fn undotted_root_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let assert = inheritmap(temp_dir.path())
        .args(["ClassForTesting", "graph.gv"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("module.Class"));
}

#[test]
fn similarity_on_a_root_that_inherits_the_operation() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graph.json");

    inheritmap(temp_dir.path())
        .args([
            "testing.ClassForTesting3",
            output.to_str().unwrap(),
            "--import-list",
            "helpers",
            "--funcname",
            TRACKED,
            "--similarity",
        ])
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["nodes"][0]["overrides"], false);
    assert_eq!(json["nodes"][1]["name"], "Auditing");
    assert_eq!(json["similarity"]["method"], "reference");
    assert_eq!(json["similarity"]["reference"], 2);
    assert!(json["similarity_edges"].as_array().unwrap().is_empty());
}

#[test]
fn similarity_without_any_override_source_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graph.json");

    inheritmap(temp_dir.path())
        .args([
            "testing.ClassForTesting3",
            output.to_str().unwrap(),
            "--funcname",
            TRACKED,
            "--similarity",
        ])
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(json.get("similarity").is_none());
}

#[test]
fn above_cutoff_table_on_stdout() {
    let temp_dir = TempDir::new().unwrap();

    let assert = inheritmap(temp_dir.path())
        .args([
            ROOT,
            "-",
            "--output-format",
            "txt",
            "--funcname",
            TRACKED,
            "--similarity",
            "--above-cutoff",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Similarity matrix (cutoff 0.75):"));
    assert!(!stdout.contains("0.42"));
    assert!(stdout.contains("ClassForTesting: ClassForTesting2"));
}
