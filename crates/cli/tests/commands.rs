use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use contract_lineage::commands::{backend_infos, chain_infos, parse_analyzer_args};
use contract_lineage::{canonicalize_or_current, split_paths};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn init_config_writes_default_and_refuses_overwrite() {
    let dir = tempdir().expect("tempdir");

    cargo_bin_cmd!("contract-lineage")
        .current_dir(dir.path())
        .args(["init-config", "--name", "vaults", "--contracts-dir", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lineage.json"));

    let body = fs::read_to_string(dir.path().join("lineage.json")).expect("config");
    let config: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(config["name"], "vaults");
    assert_eq!(config["target_contracts"]["directory"], "src");
    assert_eq!(config["out"], "contracts.json");

    cargo_bin_cmd!("contract-lineage")
        .current_dir(dir.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cargo_bin_cmd!("contract-lineage")
        .current_dir(dir.path())
        .args(["init-config", "--force"])
        .assert()
        .success();
    let body = fs::read_to_string(dir.path().join("lineage.json")).expect("config");
    assert!(body.contains("\"example\""));
}

#[test]
fn init_config_writes_yaml_by_extension() {
    let dir = tempdir().expect("tempdir");

    cargo_bin_cmd!("contract-lineage")
        .current_dir(dir.path())
        .args(["init-config", "--out", "lineage.yaml"])
        .assert()
        .success();

    let body = fs::read_to_string(dir.path().join("lineage.yaml")).expect("config");
    assert!(body.contains("name: example"));
}

#[test]
fn chains_json_lists_prefixes_and_credential_keys() {
    let output = cargo_bin_cmd!("contract-lineage")
        .args(["chains", "--json"])
        .output()
        .expect("run chains");
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 8);
    assert_eq!(entries[0]["prefix"], "mainet");
    assert_eq!(entries[0]["credential_key"], "etherscan_api_key");
    assert_eq!(chain_infos().len(), 8);
}

#[test]
fn chains_text_output() {
    cargo_bin_cmd!("contract-lineage")
        .arg("chains")
        .assert()
        .success()
        .stdout(predicate::str::contains("- mumbai (api key -> test_polygonscan_api_key)"));
}

#[test]
fn backends_listing() {
    cargo_bin_cmd!("contract-lineage")
        .args(["backends", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"snapshot\""))
        .stdout(predicate::str::contains("\"command\""));

    let names: Vec<String> = backend_infos().into_iter().map(|b| b.name).collect();
    assert_eq!(names, vec!["command", "snapshot"]);
}

#[test]
fn split_paths_handles_commas_and_blanks() {
    let raw = vec!["a, b".to_string(), "".to_string(), "c,,".to_string()];
    assert_eq!(split_paths(&raw), vec!["a", "b", "c"]);
    assert!(split_paths(&[]).is_empty());
}

#[test]
fn analyzer_args_must_be_an_object() {
    let parsed = parse_analyzer_args(r#"{"solc_remaps": "@oz=lib/oz", "fail_on": 1}"#).unwrap();
    assert_eq!(parsed.len(), 2);
    assert!(parse_analyzer_args("[]").is_err());
    assert!(parse_analyzer_args("not json").is_err());
}

#[test]
fn canonicalize_or_current_resolves_existing_relative_path() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current("nested").expect("canonicalize nested");
    let missing = canonicalize_or_current("missing").expect("join missing");
    std::env::set_current_dir(original).expect("restore cwd");

    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
    assert!(missing.ends_with("missing"));
}
