#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

/// A small Solidity-like project on disk plus the model an analyzer would export for it.
///
/// Layout: `src/Token.sol` (Ownable, Token), `src/mocks/MockToken.sol`, `test/TokenTest.sol`.
pub struct Project {
    _dir: TempDir,
    pub root: PathBuf,
}

pub const OWNABLE: &str = "abstract contract Ownable {}";
pub const TOKEN: &str = "contract Token is Ownable { function transfer(address to, uint256 amount) external returns (bool) {} }";
pub const MOCK: &str = "contract MockToken is Token {}";
pub const TOKEN_TEST: &str = "contract TokenTest is Token {}";

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().canonicalize().expect("canonical tempdir");
        write(&root.join("src/Token.sol"), &format!("{OWNABLE}\n{TOKEN}\n"));
        write(&root.join("src/mocks/MockToken.sol"), MOCK);
        write(&root.join("test/TokenTest.sol"), TOKEN_TEST);
        Self { _dir: dir, root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Model export with sources left out, so the snapshot backend reads them from disk.
    pub fn model(&self) -> Value {
        let token_file = self.path("src/Token.sol");
        let mut token = declaration(
            2,
            "Token",
            &token_file,
            "src/Token.sol",
            OWNABLE.len() + 1,
            TOKEN.len(),
            &[1],
            false,
        );
        token["functions"] = json!([{
            "id": 20,
            "name": "transfer",
            "visibility": "external",
            "parameters": [
                { "name": "to", "type_signature": "address" },
                { "name": "amount", "type_signature": "uint256" }
            ],
            "return_types": ["bool"]
        }]);
        let mock = declaration(
            3,
            "MockToken",
            &self.path("src/mocks/MockToken.sol"),
            "src/mocks/MockToken.sol",
            0,
            MOCK.len(),
            &[2],
            false,
        );
        let token_test = declaration(
            4,
            "TokenTest",
            &self.path("test/TokenTest.sol"),
            "test/TokenTest.sol",
            0,
            TOKEN_TEST.len(),
            &[2],
            false,
        );
        json!({
            "analyzer": "fixture-analyzer 1.0",
            "declarations": [
                declaration(1, "Ownable", &token_file, "src/Token.sol", 0, OWNABLE.len(), &[], true),
                token,
                mock,
                token_test,
            ]
        })
    }

    pub fn write_model(&self) -> PathBuf {
        let path = self.path("model.json");
        write(&path, &serde_json::to_string_pretty(&self.model()).expect("model json"));
        path
    }
}

#[allow(clippy::too_many_arguments)]
fn declaration(
    id: u64,
    name: &str,
    abs: &Path,
    rel: &str,
    start: usize,
    length: usize,
    supers: &[u64],
    is_abstract: bool,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "absolute_path": abs,
        "relative_path": rel,
        "source_start": start,
        "source_length": length,
        "is_abstract": is_abstract,
        "superclasses": supers,
    })
}

pub fn write(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, body).expect("write file");
}

pub fn read_json(path: &Path) -> Value {
    let body = fs::read_to_string(path).expect("read json");
    serde_json::from_str(&body).expect("parse json")
}

pub fn top_names(doc: &Value) -> Vec<String> {
    doc["contracts"]
        .as_array()
        .expect("contracts array")
        .iter()
        .map(|c| c["name"].as_str().expect("name").to_string())
        .collect()
}
