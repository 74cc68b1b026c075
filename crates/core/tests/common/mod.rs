#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use lineage_core::model::{Declaration, DeclarationId, Function, FunctionId, Parameter, Visibility};
use lineage_core::session::{ModelExport, ProgramModel};
use tempfile::TempDir;

/// On-disk fixture project whose declarations point at real files.
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
    pub declarations: Vec<Declaration>,
    pub sources: BTreeMap<PathBuf, String>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        // Canonical root so path-prefix matching sees the same form as the filter.
        let root = dir.path().canonicalize().expect("canonical tempdir");
        Self { _dir: dir, root, declarations: Vec::new(), sources: BTreeMap::new() }
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }

    /// Append `contract <name> ... {}` to `rel` and register its declaration.
    pub fn contract(&mut self, id: u64, rel: &str, name: &str, supers: &[u64]) -> &mut Declaration {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        let text = self.sources.entry(path.clone()).or_default();
        let code = if supers.is_empty() {
            format!("contract {name} {{}}")
        } else {
            let parents: Vec<String> = supers.iter().map(|s| format!("C{s}")).collect();
            format!("contract {name} is {} {{}}", parents.join(", "))
        };
        let start = text.len();
        text.push_str(&code);
        text.push('\n');
        fs::write(&path, text.as_bytes()).expect("write fixture source");

        self.declarations.push(Declaration {
            id: DeclarationId(id),
            name: name.to_string(),
            absolute_path: path,
            relative_path: PathBuf::from(rel),
            source_start: start,
            source_length: code.len(),
            is_abstract: false,
            is_interface: false,
            is_library: false,
            superclasses: supers.iter().copied().map(DeclarationId).collect(),
            functions: Vec::new(),
        });
        self.declarations.last_mut().expect("just pushed")
    }

    pub fn model(&self) -> ProgramModel {
        ProgramModel::new(self.declarations.clone(), self.sources.clone()).expect("valid model")
    }

    pub fn export(&self) -> ModelExport {
        ModelExport {
            analyzer: Some("fixture-analyzer 1.0".into()),
            declarations: self.declarations.clone(),
            sources: self.sources.clone(),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

pub fn names(decls: &[&Declaration]) -> Vec<String> {
    decls.iter().map(|d| d.name.clone()).collect()
}

pub fn transfer_function(id: u64) -> Function {
    Function {
        id: FunctionId(id),
        name: "transfer".into(),
        visibility: Visibility::External,
        is_view: false,
        is_pure: false,
        parameters: vec![
            Parameter {
                name: "to".into(),
                is_constant: false,
                is_storage_location: false,
                type_signature: "address".into(),
            },
            Parameter {
                name: "amount".into(),
                is_constant: false,
                is_storage_location: false,
                type_signature: "uint256".into(),
            },
        ],
        return_types: vec!["bool".into()],
        modifier_names: vec!["whenNotPaused".into()],
    }
}
