//! Project configuration.
//!
//! A project config lives (by default) at `lineage.json` in the working
//! directory. YAML (`.yaml`/`.yml`) is accepted as well; the format is chosen by
//! file extension. CLI flags override whatever the file provides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::{DocumentRequest, InheritancePolicy, ScopeRoots};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "lineage.json";

/// Default output file for the extracted document.
pub const DEFAULT_OUTPUT_FILENAME: &str = "contracts.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("project configuration must specify project name")]
    MissingName,
    #[error("contracts directory must be specified in local mode")]
    MissingContractsDir,
    #[error("output path must not be empty")]
    MissingOutput,
}

/// A directory to scan plus the paths excluded from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory path, relative to the analyzer target unless absolute.
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

impl DirectoryConfig {
    pub fn new(directory: impl Into<String>) -> Self {
        Self { directory: directory.into(), exclude_paths: Vec::new() }
    }

    pub fn is_set(&self) -> bool {
        !self.directory.trim().is_empty()
    }

    pub fn to_scope(&self) -> ScopeRoots {
        ScopeRoots::new(&self.directory).excluding(self.exclude_paths.iter())
    }
}

/// Serializable configuration for one extraction project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Output path for the extracted document.
    #[serde(default = "default_out")]
    pub out: String,
    #[serde(default)]
    pub target_contracts: DirectoryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_contracts: Option<DirectoryConfig>,
    #[serde(default)]
    pub inheritance: InheritancePolicy,
    /// When non-empty, only these contract names become top-level trees.
    #[serde(default)]
    pub contract_whitelist: Vec<String>,
    /// Require the contracts/tests directories to exist.
    #[serde(default = "default_strict")]
    pub strict_target: bool,
    /// Extra options forwarded to the analyzer.
    #[serde(default)]
    pub analyzer_args: Map<String, Value>,
}

fn default_out() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

fn default_strict() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "example".to_string(),
            out: default_out(),
            target_contracts: DirectoryConfig::default(),
            test_contracts: None,
            inheritance: InheritancePolicy::default(),
            contract_whitelist: Vec::new(),
            strict_target: true,
            analyzer_args: Map::new(),
        }
    }
}

impl ProjectConfig {
    /// Check the fields a local (non on-chain) extraction needs.
    pub fn validate(&self, onchain: bool) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }
        if self.out.trim().is_empty() {
            return Err(ConfigError::MissingOutput);
        }
        if !onchain && !self.target_contracts.is_set() {
            return Err(ConfigError::MissingContractsDir);
        }
        Ok(())
    }

    /// Document request for a local extraction.
    pub fn document_request(&self) -> DocumentRequest {
        let mut request = DocumentRequest::scoped(self.target_contracts.to_scope())
            .with_policy(self.inheritance)
            .with_whitelist(self.contract_whitelist.clone());
        if let Some(tests) = self.test_contracts.as_ref().filter(|t| t.is_set()) {
            request = request.with_tests(tests.to_scope());
        }
        if !self.strict_target {
            request = request.lenient();
        }
        request
    }

    /// Serialize in the format implied by `path`'s extension.
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        if is_yaml(path) {
            serde_yaml::to_string(self).context("Failed to serialize project config to YAML")
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize project config to JSON")
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let body = self.to_string_for(path)?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write project config at {}", path.display()))
    }
}

/// Load a project config (JSON or YAML) from disk.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project config at {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&body).context("Failed to parse project config YAML")
    } else {
        serde_json::from_str(&body).context("Failed to parse project config JSON")
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}
