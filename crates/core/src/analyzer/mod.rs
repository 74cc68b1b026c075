//! Adapters for the external static analyzer.
//!
//! The analyzer itself (parsing, type resolution) lives outside this crate. A
//! backend's only job is to hand back a `ProgramModel` for a target, either by
//! reading a previously exported model or by running an exporter process.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::onchain::OnChainTarget;
use crate::session::ProgramModel;

/// Environment variable naming the exporter executable.
pub const ANALYZER_BIN_ENV: &str = "LINEAGE_ANALYZER_BIN";

/// Exporter executable used when `LINEAGE_ANALYZER_BIN` is unset.
pub const DEFAULT_ANALYZER_BIN: &str = "lineage-export";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Analyzer target not found at {}", .0.display())]
    MissingTarget(PathBuf),
    #[error("Backend not found: {0}")]
    MissingBackend(String),
    #[error("Analyzer backend error: {0}")]
    Backend(String),
    #[error("Invalid analyzer model: {0}")]
    InvalidModel(String),
}

/// What the analyzer should load.
#[derive(Debug, Clone)]
pub enum AnalyzerTarget {
    /// A local project directory (or single file).
    Local(PathBuf),
    /// A deployed contract fetched through a chain explorer.
    OnChain(OnChainTarget),
}

impl AnalyzerTarget {
    /// String form passed to the exporter as its positional target.
    pub fn describe(&self) -> String {
        match self {
            AnalyzerTarget::Local(path) => path.display().to_string(),
            AnalyzerTarget::OnChain(target) => target.analyzer_target(),
        }
    }

    pub fn is_onchain(&self) -> bool {
        matches!(self, AnalyzerTarget::OnChain(_))
    }
}

/// Request handed to a backend.
#[derive(Debug, Clone)]
pub struct AnalyzerRequest {
    pub target: AnalyzerTarget,
    /// Extra analyzer options (JSON map), passed through untouched.
    pub options: Map<String, Value>,
    /// Pre-exported model file, used by the snapshot backend.
    pub model_path: Option<PathBuf>,
}

impl AnalyzerRequest {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self { target: AnalyzerTarget::Local(path.into()), options: Map::new(), model_path: None }
    }

    pub fn onchain(target: OnChainTarget) -> Self {
        Self { target: AnalyzerTarget::OnChain(target), options: Map::new(), model_path: None }
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Options as sent to the analyzer; on-chain targets add their credential.
    pub fn effective_options(&self) -> Map<String, Value> {
        match &self.target {
            AnalyzerTarget::Local(_) => self.options.clone(),
            AnalyzerTarget::OnChain(target) => target.analyzer_options(&self.options),
        }
    }

    fn check_local_target(&self) -> Result<(), AnalyzerError> {
        if let AnalyzerTarget::Local(path) = &self.target {
            if !path.exists() {
                return Err(AnalyzerError::MissingTarget(path.clone()));
            }
        }
        Ok(())
    }
}

/// Trait implemented by analyzer backends.
pub trait AnalyzerBackend: Send + Sync {
    fn load(&self, request: &AnalyzerRequest) -> Result<ProgramModel, AnalyzerError>;
    fn name(&self) -> &'static str;
}

/// Registry for analyzer backends; callers select by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Box<dyn AnalyzerBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self { backends: HashMap::new() }
    }

    pub fn register<B: AnalyzerBackend + 'static>(&mut self, backend: B) -> &mut Self {
        self.backends.insert(backend.name().to_string(), Box::new(backend));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalyzerBackend> {
        self.backends.get(name).map(|b| &**b)
    }

    /// Like `get`, but reports the known names on a miss.
    pub fn require(&self, name: &str) -> Result<&dyn AnalyzerBackend, AnalyzerError> {
        self.get(name).ok_or_else(|| {
            AnalyzerError::MissingBackend(format!(
                "{} (available: {})",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Sorted list of registered backend names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.backends.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Reads a model previously exported by the analyzer.
pub struct SnapshotBackend;

impl AnalyzerBackend for SnapshotBackend {
    fn load(&self, request: &AnalyzerRequest) -> Result<ProgramModel, AnalyzerError> {
        request.check_local_target()?;
        let path = request.model_path.as_ref().ok_or_else(|| {
            AnalyzerError::Backend("snapshot backend requires a model file".to_string())
        })?;
        let body = fs::read_to_string(path).map_err(|e| {
            AnalyzerError::Backend(format!("failed to read model {}: {e}", path.display()))
        })?;
        let mut model = ProgramModel::from_json(&body)?;
        let loaded = model.hydrate_sources();
        debug!(model = %path.display(), loaded, "snapshot model loaded");
        Ok(model)
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

/// Runs the exporter process and parses the model it prints on stdout.
///
/// Invocation: `<program> <target> [--options <json>]`.
pub struct CommandBackend {
    pub program: PathBuf,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Resolve the exporter from `LINEAGE_ANALYZER_BIN`, falling back to `lineage-export`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(ANALYZER_BIN_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYZER_BIN)),
        )
    }
}

impl AnalyzerBackend for CommandBackend {
    fn load(&self, request: &AnalyzerRequest) -> Result<ProgramModel, AnalyzerError> {
        request.check_local_target()?;

        let mut command = Command::new(&self.program);
        command.arg(request.target.describe());
        let options = request.effective_options();
        if !options.is_empty() {
            let encoded = serde_json::to_string(&options).map_err(|e| {
                AnalyzerError::Backend(format!("failed to encode analyzer options: {e}"))
            })?;
            command.arg("--options").arg(encoded);
        }
        if let AnalyzerTarget::Local(dir) = &request.target {
            if dir.is_dir() {
                command.current_dir(dir);
            }
        }

        info!(program = %self.program.display(), target = %request.target.describe(), "running analyzer");
        let output = command.output().map_err(|e| {
            AnalyzerError::Backend(format!("failed to spawn {}: {e}", self.program.display()))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::Backend(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut model = ProgramModel::from_json(&stdout)?;
        if model.analyzer().is_none() {
            model.set_analyzer(self.program.display().to_string());
        }
        model.hydrate_sources();
        Ok(model)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Registry populated with the snapshot backend and the environment-configured exporter.
pub fn default_backend_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(SnapshotBackend);
    registry.register(CommandBackend::from_env());
    registry
}
