use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use lineage_core::analyzer::{default_backend_registry, AnalyzerRequest};
use lineage_core::config::{
    load_project_config, DirectoryConfig, ProjectConfig, DEFAULT_CONFIG_FILENAME,
};
use lineage_core::onchain::OnChainTarget;
use lineage_core::services::{build_document, Document, DocumentRequest};

use crate::{canonicalize_or_current, split_paths};

/// Flags accepted by `extract`. Anything set here overrides the project config.
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Path to a project config (JSON or YAML). Defaults to `lineage.json` if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Analyzer target: a project directory, or a contract address with --onchain.
    #[arg(long)]
    pub target: Option<String>,

    /// Output file for the JSON document.
    #[arg(long)]
    pub out: Option<String>,

    /// Directory holding the target contracts (relative to --target).
    #[arg(long)]
    pub contracts_dir: Option<String>,

    /// Comma-separated paths excluded from the target contracts (repeatable).
    #[arg(long)]
    pub exclude_contract_paths: Vec<String>,

    /// Directory holding the test contracts (relative to --target).
    #[arg(long)]
    pub tests_dir: Option<String>,

    /// Comma-separated paths excluded from the test contracts (repeatable).
    #[arg(long)]
    pub exclude_test_paths: Vec<String>,

    /// Treat --target as a deployed contract address.
    #[arg(long, default_value_t = false)]
    pub onchain: bool,

    /// Network prefix of the on-chain contract (e.g. mainet, poly, bsc).
    #[arg(long)]
    pub network_prefix: Option<String>,

    /// Explorer API key for the on-chain contract.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Extra analyzer options as a JSON object.
    #[arg(long)]
    pub analyzer_args: Option<String>,

    /// Pre-exported analyzer model; selects the snapshot backend.
    #[arg(long)]
    pub model: Option<String>,

    /// Analyzer backend name (see `backends`).
    #[arg(long)]
    pub backend: Option<String>,

    /// Omit interfaces from inherited contracts.
    #[arg(long, default_value_t = false)]
    pub skip_interfaces: bool,

    /// Omit libraries from inherited contracts.
    #[arg(long, default_value_t = false)]
    pub skip_libraries: bool,

    /// Omit abstract contracts from inherited contracts.
    #[arg(long, default_value_t = false)]
    pub skip_abstract: bool,

    /// Only emit top-level trees for these contract names (repeatable).
    #[arg(long = "contract")]
    pub contracts: Vec<String>,

    /// Do not require the contracts/tests directories to exist.
    #[arg(long, default_value_t = false)]
    pub lenient_target: bool,

    /// Write run metadata (timestamps, digest, counts) to this file.
    #[arg(long)]
    pub metadata: Option<String>,
}

/// Run metadata written next to the document when `--metadata` is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRunMetadata {
    pub tool_version: String,
    pub backend: String,
    pub analyzer: Option<String>,
    pub target: String,
    pub onchain: bool,
    pub output: String,
    pub contracts: usize,
    pub nodes: usize,
    pub document_sha256: String,
    pub started_at: String,
    pub finished_at: String,
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub output: PathBuf,
    pub contracts: usize,
    pub nodes: usize,
    pub digest: String,
}

/// Run the analyzer, build the inheritance document, and write it out.
///
/// Nothing is written unless the whole document builds.
pub fn extract_command(opts: &ExtractOptions) -> Result<ExtractSummary> {
    let started_at = Utc::now().to_rfc3339();

    let mut config = resolve_config(opts.config.as_deref())?;
    apply_overrides(&mut config, opts)?;
    config.validate(opts.onchain).context("Invalid project configuration")?;

    // Validate the target and selection roots before any analyzer work.
    let (request, document_request) = if opts.onchain {
        let address = opts
            .target
            .as_deref()
            .ok_or_else(|| anyhow!("--target must be a contract address with --onchain"))?;
        let target =
            OnChainTarget::new(opts.network_prefix.as_deref(), address, opts.api_key.as_deref())?;
        let document_request = DocumentRequest::all()
            .with_policy(config.inheritance.for_onchain())
            .with_whitelist(config.contract_whitelist.clone());
        (AnalyzerRequest::onchain(target), document_request)
    } else {
        let target_dir = canonicalize_or_current(opts.target.as_deref().unwrap_or("."))?;
        if !target_dir.exists() {
            return Err(anyhow!("Target directory '{}' does not exist", target_dir.display()));
        }
        let document_request = config.document_request().with_base_dir(&target_dir);
        document_request.validate_roots().context("Invalid contract selection")?;
        (AnalyzerRequest::local(&target_dir), document_request)
    };
    let mut request = request.with_options(config.analyzer_args.clone());
    if let Some(model) = &opts.model {
        request = request.with_model_path(canonicalize_or_current(model)?);
    }

    let backend_name = match (&opts.backend, &opts.model) {
        (Some(name), _) => name.clone(),
        (None, Some(_)) => "snapshot".to_string(),
        (None, None) => "command".to_string(),
    };
    let registry = default_backend_registry();
    let backend = registry.require(&backend_name)?;

    info!(backend = %backend_name, target = %request.target.describe(), "loading analyzer model");
    let model = backend.load(&request).context("Failed to load analyzer model")?;

    let document =
        build_document(&model, &document_request).context("Failed to build contract document")?;

    let output = PathBuf::from(&config.out);
    let digest = write_document(&document, &output)?;
    let summary = ExtractSummary {
        output: output.clone(),
        contracts: document.contracts.len(),
        nodes: document.node_count(),
        digest,
    };

    if let Some(path) = &opts.metadata {
        let meta = ExtractionRunMetadata {
            tool_version: lineage_core::version().to_string(),
            backend: backend_name,
            analyzer: model.analyzer().map(str::to_string),
            target: request.target.describe(),
            onchain: opts.onchain,
            output: output.display().to_string(),
            contracts: summary.contracts,
            nodes: summary.nodes,
            document_sha256: summary.digest.clone(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&meta)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write run metadata at {}", path))?;
    }

    println!("Extracted inheritance trees:");
    println!("  Contracts: {}", summary.contracts);
    println!("  Nodes: {}", summary.nodes);
    println!("  Output: {}", summary.output.display());
    println!("  SHA-256: {}", summary.digest);

    Ok(summary)
}

/// Serialize the whole document first, then write it in one go.
fn write_document(document: &Document, output: &Path) -> Result<String> {
    let json = document.to_json_pretty().context("Failed to serialize contract document")?;
    let digest = document.digest().context("Failed to hash contract document")?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output dir {}", parent.display()))?;
    }
    fs::write(output, json)
        .with_context(|| format!("Failed to write document at {}", output.display()))?;
    Ok(digest)
}

/// Explicit `--config` must exist; otherwise fall back to `lineage.json`, then defaults.
fn resolve_config(explicit: Option<&str>) -> Result<ProjectConfig> {
    if let Some(path) = explicit {
        return load_project_config(Path::new(path));
    }

    let default_path = canonicalize_or_current(DEFAULT_CONFIG_FILENAME)?;
    if default_path.is_file() {
        info!(path = %default_path.display(), "reading project config");
        return load_project_config(&default_path);
    }

    warn!(
        path = %default_path.display(),
        "no config file found, using the default project configuration"
    );
    Ok(ProjectConfig::default())
}

fn apply_overrides(config: &mut ProjectConfig, opts: &ExtractOptions) -> Result<()> {
    if let Some(out) = &opts.out {
        config.out = out.clone();
    }
    if let Some(dir) = &opts.contracts_dir {
        config.target_contracts.directory = dir.clone();
    }
    let exclude_contracts = split_paths(&opts.exclude_contract_paths);
    if !exclude_contracts.is_empty() {
        config.target_contracts.exclude_paths = exclude_contracts;
    }
    if let Some(dir) = &opts.tests_dir {
        config.test_contracts.get_or_insert_with(DirectoryConfig::default).directory = dir.clone();
    }
    let exclude_tests = split_paths(&opts.exclude_test_paths);
    if !exclude_tests.is_empty() {
        config.test_contracts.get_or_insert_with(DirectoryConfig::default).exclude_paths =
            exclude_tests;
    }
    if opts.skip_interfaces {
        config.inheritance.include_interfaces = false;
    }
    if opts.skip_libraries {
        config.inheritance.include_libraries = false;
    }
    if opts.skip_abstract {
        config.inheritance.include_abstract = false;
    }
    if !opts.contracts.is_empty() {
        config.contract_whitelist = opts.contracts.clone();
    }
    if opts.lenient_target {
        config.strict_target = false;
    }
    if let Some(raw) = &opts.analyzer_args {
        config.analyzer_args = parse_analyzer_args(raw)?;
    }
    Ok(())
}

/// Parse `--analyzer-args` as a JSON object.
pub fn parse_analyzer_args(raw: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(raw).context("Failed to parse --analyzer-args as a JSON object")
}
