use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::model::{Declaration, TreeNode};
use crate::services::{ExtractError, InheritancePolicy, PathFilter, TreeBuilder};
use crate::session::AnalyzerSession;

/// The output document: `{ "contracts": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub contracts: Vec<TreeNode>,
}

impl Document {
    /// Pretty JSON with 4-space indentation. Deterministic for a given document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }

    /// SHA-256 of the pretty JSON, hex encoded.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let json = self.to_json_pretty()?;
        Ok(format!("{:x}", Sha256::digest(json.as_bytes())))
    }

    /// Every node's source text, depth-first pre-order, inherited contracts included.
    pub fn concatenated_source(&self) -> String {
        fn walk(node: &TreeNode, out: &mut String) {
            out.push_str(&node.source_code);
            for parent in &node.inherited_contracts {
                walk(parent, out);
            }
        }

        let mut out = String::new();
        for contract in &self.contracts {
            walk(contract, &mut out);
        }
        out
    }

    /// Total nodes across all trees, duplicates included.
    pub fn node_count(&self) -> usize {
        self.contracts.iter().map(TreeNode::node_count).sum()
    }
}

/// A selection root plus the paths carved out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRoots {
    pub root: PathBuf,
    #[serde(default)]
    pub excludes: Vec<PathBuf>,
}

impl ScopeRoots {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), excludes: Vec::new() }
    }

    pub fn excluding<I, P>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.excludes.extend(excludes.into_iter().map(Into::into));
        self
    }
}

/// Which declarations become top-level trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every declaration in analyzer order (on-chain targets).
    All,
    /// Target declarations first, then optional test declarations.
    Scoped { target: ScopeRoots, tests: Option<ScopeRoots> },
}

#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub selection: Selection,
    /// Require selection roots to be existing directories.
    pub strict_target: bool,
    pub policy: InheritancePolicy,
    /// When non-empty, only top-level declarations with these names are kept.
    pub contract_whitelist: Vec<String>,
    /// Base for relative roots; the current directory when unset.
    pub base_dir: Option<PathBuf>,
}

impl DocumentRequest {
    pub fn scoped(target: ScopeRoots) -> Self {
        Self {
            selection: Selection::Scoped { target, tests: None },
            strict_target: true,
            policy: InheritancePolicy::default(),
            contract_whitelist: Vec::new(),
            base_dir: None,
        }
    }

    pub fn all() -> Self {
        Self { selection: Selection::All, ..Self::scoped(ScopeRoots::default()) }
    }

    pub fn with_tests(mut self, tests: ScopeRoots) -> Self {
        if let Selection::Scoped { tests: slot, .. } = &mut self.selection {
            *slot = Some(tests);
        }
        self
    }

    pub fn with_policy(mut self, policy: InheritancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_whitelist(mut self, names: Vec<String>) -> Self {
        self.contract_whitelist = names;
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn lenient(mut self) -> Self {
        self.strict_target = false;
        self
    }

    /// Check the selection roots without touching the analyzer.
    ///
    /// `build_document` runs the same checks; calling this first lets a caller
    /// fail before any analyzer work starts.
    pub fn validate_roots(&self) -> Result<(), ExtractError> {
        if let Selection::Scoped { target, tests } = &self.selection {
            let base_dir = self.resolve_base_dir()?;
            scope_filter(target, self.strict_target, &base_dir)?;
            if let Some(tests) = tests {
                scope_filter(tests, self.strict_target, &base_dir)?;
            }
        }
        Ok(())
    }

    fn resolve_base_dir(&self) -> Result<PathBuf, ExtractError> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => env::current_dir()
                .map_err(|source| ExtractError::Io { path: PathBuf::from("."), source }),
        }
    }
}

/// Select declarations and build one tree per selected declaration.
///
/// Target and test selections are concatenated without deduplication, then
/// narrowed by the whitelist and the inheritance policy. The first failing
/// tree aborts the whole build.
pub fn build_document<S>(session: &S, request: &DocumentRequest) -> Result<Document, ExtractError>
where
    S: AnalyzerSession + ?Sized,
{
    let selected: Vec<&Declaration> = select_declarations(session, request)?
        .into_iter()
        .filter(|decl| {
            request.contract_whitelist.is_empty()
                || request.contract_whitelist.iter().any(|name| *name == decl.name)
        })
        .filter(|decl| request.policy.admits(decl))
        .collect();

    let builder = TreeBuilder::new(session).with_policy(request.policy);
    let contracts = selected
        .iter()
        .map(|decl| builder.build(decl))
        .collect::<Result<Vec<_>, _>>()?;

    let document = Document { contracts };
    info!(
        contracts = document.contracts.len(),
        nodes = document.node_count(),
        filtered_parents = !request.policy.is_unfiltered(),
        "built inheritance document"
    );
    Ok(document)
}

fn select_declarations<'a, S>(
    session: &'a S,
    request: &DocumentRequest,
) -> Result<Vec<&'a Declaration>, ExtractError>
where
    S: AnalyzerSession + ?Sized,
{
    let (target, tests) = match &request.selection {
        Selection::All => return Ok(session.declarations().iter().collect()),
        Selection::Scoped { target, tests } => (target, tests),
    };

    let base_dir = request.resolve_base_dir()?;

    let mut selected = scope_filter(target, request.strict_target, &base_dir)?
        .filter(session.declarations());
    if let Some(tests) = tests {
        selected.extend(
            scope_filter(tests, request.strict_target, &base_dir)?.filter(session.declarations()),
        );
    }
    Ok(selected)
}

fn scope_filter(
    scope: &ScopeRoots,
    strict: bool,
    base_dir: &Path,
) -> Result<PathFilter, ExtractError> {
    PathFilter::new(&scope.root, &scope.excludes, strict, base_dir)
}
