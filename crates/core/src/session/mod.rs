//! Explicit analyzer session.
//!
//! Every component in `services` receives an `AnalyzerSession` as a parameter
//! instead of reaching for ambient state. `ProgramModel` is the in-memory
//! implementation built from an analyzer's exported model.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::AnalyzerError;
use crate::model::{Declaration, DeclarationId};

/// Read-only view over one analysis session.
pub trait AnalyzerSession {
    /// All declarations in the compiled program, in analyzer order.
    fn declarations(&self) -> &[Declaration];

    /// Resolve a declaration by id.
    fn declaration(&self, id: DeclarationId) -> Option<&Declaration>;

    /// Full text of the file at `path` (keyed by absolute path).
    fn source_text(&self, path: &Path) -> Option<&str>;
}

/// Wire format of a model exported by the external analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelExport {
    /// Free-form analyzer identification (name + version).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Absolute path -> full file text.
    #[serde(default)]
    pub sources: BTreeMap<PathBuf, String>,
}

/// In-memory analyzer session.
#[derive(Debug, Clone)]
pub struct ProgramModel {
    analyzer: Option<String>,
    declarations: Vec<Declaration>,
    index: HashMap<DeclarationId, usize>,
    sources: HashMap<PathBuf, String>,
}

impl ProgramModel {
    /// Build a session from declarations and a file-content map.
    ///
    /// Fails when ids repeat or a superclass id does not resolve.
    pub fn new(
        declarations: Vec<Declaration>,
        sources: impl IntoIterator<Item = (PathBuf, String)>,
    ) -> Result<Self, AnalyzerError> {
        let mut index = HashMap::with_capacity(declarations.len());
        for (pos, decl) in declarations.iter().enumerate() {
            if index.insert(decl.id, pos).is_some() {
                return Err(AnalyzerError::InvalidModel(format!(
                    "duplicate declaration id {}",
                    decl.id
                )));
            }
        }

        for decl in &declarations {
            if let Some(missing) = decl.superclasses.iter().find(|id| !index.contains_key(id)) {
                return Err(AnalyzerError::InvalidModel(format!(
                    "declaration {} ({}) inherits from unknown id {}",
                    decl.name, decl.id, missing
                )));
            }
        }

        Ok(Self { analyzer: None, declarations, index, sources: sources.into_iter().collect() })
    }

    pub fn from_export(export: ModelExport) -> Result<Self, AnalyzerError> {
        let mut model = Self::new(export.declarations, export.sources)?;
        model.analyzer = export.analyzer;
        Ok(model)
    }

    pub fn from_json(body: &str) -> Result<Self, AnalyzerError> {
        let export: ModelExport = serde_json::from_str(body)
            .map_err(|e| AnalyzerError::InvalidModel(format!("failed to parse model JSON: {e}")))?;
        Self::from_export(export)
    }

    pub fn analyzer(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }

    pub fn set_analyzer(&mut self, analyzer: impl Into<String>) {
        self.analyzer = Some(analyzer.into());
    }

    /// Load file text from disk for every declaration path the export did not carry.
    ///
    /// Unreadable files stay absent; slicing such a declaration fails later with
    /// `MissingSource`. Returns the number of files loaded.
    pub fn hydrate_sources(&mut self) -> usize {
        let wanted: HashSet<PathBuf> = self
            .declarations
            .iter()
            .map(|d| d.absolute_path.clone())
            .filter(|p| !self.sources.contains_key(p))
            .collect();

        let mut loaded = 0;
        for path in wanted {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(path = %path.display(), bytes = text.len(), "loaded source file");
                    self.sources.insert(path, text);
                    loaded += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "source file unreadable");
                }
            }
        }
        loaded
    }
}

impl AnalyzerSession for ProgramModel {
    fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.index.get(&id).map(|&pos| &self.declarations[pos])
    }

    fn source_text(&self, path: &Path) -> Option<&str> {
        self.sources.get(path).map(String::as_str)
    }
}
