//! Contract selection and inheritance-tree materialization.
//!
//! - `filter`: path-prefix selection of declarations under a root.
//! - `slicer`: recovers a declaration's exact source text from byte offsets.
//! - `functions`: flattens member functions into descriptors.
//! - `tree`: recursive, non-sharing inheritance-tree construction.
//! - `document`: ties the above together into the output document.

use std::path::PathBuf;

use thiserror::Error;

use crate::analyzer::AnalyzerError;
use crate::model::DeclarationId;
use crate::onchain::OnChainError;

pub mod document;
pub mod filter;
pub mod functions;
pub mod slicer;
pub mod tree;

pub use document::{build_document, Document, DocumentRequest, ScopeRoots, Selection};
pub use filter::PathFilter;
pub use functions::project_functions;
pub use slicer::extract_code;
pub use tree::{InheritancePolicy, TreeBuilder};

/// Errors raised while selecting declarations or building trees.
///
/// Every variant is fatal for the current document build.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Target directory '{}' does not exist", .0.display())]
    MissingTarget(PathBuf),
    #[error("Target path '{}' is not a directory", .0.display())]
    InvalidTarget(PathBuf),
    #[error(
        "Source range {start}..{end} of {name} exceeds {} ({len} bytes)",
        .path.display()
    )]
    OutOfRange { name: String, path: PathBuf, start: usize, end: usize, len: usize },
    #[error("Source range {start}..{end} of {name} does not fall on character boundaries")]
    SliceBoundary { name: String, start: usize, end: usize },
    #[error("No source text loaded for {}", .0.display())]
    MissingSource(PathBuf),
    #[error("Declaration {0} is not known to the analyzer session")]
    UnresolvedDeclaration(DeclarationId),
    #[error("Cyclic inheritance: {}", .chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },
    #[error(transparent)]
    OnChain(#[from] OnChainError),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error("Failed to resolve path {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// True for the two target-validation failures raised in strict mode.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, ExtractError::MissingTarget(_) | ExtractError::InvalidTarget(_))
    }
}
