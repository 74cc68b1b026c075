//! Core data model for analyzer declarations and the extracted inheritance trees.
//!
//! Two halves live here:
//! - Input types (`Declaration`, `Function`, `Parameter`) mirror what the external
//!   analyzer reports. They are read-only for the rest of the crate.
//! - Output types (`TreeNode`, `FunctionDescriptor`, `Document`) are what gets
//!   serialized for downstream tooling. Their serde field names are part of the
//!   output format and must not change.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stable identity of a declaration within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationId(pub u64);

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a function within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub u64);

/// Function visibility as reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::External => "external",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract/interface/library declaration resolved by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: DeclarationId,
    pub name: String,
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    /// Byte offset of the declaration in its file.
    pub source_start: usize,
    /// Byte length of the declaration's span.
    pub source_length: usize,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_library: bool,
    /// Direct parents only, in declaration order.
    #[serde(default)]
    pub superclasses: Vec<DeclarationId>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

/// A member function as attached to a declaration by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_view: bool,
    #[serde(default)]
    pub is_pure: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_types: Vec<String>,
    #[serde(default)]
    pub modifier_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub is_constant: bool,
    #[serde(default)]
    pub is_storage_location: bool,
    pub type_signature: String,
}

/// Flattened, serializable projection of one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub id: FunctionId,
    pub name: String,
    pub visibility: String,
    pub view: bool,
    pub pure: bool,
    pub returns: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub is_constant: bool,
    pub is_storage: bool,
    #[serde(rename = "type")]
    pub type_signature: String,
}

/// One materialized node of an inheritance tree.
///
/// Nodes never share children: a common ancestor reached through two parents is
/// built twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: DeclarationId,
    pub name: String,
    #[serde(rename = "code")]
    pub source_code: String,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub is_library: bool,
    pub functions: Vec<FunctionDescriptor>,
    pub inherited_contracts: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.inherited_contracts.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Depth of the subtree; a node without parents has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.inherited_contracts.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}
