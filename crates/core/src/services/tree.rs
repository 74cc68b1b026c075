use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Declaration, DeclarationId, TreeNode};
use crate::services::{extract_code, project_functions, ExtractError};
use crate::session::AnalyzerSession;

/// Which kinds of declarations appear in the document.
///
/// Applies to top-level selections and to `inherited_contracts` alike. The
/// default includes everything. A parent that fails the policy is pruned
/// together with its own ancestors on that branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritancePolicy {
    #[serde(default = "default_true")]
    pub include_interfaces: bool,
    #[serde(default = "default_true")]
    pub include_libraries: bool,
    #[serde(default = "default_true")]
    pub include_abstract: bool,
}

fn default_true() -> bool {
    true
}

impl Default for InheritancePolicy {
    fn default() -> Self {
        Self { include_interfaces: true, include_libraries: true, include_abstract: true }
    }
}

impl InheritancePolicy {
    pub fn admits(&self, declaration: &Declaration) -> bool {
        (!declaration.is_interface || self.include_interfaces)
            && (!declaration.is_library || self.include_libraries)
            && (!declaration.is_abstract || self.include_abstract)
    }

    /// On-chain extraction only honours the interface switch.
    pub fn for_onchain(self) -> Self {
        Self { include_libraries: true, include_abstract: true, ..self }
    }

    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }
}

/// Builds one independent inheritance tree per declaration.
///
/// Construction is depth-first and pre-order, and parents are visited in the
/// analyzer's reported order. Nothing is memoized: a diamond ancestor is built
/// once per path that reaches it, so output size can grow exponentially with
/// diamond depth.
pub struct TreeBuilder<'s, S: AnalyzerSession + ?Sized> {
    session: &'s S,
    policy: InheritancePolicy,
}

impl<'s, S: AnalyzerSession + ?Sized> TreeBuilder<'s, S> {
    pub fn new(session: &'s S) -> Self {
        Self { session, policy: InheritancePolicy::default() }
    }

    pub fn with_policy(mut self, policy: InheritancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> InheritancePolicy {
        self.policy
    }

    pub fn build(&self, declaration: &Declaration) -> Result<TreeNode, ExtractError> {
        let mut path = Vec::new();
        self.build_node(declaration, &mut path)
    }

    fn build_node(
        &self,
        declaration: &Declaration,
        path: &mut Vec<DeclarationId>,
    ) -> Result<TreeNode, ExtractError> {
        // `path` holds the ids from the root down to this node's parent.
        if path.contains(&declaration.id) {
            return Err(self.cycle_error(path, declaration));
        }

        let mut node = TreeNode {
            id: declaration.id,
            name: declaration.name.clone(),
            source_code: extract_code(self.session, declaration)?,
            is_abstract: declaration.is_abstract,
            is_interface: declaration.is_interface,
            is_library: declaration.is_library,
            functions: project_functions(&declaration.functions),
            inherited_contracts: Vec::with_capacity(declaration.superclasses.len()),
        };

        path.push(declaration.id);
        for &parent_id in &declaration.superclasses {
            let parent = self
                .session
                .declaration(parent_id)
                .ok_or(ExtractError::UnresolvedDeclaration(parent_id))?;
            if !self.policy.admits(parent) {
                debug!(child = %declaration.name, parent = %parent.name, "pruned parent");
                continue;
            }
            node.inherited_contracts.push(self.build_node(parent, path)?);
        }
        path.pop();

        Ok(node)
    }

    fn cycle_error(&self, path: &[DeclarationId], repeated: &Declaration) -> ExtractError {
        let start = path.iter().position(|id| *id == repeated.id).unwrap_or(0);
        let mut chain: Vec<String> = path[start..]
            .iter()
            .map(|id| {
                self.session
                    .declaration(*id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        chain.push(repeated.name.clone());
        ExtractError::CyclicInheritance { chain }
    }
}
