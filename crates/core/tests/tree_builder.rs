mod common;

use std::path::Path;

use common::Fixture;
use lineage_core::model::{Declaration, DeclarationId, TreeNode};
use lineage_core::services::{ExtractError, InheritancePolicy, TreeBuilder};
use lineage_core::session::AnalyzerSession;

fn child_names(node: &TreeNode) -> Vec<&str> {
    node.inherited_contracts.iter().map(|n| n.name.as_str()).collect()
}

/// Child(A, B), A(C); ids: C=3, A=1, B=2, Child=4.
fn chain_fixture() -> Fixture {
    let mut fx = Fixture::new();
    fx.contract(3, "src/C.sol", "C", &[]);
    fx.contract(1, "src/A.sol", "A", &[3]);
    fx.contract(2, "src/B.sol", "B", &[]);
    fx.contract(4, "src/Child.sol", "Child", &[1, 2]);
    fx
}

#[test]
fn tree_mirrors_superclass_order_recursively() {
    let fx = chain_fixture();
    let model = fx.model();
    let child = model.declaration(DeclarationId(4)).unwrap();

    let tree = TreeBuilder::new(&model).build(child).unwrap();
    assert_eq!(tree.name, "Child");
    assert_eq!(tree.source_code, "contract Child is C1, C2 {}");
    assert_eq!(child_names(&tree), vec!["A", "B"]);
    assert_eq!(child_names(&tree.inherited_contracts[0]), vec!["C"]);
    assert!(tree.inherited_contracts[1].inherited_contracts.is_empty());

    // Each child equals the tree built directly from that parent.
    let builder = TreeBuilder::new(&model);
    let a = builder.build(model.declaration(DeclarationId(1)).unwrap()).unwrap();
    assert_eq!(tree.inherited_contracts[0], a);
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn diamond_ancestor_is_materialized_once_per_path() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/Base.sol", "Base", &[]);
    fx.contract(2, "src/Left.sol", "Left", &[1]);
    fx.contract(3, "src/Right.sol", "Right", &[1]);
    fx.contract(4, "src/Bottom.sol", "Bottom", &[2, 3]);
    let model = fx.model();

    let tree = TreeBuilder::new(&model).build(model.declaration(DeclarationId(4)).unwrap()).unwrap();
    let left_base = &tree.inherited_contracts[0].inherited_contracts[0];
    let right_base = &tree.inherited_contracts[1].inherited_contracts[0];
    assert_eq!(left_base, right_base);
    assert!(!std::ptr::eq(left_base, right_base));
    assert_eq!(tree.node_count(), 5);
}

#[test]
fn policy_prunes_parent_and_its_ancestors() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/IERC20.sol", "IERC20", &[]).is_interface = true;
    fx.contract(2, "src/Ownable.sol", "Ownable", &[]);
    fx.contract(3, "src/ERC20.sol", "ERC20", &[1]).is_abstract = true;
    fx.contract(4, "src/Token.sol", "Token", &[3, 2]);
    let model = fx.model();
    let token = model.declaration(DeclarationId(4)).unwrap();

    let all = TreeBuilder::new(&model).build(token).unwrap();
    assert_eq!(child_names(&all), vec!["ERC20", "Ownable"]);
    assert_eq!(child_names(&all.inherited_contracts[0]), vec!["IERC20"]);

    let no_abstract = InheritancePolicy { include_abstract: false, ..Default::default() };
    let pruned = TreeBuilder::new(&model).with_policy(no_abstract).build(token).unwrap();
    // IERC20 is only reachable through ERC20, so it disappears with it.
    assert_eq!(child_names(&pruned), vec!["Ownable"]);

    let no_interfaces = InheritancePolicy { include_interfaces: false, ..Default::default() };
    let tree = TreeBuilder::new(&model).with_policy(no_interfaces).build(token).unwrap();
    assert_eq!(child_names(&tree), vec!["ERC20", "Ownable"]);
    assert!(tree.inherited_contracts[0].inherited_contracts.is_empty());
}

#[test]
fn builder_builds_the_root_it_is_given() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/Math.sol", "Math", &[]).is_library = true;
    let model = fx.model();
    let policy = InheritancePolicy { include_libraries: false, ..Default::default() };
    let tree = TreeBuilder::new(&model)
        .with_policy(policy)
        .build(model.declaration(DeclarationId(1)).unwrap())
        .unwrap();
    assert!(tree.is_library);
}

#[test]
fn default_policy_includes_everything() {
    assert!(InheritancePolicy::default().is_unfiltered());
    let strict = InheritancePolicy { include_libraries: false, ..Default::default() };
    assert!(!strict.is_unfiltered());
}

#[test]
fn building_twice_yields_equal_trees() {
    let fx = chain_fixture();
    let model = fx.model();
    let child = model.declaration(DeclarationId(4)).unwrap();
    let builder = TreeBuilder::new(&model);
    assert_eq!(builder.build(child).unwrap(), builder.build(child).unwrap());
}

#[test]
fn cyclic_inheritance_is_reported_with_its_chain() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/A.sol", "A", &[2]);
    fx.contract(2, "src/B.sol", "B", &[1]);
    let model = fx.model();

    let err = TreeBuilder::new(&model).build(model.declaration(DeclarationId(1)).unwrap()).unwrap_err();
    match err {
        ExtractError::CyclicInheritance { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn slicing_failure_aborts_the_tree() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/Base.sol", "Base", &[]).source_length = 10_000;
    fx.contract(2, "src/Child.sol", "Child", &[1]);
    let model = fx.model();
    let err = TreeBuilder::new(&model).build(model.declaration(DeclarationId(2)).unwrap()).unwrap_err();
    assert!(matches!(err, ExtractError::OutOfRange { ref name, .. } if name == "Base"));
}

/// Session that does not resolve superclass ids, to exercise the builder's own check.
struct DanglingSession {
    declarations: Vec<Declaration>,
    text: String,
}

impl AnalyzerSession for DanglingSession {
    fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.id == id)
    }

    fn source_text(&self, _path: &Path) -> Option<&str> {
        Some(&self.text)
    }
}

#[test]
fn unresolved_superclass_is_an_error() {
    let mut fx = Fixture::new();
    fx.contract(1, "src/Orphan.sol", "Orphan", &[77]);
    let session = DanglingSession {
        declarations: fx.declarations.clone(),
        text: fx.sources.values().next().unwrap().clone(),
    };
    let err = TreeBuilder::new(&session).build(&session.declarations[0]).unwrap_err();
    assert!(matches!(err, ExtractError::UnresolvedDeclaration(DeclarationId(77))));
}
