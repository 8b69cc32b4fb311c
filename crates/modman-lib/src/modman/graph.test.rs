// Tests for the resolution graph

use super::*;

fn node(slug: &str, requiredness: Requiredness) -> ModNode {
    ModNode::new(format!("id-{slug}"), slug, requiredness, "root")
}

// ============================================================================
// Basic Graph Operations
// ============================================================================

#[test]
fn test_new_graph_is_empty() {
    let graph = DependencyGraph::new();
    assert!(!graph.contains("a"));
    assert!(graph.cycles().is_empty());
}

#[test]
fn test_add_node_is_idempotent_and_aliased() {
    let mut graph = DependencyGraph::new();
    let a = graph.add_node(node("a", Requiredness::Required));
    let b = graph.add_node(node("a", Requiredness::Required));
    assert_eq!(a, b);

    graph.alias("A-Mod", "id-a");
    assert!(graph.contains("a"));
    assert!(graph.contains("id-a"));
    assert!(graph.contains("A-Mod"));
    assert!(!graph.contains("b"));
}

#[test]
fn test_missing_node_edge_fails() {
    let mut graph = DependencyGraph::new();
    graph.add_node(node("a", Requiredness::Required));
    let err = graph
        .add_dependency("a", "ghost", Requiredness::Required)
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { .. }));
}

// ============================================================================
// Requiredness
// ============================================================================

fn requiredness(graph: &DependencyGraph, id: &str) -> Option<Requiredness> {
    graph.node(id).map(|node| node.requiredness)
}

#[test]
fn test_required_wins_over_optional() {
    let mut graph = DependencyGraph::new();
    graph.add_node(node("a", Requiredness::Required));
    graph.add_node(node("b", Requiredness::Required));
    graph.add_node(node("z", Requiredness::Optional));

    graph.add_dependency("b", "z", Requiredness::Optional).unwrap();
    assert_eq!(requiredness(&graph, "z"), Some(Requiredness::Optional));

    graph.add_dependency("a", "z", Requiredness::Required).unwrap();
    assert_eq!(requiredness(&graph, "z"), Some(Requiredness::Required));

    // A later optional edge never downgrades
    graph.add_node(node("z", Requiredness::Optional));
    assert_eq!(requiredness(&graph, "z"), Some(Requiredness::Required));
}

#[test]
fn test_promote() {
    let mut graph = DependencyGraph::new();
    graph.add_node(node("z", Requiredness::Optional));
    assert!(graph.promote("z"));
    assert!(!graph.promote("z"));
    assert!(!graph.promote("missing"));
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn test_dependents() {
    let mut graph = DependencyGraph::new();
    for slug in ["x", "y", "z"] {
        graph.add_node(node(slug, Requiredness::Required));
    }
    graph.add_dependency("x", "y", Requiredness::Required).unwrap();
    graph.add_dependency("z", "y", Requiredness::Optional).unwrap();

    let mut dependents: Vec<_> = graph.dependents_of("y").iter().map(|n| n.slug.clone()).collect();
    dependents.sort();
    assert_eq!(dependents, vec!["x", "z"]);
    assert!(graph.dependents_of("x").is_empty());
    assert!(graph.dependents_of("ghost").is_empty());
}

#[test]
fn test_roots_reaching_unions_every_path() {
    let mut graph = DependencyGraph::new();
    graph.add_node(ModNode::new("id-x", "x", Requiredness::Required, "x"));
    graph.add_node(ModNode::new("id-other", "other", Requiredness::Required, "other"));
    // First reached through x, later also required by other
    graph.add_node(ModNode::new("id-shared", "shared", Requiredness::Required, "x"));
    graph.add_node(ModNode::new("id-deep", "deep", Requiredness::Required, "x"));
    graph.add_node(ModNode::new("id-only-x", "only-x", Requiredness::Required, "x"));
    graph.add_dependency("x", "shared", Requiredness::Required).unwrap();
    graph.add_dependency("other", "shared", Requiredness::Required).unwrap();
    graph.add_dependency("shared", "deep", Requiredness::Required).unwrap();
    graph.add_dependency("x", "only-x", Requiredness::Required).unwrap();

    let both: BTreeSet<String> = ["other", "x"].iter().map(|s| s.to_string()).collect();
    assert_eq!(graph.roots_reaching("shared"), both);
    assert_eq!(graph.roots_reaching("deep"), both);
    assert_eq!(
        graph.roots_reaching("only-x"),
        BTreeSet::from(["x".to_string()])
    );
    assert!(graph.roots_reaching("ghost").is_empty());
}

#[test]
fn test_roots_reaching_survives_cycles() {
    let mut graph = DependencyGraph::new();
    graph.add_node(ModNode::new("id-a", "a", Requiredness::Required, "a"));
    graph.add_node(ModNode::new("id-b", "b", Requiredness::Required, "a"));
    graph.add_dependency("a", "b", Requiredness::Required).unwrap();
    graph.add_dependency("b", "a", Requiredness::Required).unwrap();

    assert_eq!(graph.roots_reaching("b"), BTreeSet::from(["a".to_string()]));
}

#[test]
fn test_cycle_detection() {
    let mut graph = DependencyGraph::new();
    graph.add_node(node("a", Requiredness::Required));
    graph.add_node(node("b", Requiredness::Required));
    graph.add_dependency("a", "b", Requiredness::Required).unwrap();
    graph.add_dependency("b", "a", Requiredness::Required).unwrap();

    assert_eq!(graph.cycles(), vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn test_duplicate_edges_are_collapsed() {
    let mut graph = DependencyGraph::new();
    graph.add_node(node("a", Requiredness::Required));
    graph.add_node(node("b", Requiredness::Required));
    graph.add_dependency("a", "b", Requiredness::Required).unwrap();
    graph.add_dependency("a", "b", Requiredness::Required).unwrap();
    assert_eq!(graph.dependents_of("b").len(), 1);
}
