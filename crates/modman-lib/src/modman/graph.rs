//! Arena dependency graph built during a resolution walk
//!
//! Nodes are keyed by project id; slugs and raw identifiers are registered as
//! aliases so any of them finds the same node. Edges point from a dependent to
//! the mod it depends on.

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requiredness {
    Required,
    Optional,
}

impl Requiredness {
    /// Required wins over optional
    pub fn strongest(self, other: Self) -> Self {
        if self == Self::Required || other == Self::Required {
            Self::Required
        } else {
            Self::Optional
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModNode {
    pub project_id: String,
    pub slug: String,
    pub requiredness: Requiredness,
    /// Root request that first reached this node
    pub root: String,
}

impl ModNode {
    pub fn new(
        project_id: impl Into<String>,
        slug: impl Into<String>,
        requiredness: Requiredness,
        root: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            slug: slug.into(),
            requiredness,
            root: root.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ModNode, Requiredness>,
    index: HashMap<String, NodeIndex>,
    aliases: HashMap<String, String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or merge requiredness into the existing one
    pub fn add_node(&mut self, node: ModNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.project_id) {
            trace!("node already present: {}", node.project_id);
            let existing = &mut self.graph[idx];
            existing.requiredness = existing.requiredness.strongest(node.requiredness);
            return idx;
        }

        let project_id = node.project_id.clone();
        let slug = node.slug.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(project_id.clone(), idx);
        self.aliases.insert(slug, project_id);
        idx
    }

    /// Register another name for an existing project id
    pub fn alias(&mut self, alias: impl Into<String>, project_id: impl Into<String>) {
        self.aliases.insert(alias.into(), project_id.into());
    }

    fn lookup(&self, identifier: &str) -> Option<NodeIndex> {
        self.index.get(identifier).copied().or_else(|| {
            self.aliases
                .get(identifier)
                .and_then(|id| self.index.get(id))
                .copied()
        })
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.lookup(identifier).is_some()
    }

    pub fn node(&self, identifier: &str) -> Option<&ModNode> {
        self.lookup(identifier).map(|idx| &self.graph[idx])
    }

    /// Upgrade a node to required; returns true if it changed
    pub fn promote(&mut self, identifier: &str) -> bool {
        match self.lookup(identifier) {
            Some(idx) if self.graph[idx].requiredness != Requiredness::Required => {
                self.graph[idx].requiredness = Requiredness::Required;
                true
            }
            _ => false,
        }
    }

    pub fn add_dependency(
        &mut self,
        dependent: &str,
        dependency: &str,
        kind: Requiredness,
    ) -> Result<(), GraphError> {
        let from = self
            .lookup(dependent)
            .ok_or_else(|| GraphError::NodeNotFound {
                id: dependent.to_string(),
            })?;
        let to = self
            .lookup(dependency)
            .ok_or_else(|| GraphError::NodeNotFound {
                id: dependency.to_string(),
            })?;

        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, kind);
        }
        if kind == Requiredness::Required {
            self.graph[to].requiredness = Requiredness::Required;
        }
        Ok(())
    }

    pub fn dependents_of(&self, identifier: &str) -> Vec<&ModNode> {
        let Some(idx) = self.lookup(identifier) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Slugs of every strongly connected group that forms a cycle
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| self.graph.find_edge(n, n).is_some())
            })
            .map(|component| {
                let mut slugs: Vec<String> = component
                    .into_iter()
                    .map(|n| self.graph[n].slug.clone())
                    .collect();
                slugs.sort();
                slugs
            })
            .collect()
    }

    /// Every root request with a path to this node
    ///
    /// Follows dependents upward; each node records the first root that
    /// reached it, so the union over the node and its ancestors is exact.
    pub fn roots_reaching(&self, identifier: &str) -> BTreeSet<String> {
        let mut roots = BTreeSet::new();
        let Some(start) = self.node(identifier) else {
            return roots;
        };

        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.project_id.as_str()) {
                continue;
            }
            roots.insert(node.root.clone());
            stack.extend(self.dependents_of(&node.project_id));
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    include!("graph.test.rs");
}
