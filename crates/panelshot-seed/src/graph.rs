//! Entity dependency graph and seeding order.

use std::collections::{BTreeMap, BTreeSet};

/// Directed dependency graph over entity short names.
///
/// An edge from A to B means A carries a foreign key into B, so B must be
/// seeded first. Node and edge storage is ordered so traversal is
/// deterministic across runs.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, keeping first-insertion order.
    pub fn add_node(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.nodes.contains(&name) {
            self.nodes.push(name);
        }
    }

    /// Records that `dependent` references `dependency`.
    ///
    /// Both endpoints must already be nodes; unknown endpoints are ignored
    /// so heuristic foreign-key hits on models outside the plugin do not
    /// distort the ordering.
    pub fn add_edge(&mut self, dependent: &str, dependency: &str) {
        if dependent == dependency {
            return;
        }
        let known = |name: &str| self.nodes.iter().any(|node| node == name);
        if !known(dependent) || !known(dependency) {
            return;
        }
        self.edges
            .entry(dependent.to_owned())
            .or_default()
            .insert(dependency.to_owned());
    }

    /// Returns the nodes in dependency-first order.
    ///
    /// Depth-first from every node, visiting dependencies before emitting
    /// the node itself, guarded by a visited set so each node appears
    /// exactly once. Known limitation: true cycles are neither detected nor
    /// reported; the visited-set guard breaks them arbitrarily in first
    /// discovery order, which can yield an incorrect seeding order for
    /// genuinely cyclic schemas.
    #[must_use]
    pub fn ordered(&self) -> Vec<String> {
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            self.visit(node, &mut visited, &mut ordered);
        }
        ordered
    }

    fn visit(&self, node: &str, visited: &mut BTreeSet<String>, ordered: &mut Vec<String>) {
        if !visited.insert(node.to_owned()) {
            return;
        }
        if let Some(dependencies) = self.edges.get(node) {
            for dependency in dependencies {
                self.visit(dependency, visited, ordered);
            }
        }
        ordered.push(node.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(*node);
        }
        for (dependent, dependency) in edges {
            graph.add_edge(dependent, dependency);
        }
        graph
    }

    #[test]
    fn dependencies_precede_dependents() {
        let order = graph(&["Comment", "Post"], &[("Comment", "Post")]).ordered();
        assert_eq!(order, ["Post", "Comment"]);
    }

    #[test]
    fn chains_order_transitively() {
        let order = graph(
            &["Comment", "Post", "User"],
            &[("Comment", "Post"), ("Post", "User")],
        )
        .ordered();
        assert_eq!(order, ["User", "Post", "Comment"]);
    }

    #[test]
    fn independent_nodes_keep_insertion_order() {
        let order = graph(&["Banana", "Apple"], &[]).ordered();
        assert_eq!(order, ["Banana", "Apple"]);
    }

    #[test]
    fn cycles_break_in_first_discovery_order() {
        let order = graph(&["A", "B"], &[("A", "B"), ("B", "A")]).ordered();
        assert_eq!(order.len(), 2);
        assert_eq!(order, ["B", "A"]);
    }

    #[test]
    fn edges_to_unknown_models_are_ignored() {
        let mut graph = graph(&["Product"], &[]);
        graph.add_edge("Product", "Warehouse");
        assert_eq!(graph.ordered(), ["Product"]);
    }

    #[test]
    fn self_references_are_ignored() {
        let order = graph(&["Category"], &[("Category", "Category")]).ordered();
        assert_eq!(order, ["Category"]);
    }
}
