//! Namespace Tree - hierarchical storage for exported types and interfaces.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `NamespaceData` (exports at that level)
//! - Edges: `Contains(name)` for hierarchy, `Alias(name)` for extra top-level names
//!
//! Nodes are never removed. An alias is only another edge into an existing
//! node, so exports registered through either name are the same exports.

use classweave_core::RegistrationError;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::Export;

/// Separator between namespace path segments.
pub const SEPARATOR: char = '.';

/// Edge types in the namespace graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent namespace contains child namespace.
    /// The String is the child's simple name.
    Contains(String),
    /// Root-level alias of a namespace registered elsewhere.
    Alias(String),
}

impl NamespaceEdge {
    fn name(&self) -> &str {
        match self {
            NamespaceEdge::Contains(name) | NamespaceEdge::Alias(name) => name,
        }
    }
}

/// Data stored in each namespace node.
#[derive(Debug, Default)]
pub struct NamespaceData {
    /// Exported types and interfaces by simple name.
    pub exports: FxHashMap<String, Export>,
}

/// Split a dotted namespace path into segments.
///
/// Empty paths and empty segments (`"a..b"`, `".a"`) are rejected.
pub fn split_path(path: &str) -> Result<Vec<&str>, RegistrationError> {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    match segments.iter().find(|s| s.is_empty()) {
        Some(_) => Err(RegistrationError::InvalidNamespacePath {
            path: path.to_string(),
            segment: String::new(),
        }),
        None => Ok(segments),
    }
}

/// The namespace graph.
pub struct NamespaceTree {
    /// The directed graph storing all namespaces.
    graph: DiGraph<NamespaceData, NamespaceEdge>,

    /// The root namespace node.
    root: NodeIndex,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// Create a new namespace tree with an empty root.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::default());
        Self { graph, root }
    }

    /// Get the root namespace node index.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Number of namespace nodes, root included.
    pub fn namespace_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Find a child namespace (or root alias) by name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph
            .edges(parent)
            .find(|edge| edge.weight().name() == name)
            .map(|edge| edge.target())
    }

    /// Names of the direct children of a namespace, sorted.
    pub fn children(&self, parent: NodeIndex) -> Vec<(String, NodeIndex)> {
        let mut children: Vec<(String, NodeIndex)> = self
            .graph
            .edges(parent)
            .map(|edge| (edge.weight().name().to_string(), edge.target()))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }

    /// Get or create a child namespace.
    pub fn get_or_create_child(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }

        let child = self.graph.add_node(NamespaceData::default());
        self.graph
            .add_edge(parent, child, NamespaceEdge::Contains(name.to_string()));
        child
    }

    /// Get or create a namespace path from root.
    pub fn get_or_create_path<S: AsRef<str>>(&mut self, path: &[S]) -> NodeIndex {
        let mut current = self.root;
        for segment in path {
            current = self.get_or_create_child(current, segment.as_ref());
        }
        current
    }

    /// Resolve a dotted path through registered namespaces only.
    ///
    /// The error names the first segment that is not registered.
    pub fn resolve(&self, path: &str) -> Result<NodeIndex, RegistrationError> {
        let mut current = self.root;
        for segment in split_path(path)? {
            current = self.find_child(current, segment).ok_or_else(|| {
                RegistrationError::InvalidNamespacePath {
                    path: path.to_string(),
                    segment: segment.to_string(),
                }
            })?;
        }
        Ok(current)
    }

    /// Find the canonical parent namespace of a node.
    pub fn find_parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|edge| matches!(edge.weight(), NamespaceEdge::Contains(_)))
            .map(|edge| edge.source())
    }

    /// Get the canonical simple name of a namespace node.
    pub fn get_namespace_name(&self, node: NodeIndex) -> Option<&str> {
        if node == self.root {
            return None;
        }
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                NamespaceEdge::Contains(name) => Some(name.as_str()),
                NamespaceEdge::Alias(_) => None,
            })
    }

    /// Get the canonical namespace path for a node.
    pub fn get_namespace_path(&self, node: NodeIndex) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = node;

        while current != self.root {
            if let Some(name) = self.get_namespace_name(current) {
                path.push(name.to_string());
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Dotted canonical path of a node (empty for the root).
    pub fn path_string(&self, node: NodeIndex) -> String {
        self.get_namespace_path(node).join(".")
    }

    /// Get the qualified name string for an export in a namespace.
    pub fn qualified_name(&self, ns_node: NodeIndex, simple_name: &str) -> String {
        let path = self.path_string(ns_node);
        if path.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}{}{}", path, SEPARATOR, simple_name)
        }
    }

    /// Expose `node` under an additional top-level name.
    ///
    /// Re-aliasing the same node is a no-op; an alias already bound to a
    /// different node is rejected.
    pub fn add_alias(&mut self, node: NodeIndex, alias: &str) -> Result<(), RegistrationError> {
        if alias.is_empty() || alias.contains(SEPARATOR) {
            return Err(RegistrationError::InvalidArgument {
                arg_name: "alias".to_string(),
                reason: format!("'{}' is not a valid top-level namespace name", alias),
            });
        }
        match self.find_child(self.root, alias) {
            Some(existing) if existing == node => Ok(()),
            Some(_) => Err(RegistrationError::AliasConflict(alias.to_string())),
            None => {
                self.graph
                    .add_edge(self.root, node, NamespaceEdge::Alias(alias.to_string()));
                Ok(())
            }
        }
    }

    // ========================================================================
    // Exports
    // ========================================================================

    /// Export a type or interface from a namespace.
    pub fn export(
        &mut self,
        ns_node: NodeIndex,
        simple_name: &str,
        export: Export,
    ) -> Result<(), RegistrationError> {
        let qualified = self.qualified_name(ns_node, simple_name);

        // Check for duplicates first (before modifying)
        let ns_data = self
            .graph
            .node_weight_mut(ns_node)
            .ok_or_else(|| RegistrationError::InvalidNamespacePath {
                path: qualified.clone(),
                segment: simple_name.to_string(),
            })?;
        if ns_data.exports.contains_key(simple_name) {
            return Err(RegistrationError::DuplicateExport(qualified));
        }
        ns_data.exports.insert(simple_name.to_string(), export);
        Ok(())
    }

    /// Exports of a namespace.
    pub fn exports(&self, ns_node: NodeIndex) -> Option<&FxHashMap<String, Export>> {
        self.graph.node_weight(ns_node).map(|d| &d.exports)
    }

    pub fn get_export(&self, ns_node: NodeIndex, simple_name: &str) -> Option<&Export> {
        self.graph.node_weight(ns_node)?.exports.get(simple_name)
    }
}
