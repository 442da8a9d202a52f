//! Namespace registry for classweave.
//!
//! Namespaces form a graph rooted at one owned [`NamespaceRegistry`]:
//!
//! - [`NamespaceTree`] - petgraph storage of namespace nodes and exports
//! - [`NamespaceRegistry`] - `register`, `alias`, `using` and lookups
//! - [`ImportScope`] - sealed result of an import
//! - [`Export`] - a type or interface exported by a namespace

mod export;
mod namespace_tree;
mod registry;

pub use export::Export;
pub use namespace_tree::{NamespaceData, NamespaceEdge, NamespaceTree, SEPARATOR, split_path};
pub use registry::{ImportScope, NamespaceRegistry, NamespaceScope};

pub use petgraph::graph::NodeIndex;
