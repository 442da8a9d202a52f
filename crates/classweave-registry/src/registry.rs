//! The namespace registry: register, alias and import namespaces.
//!
//! [`NamespaceRegistry`] owns a [`NamespaceTree`] and layers the
//! user-facing operations on top of it. Importing (`using`) never mutates
//! the tree; it produces a sealed [`ImportScope`] holding the merged
//! exports of every resolved namespace.

use std::collections::BTreeMap;

use classweave_core::{InterfaceDescriptor, RegistrationError, TypeDescriptor};
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::namespace_tree::{NamespaceTree, SEPARATOR, split_path};
use crate::Export;

/// Owner of the namespace tree.
///
/// One registry is one namespace root. Nodes are never removed.
#[derive(Default)]
pub struct NamespaceRegistry {
    tree: NamespaceTree,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying graph.
    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    /// Register a dotted namespace path, creating missing nodes.
    ///
    /// Idempotent: registering an existing path returns its node.
    pub fn register(&mut self, path: &str) -> Result<NodeIndex, RegistrationError> {
        let segments = split_path(path)?;
        let before = self.tree.namespace_count();
        let node = self.tree.get_or_create_path(&segments);
        if self.tree.namespace_count() != before {
            debug!(path, "registered namespace");
        }
        Ok(node)
    }

    /// Register a path, then run `init` with a scope bound to its leaf node.
    pub fn register_with<R>(
        &mut self,
        path: &str,
        init: impl FnOnce(&mut NamespaceScope<'_>) -> Result<R, RegistrationError>,
    ) -> Result<R, RegistrationError> {
        let node = self.register(path)?;
        self.using_namespace(node, init)
    }

    /// Expose the namespace at `path` under a new top-level name.
    pub fn alias(&mut self, path: &str, name: &str) -> Result<(), RegistrationError> {
        let node = self.tree.resolve(path)?;
        self.tree.add_alias(node, name)?;
        debug!(path, alias = name, "aliased namespace");
        Ok(())
    }

    /// Resolve a dotted path through registered namespaces.
    pub fn resolve(&self, path: &str) -> Result<NodeIndex, RegistrationError> {
        self.tree.resolve(path)
    }

    /// Canonical dotted path of a namespace node.
    pub fn namespace_path(&self, node: NodeIndex) -> String {
        self.tree.path_string(node)
    }

    /// Exports of the namespace at `path`, sorted by name.
    pub fn exports(&self, path: &str) -> Result<Vec<(String, Export)>, RegistrationError> {
        let node = self.tree.resolve(path)?;
        let mut exports: Vec<(String, Export)> = self
            .tree
            .exports(node)
            .into_iter()
            .flatten()
            .map(|(name, export)| (name.clone(), export.clone()))
            .collect();
        exports.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(exports)
    }

    // ========================================================================
    // Exporting
    // ========================================================================

    /// Export a type from the (registered) namespace at `path`.
    pub fn export_type(&mut self, path: &str, ty: TypeDescriptor) -> Result<(), RegistrationError> {
        let node = self.tree.resolve(path)?;
        self.export_at(node, ty.name().to_string(), Export::Type(ty))
    }

    /// Export an interface from the (registered) namespace at `path`.
    pub fn export_interface(
        &mut self,
        path: &str,
        iface: InterfaceDescriptor,
    ) -> Result<(), RegistrationError> {
        let node = self.tree.resolve(path)?;
        self.export_at(node, iface.name().to_string(), Export::Interface(iface))
    }

    fn export_at(
        &mut self,
        node: NodeIndex,
        name: String,
        export: Export,
    ) -> Result<(), RegistrationError> {
        self.tree.export(node, &name, export)?;
        debug!(
            qualified = %self.tree.qualified_name(node, &name),
            "exported member"
        );
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up an export by qualified name (`"ns.sub.Name"`).
    ///
    /// A name without a namespace part is looked up in the root.
    pub fn get_export(&self, qualified: &str) -> Option<&Export> {
        let (node, name) = match qualified.rsplit_once(SEPARATOR) {
            Some((path, name)) => (self.tree.resolve(path).ok()?, name),
            None => (self.tree.root(), qualified),
        };
        self.tree.get_export(node, name)
    }

    pub fn get_type(&self, qualified: &str) -> Option<&TypeDescriptor> {
        self.get_export(qualified)?.as_type()
    }

    pub fn get_interface(&self, qualified: &str) -> Option<&InterfaceDescriptor> {
        self.get_export(qualified)?.as_interface()
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.get_export(qualified).is_some()
    }

    // ========================================================================
    // Importing
    // ========================================================================

    /// Merge the exports of every namespace in `paths` into a sealed scope.
    ///
    /// Fails when no path is given, on the first unregistered path segment,
    /// and on any name exported by two different namespaces. The same
    /// namespace reached through an alias and its canonical path counts once.
    pub fn using<P: AsRef<str>>(&self, paths: &[P]) -> Result<ImportScope, RegistrationError> {
        if paths.is_empty() {
            return Err(RegistrationError::InvalidNamespacePath {
                path: String::new(),
                segment: String::new(),
            });
        }

        let mut nodes: Vec<NodeIndex> = Vec::with_capacity(paths.len());
        for path in paths {
            let node = self.tree.resolve(path.as_ref())?;
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }

        let mut entries: FxHashMap<String, ImportEntry> = FxHashMap::default();
        for node in nodes {
            let source = self.tree.path_string(node);
            for (name, export) in self.tree.exports(node).into_iter().flatten() {
                if let Some(existing) = entries.get(name) {
                    let mut namespaces = vec![existing.source.clone(), source.clone()];
                    namespaces.sort();
                    return Err(RegistrationError::AmbiguousImport {
                        name: name.clone(),
                        namespaces,
                    });
                }
                entries.insert(
                    name.clone(),
                    ImportEntry {
                        export: export.clone(),
                        source: source.clone(),
                    },
                );
            }
        }

        debug!(
            paths = ?paths.iter().map(|p| p.as_ref()).collect::<Vec<&str>>(),
            imported = entries.len(),
            "merged namespace imports"
        );
        Ok(ImportScope { entries })
    }

    /// Import `paths` and run `f` against the merged scope.
    pub fn using_scoped<P: AsRef<str>, R>(
        &self,
        paths: &[P],
        f: impl FnOnce(&ImportScope) -> R,
    ) -> Result<R, RegistrationError> {
        let scope = self.using(paths)?;
        Ok(f(&scope))
    }

    /// Import `paths` and run `f` with the registry itself plus the scope.
    pub fn using_with_root<P: AsRef<str>, R>(
        &mut self,
        paths: &[P],
        f: impl FnOnce(&mut NamespaceRegistry, &ImportScope) -> R,
    ) -> Result<R, RegistrationError> {
        let scope = self.using(paths)?;
        Ok(f(self, &scope))
    }

    /// Run `f` with a scope bound directly to `node`.
    fn using_namespace<R>(
        &mut self,
        node: NodeIndex,
        f: impl FnOnce(&mut NamespaceScope<'_>) -> Result<R, RegistrationError>,
    ) -> Result<R, RegistrationError> {
        let mut scope = NamespaceScope {
            registry: self,
            node,
        };
        f(&mut scope)
    }
}

// ============================================================================
// ImportScope
// ============================================================================

#[derive(Debug, Clone)]
struct ImportEntry {
    export: Export,
    source: String,
}

/// Read-only result of [`NamespaceRegistry::using`].
///
/// Sealed: there is no way to add to or remove from a scope once built.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    entries: FxHashMap<String, ImportEntry>,
}

impl ImportScope {
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name).map(|e| &e.export)
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name)?.as_type()
    }

    pub fn get_interface(&self, name: &str) -> Option<&InterfaceDescriptor> {
        self.get(name)?.as_interface()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Canonical path of the namespace an imported name came from.
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.source.as_str())
    }

    /// Imported names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Imported entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.entries
            .iter()
            .map(|(name, e)| (name.as_str(), &e.export))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// NamespaceScope
// ============================================================================

/// Mutable view of one namespace node, handed to
/// [`NamespaceRegistry::register_with`] callbacks.
pub struct NamespaceScope<'a> {
    registry: &'a mut NamespaceRegistry,
    node: NodeIndex,
}

impl NamespaceScope<'_> {
    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// Canonical dotted path of the bound namespace.
    pub fn path(&self) -> String {
        self.registry.tree.path_string(self.node)
    }

    pub fn export_type(&mut self, ty: TypeDescriptor) -> Result<(), RegistrationError> {
        self.registry
            .export_at(self.node, ty.name().to_string(), Export::Type(ty))
    }

    pub fn export_interface(&mut self, iface: InterfaceDescriptor) -> Result<(), RegistrationError> {
        self.registry
            .export_at(self.node, iface.name().to_string(), Export::Interface(iface))
    }

    /// An export of the bound namespace.
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.registry.tree.get_export(self.node, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classweave_core::{InterfaceDef, TypeDef};

    fn ty(name: &str) -> TypeDescriptor {
        TypeDescriptor::new(TypeDef {
            name: name.to_string(),
            ..TypeDef::default()
        })
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = NamespaceRegistry::new();
        let a = registry.register("acme.samples").unwrap();
        let b = registry.register("acme.samples").unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.namespace_path(a), "acme.samples");
    }

    #[test]
    fn register_rejects_empty_path() {
        let mut registry = NamespaceRegistry::new();
        assert!(matches!(
            registry.register(""),
            Err(RegistrationError::InvalidNamespacePath { .. })
        ));
        assert!(registry.register("a..b").is_err());
    }

    #[test]
    fn register_with_exports_into_leaf() {
        let mut registry = NamespaceRegistry::new();
        let path = registry
            .register_with("game.ui", |ns| {
                ns.export_type(ty("Widget"))?;
                assert!(ns.get("Widget").is_some());
                Ok(ns.path())
            })
            .unwrap();
        assert_eq!(path, "game.ui");
        assert!(registry.get_type("game.ui.Widget").is_some());
        assert!(registry.get_type("game.Widget").is_none());
    }

    #[test]
    fn using_unregistered_segment() {
        let mut registry = NamespaceRegistry::new();
        registry.register("ns.a").unwrap();
        let err = registry.using(&["ns.a", "ns.missing.deep"]).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidNamespacePath {
                path: "ns.missing.deep".into(),
                segment: "missing".into(),
            }
        );
    }

    #[test]
    fn using_requires_a_path() {
        let mut registry = NamespaceRegistry::new();
        registry.register("ns.a").unwrap();
        let err = registry.using(&[] as &[&str]).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidNamespacePath {
                path: String::new(),
                segment: String::new(),
            }
        );
        assert!(registry.using_scoped(&[] as &[&str], |_| ()).is_err());
    }

    #[test]
    fn same_descriptor_in_two_namespaces_is_ambiguous() {
        let mut registry = NamespaceRegistry::new();
        registry.register("ns.a").unwrap();
        registry.register("ns.b").unwrap();
        let widget = ty("Widget");
        registry.export_type("ns.a", widget.clone()).unwrap();
        registry.export_type("ns.b", widget).unwrap();

        let from_a = registry.get_export("ns.a.Widget").unwrap();
        assert!(from_a.ptr_eq(registry.get_export("ns.b.Widget").unwrap()));

        match registry.using(&["ns.a", "ns.b"]) {
            Err(RegistrationError::AmbiguousImport { name, namespaces }) => {
                assert_eq!(name, "Widget");
                assert_eq!(namespaces, ["ns.a", "ns.b"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn using_detects_ambiguity() {
        let mut registry = NamespaceRegistry::new();
        registry.register("ns.a").unwrap();
        registry.register("ns.b").unwrap();
        registry.export_type("ns.a", ty("Widget")).unwrap();
        registry.export_type("ns.b", ty("Widget")).unwrap();

        match registry.using(&["ns.a", "ns.b"]) {
            Err(RegistrationError::AmbiguousImport { name, namespaces }) => {
                assert_eq!(name, "Widget");
                assert_eq!(namespaces, ["ns.a", "ns.b"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }

        let scope = registry.using(&["ns.a"]).unwrap();
        let imported = scope.get_type("Widget").unwrap();
        assert!(imported.ptr_eq(registry.get_type("ns.a.Widget").unwrap()));
        assert_eq!(scope.source_of("Widget"), Some("ns.a"));
    }

    #[test]
    fn alias_and_canonical_path_are_not_ambiguous() {
        let mut registry = NamespaceRegistry::new();
        registry.register("acme.samples").unwrap();
        registry.export_type("acme.samples", ty("Person")).unwrap();
        registry.alias("acme.samples", "samples").unwrap();

        let scope = registry.using(&["samples", "acme.samples"]).unwrap();
        assert_eq!(scope.len(), 1);
        assert!(registry.get_type("samples.Person").is_some());
    }

    #[test]
    fn alias_conflict() {
        let mut registry = NamespaceRegistry::new();
        registry.register("a.one").unwrap();
        registry.register("b.two").unwrap();
        registry.alias("a.one", "short").unwrap();
        registry.alias("a.one", "short").unwrap();
        assert_eq!(
            registry.alias("b.two", "short"),
            Err(RegistrationError::AliasConflict("short".into()))
        );
    }

    #[test]
    fn scoped_and_root_modes() {
        let mut registry = NamespaceRegistry::new();
        registry.register("shapes").unwrap();
        registry.export_type("shapes", ty("Circle")).unwrap();
        registry
            .export_interface(
                "shapes",
                InterfaceDescriptor::new(InterfaceDef {
                    name: "Drawable".into(),
                    ..InterfaceDef::default()
                }),
            )
            .unwrap();

        let names = registry
            .using_scoped(&["shapes"], |scope| {
                scope.names().iter().map(|s| s.to_string()).collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(names, ["Circle", "Drawable"]);

        registry
            .using_with_root(&["shapes"], |root, scope| {
                root.register("shapes.extra")?;
                root.export_type("shapes.extra", scope.get_type("Circle").unwrap().clone())
            })
            .unwrap()
            .unwrap();
        assert!(registry.contains("shapes.extra.Circle"));
    }

    #[test]
    fn exports_listing() {
        let mut registry = NamespaceRegistry::new();
        registry.register("z").unwrap();
        registry.export_type("z", ty("B")).unwrap();
        registry.export_type("z", ty("A")).unwrap();
        let names: Vec<_> = registry
            .exports("z")
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert!(matches!(
            registry.export_type("z", ty("A")),
            Err(RegistrationError::DuplicateExport(_))
        ));
    }
}
