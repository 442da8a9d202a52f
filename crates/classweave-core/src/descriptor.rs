//! Type descriptors: the compiled form of a declared type.
//!
//! A [`TypeDescriptor`] is produced once from a [`TypeDef`] and is immutable
//! afterwards. Its member table is already flattened: inherited members are
//! copied in at declaration time, so member lookup never walks the parent
//! chain. The parent link is kept for construction and type tests.

use std::fmt;
use std::rc::Rc;

use crate::construct;
use crate::{
    Args, Constructor, Instance, InterfaceDescriptor, Member, MemberTable, ObjectFlags,
    RuntimeError, Value,
};

/// Default field values seeded into a fresh field store.
pub type FieldTemplate = Vec<(String, Value)>;

/// What a constructed instance allows after construction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConstructionMode {
    /// No restriction.
    #[default]
    Open,
    /// Existing members may be reassigned, new ones may not be added.
    Sealed,
    /// No member may be added or reassigned.
    Frozen,
}

impl ConstructionMode {
    /// Object flags an instance is locked to after construction.
    pub fn flags(self) -> ObjectFlags {
        match self {
            ConstructionMode::Open => ObjectFlags::EXTENSIBLE | ObjectFlags::WRITABLE,
            ConstructionMode::Sealed => ObjectFlags::WRITABLE,
            ConstructionMode::Frozen => ObjectFlags::empty(),
        }
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

/// Raw parts of a type, assembled by the type builder.
///
/// `members`, `events` and `fields` are expected to be flattened already.
#[derive(Debug, Clone, Default)]
pub struct TypeDef {
    pub name: String,
    pub parent: Option<TypeDescriptor>,
    pub constructor: Option<Constructor>,
    pub members: MemberTable,
    /// Every event the type exposes, inherited ones included.
    pub events: Vec<String>,
    pub fields: FieldTemplate,
    /// Interfaces declared on this type (not including ancestors').
    pub interfaces: Vec<InterfaceDescriptor>,
    pub mode: ConstructionMode,
    /// Reject calls whose argument count differs from the declared arity.
    pub strict_arity: bool,
}

struct TypeInfo {
    def: TypeDef,
    depth: usize,
    is_root: bool,
}

thread_local! {
    static OBJECT: TypeDescriptor = TypeDescriptor::root();
}

/// An immutable, shared type descriptor.
///
/// Identity is reference identity: two descriptors built from equal
/// declarations are still different types.
#[derive(Clone)]
pub struct TypeDescriptor(Rc<TypeInfo>);

impl TypeDescriptor {
    pub fn new(def: TypeDef) -> Self {
        let depth = def.parent.as_ref().map_or(1, |p| p.depth() + 1);
        TypeDescriptor(Rc::new(TypeInfo {
            def,
            depth,
            is_root: false,
        }))
    }

    fn root() -> Self {
        let def = TypeDef {
            name: "Object".to_string(),
            ..TypeDef::default()
        };
        TypeDescriptor(Rc::new(TypeInfo {
            def,
            depth: 0,
            is_root: true,
        }))
    }

    /// The implicit root type every type descends from.
    ///
    /// One root exists per thread, since descriptors are not `Send`.
    pub fn object() -> TypeDescriptor {
        OBJECT.with(TypeDescriptor::clone)
    }

    pub fn name(&self) -> &str {
        &self.0.def.name
    }

    pub fn kind(&self) -> TypeKind {
        TypeKind::Class
    }

    pub fn is_root(&self) -> bool {
        self.0.is_root
    }

    pub fn parent(&self) -> Option<&TypeDescriptor> {
        self.0.def.parent.as_ref()
    }

    /// Number of levels in a construction chain of this type.
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// This type followed by its declared ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |t| t.parent())
    }

    /// Check if this type is `other` or declares it as an ancestor.
    pub fn is_subtype_of(&self, other: &TypeDescriptor) -> bool {
        other.is_root() || self.ancestors().any(|t| t.ptr_eq(other))
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.0.def.constructor.as_ref()
    }

    pub fn members(&self) -> &MemberTable {
        &self.0.def.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.0.def.members.get(name)
    }

    pub fn events(&self) -> &[String] {
        &self.0.def.events
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.0.def.events.iter().any(|e| e == name)
    }

    pub fn field_template(&self) -> &FieldTemplate {
        &self.0.def.fields
    }

    /// Interfaces declared directly on this type.
    pub fn interfaces(&self) -> &[InterfaceDescriptor] {
        &self.0.def.interfaces
    }

    /// Check if this type or an ancestor declared `iface`, or an interface
    /// extending it.
    pub fn implements_interface(&self, iface: &InterfaceDescriptor) -> bool {
        self.ancestors()
            .flat_map(|t| t.interfaces().iter())
            .any(|declared| declared.extends(iface))
    }

    pub fn mode(&self) -> ConstructionMode {
        self.0.def.mode
    }

    pub fn strict_arity(&self) -> bool {
        self.0.def.strict_arity
    }

    /// Construct an instance, running this type's constructor with `args`.
    ///
    /// Parent constructors are not run; a derived constructor calls
    /// [`Instance::base_constructor`] when it wants them.
    pub fn new_instance(&self, args: &Args) -> Result<Instance, RuntimeError> {
        construct::construct(self, args, true)
    }

    pub fn ptr_eq(&self, other: &TypeDescriptor) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name())
            .field("parent", &self.parent().map(TypeDescriptor::name))
            .field("members", &self.members().len())
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_of(name: &str, parent: Option<&TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::new(TypeDef {
            name: name.into(),
            parent: parent.cloned(),
            ..TypeDef::default()
        })
    }

    #[test]
    fn depth_and_ancestors() {
        let a = child_of("A", None);
        let b = child_of("B", Some(&a));
        let c = child_of("C", Some(&b));

        assert_eq!(a.depth(), 1);
        assert_eq!(c.depth(), 3);
        let names: Vec<_> = c.ancestors().map(TypeDescriptor::name).collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn subtype_relation() {
        let a = child_of("A", None);
        let b = child_of("B", Some(&a));
        let other_a = child_of("A", None);

        assert!(b.is_subtype_of(&a));
        assert!(!a.is_subtype_of(&b));
        assert!(!b.is_subtype_of(&other_a));
        assert!(a.is_subtype_of(&TypeDescriptor::object()));
    }

    #[test]
    fn root_is_shared_per_thread() {
        let root = TypeDescriptor::object();
        assert!(root.is_root());
        assert!(root.ptr_eq(&TypeDescriptor::object()));
        assert_eq!(root.name(), "Object");
        assert_eq!(root.kind().as_str(), "class");
    }

    #[test]
    fn mode_flags() {
        assert!(ConstructionMode::Open.flags().contains(ObjectFlags::EXTENSIBLE));
        assert_eq!(ConstructionMode::Sealed.flags(), ObjectFlags::WRITABLE);
        assert!(ConstructionMode::Frozen.flags().is_empty());
    }
}
