//! Interface descriptors: named capability contracts.
//!
//! An interface lists required capabilities, each a method name plus a
//! declared arity. Property names may be declared for documentation but are
//! not part of the contract. Base interfaces are unioned in, bases first, so
//! the effective requirement order is the order conformance reports in.

use std::fmt;
use std::rc::Rc;

/// A required method: name and parameter count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub name: String,
    pub arity: usize,
}

impl Capability {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Raw parts of an interface declaration.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDef {
    pub name: String,
    pub bases: Vec<InterfaceDescriptor>,
    pub methods: Vec<Capability>,
    /// Non-function members; recorded, never checked.
    pub properties: Vec<String>,
}

struct InterfaceInfo {
    name: String,
    bases: Vec<InterfaceDescriptor>,
    own: Vec<Capability>,
    properties: Vec<String>,
    required: Vec<Capability>,
}

/// An immutable, shared interface descriptor.
#[derive(Clone)]
pub struct InterfaceDescriptor(Rc<InterfaceInfo>);

impl InterfaceDescriptor {
    /// Compose an interface from its declaration.
    ///
    /// A capability redeclared with the same name keeps the position of its
    /// first declaration and takes the later arity.
    pub fn new(def: InterfaceDef) -> Self {
        let mut required: Vec<Capability> = Vec::new();
        let inherited = def.bases.iter().flat_map(|b| b.required().iter().cloned());
        for cap in inherited.chain(def.methods.iter().cloned()) {
            match required.iter_mut().find(|c| c.name == cap.name) {
                Some(slot) => *slot = cap,
                None => required.push(cap),
            }
        }

        InterfaceDescriptor(Rc::new(InterfaceInfo {
            name: def.name,
            bases: def.bases,
            own: def.methods,
            properties: def.properties,
            required,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bases(&self) -> &[InterfaceDescriptor] {
        &self.0.bases
    }

    /// Capabilities declared directly on this interface.
    pub fn own_capabilities(&self) -> &[Capability] {
        &self.0.own
    }

    pub fn properties(&self) -> &[String] {
        &self.0.properties
    }

    /// Effective requirements, base interfaces first, in declaration order.
    pub fn required(&self) -> &[Capability] {
        &self.0.required
    }

    pub fn find(&self, name: &str) -> Option<&Capability> {
        self.0.required.iter().find(|c| c.name == name)
    }

    /// Check if this interface is `other` or extends it, directly or not.
    pub fn extends(&self, other: &InterfaceDescriptor) -> bool {
        self.ptr_eq(other) || self.0.bases.iter().any(|b| b.extends(other))
    }

    pub fn ptr_eq(&self, other: &InterfaceDescriptor) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("name", &self.0.name)
            .field("required", &self.0.required)
            .finish()
    }
}
