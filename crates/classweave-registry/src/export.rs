//! Members a namespace can export.

use classweave_core::{InterfaceDescriptor, TypeDescriptor, TypeKind};

/// A type or interface exported by a namespace.
#[derive(Debug, Clone)]
pub enum Export {
    Type(TypeDescriptor),
    Interface(InterfaceDescriptor),
}

impl Export {
    /// Declared name of the exported descriptor.
    pub fn name(&self) -> &str {
        match self {
            Export::Type(t) => t.name(),
            Export::Interface(i) => i.name(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Export::Type(_) => TypeKind::Class,
            Export::Interface(_) => TypeKind::Interface,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Export::Type(t) => Some(t),
            Export::Interface(_) => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDescriptor> {
        match self {
            Export::Interface(i) => Some(i),
            Export::Type(_) => None,
        }
    }

    /// Reference identity of the exported descriptor.
    pub fn ptr_eq(&self, other: &Export) -> bool {
        match (self, other) {
            (Export::Type(a), Export::Type(b)) => a.ptr_eq(b),
            (Export::Interface(a), Export::Interface(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<TypeDescriptor> for Export {
    fn from(t: TypeDescriptor) -> Self {
        Export::Type(t)
    }
}

impl From<InterfaceDescriptor> for Export {
    fn from(i: InterfaceDescriptor) -> Self {
        Export::Interface(i)
    }
}
