//! The `TypeSystem` facade.
//!
//! One `TypeSystem` owns one namespace root and one configuration table.
//! It is the entry point most callers need:
//!
//! ```ignore
//! let mut system = TypeSystem::new()?;
//! system.register("acme.samples")?;
//!
//! let person = system.def(TypeBuilder::new("Person").method("sayHello", 0, hello))?;
//! system.export_type("acme.samples", person)?;
//!
//! let scope = system.using(&["acme.samples"])?;
//! let p = scope.get_type("Person").unwrap().new_instance(&Args::new())?;
//! ```

use classweave_core::{InterfaceDescriptor, RegistrationError, TypeDescriptor};
use classweave_registry::{Export, ImportScope, NamespaceRegistry, NamespaceScope, NodeIndex};

use crate::builder::{InterfaceBuilder, TypeBuilder};
use crate::exceptions::Exceptions;
use crate::properties::{SystemProperties, SystemProperty};

pub struct TypeSystem {
    registry: NamespaceRegistry,
    properties: SystemProperties,
    exceptions: Option<Exceptions>,
}

impl TypeSystem {
    /// Create a type system with default properties.
    pub fn new() -> Result<Self, RegistrationError> {
        Self::with_properties(SystemProperties::default())
    }

    /// Create a type system, installing the built-in exceptions unless
    /// [`SystemProperty::InstallBuiltins`] is 0.
    pub fn with_properties(properties: SystemProperties) -> Result<Self, RegistrationError> {
        let mut registry = NamespaceRegistry::new();
        let exceptions = if properties.is_enabled(SystemProperty::InstallBuiltins) {
            Some(Exceptions::install(&mut registry)?)
        } else {
            None
        };
        Ok(Self {
            registry,
            properties,
            exceptions,
        })
    }

    // === Configuration ===

    pub fn properties(&self) -> &SystemProperties {
        &self.properties
    }

    pub fn get_property(&self, property: SystemProperty) -> usize {
        self.properties.get(property)
    }

    /// Change a property. Affects declarations made afterwards only.
    pub fn set_property(&mut self, property: SystemProperty, value: usize) -> usize {
        self.properties.set(property, value)
    }

    /// The built-in exception family, if installed.
    pub fn exceptions(&self) -> Option<&Exceptions> {
        self.exceptions.as_ref()
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NamespaceRegistry {
        &mut self.registry
    }

    // === Declarations ===

    /// Declare a type under this system's properties.
    pub fn def(&self, builder: TypeBuilder) -> Result<TypeDescriptor, RegistrationError> {
        builder.build_with(&self.properties)
    }

    pub fn interfacedef(
        &self,
        builder: InterfaceBuilder,
    ) -> Result<InterfaceDescriptor, RegistrationError> {
        builder.build()
    }

    /// Declare a type and export it from the namespace at `path`
    /// (registering the namespace if needed).
    pub fn define_in(
        &mut self,
        path: &str,
        builder: TypeBuilder,
    ) -> Result<TypeDescriptor, RegistrationError> {
        let ty = self.def(builder)?;
        self.registry.register(path)?;
        self.registry.export_type(path, ty.clone())?;
        Ok(ty)
    }

    // === Namespaces ===

    pub fn register(&mut self, path: &str) -> Result<NodeIndex, RegistrationError> {
        self.registry.register(path)
    }

    pub fn register_with<R>(
        &mut self,
        path: &str,
        init: impl FnOnce(&mut NamespaceScope<'_>) -> Result<R, RegistrationError>,
    ) -> Result<R, RegistrationError> {
        self.registry.register_with(path, init)
    }

    pub fn alias(&mut self, path: &str, name: &str) -> Result<(), RegistrationError> {
        self.registry.alias(path, name)
    }

    pub fn export_type(&mut self, path: &str, ty: TypeDescriptor) -> Result<(), RegistrationError> {
        self.registry.export_type(path, ty)
    }

    pub fn export_interface(
        &mut self,
        path: &str,
        iface: InterfaceDescriptor,
    ) -> Result<(), RegistrationError> {
        self.registry.export_interface(path, iface)
    }

    pub fn using<P: AsRef<str>>(&self, paths: &[P]) -> Result<ImportScope, RegistrationError> {
        self.registry.using(paths)
    }

    pub fn using_scoped<P: AsRef<str>, R>(
        &self,
        paths: &[P],
        f: impl FnOnce(&ImportScope) -> R,
    ) -> Result<R, RegistrationError> {
        self.registry.using_scoped(paths, f)
    }

    pub fn using_with_root<P: AsRef<str>, R>(
        &mut self,
        paths: &[P],
        f: impl FnOnce(&mut NamespaceRegistry, &ImportScope) -> R,
    ) -> Result<R, RegistrationError> {
        self.registry.using_with_root(paths, f)
    }

    pub fn get_export(&self, qualified: &str) -> Option<&Export> {
        self.registry.get_export(qualified)
    }

    pub fn get_type(&self, qualified: &str) -> Option<&TypeDescriptor> {
        self.registry.get_type(qualified)
    }

    pub fn get_interface(&self, qualified: &str) -> Option<&InterfaceDescriptor> {
        self.registry.get_interface(qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classweave_core::{Args, Value};

    #[test]
    fn builtins_installed_by_default() {
        let system = TypeSystem::new().unwrap();
        assert!(system.exceptions().is_some());
        assert!(system.get_type("classweave.Exception").is_some());
    }

    #[test]
    fn builtins_can_be_skipped() {
        let props = SystemProperties::new().with(SystemProperty::InstallBuiltins, 0);
        let system = TypeSystem::with_properties(props).unwrap();
        assert!(system.exceptions().is_none());
        assert!(system.registry().resolve("classweave").is_err());
    }

    #[test]
    fn def_uses_properties() {
        let mut system = TypeSystem::new().unwrap();
        system.set_property(SystemProperty::StrictCallArity, 1);
        let ty = system
            .def(TypeBuilder::new("T").method("one", 1, |_, args| Ok(args[0].clone())))
            .unwrap();
        let obj = ty.new_instance(&Args::new()).unwrap();
        assert!(obj.call("one", &[]).is_err());
        assert_eq!(obj.call("one", &[Value::Int(1)]).unwrap(), Value::Int(1));
    }

    #[test]
    fn define_in_registers_and_exports() {
        let mut system = TypeSystem::new().unwrap();
        let ty = system.define_in("app.models", TypeBuilder::new("User")).unwrap();
        assert!(system.get_type("app.models.User").unwrap().ptr_eq(&ty));
    }
}
