//! Built-in exception family.
//!
//! Three ordinary types declared with [`TypeBuilder`], exported from the
//! `classweave` namespace together with the implicit root `Object`:
//!
//! - `Exception { message, innerException, toString() }`
//! - `ArgumentException : Exception { argName }`
//! - `NotImplementedException : Exception { memberName }`
//!
//! [`Exceptions::from_error`] turns a [`RegistrationError`] into the matching
//! exception instance, for hosts that surface failures as objects.

use classweave_core::{Args, Instance, RegistrationError, RuntimeError, TypeDescriptor, Value};
use classweave_registry::NamespaceRegistry;
use tracing::debug;

use crate::builder::TypeBuilder;

/// Namespace the built-ins are exported from.
pub const BUILTIN_NAMESPACE: &str = "classweave";

fn field_getter(field: &'static str) -> impl Fn(&Instance) -> Result<Value, RuntimeError> {
    move |this| Ok(this.fields().value(field))
}

fn argument_message(arg_name: &Value, reason: &Value) -> String {
    let arg_name = match arg_name {
        Value::Str(s) => s.to_string(),
        other => format!("{:?}", other),
    };
    let mut message = format!("The given argument '{}' is not valid", arg_name);
    if let Some(reason) = reason.as_str().filter(|r| !r.is_empty()) {
        message.push_str(&format!(" (Reason: {})", reason));
    }
    message
}

fn not_implemented_message(member_name: &Value) -> String {
    match member_name.as_str() {
        Some(name) => format!("Method or property '{}' is not implemented", name),
        None => "A method or property is not implemented".to_string(),
    }
}

/// Descriptors of the built-in exception types.
#[derive(Debug, Clone)]
pub struct Exceptions {
    exception: TypeDescriptor,
    argument: TypeDescriptor,
    not_implemented: TypeDescriptor,
}

impl Exceptions {
    /// Declare the three exception types.
    pub fn define() -> Result<Self, RegistrationError> {
        let exception = TypeBuilder::new("Exception")
            .field("message", Value::Null)
            .field("innerException", Value::Null)
            .constructor(|this, args| {
                this.fields().set("message", args.value("message"));
                this.fields().set("innerException", args.value("innerException"));
                Ok(())
            })
            .getter("message", field_getter("message"))
            .getter("innerException", field_getter("innerException"))
            .method("toString", 0, |this, _| this.get("message"))
            .build()?;

        let argument = TypeBuilder::new("ArgumentException")
            .extends(&exception)
            .field("argName", Value::Null)
            .constructor(|this, args| {
                let arg_name = args.value("argName");
                let message = argument_message(&arg_name, &args.value("reason"));
                this.fields().set("argName", arg_name);
                this.base_constructor(&Args::new().with("message", message))
            })
            .getter("argName", field_getter("argName"))
            .build()?;

        let not_implemented = TypeBuilder::new("NotImplementedException")
            .extends(&exception)
            .field("memberName", Value::Null)
            .constructor(|this, args| {
                let member_name = args.value("memberName");
                let message = not_implemented_message(&member_name);
                this.base_constructor(&Args::new().with("message", message))?;
                this.fields().set("memberName", member_name);
                Ok(())
            })
            .getter("memberName", field_getter("memberName"))
            .build()?;

        Ok(Self {
            exception,
            argument,
            not_implemented,
        })
    }

    /// Declare the family and export it (plus `Object`) from
    /// [`BUILTIN_NAMESPACE`].
    pub fn install(registry: &mut NamespaceRegistry) -> Result<Self, RegistrationError> {
        let exceptions = Self::define()?;
        registry.register_with(BUILTIN_NAMESPACE, |ns| {
            ns.export_type(TypeDescriptor::object())?;
            ns.export_type(exceptions.exception.clone())?;
            ns.export_type(exceptions.argument.clone())?;
            ns.export_type(exceptions.not_implemented.clone())
        })?;
        debug!(namespace = BUILTIN_NAMESPACE, "installed built-in exceptions");
        Ok(exceptions)
    }

    pub fn exception(&self) -> &TypeDescriptor {
        &self.exception
    }

    pub fn argument_exception(&self) -> &TypeDescriptor {
        &self.argument
    }

    pub fn not_implemented_exception(&self) -> &TypeDescriptor {
        &self.not_implemented
    }

    pub fn new_exception(
        &self,
        message: &str,
        inner: Option<Instance>,
    ) -> Result<Instance, RuntimeError> {
        self.exception.new_instance(
            &Args::new()
                .with("message", message)
                .with("innerException", inner),
        )
    }

    pub fn new_argument_exception(
        &self,
        arg_name: &str,
        reason: Option<&str>,
    ) -> Result<Instance, RuntimeError> {
        self.argument
            .new_instance(&Args::new().with("argName", arg_name).with("reason", reason))
    }

    pub fn new_not_implemented(&self, member_name: Option<&str>) -> Result<Instance, RuntimeError> {
        self.not_implemented
            .new_instance(&Args::new().with("memberName", member_name))
    }

    /// The exception instance a registration failure maps to.
    pub fn from_error(&self, error: &RegistrationError) -> Result<Instance, RuntimeError> {
        match error {
            RegistrationError::InvalidArgument { arg_name, reason } => {
                self.new_argument_exception(arg_name, Some(reason))
            }
            RegistrationError::InvalidNamespacePath { segment, .. } if segment.is_empty() => self
                .new_argument_exception(
                    "namespace path",
                    Some("No namespace path has been provided"),
                ),
            RegistrationError::InvalidNamespacePath { path, segment } => {
                let reason = format!(
                    "The namespace path '{}' is not valid because the namespace '{}' is not declared",
                    path, segment
                );
                self.new_argument_exception("namespace path", Some(&reason))
            }
            RegistrationError::AmbiguousImport { name, .. } => self.new_exception(
                &format!(
                    "A type called '{}' in current context from another namespace already exists. Create an alias or use a full namespace paths",
                    name
                ),
                None,
            ),
            RegistrationError::NotImplemented { member_name, .. } => {
                self.new_not_implemented(Some(member_name))
            }
            other => self.new_exception(&other.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(instance: &Instance) -> String {
        instance
            .call("toString", &[])
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn exception_carries_inner() {
        let ex = Exceptions::define().unwrap();
        let inner = ex.new_exception("inner", None).unwrap();
        let outer = ex.new_exception("outer", Some(inner.clone())).unwrap();

        assert_eq!(message(&outer), "outer");
        let got = outer.get("innerException").unwrap();
        assert!(got.as_object().unwrap().ptr_eq(&inner));
    }

    #[test]
    fn argument_exception_message() {
        let ex = Exceptions::define().unwrap();
        let with_reason = ex.new_argument_exception("x", Some("too big")).unwrap();
        assert_eq!(
            message(&with_reason),
            "The given argument 'x' is not valid (Reason: too big)"
        );
        assert_eq!(with_reason.get("argName").unwrap(), Value::from("x"));
        assert!(with_reason.is_type_of(ex.exception()));

        let bare = ex.new_argument_exception("x", None).unwrap();
        assert_eq!(message(&bare), "The given argument 'x' is not valid");
    }

    #[test]
    fn not_implemented_message() {
        let ex = Exceptions::define().unwrap();
        let named = ex.new_not_implemented(Some("add")).unwrap();
        assert_eq!(message(&named), "Method or property 'add' is not implemented");
        assert_eq!(named.get("memberName").unwrap(), Value::from("add"));

        let anonymous = ex.new_not_implemented(None).unwrap();
        assert_eq!(message(&anonymous), "A method or property is not implemented");
    }

    #[test]
    fn errors_map_to_exceptions() {
        let ex = Exceptions::define().unwrap();
        let err = RegistrationError::NotImplemented {
            type_name: "Calc".into(),
            member_name: "add".into(),
        };
        let instance = ex.from_error(&err).unwrap();
        assert!(instance.is_type_of(ex.not_implemented_exception()));

        let err = RegistrationError::InvalidNamespacePath {
            path: "a.b".into(),
            segment: "b".into(),
        };
        let instance = ex.from_error(&err).unwrap();
        assert!(instance.is_type_of(ex.argument_exception()));
        assert!(message(&instance).contains("namespace 'b' is not declared"));
    }

    #[test]
    fn install_exports_family() {
        let mut registry = NamespaceRegistry::new();
        let ex = Exceptions::install(&mut registry).unwrap();
        let exported = registry.get_type("classweave.ArgumentException").unwrap();
        assert!(exported.ptr_eq(ex.argument_exception()));
        assert!(registry.get_type("classweave.Object").unwrap().is_root());
    }
}
