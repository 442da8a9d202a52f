//! classweave: a dynamic type-composition engine.
//!
//! Declare namespaces, class-like types and interface contracts at runtime,
//! then build objects with single inheritance, explicit base-constructor
//! calls, structural interface checks and per-object events.
//!
//! ```ignore
//! use classweave::prelude::*;
//!
//! let mut system = TypeSystem::new()?;
//! let base = system.def(TypeBuilder::new("Base").method("f", 0, |_, _| Ok("base".into())))?;
//! let derived = system.def(
//!     TypeBuilder::new("Derived")
//!         .extends(&base)
//!         .method("f", 0, |_, _| Ok("derived".into())),
//! )?;
//!
//! let obj = derived.new_instance(&Args::new())?;
//! assert_eq!(obj.call("f", &[])?, Value::from("derived"));
//! assert!(obj.is_type_of(&base));
//! ```

pub mod builder;
pub mod conformance;
pub mod exceptions;
pub mod inheritance;
pub mod properties;
pub mod system;

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for declaring and using types.
pub mod prelude {
    pub use crate::builder::{InterfaceBuilder, TypeBuilder, def, interfacedef};
    pub use crate::conformance::{Conformance, implements};
    pub use crate::exceptions::{BUILTIN_NAMESPACE, Exceptions};
    pub use crate::properties::{SystemProperties, SystemProperty};
    pub use crate::system::TypeSystem;
    pub use classweave_core::{
        Accessor, Args, ClassweaveError, ConstructionMode, EventHandler, Instance,
        InterfaceDescriptor, Method, RegistrationError, RuntimeError, Subscriber,
        SubscriptionHandle, TypeDescriptor, TypeKind, Value,
    };
    pub use classweave_registry::{Export, ImportScope, NamespaceRegistry, NamespaceScope};
}
