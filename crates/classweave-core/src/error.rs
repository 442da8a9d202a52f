//! Unified error types for classweave.
//!
//! Errors are grouped by the phase that raises them:
//!
//! ```text
//! ClassweaveError (top-level wrapper)
//! ├── RegistrationError - namespace, import and type declaration errors
//! └── RuntimeError      - construction, member access and event dispatch errors
//! ```
//!
//! Each phase-specific error can be handled directly, or converted to
//! `ClassweaveError` with `?` for unified handling:
//!
//! ```ignore
//! use classweave_core::ClassweaveError;
//!
//! fn setup(system: &mut TypeSystem) -> Result<(), ClassweaveError> {
//!     let point = system.def(TypeBuilder::new("Point"))?;   // RegistrationError
//!     let p = point.new_instance(&Args::new())?;             // RuntimeError
//!     Ok(())
//! }
//! ```

use thiserror::Error;

// ============================================================================
// Registration Errors
// ============================================================================

fn invalid_path_message(path: &str, segment: &str) -> String {
    if segment.is_empty() {
        format!("no namespace path has been provided (got '{}')", path)
    } else {
        format!(
            "the namespace path '{}' is not valid because the namespace '{}' is not declared",
            path, segment
        )
    }
}

/// Errors raised while registering namespaces, importing them, or declaring
/// types and interfaces.
///
/// None of these leave partial state behind: a failed declaration returns no
/// descriptor and a failed import returns no scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An argument of a declaration or registry call is invalid.
    #[error("the given argument '{arg_name}' is not valid (reason: {reason})")]
    InvalidArgument {
        /// Name of the offending argument.
        arg_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A namespace path is empty or names an unregistered namespace.
    #[error("{}", invalid_path_message(.path, .segment))]
    InvalidNamespacePath {
        /// The full path as given.
        path: String,
        /// The first segment that could not be resolved.
        segment: String,
    },

    /// Two imported namespaces export a member with the same name.
    #[error(
        "a type called '{name}' in current context from another namespace already exists ({}); create an alias or use a full namespace path",
        namespaces.join(", ")
    )]
    AmbiguousImport {
        /// The colliding export name.
        name: String,
        /// Paths of the namespaces exporting it.
        namespaces: Vec<String>,
    },

    /// A namespace already exports a member with this name.
    #[error("duplicate export: {0}")]
    DuplicateExport(String),

    /// An alias name is already bound to a different namespace.
    #[error("alias '{0}' is already bound to another namespace")]
    AliasConflict(String),

    /// A member name was declared twice in one declaration.
    #[error("type '{type_name}' declares member '{member}' more than once")]
    DuplicateMember {
        /// The declaring type.
        type_name: String,
        /// The repeated member name.
        member: String,
    },

    /// An event name collides with an existing member.
    #[error("type '{type_name}' has already defined a member called '{event}'")]
    DuplicateEvent {
        /// The declaring type.
        type_name: String,
        /// The event name.
        event: String,
    },

    /// A member name collides with an engine-reserved identifier.
    #[error("'{0}' is a reserved identifier")]
    ReservedName(String),

    /// A declared interface is not satisfied after inheritance flattening.
    #[error("type '{type_name}': method or property '{member_name}' is not implemented")]
    NotImplemented {
        /// The declaring type.
        type_name: String,
        /// The first missing or mismatched capability.
        member_name: String,
    },

    /// The ancestor chain exceeds the configured maximum depth.
    #[error("type '{type_name}' has an inheritance depth of {depth}, the limit is {limit}")]
    InheritanceTooDeep {
        /// The declaring type.
        type_name: String,
        /// Depth the declaration would have.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised while constructing instances, accessing members or
/// dispatching events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// No member with this name exists on the instance.
    #[error("'{type_name}' has no member '{member}'")]
    MemberNotFound {
        /// Runtime type of the instance.
        type_name: String,
        /// The requested member.
        member: String,
    },

    /// The member exists but cannot be called.
    #[error("member '{0}' is not callable")]
    NotCallable(String),

    /// A call supplied the wrong number of arguments.
    #[error("'{member}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// The called member.
        member: String,
        /// Declared arity.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// The property has no setter.
    #[error("property '{0}' is read-only")]
    ReadOnlyProperty(String),

    /// The property has no getter.
    #[error("property '{0}' is write-only")]
    WriteOnlyProperty(String),

    /// The event is not declared on the instance's type.
    #[error("event '{0}' is not declared")]
    EventNotDeclared(String),

    /// Events are subscribed explicitly and cannot be assigned.
    #[error("event '{0}' cannot be assigned; use subscribe or unsubscribe")]
    EventNotAssignable(String),

    /// The instance is frozen.
    #[error("cannot assign '{0}': the object is frozen")]
    FrozenObject(String),

    /// The instance is sealed and the member does not exist yet.
    #[error("cannot add '{0}': the object is not extensible")]
    NotExtensible(String),

    /// A member was called with an unusable argument.
    #[error("the given argument '{arg_name}' is not valid (reason: {reason})")]
    InvalidArgument {
        /// Name of the offending argument.
        arg_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Error raised by user code inside a member body.
    #[error("{0}")]
    Native(String),
}

impl RuntimeError {
    /// Shorthand for an error raised by a member body.
    pub fn native(message: impl Into<String>) -> Self {
        RuntimeError::Native(message.into())
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Top-level error covering every phase.
///
/// ```ignore
/// use classweave_core::ClassweaveError;
///
/// fn build(system: &mut TypeSystem) -> Result<Instance, ClassweaveError> {
///     let ty = system.def(TypeBuilder::new("A"))?;
///     Ok(ty.new_instance(&Args::new())?)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassweaveError {
    /// Registration or declaration error.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Runtime error.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl ClassweaveError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, ClassweaveError::Registration(_))
    }

    /// Check if this is a runtime error.
    pub fn is_runtime(&self) -> bool {
        matches!(self, ClassweaveError::Runtime(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_namespace_path_names_segment() {
        let err = RegistrationError::InvalidNamespacePath {
            path: "game.ui".into(),
            segment: "ui".into(),
        };
        let text = err.to_string();
        assert!(text.contains("'game.ui'"));
        assert!(text.contains("namespace 'ui'"));
    }

    #[test]
    fn empty_namespace_path_message() {
        let err = RegistrationError::InvalidNamespacePath {
            path: "a..b".into(),
            segment: String::new(),
        };
        let text = err.to_string();
        assert!(text.contains("no namespace path has been provided"));
        assert!(!text.contains("namespace ''"));
    }

    #[test]
    fn ambiguous_import_lists_namespaces() {
        let err = RegistrationError::AmbiguousImport {
            name: "Widget".into(),
            namespaces: vec!["ns.a".into(), "ns.b".into()],
        };
        let text = err.to_string();
        assert!(text.contains("'Widget'"));
        assert!(text.contains("ns.a, ns.b"));
    }

    #[test]
    fn wrapper_conversion() {
        let err: ClassweaveError = RegistrationError::ReservedName("$base".into()).into();
        assert!(err.is_registration());
        assert!(!err.is_runtime());

        let err: ClassweaveError = RuntimeError::native("boom").into();
        assert!(err.is_runtime());
        assert_eq!(err.to_string(), "runtime error: boom");
    }
}
