//! Type and interface declaration builders.
//!
//! [`TypeBuilder`] collects a declaration fluently; [`TypeBuilder::build`]
//! validates it, flattens the parent and checks declared interfaces, and only
//! then produces an immutable [`TypeDescriptor`]. A failed build returns no
//! descriptor.
//!
//! # Example
//!
//! ```ignore
//! let person = TypeBuilder::new("Person")
//!     .field("name", Value::Null)
//!     .constructor(|this, args| {
//!         this.fields().set("name", args.value("name"));
//!         Ok(())
//!     })
//!     .getter("name", |this| Ok(this.fields().value("name")))
//!     .method("sayHello", 0, |this, _| {
//!         Ok(format!("Hello, I'm {}", this.get("name")?.as_str().unwrap_or("")).into())
//!     })
//!     .event("saying")
//!     .build()?;
//!
//! let employee = TypeBuilder::new("Employee").extends(&person).build()?;
//! ```

use classweave_core::{
    Accessor, Args, Capability, ConstructionMode, Constructor, FieldTemplate, Instance, InterfaceDef,
    InterfaceDescriptor, Member, MemberTable, Method, RegistrationError, RuntimeError, TypeDef,
    TypeDescriptor, Value,
};
use tracing::debug;

use crate::conformance::check_members;
use crate::inheritance::{flatten_events, flatten_fields, flatten_members};
use crate::properties::{SystemProperties, SystemProperty};

/// Identifiers the engine keeps for itself. Compared case-insensitively.
pub const RESERVED_NAMES: &[&str] = &[
    "$ctor",
    "$bctor",
    "$base",
    "$_",
    "$derived",
    "$events",
    "$extends",
    "$implements",
    "$members",
    "$constructor",
    "$global",
    "$namespace",
    "isTypeOf",
    "typeKind",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

fn check_name(name: &str, what: &str) -> Result<(), RegistrationError> {
    if name.is_empty() {
        return Err(RegistrationError::InvalidArgument {
            arg_name: what.to_string(),
            reason: format!("{} {} must have a name", article(what), what),
        });
    }
    if is_reserved(name) {
        return Err(RegistrationError::ReservedName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// TypeBuilder
// ============================================================================

/// Builder for a class-like type declaration.
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    parent: Option<TypeDescriptor>,
    constructor: Option<Constructor>,
    /// Own members in declaration order.
    members: Vec<(String, Member)>,
    fields: FieldTemplate,
    events: Vec<String>,
    interfaces: Vec<InterfaceDescriptor>,
    mode: ConstructionMode,
    strict_arity: Option<bool>,
    /// First name declared twice, reported by `build`.
    duplicate: Option<String>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constructor: None,
            members: Vec::new(),
            fields: Vec::new(),
            events: Vec::new(),
            interfaces: Vec::new(),
            mode: ConstructionMode::Open,
            strict_arity: None,
            duplicate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Single inheritance. Extending the implicit root is the same as not
    /// extending anything.
    pub fn extends(mut self, parent: &TypeDescriptor) -> Self {
        self.parent = (!parent.is_root()).then(|| parent.clone());
        self
    }

    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&Instance, &Args) -> Result<(), RuntimeError> + 'static,
    {
        self.constructor = Some(Constructor::new(body));
        self
    }

    fn note_duplicate(&mut self, name: &str) {
        if self.duplicate.is_none() {
            self.duplicate = Some(name.to_string());
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|(n, _)| n == name)
    }

    /// Declare a method with its arity.
    pub fn method<F>(mut self, name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        let name = name.into();
        if self.position(&name).is_some() {
            self.note_duplicate(&name);
            return self;
        }
        let method = Method::new(name.as_str(), arity, body);
        self.members.push((name, Member::Method(method)));
        self
    }

    /// Declare a property (or merge into one declared earlier, as long as
    /// the halves don't overlap).
    pub fn property(mut self, name: impl Into<String>, accessor: Accessor) -> Self {
        let name = name.into();
        match self.position(&name) {
            None => self.members.push((name, Member::Accessor(accessor))),
            Some(index) => {
                let existing = match &self.members[index].1 {
                    Member::Accessor(existing) => existing.clone(),
                    _ => {
                        self.note_duplicate(&name);
                        return self;
                    }
                };
                let overlaps = (existing.is_readable() && accessor.is_readable())
                    || (existing.is_writable() && accessor.is_writable());
                if overlaps {
                    self.note_duplicate(&name);
                } else {
                    self.members[index].1 = Member::Accessor(existing.merge(accessor));
                }
            }
        }
        self
    }

    pub fn getter<F>(self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Instance) -> Result<Value, RuntimeError> + 'static,
    {
        self.property(name, Accessor::new().with_getter(getter))
    }

    pub fn setter<F>(self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&Instance, Value) -> Result<(), RuntimeError> + 'static,
    {
        self.property(name, Accessor::new().with_setter(setter))
    }

    /// Declare a field of the shared store with its default value.
    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let name = name.into();
        if self.fields.iter().any(|(n, _)| *n == name) {
            self.note_duplicate(&name);
            return self;
        }
        self.fields.push((name, default.into()));
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.events.contains(&name) {
            self.note_duplicate(&name);
            return self;
        }
        self.events.push(name);
        self
    }

    pub fn events<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |b, name| b.event(name))
    }

    pub fn implements(mut self, iface: &InterfaceDescriptor) -> Self {
        if !self.interfaces.iter().any(|i| i.ptr_eq(iface)) {
            self.interfaces.push(iface.clone());
        }
        self
    }

    pub fn mode(mut self, mode: ConstructionMode) -> Self {
        self.mode = mode;
        self
    }

    /// No own slots can be added; existing ones may be reassigned.
    pub fn sealed(self) -> Self {
        self.mode(ConstructionMode::Sealed)
    }

    /// No own slots can be added or reassigned.
    pub fn frozen(self) -> Self {
        self.mode(ConstructionMode::Frozen)
    }

    /// Override [`SystemProperty::StrictCallArity`] for this type.
    pub fn strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = Some(strict);
        self
    }

    /// Build with default system properties.
    pub fn build(self) -> Result<TypeDescriptor, RegistrationError> {
        self.build_with(&SystemProperties::default())
    }

    /// Validate, flatten and compile the declaration.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_with(self, props: &SystemProperties) -> Result<TypeDescriptor, RegistrationError> {
        check_name(&self.name, "type")?;
        for (name, _) in &self.members {
            check_name(name, "member")?;
        }
        for (name, _) in &self.fields {
            check_name(name, "field")?;
        }
        for name in &self.events {
            check_name(name, "event")?;
        }

        if let Some(member) = self.duplicate {
            return Err(RegistrationError::DuplicateMember {
                type_name: self.name,
                member,
            });
        }

        let mut members = MemberTable::new();
        for (name, member) in self.members {
            members.insert(name, member);
        }
        for event in &self.events {
            let inherited = self
                .parent
                .as_ref()
                .is_some_and(|p| p.member(event).is_some());
            if members.contains(event) || inherited {
                return Err(RegistrationError::DuplicateEvent {
                    type_name: self.name,
                    event: event.clone(),
                });
            }
            members.insert(event.as_str(), Member::Event);
        }

        let mut fields = self.fields;
        let mut events = self.events;
        let inherited = match &self.parent {
            Some(parent) => {
                flatten_fields(parent, &mut fields);
                flatten_events(parent, &mut events);
                flatten_members(parent, &mut members)
            }
            None => 0,
        };

        let depth = self.parent.as_ref().map_or(1, |p| p.depth() + 1);
        if let Some(limit) = props.max_inheritance_depth() {
            if depth > limit {
                return Err(RegistrationError::InheritanceTooDeep {
                    type_name: self.name,
                    depth,
                    limit,
                });
            }
        }

        for iface in &self.interfaces {
            let conformance = check_members(&self.name, &members, iface);
            if let Some(member_name) = conformance.member_name {
                return Err(RegistrationError::NotImplemented {
                    type_name: self.name,
                    member_name,
                });
            }
        }

        debug!(
            type_name = %self.name,
            parent = self.parent.as_ref().map(TypeDescriptor::name),
            members = members.len(),
            inherited,
            "defined type"
        );

        Ok(TypeDescriptor::new(TypeDef {
            name: self.name,
            parent: self.parent,
            constructor: self.constructor,
            members,
            events,
            fields,
            interfaces: self.interfaces,
            mode: self.mode,
            strict_arity: self
                .strict_arity
                .unwrap_or_else(|| props.is_enabled(SystemProperty::StrictCallArity)),
        }))
    }
}

/// Declare a type with default system properties.
pub fn def(builder: TypeBuilder) -> Result<TypeDescriptor, RegistrationError> {
    builder.build()
}

// ============================================================================
// InterfaceBuilder
// ============================================================================

/// Builder for an interface declaration.
#[derive(Debug, Clone)]
pub struct InterfaceBuilder {
    name: String,
    bases: Vec<InterfaceDescriptor>,
    methods: Vec<(String, usize)>,
    properties: Vec<String>,
    duplicate: Option<String>,
}

impl InterfaceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            duplicate: None,
        }
    }

    /// Inherit every requirement of `base`.
    pub fn extends(mut self, base: &InterfaceDescriptor) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Require a method with the given arity.
    pub fn method(mut self, name: impl Into<String>, arity: usize) -> Self {
        let name = name.into();
        let taken = self.methods.iter().any(|(n, _)| *n == name) || self.properties.contains(&name);
        if taken {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.methods.push((name, arity));
        self
    }

    /// Declare a non-function member. Recorded, never checked.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let taken = self.methods.iter().any(|(n, _)| *n == name) || self.properties.contains(&name);
        if taken {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.properties.push(name);
        self
    }

    pub fn build(self) -> Result<InterfaceDescriptor, RegistrationError> {
        check_name(&self.name, "interface")?;
        for (name, _) in &self.methods {
            check_name(name, "member")?;
        }
        for name in &self.properties {
            check_name(name, "member")?;
        }
        if let Some(member) = self.duplicate {
            return Err(RegistrationError::DuplicateMember {
                type_name: self.name,
                member,
            });
        }

        let iface = InterfaceDescriptor::new(InterfaceDef {
            name: self.name,
            bases: self.bases,
            methods: self
                .methods
                .into_iter()
                .map(|(name, arity)| Capability::new(name, arity))
                .collect(),
            properties: self.properties,
        });
        debug!(
            interface = iface.name(),
            required = iface.required().len(),
            "defined interface"
        );
        Ok(iface)
    }
}

/// Declare an interface.
pub fn interfacedef(builder: InterfaceBuilder) -> Result<InterfaceDescriptor, RegistrationError> {
    builder.build()
}
