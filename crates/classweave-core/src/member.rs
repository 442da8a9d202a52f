//! Member kinds installed on type descriptors.
//!
//! - [`Method`] - named callable with a declared arity
//! - [`Accessor`] - getter and/or setter pair
//! - [`Constructor`] - the constructor slot of a type
//! - [`Member`] - one entry of a [`MemberTable`]

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{Args, Instance, RuntimeError, Value};

/// Body of a method: receives the instance it was called on and the
/// positional arguments.
pub type MethodFn = dyn Fn(&Instance, &[Value]) -> Result<Value, RuntimeError>;

/// Body of a property getter.
pub type GetterFn = dyn Fn(&Instance) -> Result<Value, RuntimeError>;

/// Body of a property setter.
pub type SetterFn = dyn Fn(&Instance, Value) -> Result<(), RuntimeError>;

/// Body of a constructor: receives the instance under construction and the
/// caller's arguments object.
pub type ConstructorFn = dyn Fn(&Instance, &Args) -> Result<(), RuntimeError>;

/// A named callable with a declared parameter count.
///
/// Cloning shares the body, so a method copied into a derived type's table
/// is the same code as the parent's. Identity is the body reference.
#[derive(Clone)]
pub struct Method {
    name: Rc<str>,
    arity: usize,
    body: Rc<MethodFn>,
}

impl Method {
    pub fn new<F>(name: impl Into<Rc<str>>, arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        Self {
            name: name.into(),
            arity,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter count, compared during interface conformance.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Call the body with `this` bound to `receiver`.
    pub fn invoke(&self, receiver: &Instance, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.body)(receiver, args)
    }

    /// Check if two methods share the same body.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A property: getter and/or setter.
#[derive(Clone, Default)]
pub struct Accessor {
    getter: Option<Rc<GetterFn>>,
    setter: Option<Rc<SetterFn>>,
}

impl Accessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the getter (builder style).
    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Instance) -> Result<Value, RuntimeError> + 'static,
    {
        self.getter = Some(Rc::new(getter));
        self
    }

    /// Set the setter (builder style).
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&Instance, Value) -> Result<(), RuntimeError> + 'static,
    {
        self.setter = Some(Rc::new(setter));
        self
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Fill in whichever half `other` has and `self` lacks.
    pub fn merge(mut self, other: Accessor) -> Self {
        if self.getter.is_none() {
            self.getter = other.getter;
        }
        if self.setter.is_none() {
            self.setter = other.setter;
        }
        self
    }

    /// Build a new accessor for a derived type that shares this one's bodies.
    ///
    /// The bodies take the receiver as a parameter, so the rebuilt pair
    /// resolves against whichever instance it is later read through.
    pub fn rebuild(&self) -> Accessor {
        Accessor {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }

    /// Run the getter, if any.
    pub fn get(&self, receiver: &Instance) -> Option<Result<Value, RuntimeError>> {
        self.getter.as_ref().map(|g| g(receiver))
    }

    /// Run the setter, if any.
    pub fn set(&self, receiver: &Instance, value: Value) -> Option<Result<(), RuntimeError>> {
        self.setter.as_ref().map(|s| s(receiver, value))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// The constructor slot of a type.
#[derive(Clone)]
pub struct Constructor(Rc<ConstructorFn>);

impl Constructor {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Instance, &Args) -> Result<(), RuntimeError> + 'static,
    {
        Constructor(Rc::new(body))
    }

    pub fn invoke(&self, this: &Instance, args: &Args) -> Result<(), RuntimeError> {
        (self.0)(this, args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constructor(..)")
    }
}

/// One entry of a member table.
#[derive(Debug, Clone)]
pub enum Member {
    Method(Method),
    Accessor(Accessor),
    /// Declared event; the channel itself lives with each construction chain.
    Event,
}

impl Member {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Member::Method(_) => "method",
            Member::Accessor(_) => "property",
            Member::Event => "event",
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_accessor(&self) -> Option<&Accessor> {
        match self {
            Member::Accessor(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Member::Event)
    }
}

/// Flattened member table of a type: own members plus everything inherited.
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    members: FxHashMap<String, Member>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Insert a member, replacing any previous entry of the same name.
    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.members.insert(name.into(), member);
    }

    /// Insert only if absent. Returns `true` when the member was added.
    pub fn insert_if_absent(&mut self, name: &str, member: Member) -> bool {
        if self.members.contains_key(name) {
            return false;
        }
        self.members.insert(name.to_string(), member);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find a method by name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.get(name).and_then(Member::as_method)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
