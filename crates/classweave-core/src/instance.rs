//! Constructed objects.
//!
//! An [`Instance`] is one level of a construction chain. It holds its type,
//! the chain's shared [`FieldStore`], a link to the base-level instance (iff
//! its type has a parent) and its own slot table for per-instance values.
//!
//! Member resolution on an instance:
//!
//! - `call`: own slot function, then the type's method table
//! - `get`: own slot, then method / property getter / event invoker
//! - `set`: property setter, otherwise an own slot guarded by [`ObjectFlags`]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::{
    Args, EventChannel, FieldStore, Member, Method, RuntimeError, Subscriber, SubscriptionHandle,
    TypeDescriptor, TypeKind, Value,
};

bitflags! {
    /// What may still happen to an instance's own slots.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// New own slots may be added.
        const EXTENSIBLE = 1 << 0;
        /// Existing members may be reassigned.
        const WRITABLE = 1 << 1;
    }
}

pub(crate) struct InstanceInner {
    ty: TypeDescriptor,
    fields: FieldStore,
    base: Option<Instance>,
    own: RefCell<FxHashMap<String, Value>>,
    flags: Cell<ObjectFlags>,
}

/// Shared handle to one level of a construction chain.
#[derive(Clone)]
pub struct Instance(Rc<InstanceInner>);

impl Instance {
    pub(crate) fn new(ty: &TypeDescriptor, fields: FieldStore, base: Option<Instance>) -> Self {
        Instance(Rc::new(InstanceInner {
            ty: ty.clone(),
            fields,
            base,
            own: RefCell::new(FxHashMap::default()),
            flags: Cell::new(ObjectFlags::all()),
        }))
    }

    pub(crate) fn from_inner(inner: Rc<InstanceInner>) -> Self {
        Instance(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<InstanceInner> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn lock(&self, flags: ObjectFlags) {
        self.0.flags.set(flags);
    }

    // === Identity ===

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.0.ty
    }

    pub fn type_name(&self) -> &str {
        self.0.ty.name()
    }

    pub fn type_kind(&self) -> TypeKind {
        self.0.ty.kind()
    }

    /// Check if this level, or any level below it, is of type `ty`.
    ///
    /// Walks the base-instance chain, not the descriptor chain. Every
    /// instance is of the implicit root type.
    pub fn is_type_of(&self, ty: &TypeDescriptor) -> bool {
        if ty.is_root() {
            return true;
        }
        let mut level = Some(self);
        while let Some(current) = level {
            if current.type_descriptor().ptr_eq(ty) {
                return true;
            }
            level = current.base();
        }
        false
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // === Chain ===

    pub fn fields(&self) -> &FieldStore {
        &self.0.fields
    }

    pub fn base(&self) -> Option<&Instance> {
        self.0.base.as_ref()
    }

    /// The outermost instance of this chain.
    pub fn most_derived(&self) -> Option<Instance> {
        self.0.fields.most_derived()
    }

    /// Two levels below the outermost instance, shared by every level.
    pub fn grand_base(&self) -> Option<Instance> {
        self.0.fields.grand_base()
    }

    pub fn flags(&self) -> ObjectFlags {
        self.0.flags.get()
    }

    pub fn is_frozen(&self) -> bool {
        self.flags().is_empty()
    }

    pub fn is_extensible(&self) -> bool {
        self.flags().contains(ObjectFlags::EXTENSIBLE)
    }

    /// Run this level's own constructor against this level.
    ///
    /// A type without a constructor has an empty one.
    pub fn invoke_constructor(&self, args: &Args) -> Result<(), RuntimeError> {
        match self.0.ty.constructor() {
            Some(ctor) => ctor.invoke(self, args),
            None => Ok(()),
        }
    }

    /// Run the parent type's constructor against the base level.
    ///
    /// Constructors are never chained automatically; a derived constructor
    /// that skips this leaves parent fields at their template defaults.
    pub fn base_constructor(&self, args: &Args) -> Result<(), RuntimeError> {
        match self.base() {
            Some(base) => base.invoke_constructor(args),
            None => Err(RuntimeError::MemberNotFound {
                type_name: self.type_name().to_string(),
                member: "base".to_string(),
            }),
        }
    }

    // === Members ===

    /// Check if `name` resolves on this instance.
    pub fn has_member(&self, name: &str) -> bool {
        self.0.own.borrow().contains_key(name) || self.0.ty.member(name).is_some()
    }

    fn not_found(&self, name: &str) -> RuntimeError {
        RuntimeError::MemberNotFound {
            type_name: self.type_name().to_string(),
            member: name.to_string(),
        }
    }

    fn invoke_method(&self, method: &Method, args: &[Value]) -> Result<Value, RuntimeError> {
        if self.0.ty.strict_arity() && args.len() != method.arity() {
            return Err(RuntimeError::ArityMismatch {
                member: method.name().to_string(),
                expected: method.arity(),
                actual: args.len(),
            });
        }
        method.invoke(self, args)
    }

    /// Call a method by name with `this` bound to this level.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let own = self.0.own.borrow().get(name).cloned();
        if let Some(value) = own {
            return match value {
                Value::Function(method) => self.invoke_method(&method, args),
                _ => Err(RuntimeError::NotCallable(name.to_string())),
            };
        }

        match self.0.ty.member(name) {
            Some(Member::Method(method)) => self.invoke_method(method, args),
            Some(Member::Event) => {
                let event_args = args.first().cloned().unwrap_or_default();
                self.raise(name, &event_args, args.get(1))?;
                Ok(Value::Null)
            }
            Some(Member::Accessor(_)) => match self.get(name)? {
                Value::Function(method) => self.invoke_method(&method, args),
                _ => Err(RuntimeError::NotCallable(name.to_string())),
            },
            None => Err(self.not_found(name)),
        }
    }

    /// Read a member.
    ///
    /// Methods read as detached [`Value::Function`]s; events read as an
    /// invoker of arity 2 taking `(args, context)`.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.0.own.borrow().get(name) {
            return Ok(value.clone());
        }

        match self.0.ty.member(name) {
            Some(Member::Method(method)) => Ok(Value::Function(method.clone())),
            Some(Member::Accessor(accessor)) => accessor
                .get(self)
                .unwrap_or_else(|| Err(RuntimeError::WriteOnlyProperty(name.to_string()))),
            Some(Member::Event) => {
                let event = name.to_string();
                Ok(Value::Function(Method::new(name, 2, move |this, args| {
                    let event_args = args.first().cloned().unwrap_or_default();
                    this.raise(&event, &event_args, args.get(1))?;
                    Ok(Value::Null)
                })))
            }
            None => Err(self.not_found(name)),
        }
    }

    /// Assign a member.
    ///
    /// Properties go through their setter regardless of the object flags.
    /// Anything else becomes an own slot: reassigning needs `WRITABLE`,
    /// adding a new slot needs `EXTENSIBLE`.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), RuntimeError> {
        let value = value.into();
        let exists = match self.0.ty.member(name) {
            Some(Member::Accessor(accessor)) => {
                return accessor
                    .set(self, value)
                    .unwrap_or_else(|| Err(RuntimeError::ReadOnlyProperty(name.to_string())));
            }
            Some(Member::Event) => return Err(RuntimeError::EventNotAssignable(name.to_string())),
            Some(Member::Method(_)) => true,
            None => self.0.own.borrow().contains_key(name),
        };

        let flags = self.flags();
        if flags.is_empty() {
            return Err(RuntimeError::FrozenObject(name.to_string()));
        }
        if exists && !flags.contains(ObjectFlags::WRITABLE) {
            return Err(RuntimeError::FrozenObject(name.to_string()));
        }
        if !exists && !flags.contains(ObjectFlags::EXTENSIBLE) {
            return Err(RuntimeError::NotExtensible(name.to_string()));
        }

        self.0.own.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    // === Events ===

    /// The chain's channel for an event declared on this level's type.
    pub fn channel(&self, event: &str) -> Result<EventChannel, RuntimeError> {
        if !self.0.ty.has_event(event) {
            return Err(RuntimeError::EventNotDeclared(event.to_string()));
        }
        Ok(self.0.fields.ensure_channel(event))
    }

    pub fn subscribe(
        &self,
        event: &str,
        subscriber: impl Into<Subscriber>,
    ) -> Result<SubscriptionHandle, RuntimeError> {
        Ok(self.channel(event)?.subscribe(subscriber))
    }

    /// Returns `false` if the handle was not subscribed.
    pub fn unsubscribe(&self, event: &str, handle: SubscriptionHandle) -> Result<bool, RuntimeError> {
        Ok(self.channel(event)?.unsubscribe(handle))
    }

    /// Flip membership of `subscriber`. Returns `true` if now subscribed.
    pub fn toggle(&self, event: &str, subscriber: impl Into<Subscriber>) -> Result<bool, RuntimeError> {
        Ok(self.channel(event)?.toggle(subscriber))
    }

    /// Raise an event.
    ///
    /// Handlers without a pinned context are called with `context`, or with
    /// the chain's most-derived instance when none is given.
    pub fn raise(
        &self,
        event: &str,
        args: &Value,
        context: Option<&Value>,
    ) -> Result<(), RuntimeError> {
        let channel = self.channel(event)?;
        let source = Value::Object(self.most_derived().unwrap_or_else(|| self.clone()));
        channel.invoke(&source, args, context)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name())
            .field("base", &self.base().map(Instance::type_name))
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}
