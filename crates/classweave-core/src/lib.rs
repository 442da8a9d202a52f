//! Core object model for classweave.
//!
//! This crate holds everything an instance needs at runtime:
//!
//! - [`Value`] and [`Args`] - dynamic values and the constructor arguments object
//! - [`Method`], [`Accessor`], [`Constructor`], [`MemberTable`] - member kinds
//! - [`TypeDescriptor`] - compiled, immutable type with a flattened member table
//! - [`InterfaceDescriptor`] - capability contract (name + arity)
//! - [`Instance`] and [`FieldStore`] - construction chains sharing one store
//! - [`EventChannel`] - subscriber lists with subscribe/unsubscribe/toggle
//! - [`construct`] - the construction-time chain builder
//!
//! Everything here is `Rc`-based and single-threaded.

mod descriptor;
mod error;
mod event;
mod field_store;
mod instance;
mod interface;
mod member;
mod value;

pub mod construct;

pub use descriptor::{ConstructionMode, FieldTemplate, TypeDef, TypeDescriptor, TypeKind};
pub use error::{ClassweaveError, RegistrationError, RuntimeError};
pub use event::{EventChannel, EventHandler, EventHandlerFn, Subscriber, SubscriptionHandle};
pub use field_store::FieldStore;
pub use instance::{Instance, ObjectFlags};
pub use interface::{Capability, InterfaceDef, InterfaceDescriptor};
pub use member::{
    Accessor, Constructor, ConstructorFn, GetterFn, Member, MemberTable, Method, MethodFn,
    SetterFn,
};
pub use value::{Args, Value};
