//! The shared private-state container of one construction chain.
//!
//! Exactly one store is allocated per chain, at its root level; every level
//! above adopts the same handle. Private state written at any level is
//! therefore visible from all of them.
//!
//! The store also carries the chain's back references: the most-derived
//! (outermost) instance and, when the chain is deep enough, the grandparent of
//! the outermost level. Both are weak, since every instance already holds the
//! store strongly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::instance::InstanceInner;
use crate::{EventChannel, FieldTemplate, Instance, Value};

#[derive(Default)]
struct FieldData {
    values: FxHashMap<String, Value>,
    most_derived: Weak<InstanceInner>,
    grand_base: Weak<InstanceInner>,
    channels: FxHashMap<String, EventChannel>,
}

/// Shared handle to a chain's field store.
#[derive(Clone, Default)]
pub struct FieldStore(Rc<RefCell<FieldData>>);

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().values.get(name).cloned()
    }

    /// Get a field, reading `Null` when absent.
    pub fn value(&self, name: &str) -> Value {
        self.get(name).unwrap_or_default()
    }

    /// Write a field. Returns the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().values.insert(name.into(), value.into())
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.borrow_mut().values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().values.contains_key(name)
    }

    /// Field names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.borrow().values.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.0.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().values.is_empty()
    }

    /// Insert template defaults for fields not written yet.
    pub fn seed(&self, template: &FieldTemplate) {
        let mut data = self.0.borrow_mut();
        for (name, default) in template {
            data.values
                .entry(name.clone())
                .or_insert_with(|| default.clone());
        }
    }

    /// Write template defaults, replacing values already present.
    ///
    /// Used by derived levels during construction so their defaults win over
    /// the ones their ancestors seeded.
    pub fn overlay(&self, template: &FieldTemplate) {
        let mut data = self.0.borrow_mut();
        for (name, default) in template {
            data.values.insert(name.clone(), default.clone());
        }
    }

    /// The outermost instance of the chain, while it is alive.
    pub fn most_derived(&self) -> Option<Instance> {
        self.0
            .borrow()
            .most_derived
            .upgrade()
            .map(Instance::from_inner)
    }

    pub(crate) fn set_most_derived(&self, instance: &Instance) {
        self.0.borrow_mut().most_derived = instance.downgrade();
    }

    /// Two levels below the outermost instance, if the chain has them.
    pub fn grand_base(&self) -> Option<Instance> {
        self.0
            .borrow()
            .grand_base
            .upgrade()
            .map(Instance::from_inner)
    }

    pub(crate) fn set_grand_base(&self, instance: &Instance) {
        self.0.borrow_mut().grand_base = instance.downgrade();
    }

    /// The chain's channel for `event`, if one was created.
    pub fn channel(&self, event: &str) -> Option<EventChannel> {
        self.0.borrow().channels.get(event).cloned()
    }

    pub(crate) fn ensure_channel(&self, event: &str) -> EventChannel {
        self.0
            .borrow_mut()
            .channels
            .entry(event.to_string())
            .or_insert_with(|| EventChannel::new(event))
            .clone()
    }

    pub fn ptr_eq(&self, other: &FieldStore) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("FieldStore")
            .field("fields", &data.values.len())
            .field("channels", &data.channels.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let store = FieldStore::new();
        let alias = store.clone();

        store.set("name", "Alice");
        assert_eq!(alias.value("name"), Value::from("Alice"));
        assert!(alias.ptr_eq(&store));
        assert!(!FieldStore::new().ptr_eq(&store));
    }

    #[test]
    fn seed_keeps_written_fields() {
        let store = FieldStore::new();
        store.set("x", 5);
        store.seed(&vec![
            ("x".to_string(), Value::Int(0)),
            ("y".to_string(), Value::Int(0)),
        ]);

        assert_eq!(store.value("x"), Value::Int(5));
        assert_eq!(store.value("y"), Value::Int(0));
        assert_eq!(store.keys(), ["x", "y"]);
    }

    #[test]
    fn overlay_replaces() {
        let store = FieldStore::new();
        store.seed(&vec![("x".to_string(), Value::Int(1))]);
        store.overlay(&vec![("x".to_string(), Value::Int(2))]);
        assert_eq!(store.value("x"), Value::Int(2));
    }

    #[test]
    fn channels_are_created_once() {
        let store = FieldStore::new();
        assert!(store.channel("saying").is_none());

        let first = store.ensure_channel("saying");
        let second = store.ensure_channel("saying");
        first.subscribe(crate::EventHandler::new(|_, _| Ok(())));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn back_references_start_empty() {
        let store = FieldStore::new();
        assert!(store.most_derived().is_none());
        assert!(store.grand_base().is_none());
    }
}
