//! Event channels.
//!
//! A channel keeps an ordered subscriber list for one event of one
//! construction chain. Membership is decided by reference equality of the
//! handler (and of the pinned context, for bound subscribers), never by
//! position, so [`EventChannel::toggle`] applied twice restores the previous
//! membership.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::{RuntimeError, Value};

/// Body of an event handler: `(context, args)`.
pub type EventHandlerFn = dyn Fn(&Value, &Value) -> Result<(), RuntimeError>;

/// A shared handler reference. Clones are the same handler.
#[derive(Clone)]
pub struct EventHandler(Rc<EventHandlerFn>);

impl EventHandler {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<(), RuntimeError> + 'static,
    {
        EventHandler(Rc::new(body))
    }

    pub fn call(&self, context: &Value, args: &Value) -> Result<(), RuntimeError> {
        (self.0)(context, args)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

/// A bare handler, or a handler with a pinned call context.
#[derive(Debug, Clone)]
pub struct Subscriber {
    handler: EventHandler,
    context: Option<Value>,
}

impl Subscriber {
    pub fn new(handler: EventHandler) -> Self {
        Self {
            handler,
            context: None,
        }
    }

    /// A subscriber whose calls always use `context`, whatever the raiser passes.
    pub fn bound(handler: EventHandler, context: impl Into<Value>) -> Self {
        Self {
            handler,
            context: Some(context.into()),
        }
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }

    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    /// Reference equality used for membership lookups.
    pub fn same_as(&self, other: &Subscriber) -> bool {
        self.handler.ptr_eq(&other.handler) && self.context == other.context
    }
}

impl From<EventHandler> for Subscriber {
    fn from(handler: EventHandler) -> Self {
        Subscriber::new(handler)
    }
}

/// Identifies one subscription on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

struct ChannelData {
    name: String,
    next_id: u64,
    subscribers: Vec<(SubscriptionHandle, Subscriber)>,
}

/// Subscriber list of one event.
///
/// Cloning yields another handle to the same list.
#[derive(Clone)]
pub struct EventChannel(Rc<RefCell<ChannelData>>);

impl EventChannel {
    pub fn new(name: impl Into<String>) -> Self {
        EventChannel(Rc::new(RefCell::new(ChannelData {
            name: name.into(),
            next_id: 0,
            subscribers: Vec::new(),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    fn position(&self, subscriber: &Subscriber) -> Option<usize> {
        self.0
            .borrow()
            .subscribers
            .iter()
            .position(|(_, s)| s.same_as(subscriber))
    }

    /// Append a subscriber.
    ///
    /// Subscribing a reference that is already present returns its existing
    /// handle instead of adding a second entry.
    pub fn subscribe(&self, subscriber: impl Into<Subscriber>) -> SubscriptionHandle {
        let subscriber = subscriber.into();
        let mut data = self.0.borrow_mut();
        if let Some((handle, _)) = data.subscribers.iter().find(|(_, s)| s.same_as(&subscriber)) {
            return *handle;
        }
        let handle = SubscriptionHandle(data.next_id);
        data.next_id += 1;
        data.subscribers.push((handle, subscriber));
        handle
    }

    /// Remove a subscription. Returns `false` if it was not present.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.subscribers.len();
        data.subscribers.retain(|(h, _)| *h != handle);
        data.subscribers.len() != before
    }

    /// Remove the subscriber if present, append it otherwise.
    ///
    /// Returns `true` if the subscriber is subscribed afterwards.
    pub fn toggle(&self, subscriber: impl Into<Subscriber>) -> bool {
        let subscriber = subscriber.into();
        match self.position(&subscriber) {
            Some(index) => {
                self.0.borrow_mut().subscribers.remove(index);
                false
            }
            None => {
                self.subscribe(subscriber);
                true
            }
        }
    }

    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        self.position(subscriber).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().subscribers.is_empty()
    }

    /// Call every subscriber in insertion order.
    ///
    /// Each call's context is the subscriber's pinned context, else
    /// `context`, else `source`. Handlers run against a snapshot, so they may
    /// subscribe or unsubscribe without affecting the current dispatch. The
    /// first failing handler stops dispatch.
    pub fn invoke(
        &self,
        source: &Value,
        args: &Value,
        context: Option<&Value>,
    ) -> Result<(), RuntimeError> {
        let snapshot: Vec<Subscriber> = self
            .0
            .borrow()
            .subscribers
            .iter()
            .map(|(_, s)| s.clone())
            .collect();
        trace!(event = %self.0.borrow().name, subscribers = snapshot.len(), "raising event");

        for subscriber in &snapshot {
            let call_context = subscriber.context().or(context).unwrap_or(source);
            subscriber.handler().call(call_context, args)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("EventChannel")
            .field("name", &data.name)
            .field("subscribers", &data.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting() -> (EventHandler, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let handler = EventHandler::new(move |_, _| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        (handler, count)
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let channel = EventChannel::new("saying");
        let (handler, count) = counting();

        assert!(channel.toggle(handler.clone()));
        channel.invoke(&Value::Null, &Value::Null, None).unwrap();
        assert_eq!(count.get(), 1);

        assert!(!channel.toggle(handler.clone()));
        channel.invoke(&Value::Null, &Value::Null, None).unwrap();
        assert_eq!(count.get(), 1);

        assert!(channel.toggle(handler));
        channel.invoke(&Value::Null, &Value::Null, None).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn subscribe_is_idempotent_per_reference() {
        let channel = EventChannel::new("changed");
        let (handler, _) = counting();

        let first = channel.subscribe(handler.clone());
        let second = channel.subscribe(handler.clone());
        assert_eq!(first, second);
        assert_eq!(channel.len(), 1);

        assert!(channel.unsubscribe(first));
        assert!(!channel.unsubscribe(first));
        assert!(channel.is_empty());
    }

    #[test]
    fn context_precedence() {
        let channel = EventChannel::new("ping");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        let plain = EventHandler::new(move |ctx, _| {
            log.borrow_mut().push(ctx.clone());
            Ok(())
        });
        let log = Rc::clone(&seen);
        let pinned = EventHandler::new(move |ctx, _| {
            log.borrow_mut().push(ctx.clone());
            Ok(())
        });

        channel.subscribe(plain);
        channel.subscribe(Subscriber::bound(pinned, "pinned"));

        let source = Value::from("source");
        channel.invoke(&source, &Value::Null, None).unwrap();
        channel
            .invoke(&source, &Value::Null, Some(&Value::from("caller")))
            .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0], Value::from("source"));
        assert_eq!(seen[1], Value::from("pinned"));
        assert_eq!(seen[2], Value::from("caller"));
        assert_eq!(seen[3], Value::from("pinned"));
    }

    #[test]
    fn bound_subscribers_differ_by_context() {
        let channel = EventChannel::new("ping");
        let (handler, _) = counting();

        channel.subscribe(Subscriber::bound(handler.clone(), "a"));
        channel.subscribe(Subscriber::bound(handler.clone(), "b"));
        assert_eq!(channel.len(), 2);
        assert!(!channel.toggle(Subscriber::bound(handler, "a")));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn handler_error_stops_dispatch() {
        let channel = EventChannel::new("fail");
        let (after, count) = counting();
        channel.subscribe(EventHandler::new(|_, _| Err(RuntimeError::native("nope"))));
        channel.subscribe(after);

        let err = channel.invoke(&Value::Null, &Value::Null, None).unwrap_err();
        assert_eq!(err, RuntimeError::native("nope"));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn handlers_may_unsubscribe_during_dispatch() {
        let channel = EventChannel::new("once");
        let (handler, count) = counting();
        let handle = channel.subscribe(handler);

        let inner = channel.clone();
        channel.subscribe(EventHandler::new(move |_, _| {
            inner.unsubscribe(handle);
            Ok(())
        }));

        channel.invoke(&Value::Null, &Value::Null, None).unwrap();
        channel.invoke(&Value::Null, &Value::Null, None).unwrap();
        assert_eq!(count.get(), 1);
    }
}
