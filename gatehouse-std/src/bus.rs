//! Event bus for session lifecycle notifications.
//!
//! Broadcasting is fire-and-forget: every active subscriber sees every
//! [`SessionEvent`] in publish order and nothing is read back.
//!
//! Subscribers can be closures, types implementing [`Subscriber`], or an
//! unbounded channel obtained from [`EventBus::channel`].

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use gatehouse_core::SessionEvent;
use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

/// Receives broadcast session events.
pub trait Subscriber: Send + Sync + 'static {
    /// Called once per published event.
    fn on_event(&self, event: &SessionEvent);

    /// Whether the subscriber can never receive again. Closed subscribers
    /// are removed from the bus after the next broadcast.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> Subscriber for F
where
    F: Fn(&SessionEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &SessionEvent) {
        (self)(event)
    }
}

/// Forwards events into an unbounded channel.
///
/// A dropped receiver is not an error. The subscriber reports itself closed
/// and the bus drops it.
pub struct ChannelSubscriber {
    sender: UnboundedSender<SessionEvent>,
}

impl ChannelSubscriber {
    /// Wrap a sender.
    pub fn new(sender: UnboundedSender<SessionEvent>) -> Self {
        Self { sender }
    }
}

impl Subscriber for ChannelSubscriber {
    fn on_event(&self, event: &SessionEvent) {
        let _ = self.sender.unbounded_send(event.clone());
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A handle for dynamically toggling a subscription at runtime.
#[derive(Debug, Clone)]
pub struct EnabledHandle(Arc<AtomicBool>);

impl EnabledHandle {
    /// Create a new enabled handle with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Check if the subscription is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the enabled state.
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

impl Default for EnabledHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

struct SubscriberEntry {
    id: u64,
    priority: i32,
    subscriber: Arc<dyn Subscriber>,
    enabled: EnabledHandle,
}

#[derive(Default)]
struct BusInner {
    entries: RwLock<Vec<SubscriberEntry>>,
    next_id: AtomicU64,
}

/// A broadcast bus for [`SessionEvent`]s.
///
/// Clones share the same subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe with default priority.
    pub fn subscribe<S: Subscriber>(&self, subscriber: S) -> Subscription {
        self.subscribe_with_priority(subscriber, 0)
    }

    /// Subscribe with a priority (lower = notified first). Subscribers with
    /// equal priority are notified in subscription order.
    pub fn subscribe_with_priority<S: Subscriber>(
        &self,
        subscriber: S,
        priority: i32,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let enabled = EnabledHandle::default();
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let position = entries.partition_point(|e| e.priority <= priority);
        entries.insert(
            position,
            SubscriberEntry {
                id,
                priority,
                subscriber: Arc::new(subscriber),
                enabled: enabled.clone(),
            },
        );
        Subscription {
            id,
            enabled,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe an unbounded channel and return its receiving end.
    pub fn channel(&self) -> (Subscription, UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = unbounded();
        (self.subscribe(ChannelSubscriber::new(sender)), receiver)
    }

    /// Broadcast an event to every enabled subscriber, then drop the ones
    /// that report themselves closed.
    ///
    /// Subscribers are snapshotted first, so a subscriber may subscribe or
    /// unsubscribe from within `on_event`.
    pub fn publish(&self, event: &SessionEvent) {
        let active: Vec<Arc<dyn Subscriber>> = self
            .inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.enabled.is_enabled())
            .map(|e| e.subscriber.clone())
            .collect();

        tracing::trace!(event = event.name(), subscribers = active.len(), "Broadcasting");
        let mut closed = false;
        for subscriber in active {
            subscriber.on_event(event);
            closed |= subscriber.is_closed();
        }
        if closed {
            self.prune_closed();
        }
    }

    fn prune_closed(&self) {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| !e.subscriber.is_closed());
        tracing::trace!(removed = before - entries.len(), "Pruned closed subscribers");
    }

    /// Number of subscriptions, paused ones included.
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it. Channel
/// subscriptions also go away once their receiver is dropped.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    enabled: EnabledHandle,
    bus: std::sync::Weak<BusInner>,
}

impl Subscription {
    /// Stop delivering events until [`resume`](Subscription::resume).
    pub fn pause(&self) {
        self.enabled.set(false);
    }

    /// Deliver events again.
    pub fn resume(&self) {
        self.enabled.set(true);
    }

    /// Whether events are currently delivered.
    pub fn is_active(&self) -> bool {
        self.enabled.is_enabled() && self.bus.strong_count() > 0
    }

    /// Remove the subscription from its bus.
    pub fn unsubscribe(self) {
        self.enabled.set(false);
        if let Some(bus) = self.bus.upgrade() {
            bus.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|e| e.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    type Tagged = Box<dyn Fn(&SessionEvent) + Send + Sync>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Tagged) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = log.clone();
        let make = move |tag: &'static str| -> Tagged {
            let log = shared.clone();
            Box::new(move |event: &SessionEvent| {
                log.lock().unwrap().push(format!("{tag}:{}", event.name()));
            })
        };
        (log, make)
    }

    #[test]
    fn test_publish_reaches_all_in_priority_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(make("b"));
        bus.subscribe_with_priority(make("a"), -10);
        bus.subscribe(make("c"));

        bus.publish(&SessionEvent::SignOutSuccess);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:signOutSuccess", "b:signOutSuccess", "c:signOutSuccess"]
        );
    }

    #[test]
    fn test_pause_resume_unsubscribe() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let sub = bus.subscribe(make("x"));

        sub.pause();
        assert!(!sub.is_active());
        bus.publish(&SessionEvent::Authenticated);
        assert!(log.lock().unwrap().is_empty());

        sub.resume();
        bus.publish(&SessionEvent::Authenticated);
        assert_eq!(log.lock().unwrap().len(), 1);

        sub.unsubscribe();
        assert!(bus.is_empty());
        bus.publish(&SessionEvent::Authenticated);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_channel_subscriber() {
        let bus = EventBus::new();
        let (_sub, mut events) = bus.channel();

        bus.publish(&SessionEvent::SignInSuccess);
        bus.publish(&SessionEvent::SignInFailure {
            message: "nope".into(),
        });

        assert_eq!(events.next().await, Some(SessionEvent::SignInSuccess));
        assert_eq!(
            events.next().await.map(|e| e.name()),
            Some("signInFailure")
        );
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(make("kept"));
        let (_sub, events) = bus.channel();
        assert_eq!(bus.len(), 2);

        drop(events);
        bus.publish(&SessionEvent::SignOutSuccess);

        assert_eq!(bus.len(), 1);
        bus.publish(&SessionEvent::SignOutSuccess);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_live_channel_is_not_pruned() {
        let bus = EventBus::new();
        let (_sub, _events) = bus.channel();

        bus.publish(&SessionEvent::Authenticated);

        assert_eq!(bus.len(), 1);
    }
}
