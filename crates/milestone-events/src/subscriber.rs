//! Change subscribers and the ordered list that delivers to them.
//!
//! Any type implementing [`EventSubscriber`] can be registered, including
//! plain closures taking `&EventRecord`. Subscribers are `Send` so a
//! registry can sit behind a lock and be shared across threads.

use milestone_types::EventRecord;

/// Receives every value change made to a registry.
///
/// Implementations can use this to update UI, unlock achievements, queue
/// persistence, etc. The callback runs inline with the mutating call, so
/// it should return quickly.
pub trait EventSubscriber: Send {
    /// Called once per key-level change, with the post-change value.
    fn on_event_changed(&mut self, record: &EventRecord);
}

impl<F> EventSubscriber for F
where
    F: FnMut(&EventRecord) + Send,
{
    fn on_event_changed(&mut self, record: &EventRecord) {
        self(record);
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Subscribers in registration order.
#[derive(Default)]
pub(crate) struct SubscriberList {
    entries: Vec<(SubscriptionId, Box<dyn EventSubscriber>)>,
    next_id: u64,
}

impl SubscriberList {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn push(&mut self, subscriber: Box<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, subscriber));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deliver one record to every subscriber, in registration order.
    pub(crate) fn broadcast(&mut self, record: &EventRecord) {
        tracing::trace!(
            key = %record.key,
            namespace = %record.namespace,
            value = record.value,
            subscribers = self.entries.len(),
            "Event changed"
        );
        for (_, subscriber) in &mut self.entries {
            subscriber.on_event_changed(record);
        }
    }
}

impl core::fmt::Debug for SubscriberList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriberList")
            .field("len", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
