//! Refresh notifications between the app shell and list views.
//!
//! Each resource kind owns a `watch` channel whose value is a generation number.
//! A successful mutation publishes on the channel of the mutated resource; every
//! list view showing that resource holds a [`RefreshSignal`] and re-fetches the
//! next time it syncs after the generation moved.

use std::collections::HashMap;

use tokio::sync::watch;

use crate::models::ResourceKind;

#[derive(Debug)]
pub struct RefreshBus {
    channels: HashMap<ResourceKind, watch::Sender<u64>>,
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshBus {
    pub fn new() -> Self {
        let channels = ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, watch::channel(0u64).0))
            .collect();
        Self { channels }
    }

    /// Tell every subscriber of `kind` that its data changed
    pub fn publish(&self, kind: ResourceKind) {
        if let Some(sender) = self.channels.get(&kind) {
            sender.send_modify(|generation| *generation += 1);
            tracing::debug!(resource = %kind, generation = *sender.borrow(), "Published refresh");
        }
    }

    pub fn subscribe(&self, kind: ResourceKind) -> RefreshSignal {
        let receiver = match self.channels.get(&kind) {
            Some(sender) => sender.subscribe(),
            // Every kind gets a channel in `new`
            None => watch::channel(0u64).1,
        };
        RefreshSignal { kind, receiver }
    }

    /// Current generation of `kind`
    pub fn generation(&self, kind: ResourceKind) -> u64 {
        self.channels.get(&kind).map(|s| *s.borrow()).unwrap_or(0)
    }
}

/// A list view's subscription to one resource's refresh channel
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    kind: ResourceKind,
    receiver: watch::Receiver<u64>,
}

impl RefreshSignal {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// True once per publish that happened since the last call
    pub fn take_changed(&mut self) -> bool {
        match self.receiver.has_changed() {
            Ok(true) => {
                self.receiver.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Wait for the next publish; returns false when the bus is gone
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscribers_of_that_kind_only() {
        let bus = RefreshBus::new();
        let mut books = bus.subscribe(ResourceKind::Books);
        let mut rooms = bus.subscribe(ResourceKind::Rooms);

        assert!(!books.take_changed());
        bus.publish(ResourceKind::Books);
        assert!(books.take_changed());
        assert!(!books.take_changed());
        assert!(!rooms.take_changed());
        assert_eq!(bus.generation(ResourceKind::Books), 1);
        assert_eq!(rooms.kind(), ResourceKind::Rooms);
    }

    #[test]
    fn test_several_publishes_collapse_into_one_refresh() {
        let bus = RefreshBus::new();
        let mut loans = bus.subscribe(ResourceKind::Loans);
        bus.publish(ResourceKind::Loans);
        bus.publish(ResourceKind::Loans);
        assert!(loans.take_changed());
        assert!(!loans.take_changed());
    }

    #[tokio::test]
    async fn test_changed_wakes_waiters() {
        let bus = RefreshBus::new();
        let mut guests = bus.subscribe(ResourceKind::Guests);
        let waiter = tokio::spawn(async move { guests.changed().await });
        tokio::task::yield_now().await;
        bus.publish(ResourceKind::Guests);
        assert!(waiter.await.unwrap());
    }

    #[test]
    fn test_changed_reports_dropped_bus() {
        let bus = RefreshBus::new();
        let mut rooms = bus.subscribe(ResourceKind::Rooms);
        drop(bus);
        assert!(!tokio_test::block_on(rooms.changed()));
    }
}
