use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Events a subscription may fall behind by before older ones are dropped.
/// A subscription that lagged past a change to the key it waits on is handed
/// a catch-up event for that key instead (see [`SignalSubscription::next_for`]).
const EVENT_CAPACITY: usize = 64;

/// Identifies one browsing context (a tab) attached to a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    fn new() -> Self {
        ContextId(Uuid::new_v4())
    }

    /// Origin of a catch-up event: the writer was among the dropped events.
    pub fn unknown() -> Self {
        ContextId(Uuid::nil())
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A change to a shared key, delivered to every context except the one that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: ContextId,
    /// Number of changes made to `key` so far, this one included.
    pub sequence: u64,
}

#[derive(Default)]
struct Slots {
    values: HashMap<String, String>,
    changes: HashMap<String, u64>,
}

struct BusInner {
    slots: Mutex<Slots>,
    events: broadcast::Sender<StorageEvent>,
}

/// Shared key-value slots with change notifications, the way local storage
/// behaves across the tabs of one origin.
#[derive(Clone)]
pub struct SignalBus {
    inner: Arc<BusInner>,
}

impl SignalBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SignalBus {
            inner: Arc::new(BusInner {
                slots: Mutex::new(Slots::default()),
                events,
            }),
        }
    }

    /// Attaches a new context to the bus.
    pub fn port(&self) -> SignalPort {
        let context = ContextId::new();
        debug!("Attaching context {} to signal bus", context);
        SignalPort {
            bus: self.clone(),
            context,
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.slots().values.get(key).cloned()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, origin: ContextId, key: &str, new_value: Option<&str>) {
        // The slot lock is held while publishing so events keep the order of writes.
        let mut slots = self.slots();
        let old_value = match new_value {
            Some(value) => slots.values.insert(key.to_string(), value.to_string()),
            None => slots.values.remove(key),
        };

        if old_value.as_deref() == new_value {
            return;
        }

        let sequence = {
            let changes = slots.changes.entry(key.to_string()).or_insert(0);
            *changes += 1;
            *changes
        };
        let event = StorageEvent {
            key: key.to_string(),
            old_value,
            new_value: new_value.map(str::to_string),
            origin,
            sequence,
        };
        // No receivers is fine: nobody is listening yet.
        let _ = self.inner.events.send(event);
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One context's handle on the bus.
#[derive(Clone)]
pub struct SignalPort {
    bus: SignalBus,
    context: ContextId,
}

impl SignalPort {
    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn set_item(&self, key: &str, value: &str) {
        self.bus.write(self.context, key, Some(value));
    }

    pub fn remove_item(&self, key: &str) {
        self.bus.write(self.context, key, None);
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.bus.get_item(key)
    }

    /// Starts receiving changes made by other contexts.
    pub fn subscribe(&self) -> SignalSubscription {
        // Taken under the slot lock so no change slips between the counters and the receiver.
        let slots = self.bus.slots();
        let receiver = self.bus.inner.events.subscribe();
        let seen = slots.changes.clone();
        drop(slots);

        SignalSubscription {
            bus: Arc::downgrade(&self.bus.inner),
            context: self.context,
            receiver,
            seen,
        }
    }
}

/// Change notifications for one context. Dropping it unsubscribes.
pub struct SignalSubscription {
    bus: Weak<BusInner>,
    context: ContextId,
    receiver: broadcast::Receiver<StorageEvent>,
    /// Per key, the last change this subscription accounted for.
    seen: HashMap<String, u64>,
}

impl SignalSubscription {
    /// Waits for the next change to `key` made by another context.
    /// Returns `None` once the bus is gone.
    ///
    /// If the subscription fell behind and dropped changes to `key`, a catch-up
    /// event carrying the key's current value and an unknown origin is returned
    /// in their place. Dropped writes cannot be told apart by origin, so this
    /// context's own writes may surface that way too.
    pub async fn next_for(&mut self, key: &str) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    let accounted = self.seen.get(&event.key).copied().unwrap_or(0);
                    if event.sequence <= accounted {
                        // Already covered by a catch-up event.
                        continue;
                    }
                    self.seen.insert(event.key.clone(), event.sequence);
                    if event.origin != self.context && event.key == key {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Signal subscription lagged, {} events skipped", skipped);
                    if let Some(event) = self.catch_up(key) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn catch_up(&mut self, key: &str) -> Option<StorageEvent> {
        let inner = self.bus.upgrade()?;
        let (changes, current) = {
            let slots = inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
            (
                slots.changes.get(key).copied().unwrap_or(0),
                slots.values.get(key).cloned(),
            )
        };

        let seen = self.seen.get(key).copied().unwrap_or(0);
        if changes <= seen {
            return None;
        }
        self.seen.insert(key.to_string(), changes);

        Some(StorageEvent {
            key: key.to_string(),
            old_value: None,
            new_value: current,
            origin: ContextId::unknown(),
            sequence: changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_sibling_sees_write_and_removal() {
        let bus = SignalBus::new();
        let writer = bus.port();
        let reader = bus.port();
        let mut subscription = reader.subscribe();

        writer.set_item("logout", "1530518207007");
        writer.remove_item("logout");

        let written = subscription.next_for("logout").await.unwrap();
        assert_eq!(written.new_value.as_deref(), Some("1530518207007"));
        assert_eq!(written.old_value, None);
        assert_eq!(written.origin, writer.context());

        let removed = subscription.next_for("logout").await.unwrap();
        assert_eq!(removed.old_value.as_deref(), Some("1530518207007"));
        assert_eq!(removed.new_value, None);
        assert_eq!(bus.get_item("logout"), None);
    }

    #[tokio::test]
    async fn test_lagged_subscription_still_sees_missed_key_change() {
        let bus = SignalBus::new();
        let writer = bus.port();
        let mut subscription = bus.port().subscribe();

        writer.set_item("logout", "1530518207007");
        writer.remove_item("logout");
        for i in 0..EVENT_CAPACITY + 10 {
            writer.set_item("theme", &i.to_string());
        }

        let caught_up = timeout(WAIT, subscription.next_for("logout"))
            .await
            .expect("catch-up event")
            .unwrap();
        assert_eq!(caught_up.origin, ContextId::unknown());
        assert_eq!(caught_up.new_value, None);
        assert_eq!(caught_up.sequence, 2);

        // Already accounted for: nothing further for this key.
        assert!(timeout(WAIT, subscription.next_for("logout")).await.is_err());
    }

    #[tokio::test]
    async fn test_lag_without_key_change_is_silent() {
        let bus = SignalBus::new();
        let writer = bus.port();
        let mut subscription = bus.port().subscribe();

        for i in 0..EVENT_CAPACITY + 10 {
            writer.set_item("theme", &i.to_string());
        }

        assert!(timeout(WAIT, subscription.next_for("logout")).await.is_err());
    }

    #[tokio::test]
    async fn test_own_writes_are_not_echoed() {
        let bus = SignalBus::new();
        let port = bus.port();
        let mut subscription = port.subscribe();

        port.set_item("logout", "1");

        assert!(timeout(WAIT, subscription.next_for("logout")).await.is_err());
        assert_eq!(port.get_item("logout").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_other_keys_and_unchanged_values_are_ignored() {
        let bus = SignalBus::new();
        let writer = bus.port();
        let mut subscription = bus.port().subscribe();

        writer.set_item("theme", "dark");
        writer.remove_item("logout");
        assert!(timeout(WAIT, subscription.next_for("logout")).await.is_err());

        writer.set_item("logout", "1");
        writer.set_item("logout", "1");
        writer.set_item("logout", "2");

        let first = subscription.next_for("logout").await.unwrap();
        let second = subscription.next_for("logout").await.unwrap();
        assert_eq!(first.new_value.as_deref(), Some("1"));
        assert_eq!(second.new_value.as_deref(), Some("2"));
    }
}
