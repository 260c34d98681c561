//! Named state fields with change notification.
//!
//! A [`StateField`] holds the latest value of one piece of published state
//! (the directory map, a client's result set). Subscribers always observe
//! the most recent value; intermediate values may be skipped.

use std::sync::Arc;

use tokio::sync::watch;

/// A named, observable value.
pub struct StateField<T> {
    name: &'static str,
    tx: Arc<watch::Sender<Arc<T>>>,
}

impl<T> Clone for StateField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Send + Sync + 'static> StateField<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            name,
            tx: Arc::new(tx),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replaces the value and notifies subscribers.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    /// Current value.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribes to future changes.
    pub fn subscribe(&self) -> FieldSubscriber<T> {
        FieldSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T> std::fmt::Debug for StateField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateField").field("name", &self.name).finish()
    }
}

/// Receiving side of a [`StateField`].
pub struct FieldSubscriber<T> {
    rx: watch::Receiver<Arc<T>>,
}

impl<T> FieldSubscriber<T> {
    /// Value at the time of the last observation.
    pub fn current(&mut self) -> Arc<T> {
        Arc::clone(&self.rx.borrow_and_update())
    }

    /// Waits for the next change. Returns `None` once the field is dropped.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_notifies_subscriber() {
        let field = StateField::new("Directory", 0u32);
        let mut sub = field.subscribe();
        assert_eq!(*sub.current(), 0);

        field.publish(7);
        assert_eq!(*sub.changed().await.unwrap(), 7);
        assert_eq!(*field.get(), 7);
        assert_eq!(field.name(), "Directory");
    }

    #[tokio::test]
    async fn test_changed_ends_when_field_dropped() {
        let field = StateField::new("x", ());
        let mut sub = field.subscribe();
        drop(field);
        assert!(sub.changed().await.is_none());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let field = StateField::new("x", 1);
        field.publish(2);
        assert_eq!(*field.get(), 2);
        assert_eq!(field.subscriber_count(), 0);
    }
}
