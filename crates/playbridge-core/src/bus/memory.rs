//! Process-local broker
//!
//! Fan-out by exact subject match. Messages published before anyone
//! subscribes are dropped, as with a real core-NATS subject.

use super::{MessageBus, Subscription};
use crate::error::{ReceiveError, TransportError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// In-memory [`MessageBus`]
///
/// Cloning shares the same subject table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBus {
    subscribers: Arc<DashMap<String, Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
}

impl InMemoryBus {
    /// Create empty bus
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscribers on a subject
    #[must_use]
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.subscribers
            .get(subject)
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .entry(subject.to_string())
            .or_default()
            .push(tx);

        Ok(Box::new(MemorySubscription {
            subject: subject.to_string(),
            rx,
        }))
    }

    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        if let Some(mut senders) = self.subscribers.get_mut(subject) {
            senders.retain(|tx| tx.send(payload.clone()).is_ok());
        }
        Ok(())
    }
}

/// Subscription handed out by [`InMemoryBus`]
#[derive(Debug)]
pub struct MemorySubscription {
    subject: String,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn next_message(&mut self, timeout: Duration) -> Result<Vec<u8>, ReceiveError> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(payload)) => Ok(payload),
            Ok(None) => Err(ReceiveError::Closed),
            Err(_) => Err(ReceiveError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = InMemoryBus::new();
        let mut a = bus.subscribe("ui.input").await.unwrap();
        let mut b = bus.subscribe("ui.input").await.unwrap();

        bus.publish("ui.input", b"hello".to_vec()).await.unwrap();

        assert_eq!(a.next_message(WAIT).await.unwrap(), b"hello");
        assert_eq!(b.next_message(WAIT).await.unwrap(), b"hello");
        assert_eq!(a.subject(), "ui.input");
    }

    #[tokio::test]
    async fn subjects_are_isolated() {
        let bus = InMemoryBus::new();
        let mut sub = bus.subscribe("player.output").await.unwrap();

        bus.publish("player.input", b"x".to_vec()).await.unwrap();

        let err = sub.next_message(Duration::from_millis(20)).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let bus = InMemoryBus::new();
        let sub = bus.subscribe("s").await.unwrap();
        assert_eq!(bus.subscriber_count("s"), 1);

        drop(sub);
        bus.publish("s", Vec::new()).await.unwrap();

        assert_eq!(bus.subscriber_count("s"), 0);
    }

    #[tokio::test]
    async fn messages_arrive_in_publish_order() {
        let bus = InMemoryBus::new();
        let mut sub = bus.subscribe("s").await.unwrap();

        for i in 0..5u8 {
            bus.publish("s", vec![i]).await.unwrap();
        }

        for i in 0..5u8 {
            assert_eq!(sub.next_message(WAIT).await.unwrap(), vec![i]);
        }
    }
}
