//! Broker abstraction
//!
//! The dispatch loops only need two things from a broker: a subscription
//! they can poll with a timeout, and a way to publish raw bytes. Two
//! backends are provided:
//! - [`NatsBus`] for production
//! - [`InMemoryBus`] for tests and offline runs

pub mod memory;
pub mod nats;

pub use memory::InMemoryBus;
pub use nats::NatsBus;

use crate::error::{ReceiveError, TransportError};
use async_trait::async_trait;
use std::time::Duration;

/// Publish/subscribe broker
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Subscribe to a subject
    ///
    /// # Errors
    /// `TransportError::Subscribe` if the broker refuses the subscription
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, TransportError>;

    /// Publish a payload to a subject
    ///
    /// # Errors
    /// `TransportError::Publish` if the broker does not accept the message
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Pull-style subscription to one subject
#[async_trait]
pub trait Subscription: Send {
    /// Subject this subscription listens on
    fn subject(&self) -> &str;

    /// Wait up to `timeout` for the next payload
    ///
    /// # Errors
    /// - `ReceiveError::Timeout` if nothing arrived in time
    /// - `ReceiveError::Closed` if the subscription has ended
    async fn next_message(&mut self, timeout: Duration) -> Result<Vec<u8>, ReceiveError>;
}
