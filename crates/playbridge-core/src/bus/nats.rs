//! NATS backend

use super::{MessageBus, Subscription};
use crate::error::{ReceiveError, TransportError};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;

/// [`MessageBus`] over a NATS connection
#[derive(Debug, Clone)]
pub struct NatsBus {
    client: async_nats::Client,
    url: String,
}

impl NatsBus {
    /// Connect to a NATS server
    ///
    /// # Errors
    /// `TransportError::Connect` if the server cannot be reached
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| TransportError::connect(url, e))?;

        tracing::info!(url, "Connected to NATS");
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Server URL this bus connected to
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Flush buffered publishes to the server
    ///
    /// # Errors
    /// `TransportError::Publish` if the flush fails
    pub async fn flush(&self) -> Result<(), TransportError> {
        self.client
            .flush()
            .await
            .map_err(|e| TransportError::publish("*", e))
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, TransportError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| TransportError::subscribe(subject, e))?;

        Ok(Box::new(NatsSubscription {
            subject: subject.to_string(),
            subscriber,
        }))
    }

    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| TransportError::publish(subject, e))
    }
}

/// Subscription backed by an `async_nats::Subscriber`
#[derive(Debug)]
pub struct NatsSubscription {
    subject: String,
    subscriber: async_nats::Subscriber,
}

#[async_trait]
impl Subscription for NatsSubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn next_message(&mut self, timeout: Duration) -> Result<Vec<u8>, ReceiveError> {
        match tokio::time::timeout(timeout, self.subscriber.next()).await {
            Ok(Some(message)) => Ok(message.payload.to_vec()),
            Ok(None) => Err(ReceiveError::Closed),
            Err(_) => Err(ReceiveError::Timeout(timeout)),
        }
    }
}
