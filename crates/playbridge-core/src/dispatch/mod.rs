//! Event dispatch loop
//!
//! One loop per inbound channel. Each cycle walks
//! `WaitingForMessage → Decoding → Processing → Publishing` and then waits
//! again. Nothing that goes wrong with a single message stops the loop:
//! - receive timeout: logged, retried immediately
//! - transport failure: logged, retried after an exponential backoff
//! - decode / handler / encode failure: logged, message dropped
//!
//! Only the shutdown signal ends a loop. A message that is already being
//! processed runs to completion first.

pub mod backoff;
pub mod handlers;

pub use backoff::Backoff;
pub use handlers::{PlaybackHandler, ScriptChangeHandler};

use crate::bus::{MessageBus, Subscription};
use crate::config::BackoffConfig;
use crate::error::HandlerError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Processing step of a dispatch loop
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Decoded inbound payload
    type Input: DeserializeOwned + Send;
    /// Result published on the outbound channel
    type Output: Serialize + Send + Sync;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Process one decoded message
    ///
    /// # Errors
    /// Any [`HandlerError`]; the message is dropped and nothing is published
    async fn handle(&self, input: Self::Input) -> Result<Self::Output, HandlerError>;
}

/// What one dispatch cycle ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Result published on the outbound channel
    Published,
    /// No message within the receive timeout
    TimedOut,
    /// Subscription reported a transport fault or closed
    ReceiveFailed,
    /// Payload did not decode into the handler's input
    DecodeFailed,
    /// Handler returned an error
    HandlerFailed,
    /// Handler output could not be serialized
    EncodeFailed,
    /// Broker rejected the outbound message
    PublishFailed,
}

impl StepOutcome {
    /// Failures of the broker itself, which warrant backing off
    #[inline]
    #[must_use]
    pub fn is_transport_failure(self) -> bool {
        matches!(self, Self::ReceiveFailed | Self::PublishFailed)
    }
}

/// Counters kept by a dispatch loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Messages taken off the subscription
    pub received: u64,
    /// Results published
    pub published: u64,
    /// Received messages that produced no publish
    pub dropped: u64,
    /// Receives that timed out
    pub timeouts: u64,
    /// Receive and publish transport failures
    pub transport_errors: u64,
}

/// Receive/decode/handle/publish loop for one channel
pub struct DispatchLoop<H: MessageHandler> {
    subscription: Box<dyn Subscription>,
    bus: Arc<dyn MessageBus>,
    outbound: String,
    handler: H,
    receive_timeout: Duration,
    backoff: Backoff,
    stats: DispatchStats,
}

impl<H: MessageHandler> DispatchLoop<H> {
    /// Create loop reading `subscription` and publishing to `outbound`
    #[must_use]
    pub fn new(
        subscription: Box<dyn Subscription>,
        bus: Arc<dyn MessageBus>,
        outbound: impl Into<String>,
        handler: H,
    ) -> Self {
        Self {
            subscription,
            bus,
            outbound: outbound.into(),
            handler,
            receive_timeout: Duration::from_secs(1),
            backoff: Backoff::from(BackoffConfig::default()),
            stats: DispatchStats::default(),
        }
    }

    /// With receive timeout
    #[inline]
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// With backoff policy
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Counters so far
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Handler driving this loop
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run one full cycle: wait for a message and process it
    pub async fn step(&mut self) -> StepOutcome {
        match self.receive().await {
            Ok(payload) => self.process(payload).await,
            Err(outcome) => outcome,
        }
    }

    /// Run until `shutdown` becomes `true` (or its sender is dropped)
    ///
    /// # Returns
    /// Final counters
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> DispatchStats {
        let name = self.handler.name();
        tracing::info!(
            handler = name,
            inbound = self.subscription.subject(),
            outbound = %self.outbound,
            "Dispatch loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let received = tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => break,
                received = self.receive() => received,
            };

            let was_received = received.is_ok();
            let outcome = match received {
                Ok(payload) => self.process(payload).await,
                Err(outcome) => outcome,
            };

            if outcome.is_transport_failure() {
                let delay = self.backoff.next_delay();
                tracing::warn!(
                    handler = name,
                    failures = self.backoff.failures(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Backing off after transport failure"
                );
                tokio::select! {
                    biased;
                    () = shutdown_requested(&mut shutdown) => break,
                    () = tokio::time::sleep(delay) => {}
                }
            } else if was_received {
                self.backoff.reset();
            }
        }

        tracing::info!(handler = name, stats = ?self.stats, "Dispatch loop stopped");
        self.stats
    }

    async fn receive(&mut self) -> Result<Vec<u8>, StepOutcome> {
        match self.subscription.next_message(self.receive_timeout).await {
            Ok(payload) => {
                self.stats.received += 1;
                Ok(payload)
            }
            Err(e) if e.is_timeout() => {
                self.stats.timeouts += 1;
                tracing::debug!(
                    handler = self.handler.name(),
                    subject = self.subscription.subject(),
                    "No message: {e}"
                );
                Err(StepOutcome::TimedOut)
            }
            Err(e) => {
                self.stats.transport_errors += 1;
                tracing::warn!(
                    handler = self.handler.name(),
                    subject = self.subscription.subject(),
                    "Error receiving message: {e}"
                );
                Err(StepOutcome::ReceiveFailed)
            }
        }
    }

    async fn process(&mut self, payload: Vec<u8>) -> StepOutcome {
        let span = tracing::info_span!(
            "dispatch",
            handler = self.handler.name(),
            message_id = %Uuid::new_v4(),
        );
        let outcome = decode_handle_publish(&self.handler, self.bus.as_ref(), &self.outbound, payload)
            .instrument(span)
            .await;

        match outcome {
            StepOutcome::Published => self.stats.published += 1,
            StepOutcome::PublishFailed => {
                self.stats.transport_errors += 1;
                self.stats.dropped += 1;
            }
            _ => self.stats.dropped += 1,
        }
        outcome
    }
}

/// Resolves once the signal reads `true` or its sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        let stop = *shutdown.borrow_and_update();
        if stop || shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn decode_handle_publish<H: MessageHandler>(
    handler: &H,
    bus: &dyn MessageBus,
    outbound: &str,
    payload: Vec<u8>,
) -> StepOutcome {
    let input: H::Input = match serde_json::from_slice(&payload) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(bytes = payload.len(), "Error decoding message: {e}");
            return StepOutcome::DecodeFailed;
        }
    };

    let output = match handler.handle(input).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Error processing message: {e}");
            return StepOutcome::HandlerFailed;
        }
    };

    let encoded = match serde_json::to_vec(&output) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!("Error encoding result: {e}");
            return StepOutcome::EncodeFailed;
        }
    };

    match bus.publish(outbound, encoded).await {
        Ok(()) => {
            tracing::debug!(subject = outbound, "Published result");
            StepOutcome::Published
        }
        Err(e) => {
            tracing::error!("Error publishing result: {e}");
            StepOutcome::PublishFailed
        }
    }
}
