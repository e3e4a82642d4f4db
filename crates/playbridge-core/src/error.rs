//! Error types for Playbridge Core
//!
//! Provides error handling for:
//! - Broker transport (connect, subscribe, receive, publish)
//! - Message handling inside a dispatch loop
//! - Configuration loading and validation
//! - Bridge startup

use playbridge_scenario::StoreError;
use std::path::PathBuf;
use std::time::Duration;

/// Broker transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the broker
    #[error("failed to connect to broker at {url}: {message}")]
    Connect { url: String, message: String },

    /// Subscription could not be created
    #[error("failed to subscribe to '{subject}': {message}")]
    Subscribe { subject: String, message: String },

    /// Outbound message was not accepted
    #[error("failed to publish to '{subject}': {message}")]
    Publish { subject: String, message: String },
}

impl TransportError {
    /// Create connect error
    pub fn connect(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Connect {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create subscribe error
    pub fn subscribe(subject: impl Into<String>, message: impl ToString) -> Self {
        Self::Subscribe {
            subject: subject.into(),
            message: message.to_string(),
        }
    }

    /// Create publish error
    pub fn publish(subject: impl Into<String>, message: impl ToString) -> Self {
        Self::Publish {
            subject: subject.into(),
            message: message.to_string(),
        }
    }
}

/// Errors from waiting on a subscription
#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    /// Nothing arrived within the receive timeout
    #[error("no message within {0:?}")]
    Timeout(Duration),

    /// Subscription stream ended
    #[error("subscription closed")]
    Closed,

    /// Broker-level failure
    #[error("receive failed: {0}")]
    Transport(String),
}

impl ReceiveError {
    /// Timeouts are routine; everything else is a transport fault
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors raised by a message handler
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Scenario persistence failed
    #[error("scenario store error: {0}")]
    Store(#[from] StoreError),

    /// Handler-specific failure
    #[error("handler failed: {0}")]
    Failed(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Values parsed but are unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that stop the bridge from starting
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Broker connection or subscription failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::publish("player.output", "connection reset");
        assert_eq!(
            err.to_string(),
            "failed to publish to 'player.output': connection reset"
        );
    }

    #[test]
    fn receive_timeout_classification() {
        assert!(ReceiveError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!ReceiveError::Closed.is_timeout());
        assert!(!ReceiveError::Transport("x".into()).is_timeout());
    }

    #[test]
    fn error_conversions() {
        let store_err = StoreError::read(
            "s.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let handler_err: HandlerError = store_err.into();
        assert!(matches!(handler_err, HandlerError::Store(_)));

        let bridge_err: BridgeError = TransportError::connect("nats://x", "refused").into();
        assert!(matches!(bridge_err, BridgeError::Transport(_)));
    }
}
