//! Playbridge Core
//!
//! Connects a video player and a UI scripting layer through a
//! publish/subscribe broker:
//! - Playback tasks in, playback status out
//! - Script changes in, persisted to the scenario document, acknowledged
//!
//! Each direction runs as an independent [`dispatch::DispatchLoop`]; the
//! [`Bridge`] starts both and hands back a handle for shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use playbridge_core::{Bridge, BridgeConfig, NatsBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::new().with_scenario_path("scenarios.yaml");
//! let bus = NatsBus::connect(&config.broker_url).await?;
//!
//! let handle = Bridge::start(&config, Arc::new(bus)).await?;
//! tokio::signal::ctrl_c().await?;
//! let stats = handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod bridge;
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod playback;

// Re-exports for convenience
pub use bridge::{Bridge, BridgeHandle, BridgeStats};
pub use bus::{InMemoryBus, MessageBus, NatsBus, Subscription};
pub use config::{BackoffConfig, BridgeConfig, ChannelConfig, DEFAULT_BROKER_URL};
pub use dispatch::{
    Backoff, DispatchLoop, DispatchStats, MessageHandler, PlaybackHandler, ScriptChangeHandler,
    StepOutcome,
};
pub use error::{BridgeError, ConfigError, HandlerError, ReceiveError, TransportError};
pub use messages::{Acknowledgement, PlaybackStatus, PlaybackTask, SCRIPT_CHANGE_ACK};
pub use playback::{FixedStatusReporter, PlaybackReporter};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Playbridge Core
    pub use crate::{
        Bridge, BridgeConfig, BridgeHandle, InMemoryBus, MessageBus, NatsBus, PlaybackStatus,
        PlaybackTask,
    };
    pub use playbridge_scenario::{ScenarioDocument, ScenarioStore, ScriptChangeEvent};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
