//! Bridge - wires both dispatch loops onto one broker
//!
//! ```text
//! player.input ──► [playback loop] ──────────────────────────► player.output
//! ui.output    ──► [script-change loop] ─► ScenarioSync ─────► ui.input
//! ```
//!
//! Startup (config validation and subscribing) is fatal on failure. After
//! that the loops never stop on their own; [`BridgeHandle::shutdown`] is
//! the only way out.

use crate::bus::MessageBus;
use crate::config::BridgeConfig;
use crate::dispatch::{
    Backoff, DispatchLoop, DispatchStats, PlaybackHandler, ScriptChangeHandler,
};
use crate::error::BridgeError;
use crate::playback::FixedStatusReporter;
use playbridge_scenario::{ScenarioStore, ScenarioSync};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Final counters of both loops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Playback loop counters
    pub playback: DispatchStats,
    /// Script-change loop counters
    pub script_changes: DispatchStats,
}

/// Entry point for starting the bridge
#[derive(Debug)]
pub struct Bridge;

impl Bridge {
    /// Validate config, subscribe both inbound channels, spawn both loops
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - `BridgeError::Config` if the configuration is invalid
    /// - `BridgeError::Transport` if a subscription fails
    pub async fn start(
        config: &BridgeConfig,
        bus: Arc<dyn MessageBus>,
    ) -> Result<BridgeHandle, BridgeError> {
        config.validate()?;
        let channels = &config.channels;

        let playback_sub = bus.subscribe(&channels.player_input).await?;
        let script_sub = bus.subscribe(&channels.ui_output).await?;

        let playback = DispatchLoop::new(
            playback_sub,
            Arc::clone(&bus),
            channels.player_output.clone(),
            PlaybackHandler::new(FixedStatusReporter::new(config.playback_status)),
        )
        .with_receive_timeout(config.receive_timeout())
        .with_backoff(Backoff::from(config.backoff));

        let sync = ScenarioSync::new(ScenarioStore::new(config.scenario_path.clone()));
        let script_changes = DispatchLoop::new(
            script_sub,
            Arc::clone(&bus),
            channels.ui_input.clone(),
            ScriptChangeHandler::new(sync),
        )
        .with_receive_timeout(config.receive_timeout())
        .with_backoff(Backoff::from(config.backoff));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let playback = tokio::spawn(playback.run(shutdown_rx.clone()));
        let script_changes = tokio::spawn(script_changes.run(shutdown_rx));

        tracing::info!(
            scenario = %config.scenario_path.display(),
            "Bridge started"
        );

        Ok(BridgeHandle {
            shutdown_tx,
            playback,
            script_changes,
        })
    }
}

/// Running bridge
#[derive(Debug)]
pub struct BridgeHandle {
    shutdown_tx: watch::Sender<bool>,
    playback: JoinHandle<DispatchStats>,
    script_changes: JoinHandle<DispatchStats>,
}

impl BridgeHandle {
    /// Signal both loops to stop and wait for them
    ///
    /// A message already being processed is finished first.
    pub async fn shutdown(self) -> BridgeStats {
        // receivers may already be gone if a loop panicked
        let _ = self.shutdown_tx.send(true);

        let playback = join_loop("playback", self.playback).await;
        let script_changes = join_loop("script-change", self.script_changes).await;

        tracing::info!(?playback, ?script_changes, "Bridge stopped");
        BridgeStats {
            playback,
            script_changes,
        }
    }

    /// True once both loops have exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.playback.is_finished() && self.script_changes.is_finished()
    }
}

async fn join_loop(name: &str, handle: JoinHandle<DispatchStats>) -> DispatchStats {
    match handle.await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(handler = name, "Dispatch loop task failed: {e}");
            DispatchStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use crate::error::ConfigError;
    use std::time::Duration;

    #[tokio::test]
    async fn invalid_config_prevents_start() {
        let config = BridgeConfig::new().with_receive_timeout(Duration::ZERO);
        let result = Bridge::start(&config, Arc::new(InMemoryBus::new())).await;
        assert!(matches!(result, Err(BridgeError::Config(ConfigError::Invalid(_)))));
    }

    #[tokio::test]
    async fn start_subscribes_inbound_channels_and_stops_cleanly() {
        let bus = InMemoryBus::new();
        let config = BridgeConfig::new().with_receive_timeout(Duration::from_millis(20));

        let handle = Bridge::start(&config, Arc::new(bus.clone())).await.unwrap();
        assert_eq!(bus.subscriber_count("player.input"), 1);
        assert_eq!(bus.subscriber_count("ui.output"), 1);

        let stats = tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .unwrap();
        assert_eq!(stats.playback.received, 0);
        assert_eq!(stats.script_changes.received, 0);
    }
}
