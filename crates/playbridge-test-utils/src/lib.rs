//! Testing utilities for the Playbridge workspace
//!
//! Shared fixtures for scenario files and bridges running on the
//! in-memory bus.

#![allow(missing_docs)]

use playbridge_core::{Bridge, BridgeConfig, BridgeHandle, InMemoryBus, MessageBus, Subscription};
use playbridge_scenario::{ScenarioDocument, ScenarioStore, ScriptEntry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Long enough for a loop iteration on a loaded CI box
pub const RECV_WAIT: Duration = Duration::from_secs(2);

/// Short receive timeout so loops cycle quickly in tests
pub const LOOP_TIMEOUT: Duration = Duration::from_millis(20);

pub fn sample_document() -> ScenarioDocument {
    ScenarioDocument::new(vec![
        ScriptEntry::new("s1").with_field("title", "old"),
        ScriptEntry::new("s2")
            .with_field("title", "Second act")
            .with_field("duration", 45),
    ])
}

/// Scenario file inside a temp dir that lives as long as the fixture
pub struct ScenarioFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl ScenarioFixture {
    pub async fn with_document(document: &ScenarioDocument) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.yaml");
        ScenarioStore::new(&path).save(document).await.unwrap();
        Self { dir, path }
    }

    pub async fn sample() -> Self {
        Self::with_document(&sample_document()).await
    }

    pub fn store(&self) -> ScenarioStore {
        ScenarioStore::new(&self.path)
    }

    pub async fn load(&self) -> ScenarioDocument {
        self.store().load().await.unwrap()
    }
}

/// A running bridge on an in-memory bus plus listeners on both outputs
pub struct TestBridge {
    pub bus: InMemoryBus,
    pub handle: BridgeHandle,
    pub player_output: Box<dyn Subscription>,
    pub ui_input: Box<dyn Subscription>,
    pub config: BridgeConfig,
}

impl TestBridge {
    pub async fn start(scenario: &ScenarioFixture) -> Self {
        let config = BridgeConfig::new()
            .with_scenario_path(scenario.path.clone())
            .with_receive_timeout(LOOP_TIMEOUT);
        Self::start_with(config).await
    }

    pub async fn start_with(config: BridgeConfig) -> Self {
        let bus = InMemoryBus::new();
        let player_output = bus.subscribe(&config.channels.player_output).await.unwrap();
        let ui_input = bus.subscribe(&config.channels.ui_input).await.unwrap();
        let handle = Bridge::start(&config, Arc::new(bus.clone())).await.unwrap();
        Self {
            bus,
            handle,
            player_output,
            ui_input,
            config,
        }
    }

    pub async fn send_player_input(&self, payload: &str) {
        self.bus
            .publish(&self.config.channels.player_input, payload.as_bytes().to_vec())
            .await
            .unwrap();
    }

    pub async fn send_ui_output(&self, payload: &str) {
        self.bus
            .publish(&self.config.channels.ui_output, payload.as_bytes().to_vec())
            .await
            .unwrap();
    }
}
