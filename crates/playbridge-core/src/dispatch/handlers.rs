//! The two concrete handlers wired by the bridge

use super::MessageHandler;
use crate::error::HandlerError;
use crate::messages::{Acknowledgement, PlaybackStatus, PlaybackTask};
use crate::playback::PlaybackReporter;
use async_trait::async_trait;
use playbridge_scenario::{ScenarioSync, ScriptChangeEvent};

/// Turns playback tasks into status records
#[derive(Debug, Clone)]
pub struct PlaybackHandler<R> {
    reporter: R,
}

impl<R: PlaybackReporter> PlaybackHandler<R> {
    /// Create handler around a reporter
    #[inline]
    #[must_use]
    pub fn new(reporter: R) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl<R: PlaybackReporter + 'static> MessageHandler for PlaybackHandler<R> {
    type Input = PlaybackTask;
    type Output = PlaybackStatus;

    fn name(&self) -> &'static str {
        "playback"
    }

    async fn handle(&self, task: PlaybackTask) -> Result<PlaybackStatus, HandlerError> {
        tracing::info!(
            video_id = %task.video_id,
            playback_speed = task.playback_speed,
            "Playing video"
        );
        Ok(self.reporter.report(&task))
    }
}

/// Persists script changes and acknowledges them
#[derive(Debug, Clone)]
pub struct ScriptChangeHandler {
    sync: ScenarioSync,
}

impl ScriptChangeHandler {
    /// Create handler over a scenario synchronizer
    #[inline]
    #[must_use]
    pub fn new(sync: ScenarioSync) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl MessageHandler for ScriptChangeHandler {
    type Input = ScriptChangeEvent;
    type Output = Acknowledgement;

    fn name(&self) -> &'static str {
        "script-change"
    }

    async fn handle(&self, change: ScriptChangeEvent) -> Result<Acknowledgement, HandlerError> {
        tracing::info!(
            script_id = %change.script_id,
            fields = change.fields.len(),
            "Script changed"
        );

        let report = self.sync.apply(&change).await?;

        if report.found {
            tracing::debug!(script_id = %report.script_id, changed = report.changed, "Scenario updated");
        } else {
            tracing::warn!(
                script_id = %report.script_id,
                path = %self.sync.store().path().display(),
                "No script with this id in scenario; document rewritten unchanged"
            );
        }

        Ok(Acknowledgement::script_change())
    }
}
