//! Playback status reporting
//!
//! Actual playback tracking lives in the player; the bridge only needs
//! something that turns a task into a status record.

use crate::messages::{PlaybackStatus, PlaybackTask};

/// Produces a status record for a playback task
pub trait PlaybackReporter: Send + Sync {
    /// Status to publish after starting `task`
    fn report(&self, task: &PlaybackTask) -> PlaybackStatus;
}

/// Reporter that always answers with the same record
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStatusReporter {
    status: PlaybackStatus,
}

impl FixedStatusReporter {
    /// Create reporter returning `status`
    #[inline]
    #[must_use]
    pub fn new(status: PlaybackStatus) -> Self {
        Self { status }
    }
}

impl PlaybackReporter for FixedStatusReporter {
    fn report(&self, _task: &PlaybackTask) -> PlaybackStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(speed: f32) -> PlaybackTask {
        PlaybackTask {
            video_id: "clip".into(),
            playback_speed: speed,
        }
    }

    #[test]
    fn default_reporter_uses_placeholder_status() {
        let status = FixedStatusReporter::default().report(&task(1.0));
        assert_eq!(status.position, 60);
        assert!(!status.buffering);
    }

    #[test]
    fn status_survives_json_roundtrip() {
        let reporter = FixedStatusReporter::new(PlaybackStatus {
            position: 1234,
            buffering: true,
        });
        for speed in [0.25, 1.0, 2.0] {
            let status = reporter.report(&task(speed));
            let json = serde_json::to_vec(&status).unwrap();
            let back: PlaybackStatus = serde_json::from_slice(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
