//! Wire messages exchanged with the player and the UI
//!
//! All payloads are JSON. Script change events live in
//! `playbridge_scenario` since they are persisted.

use serde::{Deserialize, Serialize};

/// Text sent back on every successfully applied script change
pub const SCRIPT_CHANGE_ACK: &str = "Script change acknowledged";

/// Request to play a video (inbound on the player input channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackTask {
    /// Video to play
    pub video_id: String,
    /// Playback rate, 1.0 is normal speed
    pub playback_speed: f32,
}

/// Player state (outbound on the player output channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Current position
    pub position: i64,
    /// Whether the player is buffering
    pub buffering: bool,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            position: 60,
            buffering: false,
        }
    }
}

/// Reply to the UI after a script change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Human-readable message
    pub message: String,
}

impl Acknowledgement {
    /// Standard script-change acknowledgement
    #[must_use]
    pub fn script_change() -> Self {
        Self {
            message: SCRIPT_CHANGE_ACK.to_string(),
        }
    }
}
