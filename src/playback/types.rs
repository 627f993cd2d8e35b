//! Playback-related small types.
//!
//! This module defines the status snapshot published to screens, the
//! session state machine states, the engine status report and the command
//! enum consumed by the worker thread.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use super::error::PlaybackError;

/// A playable audio source, already resolved to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource(PathBuf);

impl AudioSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Identity of one loaded engine handle.
///
/// Every successful load gets a fresh id; status reports carry it so the
/// worker can tell reports of the current handle from leftovers of a
/// released one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(pub(super) u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No engine handle.
    #[default]
    Idle,
    /// A handle is being created for `active_track_id`.
    Loading,
    Playing,
    Paused,
}

/// Snapshot of the session, published to every subscriber.
///
/// `active_track_id == None` always comes with `is_playing == false` and
/// `position_ms == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub active_track_id: Option<String>,
    pub state: SessionState,
    pub is_playing: bool,
    pub position_ms: u64,
    /// `None` until the engine reports a duration.
    pub duration_ms: Option<u64>,
}

impl PlaybackStatus {
    /// The empty (idle) status.
    pub fn idle() -> Self {
        Self::default()
    }

    pub(super) fn loading(track_id: &str) -> Self {
        Self {
            active_track_id: Some(track_id.to_string()),
            state: SessionState::Loading,
            ..Self::default()
        }
    }

    /// True when `track_id` owns the engine (loading, playing or paused).
    pub fn is_active(&self, track_id: &str) -> bool {
        self.active_track_id.as_deref() == Some(track_id)
    }
}

/// Status pushed by an engine handle at its own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStatus {
    pub position: Duration,
    pub duration: Option<Duration>,
    /// The track reached its end.
    pub did_just_finish: bool,
}

pub(super) type Reply = Sender<Result<(), PlaybackError>>;

#[derive(Debug)]
pub(super) enum SessionCmd {
    /// Release whatever is loaded and start `source`.
    Play {
        track_id: String,
        source: AudioSource,
        reply: Reply,
    },
    /// Pause/resume when `track_id` is active, otherwise behave like `Play`.
    Toggle {
        track_id: String,
        source: AudioSource,
        reply: Reply,
    },
    /// Release the handle and reset the status.
    Stop { reply: Sender<()> },
    /// A status report from the handle identified by `handle`.
    Status {
        handle: HandleId,
        status: EngineStatus,
    },
    /// Release everything and end the worker thread.
    Shutdown,
}
