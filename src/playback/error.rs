//! Error types for the playback session

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The engine could not create a handle for the requested track.
    /// The session is back to idle when this is reported.
    #[error("failed to load track {track_id}: {source}")]
    Load {
        track_id: String,
        #[source]
        source: Box<PlaybackError>,
    },

    /// `play`/`toggle` was called without a track id
    #[error("track id must not be empty")]
    EmptyTrackId,

    /// The source could not be decoded
    #[error("cannot decode audio: {0}")]
    Decode(String),

    /// The audio output device could not be opened
    #[error("audio output unavailable: {0}")]
    Output(String),

    /// Releasing an engine handle failed
    #[error("failed to release audio handle: {0}")]
    Release(String),

    /// The session worker is gone
    #[error("playback session is closed")]
    SessionClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
