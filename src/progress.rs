//! Display values derived from a `PlaybackStatus`.
//!
//! Everything here is a pure function of its inputs. While the engine has
//! not reported a duration yet, the track's "MM:SS" label stands in for it;
//! the first snapshot that carries the real duration replaces the stand-in
//! outright (progress snaps, nothing is interpolated).

use crate::playback::PlaybackStatus;

/// `position / duration`, clamped to `[0, 1]`. Zero while the duration is
/// unknown or zero.
pub fn ratio(status: &PlaybackStatus) -> f64 {
    match status.duration_ms {
        Some(duration) if duration > 0 => ratio_of(status.position_ms, duration),
        _ => 0.0,
    }
}

/// Progress against `effective_duration_ms`, so the bar moves even before
/// the engine knows the real duration.
pub fn display_ratio(status: &PlaybackStatus, fallback_label: &str) -> f64 {
    if status.duration_ms.is_some() {
        return ratio(status);
    }
    match parse_duration_label(fallback_label) {
        0 => 0.0,
        duration => ratio_of(status.position_ms, duration),
    }
}

fn ratio_of(position_ms: u64, duration_ms: u64) -> f64 {
    (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// The engine's duration when known, else the parsed `fallback_label`.
pub fn effective_duration_ms(status: &PlaybackStatus, fallback_label: &str) -> u64 {
    status
        .duration_ms
        .unwrap_or_else(|| parse_duration_label(fallback_label))
}

/// Parse an "MM:SS" label into milliseconds. Anything malformed yields 0.
pub fn parse_duration_label(label: &str) -> u64 {
    let Some((mins, secs)) = label.trim().split_once(':') else {
        return 0;
    };

    match (mins.trim().parse::<u64>(), secs.trim().parse::<u64>()) {
        (Ok(mins), Ok(secs)) => mins
            .saturating_mul(60)
            .saturating_add(secs)
            .saturating_mul(1000),
        _ => 0,
    }
}

/// Format milliseconds as `M:SS` (minutes unpadded, partial seconds
/// dropped). Negative and non-finite inputs render as `0:00`.
pub fn format_time(ms: f64) -> String {
    if !ms.is_finite() || ms <= 0.0 {
        return "0:00".to_string();
    }

    let total_secs = (ms / 1000.0).floor() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Everything the detail screen renders for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub ratio: f64,
    pub elapsed: String,
    pub total: String,
}

impl Progress {
    /// Build the progress for a track from `status`. Pass the idle status
    /// when the track is not the active one.
    pub fn from_status(status: &PlaybackStatus, duration_label: &str) -> Self {
        Self {
            ratio: display_ratio(status, duration_label),
            elapsed: format_time(status.position_ms as f64),
            total: format_time(effective_duration_ms(status, duration_label) as f64),
        }
    }
}
