//! Application model types: `App`, `Screen` and the per-row playback state.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::catalog::{Track, filter_indices};
use crate::playback::{Pending, PlaybackError, PlaybackSession, PlaybackStatus, SessionState};
use crate::progress::Progress;

use super::feed::StatusFeed;

/// Which screen is in front.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    /// The day's themes.
    #[default]
    List,
    /// Now-playing view for the track at this index.
    Detail(usize),
}

/// How a track looks from a screen's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowState {
    Idle,
    Loading,
    Playing,
    Paused,
}

impl RowState {
    fn of(track: &Track, status: &PlaybackStatus) -> Self {
        if !status.is_active(&track.id) {
            return Self::Idle;
        }
        match status.state {
            SessionState::Idle => Self::Idle,
            SessionState::Loading => Self::Loading,
            SessionState::Playing => Self::Playing,
            SessionState::Paused => Self::Paused,
        }
    }
}

/// A transient, dismissible message.
#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

/// Everything the detail screen renders.
#[derive(Debug)]
pub struct DetailView<'a> {
    pub track: &'a Track,
    pub state: RowState,
    pub progress: Progress,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub screen: Screen,

    pub filter_mode: bool,
    pub filter_query: String,

    pub notice: Option<Notice>,

    list_feed: StatusFeed,
    // Present only while the detail screen is mounted.
    detail_feed: Option<StatusFeed>,
    in_flight: Vec<Pending>,
}

impl App {
    /// Create a new `App` showing `tracks`, subscribed to `session`.
    pub fn new(tracks: Vec<Track>, session: &PlaybackSession) -> Self {
        Self {
            tracks,
            selected: 0,
            screen: Screen::List,
            filter_mode: false,
            filter_query: String::new(),
            notice: None,
            list_feed: StatusFeed::new(session),
            detail_feed: None,
            in_flight: Vec::new(),
        }
    }

    /// Indices of the tracks visible under the current filter, in order.
    pub fn display_indices(&self) -> Vec<usize> {
        filter_indices(&self.tracks, &self.filter_query)
    }

    /// Return true if the day has any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        if self.display_indices().contains(&self.selected) {
            self.tracks.get(self.selected)
        } else {
            None
        }
    }

    /// Set the selected track index and ensure it is visible in the display.
    #[cfg(test)]
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move selection to the next visible track, wrapping around.
    pub fn next(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible track, wrapping around.
    pub fn prev(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(0) | None => display[display.len() - 1],
            Some(p) => display[p - 1],
        };
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        match display.first() {
            None => self.selected = 0,
            Some(&first) if !display.contains(&self.selected) => self.selected = first,
            Some(_) => {}
        }
    }

    /// Enter filter mode.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }
    /// Leave filter mode, keeping the query.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }
    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }
    /// Append a character to the filter query and refresh view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }
    /// Remove the last character from the filter query and refresh view.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Mount the detail screen for the selected track.
    pub fn open_detail(&mut self, session: &PlaybackSession) {
        if self.selected_track().is_none() {
            return;
        }
        self.screen = Screen::Detail(self.selected);
        self.detail_feed = Some(StatusFeed::new(session));
    }

    /// Unmount the detail screen. Playback carries on.
    pub fn close_detail(&mut self) {
        self.screen = Screen::List;
        if let Some(feed) = self.detail_feed.take() {
            feed.unsubscribe();
        }
    }

    #[cfg(test)]
    pub fn detail_mounted(&self) -> bool {
        self.detail_feed.is_some()
    }

    /// Play/pause the selected row.
    pub fn toggle_selected(&mut self, session: &PlaybackSession) {
        if self.selected_track().is_some() {
            self.toggle_track(session, self.selected);
        }
    }

    /// Play/pause the track shown on the detail screen.
    pub fn toggle_detail(&mut self, session: &PlaybackSession) {
        if let Screen::Detail(idx) = self.screen {
            self.toggle_track(session, idx);
        }
    }

    fn toggle_track(&mut self, session: &PlaybackSession, idx: usize) {
        let Some(track) = self.tracks.get(idx) else {
            return;
        };
        let pending = session.toggle(track.id.clone(), track.source.clone());
        self.in_flight.push(pending);
    }

    /// True while a play/toggle request has not been answered yet.
    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Collect request outcomes and status updates, and expire an old
    /// notice. Never blocks. Returns whether anything visible changed.
    pub fn sync(&mut self, now: Instant, notice_ttl: Duration) -> bool {
        let mut changed = false;

        let mut failures: Vec<PlaybackError> = Vec::new();
        self.in_flight.retain(|pending| match pending.poll() {
            None => true,
            Some(Ok(())) => false,
            Some(Err(err)) => {
                failures.push(err);
                false
            }
        });
        for err in failures {
            changed |= self.report_failure(err, now);
        }

        changed |= self.list_feed.refresh();
        if let Some(feed) = self.detail_feed.as_mut() {
            changed |= feed.refresh();
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= notice_ttl)
        {
            self.notice = None;
            changed = true;
        }

        changed
    }

    /// Only load failures reach the user; anything else is just logged.
    fn report_failure(&mut self, err: PlaybackError, now: Instant) -> bool {
        match err {
            PlaybackError::Load { ref track_id, .. } => {
                warn!(error = %err, "playback request failed");
                let title = self
                    .tracks
                    .iter()
                    .find(|t| &t.id == track_id)
                    .map_or(track_id.as_str(), |t| t.title.as_str());
                let message = format!("Couldn't play \"{title}\"");
                self.raise_notice(message, now);
                true
            }
            other => {
                warn!(error = %other, "playback request failed");
                false
            }
        }
    }

    pub fn raise_notice(&mut self, message: String, now: Instant) {
        self.notice = Some(Notice {
            message,
            raised_at: now,
        });
    }

    /// Dismiss the notice, if any. Returns whether one was shown.
    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    /// Playback state of a row, as seen by the list screen.
    pub fn row_state(&self, idx: usize) -> RowState {
        self.tracks
            .get(idx)
            .map_or(RowState::Idle, |t| RowState::of(t, self.list_feed.status()))
    }

    /// The track the list screen currently sees as active.
    pub fn now_playing(&self) -> Option<&Track> {
        let active = self.list_feed.status().active_track_id.as_deref()?;
        self.tracks.iter().find(|t| t.id == active)
    }

    /// What the detail screen shows. A track that is not the active one
    /// renders as stopped at `0:00`.
    pub fn detail(&self) -> Option<DetailView<'_>> {
        let Screen::Detail(idx) = self.screen else {
            return None;
        };
        let track = self.tracks.get(idx)?;
        let feed = self.detail_feed.as_ref()?;

        let idle = PlaybackStatus::idle();
        let status = if feed.status().is_active(&track.id) {
            feed.status()
        } else {
            &idle
        };

        Some(DetailView {
            track,
            state: RowState::of(track, status),
            progress: Progress::from_status(status, &track.duration_label),
        })
    }
}
