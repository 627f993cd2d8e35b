use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use super::engine::AudioEngine;
use super::error::PlaybackError;
use super::hub::{Hub, Subscription};
use super::sink::RodioEngine;
use super::types::{AudioSource, PlaybackStatus, SessionCmd};
use super::worker::spawn_worker;

/// The single owner of the audio engine.
///
/// Screens share one session (by reference or `Arc`) and never touch the
/// engine directly. Dropping the session stops playback and joins the
/// worker thread.
#[derive(Debug)]
pub struct PlaybackSession {
    tx: Sender<SessionCmd>,
    hub: Arc<Hub>,
    join: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Start a session whose engine is built by `make_engine` on the worker
    /// thread.
    pub fn spawn<E, F>(make_engine: F) -> Result<Self, PlaybackError>
    where
        E: AudioEngine + 'static,
        F: FnOnce() -> Result<E, PlaybackError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<SessionCmd>();
        let hub = Arc::new(Hub::default());
        let join = spawn_worker(make_engine, hub.clone(), tx.clone(), rx)?;

        Ok(Self {
            tx,
            hub,
            join: Some(join),
        })
    }

    /// Start a session on the default audio output device.
    pub fn with_default_output(status_interval: Duration) -> Result<Self, PlaybackError> {
        Self::spawn(move || RodioEngine::open(status_interval))
    }

    /// Release whatever is loaded and start `source` as `track_id`.
    pub fn play(&self, track_id: impl Into<String>, source: AudioSource) -> Pending {
        self.request(track_id.into(), |track_id, reply| SessionCmd::Play {
            track_id,
            source,
            reply,
        })
    }

    /// Pause or resume `track_id` when it is the active track, otherwise
    /// switch to it like `play`.
    pub fn toggle(&self, track_id: impl Into<String>, source: AudioSource) -> Pending {
        self.request(track_id.into(), |track_id, reply| SessionCmd::Toggle {
            track_id,
            source,
            reply,
        })
    }

    fn request(
        &self,
        track_id: String,
        cmd: impl FnOnce(String, Sender<Result<(), PlaybackError>>) -> SessionCmd,
    ) -> Pending {
        if track_id.is_empty() {
            return Pending::ready(Err(PlaybackError::EmptyTrackId));
        }

        let (reply, rx) = mpsc::channel();
        if self.tx.send(cmd(track_id, reply)).is_err() {
            return Pending::ready(Err(PlaybackError::SessionClosed));
        }
        Pending { rx }
    }

    /// Release the engine handle and reset the status. Idempotent; blocks
    /// until the worker has applied it (or returns at once if the worker is
    /// gone).
    pub fn stop(&self) {
        let (reply, rx) = mpsc::channel();
        if self.tx.send(SessionCmd::Stop { reply }).is_ok() {
            let _ = rx.recv();
        }
    }

    /// Receive every status change, starting with the current status.
    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    /// The current status, for an initial render.
    pub fn status(&self) -> PlaybackStatus {
        self.hub.snapshot()
    }

    /// Stop playback and wait for the worker thread to exit.
    pub fn shutdown(self) {
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.hub.listener_count()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        let _ = self.tx.send(SessionCmd::Shutdown);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Outcome of a `play`/`toggle` request that may still be in the queue.
#[derive(Debug)]
#[must_use = "a load failure is only reported through `Pending`"]
pub struct Pending {
    rx: Receiver<Result<(), PlaybackError>>,
}

impl Pending {
    fn ready(result: Result<(), PlaybackError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Block until the request has been applied.
    pub fn wait(self) -> Result<(), PlaybackError> {
        self.rx.recv().unwrap_or(Err(PlaybackError::SessionClosed))
    }

    /// Check for the outcome without blocking. Yields `Some` exactly once
    /// per request; drop the `Pending` afterwards.
    pub fn poll(&self) -> Option<Result<(), PlaybackError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PlaybackError::SessionClosed)),
        }
    }
}
