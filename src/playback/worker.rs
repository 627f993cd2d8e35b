use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use super::engine::{AudioEngine, EngineHandle, StatusReporter};
use super::error::PlaybackError;
use super::hub::Hub;
use super::types::{AudioSource, EngineStatus, HandleId, PlaybackStatus, SessionCmd, SessionState};

/// The handle currently owned by the worker.
struct Current {
    id: HandleId,
    track_id: String,
    handle: Box<dyn EngineHandle>,
    playing: bool,
}

struct Worker<E> {
    engine: E,
    hub: Arc<Hub>,
    // Cloned into every `StatusReporter`.
    tx: Sender<SessionCmd>,
    next_handle: u64,
    current: Option<Current>,
}

/// Spawn the session worker. `make_engine` runs on the new thread, so the
/// engine itself never has to be `Send`; its outcome is reported back
/// before this function returns.
pub(super) fn spawn_worker<E, F>(
    make_engine: F,
    hub: Arc<Hub>,
    tx: Sender<SessionCmd>,
    rx: Receiver<SessionCmd>,
) -> Result<JoinHandle<()>, PlaybackError>
where
    E: AudioEngine + 'static,
    F: FnOnce() -> Result<E, PlaybackError> + Send + 'static,
{
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), PlaybackError>>();

    let join = thread::Builder::new()
        .name("soothe-playback".to_string())
        .spawn(move || {
            let engine = match make_engine() {
                Ok(engine) => {
                    let _ = ready_tx.send(Ok(()));
                    engine
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            Worker {
                engine,
                hub,
                tx,
                next_handle: 0,
                current: None,
            }
            .run(rx);
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(join),
        Ok(Err(err)) => {
            let _ = join.join();
            Err(err)
        }
        Err(_) => {
            let _ = join.join();
            Err(PlaybackError::SessionClosed)
        }
    }
}

impl<E: AudioEngine> Worker<E> {
    fn run(mut self, rx: Receiver<SessionCmd>) {
        debug!("playback worker started");
        // `self.tx` keeps the channel open, so only `Shutdown` ends the loop.
        while let Ok(cmd) = rx.recv() {
            match cmd {
                SessionCmd::Play {
                    track_id,
                    source,
                    reply,
                } => {
                    let _ = reply.send(self.play(track_id, &source));
                }
                SessionCmd::Toggle {
                    track_id,
                    source,
                    reply,
                } => {
                    let _ = reply.send(self.toggle(track_id, &source));
                }
                SessionCmd::Stop { reply } => {
                    self.stop();
                    let _ = reply.send(());
                }
                SessionCmd::Status { handle, status } => self.on_status(handle, status),
                SessionCmd::Shutdown => {
                    self.stop();
                    break;
                }
            }
        }
        debug!("playback worker stopped");
    }

    fn play(&mut self, track_id: String, source: &AudioSource) -> Result<(), PlaybackError> {
        // The old handle is gone before the new one exists.
        self.release_current();
        self.hub.publish(|s| *s = PlaybackStatus::loading(&track_id));

        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        let reporter = StatusReporter::new(id, self.tx.clone());

        match self.engine.load(source, reporter) {
            Ok(mut handle) => {
                handle.play();
                debug!(track_id = %track_id, %source, "playing");
                self.hub.publish(|s| {
                    s.state = SessionState::Playing;
                    s.is_playing = true;
                });
                self.current = Some(Current {
                    id,
                    track_id,
                    handle,
                    playing: true,
                });
                Ok(())
            }
            Err(err) => {
                warn!(track_id = %track_id, %source, error = %err, "failed to load track");
                self.hub.publish(|s| *s = PlaybackStatus::idle());
                Err(PlaybackError::Load {
                    track_id,
                    source: Box::new(err),
                })
            }
        }
    }

    fn toggle(&mut self, track_id: String, source: &AudioSource) -> Result<(), PlaybackError> {
        let Some(cur) = self.current.as_mut().filter(|c| c.track_id == track_id) else {
            return self.play(track_id, source);
        };

        if cur.playing {
            cur.handle.pause();
            cur.playing = false;
            debug!(track_id = %track_id, "paused");
            self.hub.publish(|s| {
                s.state = SessionState::Paused;
                s.is_playing = false;
            });
        } else {
            cur.handle.play();
            cur.playing = true;
            debug!(track_id = %track_id, "resumed");
            self.hub.publish(|s| {
                s.state = SessionState::Playing;
                s.is_playing = true;
            });
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.release_current() {
            debug!("stopped");
        }
        self.hub.publish(|s| *s = PlaybackStatus::idle());
    }

    fn on_status(&mut self, handle: HandleId, status: EngineStatus) {
        let Some(cur) = self.current.as_ref().filter(|c| c.id == handle) else {
            trace!(?handle, "ignoring status from a released handle");
            return;
        };

        if status.did_just_finish {
            debug!(track_id = %cur.track_id, "finished");
            self.release_current();
            self.hub.publish(|s| *s = PlaybackStatus::idle());
            return;
        }

        self.hub.publish(|s| {
            s.position_ms = millis(status.position);
            if let Some(duration) = status.duration {
                s.duration_ms = Some(millis(duration));
            }
        });
    }

    /// Stop and unload the current handle, if any. Unload is retried once;
    /// a second failure is logged and otherwise ignored since the handle is
    /// dropped either way. Returns whether there was a handle.
    fn release_current(&mut self) -> bool {
        let Some(mut cur) = self.current.take() else {
            return false;
        };

        if cur.playing {
            cur.handle.stop();
        }
        if let Err(first) = cur.handle.unload() {
            debug!(track_id = %cur.track_id, error = %first, "unload failed, retrying");
            if let Err(err) = cur.handle.unload() {
                warn!(track_id = %cur.track_id, error = %err, "giving up on unload");
            }
        }
        true
    }
}

fn millis(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
