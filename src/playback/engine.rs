//! The seam between the session worker and a concrete audio backend.

use std::sync::mpsc::Sender;

use super::error::PlaybackError;
use super::types::{AudioSource, EngineStatus, HandleId, SessionCmd};

/// Creates engine handles. Lives on the session worker thread only.
pub trait AudioEngine {
    /// Load `source` into a new, paused handle.
    ///
    /// The handle reports its status through `reporter` for as long as it
    /// likes; reports arriving after the handle was released are ignored.
    fn load(
        &mut self,
        source: &AudioSource,
        reporter: StatusReporter,
    ) -> Result<Box<dyn EngineHandle>, PlaybackError>;
}

/// One loaded source. Owned exclusively by the session worker.
pub trait EngineHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Free the native resources behind this handle.
    fn unload(&mut self) -> Result<(), PlaybackError>;
}

/// Pushes `EngineStatus` reports for one specific handle into the session.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    handle: HandleId,
    tx: Sender<SessionCmd>,
}

impl StatusReporter {
    pub(super) fn new(handle: HandleId, tx: Sender<SessionCmd>) -> Self {
        Self { handle, tx }
    }

    pub fn handle_id(&self) -> HandleId {
        self.handle
    }

    /// Deliver `status`. Returns `false` once the session is gone, which is
    /// the reporter's cue to stop.
    pub fn report(&self, status: EngineStatus) -> bool {
        self.tx
            .send(SessionCmd::Status {
                handle: self.handle,
                status,
            })
            .is_ok()
    }
}
