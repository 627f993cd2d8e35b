//! `rodio`-backed engine: one `Sink` per loaded source.
//!
//! Each handle runs a small ticker thread that reports position, duration
//! and end-of-track through its `StatusReporter` until the handle is
//! released.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::trace;

use super::engine::{AudioEngine, EngineHandle, StatusReporter};
use super::error::PlaybackError;
use super::types::{AudioSource, EngineStatus};

pub struct RodioEngine {
    stream: OutputStream,
    status_interval: Duration,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open(status_interval: Duration) -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the terminal UI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            status_interval,
        })
    }
}

impl AudioEngine for RodioEngine {
    fn load(
        &mut self,
        source: &AudioSource,
        reporter: StatusReporter,
    ) -> Result<Box<dyn EngineHandle>, PlaybackError> {
        let file = File::open(source.path())?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| PlaybackError::Decode(format!("{source}: {e}")))?;

        // Decoders often cannot tell the length of compressed streams; the
        // container metadata usually can.
        let duration = decoder
            .total_duration()
            .or_else(|| probe_duration(source.path()));

        let sink = Arc::new(Sink::connect_new(self.stream.mixer()));
        sink.append(decoder);
        sink.pause();

        let released = Arc::new(AtomicBool::new(false));
        spawn_ticker(
            sink.clone(),
            released.clone(),
            reporter,
            duration,
            self.status_interval,
        );

        Ok(Box::new(RodioHandle { sink, released }))
    }
}

struct RodioHandle {
    sink: Arc<Sink>,
    released: Arc<AtomicBool>,
}

impl EngineHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn unload(&mut self) -> Result<(), PlaybackError> {
        self.released.store(true, Ordering::Release);
        self.sink.clear();
        Ok(())
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.released.store(true, Ordering::Release);
        self.sink.stop();
    }
}

fn spawn_ticker(
    sink: Arc<Sink>,
    released: Arc<AtomicBool>,
    reporter: StatusReporter,
    duration: Option<Duration>,
    interval: Duration,
) {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if released.load(Ordering::Acquire) {
                break;
            }

            let finished = sink.empty();
            let status = EngineStatus {
                position: sink.get_pos(),
                duration,
                did_just_finish: finished,
            };
            if !reporter.report(status) || finished {
                break;
            }
        }
        trace!(handle = ?reporter.handle_id(), "status ticker exited");
    });
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
