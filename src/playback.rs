//! Playback session: one audio track at a time, shared by every screen.
//!
//! A `PlaybackSession` is a cheap handle in front of a dedicated worker
//! thread. The worker exclusively owns the audio engine and the single live
//! engine handle; every request (and every engine status report) goes
//! through one command channel, so requests are applied strictly in order.
//! Screens observe the session through `Subscription`s.

mod engine;
mod error;
mod hub;
mod session;
mod sink;
mod types;
mod worker;

pub use engine::{AudioEngine, EngineHandle, StatusReporter};
pub use error::PlaybackError;
pub use hub::Subscription;
pub use session::{PlaybackSession, Pending};
pub use sink::RodioEngine;
pub use types::{AudioSource, EngineStatus, HandleId, PlaybackStatus, SessionState};

#[cfg(test)]
mod tests;
