//! Application module: the screen model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the day's themes, the
//! list selection and filter, the open screen, and one playback feed per
//! mounted screen.

mod feed;
mod model;

pub use feed::StatusFeed;
pub use model::*;
