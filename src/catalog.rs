//! The day's list of themes.
//!
//! Themes come from a TOML catalog file (or a built-in demo list when none
//! exists). Source references are resolved to playable `AudioSource`s once,
//! while loading.

mod filter;
mod load;
mod model;

pub use filter::filter_indices;
pub use load::{CatalogError, demo_tracks, load_catalog};
pub use model::Track;
