use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::{self, Track};
use crate::config;

/// Pick the day's themes: the catalog named on the command line, then the
/// configured one, then the built-in demo list.
pub fn load_tracks(arg: Option<PathBuf>, settings: &config::Settings) -> Vec<Track> {
    let asset_dir = settings.catalog.asset_dir.as_deref();

    if let Some(path) = arg.or_else(|| settings.catalog.path.clone()) {
        match catalog::load_catalog(&path, asset_dir) {
            Ok(tracks) => {
                info!(path = %path.display(), count = tracks.len(), "catalog loaded");
                return tracks;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "catalog unusable, using demo themes"),
        }
    }

    catalog::demo_tracks(asset_dir.unwrap_or(Path::new("assets")))
}
