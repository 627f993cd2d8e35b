use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::playback::AudioSource;

use super::model::{CatalogFile, SourceRef, ThemeEntry, Track};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("theme {title:?} has an empty id")]
    EmptyId { title: String },
}

/// Load the catalog at `path`.
///
/// Plain source paths are relative to the catalog's directory, `asset`
/// sources to `asset_dir` (default: `assets/` next to the catalog).
pub fn load_catalog(path: &Path, asset_dir: Option<&Path>) -> Result<Vec<Track>, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let asset_dir = asset_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_dir.join("assets"));

    parse_catalog(&text, base_dir, &asset_dir)
}

pub(super) fn parse_catalog(
    text: &str,
    base_dir: &Path,
    asset_dir: &Path,
) -> Result<Vec<Track>, CatalogError> {
    let file: CatalogFile = toml::from_str(text)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut tracks = Vec::with_capacity(file.themes.len());
    for entry in file.themes {
        let ThemeEntry {
            id,
            title,
            mood,
            duration,
            source,
        } = entry;

        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(CatalogError::EmptyId { title });
        }
        // First occurrence wins.
        if !seen.insert(id.clone()) {
            warn!(id = %id, "duplicate theme id, keeping the first one");
            continue;
        }

        tracks.push(Track {
            id,
            title,
            mood,
            duration_label: duration,
            source: resolve_source(&source, base_dir, asset_dir),
        });
    }
    Ok(tracks)
}

pub(super) fn resolve_source(source: &SourceRef, base_dir: &Path, asset_dir: &Path) -> AudioSource {
    match source {
        SourceRef::Path(p) => {
            let p = Path::new(p);
            if p.is_absolute() {
                AudioSource::from_path(p)
            } else {
                AudioSource::from_path(base_dir.join(p))
            }
        }
        SourceRef::Asset { asset } => AudioSource::from_path(asset_dir.join(asset)),
    }
}

/// The built-in list of themes, played from `asset_dir`.
pub fn demo_tracks(asset_dir: &Path) -> Vec<Track> {
    [
        ("1", "Energy morning", "Rock your skills", "10:00", "energy.mp3"),
        ("2", "Back pain", "Cheerful mood", "15:00", "pain.mp3"),
        ("3", "Focus mode", "Deep concentration", "25:00", "focus.mp3"),
        ("4", "Sleep well", "Relaxing sounds", "10:00", "sleep.mp3"),
        ("5", "Meditation", "Inner peace", "15:00", "meditation.mp3"),
    ]
    .into_iter()
    .map(|(id, title, mood, duration, file)| Track {
        id: id.to_string(),
        title: title.to_string(),
        mood: mood.to_string(),
        duration_label: duration.to_string(),
        source: AudioSource::from_path(asset_dir.join(file)),
    })
    .collect()
}
