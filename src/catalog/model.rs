use serde::Deserialize;

use crate::playback::AudioSource;

/// One audio theme as shown on the list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Unique within one day's list.
    pub id: String,
    pub title: String,
    pub mood: String,
    /// Human-readable "MM:SS" length, used until the engine knows better.
    pub duration_label: String,
    pub source: AudioSource,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
pub(super) struct CatalogFile {
    #[serde(default)]
    pub themes: Vec<ThemeEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ThemeEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub duration: String,
    pub source: SourceRef,
}

/// A source is written either as a plain path or as `{ asset = "name" }`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub(super) enum SourceRef {
    Path(String),
    Asset { asset: String },
}
