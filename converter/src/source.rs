//! Records read from the osu! beatmap listing.

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Star-rating key for a play without mods.
pub const NO_MODS: u32 = 0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    Osu,
    Taiko,
    Catch,
    Mania,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimingPoint {
    pub offset: f64,
    /// Milliseconds per beat. Inherited points store a negative multiplier here.
    pub ms_per_beat: f64,
    #[serde(default)]
    pub inherited: bool,
}

/// One difficulty as stored in the listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DifficultyRecord {
    pub beatmap_id: i32,
    pub beatmap_set_id: i32,
    pub ruleset: Ruleset,
    /// Column count for mania difficulties.
    pub circle_size: f32,
    pub creator: String,
    pub difficulty: String,
    pub title: String,
    #[serde(default)]
    pub title_unicode: String,
    pub artist: String,
    #[serde(default)]
    pub artist_unicode: String,
    #[serde(default)]
    pub source: String,
    /// Mania star ratings keyed by mod bitmask.
    #[serde(default)]
    pub star_ratings: BTreeMap<u32, f64>,
    pub folder_name: String,
    pub file_name: String,
    pub audio_file_name: String,
    #[serde(default)]
    pub audio_preview_time: i32,
    #[serde(default)]
    pub timing_points: Vec<TimingPoint>,
}

impl DifficultyRecord {
    pub fn is_mania(&self) -> bool {
        self.ruleset == Ruleset::Mania
    }

    pub fn folder(&self, songs_dir: &Path) -> PathBuf {
        songs_dir.join(&self.folder_name)
    }

    pub fn beatmap_path(&self, songs_dir: &Path) -> PathBuf {
        self.folder(songs_dir).join(&self.file_name)
    }

    pub fn audio_path(&self, songs_dir: &Path) -> PathBuf {
        self.folder(songs_dir).join(&self.audio_file_name)
    }

    pub fn no_mod_rating(&self) -> Option<f64> {
        self.star_ratings.get(&NO_MODS).copied()
    }
}

/// Source of the beatmap listing.
pub trait ChartDatabase {
    fn difficulties(&self) -> Result<Vec<DifficultyRecord>>;
}

#[derive(Deserialize, Serialize, Debug, Default)]
struct Listing {
    beatmaps: Vec<DifficultyRecord>,
}

/// Listing exported to JSON as `{ "beatmaps": [...] }`.
#[derive(Clone, Debug)]
pub struct JsonDatabase {
    path: PathBuf,
}

impl JsonDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonDatabase { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartDatabase for JsonDatabase {
    fn difficulties(&self) -> Result<Vec<DifficultyRecord>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| ConvertError::io(&self.path, e))?;
        let listing: Listing =
            serde_json::from_str(&content).map_err(|e| ConvertError::decode(&self.path, e))?;
        log::debug!(
            "loaded {} difficulties from {}",
            listing.beatmaps.len(),
            self.path.display()
        );
        Ok(listing.beatmaps)
    }
}
