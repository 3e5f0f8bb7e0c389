use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};

pub const CHART_SET_EXTENSION: &str = "rks";
pub const DIFFICULTY_EXTENSION: &str = "rkb";

/// Chart-set descriptor written as `.rks`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OutputChartSet {
    #[serde(rename = "ID")]
    pub id: i32,
    pub title: String,
    pub title_unicode: String,
    pub artist: String,
    pub artist_unicode: String,
    pub source: String,
    pub source_unicode: String,
    /// Milliseconds.
    pub total_length: i64,
    pub preview_time: i32,
    #[serde(rename = "BPM")]
    pub bpm: i32,
    pub creator: String,
    pub has_video: bool,
    pub use_local_source: bool,
    pub cover_path: String,
    pub track_path: String,
    pub background_path: String,
    pub video_path: String,
}

/// One playable difficulty written as `.rkb`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDifficulty {
    #[serde(rename = "ID")]
    pub id: i32,
    #[serde(rename = "BeatmapSetID")]
    pub chart_set_id: i32,
    pub creator: String,
    pub difficulty_name: String,
    pub difficulty_rating: f64,
    pub background_path: String,
    pub notes: Vec<OutputNote>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct OutputNote {
    pub lane: NoteLane,
    pub start_time: i32,
    pub end_time: i32,
    #[serde(rename = "Type")]
    pub kind: NoteType,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoteLane {
    Lane1,
    Lane2,
    Lane3,
    Lane4,
}

impl NoteLane {
    pub const COUNT: u8 = 4;

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for NoteLane {
    type Error = ConvertError;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(NoteLane::Lane1),
            1 => Ok(NoteLane::Lane2),
            2 => Ok(NoteLane::Lane3),
            3 => Ok(NoteLane::Lane4),
            _ => Err(ConvertError::LaneOutOfRange {
                index,
                columns: Self::COUNT,
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    BasicNote,
    /// Not produced yet; Renako has no sustained notes.
    HoldNote,
}

/// Folder holding one converted chart set.
pub fn folder_name(set: &OutputChartSet) -> String {
    sanitize(&format!("{} {} - {}", set.id, set.artist, set.title))
}

pub fn chart_set_file_name(set: &OutputChartSet) -> String {
    format!(
        "{}.{}",
        sanitize(&format!("{} - {} ({})", set.artist, set.title, set.creator)),
        CHART_SET_EXTENSION
    )
}

pub fn difficulty_file_name(set: &OutputChartSet, difficulty: &OutputDifficulty) -> String {
    format!(
        "{}.{}",
        sanitize(&format!(
            "{} {} - {} [{}]",
            difficulty.id, set.artist, set.title, difficulty.difficulty_name
        )),
        DIFFICULTY_EXTENSION
    )
}

/// Replace characters that are not allowed in file names on common platforms.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim_end_matches(['.', ' ']).to_string()
}

/// Serialize as indented UTF-8 JSON, keeping non-ASCII text unescaped.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
