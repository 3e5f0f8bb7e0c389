//! Reader for the parts of a `.osu` difficulty file the converter needs:
//! background/video events and hit objects.

use crate::error::{ConvertError, Result};
use std::path::Path;

/// Width of the osu! playfield in osu!pixels.
const PLAYFIELD_WIDTH: f32 = 512.0;

const TYPE_CIRCLE: u32 = 1;
const TYPE_MANIA_HOLD: u32 = 1 << 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawPlayableObject {
    Note { x: i32, start_time: i32 },
    HoldNote { x: i32, start_time: i32, end_time: i32 },
    /// Sliders, spinners and anything else that has no mania meaning.
    Decoration { start_time: i32 },
}

impl RawPlayableObject {
    pub fn start_time(&self) -> i32 {
        match self {
            RawPlayableObject::Note { start_time, .. }
            | RawPlayableObject::HoldNote { start_time, .. }
            | RawPlayableObject::Decoration { start_time } => *start_time,
        }
    }

    pub fn end_time(&self) -> i32 {
        match self {
            RawPlayableObject::HoldNote { end_time, .. } => *end_time,
            other => other.start_time(),
        }
    }

    /// Zero-based column, or `None` for decorations.
    pub fn column(&self, columns: u8) -> Option<u8> {
        match self {
            RawPlayableObject::Note { x, .. } | RawPlayableObject::HoldNote { x, .. } => {
                Some(column_of(*x, columns))
            }
            RawPlayableObject::Decoration { .. } => None,
        }
    }
}

/// Map a horizontal position to a mania column.
pub fn column_of(x: i32, columns: u8) -> u8 {
    if columns == 0 {
        return 0;
    }
    let column = (x as f32 * columns as f32 / PLAYFIELD_WIDTH).floor();
    column.clamp(0.0, (columns - 1) as f32) as u8
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedDifficulty {
    /// Background image file name, empty when the map has none.
    pub background: String,
    /// Video file name, empty when the map has none.
    pub video: String,
    pub objects: Vec<RawPlayableObject>,
}

pub trait DifficultyDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedDifficulty>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OsuFileDecoder;

impl DifficultyDecoder for OsuFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedDifficulty> {
        let bytes = std::fs::read(path).map_err(|e| ConvertError::decode(path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        parse_osu(&content).map_err(|reason| ConvertError::decode(path, reason))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Events,
    HitObjects,
}

fn parse_osu(content: &str) -> std::result::Result<DecodedDifficulty, String> {
    let mut lines = content.lines().map(|l| l.trim_start_matches('\u{feff}'));
    let header = lines.next().unwrap_or_default();
    if !header.trim().starts_with("osu file format") {
        return Err("missing osu file format header".to_string());
    }

    let mut decoded = DecodedDifficulty::default();
    let mut section = Section::Other;

    for (idx, raw) in lines.enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = match &line[1..line.len() - 1] {
                "Events" => Section::Events,
                "HitObjects" => Section::HitObjects,
                _ => Section::Other,
            };
            continue;
        }
        match section {
            Section::Events => parse_event(line, &mut decoded),
            Section::HitObjects => {
                let object =
                    parse_hit_object(line).map_err(|e| format!("line {}: {}", idx + 2, e))?;
                decoded.objects.push(object);
            }
            Section::Other => {}
        }
    }

    Ok(decoded)
}

fn parse_event(line: &str, decoded: &mut DecodedDifficulty) {
    let parts: Vec<&str> = line.splitn(4, ',').collect();
    if parts.len() < 3 {
        return;
    }
    let file = parts[2].trim().trim_matches('"').to_string();
    match parts[0].trim() {
        "0" | "Background" if decoded.background.is_empty() => decoded.background = file,
        "1" | "Video" if decoded.video.is_empty() => decoded.video = file,
        _ => {}
    }
}

fn parse_hit_object(line: &str) -> std::result::Result<RawPlayableObject, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return Err(format!("expected at least 4 fields, found {}", parts.len()));
    }
    let x = parse_number(parts[0], "x")?;
    let start_time = parse_number(parts[2], "time")?;
    let kind: u32 = parts[3]
        .trim()
        .parse()
        .map_err(|_| format!("invalid type `{}`", parts[3]))?;

    if kind & TYPE_MANIA_HOLD != 0 {
        let end_field = parts
            .get(5)
            .and_then(|params| params.split(':').next())
            .ok_or_else(|| "hold note without end time".to_string())?;
        let end_time = parse_number(end_field, "end time")?;
        Ok(RawPlayableObject::HoldNote {
            x,
            start_time,
            end_time,
        })
    } else if kind & TYPE_CIRCLE != 0 {
        Ok(RawPlayableObject::Note { x, start_time })
    } else {
        Ok(RawPlayableObject::Decoration { start_time })
    }
}

// Coordinates and times may be written as decimals by some editors.
fn parse_number(field: &str, name: &str) -> std::result::Result<i32, String> {
    let field = field.trim();
    field
        .parse::<i32>()
        .or_else(|_| field.parse::<f64>().map(|v| v as i32))
        .map_err(|_| format!("invalid {name} `{field}`"))
}
