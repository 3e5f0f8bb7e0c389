use std::path::PathBuf;
use thiserror::Error;

/// Failures scoped to the conversion of a single chart set.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("missing {kind} asset: {}", path.display())]
    MissingAsset { kind: AssetKind, path: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} asset `{name}` is not a path inside the beatmap folder")]
    UnsafeAssetName { kind: AssetKind, name: String },

    #[error("lane {index} is outside the {columns}-lane playfield")]
    LaneOutOfRange { index: u8, columns: u8 },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConvertError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Audio,
    Background,
    Video,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetKind::Audio => "audio",
            AssetKind::Background => "background",
            AssetKind::Video => "video",
        };
        f.write_str(name)
    }
}

/// Invalid chart-set selection supplied by the operator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid selection `{0}`, expected `all` or a beatmapset id")]
    Invalid(String),

    #[error("beatmapset {0} is not in the mania catalog")]
    Unknown(i32),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
