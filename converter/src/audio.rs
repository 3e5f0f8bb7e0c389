use crate::error::{AssetKind, ConvertError, Result};
use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::path::Path;
use std::time::Duration;

/// Reads the playback length of an audio track.
pub trait AudioProbe {
    fn duration(&self, path: &Path) -> Result<Duration>;
}

/// Probes duration from the file's container/stream properties.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoftyProbe;

impl AudioProbe for LoftyProbe {
    fn duration(&self, path: &Path) -> Result<Duration> {
        if !path.is_file() {
            return Err(ConvertError::MissingAsset {
                kind: AssetKind::Audio,
                path: path.to_path_buf(),
            });
        }

        let tagged = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| {
                log::warn!("Failed to open audio {}: {}", path.display(), e);
                ConvertError::MissingAsset {
                    kind: AssetKind::Audio,
                    path: path.to_path_buf(),
                }
            })?;

        Ok(tagged.properties().duration())
    }
}

/// Duration truncated to whole milliseconds.
pub fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
