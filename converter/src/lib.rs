pub mod assembler;
pub mod audio;
pub mod bundle;
pub mod catalog;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod osu_file;
pub mod source;
pub mod writer;

use assembler::assemble;
use audio::{AudioProbe, LoftyProbe};
use catalog::Catalog;
use error::{ConvertError, SelectionError};
use osu_file::{DifficultyDecoder, OsuFileDecoder};
use std::path::PathBuf;
use std::str::FromStr;
use writer::{BundleAssets, BundleWriter};

/// Where to read osu! content from and where to write Renako bundles.
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub songs_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            songs_dir: default_songs_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// `%LOCALAPPDATA%/osu!/Songs` on Windows.
pub fn default_songs_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("osu!")
        .join("Songs")
}

/// `%APPDATA%/Renako/beatmaps` on Windows.
pub fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Renako")
        .join("beatmaps")
}

/// Which chart sets to convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Set(i32),
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "all" {
            return Ok(Selection::All);
        }
        s.parse()
            .map(Selection::Set)
            .map_err(|_| SelectionError::Invalid(s.to_string()))
    }
}

/// Result of converting one chart set.
#[derive(Clone, Debug, PartialEq)]
pub struct SetOutcome {
    pub set_id: i32,
    pub destination: PathBuf,
    pub written: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct ConversionReport {
    pub converted: Vec<SetOutcome>,
    /// Sets without any mania difficulty; nothing was written for them.
    pub skipped: Vec<i32>,
    pub failed: Vec<(i32, ConvertError)>,
}

impl ConversionReport {
    pub fn difficulties_written(&self) -> usize {
        self.converted.iter().map(|o| o.written).sum()
    }

    pub fn difficulties_skipped(&self) -> usize {
        self.converted.iter().map(|o| o.skipped).sum()
    }
}

/// Drives catalog lookup, metadata resolution, mapping and bundle output.
pub struct Converter<D = OsuFileDecoder, P = LoftyProbe> {
    config: ConverterConfig,
    decoder: D,
    probe: P,
    writer: BundleWriter,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_parts(config, OsuFileDecoder, LoftyProbe)
    }
}

impl<D: DifficultyDecoder, P: AudioProbe> Converter<D, P> {
    pub fn with_parts(config: ConverterConfig, decoder: D, probe: P) -> Self {
        let writer = BundleWriter::new(&config.output_dir);
        Converter {
            config,
            decoder,
            probe,
            writer,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert the selected chart sets. One set failing does not stop the batch.
    pub fn run(&self, catalog: &Catalog, selection: Selection) -> Result<ConversionReport, SelectionError> {
        let set_ids: Vec<i32> = match selection {
            Selection::All => catalog.list_mania_sets().iter().map(|e| e.set_id).collect(),
            Selection::Set(id) if catalog.contains(id) => vec![id],
            Selection::Set(id) => return Err(SelectionError::Unknown(id)),
        };

        let mut report = ConversionReport::default();
        for set_id in set_ids {
            log::info!("Converting beatmapset {}...", set_id);
            match self.convert_set(catalog, set_id) {
                Ok(Some(outcome)) => report.converted.push(outcome),
                Ok(None) => report.skipped.push(set_id),
                Err(e) => {
                    log::error!("Failed to convert beatmapset {}: {}", set_id, e);
                    report.failed.push((set_id, e));
                }
            }
        }
        Ok(report)
    }

    /// Convert one chart set into a bundle under the output folder.
    ///
    /// Returns `None` without touching the output when the set has no mania difficulty.
    pub fn convert_set(&self, catalog: &Catalog, set_id: i32) -> error::Result<Option<SetOutcome>> {
        let found = catalog
            .chart_set(set_id)
            .and_then(|set| set.representative().map(|first| (set, first)));
        let Some((chart_set, representative)) = found else {
            log::warn!("Beatmapset {} doesn't have any mania beatmap.", set_id);
            return Ok(None);
        };
        let songs_dir = &self.config.songs_dir;

        let descriptor = metadata::resolve_chart_set(
            songs_dir,
            set_id,
            representative,
            &self.decoder,
            &self.probe,
        )?;

        let bundle = assemble(descriptor, &chart_set.difficulties, |record| {
            let decoded = self.decoder.decode(&record.beatmap_path(songs_dir))?;
            mapper::map_objects(record, &decoded.objects)
        })?;

        let assets = BundleAssets {
            source_folder: representative.folder(songs_dir),
            audio: representative.audio_file_name.clone(),
            background: bundle.chart_set.background_path.clone(),
            video: bundle.chart_set.video_path.clone(),
        };
        let destination = self.writer.write(&bundle, &assets)?;

        Ok(Some(SetOutcome {
            set_id,
            destination,
            written: bundle.difficulties.len(),
            skipped: bundle.skipped.len(),
        }))
    }
}
