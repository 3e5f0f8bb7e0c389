use crate::audio::{duration_ms, AudioProbe};
use crate::bundle::OutputChartSet;
use crate::error::Result;
use crate::osu_file::{DecodedDifficulty, DifficultyDecoder};
use crate::source::{DifficultyRecord, TimingPoint};
use std::path::Path;
use std::time::Duration;

/// Representative BPM: the fastest uninherited timing point, rounded.
///
/// Returns `None` when there is no timing point with a positive beat length.
pub fn representative_bpm(timing_points: &[TimingPoint]) -> Option<i32> {
    let fastest = timing_points
        .iter()
        .filter(|t| !t.inherited && t.ms_per_beat > 0.0)
        .map(|t| t.ms_per_beat)
        .fold(None, |acc: Option<f64>, ms| Some(acc.map_or(ms, |a| a.min(ms))))?;
    Some((1.0 / fastest * 1000.0 * 60.0).round() as i32)
}

/// Build the chart-set descriptor from the first mania difficulty of a set.
pub fn resolve_metadata(
    set_id: i32,
    representative: &DifficultyRecord,
    decoded: &DecodedDifficulty,
    track_duration: Duration,
) -> OutputChartSet {
    let bpm = representative_bpm(&representative.timing_points).unwrap_or_else(|| {
        log::warn!(
            "Beatmap {} has no usable timing point, BPM set to 0",
            representative.beatmap_id
        );
        0
    });

    OutputChartSet {
        id: set_id,
        title: representative.title.clone(),
        title_unicode: representative.title_unicode.clone(),
        artist: representative.artist.clone(),
        artist_unicode: representative.artist_unicode.clone(),
        source: representative.source.clone(),
        source_unicode: representative.source.clone(),
        total_length: duration_ms(track_duration),
        preview_time: representative.audio_preview_time,
        bpm,
        creator: representative.creator.clone(),
        has_video: !decoded.video.is_empty(),
        use_local_source: false,
        cover_path: decoded.background.clone(),
        track_path: representative.audio_file_name.clone(),
        background_path: decoded.background.clone(),
        video_path: decoded.video.clone(),
    }
}

/// Decode the representative difficulty, probe its track and resolve the descriptor.
///
/// Fails with `Decode` when the `.osu` file is unreadable and with
/// `MissingAsset` when the audio track cannot be opened.
pub fn resolve_chart_set(
    songs_dir: &Path,
    set_id: i32,
    representative: &DifficultyRecord,
    decoder: &impl DifficultyDecoder,
    probe: &impl AudioProbe,
) -> Result<OutputChartSet> {
    let decoded = decoder.decode(&representative.beatmap_path(songs_dir))?;
    let duration = probe.duration(&representative.audio_path(songs_dir))?;
    Ok(resolve_metadata(set_id, representative, &decoded, duration))
}
