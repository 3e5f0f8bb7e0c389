use crate::assembler::AssembledBundle;
use crate::bundle::{chart_set_file_name, difficulty_file_name, folder_name, to_json};
use crate::error::{AssetKind, ConvertError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Media files referenced by a bundle, relative to `source_folder`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleAssets {
    pub source_folder: PathBuf,
    pub audio: String,
    pub background: String,
    pub video: String,
}

/// Writes bundles under an output root.
///
/// A bundle is staged in a scratch folder next to its destination and only
/// moved into place once every file is written. A failed write leaves any
/// previous bundle untouched.
#[derive(Clone, Debug)]
pub struct BundleWriter {
    output_root: PathBuf,
}

impl BundleWriter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        BundleWriter {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn destination(&self, bundle: &AssembledBundle) -> PathBuf {
        self.output_root.join(folder_name(&bundle.chart_set))
    }

    pub fn write(&self, bundle: &AssembledBundle, assets: &BundleAssets) -> Result<PathBuf> {
        check_asset_name(&assets.audio, AssetKind::Audio)?;
        check_asset_name(&assets.background, AssetKind::Background)?;
        check_asset_name(&assets.video, AssetKind::Video)?;

        fs::create_dir_all(&self.output_root).map_err(|e| ConvertError::io(&self.output_root, e))?;

        // Removed on drop unless it has been renamed into place.
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.output_root)
            .map_err(|e| ConvertError::io(&self.output_root, e))?;

        self.populate(staging.path(), bundle, assets)?;

        let destination = self.destination(bundle);
        replace_dir(staging.path(), &destination)?;
        log::info!(
            "Wrote {} difficulties to {}",
            bundle.difficulties.len(),
            destination.display()
        );
        Ok(destination)
    }

    fn populate(&self, dir: &Path, bundle: &AssembledBundle, assets: &BundleAssets) -> Result<()> {
        let set = &bundle.chart_set;
        write_file(&dir.join(chart_set_file_name(set)), &to_json(set)?)?;

        for difficulty in &bundle.difficulties {
            let path = dir.join(difficulty_file_name(set, difficulty));
            write_file(&path, &to_json(difficulty)?)?;
        }

        copy_asset(assets, &assets.audio, dir, AssetKind::Audio)?;
        if !assets.background.is_empty() {
            copy_asset(assets, &assets.background, dir, AssetKind::Background)?;
        }
        if !assets.video.is_empty() {
            copy_asset(assets, &assets.video, dir, AssetKind::Video)?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content.as_bytes()).map_err(|e| ConvertError::io(path, e))
}

/// Asset names must stay inside the bundle folder: plain components only.
fn check_asset_name(name: &str, kind: AssetKind) -> Result<()> {
    let inside = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(ConvertError::UnsafeAssetName {
            kind,
            name: name.to_string(),
        })
    }
}

fn copy_asset(assets: &BundleAssets, name: &str, dir: &Path, kind: AssetKind) -> Result<()> {
    let source = assets.source_folder.join(name);
    if !source.is_file() {
        return Err(ConvertError::MissingAsset { kind, path: source });
    }
    let target = dir.join(name);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    fs::copy(&source, &target).map_err(|e| ConvertError::io(&source, e))?;
    Ok(())
}

/// Move `staging` to `destination`, swapping out an existing folder.
fn replace_dir(staging: &Path, destination: &Path) -> Result<()> {
    if !destination.exists() {
        return fs::rename(staging, destination).map_err(|e| ConvertError::io(destination, e));
    }

    let mut backup = destination.as_os_str().to_owned();
    backup.push(".old");
    let backup = PathBuf::from(backup);
    if backup.exists() {
        fs::remove_dir_all(&backup).map_err(|e| ConvertError::io(&backup, e))?;
    }

    log::debug!("Replacing stale bundle {}", destination.display());
    fs::rename(destination, &backup).map_err(|e| ConvertError::io(destination, e))?;
    if let Err(e) = fs::rename(staging, destination) {
        if let Err(restore) = fs::rename(&backup, destination) {
            log::error!(
                "Failed to restore {} from {}: {}",
                destination.display(),
                backup.display(),
                restore
            );
        }
        return Err(ConvertError::io(destination, e));
    }

    if let Err(e) = fs::remove_dir_all(&backup) {
        log::warn!("Failed to remove old bundle {}: {}", backup.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::tests::chart_set;
    use crate::bundle::{NoteLane, NoteType, OutputDifficulty, OutputNote};
    use tempfile::TempDir;

    fn bundle() -> AssembledBundle {
        let chart_set = chart_set();
        let difficulties = (1..=2)
            .map(|id| OutputDifficulty {
                id,
                chart_set_id: chart_set.id,
                creator: "mapper".to_string(),
                difficulty_name: format!("Level {id}"),
                difficulty_rating: 2.0,
                background_path: chart_set.background_path.clone(),
                notes: vec![OutputNote {
                    lane: NoteLane::Lane2,
                    start_time: 100,
                    end_time: 100,
                    kind: NoteType::BasicNote,
                }],
            })
            .collect();
        AssembledBundle {
            chart_set,
            difficulties,
            skipped: Vec::new(),
        }
    }

    fn assets(songs: &TempDir) -> BundleAssets {
        let folder = songs.path().join("42 Artist - Song");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("audio.mp3"), b"ID3 audio").unwrap();
        fs::write(folder.join("bg.jpg"), b"jpeg").unwrap();
        BundleAssets {
            source_folder: folder,
            audio: "audio.mp3".to_string(),
            background: "bg.jpg".to_string(),
            video: String::new(),
        }
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_bundle() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());

        let dest = writer.write(&bundle(), &assets(&songs)).unwrap();
        assert_eq!(dest, out.path().join("42 Artist - Song"));
        assert_eq!(
            listing(&dest),
            vec![
                "1 Artist - Song [Level 1].rkb",
                "2 Artist - Song [Level 2].rkb",
                "Artist - Song (mapper).rks",
                "audio.mp3",
                "bg.jpg",
            ]
        );
        assert_eq!(fs::read(dest.join("bg.jpg")).unwrap(), b"jpeg");

        let descriptor = fs::read_to_string(dest.join("Artist - Song (mapper).rks")).unwrap();
        assert!(descriptor.contains("アーティスト"));
        // Only the bundle folder remains under the output root.
        assert_eq!(listing(out.path()), vec!["42 Artist - Song"]);
    }

    #[test]
    fn test_failed_asset_copy_leaves_nothing() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let mut assets = assets(&songs);
        assets.video = "missing.mp4".to_string();

        let err = writer.write(&bundle(), &assets).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingAsset {
                kind: AssetKind::Video,
                ..
            }
        ));
        assert!(!writer.destination(&bundle()).exists());
        assert!(listing(out.path()).is_empty());
    }

    #[test]
    fn test_write_bundle_with_video() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let mut assets = assets(&songs);
        fs::write(assets.source_folder.join("clip.mp4"), b"mp4 video").unwrap();
        assets.video = "clip.mp4".to_string();
        let mut bundle = bundle();
        bundle.chart_set.has_video = true;
        bundle.chart_set.video_path = "clip.mp4".to_string();

        let dest = writer.write(&bundle, &assets).unwrap();
        assert_eq!(fs::read(dest.join("clip.mp4")).unwrap(), b"mp4 video");

        let descriptor = fs::read_to_string(dest.join("Artist - Song (mapper).rks")).unwrap();
        assert!(descriptor.contains("\"HasVideo\": true"));
        assert!(descriptor.contains("\"VideoPath\": \"clip.mp4\""));
    }

    #[test]
    fn test_asset_names_outside_bundle_are_rejected() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let mut assets = assets(&songs);
        fs::write(songs.path().join("bg.jpg"), b"outside").unwrap();
        assets.background = "../bg.jpg".to_string();
        assets.video = "missing.mp4".to_string();

        let err = writer.write(&bundle(), &assets).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsafeAssetName {
                kind: AssetKind::Background,
                ..
            }
        ));
        assert!(listing(out.path()).is_empty());

        let absolute = songs.path().join("bg.jpg");
        assets.background = absolute.to_string_lossy().into_owned();
        assert!(writer.write(&bundle(), &assets).is_err());
        assert_eq!(fs::read(&absolute).unwrap(), b"outside");
        assert!(listing(out.path()).is_empty());
    }

    #[test]
    fn test_nested_asset_names_stay_in_bundle() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let mut assets = assets(&songs);
        fs::create_dir_all(assets.source_folder.join("sb")).unwrap();
        fs::write(assets.source_folder.join("sb").join("bg.png"), b"png").unwrap();
        assets.background = "sb/bg.png".to_string();

        let dest = writer.write(&bundle(), &assets).unwrap();
        assert!(dest.join("sb").join("bg.png").is_file());
    }

    #[test]
    fn test_rewrite_replaces_stale_bundle() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let assets = assets(&songs);

        let dest = writer.write(&bundle(), &assets).unwrap();
        let first: Vec<(String, Vec<u8>)> = listing(&dest)
            .into_iter()
            .map(|n| {
                let bytes = fs::read(dest.join(&n)).unwrap();
                (n, bytes)
            })
            .collect();
        fs::write(dest.join("stale.rkb"), b"{}").unwrap();

        writer.write(&bundle(), &assets).unwrap();
        let second: Vec<(String, Vec<u8>)> = listing(&dest)
            .into_iter()
            .map(|n| {
                let bytes = fs::read(dest.join(&n)).unwrap();
                (n, bytes)
            })
            .collect();
        assert_eq!(first, second);
        assert_eq!(listing(out.path()), vec!["42 Artist - Song"]);
    }

    #[test]
    fn test_failed_rewrite_keeps_previous_bundle() {
        let songs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let writer = BundleWriter::new(out.path());
        let mut assets = assets(&songs);

        let dest = writer.write(&bundle(), &assets).unwrap();
        assets.background = "gone.png".to_string();
        assert!(writer.write(&bundle(), &assets).is_err());

        assert!(dest.join("Artist - Song (mapper).rks").is_file());
        assert_eq!(listing(out.path()), vec!["42 Artist - Song"]);
    }
}
