use std::time::SystemTime;

use tracing::info;

use crate::{
    aggregate::Aggregator,
    export::{ExportReport, Exporter},
    manifest::Manifest,
    model::Music,
    AudioDecoder, BundleReader, ExtractConfig, ExtractError, Result,
};

/// Outcome of a full extraction run.
#[derive(Debug)]
pub struct ExtractSummary {
    pub musics: Vec<Music>,
    pub export: ExportReport,
    pub manifest: Manifest,
}

/// Aggregates every song, exports it and writes the manifest.
///
/// Songs are exported as soon as they are built, so payloads can be released
/// before the next song is loaded.
pub fn extract_music<R, D>(config: &ExtractConfig, reader: R, decoder: D) -> Result<ExtractSummary>
where
    R: BundleReader,
    D: AudioDecoder,
{
    if !config.input_root.is_dir() {
        return Err(ExtractError::msg(format!(
            "input root `{}` is not a directory",
            config.input_root.display()
        )));
    }
    std::fs::read_dir(&config.input_root)?;

    let songs_dir = config.songs_out_dir();
    std::fs::create_dir_all(&songs_dir)?;

    let mut aggregator = Aggregator::new(config, reader, decoder)?;
    let exporter = Exporter::new(songs_dir);
    let total = aggregator.score_file_count();
    let files = aggregator.audio_files().to_vec();

    let mut musics = Vec::new();
    let mut export = ExportReport::default();

    for path in &files {
        let Some(mut music) = aggregator.process(path)? else {
            continue;
        };

        if config.export {
            export.merge(exporter.export(&music)?);
        }
        if config.releases_payloads() {
            music.release_payloads();
        }

        info!(processed = musics.len() + 1, total, song_id = %music.id, "progress");
        musics.push(music);
    }

    let manifest = Manifest::build(&config.manifest_name, &musics, SystemTime::now());
    manifest.write(&config.manifest_path())?;

    info!(
        songs = musics.len(),
        written = export.written,
        skipped = export.skipped,
        manifest = %config.manifest_path().display(),
        "extraction finished"
    );

    Ok(ExtractSummary {
        musics,
        export,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::Path};

    use image::{DynamicImage, ImageFormat};

    use super::*;
    use crate::{bundle::DumpBundleReader, locate::tests::FakeDecoder};

    fn input_tree() -> (tempfile::TempDir, ExtractConfig) {
        let root = tempfile::tempdir().unwrap();
        let config = ExtractConfig::new(root.path().join("assets"), root.path().join("out"));
        let audio = config.audio_dir();
        let scores = config.score_dir();
        let jackets = config.jacket_dir();
        for dir in [&audio, &scores, &jackets] {
            std::fs::create_dir_all(dir).unwrap();
        }

        std::fs::write(audio.join("0012_01"), "main").unwrap();
        std::fs::write(audio.join("vs_0012_01"), "band").unwrap();
        std::fs::write(audio.join("se_0012_02"), "!broken").unwrap();
        std::fs::write(audio.join("0034_01"), "solo").unwrap();
        std::fs::write(audio.join("se_title_01"), "menu").unwrap();

        let chart = scores.join("0012_01");
        std::fs::create_dir(&chart).unwrap();
        std::fs::write(chart.join("master.txt"), "#00002:1").unwrap();
        std::fs::write(chart.join("expert.txt"), "#00002:2").unwrap();

        let mut png = Vec::new();
        DynamicImage::new_rgb8(5, 5)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        std::fs::write(jackets.join("jacket_s_012"), png).unwrap();

        (root, config)
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn extracts_tree_and_manifest() {
        let (_root, config) = input_tree();

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        let song = config.songs_out_dir().join("0012");
        assert_eq!(
            names(&song),
            ["audio_se_02.wav", "audio_vs_01.wav", "audio_xx_0012.wav", "expert.sus", "jacket.png", "master.sus"]
        );
        assert_eq!(std::fs::read(song.join("audio_xx_0012.wav")).unwrap(), b"MAIN");
        assert!(std::fs::read(song.join("audio_se_02.wav")).unwrap().is_empty());
        assert_eq!(names(&config.songs_out_dir().join("0034")), ["audio_xx_0034.wav", "jacket.png"]);

        let text = std::fs::read_to_string(config.manifest_path()).unwrap();
        let manifest: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(manifest.name, "sekai-scores");
        let ids: Vec<_> = manifest.musics.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["0012", "0034"]);
        assert!(manifest.musics[0].jacket);
        assert!(!manifest.musics[1].jacket);
        assert_eq!(manifest.musics[0].tracks, ["se_02", "vs_01", "xx_0012"]);
        assert_eq!(manifest.musics[0].scores, ["expert", "master"]);
        assert!(manifest.musics[1].scores.is_empty());
        assert_eq!(summary.export.written, 8);
    }

    #[test]
    fn second_run_only_rewrites_the_manifest() {
        let (_root, config) = input_tree();
        extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();
        let wav = config.songs_out_dir().join("0012").join("audio_vs_01.wav");
        let before = std::fs::metadata(&wav).unwrap().modified().unwrap();

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        assert_eq!(summary.export.written, 0);
        assert_eq!(summary.export.skipped, 8);
        assert_eq!(std::fs::metadata(&wav).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn missing_artifacts_are_filled_in() {
        let (_root, config) = input_tree();
        extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();
        let chart = config.songs_out_dir().join("0012").join("master.sus");
        std::fs::remove_file(&chart).unwrap();

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        assert_eq!(summary.export.written, 1);
        assert_eq!(std::fs::read_to_string(chart).unwrap(), "#00002:1");
    }

    #[test]
    fn dry_run_writes_only_the_manifest() {
        let (_root, mut config) = input_tree();
        config.export = false;

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        assert!(names(&config.songs_out_dir()).is_empty());
        assert!(config.manifest_path().exists());
        assert_eq!(summary.manifest.musics.len(), 2);
    }

    #[test]
    fn released_payloads_keep_manifest_data() {
        let (_root, mut config) = input_tree();
        config.release_payloads = Some(true);

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        let song = &summary.musics[0];
        assert!(song.tracks.iter().all(|track| track.audio.is_empty()));
        assert!(song.jacket.image().is_none());
        assert!(summary.manifest.musics[0].jacket);
    }

    #[test]
    fn empty_input_still_writes_manifest() {
        let root = tempfile::tempdir().unwrap();
        let config = ExtractConfig::new(root.path(), root.path().join("out"));

        let summary = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap();

        assert!(summary.musics.is_empty());
        assert!(config.songs_out_dir().is_dir());
        assert!(config.manifest_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn unlaunchable_decoder_aborts_before_writing_tracks() {
        use std::os::unix::fs::PermissionsExt;

        let (root, config) = input_tree();
        let tool = root.path().join("vgmstream-cli");
        std::fs::write(&tool, "").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();

        let result = extract_music(
            &config,
            DumpBundleReader::new(),
            crate::VgmstreamDecoder::new(&tool),
        );

        assert!(matches!(result, Err(ExtractError::Io(_))));
        assert!(!config.songs_out_dir().join("0012").join("audio_xx_0012.wav").exists());
        assert!(!config.manifest_path().exists());
    }

    #[test]
    fn missing_input_root_aborts_the_run() {
        let root = tempfile::tempdir().unwrap();
        let config = ExtractConfig::new(root.path().join("absent"), root.path().join("out"));

        let err = extract_music(&config, DumpBundleReader::new(), FakeDecoder).unwrap_err();

        assert!(format!("{err}").contains("absent"));
        assert!(!config.manifest_path().exists());
    }
}
