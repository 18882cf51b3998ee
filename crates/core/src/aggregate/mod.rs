use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    identity::SongIdentity,
    locate::{self, list_files},
    model::Music,
    AudioDecoder, BundleReader, ExtractConfig, Result,
};

/// Builds one [`Music`] per distinct song id.
///
/// The set of seen ids belongs to the aggregator, so each instance covers
/// exactly one run.
pub struct Aggregator<R, D> {
    reader: R,
    decoder: D,
    audio_files: Vec<PathBuf>,
    score_files: Vec<PathBuf>,
    jacket_dir: PathBuf,
    seen_ids: HashSet<String>,
}

impl<R: BundleReader, D: AudioDecoder> Aggregator<R, D> {
    /// Lists the audio and chart directories once for the whole run.
    pub fn new(config: &ExtractConfig, reader: R, decoder: D) -> Result<Self> {
        Ok(Self {
            reader,
            decoder,
            audio_files: list_files(&config.audio_dir())?,
            score_files: list_files(&config.score_dir())?,
            jacket_dir: config.jacket_dir(),
            seen_ids: HashSet::new(),
        })
    }

    /// Candidate audio files, in discovery order.
    pub fn audio_files(&self) -> &[PathBuf] {
        &self.audio_files
    }

    pub fn score_file_count(&self) -> usize {
        self.score_files.len()
    }

    pub fn is_seen(&self, song_id: &str) -> bool {
        self.seen_ids.contains(song_id)
    }

    /// Builds the record for the song that `audio_file` belongs to.
    ///
    /// Returns `None` when the file name has no numeric song id or the id was
    /// already handled in this run.
    pub fn process(&mut self, audio_file: &Path) -> Result<Option<Music>> {
        let identity = match SongIdentity::from_path(audio_file) {
            Ok(identity) => identity,
            Err(err) => {
                debug!(path = %audio_file.display(), %err, "skipping unparseable file name");
                return Ok(None);
            }
        };

        if !identity.has_numeric_id() {
            debug!(path = %audio_file.display(), song_id = %identity.song_id, "skipping non-numeric id");
            return Ok(None);
        }
        if !self.seen_ids.insert(identity.song_id.clone()) {
            return Ok(None);
        }

        let mut music = Music::new(identity.song_id.clone());

        for path in locate::score_files(&self.score_files, &music.id) {
            music.scores.extend(locate::load_scores(&self.reader, path)?);
        }

        music.jacket = locate::load_jacket(&self.reader, &self.jacket_dir, &music.id)?;

        music.tracks.push(locate::load_track(
            &self.reader,
            &self.decoder,
            audio_file,
            identity,
        )?);

        for path in locate::variant_files(&self.audio_files, &music.id, audio_file) {
            match SongIdentity::from_path(path) {
                Ok(identity) => music.tracks.push(locate::load_track(
                    &self.reader,
                    &self.decoder,
                    path,
                    identity,
                )?),
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping variant with unparseable name");
                }
            }
        }

        Ok(Some(music))
    }

    /// Processes every candidate file and collects the records in discovery order.
    pub fn collect(&mut self) -> Result<Vec<Music>> {
        let files = self.audio_files.clone();
        let mut musics = Vec::new();
        for path in &files {
            if let Some(music) = self.process(path)? {
                musics.push(music);
            }
        }
        Ok(musics)
    }
}
