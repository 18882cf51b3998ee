//! Lookups of the assets related to one song id.
//!
//! All lookups tolerate missing results: no charts, no jacket and no extra
//! variants are all valid outcomes.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    bundle::{is_hidden, BundleReader},
    identity::{jacket_key, SongIdentity},
    model::{Jacket, Score, Track},
    AudioDecoder, ExtractError, Result,
};

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// An unreadable directory is an error; a missing one yields nothing.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !is_hidden(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Chart files whose name starts with `song_id`.
///
/// Prefix matching means `001` also claims the charts of `0012`; ids in the
/// game are fixed-width so this does not happen in practice.
pub fn score_files<'a>(files: &'a [PathBuf], song_id: &'a str) -> impl Iterator<Item = &'a PathBuf> {
    files.iter().filter(move |path| {
        file_name(path)
            .map(|name| name.starts_with(song_id))
            .unwrap_or(false)
    })
}

/// Reads every text asset of a chart bundle as one [`Score`].
pub fn load_scores(reader: &impl BundleReader, path: &Path) -> Result<Vec<Score>> {
    let song_id = file_name(path)
        .map(|name| name.split('_').next().unwrap_or(name))
        .unwrap_or_default()
        .to_string();

    let scores = reader
        .open(path)?
        .iter()
        .filter_map(|object| object.as_text_asset())
        .map(|asset| Score {
            song_id: song_id.clone(),
            difficulty: asset.name.clone(),
            data: asset.script.clone(),
        })
        .collect();
    Ok(scores)
}

/// Location of the jacket bundle for `song_id` inside `jacket_dir`.
pub fn jacket_path(jacket_dir: &Path, song_id: &str) -> PathBuf {
    jacket_dir.join(format!("jacket_s_{}", jacket_key(song_id)))
}

/// Loads the first texture of the song's jacket bundle, or the placeholder.
pub fn load_jacket(reader: &impl BundleReader, jacket_dir: &Path, song_id: &str) -> Result<Jacket> {
    let path = jacket_path(jacket_dir, song_id);
    if !path.exists() {
        debug!(song_id, path = %path.display(), "no jacket");
        return Ok(Jacket::placeholder());
    }

    let objects = reader.open(&path)?;
    let kinds: Vec<String> = objects.iter().map(|object| object.kind().to_string()).collect();

    Ok(match objects.into_iter().find_map(|object| object.into_texture()) {
        Some(image) => Jacket::found(image),
        None => {
            debug!(song_id, path = %path.display(), ?kinds, "jacket bundle holds no texture");
            Jacket::placeholder()
        }
    })
}

/// Builds the track for one long-audio bundle.
///
/// The first text asset carries the audio stream. A bundle without one, or a
/// stream the decoder rejects, yields a track with an empty payload. Any other
/// decoder error, such as a program that cannot be launched, aborts the run.
pub fn load_track(
    reader: &impl BundleReader,
    decoder: &impl AudioDecoder,
    path: &Path,
    identity: SongIdentity,
) -> Result<Track> {
    let objects = reader.open(path)?;
    let audio = match objects.iter().find_map(|object| object.as_text_asset()) {
        Some(asset) => match decoder.decode(&asset.script) {
            Ok(wave) => wave,
            Err(err @ ExtractError::Decoder(_)) => {
                warn!(path = %path.display(), %err, "could not decode audio, keeping an empty track");
                Vec::new()
            }
            Err(err) => return Err(err),
        },
        None => {
            warn!(path = %path.display(), "audio bundle holds no stream");
            Vec::new()
        }
    };

    Ok(Track {
        song_id: identity.song_id,
        variant_tag: identity.variant_tag,
        track_id: identity.track_id,
        audio,
    })
}

/// Other audio files whose name contains `song_id`, excluding `origin`.
///
/// Substring matching lets a short id match inside a longer one.
pub fn variant_files<'a>(
    files: &'a [PathBuf],
    song_id: &'a str,
    origin: &'a Path,
) -> impl Iterator<Item = &'a PathBuf> {
    files.iter().filter(move |path| {
        path.as_path() != origin
            && file_name(path)
                .map(|name| name.contains(song_id))
                .unwrap_or(false)
    })
}
