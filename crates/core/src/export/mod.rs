use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use image::ImageFormat;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{model::Music, Result};

/// Counters for one or more export calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub written: usize,
    pub skipped: usize,
}

impl ExportReport {
    fn record(&mut self, written: bool) {
        if written {
            self.written += 1;
        } else {
            self.skipped += 1;
        }
    }

    pub fn merge(&mut self, other: ExportReport) {
        self.written += other.written;
        self.skipped += other.skipped;
    }
}

/// Writes each song's assets under `<root>/<song id>/`.
///
/// Existing files are never touched, so re-running over a partial tree only
/// fills in what is missing. Every file is written to a temporary sibling
/// first and moved into place without replacing an existing file.
#[derive(Debug, Clone)]
pub struct Exporter {
    root: PathBuf,
}

impl Exporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn song_dir(&self, music: &Music) -> PathBuf {
        self.root.join(&music.id)
    }

    pub fn export(&self, music: &Music) -> Result<ExportReport> {
        let dir = self.song_dir(music);
        std::fs::create_dir_all(&dir)?;

        let mut report = ExportReport::default();

        if let Some(image) = music.jacket.image() {
            let written = write_new(&dir.join("jacket.png"), |file| {
                image.write_to(file, ImageFormat::Png)?;
                Ok(())
            })?;
            report.record(written);
        }

        for track in &music.tracks {
            let written = write_new(&dir.join(track.file_name()), |file| {
                file.write_all(&track.audio)?;
                Ok(())
            })?;
            report.record(written);
        }

        for score in &music.scores {
            let written = write_new(&dir.join(format!("{}.sus", score.difficulty)), |file| {
                file.write_all(&score.data)?;
                Ok(())
            })?;
            report.record(written);
        }

        debug!(song_id = %music.id, written = report.written, skipped = report.skipped, "exported");
        Ok(report)
    }
}

/// Writes `path` unless it already exists. Returns whether a file was written.
fn write_new<F>(path: &Path, fill: F) -> Result<bool>
where
    F: FnOnce(&mut std::fs::File) -> Result<()>,
{
    if path.exists() {
        return Ok(false);
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    fill(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;

    match temp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err.error.into()),
    }
}
