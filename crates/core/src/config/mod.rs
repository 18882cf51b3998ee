use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Root folder of the game assets.
    pub input_root: PathBuf,
    /// Root folder the normalised tree is written to.
    pub output_root: PathBuf,
    pub layout: AssetLayout,
    /// Value of the `name` field in the manifest.
    pub manifest_name: String,
    /// Write per-song artifacts. When false only the manifest is produced.
    pub export: bool,
    /// Drop decoded audio, chart text and jacket pixels once a song is exported.
    /// Unset means the caller's default applies; the library keeps payloads.
    pub release_payloads: Option<bool>,
    pub decoder: DecoderConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::new(),
            output_root: PathBuf::new(),
            layout: AssetLayout::default(),
            manifest_name: "sekai-scores".to_string(),
            export: true,
            release_payloads: None,
            decoder: DecoderConfig::default(),
        }
    }
}

impl ExtractConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ..Default::default()
        }
    }

    /// Loads a configuration from a TOML file. Missing keys take their defaults.
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn releases_payloads(&self) -> bool {
        self.release_payloads.unwrap_or(false)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.input_root.join(&self.layout.audio_dir)
    }

    pub fn score_dir(&self) -> PathBuf {
        self.input_root.join(&self.layout.score_dir)
    }

    pub fn jacket_dir(&self) -> PathBuf {
        self.input_root.join(&self.layout.jacket_dir)
    }

    pub fn songs_out_dir(&self) -> PathBuf {
        self.output_root.join(&self.layout.songs_out_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_root.join(&self.layout.manifest_file)
    }
}

/// Relative locations of the asset kinds under the input and output roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetLayout {
    pub audio_dir: PathBuf,
    pub score_dir: PathBuf,
    pub jacket_dir: PathBuf,
    pub songs_out_dir: PathBuf,
    pub manifest_file: PathBuf,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("music").join("long"),
            score_dir: PathBuf::from("music").join("music_score"),
            jacket_dir: PathBuf::from("music").join("jacket"),
            songs_out_dir: PathBuf::from("scores"),
            manifest_file: PathBuf::from("scores.json"),
        }
    }
}

/// Configuration for the out-of-process audio decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub program: PathBuf,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("vgmstream-cli"),
        }
    }
}
