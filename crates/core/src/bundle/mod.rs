//! Access to game asset bundles.
//!
//! Parsing the engine's binary bundle format is left to an external unpacker.
//! The pipeline only needs [`BundleReader`], which enumerates the typed
//! objects inside one bundle. [`DumpBundleReader`] reads bundles that an
//! unpacker has already dumped to disk.

use std::path::Path;

use image::DynamicImage;
use walkdir::WalkDir;

use crate::{ExtractError, Result};

/// Text payload stored inside a bundle. Charts are plain text, the audio
/// stream is stored as raw bytes in the same object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAsset {
    pub name: String,
    pub script: Vec<u8>,
}

/// One typed object found inside a bundle.
#[derive(Debug, Clone)]
pub enum BundleObject {
    TextAsset(TextAsset),
    Texture { name: String, image: DynamicImage },
    Other { kind: String },
}

impl BundleObject {
    /// Engine type name of the object.
    pub fn kind(&self) -> &str {
        match self {
            Self::TextAsset(_) => "TextAsset",
            Self::Texture { .. } => "Texture2D",
            Self::Other { kind } => kind,
        }
    }

    pub fn as_text_asset(&self) -> Option<&TextAsset> {
        match self {
            Self::TextAsset(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn into_texture(self) -> Option<DynamicImage> {
        match self {
            Self::Texture { image, .. } => Some(image),
            _ => None,
        }
    }
}

/// Opens a bundle and lists the objects it contains, in bundle order.
///
/// A bundle without any matching object yields an empty list, not an error.
pub trait BundleReader {
    fn open(&self, path: &Path) -> Result<Vec<BundleObject>>;
}

impl<T: BundleReader + ?Sized> BundleReader for &T {
    fn open(&self, path: &Path) -> Result<Vec<BundleObject>> {
        (**self).open(path)
    }
}

/// Reads bundles that were dumped to disk ahead of time.
///
/// A directory is one bundle with one object per file, ordered by file name.
/// A plain file is a bundle holding a single object. Files whose bytes are a
/// recognised image become textures, everything else becomes a text asset
/// named after the file stem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpBundleReader;

impl DumpBundleReader {
    pub fn new() -> Self {
        Self
    }

    fn read_object(path: &Path) -> Result<BundleObject> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        if image::guess_format(&bytes).is_ok() {
            let image = decode_image(&bytes)
                .map_err(|err| ExtractError::bundle(path, err.to_string()))?;
            return Ok(BundleObject::Texture { name, image });
        }

        Ok(BundleObject::TextAsset(TextAsset {
            name,
            script: bytes,
        }))
    }
}

impl BundleReader for DumpBundleReader {
    fn open(&self, path: &Path) -> Result<Vec<BundleObject>> {
        let metadata = std::fs::metadata(path)
            .map_err(|err| ExtractError::bundle(path, err.to_string()))?;

        if !metadata.is_dir() {
            return Ok(vec![Self::read_object(path)?]);
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && !is_hidden(entry.file_name()) {
                objects.push(Self::read_object(entry.path())?);
            }
        }
        Ok(objects)
    }
}

/// Image codec entry point used for jacket textures.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
