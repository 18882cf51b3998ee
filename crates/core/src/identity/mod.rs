use std::path::Path;

use crate::error::NameError;

/// Variant tag used when a filename carries no band prefix.
pub const DEFAULT_VARIANT: &str = "xx";

/// Identity of one asset file, derived purely from its name.
///
/// Two naming conventions exist, told apart by the first character:
///
/// * `0012_long` (unprefixed): the song id is everything before the first
///   `_` and the variant is [`DEFAULT_VARIANT`].
/// * `band1_0012_01` (prefixed): the name splits into at most three tokens
///   `[variant, song_id, track_id]`.
///
/// The song id is the second token in every context. The third token only
/// labels the track so that several arrangements by the same band do not
/// collide on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongIdentity {
    pub song_id: String,
    pub variant_tag: String,
    pub track_id: String,
}

impl SongIdentity {
    pub fn resolve(file_name: &str) -> Result<Self, NameError> {
        let first = file_name.chars().next().ok_or(NameError::Empty)?;

        if first.is_ascii_digit() {
            let song_id = file_name.split('_').next().unwrap_or(file_name);
            return Ok(Self {
                song_id: song_id.to_string(),
                variant_tag: DEFAULT_VARIANT.to_string(),
                track_id: song_id.to_string(),
            });
        }

        let mut tokens = file_name.splitn(3, '_');
        let mut token = |position: usize| {
            tokens.next().ok_or_else(|| NameError::MissingToken {
                name: file_name.to_string(),
                position,
            })
        };
        let variant_tag = token(0)?;
        let song_id = token(1)?;
        let track_id = token(2)?;

        Ok(Self {
            song_id: song_id.to_string(),
            variant_tag: variant_tag.to_string(),
            track_id: track_id.to_string(),
        })
    }

    /// Resolves the identity from the final component of `path`.
    pub fn from_path(path: &Path) -> Result<Self, NameError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(NameError::Empty)?;
        Self::resolve(name)
    }

    /// Whether the song id is usable as a canonical id (ASCII digits only).
    pub fn has_numeric_id(&self) -> bool {
        is_numeric_id(&self.song_id)
    }
}

pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Key used to look up the jacket: the song id without its first character.
pub fn jacket_key(song_id: &str) -> &str {
    let mut chars = song_id.chars();
    chars.next();
    chars.as_str()
}
