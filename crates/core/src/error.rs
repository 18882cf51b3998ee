use std::path::PathBuf;

/// Result alias that carries the custom [`ExtractError`] type.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Common error type for the core crate.
///
/// Everything surfaced through this type aborts the run. Conditions that only
/// skip a file (unparseable names, missing related assets) never become an
/// `ExtractError`.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("could not walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("image codec failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("could not serialise manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// A bundle could not be opened or enumerated.
    #[error("could not read bundle `{}`: {reason}", .path.display())]
    Bundle { path: PathBuf, reason: String },
    /// The audio decoder produced no usable output.
    #[error("audio decoder failed: {0}")]
    Decoder(String),
    #[error("external tool `{}` was not found", .0.display())]
    MissingTool(PathBuf),
}

impl ExtractError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn bundle(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Bundle {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Reasons a filename does not fit either naming convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("empty file name")]
    Empty,
    #[error("`{name}` has no token at position {position}")]
    MissingToken { name: String, position: usize },
}
