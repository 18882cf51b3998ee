use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{ExtractError, Result};

/// Turns the game's streaming audio payload into a waveform.
///
/// A stream the decoder rejects is an [`ExtractError::Decoder`]; the pipeline
/// keeps such a track with an empty payload. Other errors abort the run.
pub trait AudioDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Vec<u8>>;
}

impl<T: AudioDecoder + ?Sized> AudioDecoder for &T {
    fn decode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        (**self).decode(raw)
    }
}

/// Decoder backed by the `vgmstream-cli` executable.
///
/// Every call gets its own temporary directory holding the input and output
/// files. The directory is removed when the call returns, on success and on
/// failure alike.
#[derive(Debug, Clone)]
pub struct VgmstreamDecoder {
    program: PathBuf,
}

impl VgmstreamDecoder {
    /// Uses `program` as is, without checking that it exists.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `program` against `PATH` and fails unless it is an executable file.
    pub fn locate(program: impl AsRef<Path>) -> Result<Self> {
        let program = program.as_ref();
        find_executable(program)
            .map(Self::new)
            .ok_or_else(|| ExtractError::MissingTool(program.to_path_buf()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl AudioDecoder for VgmstreamDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.acb");
        let output = workdir.path().join("output.wav");
        std::fs::write(&input, raw)?;

        let result = Command::new(&self.program)
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExtractError::Decoder(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }

        match std::fs::read(&output) {
            Ok(wave) => Ok(wave),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(
                ExtractError::Decoder(format!("{} wrote no output", self.program.display())),
            ),
            Err(err) => Err(err.into()),
        }
    }
}

fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
