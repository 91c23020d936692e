use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{PhotoframeError, PhotoframeResult};

/// Receives an exported image. Stands in for the host's download mechanism.
pub trait SaveSink {
    /// Store `bytes` under `file_name`.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> PhotoframeResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) saved: Vec<(String, Vec<u8>)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first.
    pub fn saved(&self) -> &[(String, Vec<u8>)] {
        &self.saved
    }

    pub fn last(&self) -> Option<&(String, Vec<u8>)> {
        self.saved.last()
    }
}

impl SaveSink for InMemorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> PhotoframeResult<()> {
        self.saved.push((file_name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

/// Writes each export as a file inside a fixed directory (created on first save).
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recent successful save.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl SaveSink for DirSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> PhotoframeResult<()> {
        let plain = Path::new(file_name)
            .file_name()
            .is_some_and(|n| n == std::ffi::OsStr::new(file_name));
        if !plain {
            return Err(PhotoframeError::invalid_input(format!(
                "export file name '{file_name}' must not contain a path"
            )));
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("write export '{}'", path.display()))?;

        tracing::debug!(path = %path.display(), len = bytes.len(), "saved export");
        self.last_path = Some(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
