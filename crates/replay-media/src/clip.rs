//! Locating the essence/index file pair of a recorded clip.

use replay_core::{ReplayError, Result};
use std::path::{Path, PathBuf};

/// Essence extensions probed when resolving a clip by name.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mav"];

/// Extension of the companion index file.
pub const INDEX_EXTENSION: &str = "idx";

/// Paths of one recorded clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipPaths {
    pub essence: PathBuf,
    pub index: PathBuf,
}

impl ClipPaths {
    /// Derive the index path from an essence path.
    pub fn for_essence<P: AsRef<Path>>(essence: P, index_extension: &str) -> Self {
        let essence = essence.as_ref().to_path_buf();
        let index = essence.with_extension(index_extension);
        Self { essence, index }
    }

    /// Find `<media_folder>/<name>.<ext>` for the first extension that exists.
    pub fn resolve<S: AsRef<str>>(
        media_folder: &Path,
        name: &str,
        extensions: &[S],
        index_extension: &str,
    ) -> Result<Self> {
        let base = media_folder.join(name);
        extensions
            .iter()
            .map(|ext| base.with_extension(ext.as_ref()))
            .find(|candidate| candidate.is_file())
            .map(|essence| Self::for_essence(essence, index_extension))
            .ok_or_else(|| {
                ReplayError::NotFound(format!(
                    "No clip named {} in {}",
                    name,
                    media_folder.display()
                ))
            })
    }

    /// File name used in status lines.
    pub fn clip_name(&self) -> String {
        self.essence
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.essence.to_string_lossy().to_string())
    }
}
