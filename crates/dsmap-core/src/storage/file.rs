//! Directory-backed file sink for native platforms.

use super::{FileSink, SaveError, SaveResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes saved files into a directory.
pub struct DirectorySink {
    /// Directory receiving the files.
    base_path: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `base_path`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> SaveResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                SaveError::Io(format!("Failed to create output directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Sink in the user's download directory, where a browser would save.
    ///
    /// Falls back to the home directory when there is no download directory.
    pub fn default_location() -> SaveResult<Self> {
        let base = dirs::download_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SaveError::Io("Could not determine download directory".to_string()))?;
        Self::new(base)
    }

    /// Path a file name resolves to. Path separators are neutralized.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        let safe_name: String = file_name
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        let safe_name = if safe_name.trim_matches('.').is_empty() {
            "_".to_string()
        } else {
            safe_name
        };
        self.base_path.join(safe_name)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl FileSink for DirectorySink {
    fn save_file(
        &mut self,
        file_name: &str,
        _content_type: &str,
        contents: &[u8],
    ) -> SaveResult<()> {
        let path = self.file_path(file_name);
        fs::write(&path, contents)
            .map_err(|e| SaveError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}
