//! Client-side file saving.
//!
//! Exports are never stored by a server. A [`FileSink`] hands the finished
//! file to the user: a browser download on the web, a file in a directory
//! natively, or a buffer in tests.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod download;

pub use memory::{MemorySink, SavedFile};

#[cfg(not(target_arch = "wasm32"))]
pub use file::DirectorySink;

#[cfg(target_arch = "wasm32")]
pub use download::BrowserDownload;

use thiserror::Error;

/// File save errors.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Save error: {0}")]
    Other(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Destination for exported files.
pub trait FileSink {
    /// Save `contents` under `file_name`, replacing any previous file of that name.
    fn save_file(&mut self, file_name: &str, content_type: &str, contents: &[u8]) -> SaveResult<()>;
}
