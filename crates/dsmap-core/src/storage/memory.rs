//! In-memory file sink.

use super::{FileSink, SaveResult};

/// A file captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub content_type: String,
    pub contents: Vec<u8>,
}

/// Keeps saved files in memory, for testing and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Vec<SavedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[SavedFile] {
        &self.files
    }

    pub fn get(&self, name: &str) -> Option<&SavedFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

impl FileSink for MemorySink {
    fn save_file(
        &mut self,
        file_name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> SaveResult<()> {
        let file = SavedFile {
            name: file_name.to_string(),
            content_type: content_type.to_string(),
            contents: contents.to_vec(),
        };
        match self.files.iter_mut().find(|f| f.name == file_name) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
        Ok(())
    }
}
