//! Template sources.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Loads template text by path. `None` means the file cannot be loaded.
pub trait TemplateSource: Send + Sync {
    fn load(&self, path: &Path) -> Option<String>;
}

/// Reads templates from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn load(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Cannot read template {:?}: {}", path, e);
                None
            }
        }
    }
}

/// In-memory templates keyed by full path.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateSource {
    files: HashMap<PathBuf, String>,
}

impl MemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn load(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_source_reads_and_misses() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("main.html");
        fs::write(&path, "<p>hi</p>").unwrap();

        let source = FsTemplateSource;
        assert_eq!(source.load(&path).as_deref(), Some("<p>hi</p>"));
        assert_eq!(source.load(&temp.path().join("nope.html")), None);
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryTemplateSource::new().with("/v/app/a.html", "A");
        assert_eq!(source.load(Path::new("/v/app/a.html")).as_deref(), Some("A"));
        assert!(source.load(Path::new("/v/app/b.html")).is_none());
    }
}
