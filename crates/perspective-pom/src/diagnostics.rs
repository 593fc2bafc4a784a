//! Screenshot capture for intercepted interactions.

use crate::result::PomResult;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Receives element screenshots taken when a click is intercepted
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    /// Store `png` captured for the element behind `locator`
    fn capture(&self, locator: &str, png: &[u8]) -> PomResult<()>;
}

/// Writes each capture to `<dir>/<locator>-<uuid>.png`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one capture and return its path
    pub fn write(&self, locator: &str, png: &[u8]) -> PomResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("{}-{}.png", sanitize(locator), Uuid::new_v4()));
        fs::write(&path, png)?;
        debug!(path = %path.display(), "wrote interception screenshot");
        Ok(path)
    }
}

impl DiagnosticSink for DirectorySink {
    fn capture(&self, locator: &str, png: &[u8]) -> PomResult<()> {
        self.write(locator, png).map(|_| ())
    }
}

const MAX_STEM: usize = 64;

/// File-name-safe stem for a selector
fn sanitize(locator: &str) -> String {
    let mut stem: String = locator
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_STEM)
        .collect();
    if stem.is_empty() {
        stem.push_str("element");
    }
    stem
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("div.tree [id=\"x\"]"), "div_tree__id__x__");
        assert_eq!(sanitize(""), "element");
        assert_eq!(sanitize(&"a".repeat(100)).len(), MAX_STEM);
    }

    #[test]
    fn test_directory_sink_writes_unique_files() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("shots"));
        let first = sink.write("div.a", b"png").unwrap();
        let second = sink.write("div.a", b"png").unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"png");
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("div_a-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_capture_via_trait() {
        let tmp = tempfile::tempdir().unwrap();
        let sink: Box<dyn DiagnosticSink> = Box::new(DirectorySink::new(tmp.path()));
        sink.capture("#x", &[1, 2, 3]).unwrap();
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
