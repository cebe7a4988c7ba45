//! `FilingSource`: where filing bytes come from.
//!
//! The only implementation here walks an already-unpacked local directory.
//! It stands in for the bulk-download path (ZIP index discovery, HTTP GET,
//! streaming decompression) at the interface only — none of those three are
//! implemented; a future `HttpZipFilingSource` would slot in here without
//! touching the extraction or sink side of the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub trait FilingSource: Send + Sync {
    /// Lists every candidate filing path, without reading file contents.
    fn list(&self) -> Result<Vec<PathBuf>>;

    /// Reads one filing's bytes.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Walks a directory tree (depth-first, no symlink following) for files
/// with a `.html` or `.xml` extension.
pub struct LocalDirectorySource {
    root: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalDirectorySource { root: root.into() }
    }
}

impl FilingSource for LocalDirectorySource {
    fn list(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).with_context(|| format!("reading directory {}", dir.display()))?;
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    stack.push(path);
                } else if is_filing_extension(&path) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("reading filing {}", path.display()))
    }
}

fn is_filing_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("xml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_html_and_xml_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Prod1_1_00000001_20220101.html"), "<xbrl/>").unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a filing").unwrap();

        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("Prod1_1_00000002_20220102.xml"), "<xbrl/>").unwrap();

        let source = LocalDirectorySource::new(dir.path());
        let mut listed = source.list().unwrap();
        listed.sort();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|p| p.ends_with("Prod1_1_00000001_20220101.html")));
        assert!(listed.iter().any(|p| p.ends_with("Prod1_1_00000002_20220102.xml")));
    }

    #[test]
    fn read_returns_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Prod1_1_00000001_20220101.html");
        std::fs::write(&file, "hello").unwrap();

        let source = LocalDirectorySource::new(dir.path());
        assert_eq!(source.read(&file).unwrap(), b"hello");
    }
}
