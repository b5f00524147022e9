//! Text fetching for material definition sources
//!
//! The host decides where material text comes from. The crate ships a
//! filesystem fetcher rooted at a directory and an in-memory one for tests and
//! embedding.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::AssetError;

/// Capability to fetch the text behind a canonical path
pub trait TextFetcher {
    /// Fetch the full text of `path`
    fn fetch_text(&self, path: &str) -> Result<String, AssetError>;
}

/// Fetches text from files below a root directory
///
/// Canonical paths are web-style (`/textures/vmats/x.vmat`); the leading slash
/// is dropped and the remainder joined onto the root.
#[derive(Debug, Clone)]
pub struct FsTextFetcher {
    root: PathBuf,
}

impl FsTextFetcher {
    /// Create a fetcher rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextFetcher for FsTextFetcher {
    fn fetch_text(&self, path: &str) -> Result<String, AssetError> {
        let file_path = local_path(&self.root, path)?;
        if !file_path.exists() {
            return Err(AssetError::NotFound(path.to_string()));
        }
        let bytes = std::fs::read(&file_path)?;
        String::from_utf8(bytes)
            .map_err(|e| AssetError::InvalidData(format!("{path} is not UTF-8: {e}")))
    }
}

/// In-memory text source keyed by canonical path
#[derive(Debug, Clone, Default)]
pub struct MemoryTextFetcher {
    documents: HashMap<String, String>,
}

impl MemoryTextFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under `path`
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }

    /// Builder form of [`MemoryTextFetcher::insert`]
    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl TextFetcher for MemoryTextFetcher {
    fn fetch_text(&self, path: &str) -> Result<String, AssetError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Map a web-style canonical path onto a directory
///
/// Paths that would leave `root` are refused.
pub(crate) fn local_path(root: &Path, canonical: &str) -> Result<PathBuf, AssetError> {
    let mut path = root.to_path_buf();
    for component in Path::new(canonical.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return Err(AssetError::InvalidData(format!("{canonical} escapes the asset root"))),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fs_fetcher_reads_below_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("textures/vmats")).unwrap();
        let mut file = std::fs::File::create(dir.path().join("textures/vmats/a.vmat")).unwrap();
        write!(file, "Layer0 {{ }}").unwrap();

        let fetcher = FsTextFetcher::new(dir.path());
        let text = fetcher.fetch_text("/textures/vmats/a.vmat").unwrap();
        assert_eq!(text, "Layer0 { }");
    }

    #[test]
    fn test_fs_fetcher_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FsTextFetcher::new(dir.path());
        let result = fetcher.fetch_text("/textures/missing.vmat");
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_parent_segments_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(dir.path().join("secret.vmat"), "outside").unwrap();

        let fetcher = FsTextFetcher::new(&root);
        let result = fetcher.fetch_text("/../secret.vmat");
        assert!(matches!(result, Err(AssetError::InvalidData(_))));
        assert_eq!(local_path(&root, "/textures/./a.png").unwrap(), root.join("textures").join("a.png"));
    }

    #[test]
    fn test_memory_fetcher() {
        let fetcher = MemoryTextFetcher::new().with("/a", "text");
        assert_eq!(fetcher.fetch_text("/a").unwrap(), "text");
        assert!(fetcher.fetch_text("/b").is_err());
    }
}
