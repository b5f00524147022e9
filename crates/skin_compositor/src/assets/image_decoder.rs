//! Image decoding capability injected into the texture cache

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::fetch::local_path;
use super::{AssetError, ImageData};

/// Capability to decode the image behind a canonical path
pub trait ImageDecoder {
    /// Decode `path` into an RGBA8 buffer
    fn decode(&self, path: &str) -> Result<ImageData, AssetError>;
}

/// Decodes image files below a root directory with the `image` crate
#[derive(Debug, Clone)]
pub struct FsImageDecoder {
    root: PathBuf,
}

impl FsImageDecoder {
    /// Create a decoder rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageDecoder for FsImageDecoder {
    fn decode(&self, path: &str) -> Result<ImageData, AssetError> {
        let file_path = local_path(&self.root, path)?;
        if !file_path.exists() {
            return Err(AssetError::NotFound(path.to_string()));
        }
        ImageData::from_file(file_path)
    }
}

/// In-memory encoded images keyed by canonical path
#[derive(Debug, Clone, Default)]
pub struct MemoryImageDecoder {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryImageDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under `path`
    pub fn insert_bytes(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Encode `image` as PNG and register it under `path`
    pub fn insert_image(&mut self, path: impl Into<String>, image: &ImageData) -> Result<(), AssetError> {
        let bytes = image.to_png_bytes()?;
        self.insert_bytes(path, bytes);
        Ok(())
    }

    /// Builder form of [`MemoryImageDecoder::insert_image`]
    pub fn with_image(mut self, path: impl Into<String>, image: &ImageData) -> Result<Self, AssetError> {
        self.insert_image(path, image)?;
        Ok(self)
    }
}

impl ImageDecoder for MemoryImageDecoder {
    fn decode(&self, path: &str) -> Result<ImageData, AssetError> {
        let bytes = self.files
            .get(path)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        ImageData::from_bytes(bytes)
    }
}
