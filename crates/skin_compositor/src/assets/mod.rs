//! Asset management system
//!
//! Everything that turns identifiers into data: material text fetching and
//! parsing, texture path resolution, image decoding and the texture cache.

pub mod fetch;
pub mod image_loader;
pub mod image_decoder;
pub mod texture_cache;
pub mod materials;
pub mod paths;

pub use fetch::{TextFetcher, FsTextFetcher, MemoryTextFetcher};
pub use image_loader::{ImageData, SamplerSettings, WrapMode, FilterMode};
pub use image_decoder::{ImageDecoder, FsImageDecoder, MemoryImageDecoder};
pub use texture_cache::{TextureCache, ResolvedTexture, CacheStats};
pub use materials::{
    Channel, MaterialDefinition, ParamValue, PaintStyle,
    MaterialParser, FormatKind, ParseError,
    MaterialResolver, ResolvedMaterial, TextureRequest,
};
pub use paths::{PathResolver, LookupTables};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
