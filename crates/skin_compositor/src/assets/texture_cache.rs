//! Texture cache for deduplicating decoded, validated textures
//!
//! Entries are keyed by the exact canonical path string. Callers always get a
//! clone of the cached [`ResolvedTexture`]: the pixel buffer is shared through
//! an `Arc`, the sampler settings are the caller's own, so a per-slot wrap
//! override never reaches the cached copy.
//!
//! Failed paths are not remembered. Asking again for a path that failed
//! decodes it again.

use std::collections::HashMap;
use std::sync::Arc;

use super::image_decoder::ImageDecoder;
use super::image_loader::{ImageData, SamplerSettings, WrapMode};
use super::AssetError;
use crate::core::CacheConfig;
use crate::foundation::math::{Vec2, Vec4};

/// A decoded texture bound to a canonical path
#[derive(Debug, Clone)]
pub struct ResolvedTexture {
    /// Canonical path the texture was loaded from (cache key)
    pub canonical_path: String,
    /// Shared decoded pixels
    pub image: Arc<ImageData>,
    /// Wrap and filter configuration for this use of the texture
    pub sampler: SamplerSettings,
}

impl ResolvedTexture {
    /// Override both wrap axes for this binding
    pub fn with_wrap(mut self, wrap_u: WrapMode, wrap_v: WrapMode) -> Self {
        self.sampler.wrap_u = wrap_u;
        self.sampler.wrap_v = wrap_v;
        self
    }

    /// Sample normalized RGBA using this binding's sampler
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        self.image.sample(uv, &self.sampler)
    }

    /// File stem of the canonical path, lowercase
    pub fn file_stem(&self) -> String {
        let file = self.canonical_path.rsplit('/').next().unwrap_or_default();
        file.split('.').next().unwrap_or_default().to_lowercase()
    }
}

impl PartialEq for ResolvedTexture {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_path == other.canonical_path
            && self.sampler == other.sampler
            && (Arc::ptr_eq(&self.image, &other.image) || *self.image == *other.image)
    }
}

/// Cache entry holding the cache's own instance
struct CacheEntry {
    texture: ResolvedTexture,
}

/// Counters describing cache traffic since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: usize,
    /// Requests that went to the decoder
    pub misses: usize,
    /// Decoded images rejected as empty or degenerate
    pub rejected: usize,
    /// Handles disposed by `clear`
    pub disposed: usize,
}

/// Texture cache service owned by the caller
pub struct TextureCache {
    /// Cache storage: canonical path -> texture
    entries: HashMap<String, CacheEntry>,
    decoder: Box<dyn ImageDecoder>,
    config: CacheConfig,
    stats: CacheStats,
}

impl TextureCache {
    /// Create an empty cache around an image decoder
    pub fn new(decoder: Box<dyn ImageDecoder>, config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            decoder,
            config,
            stats: CacheStats::default(),
        }
    }

    /// Get the texture at `canonical_path`, decoding and validating it on first use
    ///
    /// Returns `None` when the image cannot be decoded, has a zero dimension,
    /// or fails the content validity check.
    pub fn get_or_load(&mut self, canonical_path: &str) -> Option<ResolvedTexture> {
        if let Some(entry) = self.entries.get(canonical_path) {
            self.stats.hits += 1;
            log::debug!("Texture cache hit: {}", canonical_path);
            return Some(entry.texture.clone());
        }

        self.stats.misses += 1;
        match self.load(canonical_path) {
            Ok(image) => {
                let texture = ResolvedTexture {
                    canonical_path: canonical_path.to_string(),
                    image: Arc::new(image),
                    sampler: SamplerSettings::default(),
                };
                log::info!(
                    "Cached texture {} ({}x{})",
                    canonical_path, texture.image.width, texture.image.height
                );
                let handed_out = texture.clone();
                self.entries.insert(canonical_path.to_string(), CacheEntry { texture });
                Some(handed_out)
            }
            Err(e) => {
                log::debug!("Texture {} unavailable: {}", canonical_path, e);
                None
            }
        }
    }

    fn load(&mut self, canonical_path: &str) -> Result<ImageData, AssetError> {
        let image = self.decoder.decode(canonical_path)?;
        if let Err(e) = self.validate(canonical_path, &image) {
            self.stats.rejected += 1;
            return Err(e);
        }
        Ok(image)
    }

    /// Reject images that are structurally present but carry no content
    fn validate(&self, canonical_path: &str, image: &ImageData) -> Result<(), AssetError> {
        if image.is_degenerate() {
            return Err(AssetError::InvalidData(format!(
                "{} has zero size ({}x{})",
                canonical_path, image.width, image.height
            )));
        }
        if !self.needs_content_check(canonical_path) {
            return Ok(());
        }
        if image.is_fully_transparent(self.config.alpha_threshold) {
            return Err(AssetError::InvalidData(format!("{canonical_path} is fully transparent")));
        }
        if image.is_fully_black(self.config.black_threshold) {
            return Err(AssetError::InvalidData(format!("{canonical_path} is fully black")));
        }
        Ok(())
    }

    fn needs_content_check(&self, canonical_path: &str) -> bool {
        let file = canonical_path.rsplit('/').next().unwrap_or(canonical_path);
        file.rsplit_once('.').is_some_and(|(_, ext)| {
            self.config
                .validated_extensions
                .iter()
                .any(|validated| validated.eq_ignore_ascii_case(ext))
        })
    }

    /// Check if a path is cached
    pub fn contains(&self, canonical_path: &str) -> bool {
        self.entries.contains_key(canonical_path)
    }

    /// Get the number of cached textures
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispose every cached handle, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let disposed = self.entries.len();
        for (path, entry) in self.entries.drain() {
            log::trace!(
                "Disposing cached texture {} ({} outstanding clones)",
                path,
                Arc::strong_count(&entry.texture.image) - 1
            );
        }
        self.stats.disposed += disposed;
        if disposed > 0 {
            log::info!("Cleared {} cached texture(s)", disposed);
        }
        disposed
    }

    /// Traffic counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
