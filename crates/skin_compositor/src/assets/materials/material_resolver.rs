//! Skin identifier to resolved material
//!
//! ```text
//! identifier -> material candidates -> TextFetcher -> MaterialParser
//!            -> per channel: PathResolver candidates -> TextureCache
//!            -> Compositor::select
//! ```
//!
//! Every failure along the way is recovered: a missing material yields an
//! empty definition, a channel whose candidates all fail is left `None`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::material_definition::{Channel, MaterialDefinition};
use super::material_parser::{FormatKind, MaterialParser};
use crate::assets::fetch::{FsTextFetcher, TextFetcher};
use crate::assets::image_decoder::{FsImageDecoder, ImageDecoder};
use crate::assets::paths::{LookupTables, PathResolver};
use crate::assets::texture_cache::{ResolvedTexture, TextureCache};
use crate::core::config::SkinConfig;
use crate::render::compositing::{ChannelSet, CompositeDecision, Compositor, SurfaceShader};

/// One channel reference to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    /// Channel being resolved
    pub channel: Channel,
    /// Reference as written in the material
    pub reference: String,
    /// Identifier of the material the reference came from
    pub material: String,
}

impl TextureRequest {
    /// Create a request
    pub fn new(channel: Channel, reference: impl Into<String>, material: impl Into<String>) -> Self {
        Self { channel, reference: reference.into(), material: material.into() }
    }
}

/// Everything known about one skin material
#[derive(Debug, Clone)]
pub struct ResolvedMaterial {
    /// Identifier the material was requested by
    pub identifier: String,
    /// Material file that supplied the definition
    pub source: Option<String>,
    /// Parsed definition (empty when no material file parsed)
    pub definition: MaterialDefinition,
    /// Referenced channels and the texture each resolved to
    pub textures: BTreeMap<Channel, Option<ResolvedTexture>>,
    /// Shading strategy
    pub decision: CompositeDecision,
}

impl ResolvedMaterial {
    /// Channels that resolved
    pub fn channels(&self) -> ChannelSet {
        ChannelSet::from_resolved(&self.textures)
    }

    /// Number of channels that resolved
    pub fn resolved_count(&self) -> usize {
        self.textures.values().filter(|t| t.is_some()).count()
    }

    /// Build the shader for this material
    pub fn shader(&self, compositor: &Compositor) -> SurfaceShader {
        compositor.build(&self.definition, &self.channels())
    }
}

/// Resolves skin identifiers through injected text and image sources
pub struct MaterialResolver {
    fetcher: Box<dyn TextFetcher>,
    paths: PathResolver,
    cache: TextureCache,
    compositor: Compositor,
}

impl MaterialResolver {
    /// Create a resolver over the given sources
    pub fn new(fetcher: Box<dyn TextFetcher>, decoder: Box<dyn ImageDecoder>, config: SkinConfig) -> Self {
        Self {
            fetcher,
            paths: PathResolver::new(config.resolver),
            cache: TextureCache::new(decoder, config.cache),
            compositor: Compositor::new(config.compositing),
        }
    }

    /// Resolver reading materials and textures from files below `root`
    pub fn from_directory(root: impl Into<PathBuf>, config: SkinConfig) -> Self {
        let root = root.into();
        Self::new(
            Box::new(FsTextFetcher::new(root.clone())),
            Box::new(FsImageDecoder::new(root)),
            config,
        )
    }

    /// Replace the lookup tables used by the mask fallback
    pub fn with_tables(mut self, tables: Arc<LookupTables>) -> Self {
        self.paths = PathResolver::with_tables(self.paths.config().clone(), tables);
        self
    }

    /// Path resolver
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Texture cache
    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// Mutable texture cache, e.g. to clear it
    pub fn cache_mut(&mut self) -> &mut TextureCache {
        &mut self.cache
    }

    /// Compositor used for strategy selection
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Fetch and parse the first usable material file for `identifier`
    pub fn load_definition(&self, identifier: &str) -> Option<(String, MaterialDefinition)> {
        for (path, format) in self.paths.material_candidates(identifier) {
            let text = match self.fetcher.fetch_text(&path) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("Material candidate {} unavailable: {}", path, e);
                    continue;
                }
            };
            let mut definition = MaterialParser::parse(&text, format);
            let detected = FormatKind::detect(&text);
            if definition.is_empty() && detected != format {
                definition = MaterialParser::parse(&text, detected);
            }
            if definition.is_empty() {
                log::warn!("Material {} parsed to nothing", path);
                continue;
            }
            log::info!("Loaded material '{}' from {}", identifier, path);
            return Some((path, definition));
        }
        log::warn!("No material found for '{}'", identifier);
        None
    }

    /// Resolve one channel reference to the first candidate that loads
    pub fn resolve_texture(&mut self, request: &TextureRequest) -> Option<ResolvedTexture> {
        for candidate in self.paths.resolve(&request.reference) {
            log::debug!("Trying {} for {} of '{}'", candidate, request.channel, request.material);
            if let Some(texture) = self.cache.get_or_load(&candidate) {
                return Some(texture);
            }
        }
        None
    }

    /// Per-weapon mask for a referenced mask whose candidates all failed
    fn mask_fallback(&mut self, reference: &str, definition: &MaterialDefinition) -> Option<ResolvedTexture> {
        let primary = self.paths.resolve(reference).into_iter().next().unwrap_or_default();
        let fallback = self.paths.resolve_mask_fallback(&primary, definition)?;
        log::debug!("Trying mask fallback {}", fallback);
        self.cache.get_or_load(&fallback)
    }

    /// Resolve a skin identifier to its definition, textures and strategy
    pub fn resolve_material(&mut self, identifier: &str) -> ResolvedMaterial {
        let (source, definition) = match self.load_definition(identifier) {
            Some((path, definition)) => (Some(path), definition),
            None => (None, MaterialDefinition::empty()),
        };

        let mut textures = BTreeMap::new();
        for channel in Channel::ALL {
            let Some(reference) = definition.texture(channel) else { continue };
            let mut texture = self.resolve_texture(&TextureRequest::new(channel, reference, identifier));

            if texture.is_none() && channel == Channel::Mask {
                texture = self.mask_fallback(reference, &definition);
            }
            if texture.is_none() {
                log::debug!("Channel {} of '{}' left unresolved", channel, identifier);
            }
            textures.insert(channel, texture);
        }

        let decision = self.compositor.select(&definition, &ChannelSet::from_resolved(&textures));
        log::info!(
            "Resolved '{}': {} of {} channels, {} shader",
            identifier,
            textures.values().filter(|t| t.is_some()).count(),
            textures.len(),
            decision.name()
        );

        ResolvedMaterial { identifier: identifier.to_string(), source, definition, textures, decision }
    }
}
