//! # Unified Configuration System
//!
//! Every tunable of the skin pipeline lives here, grouped by the subsystem
//! that reads it. All structs are `serde` types with complete defaults so a
//! config file only needs to list the values it changes.
//!
//! ## Configuration Categories
//!
//! - **Resolver Config**: path normalization and base directory
//! - **Cache Config**: texture content validity thresholds
//! - **Compositing Config**: wear window, bare metal look, fallbacks

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Resolver Configuration
///
/// Controls how raw texture references become canonical, web-servable paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fixed directory every resolved path is rooted under
    pub base_dir: String,
    /// Extension every texture reference is rewritten to
    pub preferred_extension: String,
    /// Prefixes removed from the front of a reference (repeatedly)
    pub stripped_prefixes: Vec<String>,
    /// Extensions recognized as texture extensions and rewritten
    pub texture_extensions: Vec<String>,
}

impl ResolverConfig {
    /// Set the base directory
    pub fn with_base_dir(mut self, dir: impl Into<String>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Base directory without surrounding slashes, e.g. `textures`
    pub fn base_token(&self) -> &str {
        self.base_dir.trim_matches('/')
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_dir: "/textures".to_string(),
            preferred_extension: "png".to_string(),
            stripped_prefixes: vec![
                "materials/".to_string(),
                "panorama/images/".to_string(),
            ],
            texture_extensions: [
                "vtex_c", "vtex", "vtf", "tga", "psd", "png", "jpg", "jpeg", "tif", "tiff", "webp",
            ]
            .iter()
            .map(|ext| (*ext).to_string())
            .collect(),
        }
    }
}

/// # Cache Configuration
///
/// Thresholds for the content validity check run on freshly decoded images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// A pixel counts as visible when its alpha is at or above this value
    pub alpha_threshold: u8,
    /// A pixel counts as non-black when any RGB channel is at or above this value
    pub black_threshold: u8,
    /// Extensions (lowercase, no dot) that get the content validity check
    pub validated_extensions: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 8,
            black_threshold: 8,
            validated_extensions: vec!["png".to_string()],
        }
    }
}

/// # Compositing Configuration
///
/// Constants of the paint-style and wear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositingConfig {
    /// Lower end of the window wear amount is remapped into
    pub wear_remap_min: f32,
    /// Upper end of the window wear amount is remapped into
    pub wear_remap_max: f32,
    /// Half-width of the smoothstep edge around the wear threshold
    pub wear_edge_softness: f32,
    /// How strongly a grunge sample raises the wear mask
    pub grunge_influence: f32,
    /// Dark base color revealed where paint is worn through
    pub bare_metal_color: [f32; 3],
    /// How much the base color channel tints the bare metal
    pub bare_tint: f32,
    /// Roughness of fully worn areas
    pub worn_roughness: f32,
    /// Metalness of fully worn areas
    pub worn_metalness: f32,
    /// Paint roughness used when a material does not set one
    pub default_paint_roughness: f32,
    /// Paint metalness used when a material does not set one
    pub default_paint_metalness: f32,
    /// Gray used when nothing else is known about a surface
    pub neutral_gray: f32,
    /// RGB distance below which two color slots count as the same color
    pub color_epsilon: f32,
    /// Mask file stems that mean "no real mask"
    pub default_mask_names: Vec<String>,
}

impl Default for CompositingConfig {
    fn default() -> Self {
        Self {
            wear_remap_min: 0.05,
            wear_remap_max: 0.85,
            wear_edge_softness: 0.05,
            grunge_influence: 0.5,
            bare_metal_color: [0.22, 0.22, 0.24],
            bare_tint: 0.15,
            worn_roughness: 0.85,
            worn_metalness: 0.9,
            default_paint_roughness: 0.6,
            default_paint_metalness: 0.0,
            neutral_gray: 0.5,
            color_epsilon: 1e-4,
            default_mask_names: [
                "default", "default_mask", "mask_default", "empty", "blank", "none", "white",
                "black", "placeholder",
            ]
            .iter()
            .map(|name| (*name).to_string())
            .collect(),
        }
    }
}

/// # Complete Skin Pipeline Configuration
///
/// Top-level configuration that encompasses all subsystems. This is the
/// structure hosts load from a `.toml` or `.ron` file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Path resolution configuration
    pub resolver: ResolverConfig,
    /// Texture cache configuration
    pub cache: CacheConfig,
    /// Compositing configuration
    pub compositing: CompositingConfig,
}

impl SkinConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the resolver configuration
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the compositing configuration
    pub fn with_compositing(mut self, compositing: CompositingConfig) -> Self {
        self.compositing = compositing;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.resolver.base_token().is_empty() {
            return Err("Base directory cannot be empty".to_string());
        }
        if self.resolver.preferred_extension.is_empty() {
            return Err("Preferred extension cannot be empty".to_string());
        }
        let c = &self.compositing;
        if c.wear_remap_min > c.wear_remap_max {
            return Err(format!(
                "Wear window is inverted: min {} > max {}",
                c.wear_remap_min, c.wear_remap_max
            ));
        }
        if c.wear_edge_softness < 0.0 {
            return Err("Wear edge softness must not be negative".to_string());
        }
        Ok(())
    }
}

impl Config for SkinConfig {}
