//! # Skin Compositor
//!
//! Resolves weapon skin materials into something a renderer can draw.
//!
//! ## Features
//!
//! - **Material Parsing**: layered `.vmat` and composite `.vcompmat` text
//! - **Path Resolution**: raw texture references to canonical candidate paths
//! - **Texture Cache**: decode once, reject blank images, share handles
//! - **Compositing**: shading strategy selection, paint styles, wear
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skin_compositor::prelude::*;
//!
//! let mut resolver = MaterialResolver::from_directory("./assets", SkinConfig::default());
//! let material = resolver.resolve_material("cu_ak47_asiimov");
//! let shader = material.shader(resolver.compositor());
//! let preview = shader.bake(256, 256);
//! assert_eq!(preview.width, 256);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        core::config::{SkinConfig, ResolverConfig, CacheConfig, CompositingConfig, Config, ConfigError},
        foundation::math::{Vec2, Vec3, Vec4},
        assets::{
            AssetError, Channel, MaterialDefinition, MaterialResolver, ResolvedMaterial,
            ResolvedTexture, TextureCache, PathResolver, LookupTables, TextFetcher, ImageDecoder,
            ImageData,
        },
        render::{CompositeDecision, Compositor, SurfaceShader, ShadedSample, Capabilities},
    };
}
