//! # Core Module
//!
//! Shared configuration for every subsystem of the compositor.
//!
//! ## Organization
//!
//! - **Config**: Resolver, cache and compositing settings

pub mod config;

pub use config::{
    SkinConfig,
    ResolverConfig,
    CacheConfig,
    CompositingConfig,
    Config,
    ConfigError,
};
