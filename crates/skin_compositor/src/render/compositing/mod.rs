//! Compositing engine
//!
//! Stateless: every decision is recomputed from a [`MaterialDefinition`] and
//! the [`ChannelSet`] that resolved for it.
//!
//! [`MaterialDefinition`]: crate::assets::materials::MaterialDefinition

pub mod capabilities;
pub mod color;
pub mod compositor;
pub mod paint_style;
pub mod shader;
pub mod strategy;
pub mod uv;
pub mod wear;

pub use capabilities::Capabilities;
pub use color::{BlendMode, ColorAdjustment};
pub use compositor::Compositor;
pub use shader::{ShadedSample, SurfaceShader, TextureBinding};
pub use strategy::{ChannelSet, CompositeDecision};
pub use uv::UvTransform;
pub use wear::WearModel;

use thiserror::Error;

use crate::assets::materials::Channel;

/// Shader construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    /// A parameter cannot be evaluated
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A channel the strategy depends on did not resolve
    #[error("Missing channel: {0}")]
    MissingChannel(Channel),
}
