//! Rendering-side decisions
//!
//! The crate does not talk to a GPU. This module decides which surface model
//! a material needs, which textures get bound to it, and provides a CPU
//! evaluation of the blend that a backend can compile into its own shaders.

pub mod compositing;

pub use compositing::{
    Capabilities, ChannelSet, CompositeDecision, CompositeError, Compositor, ShadedSample,
    SurfaceShader, TextureBinding,
};
