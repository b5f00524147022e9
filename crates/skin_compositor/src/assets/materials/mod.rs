//! Material definition loading
//!
//! Parses both material grammars into a [`MaterialDefinition`] and resolves
//! a skin identifier into its definition, textures and shading strategy.

pub mod channel_rules;
pub mod composite_parser;
pub mod keyvalues;
pub mod material_definition;
pub mod material_parser;
pub mod material_resolver;
pub mod vmat_parser;

pub use material_definition::{
    param_names, Channel, FeatureFlags, MaterialDefinition, PaintStyle, ParamValue,
};
pub use material_parser::{FormatKind, MaterialParser, ParseError};
pub use material_resolver::{MaterialResolver, ResolvedMaterial, TextureRequest};
