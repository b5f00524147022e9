//! Texture path resolution
//!
//! Turns raw texture references from material files into canonical,
//! servable paths and their fallback candidates.

pub mod folder_rules;
pub mod lookup_tables;
pub mod path_resolver;

pub use folder_rules::{folder_of, FolderRule, FOLDER_RULES};
pub use lookup_tables::LookupTables;
pub use path_resolver::PathResolver;
