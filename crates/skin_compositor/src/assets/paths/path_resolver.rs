//! Raw texture reference to canonical path candidates
//!
//! ```text
//! materials\models\weapons\customization\paints\custom\asiimov_psd_2f1a3b4c.vtex
//!   -> /textures/models/weapons/customization/paints/custom/asiimov.png
//!   -> /textures/paints/custom/asiimov.png      (folder guessed from the name)
//!   -> /textures/asiimov.png
//! ```

use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::folder_rules::folder_of;
use super::lookup_tables::LookupTables;
use crate::assets::materials::material_definition::{Channel, MaterialDefinition};
use crate::assets::materials::material_parser::FormatKind;
use crate::core::config::ResolverConfig;

const HASH_SUFFIX_PATTERN: &str = r"(_(psd|tga|png|jpg)_[0-9a-f]{8}|_[0-9a-f]{16})$";

static HASH_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn hash_suffix() -> &'static Regex {
    HASH_SUFFIX.get_or_init(|| Regex::new(HASH_SUFFIX_PATTERN).expect("invalid regex pattern"))
}

/// Channel suffixes removed from a file stem to recover the pattern name
const CHANNEL_SUFFIXES: &[&str] = &[
    "_masks", "_mask", "_color", "_pattern", "_normal", "_roughness", "_rough", "_metalness",
    "_metal", "_ao", "_wear", "_grunge",
];

/// Material file extensions tried for an identifier, in order
const MATERIAL_EXTENSIONS: &[(&str, FormatKind)] = &[
    ("vmat", FormatKind::Layered),
    ("vcompmat", FormatKind::Composite),
];

/// Pure path resolution over a base directory and lookup tables
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: ResolverConfig,
    tables: Arc<LookupTables>,
}

impl PathResolver {
    /// Resolver using the built-in lookup tables
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_tables(config, LookupTables::builtin())
    }

    /// Resolver using caller supplied lookup tables
    pub fn with_tables(config: ResolverConfig, tables: Arc<LookupTables>) -> Self {
        Self { config, tables }
    }

    /// Resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Lookup tables in use
    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Base directory as a path prefix (`/textures`, or empty)
    pub fn base(&self) -> String {
        match self.config.base_token() {
            "" => String::new(),
            token => format!("/{token}"),
        }
    }

    /// Canonical form of a raw reference, relative to the base directory
    ///
    /// Normalizing an already normalized path returns it unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        let mut path = raw.replace('\\', "/").to_ascii_lowercase();
        self.strip_prefixes(&mut path);
        if path.is_empty() {
            return path;
        }

        let (dir, file) = match path.rfind('/') {
            Some(idx) => (&path[..=idx], &path[idx + 1..]),
            None => ("", path.as_str()),
        };
        let stem = strip_hash_suffixes(self.strip_texture_extension(file));
        let mut normalized = format!("{dir}{stem}.{}", self.config.preferred_extension);

        if normalized.starts_with("weapons/") {
            normalized.insert_str(0, "models/");
        }
        normalized
    }

    /// Ordered, deduplicated candidate paths for a raw reference
    pub fn resolve(&self, raw: &str) -> Vec<String> {
        let normalized = self.normalize(raw);
        if normalized.is_empty() {
            return Vec::new();
        }
        let base = self.base();
        let file = file_name(&normalized);
        let folder = folder_of(file_stem(file));

        let mut candidates = Vec::with_capacity(3);
        for candidate in [
            format!("{base}/{normalized}"),
            format!("{base}/paints/{folder}/{file}"),
            format!("{base}/{file}"),
        ] {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Per-weapon mask path derived from the pattern a material uses
    ///
    /// The pattern token comes from `primary`, then from the material's
    /// pattern reference. Returns `None` unless every lookup succeeds.
    pub fn resolve_mask_fallback(&self, primary: &str, definition: &MaterialDefinition) -> Option<String> {
        let sources = [Some(primary), definition.texture(Channel::Pattern)];
        sources.into_iter().flatten().find_map(|source| {
            let token = self.pattern_token(source)?;
            let weapon = self.tables.weapon_for_pattern(&token)?;
            let folder = self.tables.model_folder(weapon)?;
            let mask = self.tables.mask_file(weapon)?;
            let path = format!("{}/models/weapons/v_models/{folder}/{mask}", self.base());
            log::debug!("Mask fallback for '{}' via {}: {}", token, weapon, path);
            Some(path)
        })
    }

    /// Canonical pattern name carried by a texture path
    pub fn pattern_token(&self, path: &str) -> Option<String> {
        let normalized = self.normalize(path);
        let mut token = file_stem(file_name(&normalized));
        let mut stripped = true;
        while stripped {
            stripped = false;
            for suffix in CHANNEL_SUFFIXES {
                if let Some(rest) = token.strip_suffix(suffix) {
                    if !rest.is_empty() {
                        token = rest;
                        stripped = true;
                    }
                }
            }
        }
        if token.is_empty() {
            return None;
        }
        Some(self.tables.canonical_pattern(token).to_string())
    }

    /// Candidate material files for a skin identifier
    pub fn material_candidates(&self, identifier: &str) -> Vec<(String, FormatKind)> {
        let id = identifier.trim().to_ascii_lowercase();
        let id = MATERIAL_EXTENSIONS
            .iter()
            .find_map(|(ext, _)| id.strip_suffix(&format!(".{ext}")).map(str::to_string))
            .unwrap_or(id);
        if id.is_empty() {
            return Vec::new();
        }
        let base = self.base();
        let folder = folder_of(&id);

        let mut candidates: Vec<(String, FormatKind)> = Vec::new();
        let mut push = |path: String, format: FormatKind| {
            if !candidates.iter().any(|(p, _)| *p == path) {
                candidates.push((path, format));
            }
        };
        push(format!("{base}/{folder}/{id}.vmat"), FormatKind::Layered);
        for (ext, format) in MATERIAL_EXTENSIONS {
            push(format!("{base}/vmats/{id}.{ext}"), *format);
        }
        candidates
    }

    fn strip_prefixes(&self, path: &mut String) {
        let base_prefix = format!("{}/", self.config.base_token());
        loop {
            let before = path.len();
            let trimmed = path.trim().trim_matches('"');
            if trimmed.len() != path.len() {
                *path = trimmed.to_string();
            }
            collapse_dot_segments(path);
            if let Some(rest) = path.strip_prefix('/').or_else(|| path.strip_prefix("./")) {
                *path = rest.to_string();
            }
            if base_prefix.len() > 1 {
                if let Some(rest) = path.strip_prefix(base_prefix.as_str()) {
                    *path = rest.to_string();
                }
            }
            for prefix in &self.config.stripped_prefixes {
                if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                    *path = rest.to_string();
                }
            }
            if path.len() == before {
                break;
            }
        }
    }

    fn strip_texture_extension<'a>(&self, file: &'a str) -> &'a str {
        match file.rsplit_once('.') {
            Some((stem, ext)) if self.config.texture_extensions.iter().any(|e| e == ext) => stem,
            _ => file,
        }
    }
}

/// Drop empty and `.` segments, resolve `..` against the segment before it
///
/// A `..` with nothing before it is dropped, so the result never climbs
/// above the base directory. A leading `/` is kept.
fn collapse_dot_segments(path: &mut String) {
    if !path.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
        return;
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    let rooted = path.starts_with('/');
    let collapsed = segments.join("/");
    *path = if rooted { format!("/{collapsed}") } else { collapsed };
}

fn strip_hash_suffixes(mut stem: &str) -> &str {
    while let Some(found) = hash_suffix().find(stem) {
        if found.start() == 0 {
            break;
        }
        stem = &stem[..found.start()];
    }
    stem
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn file_stem(file: &str) -> &str {
    file.rsplit_once('.').map_or(file, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new(ResolverConfig::default())
    }

    #[test]
    fn test_normalize_strips_and_rewrites() {
        let r = resolver();
        assert_eq!(
            r.normalize(r"Materials\Models\Weapons\Customization\Paints\Custom\Asiimov_psd_2f1a3b4c.vtex"),
            "models/weapons/customization/paints/custom/asiimov.png"
        );
        assert_eq!(r.normalize("/textures/panorama/images/econ/x.tga"), "econ/x.png");
        assert_eq!(r.normalize("weapons/rif_ak47/ak47_color.tga"), "models/weapons/rif_ak47/ak47_color.png");
        assert_eq!(r.normalize("paints/a_0123456789abcdef_tga_deadbeef"), "paints/a.png");
        assert_eq!(r.normalize("noext"), "noext.png");
        assert_eq!(r.normalize(""), "");
    }

    #[test]
    fn test_normalize_trims_whitespace_exposed_by_stripping() {
        let r = resolver();
        assert_eq!(r.normalize("/ x.tga"), "x.png");
        assert_eq!(r.resolve("/ x.tga"), r.resolve("x.tga"));
    }

    #[test]
    fn test_normalize_collapses_dot_segments() {
        let r = resolver();
        assert_eq!(r.normalize("../../secret.tga"), "secret.png");
        assert_eq!(r.normalize("a/./b/../c.tga"), "a/c.png");
        assert_eq!(r.normalize("/textures/../../materials/x.vtex"), "x.png");
        assert!(r.resolve("../../x.tga").iter().all(|c| !c.contains("..")));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let r = resolver();
        for raw in [
            r"materials\models\weapons\customization\paints\custom\asiimov_psd_2f1a3b4c.vtex",
            "/textures/textures/materials/weapons/x.vtex_c",
            "foo.bar",
            "materials//panorama/images/y_0011223344556677.png",
            "_0123456789abcdef.png",
            "/ x.tga",
            "\" / materials/ y.tga \"",
            "../../a/./b/../c.tga",
            "x .tga",
        ] {
            let once = r.normalize(raw);
            assert_eq!(r.normalize(&once), once, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_resolve_candidates() {
        let r = resolver();
        let candidates = r.resolve("materials/models/weapons/customization/paints/custom/cu_ak47_asiimov.vtex");
        assert_eq!(
            candidates,
            vec![
                "/textures/models/weapons/customization/paints/custom/cu_ak47_asiimov.png".to_string(),
                "/textures/paints/custom/cu_ak47_asiimov.png".to_string(),
                "/textures/cu_ak47_asiimov.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_dedupes() {
        let r = resolver();
        assert_eq!(r.resolve("x.tga"), vec!["/textures/x.png".to_string(), "/textures/paints/vmats/x.png".to_string()]);
        assert!(r.resolve("").is_empty());
    }

    #[test]
    fn test_resolve_of_first_candidate_is_stable() {
        let r = resolver();
        for raw in ["materials/weapons/ak47.vtex", r"Paints\Custom\CU_Howl_png_0a0b0c0d.vtex", "plain.png"] {
            let first = r.resolve(raw);
            assert_eq!(r.resolve(&first[0]), first);
        }
    }

    #[test]
    fn test_mask_fallback() {
        let r = resolver();
        let def = MaterialDefinition::empty();
        assert_eq!(
            r.resolve_mask_fallback("/textures/paints/custom/cu_ak47_asiimov_mask.png", &def),
            Some("/textures/models/weapons/v_models/rif_ak47/rif_ak47_masks.png".to_string())
        );
        // Alias table, then substring scan
        assert_eq!(
            r.resolve_mask_fallback("/textures/howl_color.png", &def),
            Some("/textures/models/weapons/v_models/rif_m4a1/rif_m4a1_masks.png".to_string())
        );
        assert_eq!(
            r.resolve_mask_fallback("/textures/cu_awp_dragon_lore.png", &def),
            Some("/textures/models/weapons/v_models/snip_awp/snip_awp_masks.png".to_string())
        );
    }

    #[test]
    fn test_mask_fallback_uses_pattern_reference() {
        let r = resolver();
        let def = MaterialDefinition::empty().with_texture(Channel::Pattern, "materials/paints/custom/cu_deagle_aureus.vtex");
        assert_eq!(
            r.resolve_mask_fallback("/textures/unknown_mask.png", &def),
            Some("/textures/models/weapons/v_models/pist_deagle/pist_deagle_masks.png".to_string())
        );
    }

    #[test]
    fn test_mask_fallback_missing_step() {
        let r = resolver();
        assert_eq!(r.resolve_mask_fallback("/textures/hy_ddpat.png", &MaterialDefinition::empty()), None);

        let mut tables = LookupTables::default();
        tables.pattern_weapons.insert("cu_x".into(), "weapon_x".into());
        tables.weapon_model_folders.insert("weapon_x".into(), "rif_x".into());
        let partial = PathResolver::with_tables(ResolverConfig::default(), Arc::new(tables));
        assert_eq!(partial.resolve_mask_fallback("/textures/cu_x.png", &MaterialDefinition::empty()), None);
    }

    #[test]
    fn test_material_candidates() {
        let r = resolver();
        assert_eq!(
            r.material_candidates("cu_ak47_asiimov"),
            vec![
                ("/textures/custom/cu_ak47_asiimov.vmat".to_string(), FormatKind::Layered),
                ("/textures/vmats/cu_ak47_asiimov.vmat".to_string(), FormatKind::Layered),
                ("/textures/vmats/cu_ak47_asiimov.vcompmat".to_string(), FormatKind::Composite),
            ]
        );
        let unknown = r.material_candidates("Mystery.vmat");
        assert_eq!(unknown.len(), 2);
        assert_eq!(unknown[0].0, "/textures/vmats/mystery.vmat");
        assert!(r.material_candidates("  ").is_empty());
    }

    #[test]
    fn test_empty_base_dir() {
        let r = PathResolver::new(ResolverConfig::default().with_base_dir(""));
        assert_eq!(r.resolve("a.tga")[0], "/a.png");
    }
}
