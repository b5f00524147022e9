//! Static weapon and pattern lookup data
//!
//! Pure data consulted by the mask fallback. A small built-in sample is
//! available through [`LookupTables::builtin`]; complete tables are loaded
//! from TOML or RON through [`Config`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Weapon and pattern lookup tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    /// Pattern alias -> canonical pattern name
    pub pattern_aliases: BTreeMap<String, String>,
    /// Canonical pattern name -> weapon
    pub pattern_weapons: BTreeMap<String, String>,
    /// Name fragment -> canonical weapon, scanned longest fragment first
    pub weapon_aliases: BTreeMap<String, String>,
    /// Weapon -> model subfolder under `models/weapons/v_models`
    pub weapon_model_folders: BTreeMap<String, String>,
    /// Weapon -> mask file name
    pub weapon_mask_files: BTreeMap<String, String>,
}

impl Config for LookupTables {}

static BUILTIN: OnceLock<Arc<LookupTables>> = OnceLock::new();

fn table(rows: &[(&str, &str)]) -> BTreeMap<String, String> {
    rows.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

impl LookupTables {
    /// Shared built-in sample tables, initialised on first use
    pub fn builtin() -> Arc<LookupTables> {
        Arc::clone(BUILTIN.get_or_init(|| {
            log::debug!("Initialising built-in lookup tables");
            Arc::new(Self::sample())
        }))
    }

    fn sample() -> Self {
        let weapons: &[(&str, &str, &str)] = &[
            ("weapon_ak47", "rif_ak47", "rif_ak47_masks.png"),
            ("weapon_m4a1", "rif_m4a1", "rif_m4a1_masks.png"),
            ("weapon_m4a1_silencer", "rif_m4a1_s", "rif_m4a1_s_masks.png"),
            ("weapon_awp", "snip_awp", "snip_awp_masks.png"),
            ("weapon_deagle", "pist_deagle", "pist_deagle_masks.png"),
            ("weapon_glock", "pist_glock18", "pist_glock18_masks.png"),
            ("weapon_usp_silencer", "pist_223", "pist_223_masks.png"),
            ("weapon_famas", "rif_famas", "rif_famas_masks.png"),
            ("weapon_p90", "smg_p90", "smg_p90_masks.png"),
        ];
        Self {
            pattern_aliases: table(&[
                ("ak47_asiimov", "cu_ak47_asiimov"),
                ("awp_asiimov", "cu_awp_asiimov"),
                ("howl", "cu_m4a1_howling"),
                ("m4a4_howl", "cu_m4a1_howling"),
            ]),
            pattern_weapons: table(&[
                ("cu_ak47_asiimov", "weapon_ak47"),
                ("cu_awp_asiimov", "weapon_awp"),
                ("cu_m4a1_howling", "weapon_m4a1"),
                ("cu_deagle_aureus", "weapon_deagle"),
                ("aq_p90_storm", "weapon_p90"),
            ]),
            weapon_aliases: table(&[
                ("ak47", "weapon_ak47"),
                ("ak", "weapon_ak47"),
                ("m4a4", "weapon_m4a1"),
                ("m4a1", "weapon_m4a1"),
                ("m4a1s", "weapon_m4a1_silencer"),
                ("m4a1_silencer", "weapon_m4a1_silencer"),
                ("awp", "weapon_awp"),
                ("deagle", "weapon_deagle"),
                ("glock", "weapon_glock"),
                ("usp", "weapon_usp_silencer"),
                ("famas", "weapon_famas"),
                ("p90", "weapon_p90"),
            ]),
            weapon_model_folders: weapons.iter().map(|(w, f, _)| ((*w).to_string(), (*f).to_string())).collect(),
            weapon_mask_files: weapons.iter().map(|(w, _, m)| ((*w).to_string(), (*m).to_string())).collect(),
        }
    }

    /// Canonical name of a pattern token (the token itself when not aliased)
    pub fn canonical_pattern<'a>(&'a self, token: &'a str) -> &'a str {
        self.pattern_aliases.get(token).map_or(token, String::as_str)
    }

    /// Weapon a pattern belongs to
    ///
    /// Direct lookup first, then the first weapon alias contained in the
    /// token, longest alias first (ties alphabetically).
    pub fn weapon_for_pattern(&self, pattern: &str) -> Option<&str> {
        if let Some(weapon) = self.pattern_weapons.get(pattern) {
            return Some(weapon);
        }
        let mut aliases: Vec<(&String, &String)> = self.weapon_aliases.iter().collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        aliases
            .into_iter()
            .find(|(alias, _)| !alias.is_empty() && pattern.contains(alias.as_str()))
            .map(|(_, weapon)| weapon.as_str())
    }

    /// Model subfolder of a weapon
    pub fn model_folder(&self, weapon: &str) -> Option<&str> {
        self.weapon_model_folders.get(weapon).map(String::as_str)
    }

    /// Mask file name of a weapon
    pub fn mask_file(&self, weapon: &str) -> Option<&str> {
        self.weapon_mask_files.get(weapon).map(String::as_str)
    }

    /// Add every row of `other`, replacing rows with the same key
    pub fn merge(&mut self, other: LookupTables) {
        self.pattern_aliases.extend(other.pattern_aliases);
        self.pattern_weapons.extend(other.pattern_weapons);
        self.weapon_aliases.extend(other.weapon_aliases);
        self.weapon_model_folders.extend(other.weapon_model_folders);
        self.weapon_mask_files.extend(other.weapon_mask_files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_is_shared() {
        let a = LookupTables::builtin();
        let b = LookupTables::builtin();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.model_folder("weapon_ak47"), Some("rif_ak47"));
        assert_eq!(a.mask_file("weapon_ak47"), Some("rif_ak47_masks.png"));
    }

    #[test]
    fn test_weapon_for_pattern() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.weapon_for_pattern("cu_ak47_asiimov"), Some("weapon_ak47"));
        // Substring scan prefers the longest alias
        assert_eq!(tables.weapon_for_pattern("cu_m4a1s_printstream"), Some("weapon_m4a1_silencer"));
        assert_eq!(tables.weapon_for_pattern("gs_m4a1_vertigo"), Some("weapon_m4a1"));
        assert_eq!(tables.weapon_for_pattern("hy_ddpat"), None);
    }

    #[test]
    fn test_canonical_pattern() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.canonical_pattern("howl"), "cu_m4a1_howling");
        assert_eq!(tables.canonical_pattern("cu_unknown"), "cu_unknown");
    }

    #[test]
    fn test_merge_replaces_rows() {
        let mut tables = LookupTables::default();
        tables.weapon_model_folders.insert("weapon_x".into(), "old".into());
        let mut other = LookupTables::default();
        other.weapon_model_folders.insert("weapon_x".into(), "new".into());
        tables.merge(other);
        assert_eq!(tables.model_folder("weapon_x"), Some("new"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        let tables = LookupTables::builtin();
        tables.save_to_file(&path).unwrap();
        let loaded = LookupTables::load_from_file(&path).unwrap();
        assert_eq!(&loaded, tables.as_ref());
    }

    #[test]
    fn test_partial_file() {
        let tables = LookupTables::from_toml_str("[weapon_mask_files]\nweapon_x = \"x_masks.png\"\n").unwrap();
        assert_eq!(tables.mask_file("weapon_x"), Some("x_masks.png"));
        assert!(tables.pattern_aliases.is_empty());
    }
}
