//! Pattern name to paint subfolder heuristic

/// Test applied to a lowercased pattern name
#[derive(Debug, Clone, Copy)]
pub enum FolderPredicate {
    /// Name contains the substring
    Contains(&'static str),
    /// Name starts with the prefix
    Prefix(&'static str),
}

impl FolderPredicate {
    fn matches(self, name: &str) -> bool {
        match self {
            FolderPredicate::Contains(needle) => name.contains(needle),
            FolderPredicate::Prefix(prefix) => name.starts_with(prefix),
        }
    }
}

/// One `(predicate, folder)` row
#[derive(Debug, Clone, Copy)]
pub struct FolderRule {
    /// Test applied to the pattern name
    pub predicate: FolderPredicate,
    /// Folder chosen on match
    pub folder: &'static str,
}

const fn prefix(prefix: &'static str, folder: &'static str) -> FolderRule {
    FolderRule { predicate: FolderPredicate::Prefix(prefix), folder }
}

/// Folder used when no rule matches
pub const DEFAULT_FOLDER: &str = "vmats";

/// Ordered rules, evaluated top to bottom
pub const FOLDER_RULES: &[FolderRule] = &[
    FolderRule { predicate: FolderPredicate::Contains("workshop"), folder: "workshop" },
    FolderRule { predicate: FolderPredicate::Contains("community"), folder: "workshop" },
    prefix("cu_", "custom"),
    prefix("aa_", "anodized_air"),
    prefix("am_", "anodized_multi"),
    prefix("aq_", "antiqued"),
    prefix("gs_", "gunsmith"),
    prefix("hy_", "hydrographic"),
    prefix("sp_", "spray"),
    prefix("so_", "solid_colors"),
    prefix("gv_", "gloves"),
    prefix("sh_", "shared"),
    prefix("ws_", "workshop"),
];

/// Likely paint subfolder for a pattern name
pub fn folder_of(pattern: &str) -> &'static str {
    let name = pattern.to_ascii_lowercase();
    FOLDER_RULES
        .iter()
        .find(|rule| rule.predicate.matches(&name))
        .map_or(DEFAULT_FOLDER, |rule| rule.folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(folder_of("cu_ak47_asiimov"), "custom");
        assert_eq!(folder_of("aa_flames"), "anodized_air");
        assert_eq!(folder_of("am_crumple"), "anodized_multi");
        assert_eq!(folder_of("aq_steel"), "antiqued");
        assert_eq!(folder_of("gs_m4a1_vertigo"), "gunsmith");
        assert_eq!(folder_of("hy_ddpat"), "hydrographic");
        assert_eq!(folder_of("sp_tape"), "spray");
        assert_eq!(folder_of("so_red"), "solid_colors");
        assert_eq!(folder_of("gv_anything"), "gloves");
        assert_eq!(folder_of("sh_noise"), "shared");
        assert_eq!(folder_of("ws_dragon"), "workshop");
    }

    #[test]
    fn test_special_cases_come_first() {
        assert_eq!(folder_of("cu_workshop_entry"), "workshop");
        assert_eq!(folder_of("community_22_skin"), "workshop");
    }

    #[test]
    fn test_case_insensitive_and_default() {
        assert_eq!(folder_of("CU_Howl"), "custom");
        assert_eq!(folder_of("unknownprefix_x"), "vmats");
        assert_eq!(folder_of(""), "vmats");
    }
}
