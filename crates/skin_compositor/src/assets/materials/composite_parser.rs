//! Composite material grammar (Format B)
//!
//! ```text
//! {
//!     m_vecTextures =
//!     {
//!         { m_strName = "PatternTexture" m_pTexture = resource:"materials/x/asiimov.vtex" }
//!     }
//!     m_vecLooseVariables =
//!     {
//!         { m_strName = "g_flWearAmount" m_flValue = 0.15 }
//!         g_nPaintStyle 5
//!     }
//! }
//! ```
//!
//! A texture record is any block carrying both a name key and a resource
//! path key. Its channel comes from [`super::channel_rules`].

use super::channel_rules::infer_channel;
use super::keyvalues::{find_text, KvPair, KvValue};
use super::material_parser::{
    classify_param, param_kind, parse_param, unwrap_resource, DefinitionBuilder, ParamKind,
};

const NAME_KEYS: &[&str] = &["m_strName", "name", "m_strTextureName"];
const PATH_KEYS: &[&str] = &[
    "m_pTexture",
    "m_strTexture",
    "m_strTextureRuntimeResourcePath",
    "m_pTextureValue",
    "m_strTextureValue",
    "path",
];
const LOOSE_BLOCK_KEYS: &[&str] = &["m_vecLooseVariables", "loose_variables"];

/// Record value keys and the parameter kind each implies
const VALUE_KEYS: &[(&str, ParamKind)] = &[
    ("m_flValue", ParamKind::Float),
    ("m_nValue", ParamKind::Int),
    ("m_bValue", ParamKind::Int),
    ("m_vValue", ParamKind::Vector),
    ("m_cValue", ParamKind::Vector),
];

/// Walk a composite document
pub(super) fn parse_composite(document: &[KvPair]) -> DefinitionBuilder {
    let mut builder = DefinitionBuilder::default();
    visit(document, &mut builder);
    builder
}

fn visit(pairs: &[KvPair], builder: &mut DefinitionBuilder) {
    for pair in pairs {
        match &pair.value {
            KvValue::Block(children) if is_loose_block(&pair.key) => loose_variables(children, builder),
            KvValue::Block(children) => {
                if !texture_record(children, builder) {
                    visit(children, builder);
                }
            }
            KvValue::Text(_) => {
                // Scalars outside records count towards the document but carry nothing
                builder.saw_pair();
            }
        }
    }
}

fn is_loose_block(key: &str) -> bool {
    LOOSE_BLOCK_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
}

/// Record a texture if `children` form a texture record
fn texture_record(children: &[KvPair], builder: &mut DefinitionBuilder) -> bool {
    let (Some(name), Some(path)) = (find_text(children, NAME_KEYS), find_text(children, PATH_KEYS)) else {
        return false;
    };
    count_scalars(children, builder);
    let path = unwrap_resource(path);
    let channel = infer_channel(name, path);
    log::trace!("Texture record '{}' -> {} ({})", name, channel, path);
    builder.texture_first(channel, path);
    true
}

fn loose_variables(children: &[KvPair], builder: &mut DefinitionBuilder) {
    for pair in children {
        match &pair.value {
            KvValue::Text(text) => {
                builder.saw_pair();
                if let Some(value) = classify_param(&pair.key, text) {
                    builder.param(&pair.key, value);
                } else if pair.key.starts_with("g_t") {
                    let path = unwrap_resource(text);
                    builder.texture_first(infer_channel(&pair.key, path), path);
                }
            }
            KvValue::Block(record) => loose_record(record, builder),
        }
    }
}

fn loose_record(record: &[KvPair], builder: &mut DefinitionBuilder) {
    if texture_record(record, builder) {
        return;
    }
    let Some(name) = find_text(record, NAME_KEYS) else { return };
    count_scalars(record, builder);

    let value = VALUE_KEYS.iter().find_map(|(key, kind)| {
        let text = find_text(record, &[key])?;
        // The name prefix wins when it disagrees with the value key
        parse_param(param_kind(name).unwrap_or(*kind), text)
    });
    match value {
        Some(value) => builder.param(name, value),
        None => log::trace!("Loose variable '{}' has no usable value", name),
    }
}

fn count_scalars(children: &[KvPair], builder: &mut DefinitionBuilder) {
    for pair in children.iter().filter(|pair| pair.text().is_some()) {
        builder.saw_pair();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::materials::material_definition::{Channel, MaterialDefinition, PaintStyle, ParamValue};
    use crate::assets::materials::material_parser::{FormatKind, MaterialParser, ParseError};
    use approx::assert_relative_eq;

    const COMPOSITE: &str = r#"
<!-- kv3 encoding:text:version{e21c7f3c-8a33-41c5-9977-a76d3a32aa0d} format:generic:version{7412167c-06e9-4698-aff2-e63eb59037e7} -->
{
    m_vecTextures =
    {
        {
            m_strName = "PatternTexture"
            m_pTexture = resource:"materials/models/weapons/customization/paints/custom/asiimov_psd_2f1a3b4c.vtex"
        }
        {
            m_strName = "Layer1"
            m_pTexture = resource:"materials/models/weapons/customization/rif_ak47/rif_ak47_normal.vtex"
        }
        {
            m_strName = "SecondPattern"
            m_pTexture = resource:"materials/other.vtex"
        }
    }
    m_vecLooseVariables =
    {
        { m_strName = "g_flWearAmount" m_flValue = 0.3 }
        { m_strName = "g_nPaintStyle" m_nValue = 7 }
        { m_strName = "g_vColor0" m_vValue = [ 0.5, 0.5, 0.5, 1.0 ] }
        { m_strName = "g_tGrunge" m_strTextureRuntimeResourcePath = resource:"materials/grunge/grunge.vtex" }
        g_flPaintRoughness 0.4
        g_tWear "materials/wear/wear_default.vtex"
    }
}
"#;

    fn parse(text: &str) -> MaterialDefinition {
        MaterialParser::try_parse(text, FormatKind::Composite).unwrap()
    }

    #[test]
    fn test_texture_records() {
        let def = parse(COMPOSITE);
        assert_eq!(
            def.texture(Channel::Pattern),
            Some("materials/models/weapons/customization/paints/custom/asiimov_psd_2f1a3b4c.vtex")
        );
        assert_eq!(
            def.texture(Channel::Normal),
            Some("materials/models/weapons/customization/rif_ak47/rif_ak47_normal.vtex")
        );
        assert_eq!(def.texture(Channel::Grunge), Some("materials/grunge/grunge.vtex"));
        assert_eq!(def.texture(Channel::Wear), Some("materials/wear/wear_default.vtex"));
    }

    #[test]
    fn test_loose_variables() {
        let def = parse(COMPOSITE);
        assert_relative_eq!(def.wear_amount().unwrap(), 0.3);
        assert_eq!(def.paint_style(), Some(PaintStyle::Gunsmith));
        assert_eq!(def.colors, vec![[0.5, 0.5, 0.5, 1.0]]);
        assert_eq!(def.param("g_flPaintRoughness"), Some(&ParamValue::Float(0.4)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(COMPOSITE), parse(COMPOSITE));
    }

    #[test]
    fn test_simple_record_keys() {
        let def = parse(r#"root { tex { name "Roughness" path "materials/r.vtex" } loose_variables { g_flWearAmount "0.5" } }"#);
        assert_eq!(def.texture(Channel::Roughness), Some("materials/r.vtex"));
        assert_relative_eq!(def.wear_amount().unwrap(), 0.5);
    }

    #[test]
    fn test_record_without_path_is_not_a_texture() {
        let def = parse(r#"root { tex { name "Roughness" } }"#);
        assert!(def.textures.is_empty());
    }

    #[test]
    fn test_stray_scalars_make_document_non_empty() {
        let def = MaterialParser::try_parse(r#"root { meta { version "3" } }"#, FormatKind::Composite).unwrap();
        assert!(def.textures.is_empty());
        assert!(def.params.is_empty());
    }

    #[test]
    fn test_no_pairs_is_empty() {
        assert_eq!(MaterialParser::try_parse("root { a { } }", FormatKind::Composite), Err(ParseError::Empty));
    }
}
