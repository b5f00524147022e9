//! Material text parsing
//!
//! Two grammars share one tokenizer ([`super::keyvalues`]):
//! - layered materials (`.vmat`/`.vmt`), flat texture and parameter pairs
//! - composite materials (`.vcompmat`), texture records plus loose variables
//!
//! Parsing never fails from the caller's point of view: [`MaterialParser::parse`]
//! logs the reason and returns an empty definition. [`MaterialParser::try_parse`]
//! exposes the error.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use super::composite_parser;
use super::keyvalues::{self, KvPair};
use super::material_definition::{param_names, Channel, MaterialDefinition, ParamValue};
use super::vmat_parser;
use crate::assets::image_loader::WrapMode;

/// Material parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input is an HTML page (typically an error page served in place of the file)
    #[error("Input looks like HTML")]
    LooksLikeHtml,

    /// Braces do not balance
    #[error("Unbalanced braces")]
    UnbalancedBraces,

    /// A quoted string runs to end of input
    #[error("Unterminated string")]
    UnterminatedString,

    /// Token in an unexpected position
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    /// No key/value pairs were found
    #[error("No key/value pairs found")]
    Empty,
}

/// Source grammar of a material file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Flat layered material (Format A)
    Layered,
    /// Composite material with texture records (Format B)
    Composite,
}

impl FormatKind {
    /// Format from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vmat" | "vmt" => Some(FormatKind::Layered),
            "vcompmat" | "compmat" => Some(FormatKind::Composite),
            _ => None,
        }
    }

    /// Guess the format from the text itself
    ///
    /// Composite files are recognised by their record and loose-variable keys.
    pub fn detect(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        let composite_markers = ["m_vecloosevariables", "loose_variables", "m_strtextureruntimeresourcepath", "m_ptexture"];
        if composite_markers.iter().any(|m| lower.contains(m)) {
            FormatKind::Composite
        } else {
            FormatKind::Layered
        }
    }
}

/// Parser entry points
pub struct MaterialParser;

impl MaterialParser {
    /// Parse material text, returning an empty definition on failure
    pub fn parse(source: &str, format: FormatKind) -> MaterialDefinition {
        match Self::try_parse(source, format) {
            Ok(definition) => definition,
            Err(e) => {
                log::warn!("Material parse failed ({:?}): {}", format, e);
                MaterialDefinition::empty()
            }
        }
    }

    /// Parse material text
    pub fn try_parse(source: &str, format: FormatKind) -> Result<MaterialDefinition, ParseError> {
        if looks_like_html(source) {
            return Err(ParseError::LooksLikeHtml);
        }
        let document = keyvalues::parse_document(strip_header(source))?;
        let builder = match format {
            FormatKind::Layered => vmat_parser::parse_layered(&document),
            FormatKind::Composite => composite_parser::parse_composite(&document),
        };
        builder.finish()
    }
}

fn looks_like_html(source: &str) -> bool {
    let head: String = source.trim_start().chars().take(512).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.contains("<body") || head.contains("<head")
}

/// Drop a leading `<!-- ... -->` header line
fn strip_header(source: &str) -> &str {
    let trimmed = source.trim_start();
    if trimmed.starts_with("<!--") {
        if let Some(end) = trimmed.find("-->") {
            return &trimmed[end + 3..];
        }
    }
    source
}

/// Accumulates extracted values before they become a [`MaterialDefinition`]
#[derive(Debug, Default)]
pub(super) struct DefinitionBuilder {
    textures: BTreeMap<Channel, String>,
    params: BTreeMap<String, ParamValue>,
    pairs: usize,
}

impl DefinitionBuilder {
    /// Count a scalar key/value pair seen in the document
    pub(super) fn saw_pair(&mut self) {
        self.pairs += 1;
    }

    /// Record a texture; the first reference for a channel wins
    pub(super) fn texture_first(&mut self, channel: Channel, path: &str) {
        if !path.is_empty() {
            self.textures.entry(channel).or_insert_with(|| path.to_string());
        }
    }

    /// Record a texture, replacing an earlier reference
    pub(super) fn texture_override(&mut self, channel: Channel, path: &str) {
        if !path.is_empty() {
            self.textures.insert(channel, path.to_string());
        }
    }

    /// Record a parameter
    pub(super) fn param(&mut self, name: &str, value: ParamValue) {
        self.params.insert(name.to_string(), value);
    }

    /// Build the definition; errors when the document held no pairs at all
    pub(super) fn finish(self) -> Result<MaterialDefinition, ParseError> {
        if self.pairs == 0 {
            return Err(ParseError::Empty);
        }

        let mut definition = MaterialDefinition::empty();
        definition.colors = collect_colors(&self.params);

        let address_mode = |name: &str| {
            self.params
                .get(name)
                .and_then(ParamValue::as_i64)
                .map_or(WrapMode::Repeat, WrapMode::from_index)
        };
        definition.wrap = (
            address_mode(param_names::ADDRESS_MODE_U),
            address_mode(param_names::ADDRESS_MODE_V),
        );
        definition.flip_y = self
            .params
            .get(param_names::FLIP_Y)
            .and_then(ParamValue::as_i64)
            .is_some_and(|v| v != 0);

        definition.textures = self.textures;
        definition.params = self.params;
        Ok(definition)
    }
}

/// `g_vColor0..3` in index order
///
/// Colors written in the 0-255 range are scaled down; a missing alpha is opaque.
fn collect_colors(params: &BTreeMap<String, ParamValue>) -> Vec<[f32; 4]> {
    (0..MaterialDefinition::MAX_COLORS)
        .filter_map(|i| params.get(&format!("g_vColor{i}")))
        .map(|value| {
            let v = value.as_vector();
            let mut color = [
                v.first().copied().unwrap_or(0.0),
                v.get(1).copied().unwrap_or(0.0),
                v.get(2).copied().unwrap_or(0.0),
                v.get(3).copied().unwrap_or(1.0),
            ];
            if color[..3].iter().any(|c| *c > 1.0) {
                let alpha_missing = v.len() < 4;
                for c in &mut color {
                    *c /= 255.0;
                }
                if alpha_missing {
                    color[3] = 1.0;
                }
            }
            color
        })
        .collect()
}

/// Kind of parameter implied by a name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParamKind {
    Float,
    Int,
    Vector,
}

const PARAM_PREFIXES: &[(&str, ParamKind)] = &[
    ("g_fl", ParamKind::Float),
    ("g_n", ParamKind::Int),
    ("g_b", ParamKind::Int),
    ("F_", ParamKind::Int),
    ("g_v", ParamKind::Vector),
];

/// Parameter kind for a name, if it follows the naming convention
pub(super) fn param_kind(name: &str) -> Option<ParamKind> {
    PARAM_PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

/// Parse `text` as a parameter of the given kind
pub(super) fn parse_param(kind: ParamKind, text: &str) -> Option<ParamValue> {
    match kind {
        ParamKind::Float => parse_float(text).map(ParamValue::Float),
        ParamKind::Int => parse_int(text).map(ParamValue::Int),
        ParamKind::Vector => {
            let values = parse_vector(text);
            (!values.is_empty()).then_some(ParamValue::Vector(values))
        }
    }
}

/// Classify a `name value` pair by naming convention
pub(super) fn classify_param(name: &str, text: &str) -> Option<ParamValue> {
    parse_param(param_kind(name)?, text)
}

fn parse_float(text: &str) -> Option<f32> {
    let text = text.trim();
    text.parse::<f32>()
        .ok()
        .or_else(|| parse_vector(text).first().copied())
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    match text.to_ascii_lowercase().as_str() {
        "true" => return Some(1),
        "false" => return Some(0),
        _ => {}
    }
    text.parse::<i64>()
        .ok()
        .or_else(|| parse_float(text).filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

/// Parse `[a b c]`, `a b c` or `a, b, c`
pub(super) fn parse_vector(text: &str) -> Vec<f32> {
    let inner = text.trim().trim_start_matches(['[', '(']).trim_end_matches([']', ')']);
    inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map_while(|s| s.parse::<f32>().ok())
        .collect()
}

/// Unwrap `resource:"path"` and `resource_name:"path"` values
pub(super) fn unwrap_resource(text: &str) -> &str {
    let text = text.trim();
    match text.find(":\"") {
        Some(idx) if text.ends_with('"') && text.len() > idx + 2 => &text[idx + 2..text.len() - 1],
        _ => text.trim_matches('"'),
    }
}

/// Text value of a scalar pair, counting it towards the pair total
pub(super) fn scalar<'a>(pair: &'a KvPair, builder: &mut DefinitionBuilder) -> Option<&'a str> {
    let text = pair.text()?;
    builder.saw_pair();
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FormatKind::from_path("paints/custom/cu_ak47_asiimov.vmat"), Some(FormatKind::Layered));
        assert_eq!(FormatKind::from_path("old/material.VMT"), Some(FormatKind::Layered));
        assert_eq!(FormatKind::from_path("vmats/x.vcompmat"), Some(FormatKind::Composite));
        assert_eq!(FormatKind::from_path("x.png"), None);
        assert_eq!(FormatKind::from_path("noext"), None);
    }

    #[test]
    fn test_format_detect() {
        assert_eq!(FormatKind::detect("\"Layer0\" { \"g_tColor\" \"a.vtex\" }"), FormatKind::Layered);
        assert_eq!(FormatKind::detect("root { m_vecLooseVariables { } }"), FormatKind::Composite);
    }

    #[test]
    fn test_html_is_rejected() {
        let html = "<!DOCTYPE html><html><body>404 Not Found</body></html>";
        assert_eq!(MaterialParser::try_parse(html, FormatKind::Layered), Err(ParseError::LooksLikeHtml));
        assert!(MaterialParser::parse(html, FormatKind::Composite).is_empty());
    }

    #[test]
    fn test_kv3_header_is_skipped() {
        let text = "<!-- kv3 encoding:text:version{e21c7f3c} -->\n{ g_flWearAmount = 0.25 }";
        let def = MaterialParser::try_parse(text, FormatKind::Layered).unwrap();
        assert_relative_eq!(def.wear_amount().unwrap(), 0.25);
    }

    #[test]
    fn test_unbalanced_and_empty() {
        assert_eq!(MaterialParser::try_parse("a { b 1", FormatKind::Layered), Err(ParseError::UnbalancedBraces));
        assert_eq!(MaterialParser::try_parse("", FormatKind::Layered), Err(ParseError::Empty));
        assert_eq!(MaterialParser::try_parse("a { }", FormatKind::Composite), Err(ParseError::Empty));
        assert!(MaterialParser::parse("a { b 1", FormatKind::Layered).is_empty());
    }

    #[test]
    fn test_param_classification() {
        assert_eq!(classify_param("g_flWearAmount", "0.5"), Some(ParamValue::Float(0.5)));
        assert_eq!(classify_param("g_nPaintStyle", "3"), Some(ParamValue::Int(3)));
        assert_eq!(classify_param("g_bFlipY", "true"), Some(ParamValue::Int(1)));
        assert_eq!(classify_param("F_PAINT_STYLE", "1.0"), Some(ParamValue::Int(1)));
        assert_eq!(classify_param("g_vColor0", "[0.5 0.25 1.0 1.0]"), Some(ParamValue::Vector(vec![0.5, 0.25, 1.0, 1.0])));
        assert_eq!(classify_param("g_vPatternTexCoordOffset", "0.1, 0.2"), Some(ParamValue::Vector(vec![0.1, 0.2])));
        assert_eq!(classify_param("shader", "csgo_weapon.vfx"), None);
        assert_eq!(classify_param("g_flWearAmount", "abc"), None);
    }

    #[test]
    fn test_unwrap_resource() {
        assert_eq!(unwrap_resource(r#"resource:"materials/a.vtex""#), "materials/a.vtex");
        assert_eq!(unwrap_resource(r#"resource_name:"materials/b.vtex""#), "materials/b.vtex");
        assert_eq!(unwrap_resource("materials/c.vtex"), "materials/c.vtex");
    }

    #[test]
    fn test_colors_in_255_range() {
        let mut params = BTreeMap::new();
        params.insert("g_vColor1".to_string(), ParamValue::Vector(vec![0.0, 0.0, 1.0]));
        params.insert("g_vColor0".to_string(), ParamValue::Vector(vec![255.0, 0.0, 51.0]));
        let colors = collect_colors(&params);
        assert_eq!(colors.len(), 2);
        assert_relative_eq!(colors[0][0], 1.0);
        assert_relative_eq!(colors[0][2], 0.2);
        assert_relative_eq!(colors[0][3], 1.0);
        assert_eq!(colors[1], [0.0, 0.0, 1.0, 1.0]);
    }
}
