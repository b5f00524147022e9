//! Layered material grammar (Format A)
//!
//! ```text
//! "Layer0"
//! {
//!     "shader"            "csgo_customweapon.vfx"
//!     "F_PAINT_STYLE"     "1"
//!     "g_tPattern"        "materials/models/weapons/customization/paints/custom/asiimov.vtex"
//!     "TextureNormal"     "materials/default/default_normal.tga"
//!     "g_flWearAmount"    "0.15"
//!     "g_vColor0"         "[0.9 0.9 0.9 1.0]"
//!     "Compiled Textures" { "g_tPattern" "materials/.../asiimov_psd_2f1a3b4c.vtex" }
//! }
//! ```
//!
//! Texture pairs and parameters may appear at any depth. Entries inside a
//! `Compiled Textures` block take precedence over the same channel elsewhere.

use super::keyvalues::{KvPair, KvValue};
use super::material_definition::Channel;
use super::material_parser::{classify_param, scalar, unwrap_resource, DefinitionBuilder};

const COMPILED_BLOCK: &str = "Compiled Textures";
const TEXTURE_PREFIXES: &[&str] = &["Texture", "g_t"];

/// Walk a layered document
pub(super) fn parse_layered(document: &[KvPair]) -> DefinitionBuilder {
    let mut builder = DefinitionBuilder::default();
    let mut compiled = Vec::new();
    visit(document, false, &mut builder, &mut compiled);

    for (channel, path) in compiled {
        builder.texture_override(channel, &path);
    }
    builder
}

fn visit(pairs: &[KvPair], in_compiled: bool, builder: &mut DefinitionBuilder, compiled: &mut Vec<(Channel, String)>) {
    for pair in pairs {
        if let KvValue::Block(children) = &pair.value {
            let nested = in_compiled || pair.key.eq_ignore_ascii_case(COMPILED_BLOCK);
            visit(children, nested, builder, compiled);
            continue;
        }
        let Some(text) = scalar(pair, builder) else { continue };

        if let Some(channel) = texture_channel(&pair.key) {
            let path = unwrap_resource(text);
            if in_compiled {
                if !compiled.iter().any(|(c, _)| *c == channel) {
                    compiled.push((channel, path.to_string()));
                }
            } else {
                builder.texture_first(channel, path);
            }
        } else if let Some(value) = classify_param(&pair.key, text) {
            builder.param(&pair.key, value);
        } else {
            log::trace!("Ignoring material key '{}'", pair.key);
        }
    }
}

/// Channel named by a `TextureX` / `g_tX` key
fn texture_channel(key: &str) -> Option<Channel> {
    TEXTURE_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))
        .and_then(Channel::from_key_suffix)
}
