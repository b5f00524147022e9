//! Channel inference for composite texture records
//!
//! Composite materials name their textures freely (`PatternTexture`,
//! `g_tRoughness_Layer1`, `SkinMasks`, ...), so the channel is inferred from
//! an ordered keyword table. The first matching rule wins, which makes the
//! order significant: glitter rules sit ahead of the plain normal and mask
//! rules they would otherwise be swallowed by.

use super::material_definition::Channel;

/// How a rule compares against the lowercased text
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any keyword occurs as a substring
    Contains(&'static [&'static str]),
    /// The whole text equals a keyword
    Exact(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Contains(keywords) => keywords.iter().any(|k| text.contains(k)),
            Matcher::Exact(keywords) => keywords.iter().any(|k| text == *k),
        }
    }
}

/// One row of the inference table
#[derive(Debug, Clone, Copy)]
pub struct ChannelRule {
    /// Keyword matcher
    pub matcher: Matcher,
    /// Channel assigned on match
    pub channel: Channel,
}

/// Ordered inference rules
pub const CHANNEL_RULES: &[ChannelRule] = &[
    ChannelRule { matcher: Matcher::Contains(&["glitternormal", "glitter_normal"]), channel: Channel::GlitterNormal },
    ChannelRule { matcher: Matcher::Contains(&["glittermask", "glitter_mask"]), channel: Channel::GlitterMask },
    ChannelRule { matcher: Matcher::Contains(&["pattern"]), channel: Channel::Pattern },
    ChannelRule { matcher: Matcher::Contains(&["normal"]), channel: Channel::Normal },
    ChannelRule { matcher: Matcher::Contains(&["rough"]), channel: Channel::Roughness },
    ChannelRule { matcher: Matcher::Contains(&["metal"]), channel: Channel::Metalness },
    ChannelRule { matcher: Matcher::Contains(&["wear"]), channel: Channel::Wear },
    ChannelRule { matcher: Matcher::Contains(&["mask", "pearlescence"]), channel: Channel::Mask },
    ChannelRule { matcher: Matcher::Contains(&["ambientocclusion", "ambient_occlusion", "ao"]), channel: Channel::AmbientOcclusion },
    ChannelRule { matcher: Matcher::Contains(&["grunge"]), channel: Channel::Grunge },
    ChannelRule { matcher: Matcher::Contains(&["albedo"]), channel: Channel::Color },
    ChannelRule { matcher: Matcher::Exact(&["color", "g_tcolor", "texturecolor"]), channel: Channel::Color },
];

/// First rule matching `text`, if any
pub fn match_rules(text: &str) -> Option<Channel> {
    let text = text.to_ascii_lowercase();
    CHANNEL_RULES
        .iter()
        .find(|rule| rule.matcher.matches(&text))
        .map(|rule| rule.channel)
}

/// Infer the channel of a texture record
///
/// The logical name is tried first, then the file name of the resolved path.
/// Records matching neither default to [`Channel::Pattern`].
pub fn infer_channel(name: &str, path: &str) -> Channel {
    match_rules(name)
        .or_else(|| match_rules(file_name(path)))
        .unwrap_or(Channel::Pattern)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
