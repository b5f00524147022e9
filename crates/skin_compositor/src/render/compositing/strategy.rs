//! Shading strategy selection
//!
//! Evaluated in precedence order; the first strategy whose conditions hold
//! is chosen:
//!
//! 1. advanced skin shader
//! 2. color mask shader
//! 3. direct pattern or color map
//! 4. solid fallback

use std::collections::BTreeMap;

use super::capabilities::Capabilities;
use crate::assets::materials::{Channel, MaterialDefinition};
use crate::assets::texture_cache::ResolvedTexture;
use crate::core::config::CompositingConfig;

/// Shading strategy for one material
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeDecision {
    /// Full paint-style blend with wear
    AdvancedSkinShader,
    /// Color slots blended through a mask, no pattern
    ColorMaskShader,
    /// A single texture used as the surface color
    DirectPatternOrColorMap {
        /// Channel supplying the color, pattern or color
        source: Channel,
    },
    /// Flat color
    SolidFallback {
        /// RGBA color
        color: [f32; 4],
    },
}

impl CompositeDecision {
    /// Texture slots the strategy can accept
    pub fn capabilities(&self) -> Capabilities {
        match self {
            CompositeDecision::AdvancedSkinShader => Capabilities::all(),
            CompositeDecision::ColorMaskShader => Capabilities::LIGHTING | Capabilities::COLOR_MASK,
            CompositeDecision::DirectPatternOrColorMap { .. } => Capabilities::LIGHTING,
            CompositeDecision::SolidFallback { .. } => Capabilities::empty(),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            CompositeDecision::AdvancedSkinShader => "advanced",
            CompositeDecision::ColorMaskShader => "color_mask",
            CompositeDecision::DirectPatternOrColorMap { .. } => "direct",
            CompositeDecision::SolidFallback { .. } => "solid",
        }
    }
}

/// Textures that resolved for a material, by channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSet {
    textures: BTreeMap<Channel, ResolvedTexture>,
}

impl ChannelSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the channels that resolved
    pub fn from_resolved(resolved: &BTreeMap<Channel, Option<ResolvedTexture>>) -> Self {
        let textures = resolved
            .iter()
            .filter_map(|(channel, texture)| texture.clone().map(|t| (*channel, t)))
            .collect();
        Self { textures }
    }

    /// Add or replace a channel
    pub fn with(mut self, channel: Channel, texture: ResolvedTexture) -> Self {
        self.textures.insert(channel, texture);
        self
    }

    /// Texture of a channel
    pub fn get(&self, channel: Channel) -> Option<&ResolvedTexture> {
        self.textures.get(&channel)
    }

    /// True when the channel resolved
    pub fn has(&self, channel: Channel) -> bool {
        self.textures.contains_key(&channel)
    }

    /// Number of resolved channels
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True when nothing resolved
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolved channels in channel order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &ResolvedTexture)> {
        self.textures.iter().map(|(c, t)| (*c, t))
    }
}

/// Number of color slots whose RGB differs from every earlier slot
pub fn distinct_color_count(colors: &[[f32; 4]], epsilon: f32) -> usize {
    let mut distinct: Vec<&[f32; 4]> = Vec::new();
    for color in colors {
        let same = |other: &&[f32; 4]| (0..3).all(|i| (color[i] - other[i]).abs() <= epsilon);
        if !distinct.iter().any(same) {
            distinct.push(color);
        }
    }
    distinct.len()
}

/// True when the mask resolved to a placeholder rather than a real mask
pub fn is_default_mask(mask: &ResolvedTexture, config: &CompositingConfig) -> bool {
    let stem = mask.file_stem();
    config.default_mask_names.iter().any(|name| name.eq_ignore_ascii_case(&stem))
}

/// Multiple distinct colors and no pattern
pub fn is_color_only(definition: &MaterialDefinition, channels: &ChannelSet, config: &CompositingConfig) -> bool {
    !channels.has(Channel::Pattern) && distinct_color_count(&definition.colors, config.color_epsilon) >= 2
}

/// Choose the shading strategy of a material
pub fn select(definition: &MaterialDefinition, channels: &ChannelSet, config: &CompositingConfig) -> CompositeDecision {
    if needs_advanced(definition, channels, config) {
        return CompositeDecision::AdvancedSkinShader;
    }

    if let Some(mask) = channels.get(Channel::Mask) {
        if is_color_only(definition, channels, config) && !is_default_mask(mask, config) {
            return CompositeDecision::ColorMaskShader;
        }
    }

    direct_or_solid(definition, channels, config)
}

/// The two strategies that cannot fail to construct
pub fn direct_or_solid(definition: &MaterialDefinition, channels: &ChannelSet, config: &CompositingConfig) -> CompositeDecision {
    for source in [Channel::Pattern, Channel::Color] {
        if channels.has(source) {
            return CompositeDecision::DirectPatternOrColorMap { source };
        }
    }
    let gray = config.neutral_gray;
    let color = definition.colors.first().copied().unwrap_or([gray, gray, gray, 1.0]);
    CompositeDecision::SolidFallback { color }
}

fn needs_advanced(definition: &MaterialDefinition, channels: &ChannelSet, config: &CompositingConfig) -> bool {
    if definition.paint_style().is_some() || definition.wear_amount().is_some() {
        return true;
    }
    if channels.has(Channel::Pattern) && channels.len() > 1 {
        return true;
    }
    // A color-only material whose mask is a placeholder still needs the full
    // blend; with a real mask the color mask shader covers it.
    if let Some(mask) = channels.get(Channel::Mask) {
        if is_color_only(definition, channels, config) && is_default_mask(mask, config) {
            return true;
        }
    }
    definition.feature_flags().any()
}
