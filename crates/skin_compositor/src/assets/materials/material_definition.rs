//! Parsed material description
//!
//! A [`MaterialDefinition`] is what both source grammars normalize to: channel
//! references, wrap state, an open parameter map and the color slots.

use std::collections::BTreeMap;
use std::fmt;

use crate::assets::image_loader::WrapMode;

/// Texture channels a skin material can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Base color / albedo
    Color,
    /// Paint pattern
    Pattern,
    /// Normal map
    Normal,
    /// Roughness map
    Roughness,
    /// Metalness map
    Metalness,
    /// Ambient occlusion map
    AmbientOcclusion,
    /// Paint region mask
    Mask,
    /// Wear (durability) map
    Wear,
    /// Grunge overlay
    Grunge,
    /// Glitter normal map
    GlitterNormal,
    /// Glitter mask
    GlitterMask,
}

impl Channel {
    /// Every channel, in resolution order
    pub const ALL: [Channel; 11] = [
        Channel::Color,
        Channel::Pattern,
        Channel::Normal,
        Channel::Roughness,
        Channel::Metalness,
        Channel::AmbientOcclusion,
        Channel::Mask,
        Channel::Wear,
        Channel::Grunge,
        Channel::GlitterNormal,
        Channel::GlitterMask,
    ];

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Channel::Color => "color",
            Channel::Pattern => "pattern",
            Channel::Normal => "normal",
            Channel::Roughness => "roughness",
            Channel::Metalness => "metalness",
            Channel::AmbientOcclusion => "ambient_occlusion",
            Channel::Mask => "mask",
            Channel::Wear => "wear",
            Channel::Grunge => "grunge",
            Channel::GlitterNormal => "glitter_normal",
            Channel::GlitterMask => "glitter_mask",
        }
    }

    /// Match a texture key suffix (`Color`, `AmbientOcclusion`, `Masks`, ...)
    ///
    /// Underscores are ignored and matching is case-insensitive.
    pub fn from_key_suffix(suffix: &str) -> Option<Channel> {
        let key: String = suffix
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let channel = match key.as_str() {
            "color" | "albedo" | "basecolor" | "basetexture" => Channel::Color,
            "pattern" => Channel::Pattern,
            "normal" | "normalmap" => Channel::Normal,
            "roughness" | "rough" => Channel::Roughness,
            "metalness" | "metal" | "metallic" => Channel::Metalness,
            "ambientocclusion" | "ao" => Channel::AmbientOcclusion,
            "mask" | "masks" => Channel::Mask,
            "wear" => Channel::Wear,
            "grunge" => Channel::Grunge,
            "glitternormal" => Channel::GlitterNormal,
            "glittermask" => Channel::GlitterMask,
            _ => return None,
        };
        Some(channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A numeric material parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Float parameter (`g_fl*`)
    Float(f32),
    /// Integer or flag parameter (`g_n*`, `g_b*`, `F_*`)
    Int(i64),
    /// Vector parameter (`g_v*`)
    Vector(Vec<f32>),
}

impl ParamValue {
    /// Scalar view: floats and ints convert, vectors yield their first component
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f32),
            ParamValue::Vector(v) => v.first().copied(),
        }
    }

    /// Integer view: floats are rounded
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.is_finite() => Some(v.round() as i64),
            _ => None,
        }
    }

    /// Vector view: scalars become one-element vectors
    pub fn as_vector(&self) -> Vec<f32> {
        match self {
            ParamValue::Vector(v) => v.clone(),
            ParamValue::Float(v) => vec![*v],
            ParamValue::Int(v) => vec![*v as f32],
        }
    }
}

/// Paint style enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// 0: flat color
    Solid,
    /// 1: hydrographic
    Hydrographic,
    /// 2: spray paint
    Spray,
    /// 3: anodized
    Anodized,
    /// 4: anodized multicolored
    AnodizedMulti,
    /// 5: custom paint job
    CustomPaint,
    /// 6: patina / antiqued
    Antiqued,
    /// 7: gunsmith
    Gunsmith,
    /// 8 and anything unknown: pattern tinted by the first color
    Fallback,
}

impl PaintStyle {
    /// Map the numeric enum; values outside 0–7 map to [`PaintStyle::Fallback`]
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => PaintStyle::Solid,
            1 => PaintStyle::Hydrographic,
            2 => PaintStyle::Spray,
            3 => PaintStyle::Anodized,
            4 => PaintStyle::AnodizedMulti,
            5 => PaintStyle::CustomPaint,
            6 => PaintStyle::Antiqued,
            7 => PaintStyle::Gunsmith,
            _ => PaintStyle::Fallback,
        }
    }

    /// Numeric value
    pub fn index(self) -> i64 {
        match self {
            PaintStyle::Solid => 0,
            PaintStyle::Hydrographic => 1,
            PaintStyle::Spray => 2,
            PaintStyle::Anodized => 3,
            PaintStyle::AnodizedMulti => 4,
            PaintStyle::CustomPaint => 5,
            PaintStyle::Antiqued => 6,
            PaintStyle::Gunsmith => 7,
            PaintStyle::Fallback => 8,
        }
    }
}

/// Well-known parameter names
pub mod param_names {
    /// Paint style (Source 2 feature flag form)
    pub const PAINT_STYLE_FLAG: &str = "F_PAINT_STYLE";
    /// Paint style (integer parameter form)
    pub const PAINT_STYLE: &str = "g_nPaintStyle";
    /// Paint roughness
    pub const PAINT_ROUGHNESS: &str = "g_flPaintRoughness";
    /// Wear amount
    pub const WEAR_AMOUNT: &str = "g_flWearAmount";
    /// Pattern UV scale
    pub const PATTERN_SCALE: &str = "g_flPatternTexCoordScale";
    /// Pattern UV rotation in degrees
    pub const PATTERN_ROTATION: &str = "g_flPatternTexCoordRotation";
    /// Pattern UV offset
    pub const PATTERN_OFFSET: &str = "g_vPatternTexCoordOffset";
    /// Brightness / contrast / saturation adjustment
    pub const COLOR_ADJUSTMENT: &str = "g_vColorAdjustment";
    /// Overlay blend mode
    pub const OVERLAY_BLEND_MODE: &str = "g_nOverlayBlendMode";
    /// Overlay strength
    pub const OVERLAY_STRENGTH: &str = "g_flOverlayStrength";
    /// Case hardening flag
    pub const CASE_HARDENING: &str = "F_CASE_HARDENING";
    /// Case hardening offset
    pub const CASE_HARDENING_OFFSET: &str = "g_vCaseHardeningOffset";
    /// Spraypaint halftone flag
    pub const SPRAYPAINT_HALFTONE: &str = "F_SPRAYPAINT_HALFTONE";
    /// Halftone dot scale
    pub const HALFTONE_SCALE: &str = "g_flHalftoneScale";
    /// Halftone dot softness
    pub const HALFTONE_SOFTNESS: &str = "g_flHalftoneSoftness";
    /// Pearlescence scale
    pub const PEARLESCENT_SCALE: &str = "g_flPearlescentScale";
    /// Wear remap window lower bound override
    pub const WEAR_REMAP_MIN: &str = "g_flWearRemapMin";
    /// Wear remap window upper bound override
    pub const WEAR_REMAP_MAX: &str = "g_flWearRemapMax";
    /// Wear edge softness override
    pub const WEAR_EDGE_SOFTNESS: &str = "g_flWearEdgeSoftness";
    /// Horizontal texture address mode
    pub const ADDRESS_MODE_U: &str = "g_nTextureAddressModeU";
    /// Vertical texture address mode
    pub const ADDRESS_MODE_V: &str = "g_nTextureAddressModeV";
    /// Flip the V coordinate
    pub const FLIP_Y: &str = "g_bFlipY";

    /// Per-color parameter name, e.g. `g_flColor2Roughness`
    pub fn per_color(index: usize, suffix: &str) -> String {
        format!("g_flColor{index}{suffix}")
    }
}

/// Optional feature flags gathered from the parameter map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Overlay blending is configured
    pub overlay: bool,
    /// Case hardening is enabled or offset
    pub case_hardening: bool,
    /// Spraypaint halftone is enabled
    pub halftone: bool,
    /// Any color slot carries its own roughness
    pub per_color_roughness: bool,
    /// Pearlescence is non-zero
    pub pearlescence: bool,
}

impl FeatureFlags {
    /// True when any flag is set
    pub fn any(&self) -> bool {
        self.overlay || self.case_hardening || self.halftone || self.per_color_roughness || self.pearlescence
    }
}

/// Material definition normalized from either source grammar
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    /// Channel references as found in the source
    pub textures: BTreeMap<Channel, String>,
    /// Wrap modes for U and V
    pub wrap: (WrapMode, WrapMode),
    /// Flip the V texture coordinate
    pub flip_y: bool,
    /// Every numeric parameter, keyed by source name
    pub params: BTreeMap<String, ParamValue>,
    /// Color slots in index order (at most four)
    pub colors: Vec<[f32; 4]>,
}

impl Default for MaterialDefinition {
    fn default() -> Self {
        Self::empty()
    }
}

impl MaterialDefinition {
    /// Maximum number of color slots
    pub const MAX_COLORS: usize = 4;

    /// Definition with no channels and no parameters
    pub fn empty() -> Self {
        Self {
            textures: BTreeMap::new(),
            wrap: (WrapMode::Repeat, WrapMode::Repeat),
            flip_y: false,
            params: BTreeMap::new(),
            colors: Vec::new(),
        }
    }

    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.params.is_empty() && self.colors.is_empty()
    }

    /// Channel reference, if present
    pub fn texture(&self, channel: Channel) -> Option<&str> {
        self.textures.get(&channel).map(String::as_str)
    }

    /// Set a channel reference
    pub fn with_texture(mut self, channel: Channel, path: impl Into<String>) -> Self {
        self.textures.insert(channel, path.into());
        self
    }

    /// Set a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Append a color slot (ignored beyond four)
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        if self.colors.len() < Self::MAX_COLORS {
            self.colors.push(color);
        }
        self
    }

    /// Raw parameter lookup
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Scalar parameter lookup
    pub fn float(&self, name: &str) -> Option<f32> {
        self.param(name).and_then(ParamValue::as_f32)
    }

    /// Integer parameter lookup
    pub fn int(&self, name: &str) -> Option<i64> {
        self.param(name).and_then(ParamValue::as_i64)
    }

    /// Paint style, `None` when unspecified
    pub fn paint_style(&self) -> Option<PaintStyle> {
        self.int(param_names::PAINT_STYLE_FLAG)
            .or_else(|| self.int(param_names::PAINT_STYLE))
            .map(PaintStyle::from_index)
    }

    /// Paint style with the unspecified case defaulted
    pub fn paint_style_or_default(&self) -> PaintStyle {
        self.paint_style().unwrap_or(PaintStyle::Fallback)
    }

    /// Paint roughness
    pub fn paint_roughness(&self) -> Option<f32> {
        self.float(param_names::PAINT_ROUGHNESS)
    }

    /// Wear amount clamped into `[0, 1]`
    pub fn wear_amount(&self) -> Option<f32> {
        self.float(param_names::WEAR_AMOUNT).map(|w| if w.is_nan() { w } else { w.clamp(0.0, 1.0) })
    }

    /// Pattern UV scale (default 1)
    pub fn pattern_scale(&self) -> f32 {
        self.float(param_names::PATTERN_SCALE).unwrap_or(1.0)
    }

    /// Pattern UV rotation in degrees (default 0)
    pub fn pattern_rotation(&self) -> f32 {
        self.float(param_names::PATTERN_ROTATION).unwrap_or(0.0)
    }

    /// Pattern UV offset (default zero)
    pub fn pattern_offset(&self) -> [f32; 2] {
        let v = self.param(param_names::PATTERN_OFFSET).map(ParamValue::as_vector).unwrap_or_default();
        [v.first().copied().unwrap_or(0.0), v.get(1).copied().unwrap_or(0.0)]
    }

    /// Brightness, contrast, saturation (default identity)
    pub fn color_adjustment(&self) -> [f32; 3] {
        let v = self.param(param_names::COLOR_ADJUSTMENT).map(ParamValue::as_vector).unwrap_or_default();
        [
            v.first().copied().unwrap_or(1.0),
            v.get(1).copied().unwrap_or(1.0),
            v.get(2).copied().unwrap_or(1.0),
        ]
    }

    /// Overlay blend mode
    pub fn overlay_blend_mode(&self) -> Option<i64> {
        self.int(param_names::OVERLAY_BLEND_MODE)
    }

    /// Overlay strength
    pub fn overlay_strength(&self) -> Option<f32> {
        self.float(param_names::OVERLAY_STRENGTH)
    }

    /// Case hardening offset
    pub fn case_hardening_offset(&self) -> Option<Vec<f32>> {
        self.param(param_names::CASE_HARDENING_OFFSET).map(ParamValue::as_vector)
    }

    /// Pearlescence scale
    pub fn pearlescent_scale(&self) -> Option<f32> {
        self.float(param_names::PEARLESCENT_SCALE)
    }

    /// Per-color values for `suffix` (`Roughness`, `Metalness`, `Durability`)
    pub fn per_color(&self, suffix: &str) -> [Option<f32>; 4] {
        std::array::from_fn(|i| self.float(&param_names::per_color(i, suffix)))
    }

    /// Per-color roughness
    pub fn per_color_roughness(&self) -> [Option<f32>; 4] {
        self.per_color("Roughness")
    }

    /// Per-color metalness
    pub fn per_color_metalness(&self) -> [Option<f32>; 4] {
        self.per_color("Metalness")
    }

    /// Per-color durability
    pub fn per_color_durability(&self) -> [Option<f32>; 4] {
        self.per_color("Durability")
    }

    /// Optional Source 2 features in use
    pub fn feature_flags(&self) -> FeatureFlags {
        let flag = |name: &str| self.int(name).is_some_and(|v| v != 0);
        FeatureFlags {
            overlay: self.overlay_blend_mode().is_some_and(|m| m != 0)
                || self.overlay_strength().is_some_and(|s| s > 0.0),
            case_hardening: flag(param_names::CASE_HARDENING)
                || self.case_hardening_offset().is_some_and(|o| o.iter().any(|v| *v != 0.0)),
            halftone: flag(param_names::SPRAYPAINT_HALFTONE),
            per_color_roughness: self.per_color_roughness().iter().any(Option::is_some),
            pearlescence: self.pearlescent_scale().is_some_and(|s| s != 0.0),
        }
    }
}
