//! Surface models produced by the compositor
//!
//! Each [`SurfaceShader`] variant is the CPU form of one shading strategy.
//! `shade` evaluates a single texture coordinate, `bake` rasterizes the whole
//! surface and `bindings` lists the textures a GPU backend should bind.

use super::capabilities::Capabilities;
use super::color::{BlendMode, ColorAdjustment};
use super::paint_style::{self, cascade_colors, cascade_scalars, PaintInputs};
use super::strategy::{ChannelSet, CompositeDecision};
use super::uv::UvTransform;
use super::wear::WearModel;
use crate::assets::image_loader::{ImageData, WrapMode};
use crate::assets::materials::{Channel, PaintStyle};
use crate::assets::texture_cache::ResolvedTexture;
use crate::foundation::math::utils::{rgb, saturate};
use crate::foundation::math::{Vec2, Vec3, Vec4};

/// Result of shading one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedSample {
    /// Linear RGB
    pub color: Vec3,
    /// Perceptual roughness
    pub roughness: f32,
    /// Metalness
    pub metalness: f32,
}

impl ShadedSample {
    fn clamped(self) -> Self {
        Self {
            color: self.color.map(saturate),
            roughness: saturate(self.roughness),
            metalness: saturate(self.metalness),
        }
    }
}

/// A texture assigned to a shader slot
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Slot
    pub channel: Channel,
    /// Texture with the slot's sampler applied
    pub texture: ResolvedTexture,
}

/// Settings every surface model shares
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceParams {
    /// Roughness where no map or per-color value applies
    pub roughness: f32,
    /// Metalness where no map or per-color value applies
    pub metalness: f32,
    /// Final color adjustment
    pub adjustment: ColorAdjustment,
    /// Material wrap modes, applied to pattern-space slots
    pub wrap: (WrapMode, WrapMode),
    /// Flip V before sampling
    pub flip_y: bool,
}

impl SurfaceParams {
    fn orient(&self, uv: Vec2) -> Vec2 {
        if self.flip_y {
            Vec2::new(uv.x, 1.0 - uv.y)
        } else {
            uv
        }
    }

    fn finish(&self, sample: ShadedSample) -> ShadedSample {
        ShadedSample { color: self.adjustment.apply(&sample.color), ..sample }.clamped()
    }
}

/// Optional roughness, metalness and ambient occlusion maps
#[derive(Debug, Clone, Default)]
pub struct LightingMaps {
    /// Roughness map (red channel)
    pub roughness: Option<ResolvedTexture>,
    /// Metalness map (red channel)
    pub metalness: Option<ResolvedTexture>,
    /// Ambient occlusion map (red channel)
    pub ambient_occlusion: Option<ResolvedTexture>,
}

impl LightingMaps {
    /// Collect the lighting maps that resolved
    pub fn from_channels(channels: &ChannelSet) -> Self {
        Self {
            roughness: channels.get(Channel::Roughness).cloned(),
            metalness: channels.get(Channel::Metalness).cloned(),
            ambient_occlusion: channels.get(Channel::AmbientOcclusion).cloned(),
        }
    }

    fn apply(&self, mut sample: ShadedSample, uv: Vec2) -> ShadedSample {
        if let Some(map) = &self.roughness {
            sample.roughness = map.sample(uv).x;
        }
        if let Some(map) = &self.metalness {
            sample.metalness = map.sample(uv).x;
        }
        if let Some(map) = &self.ambient_occlusion {
            sample.color *= map.sample(uv).x;
        }
        sample
    }
}

/// Pattern blended over the painted color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    /// Blend mode
    pub mode: BlendMode,
    /// Opacity in `[0, 1]`
    pub strength: f32,
}

/// Full paint-style blend with wear
#[derive(Debug, Clone)]
pub struct AdvancedShader {
    /// Paint style
    pub style: PaintStyle,
    /// Color slots
    pub colors: [Vec3; 4],
    /// Pattern coordinate transform
    pub transform: UvTransform,
    /// Base color map
    pub base: Option<ResolvedTexture>,
    /// Pattern map
    pub pattern: Option<ResolvedTexture>,
    /// Color mask
    pub mask: Option<ResolvedTexture>,
    /// Lighting maps
    pub lighting: LightingMaps,
    /// Pattern overlay on top of the paint style
    pub overlay: Option<Overlay>,
    /// Wear, when the material is worn
    pub wear: Option<WearModel>,
    /// Per-color roughness, cascaded through the mask
    pub per_color_roughness: Option<[f32; 4]>,
    /// Per-color metalness, cascaded through the mask
    pub per_color_metalness: Option<[f32; 4]>,
    /// Per-color wear durability, cascaded through the mask
    pub per_color_durability: Option<[f32; 4]>,
    /// Gray standing in for a missing base map
    pub neutral_gray: f32,
    /// Shared settings
    pub surface: SurfaceParams,
}

impl AdvancedShader {
    fn shade(&self, uv: Vec2) -> ShadedSample {
        let uv = self.surface.orient(uv);
        let pattern_uv = self.transform.apply(uv);

        let base = self
            .base
            .as_ref()
            .map_or_else(|| Vec3::repeat(self.neutral_gray), |t| rgb(&t.sample(uv)));
        let pattern = self
            .pattern
            .as_ref()
            .map_or_else(|| Vec4::repeat(1.0), |t| t.sample(pattern_uv));
        let mask = self.mask.as_ref().map_or_else(Vec3::zeros, |t| rgb(&t.sample(uv)));

        let inputs = PaintInputs { base, pattern, mask, colors: self.colors };
        let mut color = paint_style::blend(self.style, &inputs);
        if let (Some(overlay), Some(_)) = (&self.overlay, &self.pattern) {
            color = overlay.mode.apply_with_opacity(&color, &rgb(&pattern), overlay.strength);
        }

        let cascades = self.style == PaintStyle::AnodizedMulti;
        let per_color = |values: &Option<[f32; 4]>, fallback: f32| match values {
            Some(values) if cascades => cascade_scalars(values, &mask),
            _ => fallback,
        };
        let mut sample = ShadedSample {
            color,
            roughness: per_color(&self.per_color_roughness, self.surface.roughness),
            metalness: per_color(&self.per_color_metalness, self.surface.metalness),
        };
        sample = self.lighting.apply(sample, uv);
        if let Some(wear) = &self.wear {
            let durability = per_color(&self.per_color_durability, 0.0);
            sample = wear.apply(sample, &base, uv, &self.transform, durability);
        }
        self.surface.finish(sample)
    }
}

/// Color slots blended through a mask
#[derive(Debug, Clone)]
pub struct ColorMaskShader {
    /// Color slots
    pub colors: [Vec3; 4],
    /// Color mask
    pub mask: ResolvedTexture,
    /// Lighting maps
    pub lighting: LightingMaps,
    /// Per-color roughness
    pub per_color_roughness: Option<[f32; 4]>,
    /// Per-color metalness
    pub per_color_metalness: Option<[f32; 4]>,
    /// Shared settings
    pub surface: SurfaceParams,
}

impl ColorMaskShader {
    fn shade(&self, uv: Vec2) -> ShadedSample {
        let uv = self.surface.orient(uv);
        let mask = rgb(&self.mask.sample(uv));
        let sample = ShadedSample {
            color: cascade_colors(&self.colors, &mask),
            roughness: self
                .per_color_roughness
                .map_or(self.surface.roughness, |values| cascade_scalars(&values, &mask)),
            metalness: self
                .per_color_metalness
                .map_or(self.surface.metalness, |values| cascade_scalars(&values, &mask)),
        };
        self.surface.finish(self.lighting.apply(sample, uv))
    }
}

/// One texture used as the surface color
#[derive(Debug, Clone)]
pub struct DirectShader {
    /// Channel the texture came from
    pub source: Channel,
    /// Color source
    pub texture: ResolvedTexture,
    /// Coordinate transform (pattern sources only)
    pub transform: UvTransform,
    /// Lighting maps
    pub lighting: LightingMaps,
    /// Shared settings
    pub surface: SurfaceParams,
}

impl DirectShader {
    fn shade(&self, uv: Vec2) -> ShadedSample {
        let uv = self.surface.orient(uv);
        let sample_uv = if self.source == Channel::Pattern { self.transform.apply(uv) } else { uv };
        let sample = ShadedSample {
            color: rgb(&self.texture.sample(sample_uv)),
            roughness: self.surface.roughness,
            metalness: self.surface.metalness,
        };
        self.surface.finish(self.lighting.apply(sample, uv))
    }
}

/// Flat color
#[derive(Debug, Clone)]
pub struct SolidShader {
    /// RGBA color
    pub color: [f32; 4],
    /// Shared settings
    pub surface: SurfaceParams,
}

impl SolidShader {
    fn shade(&self) -> ShadedSample {
        let [r, g, b, _] = self.color;
        self.surface.finish(ShadedSample {
            color: Vec3::new(r, g, b),
            roughness: self.surface.roughness,
            metalness: self.surface.metalness,
        })
    }
}

/// A materialized shading strategy
#[derive(Debug, Clone)]
pub enum SurfaceShader {
    /// Paint-style blend with wear
    Advanced(Box<AdvancedShader>),
    /// Mask-driven color blend
    ColorMask(ColorMaskShader),
    /// Single texture
    Direct(DirectShader),
    /// Flat color
    Solid(SolidShader),
}

impl SurfaceShader {
    /// Strategy this shader implements
    pub fn decision(&self) -> CompositeDecision {
        match self {
            SurfaceShader::Advanced(_) => CompositeDecision::AdvancedSkinShader,
            SurfaceShader::ColorMask(_) => CompositeDecision::ColorMaskShader,
            SurfaceShader::Direct(direct) => CompositeDecision::DirectPatternOrColorMap { source: direct.source },
            SurfaceShader::Solid(solid) => CompositeDecision::SolidFallback { color: solid.color },
        }
    }

    /// Texture slots this shader accepts
    pub fn capabilities(&self) -> Capabilities {
        self.decision().capabilities()
    }

    fn surface(&self) -> &SurfaceParams {
        match self {
            SurfaceShader::Advanced(s) => &s.surface,
            SurfaceShader::ColorMask(s) => &s.surface,
            SurfaceShader::Direct(s) => &s.surface,
            SurfaceShader::Solid(s) => &s.surface,
        }
    }

    /// Shade one texture coordinate
    pub fn shade(&self, uv: Vec2) -> ShadedSample {
        match self {
            SurfaceShader::Advanced(s) => s.shade(uv),
            SurfaceShader::ColorMask(s) => s.shade(uv),
            SurfaceShader::Direct(s) => s.shade(uv),
            SurfaceShader::Solid(s) => s.shade(),
        }
    }

    /// Rasterize the color of the surface, sampling pixel centers
    pub fn bake(&self, width: u32, height: u32) -> ImageData {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let uv = Vec2::new((x as f32 + 0.5) / width as f32, (y as f32 + 0.5) / height as f32);
                let color = self.shade(uv).color;
                data.extend(color.iter().map(|c| (saturate(*c) * 255.0).round() as u8));
                data.push(255);
            }
        }
        ImageData { data, width, height, channels: 4 }
    }

    /// Textures to bind, restricted to the slots this shader accepts
    ///
    /// Pattern-space slots (pattern, wear, grunge) take the material's wrap
    /// modes; the cached textures are left untouched.
    pub fn bindings(&self, channels: &ChannelSet) -> Vec<TextureBinding> {
        let capabilities = self.capabilities();
        let (wrap_u, wrap_v) = self.surface().wrap;
        let direct_source = match self {
            SurfaceShader::Direct(direct) => Some(direct.source),
            _ => None,
        };

        channels
            .iter()
            .filter(|(channel, _)| Some(*channel) == direct_source || capabilities.accepts(*channel))
            .map(|(channel, texture)| {
                let texture = match channel {
                    Channel::Pattern | Channel::Wear | Channel::Grunge => texture.clone().with_wrap(wrap_u, wrap_v),
                    _ => texture.clone(),
                };
                TextureBinding { channel, texture }
            })
            .collect()
    }
}
