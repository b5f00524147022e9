//! Strategy selection and shader construction

use super::color::{BlendMode, ColorAdjustment};
use super::paint_style::color_slots;
use super::shader::{
    AdvancedShader, ColorMaskShader, DirectShader, LightingMaps, Overlay, SolidShader, SurfaceParams,
    SurfaceShader,
};
use super::strategy::{self, ChannelSet, CompositeDecision};
use super::uv::UvTransform;
use super::wear::WearModel;
use super::CompositeError;
use crate::assets::materials::{Channel, MaterialDefinition};
use crate::core::config::CompositingConfig;
use crate::foundation::math::utils::saturate;

/// Chooses and builds surface models
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositingConfig,
}

impl Compositor {
    /// Compositor with the given constants
    pub fn new(config: CompositingConfig) -> Self {
        Self { config }
    }

    /// Compositing constants
    pub fn config(&self) -> &CompositingConfig {
        &self.config
    }

    /// Choose the shading strategy for a material
    pub fn select(&self, definition: &MaterialDefinition, channels: &ChannelSet) -> CompositeDecision {
        strategy::select(definition, channels, &self.config)
    }

    /// Build the shader for a material, falling back until one succeeds
    ///
    /// Advanced and color mask construction may fail; the direct and solid
    /// strategies are tried next. A solid shader is always produced last.
    pub fn build(&self, definition: &MaterialDefinition, channels: &ChannelSet) -> SurfaceShader {
        let decision = self.select(definition, channels);
        match self.try_build(&decision, definition, channels) {
            Ok(shader) => return shader,
            Err(e) => log::warn!("Cannot build {} shader, falling back: {}", decision.name(), e),
        }

        let fallback = strategy::direct_or_solid(definition, channels, &self.config);
        match self.try_build(&fallback, definition, channels) {
            Ok(shader) => shader,
            Err(e) => {
                log::warn!("Cannot build {} shader, using solid color: {}", fallback.name(), e);
                self.solid(definition)
            }
        }
    }

    /// Build the shader for a specific strategy
    pub fn try_build(
        &self,
        decision: &CompositeDecision,
        definition: &MaterialDefinition,
        channels: &ChannelSet,
    ) -> Result<SurfaceShader, CompositeError> {
        let shader = match decision {
            CompositeDecision::AdvancedSkinShader => {
                SurfaceShader::Advanced(Box::new(self.advanced(definition, channels)?))
            }
            CompositeDecision::ColorMaskShader => SurfaceShader::ColorMask(self.color_mask(definition, channels)?),
            CompositeDecision::DirectPatternOrColorMap { source } => {
                SurfaceShader::Direct(self.direct(*source, definition, channels)?)
            }
            CompositeDecision::SolidFallback { color } => {
                if color.iter().any(|v| !v.is_finite()) {
                    return Err(CompositeError::InvalidParameter("non-finite solid color".to_string()));
                }
                SurfaceShader::Solid(SolidShader { color: *color, surface: self.surface_or_default(definition) })
            }
        };
        log::debug!("Built {} shader", decision.name());
        Ok(shader)
    }

    fn advanced(&self, definition: &MaterialDefinition, channels: &ChannelSet) -> Result<AdvancedShader, CompositeError> {
        check_colors(definition)?;
        let wear = WearModel::from_definition(
            definition,
            &self.config,
            channels.get(Channel::Wear),
            channels.get(Channel::Grunge),
        )?;
        let surface = self.surface(definition)?;
        Ok(AdvancedShader {
            style: definition.paint_style_or_default(),
            colors: color_slots(&definition.colors),
            transform: UvTransform::from_definition(definition)?,
            base: channels.get(Channel::Color).cloned(),
            pattern: channels.get(Channel::Pattern).cloned(),
            mask: channels.get(Channel::Mask).cloned(),
            lighting: LightingMaps::from_channels(channels),
            overlay: overlay(definition)?,
            wear,
            per_color_roughness: self.per_color(definition.per_color_roughness(), surface.roughness),
            per_color_metalness: self.per_color(definition.per_color_metalness(), surface.metalness),
            per_color_durability: self.per_color(definition.per_color_durability(), 0.0),
            neutral_gray: self.config.neutral_gray,
            surface,
        })
    }

    fn color_mask(&self, definition: &MaterialDefinition, channels: &ChannelSet) -> Result<ColorMaskShader, CompositeError> {
        check_colors(definition)?;
        let mask = channels.get(Channel::Mask).ok_or(CompositeError::MissingChannel(Channel::Mask))?;
        if mask.image.is_degenerate() {
            return Err(CompositeError::MissingChannel(Channel::Mask));
        }
        let surface = self.surface(definition)?;
        Ok(ColorMaskShader {
            colors: color_slots(&definition.colors),
            mask: mask.clone(),
            lighting: LightingMaps::from_channels(channels),
            per_color_roughness: self.per_color(definition.per_color_roughness(), surface.roughness),
            per_color_metalness: self.per_color(definition.per_color_metalness(), surface.metalness),
            surface,
        })
    }

    fn direct(
        &self,
        source: Channel,
        definition: &MaterialDefinition,
        channels: &ChannelSet,
    ) -> Result<DirectShader, CompositeError> {
        let texture = channels.get(source).ok_or(CompositeError::MissingChannel(source))?;
        let transform = UvTransform::from_definition(definition).unwrap_or_else(|e| {
            log::debug!("Ignoring pattern transform for direct shader: {}", e);
            UvTransform::default()
        });
        Ok(DirectShader {
            source,
            texture: texture.clone(),
            transform,
            lighting: LightingMaps::from_channels(channels),
            surface: self.surface_or_default(definition),
        })
    }

    fn solid(&self, definition: &MaterialDefinition) -> SurfaceShader {
        let gray = self.config.neutral_gray;
        let color = definition
            .colors
            .first()
            .copied()
            .filter(|c| c.iter().all(|v| v.is_finite()))
            .unwrap_or([gray, gray, gray, 1.0]);
        SurfaceShader::Solid(SolidShader { color, surface: self.surface_or_default(definition) })
    }

    fn surface(&self, definition: &MaterialDefinition) -> Result<SurfaceParams, CompositeError> {
        let roughness = definition.paint_roughness().unwrap_or(self.config.default_paint_roughness);
        let metalness = self.config.default_paint_metalness;
        let adjustment = ColorAdjustment::from_array(definition.color_adjustment());
        let values = [roughness, metalness, adjustment.brightness, adjustment.contrast, adjustment.saturation];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CompositeError::InvalidParameter("non-finite surface parameter".to_string()));
        }
        Ok(SurfaceParams { roughness, metalness, adjustment, wrap: definition.wrap, flip_y: definition.flip_y })
    }

    /// Surface settings that cannot fail: invalid values are replaced by defaults
    fn surface_or_default(&self, definition: &MaterialDefinition) -> SurfaceParams {
        self.surface(definition).unwrap_or_else(|_| SurfaceParams {
            roughness: self.config.default_paint_roughness,
            metalness: self.config.default_paint_metalness,
            adjustment: ColorAdjustment::IDENTITY,
            wrap: definition.wrap,
            flip_y: definition.flip_y,
        })
    }

    /// Fill unset per-color values; `None` when no slot sets one
    fn per_color(&self, values: [Option<f32>; 4], fallback: f32) -> Option<[f32; 4]> {
        values.iter().any(Option::is_some).then(|| values.map(|v| v.unwrap_or(fallback)))
    }
}

fn overlay(definition: &MaterialDefinition) -> Result<Option<Overlay>, CompositeError> {
    if !definition.feature_flags().overlay {
        return Ok(None);
    }
    let strength = definition.overlay_strength().unwrap_or(1.0);
    if !strength.is_finite() {
        return Err(CompositeError::InvalidParameter(format!("overlay strength {strength}")));
    }
    Ok(Some(Overlay {
        mode: BlendMode::from_index(definition.overlay_blend_mode().unwrap_or(0)),
        strength: saturate(strength),
    }))
}

fn check_colors(definition: &MaterialDefinition) -> Result<(), CompositeError> {
    if definition.colors.iter().flatten().any(|v| !v.is_finite()) {
        return Err(CompositeError::InvalidParameter("non-finite color slot".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::image_loader::{ImageData, SamplerSettings, WrapMode};
    use crate::assets::materials::{param_names, ParamValue};
    use crate::assets::texture_cache::ResolvedTexture;
    use crate::foundation::math::{Vec2, Vec3};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn texture(path: &str, rgba: [u8; 4]) -> ResolvedTexture {
        ResolvedTexture {
            canonical_path: path.to_string(),
            image: Arc::new(ImageData::solid_color(4, 4, rgba)),
            sampler: SamplerSettings::default(),
        }
    }

    fn red_solid_style() -> MaterialDefinition {
        MaterialDefinition::empty()
            .with_param(param_names::PAINT_STYLE, ParamValue::Int(0))
            .with_color([1.0, 0.0, 0.0, 1.0])
    }

    #[test]
    fn test_solid_style_shades_color_zero() {
        let channels = ChannelSet::new()
            .with(Channel::Pattern, texture("/textures/p.png", [10, 200, 30, 128]))
            .with(Channel::Color, texture("/textures/c.png", [90, 90, 90, 255]));
        let shader = Compositor::default().build(&red_solid_style(), &channels);
        assert_eq!(shader.decision(), CompositeDecision::AdvancedSkinShader);
        for uv in [Vec2::new(0.1, 0.1), Vec2::new(0.5, 0.9)] {
            assert_eq!(shader.shade(uv).color, Vec3::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_zero_wear_leaves_paint_untouched() {
        let worn = red_solid_style().with_param(param_names::WEAR_AMOUNT, ParamValue::Float(0.0));
        let channels = ChannelSet::new().with(Channel::Wear, texture("/textures/wear.png", [0, 0, 0, 255]));
        let shader = Compositor::default().build(&worn, &channels);
        let sample = shader.shade(Vec2::new(0.5, 0.5));
        assert_eq!(sample.color, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(sample.roughness, CompositingConfig::default().default_paint_roughness);
    }

    #[test]
    fn test_full_wear_reveals_metal() {
        let worn = red_solid_style().with_param(param_names::WEAR_AMOUNT, ParamValue::Float(1.0));
        let channels = ChannelSet::new().with(Channel::Wear, texture("/textures/wear.png", [0, 0, 0, 255]));
        let sample = Compositor::default().build(&worn, &channels).shade(Vec2::new(0.5, 0.5));
        let config = CompositingConfig::default();
        assert_relative_eq!(sample.metalness, config.worn_metalness);
        assert!(sample.color.x < 0.5);
    }

    #[test]
    fn test_invalid_advanced_falls_back_to_direct() {
        let def = MaterialDefinition::empty()
            .with_param(param_names::PAINT_STYLE, ParamValue::Int(1))
            .with_param(param_names::PATTERN_SCALE, ParamValue::Float(0.0));
        let channels = ChannelSet::new().with(Channel::Pattern, texture("/textures/p.png", [255, 0, 0, 255]));
        let compositor = Compositor::default();
        assert_eq!(compositor.select(&def, &channels), CompositeDecision::AdvancedSkinShader);

        let shader = compositor.build(&def, &channels);
        assert_eq!(shader.decision(), CompositeDecision::DirectPatternOrColorMap { source: Channel::Pattern });
        assert_eq!(shader.shade(Vec2::new(0.5, 0.5)).color, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_huge_pattern_scale_still_shades() {
        let def = MaterialDefinition::empty()
            .with_param(param_names::PAINT_STYLE, ParamValue::Int(1))
            .with_param(param_names::PATTERN_SCALE, ParamValue::Float(1e30));
        let channels = ChannelSet::new().with(Channel::Pattern, texture("/textures/p.png", [0, 255, 0, 255]));
        let shader = Compositor::default().build(&def, &channels);
        assert_eq!(shader.decision(), CompositeDecision::AdvancedSkinShader);

        let sample = shader.shade(Vec2::new(0.9, 0.9));
        assert!(sample.color.iter().all(|c| c.is_finite()));
        assert_eq!(shader.bake(4, 4).size_bytes(), 4 * 4 * 4);
    }

    #[test]
    fn test_overlay_blends_pattern_over_paint() {
        let channels = ChannelSet::new().with(Channel::Pattern, texture("/textures/p.png", [0, 255, 0, 255]));
        let plain = Compositor::default().build(&red_solid_style(), &channels);
        assert_relative_eq!(plain.shade(Vec2::new(0.5, 0.5)).color, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);

        // Multiply red by green at half strength
        let def = red_solid_style()
            .with_param(param_names::OVERLAY_BLEND_MODE, ParamValue::Int(1))
            .with_param(param_names::OVERLAY_STRENGTH, ParamValue::Float(0.5));
        let shader = Compositor::default().build(&def, &channels);
        assert_relative_eq!(shader.shade(Vec2::new(0.5, 0.5)).color, Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-6);

        let broken = def.with_param(param_names::OVERLAY_STRENGTH, ParamValue::Float(f32::INFINITY));
        let fallback = Compositor::default().build(&broken, &channels);
        assert_eq!(fallback.decision(), CompositeDecision::DirectPatternOrColorMap { source: Channel::Pattern });
    }

    #[test]
    fn test_per_color_durability_protects_masked_color() {
        let def = MaterialDefinition::empty()
            .with_param(param_names::PAINT_STYLE, ParamValue::Int(4))
            .with_param(param_names::WEAR_AMOUNT, ParamValue::Float(1.0))
            .with_color([1.0, 0.0, 0.0, 1.0])
            .with_color([0.0, 0.0, 1.0, 1.0]);
        let channels = ChannelSet::new()
            .with(Channel::Mask, texture("/textures/am_mask_real.png", [255, 0, 0, 255]))
            .with(Channel::Wear, texture("/textures/wear.png", [0, 0, 0, 255]));
        let config = CompositingConfig::default();

        let worn = Compositor::default().build(&def, &channels).shade(Vec2::new(0.5, 0.5));
        assert_relative_eq!(worn.metalness, config.worn_metalness);

        // The mask selects color 1, which is fully durable
        let durable = def.with_param(param_names::per_color(1, "Durability"), ParamValue::Float(1.0));
        let kept = Compositor::default().build(&durable, &channels).shade(Vec2::new(0.5, 0.5));
        assert_relative_eq!(kept.color, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(kept.metalness, config.default_paint_metalness);
    }

    #[test]
    fn test_inverted_wear_window_falls_back_to_solid() {
        let def = red_solid_style()
            .with_param(param_names::WEAR_AMOUNT, ParamValue::Float(0.5))
            .with_param(param_names::WEAR_REMAP_MIN, ParamValue::Float(0.9))
            .with_param(param_names::WEAR_REMAP_MAX, ParamValue::Float(0.1));
        let channels = ChannelSet::new().with(Channel::Wear, texture("/textures/wear.png", [0, 0, 0, 255]));
        let shader = Compositor::default().build(&def, &channels);
        assert_eq!(shader.decision(), CompositeDecision::SolidFallback { color: [1.0, 0.0, 0.0, 1.0] });
    }

    #[test]
    fn test_non_finite_color_yields_gray_solid() {
        let def = MaterialDefinition::empty()
            .with_param(param_names::PAINT_STYLE, ParamValue::Int(0))
            .with_color([f32::NAN, 0.0, 0.0, 1.0]);
        let shader = Compositor::default().build(&def, &ChannelSet::new());
        assert_eq!(shader.decision(), CompositeDecision::SolidFallback { color: [0.5, 0.5, 0.5, 1.0] });
    }

    #[test]
    fn test_color_mask_shading() {
        let def = MaterialDefinition::empty()
            .with_color([1.0, 0.0, 0.0, 1.0])
            .with_color([0.0, 0.0, 1.0, 1.0])
            .with_param(param_names::per_color(1, "Roughness"), ParamValue::Float(0.1));
        let channels = ChannelSet::new().with(Channel::Mask, texture("/textures/am_mask_real.png", [255, 0, 0, 255]));
        let compositor = Compositor::default();
        assert_eq!(compositor.select(&def, &channels), CompositeDecision::AdvancedSkinShader);

        // Without per-color roughness the color mask shader is chosen
        let plain = MaterialDefinition::empty().with_color([1.0, 0.0, 0.0, 1.0]).with_color([0.0, 0.0, 1.0, 1.0]);
        let shader = compositor.build(&plain, &channels);
        assert_eq!(shader.decision(), CompositeDecision::ColorMaskShader);
        assert_eq!(shader.shade(Vec2::new(0.5, 0.5)).color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_solid_fallback_gray() {
        let shader = Compositor::default().build(&MaterialDefinition::empty(), &ChannelSet::new());
        assert_eq!(shader.shade(Vec2::new(0.2, 0.2)).color, Vec3::repeat(0.5));
    }

    #[test]
    fn test_bake() {
        let shader = Compositor::default().build(&red_solid_style(), &ChannelSet::new());
        let image = shader.bake(3, 2);
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.size_bytes(), 3 * 2 * 4);
        assert_eq!(image.pixel(2, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn test_bindings_follow_capabilities() {
        let mut def = MaterialDefinition::empty();
        def.wrap = (WrapMode::Clamp, WrapMode::Mirror);
        let channels = ChannelSet::new()
            .with(Channel::Pattern, texture("/textures/p.png", [255, 0, 0, 255]))
            .with(Channel::Mask, texture("/textures/m.png", [255, 0, 0, 255]))
            .with(Channel::Normal, texture("/textures/n.png", [128, 128, 255, 255]));

        let direct = Compositor::default()
            .try_build(&CompositeDecision::DirectPatternOrColorMap { source: Channel::Pattern }, &def, &channels)
            .unwrap();
        let bound: Vec<Channel> = direct.bindings(&channels).iter().map(|b| b.channel).collect();
        assert_eq!(bound, vec![Channel::Pattern, Channel::Normal]);

        let pattern = direct.bindings(&channels).into_iter().find(|b| b.channel == Channel::Pattern).unwrap();
        assert_eq!(pattern.texture.sampler.wrap_u, WrapMode::Clamp);
        assert_eq!(pattern.texture.sampler.wrap_v, WrapMode::Mirror);
        // The set the bindings came from keeps its own sampler
        assert_eq!(channels.get(Channel::Pattern).unwrap().sampler.wrap_u, WrapMode::Repeat);

        let solid = Compositor::default().build(&MaterialDefinition::empty(), &ChannelSet::new());
        assert!(solid.bindings(&channels).is_empty());
    }
}
