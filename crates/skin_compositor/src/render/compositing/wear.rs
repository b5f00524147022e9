//! Wear simulation
//!
//! Paint is worn away where the wear texture falls below a threshold taken
//! from the wear amount. Worn areas show bare metal: dark, rough and metallic.

use super::color::mix;
use super::uv::UvTransform;
use super::{CompositeError, ShadedSample};
use crate::assets::materials::{param_names, MaterialDefinition};
use crate::assets::texture_cache::ResolvedTexture;
use crate::core::config::CompositingConfig;
use crate::foundation::math::utils::{lerp, saturate, smoothstep};
use crate::foundation::math::{Vec2, Vec3};

/// Wear parameters plus the textures they sample
#[derive(Debug, Clone)]
pub struct WearModel {
    /// Wear amount in `(0, 1]`
    pub amount: f32,
    /// Lower end of the threshold window
    pub remap_min: f32,
    /// Upper end of the threshold window
    pub remap_max: f32,
    /// Half-width of the smoothstep edge
    pub softness: f32,
    /// Grunge contribution to the mask
    pub grunge_influence: f32,
    /// Bare metal color
    pub bare_metal: Vec3,
    /// How much the base color tints bare metal
    pub bare_tint: f32,
    /// Roughness of fully worn areas
    pub worn_roughness: f32,
    /// Metalness of fully worn areas
    pub worn_metalness: f32,
    wear: ResolvedTexture,
    grunge: Option<ResolvedTexture>,
}

impl WearModel {
    /// Build the wear model of a material
    ///
    /// Returns `Ok(None)` when there is nothing to wear: no wear texture or a
    /// wear amount of zero. Material overrides of the window take precedence
    /// over `config`.
    pub fn from_definition(
        definition: &MaterialDefinition,
        config: &CompositingConfig,
        wear: Option<&ResolvedTexture>,
        grunge: Option<&ResolvedTexture>,
    ) -> Result<Option<Self>, CompositeError> {
        let Some(wear) = wear else { return Ok(None) };
        let amount = definition.wear_amount().unwrap_or(0.0);
        if amount.is_nan() {
            return Err(CompositeError::InvalidParameter("wear amount is NaN".to_string()));
        }
        if amount <= 0.0 {
            return Ok(None);
        }

        let model = Self {
            amount,
            remap_min: definition.float(param_names::WEAR_REMAP_MIN).unwrap_or(config.wear_remap_min),
            remap_max: definition.float(param_names::WEAR_REMAP_MAX).unwrap_or(config.wear_remap_max),
            softness: definition.float(param_names::WEAR_EDGE_SOFTNESS).unwrap_or(config.wear_edge_softness),
            grunge_influence: config.grunge_influence,
            bare_metal: Vec3::from(config.bare_metal_color),
            bare_tint: config.bare_tint,
            worn_roughness: config.worn_roughness,
            worn_metalness: config.worn_metalness,
            wear: wear.clone(),
            grunge: grunge.cloned(),
        };
        model.validate()?;
        Ok(Some(model))
    }

    fn validate(&self) -> Result<(), CompositeError> {
        let values = [self.remap_min, self.remap_max, self.softness, self.grunge_influence];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CompositeError::InvalidParameter("non-finite wear parameter".to_string()));
        }
        if self.remap_min > self.remap_max {
            return Err(CompositeError::InvalidParameter(format!(
                "inverted wear window [{}, {}]",
                self.remap_min, self.remap_max
            )));
        }
        if self.softness < 0.0 {
            return Err(CompositeError::InvalidParameter(format!("wear softness {}", self.softness)));
        }
        Ok(())
    }

    /// Wear amount seen by paint of the given durability
    ///
    /// Durability is in `[0, 1]`; fully durable paint does not wear.
    pub fn effective_amount(&self, durability: f32) -> f32 {
        self.amount * (1.0 - saturate(durability))
    }

    /// Threshold the wear sample is compared against
    pub fn threshold(&self, durability: f32) -> f32 {
        lerp(self.remap_min, self.remap_max, self.effective_amount(durability))
    }

    /// Wear mask at a pattern-space coordinate; 1 is fully worn
    pub fn mask(&self, pattern_uv: Vec2, durability: f32) -> f32 {
        let amount = self.effective_amount(durability);
        if amount <= 0.0 {
            return 0.0;
        }
        let t = self.threshold(durability);
        let resistance = self.wear.sample(pattern_uv).x;
        let mut mask = 1.0 - smoothstep(t - self.softness, t + self.softness, resistance);
        if let Some(grunge) = &self.grunge {
            mask += grunge.sample(pattern_uv).x * amount * self.grunge_influence;
        }
        saturate(mask)
    }

    /// Move a shaded sample toward bare metal by the wear mask
    pub fn apply(
        &self,
        sample: ShadedSample,
        base: &Vec3,
        uv: Vec2,
        transform: &UvTransform,
        durability: f32,
    ) -> ShadedSample {
        let mask = self.mask(transform.apply(uv), durability);
        if mask <= 0.0 {
            return sample;
        }
        let bare = mix(&self.bare_metal, base, self.bare_tint);
        ShadedSample {
            color: mix(&sample.color, &bare, mask),
            roughness: lerp(sample.roughness, self.worn_roughness, mask),
            metalness: lerp(sample.metalness, self.worn_metalness, mask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::image_loader::{ImageData, SamplerSettings};
    use crate::assets::materials::ParamValue;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn texture(value: u8) -> ResolvedTexture {
        ResolvedTexture {
            canonical_path: "/textures/wear.png".to_string(),
            image: Arc::new(ImageData::solid_color(2, 2, [value, value, value, 255])),
            sampler: SamplerSettings::default(),
        }
    }

    fn worn(amount: f32) -> MaterialDefinition {
        MaterialDefinition::empty().with_param(param_names::WEAR_AMOUNT, ParamValue::Float(amount))
    }

    fn painted() -> ShadedSample {
        ShadedSample { color: Vec3::new(1.0, 0.0, 0.0), roughness: 0.4, metalness: 0.0 }
    }

    #[test]
    fn test_zero_wear_is_a_no_op() {
        let config = CompositingConfig::default();
        for value in [0, 128, 255] {
            let wear = texture(value);
            let model = WearModel::from_definition(&worn(0.0), &config, Some(&wear), None).unwrap();
            assert!(model.is_none());
        }
        let no_amount = WearModel::from_definition(&MaterialDefinition::empty(), &config, Some(&texture(0)), None);
        assert!(no_amount.unwrap().is_none());
    }

    #[test]
    fn test_missing_wear_texture() {
        let model = WearModel::from_definition(&worn(0.8), &CompositingConfig::default(), None, None).unwrap();
        assert!(model.is_none());
    }

    #[test]
    fn test_fully_worn_pixel_is_bare_metal() {
        let config = CompositingConfig::default();
        let wear = texture(0);
        let model = WearModel::from_definition(&worn(1.0), &config, Some(&wear), None).unwrap().unwrap();
        let uv = Vec2::new(0.5, 0.5);
        assert_relative_eq!(model.mask(uv, 0.0), 1.0);

        let base = Vec3::repeat(0.5);
        let out = model.apply(painted(), &base, uv, &UvTransform::default(), 0.0);
        let bare = mix(&Vec3::from(config.bare_metal_color), &base, config.bare_tint);
        assert_relative_eq!(out.color, bare, epsilon = 1e-6);
        assert_relative_eq!(out.roughness, config.worn_roughness);
        assert_relative_eq!(out.metalness, config.worn_metalness);
    }

    #[test]
    fn test_durable_pixel_keeps_paint() {
        let wear = texture(255);
        let model = WearModel::from_definition(&worn(0.1), &CompositingConfig::default(), Some(&wear), None)
            .unwrap()
            .unwrap();
        let out = model.apply(painted(), &Vec3::zeros(), Vec2::new(0.5, 0.5), &UvTransform::default(), 0.0);
        assert_eq!(out, painted());
    }

    #[test]
    fn test_durable_paint_resists_wear() {
        let config = CompositingConfig::default();
        let wear = texture(0);
        let model = WearModel::from_definition(&worn(1.0), &config, Some(&wear), None).unwrap().unwrap();
        let uv = Vec2::new(0.5, 0.5);
        assert_relative_eq!(model.mask(uv, 1.0), 0.0);
        assert_relative_eq!(model.effective_amount(0.25), 0.75);

        let out = model.apply(painted(), &Vec3::zeros(), uv, &UvTransform::default(), 1.0);
        assert_eq!(out, painted());
    }

    #[test]
    fn test_grunge_raises_mask() {
        let wear = texture(255);
        let grunge = texture(255);
        let config = CompositingConfig::default();
        let model = WearModel::from_definition(&worn(0.5), &config, Some(&wear), Some(&grunge)).unwrap().unwrap();
        assert_relative_eq!(model.mask(Vec2::new(0.5, 0.5), 0.0), 0.5 * config.grunge_influence);
    }

    #[test]
    fn test_material_window_overrides_and_validation() {
        let def = worn(0.5)
            .with_param(param_names::WEAR_REMAP_MIN, ParamValue::Float(0.2))
            .with_param(param_names::WEAR_REMAP_MAX, ParamValue::Float(0.4));
        let wear = texture(128);
        let model = WearModel::from_definition(&def, &CompositingConfig::default(), Some(&wear), None).unwrap().unwrap();
        assert_relative_eq!(model.threshold(0.0), 0.3, epsilon = 1e-6);
        assert_relative_eq!(model.threshold(1.0), 0.2, epsilon = 1e-6);

        let inverted = worn(0.5)
            .with_param(param_names::WEAR_REMAP_MIN, ParamValue::Float(0.9))
            .with_param(param_names::WEAR_REMAP_MAX, ParamValue::Float(0.1));
        let result = WearModel::from_definition(&inverted, &CompositingConfig::default(), Some(&wear), None);
        assert!(matches!(result, Err(CompositeError::InvalidParameter(_))));
    }
}
