//! Pattern texture coordinate transform

use nalgebra::Rotation2;

use super::CompositeError;
use crate::assets::materials::MaterialDefinition;
use crate::foundation::math::utils::deg_to_rad;
use crate::foundation::math::Vec2;

fn center() -> Vec2 {
    Vec2::new(0.5, 0.5)
}

/// Scale and rotation about the texture center, then offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    /// Uniform scale
    pub scale: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Offset added last
    pub offset: Vec2,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self { scale: 1.0, rotation: 0.0, offset: Vec2::zeros() }
    }
}

impl UvTransform {
    /// Transform described by a material's pattern parameters
    pub fn from_definition(definition: &MaterialDefinition) -> Result<Self, CompositeError> {
        let offset = definition.pattern_offset();
        let transform = Self {
            scale: definition.pattern_scale(),
            rotation: definition.pattern_rotation(),
            offset: Vec2::new(offset[0], offset[1]),
        };
        transform.validate()?;
        Ok(transform)
    }

    /// Reject transforms that cannot be evaluated
    pub fn validate(&self) -> Result<(), CompositeError> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(CompositeError::InvalidParameter(format!("pattern scale {}", self.scale)));
        }
        if !self.rotation.is_finite() || !self.offset.iter().all(|v| v.is_finite()) {
            return Err(CompositeError::InvalidParameter("pattern rotation or offset".to_string()));
        }
        Ok(())
    }

    /// True when applying would change nothing
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Transform a texture coordinate
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        if self.is_identity() {
            return uv;
        }
        let centered = (uv - center()) * self.scale;
        let rotated = Rotation2::new(deg_to_rad(self.rotation)) * centered;
        rotated + center() + self.offset
    }
}
