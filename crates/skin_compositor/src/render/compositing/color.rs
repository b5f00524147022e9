//! Color blend operations
//!
//! All operations work on linear `[0, 1]` RGB with `base` as the bottom
//! layer and `blend` as the top layer.

use crate::foundation::math::utils::lerp;
use crate::foundation::math::Vec3;

/// Per-channel blend functions
pub mod channel {
    /// `base * blend`
    pub fn multiply(base: f32, blend: f32) -> f32 {
        base * blend
    }

    /// `1 - (1 - base)(1 - blend)`
    pub fn screen(base: f32, blend: f32) -> f32 {
        1.0 - (1.0 - base) * (1.0 - blend)
    }

    /// Multiply in the darks, screen in the lights, keyed on `base`
    pub fn overlay(base: f32, blend: f32) -> f32 {
        if base < 0.5 {
            2.0 * base * blend
        } else {
            1.0 - 2.0 * (1.0 - base) * (1.0 - blend)
        }
    }

    /// W3C soft light
    pub fn soft_light(base: f32, blend: f32) -> f32 {
        if blend < 0.5 {
            base - (1.0 - 2.0 * blend) * base * (1.0 - base)
        } else {
            let d = if base < 0.25 {
                ((16.0 * base - 12.0) * base + 4.0) * base
            } else {
                base.max(0.0).sqrt()
            };
            base + (2.0 * blend - 1.0) * (d - base)
        }
    }
}

/// Blend modes used by the paint styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Top layer replaces the bottom layer
    Normal,
    /// Darken by multiplication
    Multiply,
    /// Lighten by inverse multiplication
    Screen,
    /// Contrast-preserving overlay
    Overlay,
    /// Gentle overlay
    SoftLight,
}

impl BlendMode {
    /// Overlay blend mode from a material index (unknown indices blend normally)
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => BlendMode::Multiply,
            2 => BlendMode::Screen,
            3 => BlendMode::Overlay,
            4 => BlendMode::SoftLight,
            _ => BlendMode::Normal,
        }
    }

    /// Blend `blend` over `base`
    pub fn apply(self, base: &Vec3, blend: &Vec3) -> Vec3 {
        let op: fn(f32, f32) -> f32 = match self {
            BlendMode::Normal => return *blend,
            BlendMode::Multiply => channel::multiply,
            BlendMode::Screen => channel::screen,
            BlendMode::Overlay => channel::overlay,
            BlendMode::SoftLight => channel::soft_light,
        };
        base.zip_map(blend, op)
    }

    /// Blend, then mix the result back toward `base` by `opacity`
    pub fn apply_with_opacity(self, base: &Vec3, blend: &Vec3, opacity: f32) -> Vec3 {
        mix(base, &self.apply(base, blend), opacity)
    }
}

/// Component-wise linear interpolation
pub fn mix(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a.zip_map(b, |x, y| lerp(x, y, t))
}

/// Rec. 709 luminance
pub fn luminance(color: &Vec3) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

/// Brightness, contrast and saturation adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjustment {
    /// Multiplier on the color
    pub brightness: f32,
    /// Scale of the distance from mid gray
    pub contrast: f32,
    /// Scale of the distance from the luminance
    pub saturation: f32,
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorAdjustment {
    /// No adjustment
    pub const IDENTITY: ColorAdjustment = ColorAdjustment { brightness: 1.0, contrast: 1.0, saturation: 1.0 };

    /// From a `[brightness, contrast, saturation]` triple
    pub fn from_array(values: [f32; 3]) -> Self {
        Self { brightness: values[0], contrast: values[1], saturation: values[2] }
    }

    /// True when applying would change nothing
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Adjust a color
    pub fn apply(&self, color: &Vec3) -> Vec3 {
        if self.is_identity() {
            return *color;
        }
        let bright = color * self.brightness;
        let contrasted = bright.map(|c| (c - 0.5) * self.contrast + 0.5);
        let gray = Vec3::repeat(luminance(&contrasted));
        mix(&gray, &contrasted, self.saturation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_blends() {
        assert_relative_eq!(channel::multiply(0.5, 0.5), 0.25);
        assert_relative_eq!(channel::screen(0.5, 0.5), 0.75);
        assert_relative_eq!(channel::overlay(0.25, 0.5), 0.25);
        assert_relative_eq!(channel::overlay(0.75, 0.5), 0.75);
        // Soft light with a mid gray top layer is the identity
        for base in [0.1, 0.3, 0.8] {
            assert_relative_eq!(channel::soft_light(base, 0.5), base, epsilon = 1e-6);
        }
        assert_relative_eq!(channel::soft_light(0.64, 1.0), 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_blend_modes() {
        let base = Vec3::new(0.2, 0.4, 0.6);
        let white = Vec3::repeat(1.0);
        assert_relative_eq!(BlendMode::Multiply.apply(&base, &white), base);
        assert_relative_eq!(BlendMode::Screen.apply(&base, &white), white);
        assert_relative_eq!(BlendMode::Normal.apply(&base, &white), white);
        assert_relative_eq!(BlendMode::Screen.apply_with_opacity(&base, &white, 0.0), base);
        assert_eq!(BlendMode::from_index(3), BlendMode::Overlay);
        assert_eq!(BlendMode::from_index(99), BlendMode::Normal);
    }

    #[test]
    fn test_color_adjustment() {
        let color = Vec3::new(0.2, 0.4, 0.6);
        assert_eq!(ColorAdjustment::IDENTITY.apply(&color), color);

        let gray = ColorAdjustment { saturation: 0.0, ..ColorAdjustment::IDENTITY }.apply(&color);
        assert_relative_eq!(gray.x, gray.y, epsilon = 1e-6);
        assert_relative_eq!(gray.y, gray.z, epsilon = 1e-6);

        let dark = ColorAdjustment { brightness: 0.5, ..ColorAdjustment::IDENTITY }.apply(&color);
        assert_relative_eq!(dark, color * 0.5, epsilon = 1e-6);
    }
}
