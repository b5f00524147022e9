//! Paint-style blend model
//!
//! One blend per [`PaintStyle`], evaluated per pixel:
//!
//! | style | output |
//! |---|---|
//! | 0 solid | `c0` |
//! | 1 hydrographic | `overlay(base, p * c0)` |
//! | 2 spray | `lerp(base, p * c0, p.a)` |
//! | 3 anodized | `multiply(c0, p)` |
//! | 4 anodized multi | `multiply(cascade(c0..c3, mask), p)` |
//! | 5 custom paint | `soft_light(base, p * c0)` |
//! | 6 antiqued | `overlay(base, multiply(c0, p))` |
//! | 7 gunsmith | `lerp(c0, screen(c0, p), 0.3)` |
//! | 8 and unknown | `p * c0` |

use super::color::{mix, BlendMode};
use crate::assets::materials::PaintStyle;
use crate::foundation::math::utils::{lerp, rgb, rgb_from_array};
use crate::foundation::math::{Vec3, Vec4};

/// How far the gunsmith style moves toward the screened pattern
pub const GUNSMITH_SCREEN_WEIGHT: f32 = 0.3;

/// Per-pixel inputs of a paint-style blend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintInputs {
    /// Base color sample (neutral gray when the material has none)
    pub base: Vec3,
    /// Pattern sample with alpha (opaque white when missing)
    pub pattern: Vec4,
    /// Mask sample; red, green and blue weight colors 1, 2 and 3
    pub mask: Vec3,
    /// Color slots 0 to 3
    pub colors: [Vec3; 4],
}

/// Expand up to four color slots to exactly four
///
/// Missing slots repeat the last present one; white when there are none.
pub fn color_slots(colors: &[[f32; 4]]) -> [Vec3; 4] {
    let mut last = Vec3::repeat(1.0);
    std::array::from_fn(|i| {
        if let Some(color) = colors.get(i) {
            last = rgb_from_array(color);
        }
        last
    })
}

/// Blend color slots successively by the mask's red, green and blue channels
pub fn cascade_colors(colors: &[Vec3; 4], mask: &Vec3) -> Vec3 {
    let mut out = colors[0];
    for (color, weight) in colors[1..].iter().zip(mask.iter()) {
        out = mix(&out, color, *weight);
    }
    out
}

/// Scalar counterpart of [`cascade_colors`]
pub fn cascade_scalars(values: &[f32; 4], mask: &Vec3) -> f32 {
    let mut out = values[0];
    for (value, weight) in values[1..].iter().zip(mask.iter()) {
        out = lerp(out, *value, *weight);
    }
    out
}

/// Evaluate the blend of `style`
pub fn blend(style: PaintStyle, inputs: &PaintInputs) -> Vec3 {
    let c0 = inputs.colors[0];
    let pattern = rgb(&inputs.pattern);
    let tinted = pattern.component_mul(&c0);

    match style {
        PaintStyle::Solid => c0,
        PaintStyle::Hydrographic => BlendMode::Overlay.apply(&inputs.base, &tinted),
        PaintStyle::Spray => mix(&inputs.base, &tinted, inputs.pattern.w),
        PaintStyle::Anodized => BlendMode::Multiply.apply(&c0, &pattern),
        PaintStyle::AnodizedMulti => {
            let cascaded = cascade_colors(&inputs.colors, &inputs.mask);
            BlendMode::Multiply.apply(&cascaded, &pattern)
        }
        PaintStyle::CustomPaint => BlendMode::SoftLight.apply(&inputs.base, &tinted),
        PaintStyle::Antiqued => {
            let multiplied = BlendMode::Multiply.apply(&c0, &pattern);
            BlendMode::Overlay.apply(&inputs.base, &multiplied)
        }
        PaintStyle::Gunsmith => {
            let screened = BlendMode::Screen.apply(&c0, &pattern);
            mix(&c0, &screened, GUNSMITH_SCREEN_WEIGHT)
        }
        PaintStyle::Fallback => tinted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs(base: f32, pattern: Vec4) -> PaintInputs {
        PaintInputs {
            base: Vec3::repeat(base),
            pattern,
            mask: Vec3::zeros(),
            colors: color_slots(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]),
        }
    }

    #[test]
    fn test_solid_outputs_color_zero() {
        for base in [0.0, 0.3, 1.0] {
            for pattern in [Vec4::zeros(), Vec4::new(0.2, 0.9, 0.4, 0.5), Vec4::repeat(1.0)] {
                assert_eq!(blend(PaintStyle::Solid, &inputs(base, pattern)), Vec3::new(1.0, 0.0, 0.0));
            }
        }
    }

    #[test]
    fn test_color_slots_repeat_last() {
        let slots = color_slots(&[[0.1, 0.2, 0.3, 1.0], [0.4, 0.5, 0.6, 1.0]]);
        assert_eq!(slots[2], Vec3::new(0.4, 0.5, 0.6));
        assert_eq!(slots[3], Vec3::new(0.4, 0.5, 0.6));
        assert_eq!(color_slots(&[]), [Vec3::repeat(1.0); 4]);
    }

    #[test]
    fn test_cascade() {
        let colors = color_slots(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]]);
        assert_eq!(cascade_colors(&colors, &Vec3::zeros()), colors[0]);
        assert_eq!(cascade_colors(&colors, &Vec3::new(1.0, 0.0, 0.0)), colors[1]);
        assert_eq!(cascade_colors(&colors, &Vec3::new(1.0, 1.0, 0.0)), colors[2]);
        assert_eq!(cascade_colors(&colors, &Vec3::new(0.0, 0.0, 1.0)), colors[3]);
        assert_relative_eq!(cascade_scalars(&[0.0, 1.0, 0.5, 0.2], &Vec3::new(0.5, 0.0, 0.0)), 0.5);
    }

    #[test]
    fn test_spray_uses_pattern_alpha() {
        let transparent = inputs(0.25, Vec4::new(1.0, 1.0, 1.0, 0.0));
        assert_relative_eq!(blend(PaintStyle::Spray, &transparent), Vec3::repeat(0.25));
        let opaque = inputs(0.25, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_relative_eq!(blend(PaintStyle::Spray, &opaque), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_anodized_and_fallback_with_white_pattern() {
        let white = inputs(0.5, Vec4::repeat(1.0));
        assert_eq!(blend(PaintStyle::Anodized, &white), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(blend(PaintStyle::Fallback, &white), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_gunsmith() {
        let out = blend(PaintStyle::Gunsmith, &inputs(0.5, Vec4::new(0.0, 1.0, 0.0, 1.0)));
        // screen(c0, p) = (1, 1, 0); 30% of the way from red
        assert_relative_eq!(out, Vec3::new(1.0, 0.3, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_hydrographic_overlay() {
        let out = blend(PaintStyle::Hydrographic, &inputs(0.25, Vec4::repeat(1.0)));
        // overlay(0.25, (1, 0, 0)) = (0.5, 0, 0)
        assert_relative_eq!(out, Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_custom_paint_soft_light() {
        let out = blend(PaintStyle::CustomPaint, &inputs(0.25, Vec4::repeat(1.0)));
        // soft_light(0.25, 1) = sqrt(0.25); soft_light(0.25, 0) = 0.25 - 0.25 * 0.75
        assert_relative_eq!(out, Vec3::new(0.5, 0.0625, 0.0625), epsilon = 1e-6);
    }

    #[test]
    fn test_antiqued_overlays_multiplied_color() {
        let gray = Vec4::new(0.5, 0.5, 0.5, 1.0);
        // multiply(c0, p) = (0.5, 0, 0)
        let dark = blend(PaintStyle::Antiqued, &inputs(0.25, gray));
        assert_relative_eq!(dark, Vec3::new(0.25, 0.0, 0.0), epsilon = 1e-6);
        let light = blend(PaintStyle::Antiqued, &inputs(0.75, gray));
        assert_relative_eq!(light, Vec3::new(0.75, 0.5, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_anodized_multi_uses_mask() {
        let mut input = inputs(0.5, Vec4::repeat(1.0));
        input.mask = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(blend(PaintStyle::AnodizedMulti, &input), Vec3::new(0.0, 1.0, 0.0));
    }
}
