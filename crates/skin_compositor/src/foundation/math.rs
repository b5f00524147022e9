//! Math utilities and types
//!
//! Vector aliases and scalar helpers shared by the UV transform and the
//! blend functions.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D vector type (texture coordinates)
pub type Vec2 = Vector2<f32>;

/// 3D vector type (linear RGB)
pub type Vec3 = Vector3<f32>;

/// 4D vector type (RGBA samples)
pub type Vec4 = Vector4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3, Vec4};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value into `[0, 1]`
    pub fn saturate(value: f32) -> f32 {
        value.clamp(0.0, 1.0)
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Hermite smoothstep between two edges
    ///
    /// Degenerate edges (`edge0 >= edge1`) behave as a hard step at `edge0`.
    pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
        if edge1 <= edge0 {
            return if x < edge0 { 0.0 } else { 1.0 };
        }
        let t = saturate((x - edge0) / (edge1 - edge0));
        t * t * (3.0 - 2.0 * t)
    }

    /// Drop the alpha channel of an RGBA sample
    pub fn rgb(sample: &Vec4) -> Vec3 {
        Vec3::new(sample.x, sample.y, sample.z)
    }

    /// Build an RGB vector from the first three entries of an array
    pub fn rgb_from_array(values: &[f32; 4]) -> Vec3 {
        Vec3::new(values[0], values[1], values[2])
    }
}
