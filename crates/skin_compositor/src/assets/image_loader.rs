//! Image loading utilities for texture data
//!
//! Decoded RGBA8 pixel buffers plus the CPU sampling the reference
//! compositor uses.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::assets::AssetError;
use crate::foundation::math::{Vec2, Vec4};

/// Texture coordinate wrapping behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Tile the texture
    #[default]
    Repeat,
    /// Clamp coordinates to the edge texel
    Clamp,
    /// Tile with every other repetition mirrored
    Mirror,
}

impl WrapMode {
    /// Map the integer address modes used in material sources (0 wrap, 1 clamp, 2 mirror)
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => WrapMode::Clamp,
            2 => WrapMode::Mirror,
            _ => WrapMode::Repeat,
        }
    }

    /// Apply the wrap to a texel index
    fn apply(self, index: i64, size: u32) -> u32 {
        let size = i64::from(size.max(1));
        let wrapped = match self {
            WrapMode::Repeat => index.rem_euclid(size),
            WrapMode::Clamp => index.clamp(0, size - 1),
            WrapMode::Mirror => {
                let period = index.rem_euclid(size * 2);
                if period < size { period } else { size * 2 - 1 - period }
            }
        };
        wrapped as u32
    }
}

/// Texture filtering used when sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Bilinear interpolation of the four nearest texels
    #[default]
    Linear,
}

/// Wrap and filter configuration applied to one texture binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Horizontal wrap
    pub wrap_u: WrapMode,
    /// Vertical wrap
    pub wrap_v: WrapMode,
    /// Filter
    pub filter: FilterMode,
}

impl SamplerSettings {
    /// Same wrap on both axes
    pub fn uniform(wrap: WrapMode) -> Self {
        Self { wrap_u: wrap, wrap_v: wrap, filter: FilterMode::Linear }
    }
}

/// Loaded image data ready for sampling or GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4, RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {}: {}", path_ref.display(), e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Load image from memory (useful for embedded resources)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image from bytes: {}", e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Wrap an existing RGBA8 buffer
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AssetError::InvalidData(format!(
                "RGBA buffer holds {} bytes, {}x{} needs {}",
                data.len(), width, height, expected
            )));
        }
        Ok(Self { data, width, height, channels: 4 })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Encode as PNG bytes
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, AssetError> {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| AssetError::InvalidData("pixel buffer does not match dimensions".to_string()))?;
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(buffer)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .map_err(|e| AssetError::InvalidData(format!("PNG encoding failed: {e}")))?;
        Ok(bytes.into_inner())
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when either dimension is zero
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA bytes of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }

    /// Every pixel has alpha below `threshold`
    pub fn is_fully_transparent(&self, threshold: u8) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] < threshold)
    }

    /// Every pixel has all RGB channels below `threshold`
    pub fn is_fully_black(&self, threshold: u8) -> bool {
        self.data
            .chunks_exact(4)
            .all(|px| px[0] < threshold && px[1] < threshold && px[2] < threshold)
    }

    /// Sample normalized RGBA at texture coordinate `uv`
    ///
    /// `v = 0` is the top row. Degenerate images sample as transparent black.
    pub fn sample(&self, uv: Vec2, sampler: &SamplerSettings) -> Vec4 {
        if self.is_degenerate() {
            return Vec4::zeros();
        }
        match sampler.filter {
            FilterMode::Nearest => {
                let x = (uv.x * self.width as f32).floor() as i64;
                let y = (uv.y * self.height as f32).floor() as i64;
                self.texel(x, y, sampler)
            }
            FilterMode::Linear => {
                let fx = uv.x * self.width as f32 - 0.5;
                let fy = uv.y * self.height as f32 - 0.5;
                let x0 = fx.floor();
                let y0 = fy.floor();
                let fraction = |f: f32, floor: f32| if (f - floor).is_finite() { f - floor } else { 0.0 };
                let tx = fraction(fx, x0);
                let ty = fraction(fy, y0);
                // Float to int casts saturate far outside the texture
                let (x0, y0) = (x0 as i64, y0 as i64);
                let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));

                let top = self.texel(x0, y0, sampler).lerp(&self.texel(x1, y0, sampler), tx);
                let bottom = self.texel(x0, y1, sampler).lerp(&self.texel(x1, y1, sampler), tx);
                top.lerp(&bottom, ty)
            }
        }
    }

    fn texel(&self, x: i64, y: i64, sampler: &SamplerSettings) -> Vec4 {
        let x = sampler.wrap_u.apply(x, self.width);
        let y = sampler.wrap_v.apply(y, self.height);
        let [r, g, b, a] = self.pixel(x, y);
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}
