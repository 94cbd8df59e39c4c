use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::borrow::Cow;

/// Filtering applied once when a decoded image is bound to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSampling {
    /// Maximum anisotropy; 1 disables anisotropic filtering.
    pub anisotropy: u16,
    /// Trilinear filtering over a generated mip chain.
    pub mipmaps: bool,
}

impl Default for TextureSampling {
    fn default() -> Self {
        Self {
            anisotropy: 8,
            mipmaps: true,
        }
    }
}

impl TextureSampling {
    /// Number of mip levels for an image, 1 when mipmaps are off.
    pub fn mip_level_count(&self, width: u32, height: u32) -> u32 {
        if !self.mipmaps {
            return 1;
        }
        32 - width.max(height).max(1).leading_zeros()
    }

    /// Largest size within `max_dimension` on both sides that keeps the
    /// aspect ratio. Sizes already inside the limit are returned unchanged.
    pub fn fit_dimensions(&self, width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
        let max_dimension = max_dimension.max(1);
        let longest = width.max(height);
        if longest <= max_dimension {
            return (width, height);
        }
        let scale = max_dimension as f64 / longest as f64;
        let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
        (fit(width), fit(height))
    }

    /// Downscale `image` so neither side exceeds `max_dimension`.
    pub fn fit_to_limit<'a>(&self, image: &'a RgbaImage, max_dimension: u32) -> Cow<'a, RgbaImage> {
        let (width, height) = image.dimensions();
        let (w, h) = self.fit_dimensions(width, height, max_dimension);
        if (w, h) == (width, height) {
            return Cow::Borrowed(image);
        }
        tracing::debug!(width, height, w, h, max_dimension, "downscaling oversized image");
        Cow::Owned(imageops::resize(image, w, h, FilterType::Triangle))
    }

    /// Level 0 followed by successively halved levels down to 1x1.
    pub fn mip_chain(&self, base: &RgbaImage) -> Vec<RgbaImage> {
        let levels = self.mip_level_count(base.width(), base.height());
        let mut chain = Vec::with_capacity(levels as usize);
        chain.push(base.clone());
        for _ in 1..levels {
            let prev = chain.last().unwrap_or(base);
            let w = (prev.width() / 2).max(1);
            let h = (prev.height() / 2).max(1);
            let next = imageops::resize(prev, w, h, FilterType::Triangle);
            chain.push(next);
        }
        tracing::trace!(levels, width = base.width(), height = base.height(), "mip chain built");
        chain
    }
}
