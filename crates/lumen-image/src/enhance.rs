// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image enhancer — downscale to a maximum width, then a fixed
// contrast/brightness/saturation pass over every pixel.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use lumen_core::error::{LumenError, Result};
use lumen_core::types::EnhancementConfig;
use tracing::{debug, instrument};

/// A decoded raster: interleaved RGBA, 8 bits per channel.
pub type SourceImage = RgbaImage;

/// Resampling kernel used when scaling down.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Applies one validated [`EnhancementConfig`] to images.
///
/// The two steps are exposed separately so batch callers can report progress
/// between them; [`Enhancer::enhance`] runs both.
///
/// ```ignore
/// let enhancer = Enhancer::new(EnhancementConfig::default())?;
/// let enhanced = enhancer.enhance(decoded)?;
/// ```
#[derive(Debug, Clone)]
pub struct Enhancer {
    config: EnhancementConfig,
    /// Step-one output (contrast + brightness, clamped) for every byte value.
    contrast_lut: [f32; 256],
}

impl Enhancer {
    /// Validate `config` and prepare the per-channel lookup table.
    pub fn new(config: EnhancementConfig) -> Result<Self> {
        config.validate()?;
        let mut contrast_lut = [0.0f32; 256];
        for (value, slot) in contrast_lut.iter_mut().enumerate() {
            *slot = contrast_brightness(value as u8, &config);
        }
        Ok(Self {
            config,
            contrast_lut,
        })
    }

    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    /// Resize then colour-adjust `image`.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn enhance(&self, image: SourceImage) -> Result<SourceImage> {
        ensure_has_pixels(&image)?;
        let resized = self.resize(image);
        Ok(self.adjust_colors(resized))
    }

    /// Scale `image` so its width does not exceed `max_width`.
    ///
    /// Both axes use the same ratio. Images already narrow enough are
    /// returned untouched.
    pub fn resize(&self, image: SourceImage) -> SourceImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = fit_dimensions(width, height, self.config.max_width);
        if (new_width, new_height) == (width, height) {
            return image;
        }
        debug!(
            from_w = width,
            from_h = height,
            to_w = new_width,
            to_h = new_height,
            "Downscaling image"
        );
        imageops::resize(&image, new_width, new_height, RESIZE_FILTER)
    }

    /// Apply contrast, brightness, and saturation to every pixel in place.
    /// Alpha is left untouched.
    pub fn adjust_colors(&self, mut image: SourceImage) -> SourceImage {
        for pixel in image.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            let [r, g, b] = self.adjust_rgb([r, g, b]);
            *pixel = Rgba([r, g, b, a]);
        }
        image
    }

    /// Enhance a single RGB triple.
    pub fn adjust_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let [r, g, b] = rgb.map(|v| self.contrast_lut[v as usize]);
        let avg = (r + g + b) / 3.0;
        let saturate = |v: f32| clamp_channel(avg + (v - avg) * self.config.saturation) as u8;
        [saturate(r), saturate(g), saturate(b)]
    }
}

/// Enhance `image` with `config` in one call.
pub fn enhance(image: SourceImage, config: &EnhancementConfig) -> Result<SourceImage> {
    Enhancer::new(*config)?.enhance(image)
}

/// Target size for an image of `width` x `height` limited to `max_width`.
///
/// `ratio = min(1, max_width / width)`; each side is `round(side * ratio)`,
/// never less than one pixel. Never upscales.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let ratio = (max_width as f64 / width as f64).min(1.0);
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

fn contrast_brightness(value: u8, config: &EnhancementConfig) -> f32 {
    clamp_channel((value as f32 - 128.0) * config.contrast + 128.0 + config.brightness as f32)
}

fn clamp_channel(value: f32) -> f32 {
    value.clamp(0.0, 255.0)
}

fn ensure_has_pixels(image: &SourceImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LumenError::InvalidConfig(format!(
            "image must have non-zero dimensions, got {}x{}",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
