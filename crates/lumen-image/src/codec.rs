// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding picked files into RGBA rasters and re-encoding enhanced rasters
// into the user's chosen output format.

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::RgbImage;
use lumen_core::error::{LumenError, Result};
use lumen_core::types::{EncodedImage, OutputFormat};
use tracing::{debug, instrument};

use crate::enhance::SourceImage;

/// Decode raw file bytes (JPEG, PNG, WebP, GIF, BMP, ...) into RGBA.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<SourceImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| LumenError::Decode(err.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(LumenError::Decode("image has no pixels".into()));
    }
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    Ok(img.into_rgba8())
}

/// Encode `image` as `format`.
///
/// `quality` (0-100) is applied to JPEG only; PNG and WebP are written
/// lossless. `image` 0.25 ships no lossy WebP encoder, so WebP output ignores
/// `quality`. JPEG has no alpha channel, so alpha is dropped.
#[instrument(skip_all, fields(width = image.width(), height = image.height(), %format, quality = quality))]
pub fn encode(image: &SourceImage, format: OutputFormat, quality: u8) -> Result<EncodedImage> {
    let mut bytes = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let rgb: RgbImage = image.convert();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => image.write_with_encoder(PngEncoder::new(&mut bytes)),
        OutputFormat::Webp => image.write_with_encoder(WebPEncoder::new_lossless(&mut bytes)),
    };
    result.map_err(|err| LumenError::Encode(format!("{format} encoding failed: {err}")))?;

    debug!(encoded_len = bytes.len(), "Image encoded");
    Ok(EncodedImage {
        format,
        bytes,
        width: image.width(),
        height: image.height(),
    })
}

/// The JPEG encoder accepts 1-100; a quality of 0 maps to the lowest setting.
fn jpeg_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}
