// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Before/after thumbnails as `data:` URLs, ready to drop into an <img>.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops;
use lumen_core::error::{LumenError, Result};
use lumen_core::types::{EncodedImage, OutputFormat};
use tracing::instrument;

use crate::codec;

/// Render encoded bytes as a `data:<mime>;base64,...` URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Anything that can be shown directly as an image source.
pub trait ToDataUrl {
    fn to_data_url(&self) -> String;
}

impl ToDataUrl for EncodedImage {
    fn to_data_url(&self) -> String {
        data_url(self.mime_type(), &self.bytes)
    }
}

/// Decode a picked file and produce a PNG thumbnail that fits inside a
/// `max_edge` x `max_edge` box. Small images keep their size.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn preview_data_url(data: &[u8], max_edge: u32) -> Result<String> {
    if max_edge == 0 {
        return Err(LumenError::InvalidConfig(
            "preview size must be at least 1 pixel".into(),
        ));
    }
    let image = codec::decode(data)?;
    let (width, height) = thumbnail_dimensions(image.width(), image.height(), max_edge);
    let thumb = if (width, height) == image.dimensions() {
        image
    } else {
        imageops::thumbnail(&image, width, height)
    };
    let encoded = codec::encode(&thumb, OutputFormat::Png, 100)?;
    Ok(encoded.to_data_url())
}

/// Largest size with the same aspect ratio that fits in a square box.
fn thumbnail_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }
    let ratio = max_edge as f64 / longest as f64;
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}
