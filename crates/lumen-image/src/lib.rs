// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lumen-image — Image processing for the Lumen batch enhancer.
//
// Provides the enhancer (downscale + brightness/contrast/saturation), decoding
// and re-encoding between file bytes and RGBA rasters, and preview thumbnails.

pub mod codec;
pub mod enhance;
pub mod preview;

// Re-export the primary items so callers can use `lumen_image::Enhancer` etc.
pub use codec::{decode, encode};
pub use enhance::{Enhancer, SourceImage, enhance, fit_dimensions};
pub use preview::{ToDataUrl, data_url, preview_data_url};
