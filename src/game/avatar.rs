//! Avatar normalization: decode → downscale → JPEG → data URL.
//!
//! Uploaded photos are shrunk so the longer side is at most
//! `Config::avatar_max_side` pixels, keeping the aspect ratio, then
//! re-encoded as JPEG so a roster of avatars fits comfortably in
//! localStorage. Smaller images are re-encoded at their own size.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView, ImageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("no image data")]
    Empty,
    #[error("could not decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("could not encode avatar: {0}")]
    Encode(#[source] ImageError),
}

/// Target dimensions for a `width`×`height` image bounded by `max_side`.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let scale = |long: u32, short: u32| -> (u32, u32) {
        if long <= max_side {
            return (long, short);
        }
        let scaled = (short as u64 * max_side as u64 / long as u64) as u32;
        (max_side, scaled.max(1))
    };
    if width > height {
        scale(width, height)
    } else {
        let (h, w) = scale(height, width);
        (w, h)
    }
}

/// Normalize raw image bytes into a `data:image/jpeg;base64,…` URL.
pub fn normalize(bytes: &[u8], max_side: u32, quality: u8) -> Result<String, AvatarError> {
    if bytes.is_empty() {
        return Err(AvatarError::Empty);
    }
    let img = image::load_from_memory(bytes).map_err(AvatarError::Decode)?;
    let (width, height) = img.dimensions();
    let (w, h) = fit_within(width, height, max_side);
    let resized = if (w, h) == (width, height) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(AvatarError::Encode)?;

    log::debug!("avatar {}x{} -> {}x{}, {} bytes", width, height, w, h, jpeg.len());
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}
