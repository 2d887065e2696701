//! Normalizes contact photos to a fixed-size JPEG.

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::error::InterchangeError;
use crate::sanitize::strip_data_uri;

pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";

const BRIGHTNESS: f32 = 1.05;
const CONTRAST: f32 = 1.08;
const SATURATION: f32 = 1.10;
const SHARPEN_SIGMA: f32 = 1.0;
const SHARPEN_THRESHOLD: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoOptions {
    /// Edge length of the square output
    pub size: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for PhotoOptions {
    fn default() -> Self {
        Self {
            size: 300,
            quality: 85,
        }
    }
}

/// Decodes a base64 photo (with or without a `data:` prefix) and runs it
/// through [`process_bytes`].
pub fn process_base64(data: &str, options: &PhotoOptions) -> Result<Vec<u8>, InterchangeError> {
    let bytes = decode_base64(data)?;
    process_bytes(&bytes, options)
}

/// Cover-fits the image to a square, applies the enhancement and sharpening
/// passes and encodes the result as JPEG.
pub fn process_bytes(bytes: &[u8], options: &PhotoOptions) -> Result<Vec<u8>, InterchangeError> {
    let size = options.size.max(1);
    let image = image::load_from_memory(bytes)?;

    let mut rgb = image
        .resize_to_fill(size, size, FilterType::Lanczos3)
        .to_rgb8();
    modulate(&mut rgb);
    let sharpened = imageops::unsharpen(&rgb, SHARPEN_SIGMA, SHARPEN_THRESHOLD);

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, options.quality.clamp(1, 100));
    encoder.encode_image(&sharpened)?;

    Ok(buffer)
}

/// Brightness, contrast and saturation adjustment, in that order.
fn modulate(image: &mut RgbImage) {
    for pixel in image.pixels_mut() {
        let mut channels = pixel.0.map(|c| c as f32 * BRIGHTNESS);

        for c in channels.iter_mut() {
            *c = (*c - 128.0) * CONTRAST + 128.0;
        }

        let luma = 0.299 * channels[0] + 0.587 * channels[1] + 0.114 * channels[2];
        for (out, c) in pixel.0.iter_mut().zip(channels) {
            *out = (luma + (c - luma) * SATURATION).round().clamp(0.0, 255.0) as u8;
        }
    }
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, InterchangeError> {
    let (_, payload) = strip_data_uri(data);
    // vCard line folding can leave whitespace inside the payload
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Image mime type for a stored photo, judged by a case-insensitive `.png`
/// suffix; everything else is treated as JPEG.
pub fn mime_for_url(url: &str) -> &'static str {
    if url.to_ascii_lowercase().ends_with(".png") {
        PNG_MIME
    } else {
        JPEG_MIME
    }
}
