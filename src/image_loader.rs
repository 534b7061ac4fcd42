//! # Image Loading and Decoding
//!
//! Loads the logo and watermark images from data URIs, file paths, or raw
//! base64 strings and prepares them for PDF embedding. JPEG images pass
//! through without re-encoding (DCTDecode). PNG images are decoded to RGB
//! pixels with a separate alpha channel for SMask transparency.
//!
//! The watermark is produced once per render pass by [`make_watermark`]:
//! the logo flattened to grayscale with a uniform alpha of
//! [`WATERMARK_ALPHA`].

use crate::error::RenderError;
use std::io::Cursor;

/// Opacity of the watermark, out of 255.
pub const WATERMARK_ALPHA: u8 = 60;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF encoder can consume directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path: absolute, `./` / `../` relative, or a bare file name ending
///   in `.png`, `.jpg` or `.jpeg`
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, RenderError> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Build the watermark: grayscale, uniform alpha.
pub fn make_watermark(src: &str) -> Result<LoadedImage, RenderError> {
    let raw_bytes = read_source_bytes(src)?;
    let img = image::io::Reader::new(Cursor::new(&raw_bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::Image(format!("watermark format detection error: {e}")))?
        .decode()
        .map_err(|e| RenderError::Image(format!("failed to decode watermark: {e}")))?;

    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    let rgb = gray.as_raw().iter().flat_map(|&l| [l, l, l]).collect();
    let alpha = vec![WATERMARK_ALPHA; gray.as_raw().len()];

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: Some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, RenderError> {
    let src = src.trim();

    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| RenderError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path shapes are read from disk; base64 text contains '/'.
    if looks_like_path(src) {
        return std::fs::read(src)
            .map_err(|e| RenderError::Image(format!("failed to read image file '{src}': {e}")));
    }

    base64_decode(src)
}

fn looks_like_path(src: &str) -> bool {
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return true;
    }
    let lower = src.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

fn base64_decode(input: &str) -> Result<Vec<u8>, RenderError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| RenderError::Image(format!("base64 decode error: {e}")))
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, RenderError> {
    if data.len() < 4 {
        return Err(RenderError::Image("image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(RenderError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, RenderError> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| RenderError::Image(format!("JPEG format detection error: {e}")))?
        .into_dimensions()
        .map_err(|e| RenderError::Image(format!("failed to read JPEG dimensions: {e}")))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        // length(2) precision(1) height(2) width(2) components(1)
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, RenderError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| RenderError::Image(format!("PNG format detection error: {e}")))?
        .decode()
        .map_err(|e| RenderError::Image(format!("failed to decode PNG: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}
