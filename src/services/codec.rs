//! Image decode/encode around the `image` crate.
//!
//! The retouch core only sees RGBA8 [`PixelBuffer`]s; this module converts
//! uploads into that shape and encodes results for download.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageFormat, ImageReader, RgbaImage};
use pixel_retouch::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::CodecError;
use crate::models::ExportConfig;

/// Quality used when the `original` selector falls back to JPEG
const FALLBACK_JPEG_QUALITY: u8 = 90;

/// Download format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Png,
    Webp,
    JpegHigh,
    JpegMedium,
    /// Same container as the upload when possible
    Original,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Png,
        ExportFormat::Webp,
        ExportFormat::JpegHigh,
        ExportFormat::JpegMedium,
        ExportFormat::Original,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Webp => "webp",
            ExportFormat::JpegHigh => "jpeg-high",
            ExportFormat::JpegMedium => "jpeg-medium",
            ExportFormat::Original => "original",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| CodecError::UnknownFormat(s.to_string()))
    }
}

/// A decoded upload
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub buffer: PixelBuffer,
    /// Container format detected from the upload's magic bytes
    pub source_format: ImageFormat,
}

/// Encoded download payload
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub extension: &'static str,
}

/// Read width and height from the header without decoding pixels
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decode any supported container into an RGBA8 buffer
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, CodecError> {
    let source_format =
        image::guess_format(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    let img = image::load_from_memory_with_format(bytes, source_format)
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let buffer = PixelBuffer::new(width as usize, height as usize, rgba.into_raw())
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    tracing::debug!(width, height, format = ?source_format, "Decoded image");

    Ok(DecodedImage {
        buffer,
        source_format,
    })
}

/// Encode a buffer for download
///
/// JPEG tiers drop alpha. `Original` re-encodes in the upload's container
/// when it is PNG, JPEG or WebP, and falls back to JPEG otherwise.
pub fn encode(
    buffer: &PixelBuffer,
    format: ExportFormat,
    source_format: ImageFormat,
    export: &ExportConfig,
) -> Result<EncodedImage, CodecError> {
    match format {
        ExportFormat::Png => encode_png(buffer),
        ExportFormat::Webp => encode_webp(buffer),
        ExportFormat::JpegHigh => encode_jpeg(buffer, export.jpeg_high_quality),
        ExportFormat::JpegMedium => encode_jpeg(buffer, export.jpeg_medium_quality),
        ExportFormat::Original => match source_format {
            ImageFormat::Png => encode_png(buffer),
            ImageFormat::WebP => encode_webp(buffer),
            _ => encode_jpeg(buffer, FALLBACK_JPEG_QUALITY),
        },
    }
}

/// `retouched-<unix millis>.<ext>`
pub fn download_filename(extension: &str) -> String {
    format!(
        "retouched-{}.{extension}",
        chrono::Utc::now().timestamp_millis()
    )
}

fn to_rgba_image(buffer: &PixelBuffer) -> Result<RgbaImage, CodecError> {
    RgbaImage::from_raw(
        buffer.width() as u32,
        buffer.height() as u32,
        buffer.as_bytes().to_vec(),
    )
    .ok_or_else(|| CodecError::Encode("buffer does not match its dimensions".to_string()))
}

fn encode_png(buffer: &PixelBuffer) -> Result<EncodedImage, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    to_rgba_image(buffer)?
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CodecError::Encode(format!("PNG: {e}")))?;
    Ok(EncodedImage {
        bytes: buf.into_inner(),
        mime: "image/png",
        extension: "png",
    })
}

fn encode_webp(buffer: &PixelBuffer) -> Result<EncodedImage, CodecError> {
    let mut buf = Vec::new();
    let rgba = to_rgba_image(buffer)?;
    WebPEncoder::new_lossless(&mut buf)
        .encode(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CodecError::Encode(format!("WebP: {e}")))?;
    Ok(EncodedImage {
        bytes: buf,
        mime: "image/webp",
        extension: "webp",
    })
}

fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> Result<EncodedImage, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    let rgb = image::DynamicImage::ImageRgba8(to_rgba_image(buffer)?).to_rgb8();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CodecError::Encode(format!("JPEG: {e}")))?;
    Ok(EncodedImage {
        bytes: buf.into_inner(),
        mime: "image/jpeg",
        extension: "jpg",
    })
}
