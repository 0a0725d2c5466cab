//! Test fixtures: small encoded images built in memory.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// A skin tone the classifier accepts (Cb 103, Cr 155)
pub const SKIN: [u8; 4] = [220, 170, 150, 255];

/// Saturated green, never classified as skin
pub const BACKGROUND: [u8; 4] = [20, 160, 20, 255];

/// Solid-color image
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Green background with a centered square of skin
pub fn portrait(size: u32, patch: u32) -> RgbaImage {
    let start = (size - patch) / 2;
    RgbaImage::from_fn(size, size, |x, y| {
        let inside = (start..start + patch).contains(&x) && (start..start + patch).contains(&y);
        Rgba(if inside { SKIN } else { BACKGROUND })
    })
}

pub fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .write_to(&mut buf, format)
            .expect("encode"),
        _ => image.write_to(&mut buf, format).expect("encode"),
    }
    buf.into_inner()
}

pub fn png(image: &RgbaImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).expect("decode").to_rgba8()
}
