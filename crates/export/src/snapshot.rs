//! PNG encoding and decoding of [`PixelBuffer`]s.
//!
//! This module is feature-gated behind `png` (default on) so that consumers
//! that only need engine targets do not pull in the `image` crate.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use spriteforge_core::buffer::PixelBuffer;
use spriteforge_core::error::ForgeError;
use spriteforge_core::sprite::SpriteImage;
use std::path::Path;

/// Encodes a buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, ForgeError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            buffer.data(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ForgeError::Io(e.to_string()))?;
    Ok(bytes)
}

/// Decodes PNG bytes into an RGBA buffer.
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, ForgeError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| ForgeError::Io(e.to_string()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    PixelBuffer::from_rgba(w, h, img.into_raw())
}

/// Writes a buffer to `path` as a PNG file.
pub fn write_png(buffer: &PixelBuffer, path: &Path) -> Result<(), ForgeError> {
    let img = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.data().to_vec())
        .ok_or_else(|| ForgeError::Io("RGBA buffer size mismatch".into()))?;
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| ForgeError::Io(e.to_string()))
}

/// Loads a PNG file as a sprite named after the file stem.
pub fn read_sprite(path: &Path) -> Result<SpriteImage, ForgeError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ForgeError::Io(format!("{}: {e}", path.display())))?;
    let pixels = decode_png(&bytes)?;
    let sprite = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => SpriteImage::new(stem, pixels),
        None => SpriteImage::unnamed(pixels),
    };
    Ok(sprite)
}
