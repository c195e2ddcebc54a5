//! RGBA8 pixel buffer shared by sprites, composed surfaces, and the pixel-art
//! stages.
//!
//! Pixels are stored row-major as four bytes (R, G, B, A). Coordinates are
//! bounds-checked; out-of-range reads return `None` and out-of-range writes
//! are ignored.

use crate::error::ForgeError;

/// A single RGBA8 pixel.
pub type Rgba = [u8; 4];

/// Fully transparent black, the background of every new buffer.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// A row-major RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Byte length of a `width x height` RGBA buffer, or `InvalidDimensions`.
fn byte_len(width: u32, height: u32) -> Result<usize, ForgeError> {
    if width == 0 || height == 0 {
        return Err(ForgeError::InvalidDimensions);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(ForgeError::InvalidDimensions)
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    ///
    /// Returns `ForgeError::InvalidDimensions` if either dimension is zero
    /// or the byte length would overflow `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, ForgeError> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Creates a buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self, ForgeError> {
        let len = byte_len(width, height)?;
        let data = color.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps existing RGBA bytes, validating that
    /// `data.len() == width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ForgeError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(ForgeError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read-only access to the raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw RGBA bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer and returns its RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Alpha channel at `(x, y)`; 0 outside the buffer.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.offset(x, y).map_or(0, |i| self.data[i + 3])
    }

    /// Writes the pixel at `(x, y)`. Writes outside the buffer are ignored.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Copies `src` into this buffer with its top-left corner at `(x, y)`.
    ///
    /// Pixels are copied verbatim (no alpha blending). Rows and columns that
    /// fall outside this buffer are clipped.
    pub fn blit(&mut self, src: &PixelBuffer, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cols = src.width.min(self.width - x) as usize;
        let rows = src.height.min(self.height - y);
        for row in 0..rows {
            let src_start = row as usize * src.width as usize * 4;
            let dst_start = ((y + row) as usize * self.width as usize + x as usize) * 4;
            self.data[dst_start..dst_start + cols * 4]
                .copy_from_slice(&src.data[src_start..src_start + cols * 4]);
        }
    }

    /// Nearest-neighbour resample to `width x height`. No smoothing.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Result<Self, ForgeError> {
        let mut out = Self::new(width, height)?;
        for y in 0..height {
            let sy = (u64::from(y) * u64::from(self.height) / u64::from(height)) as u32;
            for x in 0..width {
                let sx = (u64::from(x) * u64::from(self.width) / u64::from(width)) as u32;
                if let Some(px) = self.get(sx, sy) {
                    out.put(x, y, px);
                }
            }
        }
        Ok(out)
    }
}
