//! Pixel-art stylization: palette quantization, Floyd-Steinberg dithering,
//! silhouette outlining, and low-resolution pixelation.
//!
//! Each stage takes the [`PixelBuffer`] by value, mutates it in place, and
//! hands it back, so no stage keeps an alias once it returns. Only R, G, and
//! B are ever rewritten by quantization and dithering; fully transparent
//! pixels are left alone.

use crate::buffer::PixelBuffer;
use crate::error::ForgeError;

/// Side length of the intermediate image used by [`pixelate`].
pub const PIXELATE_RESOLUTION: u32 = 64;
/// Per-channel quantization granularity used by [`dither`].
pub const DITHER_STEP: u32 = 32;
/// Alpha threshold separating opaque from transparent for outlining.
pub const OUTLINE_ALPHA: u8 = 128;

/// Opaque black written by [`outline`].
const OUTLINE_COLOR: [u8; 4] = [0, 0, 0, 255];

/// `floor(256 / palette_size)`, or `InvalidInput` outside 1..=256.
fn palette_step(palette_size: u32) -> Result<u32, ForgeError> {
    if !(1..=256).contains(&palette_size) {
        return Err(ForgeError::InvalidInput(format!(
            "palette size must be in 1..=256, got {palette_size}"
        )));
    }
    Ok(256 / palette_size)
}

/// `round(value / step) * step`, clamped to 255.
fn snap(value: u32, step: u32) -> u8 {
    ((value + step / 2) / step * step).min(255) as u8
}

/// Reduces every non-transparent pixel's R, G, B to multiples of
/// `floor(256 / palette_size)`. Alpha is untouched.
///
/// Applying it twice with the same palette size changes nothing further.
pub fn quantize(mut buffer: PixelBuffer, palette_size: u32) -> Result<PixelBuffer, ForgeError> {
    let step = palette_step(palette_size)?;
    for px in buffer.data_mut().chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }
        for c in &mut px[..3] {
            *c = snap(u32::from(*c), step);
        }
    }
    Ok(buffer)
}

/// Quantizes one dithered channel to the nearest multiple of
/// [`DITHER_STEP`] that fits in a byte.
fn dither_level(value: f32) -> u8 {
    let max_level = (255 / DITHER_STEP) * DITHER_STEP;
    let v = value.clamp(0.0, 255.0);
    let level = (v / DITHER_STEP as f32).round() as u32 * DITHER_STEP;
    level.min(max_level) as u8
}

/// Floyd-Steinberg error diffusion over R, G, B with a granularity of 32.
///
/// Pixels are visited in raster order. The quantization error is pushed to
/// the right (7/16), below-left (3/16), below (5/16), and below-right (1/16)
/// neighbours that exist and are not fully transparent. Transparent pixels
/// neither change nor receive error.
pub fn dither(mut buffer: PixelBuffer) -> PixelBuffer {
    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    let data = buffer.data_mut();
    let mut work: Vec<f32> = data.iter().map(|&b| f32::from(b)).collect();

    const SPREAD: [(isize, usize, f32); 4] = [
        (1, 0, 7.0 / 16.0),
        (-1, 1, 3.0 / 16.0),
        (0, 1, 5.0 / 16.0),
        (1, 1, 1.0 / 16.0),
    ];

    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            if data[i + 3] == 0 {
                continue;
            }
            for c in 0..3 {
                let old = work[i + c];
                let new = dither_level(old);
                data[i + c] = new;
                let err = old - f32::from(new);
                for &(dx, dy, weight) in &SPREAD {
                    let nx = x as isize + dx;
                    let ny = y + dy;
                    if nx < 0 || nx as usize >= w || ny >= h {
                        continue;
                    }
                    let j = (ny * w + nx as usize) * 4;
                    if data[j + 3] == 0 {
                        continue;
                    }
                    work[j + c] += err * weight;
                }
            }
        }
    }
    buffer
}

/// Paints a one-pixel black silhouette on opaque pixels that border
/// transparency.
///
/// A pixel with alpha above 128 becomes opaque black if any of its four
/// direct neighbours has alpha below 128. Neighbours are read from the
/// unmodified input, and the outermost rows and columns are not scanned.
pub fn outline(buffer: PixelBuffer) -> PixelBuffer {
    let w = buffer.width();
    let h = buffer.height();
    let mut out = buffer.clone();
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if buffer.alpha(x, y) <= OUTLINE_ALPHA {
                continue;
            }
            let edge = [(x, y - 1), (x, y + 1), (x - 1, y), (x + 1, y)]
                .iter()
                .any(|&(nx, ny)| buffer.alpha(nx, ny) < OUTLINE_ALPHA);
            if edge {
                out.put(x, y, OUTLINE_COLOR);
            }
        }
    }
    out
}

/// Downsamples to 64x64 with nearest-neighbour sampling, quantizes there,
/// upsamples to `target_width x target_height`, then outlines.
///
/// Shorthand for [`PixelArtPipeline::pixelate`] without dithering.
pub fn pixelate(
    buffer: PixelBuffer,
    palette_size: u32,
    target_width: u32,
    target_height: u32,
) -> Result<PixelBuffer, ForgeError> {
    PixelArtPipeline {
        palette_size,
        dither: false,
        outline: true,
    }
    .pixelate(buffer, target_width, target_height)
}

/// Chains quantize, optional dithering, and optional outlining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelArtPipeline {
    pub palette_size: u32,
    pub dither: bool,
    pub outline: bool,
}

impl Default for PixelArtPipeline {
    fn default() -> Self {
        Self {
            palette_size: 16,
            dither: false,
            outline: true,
        }
    }
}

impl PixelArtPipeline {
    pub fn apply(&self, buffer: PixelBuffer) -> Result<PixelBuffer, ForgeError> {
        let mut buffer = quantize(buffer, self.palette_size)?;
        if self.dither {
            buffer = dither(buffer);
        }
        if self.outline {
            buffer = outline(buffer);
        }
        Ok(buffer)
    }

    /// Low-resolution variant of [`apply`](Self::apply).
    ///
    /// Quantizing and dithering run on the 64x64 intermediate; the outline
    /// is drawn last, at the target size, so it stays opaque black.
    pub fn pixelate(
        &self,
        buffer: PixelBuffer,
        target_width: u32,
        target_height: u32,
    ) -> Result<PixelBuffer, ForgeError> {
        if target_width == 0 || target_height == 0 {
            return Err(ForgeError::InvalidInput(
                "pixelation target must be non-zero".into(),
            ));
        }
        let mut low = quantize(
            buffer.resize_nearest(PIXELATE_RESOLUTION, PIXELATE_RESOLUTION)?,
            self.palette_size,
        )?;
        if self.dither {
            low = dither(low);
        }
        let high = low.resize_nearest(target_width, target_height)?;
        Ok(if self.outline { outline(high) } else { high })
    }
}
