//! Formula-based sprite sheet layouts.
//!
//! Unlike the atlas builder these layouts never fail for a valid input: the
//! surface simply grows to fit. Every mode surrounds sprites with `padding`
//! pixels on all sides and between neighbours.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::ForgeError;
use crate::geometry::next_power_of_two;
use crate::sprite::{ensure_not_empty, Placement, SpriteImage, Surface, SurfaceKind};

/// Arrangement used by [`SheetLayout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Left to right in one row.
    #[default]
    Horizontal,
    /// Top to bottom in one column.
    Vertical,
    /// Uniform cells, `ceil(sqrt(n))` columns, row-major.
    Grid,
}

const LAYOUT_NAMES: &[&str] = &["horizontal", "vertical", "grid"];

impl LayoutMode {
    /// Parses a layout name. Unknown names fall back to horizontal.
    pub fn from_name(name: &str) -> Self {
        match name {
            "horizontal" => LayoutMode::Horizontal,
            "vertical" => LayoutMode::Vertical,
            "grid" => LayoutMode::Grid,
            other => {
                tracing::warn!(layout = other, "unknown layout, using horizontal");
                LayoutMode::Horizontal
            }
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        LAYOUT_NAMES
    }

    fn surface_kind(self) -> SurfaceKind {
        match self {
            LayoutMode::Horizontal => SurfaceKind::Horizontal,
            LayoutMode::Vertical => SurfaceKind::Vertical,
            LayoutMode::Grid => SurfaceKind::Grid,
        }
    }
}

/// Lays sprites out on a sheet by formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub mode: LayoutMode,
    pub padding: u32,
    pub power_of_two: bool,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Horizontal,
            padding: 2,
            power_of_two: true,
        }
    }
}

impl SheetLayout {
    pub fn new(mode: LayoutMode, padding: u32, power_of_two: bool) -> Self {
        Self {
            mode,
            padding,
            power_of_two,
        }
    }

    /// Computes sprite origins and the unrounded sheet size.
    ///
    /// Returns `ForgeError::InvalidDimensions` if an offset or the sheet size
    /// does not fit in `u32`.
    pub fn positions(
        &self,
        sprites: &[SpriteImage],
    ) -> Result<(Vec<(u32, u32)>, u32, u32), ForgeError> {
        let pad = self.padding;
        let max_w = sprites.iter().map(SpriteImage::width).max().unwrap_or(0);
        let max_h = sprites.iter().map(SpriteImage::height).max().unwrap_or(0);

        match self.mode {
            LayoutMode::Horizontal => {
                let mut x = pad;
                let mut origins = Vec::with_capacity(sprites.len());
                for s in sprites {
                    origins.push((x, pad));
                    x = add(x, add(s.width(), pad)?)?;
                }
                Ok((origins, x, add(max_h, mul(2, pad)?)?))
            }
            LayoutMode::Vertical => {
                let mut y = pad;
                let mut origins = Vec::with_capacity(sprites.len());
                for s in sprites {
                    origins.push((pad, y));
                    y = add(y, add(s.height(), pad)?)?;
                }
                Ok((origins, add(max_w, mul(2, pad)?)?, y))
            }
            LayoutMode::Grid => {
                let count = u32::try_from(sprites.len())
                    .map_err(|_| ForgeError::InvalidDimensions)?;
                let cols = grid_columns(count);
                let rows = count.div_ceil(cols);
                let cell_w = add(max_w, pad)?;
                let cell_h = add(max_h, pad)?;
                let width = add(mul(cols, cell_w)?, pad)?;
                let height = add(mul(rows, cell_h)?, pad)?;
                // Every origin is below the sheet size, so these cannot overflow.
                let origins = (0..count)
                    .map(|i| (pad + (i % cols) * cell_w, pad + (i / cols) * cell_h))
                    .collect();
                Ok((origins, width, height))
            }
        }
    }

    /// Composes the sheet.
    ///
    /// Returns `ForgeError::EmptyInput` for an empty collection; otherwise
    /// always succeeds.
    pub fn layout(&self, sprites: &[SpriteImage]) -> Result<Surface, ForgeError> {
        ensure_not_empty(sprites)?;
        let (origins, width, height) = self.positions(sprites)?;
        let (width, height) = if self.power_of_two {
            (round_up(width)?, round_up(height)?)
        } else {
            (width, height)
        };
        tracing::debug!(mode = ?self.mode, width, height, "sheet layout");

        let mut pixels = PixelBuffer::new(width, height)?;
        let placements = sprites
            .iter()
            .zip(origins)
            .enumerate()
            .map(|(i, (sprite, (x, y)))| {
                pixels.blit(sprite.pixels(), x, y);
                Placement {
                    name: sprite.name_or_index(i),
                    index: i,
                    x,
                    y,
                    width: sprite.width(),
                    height: sprite.height(),
                    padding: self.padding,
                }
            })
            .collect();

        Ok(Surface {
            kind: self.mode.surface_kind(),
            pixels,
            placements,
        })
    }
}

fn add(a: u32, b: u32) -> Result<u32, ForgeError> {
    a.checked_add(b).ok_or(ForgeError::InvalidDimensions)
}

fn mul(a: u32, b: u32) -> Result<u32, ForgeError> {
    a.checked_mul(b).ok_or(ForgeError::InvalidDimensions)
}

/// Next power of two, or `InvalidDimensions` above `2^31`.
fn round_up(n: u32) -> Result<u32, ForgeError> {
    let rounded = next_power_of_two(n);
    if rounded < n {
        return Err(ForgeError::InvalidDimensions);
    }
    Ok(rounded)
}

/// `ceil(sqrt(count))`, computed without floating point.
fn grid_columns(count: u32) -> u32 {
    let mut cols = 1;
    while cols * cols < count {
        cols += 1;
    }
    cols
}
