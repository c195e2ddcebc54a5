//! Sprite inputs, placements, and composed surfaces.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::ForgeError;
use crate::geometry::Rect;

/// An immutable, already-rasterized sprite handed to the packer or layout.
///
/// The name is optional; unnamed sprites are reported as `sprite_<index>`
/// where `index` is their position in the input collection.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    name: Option<String>,
    pixels: PixelBuffer,
}

impl SpriteImage {
    /// Creates a named sprite.
    pub fn new(name: impl Into<String>, pixels: PixelBuffer) -> Self {
        Self {
            name: Some(name.into()),
            pixels,
        }
    }

    /// Creates a sprite without a name.
    pub fn unnamed(pixels: PixelBuffer) -> Self {
        Self { name: None, pixels }
    }

    /// Creates a named sprite from raw RGBA bytes.
    pub fn from_rgba(
        name: impl Into<String>,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, ForgeError> {
        Ok(Self::new(name, PixelBuffer::from_rgba(width, height, data)?))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The explicit name, or the positional identifier `sprite_<index>`.
    pub fn name_or_index(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("sprite_{index}"),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

/// Where a sprite ended up on a surface.
///
/// `x`, `y`, `width`, `height` describe the sprite itself; `padding` is the
/// margin reserved after it (atlas) or around it (sheet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub name: String,
    /// Position of the sprite in the caller's input collection.
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
}

impl Placement {
    /// The sprite's own rectangle, padding excluded.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The rectangle reserved on the surface, trailing padding included.
    ///
    /// The padded size saturates at `u32::MAX`.
    pub fn padded_bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.width.saturating_add(self.padding),
            self.height.saturating_add(self.padding),
        )
    }
}

/// How a surface was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Atlas,
    Horizontal,
    Vertical,
    Grid,
}

impl SurfaceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceKind::Atlas => "atlas",
            SurfaceKind::Horizontal => "horizontal",
            SurfaceKind::Vertical => "vertical",
            SurfaceKind::Grid => "grid",
        }
    }
}

/// A composed pixel buffer plus the placement of every sprite on it.
///
/// Placements are listed in packing order, not spatial order.
#[derive(Debug, Clone)]
pub struct Surface {
    pub(crate) kind: SurfaceKind,
    pub(crate) pixels: PixelBuffer,
    pub(crate) placements: Vec<Placement>,
}

impl Surface {
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Moves the pixel buffer through `stage` (e.g. a pixel-art pass) and
    /// puts the result back.
    ///
    /// Returns `ForgeError::BufferSizeMismatch` if the stage changed the
    /// dimensions, since the placements would no longer match.
    pub fn map_pixels<F>(self, stage: F) -> Result<Self, ForgeError>
    where
        F: FnOnce(PixelBuffer) -> Result<PixelBuffer, ForgeError>,
    {
        let (width, height) = (self.width(), self.height());
        let expected = self.pixels.data().len();
        let pixels = stage(self.pixels)?;
        if pixels.width() != width || pixels.height() != height {
            return Err(ForgeError::BufferSizeMismatch {
                expected,
                got: pixels.data().len(),
            });
        }
        Ok(Self {
            kind: self.kind,
            pixels,
            placements: self.placements,
        })
    }
}

/// Rejects an empty sprite collection.
pub(crate) fn ensure_not_empty(sprites: &[SpriteImage]) -> Result<(), ForgeError> {
    if sprites.is_empty() {
        return Err(ForgeError::EmptyInput);
    }
    Ok(())
}
