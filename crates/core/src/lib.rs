#![deny(unsafe_code)]
//! Core types and algorithms for spriteforge.
//!
//! Provides the RGBA `PixelBuffer`, `SpriteImage` inputs, the `RectPacker`
//! free-rectangle allocator, the `AtlasBuilder` size search, formula-based
//! `SheetLayout`s, metadata and animation serializers, the pixel-art stages
//! (quantize, dither, outline, pixelate), and `ExportOptions`.
//!
//! Everything here is synchronous and allocation-local: no state survives
//! between calls, so independent requests can run concurrently as long as
//! each uses its own buffers.

pub mod animation;
pub mod atlas;
pub mod buffer;
pub mod error;
pub mod geometry;
pub mod metadata;
pub mod options;
pub mod packer;
pub mod pixel_art;
pub mod sheet;
pub mod sprite;

pub use animation::{AnimationFormat, AnimationFrame, AnimationSequence};
pub use atlas::{AtlasBuilder, AtlasConfig};
pub use buffer::{PixelBuffer, Rgba};
pub use error::ForgeError;
pub use geometry::{next_power_of_two, Rect};
pub use metadata::MetadataFormat;
pub use options::ExportOptions;
pub use packer::{PackHeuristic, RectPacker};
pub use pixel_art::PixelArtPipeline;
pub use sheet::{LayoutMode, SheetLayout};
pub use sprite::{Placement, SpriteImage, Surface, SurfaceKind};
