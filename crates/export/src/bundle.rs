//! Export bundles: a composed, PNG-encoded sheet plus its metadata.

use std::time::Instant;

use spriteforge_core::animation::{serialize_animation, AnimationFormat, AnimationSequence};
use spriteforge_core::atlas::AtlasBuilder;
use spriteforge_core::error::ForgeError;
use spriteforge_core::metadata;
use spriteforge_core::options::ExportOptions;
use spriteforge_core::pixel_art::PixelArtPipeline;
use spriteforge_core::sprite::{SpriteImage, Surface};
use tracing::instrument;

use crate::snapshot::encode_png;
use crate::{file_stem, resolve_format};

/// Output of an export request.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// PNG-encoded sheet.
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Serialized metadata (JSON, XML, or text).
    pub metadata: String,
    /// Extension for the metadata file, without the dot.
    pub metadata_extension: &'static str,
    /// Engine loader snippet when an engine target was requested.
    pub snippet: Option<String>,
}

impl ExportBundle {
    /// Suggested metadata file name, derived from the image name.
    pub fn metadata_name(&self, image_name: &str) -> String {
        format!("{}.{}", file_stem(image_name), self.metadata_extension)
    }
}

/// Lays out (or packs) the sprites and applies the optional pixel-art pass.
pub fn compose(sprites: &[SpriteImage], options: &ExportOptions) -> Result<Surface, ForgeError> {
    let surface = if options.atlas {
        AtlasBuilder::new(options.atlas_config()).pack(sprites)?
    } else {
        options.sheet_layout().layout(sprites)?
    };
    if !options.pixel_art {
        return Ok(surface);
    }
    let pipeline = PixelArtPipeline {
        palette_size: options.palette_size,
        dither: options.dither,
        outline: true,
    };
    surface.map_pixels(|pixels| pipeline.apply(pixels))
}

/// Exports a sprite sheet or atlas with placement metadata.
///
/// The metadata format comes from `options.engine` when set, otherwise from
/// `options.format`. Unknown names never fail; see [`resolve_format`].
#[instrument(skip_all, fields(sprites = sprites.len()))]
pub fn export_sprites(
    sprites: &[SpriteImage],
    options: &ExportOptions,
) -> Result<ExportBundle, ForgeError> {
    options.validate()?;
    let started = Instant::now();
    let surface = compose(sprites, options)?;
    let (format, target) = resolve_format(options.engine.as_deref(), &options.format);
    let metadata = metadata::serialize(&surface, format, &options.image_name)?;
    let metadata_name = format!("{}.{}", file_stem(&options.image_name), format.extension());
    let snippet = target.map(|t| t.snippet(&options.image_name, &metadata_name));
    let image = encode_png(surface.pixels())?;
    tracing::debug!(
        width = surface.width(),
        height = surface.height(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "export complete"
    );
    Ok(ExportBundle {
        image,
        width: surface.width(),
        height: surface.height(),
        metadata,
        metadata_extension: format.extension(),
        snippet,
    })
}

/// Exports the sprites as animation frames with a timeline.
#[instrument(skip_all, fields(sprites = sprites.len()))]
pub fn export_animation(
    sprites: &[SpriteImage],
    options: &ExportOptions,
    format: AnimationFormat,
) -> Result<ExportBundle, ForgeError> {
    options.validate()?;
    let surface = compose(sprites, options)?;
    let sequence = AnimationSequence::from_surface(&surface, options.fps, options.looping)?;
    let metadata = serialize_animation(&sequence, format, &options.image_name)?;
    Ok(ExportBundle {
        image: encode_png(surface.pixels())?,
        width: surface.width(),
        height: surface.height(),
        metadata,
        metadata_extension: "json",
        snippet: None,
    })
}
