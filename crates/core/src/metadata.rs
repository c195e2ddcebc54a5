//! Placement metadata in exchange formats.
//!
//! Every format is produced from a [`Surface`]. Unknown format names are not
//! an error: they resolve to [`MetadataFormat::Json`], so callers always get
//! a valid artifact back.

use serde::Serialize;

use crate::error::ForgeError;
use crate::sprite::{Placement, Surface};

/// Version string written into every metadata `meta` block.
pub const META_VERSION: &str = "1.0";
/// Generator name written into every metadata `meta` block.
pub const GENERATOR: &str = "spriteforge";

/// Supported metadata formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataFormat {
    /// `{format, sprites: [...], meta: {...}}`.
    #[default]
    Json,
    /// TexturePacker-style JSON array with `frame` records.
    Atlas,
    /// `<TextureAtlas>` with one `<SubTexture/>` per sprite.
    Xml,
    /// One `name x y width height` line per sprite.
    Text,
}

const FORMAT_NAMES: &[&str] = &["json", "atlas", "xml", "text"];

impl MetadataFormat {
    /// Resolves a format name. Unknown names degrade to generic JSON.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => MetadataFormat::Json,
            "atlas" | "texturepacker" => MetadataFormat::Atlas,
            "xml" => MetadataFormat::Xml,
            "text" | "txt" => MetadataFormat::Text,
            _ => {
                tracing::warn!(format = name, "unsupported metadata format, using json");
                MetadataFormat::Json
            }
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        FORMAT_NAMES
    }

    /// File extension for the serialized artifact.
    pub fn extension(self) -> &'static str {
        match self {
            MetadataFormat::Json | MetadataFormat::Atlas => "json",
            MetadataFormat::Xml => "xml",
            MetadataFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct Size {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct GenericSprite<'a> {
    name: &'a str,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct GenericMeta<'a> {
    version: &'a str,
    generator: &'a str,
    image: &'a str,
    size: Size,
}

#[derive(Serialize)]
struct GenericDoc<'a> {
    format: &'a str,
    sprites: Vec<GenericSprite<'a>>,
    meta: GenericMeta<'a>,
}

#[derive(Serialize)]
struct FrameRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AtlasFrame<'a> {
    filename: &'a str,
    frame: FrameRect,
    rotated: bool,
    trimmed: bool,
    sprite_source_size: FrameRect,
    source_size: Size,
}

#[derive(Serialize)]
struct AtlasMeta<'a> {
    app: &'a str,
    version: &'a str,
    image: &'a str,
    format: &'a str,
    size: Size,
    scale: &'a str,
}

#[derive(Serialize)]
struct AtlasDoc<'a> {
    frames: Vec<AtlasFrame<'a>>,
    meta: AtlasMeta<'a>,
}

/// Serializes the placements of `surface` in `format`.
///
/// `image_name` is the file name the composed image will be saved under.
pub fn serialize(
    surface: &Surface,
    format: MetadataFormat,
    image_name: &str,
) -> Result<String, ForgeError> {
    match format {
        MetadataFormat::Json => to_generic_json(surface, image_name),
        MetadataFormat::Atlas => to_atlas_json(surface, image_name),
        MetadataFormat::Xml => Ok(to_xml(surface, image_name)),
        MetadataFormat::Text => Ok(to_text(surface.placements())),
    }
}

/// Serializes by format name, degrading unknown names to generic JSON.
pub fn serialize_named(
    surface: &Surface,
    format: &str,
    image_name: &str,
) -> Result<String, ForgeError> {
    serialize(surface, MetadataFormat::from_name(format), image_name)
}

pub fn to_generic_json(surface: &Surface, image_name: &str) -> Result<String, ForgeError> {
    let doc = GenericDoc {
        format: surface.kind().as_str(),
        sprites: surface
            .placements()
            .iter()
            .map(|p| GenericSprite {
                name: &p.name,
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
            })
            .collect(),
        meta: GenericMeta {
            version: META_VERSION,
            generator: GENERATOR,
            image: image_name,
            size: Size {
                w: surface.width(),
                h: surface.height(),
            },
        },
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// TexturePacker-style atlas JSON. No trimming or rotation is performed, so
/// `spriteSourceSize` and `sourceSize` always equal the frame size.
pub fn to_atlas_json(surface: &Surface, image_name: &str) -> Result<String, ForgeError> {
    let doc = AtlasDoc {
        frames: surface
            .placements()
            .iter()
            .map(|p| AtlasFrame {
                filename: &p.name,
                frame: FrameRect {
                    x: p.x,
                    y: p.y,
                    w: p.width,
                    h: p.height,
                },
                rotated: false,
                trimmed: false,
                sprite_source_size: FrameRect {
                    x: 0,
                    y: 0,
                    w: p.width,
                    h: p.height,
                },
                source_size: Size {
                    w: p.width,
                    h: p.height,
                },
            })
            .collect(),
        meta: AtlasMeta {
            app: GENERATOR,
            version: META_VERSION,
            image: image_name,
            format: "RGBA8888",
            size: Size {
                w: surface.width(),
                h: surface.height(),
            },
            scale: "1",
        },
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn to_xml(surface: &Surface, image_name: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<TextureAtlas imagePath=\"{}\" width=\"{}\" height=\"{}\">\n",
        escape_xml(image_name),
        surface.width(),
        surface.height()
    ));
    for p in surface.placements() {
        out.push_str(&format!(
            "    <SubTexture name=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>\n",
            escape_xml(&p.name),
            p.x,
            p.y,
            p.width,
            p.height
        ));
    }
    out.push_str("</TextureAtlas>\n");
    out
}

/// One `name x y width height` line per placement.
///
/// Whitespace inside a name is written as `_` so every line splits into
/// exactly five fields.
pub fn to_text(placements: &[Placement]) -> String {
    placements
        .iter()
        .map(|p| {
            let name: String = p
                .name
                .chars()
                .map(|c| if c.is_whitespace() { '_' } else { c })
                .collect();
            format!("{name} {} {} {} {}\n", p.x, p.y, p.width, p.height)
        })
        .collect()
}

/// Escapes the five XML special characters for use inside attribute values.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
