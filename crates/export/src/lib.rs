#![deny(unsafe_code)]
//! Engine targets and export bundles for spriteforge.
//!
//! This crate sits between `spriteforge-core` (packing, layout, metadata) and
//! the CLI. It maps engine names to the metadata format and loader snippet
//! each engine expects, and (with the default `png` feature) turns sprites
//! into `{image bytes, metadata}` bundles.

#[cfg(feature = "png")]
pub mod bundle;

#[cfg(feature = "png")]
pub mod snapshot;

#[cfg(feature = "png")]
pub use bundle::{export_animation, export_sprites, ExportBundle};

use spriteforge_core::metadata::MetadataFormat;
use std::path::Path;

/// All recognized engine names.
const ENGINE_NAMES: &[&str] = &["phaser", "godot", "unity", "unreal"];

/// Game engines with a dedicated export profile.
///
/// Each target is a base metadata format plus a loader snippet; there is no
/// per-engine serialization code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTarget {
    Phaser,
    Godot,
    Unity,
    Unreal,
}

impl EngineTarget {
    /// Looks up an engine by name (case insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "phaser" => Some(EngineTarget::Phaser),
            "godot" => Some(EngineTarget::Godot),
            "unity" => Some(EngineTarget::Unity),
            "unreal" => Some(EngineTarget::Unreal),
            _ => None,
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            EngineTarget::Phaser => "phaser",
            EngineTarget::Godot => "godot",
            EngineTarget::Unity => "unity",
            EngineTarget::Unreal => "unreal",
        }
    }

    /// Metadata format the engine's importer reads.
    pub fn base_format(self) -> MetadataFormat {
        match self {
            EngineTarget::Phaser | EngineTarget::Godot | EngineTarget::Unity => {
                MetadataFormat::Atlas
            }
            EngineTarget::Unreal => MetadataFormat::Xml,
        }
    }

    /// Loader code for the exported image and metadata files.
    pub fn snippet(self, image_name: &str, metadata_name: &str) -> String {
        let key = file_stem(image_name);
        match self {
            EngineTarget::Phaser => format!(
                "// preload()\nthis.load.atlas('{key}', '{image_name}', '{metadata_name}');\n"
            ),
            EngineTarget::Godot => format!(
                "var atlas := load(\"res://{image_name}\") as Texture2D\n\
                 var doc = JSON.parse_string(FileAccess.get_file_as_string(\"res://{metadata_name}\"))\n\
                 var regions := {{}}\n\
                 for f in doc[\"frames\"]:\n\
                 \tvar tex := AtlasTexture.new()\n\
                 \ttex.atlas = atlas\n\
                 \ttex.region = Rect2(f.frame.x, f.frame.y, f.frame.w, f.frame.h)\n\
                 \tregions[f.filename] = tex\n"
            ),
            EngineTarget::Unity => format!(
                "// Place {image_name} under Resources/ and parse {metadata_name} for frames.\n\
                 var texture = Resources.Load<Texture2D>(\"{key}\");\n\
                 Sprite Slice(int x, int y, int w, int h) =>\n\
                 \x20   Sprite.Create(texture, new Rect(x, texture.height - y - h, w, h), new Vector2(0.5f, 0.5f));\n"
            ),
            EngineTarget::Unreal => format!(
                "Paper2D: import {image_name} as a texture, then create a Sprite Sheet \
                 from {metadata_name} (one SubTexture per sprite).\n"
            ),
        }
    }
}

/// Metadata format and engine target for a request.
///
/// A recognized engine decides the format; an unrecognized engine falls back
/// to atlas JSON; with no engine the named format is used (unknown names
/// become generic JSON).
pub fn resolve_format(
    engine: Option<&str>,
    format: &str,
) -> (MetadataFormat, Option<EngineTarget>) {
    match engine {
        Some(name) => match EngineTarget::from_name(name) {
            Some(target) => (target.base_format(), Some(target)),
            None => {
                tracing::warn!(engine = name, "unknown engine, exporting atlas json");
                (MetadataFormat::Atlas, None)
            }
        },
        None => (MetadataFormat::from_name(format), None),
    }
}

/// File name without its extension, or the whole name if there is none.
pub(crate) fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
