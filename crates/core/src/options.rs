//! Per-call export options and the lenient JSON helpers that read them.
//!
//! The `param_*` helpers take a JSON value, a key name, and a default. If the
//! key is missing or holds the wrong type, the default is returned, so
//! [`ExportOptions::from_json`] never fails. Values that parse but cannot
//! work are caught separately by [`ExportOptions::validate`].

use serde_json::Value;

use crate::atlas::AtlasConfig;
use crate::error::ForgeError;
use crate::packer::PackHeuristic;
use crate::sheet::{LayoutMode, SheetLayout};

pub const DEFAULT_PADDING: u32 = 2;
pub const DEFAULT_MAX_SIZE: u32 = 2048;
pub const DEFAULT_PALETTE_SIZE: u32 = 16;
pub const DEFAULT_FPS: u32 = 12;
pub const DEFAULT_FORMAT: &str = "json";
pub const DEFAULT_IMAGE_NAME: &str = "spritesheet.png";

/// Extracts a `u32` from `params[name]`, returning `default` if missing,
/// negative, fractional, or too large.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts an optional string; `None` if missing or wrong type.
pub fn param_opt_string(params: &Value, name: &str) -> Option<String> {
    params.get(name).and_then(Value::as_str).map(String::from)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    param_opt_string(params, name).unwrap_or_else(|| default.to_owned())
}

/// Everything a caller can tune for one export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub layout: LayoutMode,
    /// Use the packed atlas instead of a formula layout.
    pub atlas: bool,
    pub heuristic: PackHeuristic,
    pub padding: u32,
    pub power_of_two: bool,
    pub max_size: u32,
    /// Run the pixel-art pipeline over the composed surface.
    pub pixel_art: bool,
    pub palette_size: u32,
    /// Add an error-diffusion pass to the pixel-art pipeline.
    pub dither: bool,
    pub fps: u32,
    pub looping: bool,
    /// Metadata format name; unknown names degrade to generic JSON.
    pub format: String,
    /// Target engine name; when set it decides the metadata format.
    pub engine: Option<String>,
    /// File name recorded in the metadata for the composed image.
    pub image_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Horizontal,
            atlas: false,
            heuristic: PackHeuristic::BestShortSideFit,
            padding: DEFAULT_PADDING,
            power_of_two: true,
            max_size: DEFAULT_MAX_SIZE,
            pixel_art: false,
            palette_size: DEFAULT_PALETTE_SIZE,
            dither: false,
            fps: DEFAULT_FPS,
            looping: true,
            format: DEFAULT_FORMAT.to_owned(),
            engine: None,
            image_name: DEFAULT_IMAGE_NAME.to_owned(),
        }
    }
}

impl ExportOptions {
    /// Reads options from a JSON object, falling back to defaults key by key.
    ///
    /// Recognized keys: `layout`, `atlas`, `heuristic`, `padding`,
    /// `powerOfTwo`, `maxSize`, `pixelArt`, `paletteSize`, `dither`, `fps`,
    /// `loop`, `format`, `engine`, `imageName`.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            layout: param_opt_string(params, "layout")
                .map_or(d.layout, |name| LayoutMode::from_name(&name)),
            atlas: param_bool(params, "atlas", d.atlas),
            heuristic: param_opt_string(params, "heuristic")
                .map_or(d.heuristic, |name| PackHeuristic::from_name(&name)),
            padding: param_u32(params, "padding", d.padding),
            power_of_two: param_bool(params, "powerOfTwo", d.power_of_two),
            max_size: param_u32(params, "maxSize", d.max_size),
            pixel_art: param_bool(params, "pixelArt", d.pixel_art),
            palette_size: param_u32(params, "paletteSize", d.palette_size),
            dither: param_bool(params, "dither", d.dither),
            fps: param_u32(params, "fps", d.fps),
            looping: param_bool(params, "loop", d.looping),
            format: param_string(params, "format", &d.format),
            engine: param_opt_string(params, "engine"),
            image_name: param_string(params, "imageName", &d.image_name),
        }
    }

    /// Rejects option values no operation can work with.
    pub fn validate(&self) -> Result<(), ForgeError> {
        if self.max_size == 0 {
            return Err(ForgeError::InvalidInput(
                "max size must be greater than zero".into(),
            ));
        }
        if !(1..=256).contains(&self.palette_size) {
            return Err(ForgeError::InvalidInput(format!(
                "palette size must be in 1..=256, got {}",
                self.palette_size
            )));
        }
        if self.fps == 0 {
            return Err(ForgeError::InvalidInput("fps must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn atlas_config(&self) -> AtlasConfig {
        AtlasConfig {
            heuristic: self.heuristic,
            padding: self.padding,
            max_size: self.max_size,
            power_of_two: self.power_of_two,
        }
    }

    pub fn sheet_layout(&self) -> SheetLayout {
        SheetLayout::new(self.layout, self.padding, self.power_of_two)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_u32_extracts_existing_integer() {
        assert_eq!(param_u32(&json!({"padding": 4}), "padding", 2), 4);
    }

    #[test]
    fn param_u32_rejects_negative_fractional_and_huge() {
        assert_eq!(param_u32(&json!({"n": -1}), "n", 7), 7);
        assert_eq!(param_u32(&json!({"n": 2.5}), "n", 7), 7);
        assert_eq!(param_u32(&json!({"n": 5_000_000_000u64}), "n", 7), 7);
        assert_eq!(param_u32(&json!({"n": "3"}), "n", 7), 7);
    }

    #[test]
    fn param_bool_returns_default_for_wrong_type() {
        assert!(param_bool(&json!({"loop": 1}), "loop", true));
        assert!(!param_bool(&json!({"loop": false}), "loop", true));
    }

    #[test]
    fn param_string_handles_missing_and_non_object() {
        assert_eq!(param_string(&json!({}), "format", "json"), "json");
        assert_eq!(param_string(&json!("xml"), "format", "json"), "json");
        assert_eq!(param_opt_string(&json!({"engine": 3}), "engine"), None);
    }

    #[test]
    fn defaults_match_documented_values() {
        let o = ExportOptions::default();
        assert_eq!(o.layout, LayoutMode::Horizontal);
        assert_eq!(o.padding, 2);
        assert!(o.power_of_two);
        assert_eq!(o.max_size, 2048);
        assert_eq!(o.palette_size, 16);
        assert_eq!(o.fps, 12);
        assert!(o.looping);
        assert!(o.engine.is_none());
        assert_eq!(o.format, "json");
    }

    #[test]
    fn from_json_empty_object_is_default() {
        assert_eq!(ExportOptions::from_json(&json!({})), ExportOptions::default());
    }

    #[test]
    fn from_json_reads_every_key() {
        let o = ExportOptions::from_json(&json!({
            "layout": "grid",
            "atlas": true,
            "heuristic": "baf",
            "padding": 0,
            "powerOfTwo": false,
            "maxSize": 512,
            "pixelArt": true,
            "paletteSize": 8,
            "dither": true,
            "fps": 24,
            "loop": false,
            "format": "xml",
            "engine": "godot",
            "imageName": "hero.png",
        }));
        assert_eq!(o.layout, LayoutMode::Grid);
        assert!(o.atlas);
        assert_eq!(o.heuristic, PackHeuristic::BestAreaFit);
        assert_eq!(o.padding, 0);
        assert!(!o.power_of_two);
        assert_eq!(o.max_size, 512);
        assert!(o.pixel_art);
        assert_eq!(o.palette_size, 8);
        assert!(o.dither);
        assert_eq!(o.fps, 24);
        assert!(!o.looping);
        assert_eq!(o.format, "xml");
        assert_eq!(o.engine.as_deref(), Some("godot"));
        assert_eq!(o.image_name, "hero.png");
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let bad_palette = ExportOptions {
            palette_size: 0,
            ..ExportOptions::default()
        };
        assert!(matches!(
            bad_palette.validate(),
            Err(ForgeError::InvalidInput(_))
        ));
        let bad_fps = ExportOptions {
            fps: 0,
            ..ExportOptions::default()
        };
        assert!(bad_fps.validate().is_err());
        let bad_max = ExportOptions {
            max_size: 0,
            ..ExportOptions::default()
        };
        assert!(bad_max.validate().is_err());
        assert!(ExportOptions::default().validate().is_ok());
    }

    #[test]
    fn configs_carry_shared_fields() {
        let o = ExportOptions {
            padding: 5,
            power_of_two: false,
            max_size: 300,
            ..ExportOptions::default()
        };
        let atlas = o.atlas_config();
        assert_eq!((atlas.padding, atlas.max_size, atlas.power_of_two), (5, 300, false));
        let sheet = o.sheet_layout();
        assert_eq!((sheet.padding, sheet.power_of_two), (5, false));
    }
}
