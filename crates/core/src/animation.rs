//! Frame-by-frame animation timelines built from a laid-out surface.
//!
//! Frames follow the caller's input order (not packing order) and all share
//! the same duration, `1000 / fps` milliseconds.

use serde::Serialize;
use serde_json::json;

use crate::error::ForgeError;
use crate::geometry::Rect;
use crate::metadata::{GENERATOR, META_VERSION};
use crate::sprite::Surface;

/// One frame of an animation sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationFrame {
    pub index: usize,
    /// Display time in milliseconds.
    pub duration: f64,
    pub sprite: String,
    pub bounds: Rect,
}

/// An ordered run of frames at a fixed frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSequence {
    fps: u32,
    looping: bool,
    frames: Vec<AnimationFrame>,
}

impl AnimationSequence {
    /// Builds one frame per placement on `surface`, ordered by input index.
    ///
    /// Returns `ForgeError::InvalidInput` if `fps` is zero.
    pub fn from_surface(surface: &Surface, fps: u32, looping: bool) -> Result<Self, ForgeError> {
        if fps == 0 {
            return Err(ForgeError::InvalidInput("fps must be greater than zero".into()));
        }
        let duration = 1000.0 / f64::from(fps);
        let mut placements: Vec<_> = surface.placements().iter().collect();
        placements.sort_by_key(|p| p.index);
        let frames = placements
            .into_iter()
            .enumerate()
            .map(|(index, p)| AnimationFrame {
                index,
                duration,
                sprite: p.name.clone(),
                bounds: p.bounds(),
            })
            .collect();
        Ok(Self {
            fps,
            looping,
            frames,
        })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// `frame_count * 1000 / fps`, in milliseconds.
    pub fn total_duration(&self) -> f64 {
        self.frames.len() as f64 * 1000.0 / f64::from(self.fps)
    }
}

/// Supported animation metadata formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnimationFormat {
    /// Generic timeline: `frames[]`, `fps`, `loop`, `totalDuration`.
    #[default]
    Json,
    /// Skeletal-animation style slot attachment keys, timed in seconds.
    Skeletal,
}

const ANIMATION_FORMAT_NAMES: &[&str] = &["json", "spine"];

impl AnimationFormat {
    /// Resolves a format name. Unknown names degrade to the generic timeline.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => AnimationFormat::Json,
            "spine" | "skeletal" => AnimationFormat::Skeletal,
            _ => {
                tracing::warn!(format = name, "unsupported animation format, using json");
                AnimationFormat::Json
            }
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        ANIMATION_FORMAT_NAMES
    }
}

/// Serializes `sequence` in `format`.
pub fn serialize_animation(
    sequence: &AnimationSequence,
    format: AnimationFormat,
    image_name: &str,
) -> Result<String, ForgeError> {
    let doc = match format {
        AnimationFormat::Json => json!({
            "frames": sequence.frames(),
            "fps": sequence.fps(),
            "loop": sequence.looping(),
            "totalDuration": sequence.total_duration(),
            "meta": {
                "version": META_VERSION,
                "generator": GENERATOR,
                "image": image_name,
            },
        }),
        AnimationFormat::Skeletal => skeletal(sequence, image_name),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// A single `sprite` slot whose attachment switches at
/// `index * duration / 1000` seconds.
fn skeletal(sequence: &AnimationSequence, image_name: &str) -> serde_json::Value {
    let keys: Vec<_> = sequence
        .frames()
        .iter()
        .map(|f| {
            json!({
                "time": f.index as f64 * f.duration / 1000.0,
                "name": f.sprite,
            })
        })
        .collect();
    let first = sequence.frames().first().map(|f| f.sprite.as_str());
    json!({
        "skeleton": {
            "spine": META_VERSION,
            "fps": sequence.fps(),
            "images": image_name,
        },
        "bones": [{ "name": "root" }],
        "slots": [{ "name": "sprite", "bone": "root", "attachment": first }],
        "animations": {
            "default": {
                "loop": sequence.looping(),
                "slots": {
                    "sprite": { "attachment": keys },
                },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBuilder;
    use crate::buffer::PixelBuffer;
    use crate::sprite::SpriteImage;
    use serde_json::Value;

    fn frames_surface() -> Surface {
        // Different sizes so the atlas reorders them by area.
        let sprites = vec![
            SpriteImage::new("walk_0", PixelBuffer::new(8, 8).unwrap()),
            SpriteImage::new("walk_1", PixelBuffer::new(16, 16).unwrap()),
            SpriteImage::new("walk_2", PixelBuffer::new(12, 12).unwrap()),
        ];
        AtlasBuilder::default().pack(&sprites).unwrap()
    }

    #[test]
    fn frames_follow_input_order() {
        let seq = AnimationSequence::from_surface(&frames_surface(), 10, true).unwrap();
        let names: Vec<&str> = seq.frames().iter().map(|f| f.sprite.as_str()).collect();
        assert_eq!(names, ["walk_0", "walk_1", "walk_2"]);
        let indices: Vec<usize> = seq.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn durations_come_from_fps() {
        let seq = AnimationSequence::from_surface(&frames_surface(), 10, false).unwrap();
        assert!(seq.frames().iter().all(|f| (f.duration - 100.0).abs() < 1e-9));
        assert!((seq.total_duration() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fps_is_rejected() {
        let result = AnimationSequence::from_surface(&frames_surface(), 0, true);
        assert!(matches!(result, Err(ForgeError::InvalidInput(_))));
    }

    #[test]
    fn json_timeline_has_frames_and_totals() {
        let seq = AnimationSequence::from_surface(&frames_surface(), 12, true).unwrap();
        let out = serialize_animation(&seq, AnimationFormat::Json, "walk.png").unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["fps"], 12);
        assert_eq!(json["loop"], true);
        assert_eq!(json["frames"].as_array().unwrap().len(), 3);
        assert_eq!(json["frames"][1]["sprite"], "walk_1");
        assert_eq!(json["frames"][1]["bounds"]["width"], 16);
        assert!((json["totalDuration"].as_f64().unwrap() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn skeletal_times_are_seconds() {
        let seq = AnimationSequence::from_surface(&frames_surface(), 10, true).unwrap();
        let out = serialize_animation(&seq, AnimationFormat::Skeletal, "walk.png").unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        let keys = &json["animations"]["default"]["slots"]["sprite"]["attachment"];
        assert_eq!(keys[0]["time"], 0.0);
        assert!((keys[2]["time"].as_f64().unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(keys[2]["name"], "walk_2");
        assert_eq!(json["slots"][0]["attachment"], "walk_0");
    }

    #[test]
    fn unknown_animation_format_falls_back_to_json() {
        assert_eq!(AnimationFormat::from_name("gif"), AnimationFormat::Json);
        assert_eq!(AnimationFormat::from_name("Spine"), AnimationFormat::Skeletal);
    }
}
