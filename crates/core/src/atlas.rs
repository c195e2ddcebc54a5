//! Atlas construction: drives [`RectPacker`] over growing surface sizes and
//! composes the final texture.
//!
//! Sprites are sorted by descending area (stable, so equal areas keep their
//! input order) and packed into a fresh packer at each candidate size,
//! starting from a 32x32 square. When a sprite does not fit, the attempt is
//! discarded and the smaller dimension doubles (width on ties). The search
//! stops with [`ForgeError::PackingInfeasible`] once both dimensions sit at
//! the bound and packing still fails.

use tracing::instrument;

use crate::buffer::PixelBuffer;
use crate::error::ForgeError;
use crate::geometry::{next_power_of_two, prev_power_of_two, Rect};
use crate::packer::{PackHeuristic, RectPacker};
use crate::sprite::{ensure_not_empty, Placement, SpriteImage, Surface, SurfaceKind};

/// Side length of the first candidate surface.
const MIN_CANDIDATE: u32 = 32;

/// Parameters for [`AtlasBuilder::pack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasConfig {
    pub heuristic: PackHeuristic,
    /// Margin reserved after each sprite (right and bottom).
    pub padding: u32,
    /// Upper bound for both surface dimensions.
    pub max_size: u32,
    /// Round the final dimensions up to powers of two.
    pub power_of_two: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            heuristic: PackHeuristic::BestShortSideFit,
            padding: 2,
            max_size: 2048,
            power_of_two: true,
        }
    }
}

/// Packs sprites into a single texture atlas.
#[derive(Debug, Clone, Default)]
pub struct AtlasBuilder {
    config: AtlasConfig,
}

impl AtlasBuilder {
    pub fn new(config: AtlasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Packs every sprite into one surface and composes it.
    ///
    /// Returns `ForgeError::EmptyInput` for an empty collection and
    /// `ForgeError::PackingInfeasible` when no surface within `max_size`
    /// holds all sprites. Sprites are never dropped.
    #[instrument(skip_all, fields(sprites = sprites.len()))]
    pub fn pack(&self, sprites: &[SpriteImage]) -> Result<Surface, ForgeError> {
        ensure_not_empty(sprites)?;
        let cfg = &self.config;
        let infeasible = || ForgeError::PackingInfeasible {
            sprites: sprites.len(),
            max_size: cfg.max_size,
        };

        let bound = if cfg.power_of_two {
            prev_power_of_two(cfg.max_size)
        } else {
            cfg.max_size
        };
        if bound == 0 {
            return Err(ForgeError::InvalidInput(
                "max size must be greater than zero".into(),
            ));
        }

        let order = sort_by_area(sprites);
        let too_big = order.iter().any(|&i| {
            let s = &sprites[i];
            u64::from(s.width()) + u64::from(cfg.padding) > u64::from(bound)
                || u64::from(s.height()) + u64::from(cfg.padding) > u64::from(bound)
        });
        if too_big {
            tracing::debug!(bound, "a sprite exceeds the atlas bound");
            return Err(infeasible());
        }

        let mut width = MIN_CANDIDATE.min(bound);
        let mut height = width;
        let rects = loop {
            if let Some(rects) = self.try_pack(sprites, &order, width, height) {
                tracing::debug!(width, height, "all sprites placed");
                break rects;
            }
            tracing::debug!(width, height, "candidate too small");
            (width, height) = grow(width, height, bound).ok_or_else(infeasible)?;
        };

        compose(sprites, &order, &rects, cfg)
    }

    /// One packing attempt with a fresh packer. `None` if any sprite fails.
    fn try_pack(
        &self,
        sprites: &[SpriteImage],
        order: &[usize],
        width: u32,
        height: u32,
    ) -> Option<Vec<Rect>> {
        let cfg = &self.config;
        let mut packer = RectPacker::with_heuristic(width, height, cfg.padding, cfg.heuristic);
        order
            .iter()
            .map(|&i| packer.insert(sprites[i].width(), sprites[i].height()))
            .collect()
    }
}

/// Input indices sorted by descending area; ties keep input order.
fn sort_by_area(sprites: &[SpriteImage]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by(|&a, &b| sprites[b].area().cmp(&sprites[a].area()));
    order
}

/// Next candidate size, or `None` when both dimensions are at `bound`.
fn grow(width: u32, height: u32, bound: u32) -> Option<(u32, u32)> {
    let double = |n: u32| n.saturating_mul(2).min(bound);
    if width <= height && width < bound {
        Some((double(width), height))
    } else if height < bound {
        Some((width, double(height)))
    } else if width < bound {
        Some((double(width), height))
    } else {
        None
    }
}

/// Allocates the final buffer around the packed rectangles and draws every
/// sprite at its placement. Padding pixels stay transparent.
fn compose(
    sprites: &[SpriteImage],
    order: &[usize],
    rects: &[Rect],
    cfg: &AtlasConfig,
) -> Result<Surface, ForgeError> {
    let used_w = rects.iter().map(Rect::right).max().unwrap_or(1);
    let used_h = rects.iter().map(Rect::bottom).max().unwrap_or(1);
    let (width, height) = if cfg.power_of_two {
        (next_power_of_two(used_w), next_power_of_two(used_h))
    } else {
        (used_w, used_h)
    };

    let mut pixels = PixelBuffer::new(width, height)?;
    let placements = order
        .iter()
        .zip(rects)
        .map(|(&i, rect)| {
            let sprite = &sprites[i];
            pixels.blit(sprite.pixels(), rect.x, rect.y);
            Placement {
                name: sprite.name_or_index(i),
                index: i,
                x: rect.x,
                y: rect.y,
                width: sprite.width(),
                height: sprite.height(),
                padding: cfg.padding,
            }
        })
        .collect();

    Ok(Surface {
        kind: SurfaceKind::Atlas,
        pixels,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgba;
    use crate::metadata::{self, MetadataFormat};

    fn sprite(name: &str, w: u32, h: u32, color: Rgba) -> SpriteImage {
        SpriteImage::new(name, PixelBuffer::filled(w, h, color).unwrap())
    }

    fn builder(padding: u32, max_size: u32, power_of_two: bool) -> AtlasBuilder {
        AtlasBuilder::new(AtlasConfig {
            padding,
            max_size,
            power_of_two,
            ..AtlasConfig::default()
        })
    }

    fn assert_valid(surface: &Surface) {
        let placements = surface.placements();
        for (i, a) in placements.iter().enumerate() {
            let pa = a.padded_bounds();
            assert!(pa.right() <= surface.width(), "{a:?} escapes width");
            assert!(pa.bottom() <= surface.height(), "{a:?} escapes height");
            for b in &placements[i + 1..] {
                assert!(!pa.intersects(&b.padded_bounds()), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = AtlasBuilder::default().pack(&[]);
        assert!(matches!(result, Err(ForgeError::EmptyInput)));
    }

    #[test]
    fn five_64px_sprites_fit_in_256() {
        let sprites: Vec<SpriteImage> = (0..5)
            .map(|i| sprite(&format!("s{i}"), 64, 64, [255, 0, 0, 255]))
            .collect();
        let surface = builder(0, 256, true).pack(&sprites).unwrap();
        assert!(surface.width() <= 256 && surface.height() <= 256);
        assert_eq!(surface.placements().len(), 5);
        assert_valid(&surface);
        let mut names: Vec<&str> = surface.placements().iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["s0", "s1", "s2", "s3", "s4"]);

        let meta = metadata::serialize(&surface, MetadataFormat::Json, "atlas.png").unwrap();
        let json: serde_json::Value = serde_json::from_str(&meta).unwrap();
        let listed = json["sprites"].as_array().unwrap();
        assert_eq!(listed.len(), 5);
        for name in ["s0", "s1", "s2", "s3", "s4"] {
            assert!(listed.iter().any(|s| s["name"] == name), "{name} missing");
        }
    }

    #[test]
    fn sprite_wider_than_max_size_is_infeasible() {
        let sprites = vec![sprite("huge", 300, 10, [0, 0, 0, 255])];
        let result = builder(0, 256, true).pack(&sprites);
        assert!(matches!(
            result,
            Err(ForgeError::PackingInfeasible {
                sprites: 1,
                max_size: 256
            })
        ));
    }

    #[test]
    fn sprite_taller_than_max_size_is_infeasible() {
        let sprites = vec![sprite("tall", 8, 512, [0, 0, 0, 255])];
        assert!(matches!(
            builder(2, 256, false).pack(&sprites),
            Err(ForgeError::PackingInfeasible { .. })
        ));
    }

    #[test]
    fn too_many_sprites_is_infeasible() {
        let sprites: Vec<SpriteImage> = (0..5)
            .map(|i| sprite(&format!("s{i}"), 64, 64, [0, 0, 0, 255]))
            .collect();
        assert!(matches!(
            builder(0, 128, true).pack(&sprites),
            Err(ForgeError::PackingInfeasible { .. })
        ));
    }

    #[test]
    fn padding_is_excluded_from_reported_size() {
        let sprites = vec![sprite("a", 10, 12, [1, 2, 3, 255])];
        let surface = builder(2, 64, false).pack(&sprites).unwrap();
        let p = &surface.placements()[0];
        assert_eq!((p.width, p.height), (10, 12));
        assert_eq!((surface.width(), surface.height()), (12, 14));
    }

    #[test]
    fn power_of_two_rounds_final_surface() {
        let sprites = vec![sprite("a", 40, 20, [1, 2, 3, 255])];
        let surface = builder(2, 2048, true).pack(&sprites).unwrap();
        assert_eq!((surface.width(), surface.height()), (64, 32));
    }

    #[test]
    fn larger_sprites_are_placed_first() {
        let sprites = vec![
            sprite("small", 4, 4, [0, 0, 0, 255]),
            sprite("big", 30, 30, [0, 0, 0, 255]),
        ];
        let surface = builder(0, 64, true).pack(&sprites).unwrap();
        let first = &surface.placements()[0];
        assert_eq!(first.name, "big");
        assert_eq!(first.index, 1);
        assert_eq!((first.x, first.y), (0, 0));
    }

    #[test]
    fn unnamed_sprites_get_positional_names() {
        let sprites = vec![
            SpriteImage::unnamed(PixelBuffer::new(4, 4).unwrap()),
            SpriteImage::unnamed(PixelBuffer::new(8, 8).unwrap()),
        ];
        let surface = AtlasBuilder::default().pack(&sprites).unwrap();
        let names: Vec<&str> = surface.placements().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["sprite_1", "sprite_0"]);
    }

    #[test]
    fn sprite_pixels_are_drawn_at_placement() {
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let sprites = vec![sprite("r", 16, 16, red), sprite("b", 8, 8, blue)];
        let surface = builder(2, 256, true).pack(&sprites).unwrap();
        for p in surface.placements() {
            let expected = if p.name == "r" { red } else { blue };
            assert_eq!(surface.pixels().get(p.x, p.y), Some(expected));
            assert_eq!(
                surface.pixels().get(p.x + p.width - 1, p.y + p.height - 1),
                Some(expected)
            );
            // Trailing padding column stays transparent.
            assert_eq!(surface.pixels().alpha(p.x + p.width, p.y), 0);
        }
    }

    #[test]
    fn non_power_of_two_bound_is_respected() {
        let sprites = vec![sprite("a", 90, 90, [0, 0, 0, 255])];
        let surface = builder(0, 100, false).pack(&sprites).unwrap();
        assert_eq!((surface.width(), surface.height()), (90, 90));
        // Rounded to a power of two the bound becomes 64, which is too small.
        assert!(builder(0, 100, true).pack(&sprites).is_err());
    }

    #[test]
    fn grow_doubles_smaller_dimension_then_stops() {
        assert_eq!(grow(32, 32, 256), Some((64, 32)));
        assert_eq!(grow(64, 32, 256), Some((64, 64)));
        assert_eq!(grow(256, 128, 256), Some((256, 256)));
        assert_eq!(grow(60, 100, 100), Some((100, 100)));
        assert_eq!(grow(256, 256, 256), None);
    }

    #[test]
    fn sort_by_area_is_stable() {
        let sprites = vec![
            sprite("a", 4, 4, [0; 4]),
            sprite("b", 8, 2, [0; 4]),
            sprite("c", 10, 10, [0; 4]),
            sprite("d", 2, 8, [0; 4]),
        ];
        assert_eq!(sort_by_area(&sprites), vec![2, 0, 1, 3]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn sprite_sizes() -> impl Strategy<Value = Vec<(u32, u32)>> {
            prop::collection::vec((1u32..48, 1u32..48), 1..24)
        }

        fn build(sizes: &[(u32, u32)]) -> Vec<SpriteImage> {
            sizes
                .iter()
                .map(|&(w, h)| SpriteImage::unnamed(PixelBuffer::new(w, h).unwrap()))
                .collect()
        }

        proptest! {
            #[test]
            fn packed_atlas_has_no_overlap_and_stays_inside(
                sizes in sprite_sizes(),
                padding in 0u32..4,
                power_of_two in any::<bool>(),
            ) {
                let sprites = build(&sizes);
                let surface = builder(padding, 1024, power_of_two).pack(&sprites).unwrap();
                prop_assert_eq!(surface.placements().len(), sprites.len());
                assert_valid(&surface);
                if power_of_two {
                    prop_assert!(surface.width().is_power_of_two());
                    prop_assert!(surface.height().is_power_of_two());
                }
            }

            #[test]
            fn packing_is_deterministic(sizes in sprite_sizes()) {
                let sprites = build(&sizes);
                let a = AtlasBuilder::default().pack(&sprites).unwrap();
                let b = AtlasBuilder::default().pack(&sprites).unwrap();
                prop_assert_eq!(a.placements(), b.placements());
                prop_assert_eq!(a.pixels(), b.pixels());
            }
        }
    }
}
