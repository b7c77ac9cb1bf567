use std::path::{Path, PathBuf};

use rand::Rng;

use crate::assets::decode;
use crate::foundation::core::{Size, Zone};

/// Largest fraction cropped from any one side.
pub const MAX_CROP_PER_SIDE: f64 = 0.49;

/// Where the large image sits relative to the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Vertical band on the left, text on the right.
    Left,
    /// Vertical band on the right, text on the left.
    Right,
    /// Horizontal band at the top, text below.
    Top,
    /// Horizontal band at the bottom, text above.
    Bottom,
}

impl Orientation {
    /// Every orientation, in declaration order.
    pub const ALL: [Orientation; 4] = [
        Orientation::Left,
        Orientation::Right,
        Orientation::Top,
        Orientation::Bottom,
    ];
}

// Five-slot tables keep the draw random but biased by the image shape.
const LANDSCAPE_BIAS: [Orientation; 5] = [
    Orientation::Top,
    Orientation::Bottom,
    Orientation::Right,
    Orientation::Left,
    Orientation::Top,
];
const PORTRAIT_BIAS: [Orientation; 5] = [
    Orientation::Left,
    Orientation::Right,
    Orientation::Top,
    Orientation::Bottom,
    Orientation::Right,
];

/// Draw an orientation for a large image of `source_px`, or uniformly when unknown.
pub fn pick_orientation<R: Rng + ?Sized>(source_px: Option<(u32, u32)>, rng: &mut R) -> Orientation {
    let table: &[Orientation] = match source_px {
        Some((w, h)) if w > 0 && h > 0 => {
            if w >= h {
                &LANDSCAPE_BIAS
            } else {
                &PORTRAIT_BIAS
            }
        }
        _ => &Orientation::ALL,
    };
    table[rng.random_range(0..table.len())]
}

/// Fractions cut from each side of a source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Crop {
    /// Cut from the left edge.
    pub left: f64,
    /// Cut from the top edge.
    pub top: f64,
    /// Cut from the right edge.
    pub right: f64,
    /// Cut from the bottom edge.
    pub bottom: f64,
}

impl Crop {
    /// `true` when nothing is trimmed.
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }

    /// Visible part of a `w` x `h` source, in source pixels: `(x, y, width, height)`.
    pub fn visible_rect(&self, w: f64, h: f64) -> (f64, f64, f64, f64) {
        (
            w * self.left,
            h * self.top,
            w * (1.0 - self.left - self.right),
            h * (1.0 - self.top - self.bottom),
        )
    }
}

/// Symmetric crop that lets a `src_w` x `src_h` image fill a `dst_w` x `dst_h` box undistorted.
pub fn crop_to_fill(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> Crop {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !(valid(src_w) && valid(src_h) && valid(dst_w) && valid(dst_h)) {
        return Crop::default();
    }
    let src_ratio = src_w / src_h;
    let dst_ratio = dst_w / dst_h;
    let per_side = |visible: f64| ((1.0 - visible) / 2.0).clamp(0.0, MAX_CROP_PER_SIDE);

    if src_ratio > dst_ratio {
        let each = per_side(dst_ratio / src_ratio);
        Crop {
            left: each,
            right: each,
            ..Crop::default()
        }
    } else if src_ratio < dst_ratio {
        let each = per_side(src_ratio / dst_ratio);
        Crop {
            top: each,
            bottom: each,
            ..Crop::default()
        }
    } else {
        Crop::default()
    }
}

/// Which image slot a placement fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    /// Main image band.
    Large,
    /// Thumbnail.
    Small,
}

/// A user image placed on a slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImagePlacement {
    /// Slot filled.
    pub slot: ImageSlot,
    /// Source file.
    pub path: PathBuf,
    /// Target zone on the slide.
    pub zone: Zone,
    /// Source size in pixels.
    pub source_px: (u32, u32),
    /// Crop applied to the source.
    pub crop: Crop,
}

/// Text and image zones for one slide.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutPlan {
    /// Chosen orientation.
    pub orientation: Orientation,
    /// Where the body text goes.
    pub text_zone: Zone,
    /// Large image zone.
    pub large_image_zone: Option<Zone>,
    /// Small image zone.
    pub small_image_zone: Option<Zone>,
}

/// A user image available to a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserImage {
    /// Source file.
    pub path: PathBuf,
    /// Pixel size; `None` when the file could not be decoded.
    pub source_px: Option<(u32, u32)>,
}

/// Ordered user images shared by all slides of one build.
#[derive(Clone, Debug, Default)]
pub struct UserImagePool {
    images: Vec<UserImage>,
}

impl UserImagePool {
    /// Keep the paths that exist and probe their sizes.
    pub fn prepare<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut images = Vec::with_capacity(paths.len());
        for p in paths {
            let path = p.as_ref();
            if !path.exists() {
                tracing::warn!(path = %path.display(), "user image not found, skipped");
                continue;
            }
            let source_px = match decode::probe_dimensions(path) {
                Ok(px) => Some(px),
                Err(err) => {
                    tracing::warn!(error = %err, "user image undecodable, its slots stay empty");
                    None
                }
            };
            images.push(UserImage {
                path: path.to_path_buf(),
                source_px,
            });
        }
        Self { images }
    }

    /// Pool from already probed images, kept as given.
    pub fn from_images(images: Vec<UserImage>) -> Self {
        Self { images }
    }

    /// Number of usable images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when no image survived preparation.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image at pool position `index`.
    pub fn get(&self, index: usize) -> Option<&UserImage> {
        self.images.get(index)
    }

    /// Pool indices `(large, small)` consumed by slide `slide_index`.
    ///
    /// One image fills both slots; otherwise consecutive pairs rotate through the pool.
    pub fn pair_for_slide(&self, slide_index: usize) -> Option<(usize, usize)> {
        match self.images.len() {
            0 => None,
            1 => Some((0, 0)),
            n => {
                let first = (slide_index * 2) % n;
                Some((first, (first + 1) % n))
            }
        }
    }
}

/// Splits a slide between body text and up to two user images.
#[derive(Clone, Debug)]
pub struct ImageLayoutPlanner {
    canvas: Size,
    min_text: f64,
}

impl ImageLayoutPlanner {
    /// Planner for a `canvas`-sized slide whose text zone keeps at least `min_text` of each
    /// dimension.
    pub fn new(canvas: Size, min_text: f64) -> Self {
        Self { canvas, min_text }
    }

    /// Text/large/small zones for `orientation`, carved from `base` (the body zone the slide
    /// would use without images).
    pub fn carve(&self, orientation: Orientation, has_title: bool, base: Zone) -> LayoutPlan {
        let t = has_title;
        let pick = |with: f64, without: f64| if t { with } else { without };

        let (text, large, small) = match orientation {
            Orientation::Top => (
                Zone::from_edges(base.left, pick(0.50, 0.44), base.right(), 0.92),
                Zone::new(0.06, pick(0.10, 0.06), 0.88, pick(0.30, 0.34)),
                Zone::new(0.68, pick(0.38, 0.34), 0.24, 0.16),
            ),
            Orientation::Bottom => (
                Zone::from_edges(base.left, pick(0.14, 0.10), base.right(), 0.58),
                Zone::new(0.06, 0.62, 0.88, 0.30),
                Zone::new(0.08, 0.48, 0.22, 0.14),
            ),
            Orientation::Left => (
                Zone::from_edges(0.53, base.top, 0.93, base.bottom()),
                Zone::new(0.05, pick(0.18, 0.08), 0.45, pick(0.70, 0.82)),
                Zone::new(0.34, pick(0.62, 0.66), 0.16, 0.22),
            ),
            Orientation::Right => (
                Zone::from_edges(0.07, base.top, 0.47, base.bottom()),
                Zone::new(0.50, pick(0.18, 0.08), 0.45, pick(0.70, 0.82)),
                Zone::new(0.50, pick(0.62, 0.66), 0.16, 0.22),
            ),
        };

        LayoutPlan {
            orientation,
            text_zone: text.ensure_min_size(self.min_text, self.min_text),
            large_image_zone: Some(large),
            small_image_zone: Some(small),
        }
    }

    /// Plan the images of slide `slide_index`. `None` when the pool has nothing placeable.
    pub fn plan_slide<R: Rng + ?Sized>(
        &self,
        pool: &UserImagePool,
        slide_index: usize,
        has_title: bool,
        base: Zone,
        rng: &mut R,
    ) -> Option<(LayoutPlan, Vec<ImagePlacement>)> {
        let (large_idx, small_idx) = pool.pair_for_slide(slide_index)?;
        let large = pool.get(large_idx)?;
        let small = pool.get(small_idx)?;
        if large.source_px.is_none() && small.source_px.is_none() {
            return None;
        }

        let orientation = pick_orientation(large.source_px, rng);
        let mut plan = self.carve(orientation, has_title, base);

        let mut placements = Vec::with_capacity(2);
        for (slot, image, zone) in [
            (ImageSlot::Large, large, &mut plan.large_image_zone),
            (ImageSlot::Small, small, &mut plan.small_image_zone),
        ] {
            let (Some(target), Some(source_px)) = (*zone, image.source_px) else {
                *zone = None;
                continue;
            };
            placements.push(self.place(slot, image, target, source_px));
        }
        Some((plan, placements))
    }

    fn place(
        &self,
        slot: ImageSlot,
        image: &UserImage,
        zone: Zone,
        source_px: (u32, u32),
    ) -> ImagePlacement {
        let target = zone.to_absolute(self.canvas);
        ImagePlacement {
            slot,
            path: image.path.clone(),
            zone,
            source_px,
            crop: crop_to_fill(
                f64::from(source_px.0),
                f64::from(source_px.1),
                target.width(),
                target.height(),
            ),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/images.rs"]
mod tests;
