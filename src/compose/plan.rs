//! Per-slide render plans handed to the container serializer.
//!
//! A plan says what to paint where; it carries no pixels. Paths point either at caller-owned
//! files or into the build scratch directory, so plans are only meaningful while the
//! [`ComposedDeck`](crate::ComposedDeck) that produced them is alive.

use std::path::PathBuf;

use crate::foundation::core::{Rgb8, Zone};
use crate::theme::synth::ShapeOp;

pub use crate::layout::images::{Crop, ImagePlacement, ImageSlot};

/// Where a slide's content comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    /// A slide built from caller content.
    Content,
    /// The trailing credits slide.
    Credits,
}

/// Full-bleed backdrop of a slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundOp {
    /// Picture stretched over the canvas after `crop`.
    Raster {
        /// Image file, caller-owned or in the scratch directory.
        path: PathBuf,
        /// Pixel size of the image.
        source_px: (u32, u32),
        /// Fraction trimmed from each side before stretching.
        crop: Crop,
    },
    /// Vector shapes painted back to front.
    Procedural {
        /// Index into [`PALETTES`](crate::PALETTES).
        palette_index: usize,
        /// Back to front.
        shapes: Vec<ShapeOp>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Horizontal alignment of every paragraph in a block.
pub enum TextAlign {
    /// Flush left.
    Left,
    /// Centered in the zone.
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Where the paragraphs sit vertically inside their zone.
pub enum VerticalAnchor {
    /// First line at the top edge.
    Top,
    /// Centered as a whole.
    Middle,
}

/// Paragraphs laid out inside one zone with a single style.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextBlock {
    /// Box the text is laid out in.
    pub zone: Zone,
    /// One paragraph per entry.
    pub lines: Vec<String>,
    /// Font family name.
    pub font_name: String,
    /// Font size in points.
    pub font_size_pt: f32,
    /// Text color.
    pub color: Rgb8,
    /// Bold weight.
    pub bold: bool,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Vertical anchoring.
    pub anchor: VerticalAnchor,
    /// Space after each paragraph.
    pub space_after_pt: f32,
}

/// Everything needed to draw one slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlidePlan {
    /// Position in the output deck.
    pub index: usize,
    /// Content or credits.
    pub kind: SlideKind,
    /// Backdrop painted first.
    pub background: BackgroundOp,
    /// Only the first content slide carries a title.
    pub title: Option<TextBlock>,
    /// Bullets, or names on the credits slide.
    pub body: TextBlock,
    /// Large image first, then small.
    pub images: Vec<ImagePlacement>,
}

impl SlidePlan {
    /// Paths of every file this plan references.
    pub fn referenced_files(&self) -> impl Iterator<Item = &std::path::Path> {
        let bg = match &self.background {
            BackgroundOp::Raster { path, .. } => Some(path.as_path()),
            BackgroundOp::Procedural { .. } => None,
        };
        bg.into_iter()
            .chain(self.images.iter().map(|i| i.path.as_path()))
    }

    pub(crate) fn referenced_files_mut(&mut self) -> impl Iterator<Item = &mut PathBuf> {
        let bg = match &mut self.background {
            BackgroundOp::Raster { path, .. } => Some(path),
            BackgroundOp::Procedural { .. } => None,
        };
        bg.into_iter()
            .chain(self.images.iter_mut().map(|i| &mut i.path))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
