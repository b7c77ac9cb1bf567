//! deckforge turns slide contents and a background choice into per-slide render plans.
//!
//! A build runs in four steps:
//!
//! 1. **Resolve**: each slide's template id maps to a vector deck, a static raster, or nothing
//!    ([`TemplateRegistry`]).
//! 2. **Rasterize**: deck pages are rendered once per build into a scratch directory
//!    ([`DeckRasterizer`]); slides with no asset get a procedural theme ([`synthesize`]).
//! 3. **Place**: title and body zones are chosen where the text color stays legible
//!    ([`ZoneDetector`]), then split with up to two user images ([`ImageLayoutPlanner`]).
//! 4. **Emit**: one [`SlidePlan`] per slide, plus an optional credits slide, owned by a
//!    [`ComposedDeck`] that removes its scratch files when dropped.
//!
//! Plans are placement instructions. Writing a presentation container from them is left to the
//! caller.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod config;
mod foundation;
mod layout;
mod preview;
mod theme;

pub use assets::deck::{
    DeckDocument, DeckRasterizer, DeckRenderer, RasterPage, content_pages,
};
#[cfg(feature = "pdf-deck")]
pub use assets::deck::PdfDeckRenderer;
#[cfg(feature = "svg-deck")]
pub use assets::deck::SvgDeckRenderer;
pub use assets::decode::{decode_image, open_image, probe_dimensions};
pub use assets::registry::{BackgroundKind, TemplateRegistry, TemplateSource, template_id_from_path};
pub use assets::scratch::ScratchDir;
pub use assets::svg::{build_svg_fontdb, split_svg_pages};
pub use compose::plan::{
    BackgroundOp, Crop, ImagePlacement, ImageSlot, SlideKind, SlidePlan, TextAlign, TextBlock,
    VerticalAnchor,
};
pub use compose::session::{
    BuildRequest, BuildSession, ComposedDeck, SlideSpec, parse_credit_names, suggested_file_stem,
};
pub use config::{EngineConfig, ZoneWeights};
pub use foundation::core::{Point, Rect, Rgb8, Size, Zone, ZonePair};
pub use foundation::error::{DeckError, DeckResult};
pub use layout::fonts::{BodyMetrics, body_font_size, title_font_size};
pub use layout::images::{
    ImageLayoutPlanner, LayoutPlan, Orientation, UserImage, UserImagePool, crop_to_fill,
    pick_orientation,
};
pub use layout::zones::{
    BODY_CANDIDATES, BODY_ZONE, DEFAULT_ZONES, FIRST_SLIDE_TITLE_ZONE, TITLE_CANDIDATES,
    TITLE_ZONE, ZoneCache, ZoneDetector, contrast_ratio,
};
pub use preview::{PreviewRenderer, plan_to_svg};
pub use theme::synth::{
    PALETTES, Palette, ProceduralBackground, ShapeKind, ShapeOp, Stroke, palette, synthesize,
};
