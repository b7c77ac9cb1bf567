use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::decode;
use crate::assets::scratch::ScratchDir;
use crate::foundation::error::{DeckError, DeckResult};

/// An opened multi-page vector document.
pub trait DeckDocument {
    /// Number of pages in the document, cover included.
    fn page_count(&self) -> usize;

    /// Render page `index` at `scale` times its natural size.
    fn render_page(&self, index: usize, scale: f32) -> DeckResult<image::RgbaImage>;
}

/// Opens deck files of the formats it understands.
pub trait DeckRenderer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return `true` when this renderer can open `path`.
    fn supports(&self, path: &Path) -> bool;

    /// Open `path` for page rendering.
    fn open(&self, path: &Path) -> DeckResult<Box<dyn DeckDocument>>;
}

/// Built-in renderer for `.svg` (one page) and `.svgdeck` (SVG documents back to back).
#[cfg(feature = "svg-deck")]
pub struct SvgDeckRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

#[cfg(feature = "svg-deck")]
impl SvgDeckRenderer {
    /// Renderer using the system fonts.
    pub fn new() -> Self {
        Self {
            fontdb: crate::assets::svg::build_svg_fontdb(&[]),
        }
    }

    /// Renderer using a caller-built font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }
}

#[cfg(feature = "svg-deck")]
impl Default for SvgDeckRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "svg-deck")]
impl std::fmt::Debug for SvgDeckRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgDeckRenderer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

#[cfg(feature = "svg-deck")]
struct SvgDeckDocument {
    pages: Vec<String>,
    resources_dir: Option<PathBuf>,
    fontdb: Arc<usvg::fontdb::Database>,
}

#[cfg(feature = "svg-deck")]
impl DeckDocument for SvgDeckDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, index: usize, scale: f32) -> DeckResult<image::RgbaImage> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| DeckError::validation(format!("deck page {index} out of range")))?;
        let tree = crate::assets::svg::parse_svg(
            page.as_bytes(),
            self.resources_dir.as_deref(),
            self.fontdb.clone(),
        )?;
        crate::assets::svg::rasterize_svg(&tree, scale, [255, 255, 255])
    }
}

#[cfg(feature = "svg-deck")]
impl DeckRenderer for SvgDeckRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg") || e.eq_ignore_ascii_case("svgdeck"))
    }

    fn open(&self, path: &Path) -> DeckResult<Box<dyn DeckDocument>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read deck '{}'", path.display()))?;
        let pages = crate::assets::svg::split_svg_pages(&text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        Ok(Box::new(SvgDeckDocument {
            pages,
            resources_dir: path.parent().map(Path::to_path_buf),
            fontdb: self.fontdb.clone(),
        }))
    }
}

/// Built-in renderer for `.pdf` decks.
#[cfg(feature = "pdf-deck")]
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfDeckRenderer;

#[cfg(feature = "pdf-deck")]
struct PdfDeckDocument {
    path: PathBuf,
    pdf: hayro::Pdf,
}

#[cfg(feature = "pdf-deck")]
impl DeckDocument for PdfDeckDocument {
    fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    fn render_page(&self, index: usize, scale: f32) -> DeckResult<image::RgbaImage> {
        let page = self
            .pdf
            .pages()
            .get(index)
            .ok_or_else(|| DeckError::validation(format!("deck page {index} out of range")))?;
        let settings = hayro::RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let pixmap = hayro::render(page, &hayro::InterpreterSettings::default(), &settings);
        let page = decode::decode_image(&pixmap.take_png())
            .with_context(|| format!("decode page {index} of '{}'", self.path.display()))?
            .into_rgba8();

        // Pages without a painted background come out transparent.
        let mut out = image::RgbaImage::from_pixel(
            page.width(),
            page.height(),
            image::Rgba([255, 255, 255, 255]),
        );
        image::imageops::overlay(&mut out, &page, 0, 0);
        Ok(out)
    }
}

#[cfg(feature = "pdf-deck")]
impl DeckRenderer for PdfDeckRenderer {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    }

    fn open(&self, path: &Path) -> DeckResult<Box<dyn DeckDocument>> {
        let bytes = std::fs::read(path)
            .map_err(|e| DeckError::io(format!("read deck '{}'", path.display()), e))?;
        let pdf = hayro::Pdf::new(Arc::new(bytes)).map_err(|e| {
            DeckError::validation(format!("open pdf deck '{}': {e:?}", path.display()))
        })?;
        Ok(Box::new(PdfDeckDocument {
            path: path.to_path_buf(),
            pdf,
        }))
    }
}

/// One rasterized deck page, kept in memory and on disk (inside the build scratch directory).
#[derive(Clone, Debug)]
pub struct RasterPage {
    /// PNG file in the scratch directory; also the zone cache key.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Decoded pixels.
    pub image: Arc<image::DynamicImage>,
}

/// Which pages of a `page_count`-page deck carry content: the first page is a cover unless it
/// is the only one.
pub fn content_pages(page_count: usize) -> std::ops::Range<usize> {
    let start = usize::from(page_count > 1);
    start..page_count
}

/// Rasterizes deck backgrounds and caches the page list per deck for one build.
pub struct DeckRasterizer {
    renderers: Vec<Arc<dyn DeckRenderer>>,
    scale: f32,
    cache: HashMap<PathBuf, Arc<[RasterPage]>>,
}

impl std::fmt::Debug for DeckRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckRasterizer")
            .field(
                "renderers",
                &self.renderers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("scale", &self.scale)
            .field("cached_decks", &self.cache.len())
            .finish()
    }
}

impl DeckRasterizer {
    /// Rasterizer with no renderers; every deck request fails with `MissingRenderer`.
    pub fn without_renderers(scale: f32) -> Self {
        Self {
            renderers: Vec::new(),
            scale,
            cache: HashMap::new(),
        }
    }

    /// Rasterizer with the renderers compiled into this build.
    pub fn with_builtin_renderers(scale: f32) -> Self {
        #[allow(unused_mut)]
        let mut out = Self::without_renderers(scale);
        #[cfg(feature = "svg-deck")]
        out.renderers.push(Arc::new(SvgDeckRenderer::new()));
        #[cfg(feature = "pdf-deck")]
        out.renderers.push(Arc::new(PdfDeckRenderer));
        out
    }

    /// Add a renderer. Earlier renderers take precedence.
    pub fn push_renderer(&mut self, renderer: Arc<dyn DeckRenderer>) {
        self.renderers.push(renderer);
    }

    /// All content pages of `deck`, rasterized once per build.
    pub fn pages(
        &mut self,
        template_id: u32,
        deck: &Path,
        scratch: &mut ScratchDir,
    ) -> DeckResult<Arc<[RasterPage]>> {
        let key = std::fs::canonicalize(deck).unwrap_or_else(|_| deck.to_path_buf());
        if let Some(pages) = self.cache.get(&key) {
            tracing::debug!(deck = %key.display(), "deck page cache hit");
            return Ok(pages.clone());
        }

        let renderer = self
            .renderers
            .iter()
            .find(|r| r.supports(&key))
            .cloned()
            .ok_or_else(|| DeckError::MissingRenderer {
                template_id,
                path: key.clone(),
            })?;
        let doc = renderer.open(&key)?;
        let count = doc.page_count();

        let mut pages = Vec::with_capacity(count);
        for index in content_pages(count) {
            let rgba = doc.render_page(index, self.scale)?;
            let path = scratch.next_path(&format!("deck_{template_id}_p{index}"), "png");
            decode::write_png(&rgba, &path)?;
            pages.push(RasterPage {
                path,
                width: rgba.width(),
                height: rgba.height(),
                image: Arc::new(image::DynamicImage::ImageRgba8(rgba)),
            });
        }
        if pages.is_empty() {
            return Err(DeckError::EmptyTemplate { path: key });
        }

        tracing::debug!(
            deck = %key.display(),
            renderer = renderer.name(),
            page_count = count,
            rasterized = pages.len(),
            "rasterized deck"
        );
        let pages: Arc<[RasterPage]> = pages.into();
        self.cache.insert(key, pages.clone());
        Ok(pages)
    }

    /// Background page for slide `slide_index`, cycling when slides outnumber pages.
    pub fn page_for_slide(
        &mut self,
        template_id: u32,
        deck: &Path,
        slide_index: usize,
        scratch: &mut ScratchDir,
    ) -> DeckResult<RasterPage> {
        let pages = self.pages(template_id, deck, scratch)?;
        Ok(pages[slide_index % pages.len()].clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/deck.rs"]
mod tests;
