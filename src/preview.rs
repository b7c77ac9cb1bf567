//! Renders slide plans to SVG and PNG so a build can be inspected without the container
//! serializer.
//!
//! Text is drawn one line per paragraph without wrapping; the preview shows placement and
//! contrast, not final typesetting.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::{decode, svg};
use crate::compose::plan::{
    BackgroundOp, ImagePlacement, SlidePlan, TextAlign, TextBlock, VerticalAnchor,
};
use crate::compose::session::ComposedDeck;
use crate::foundation::core::{Rect, Size};
use crate::foundation::error::{DeckError, DeckResult};
use crate::layout::images::Crop;
use crate::theme::synth::ShapeOp;

/// Line height relative to the font size.
const LINE_HEIGHT: f64 = 1.2;

fn xml_escape(s: &str) -> String {
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

fn href(path: &Path) -> String {
    xml_escape(&path.to_string_lossy())
}

// `source_px` of the source shown through `crop`, stretched over `target`.
fn cropped_image(out: &mut String, path: &Path, source_px: (u32, u32), crop: Crop, target: Rect) {
    let (sw, sh) = (f64::from(source_px.0), f64::from(source_px.1));
    let (vx, vy, vw, vh) = crop.visible_rect(sw, sh);
    let _ = write!(
        out,
        r#"<svg x="{}" y="{}" width="{}" height="{}" viewBox="{vx} {vy} {vw} {vh}" preserveAspectRatio="none"><image width="{sw}" height="{sh}" preserveAspectRatio="none" href="{}"/></svg>"#,
        target.x0,
        target.y0,
        target.width(),
        target.height(),
        href(path),
    );
}

fn shape(out: &mut String, op: &ShapeOp, canvas: Size) {
    let d = op.to_path(canvas).to_svg();
    let _ = write!(
        out,
        r#"<path d="{d}" fill="{}" fill-opacity="{}""#,
        op.fill.to_hex(),
        op.fill_opacity
    );
    match op.stroke {
        Some(s) => {
            let _ = write!(
                out,
                r#" stroke="{}" stroke-width="{}"/>"#,
                s.color.to_hex(),
                s.width_pt
            );
        }
        None => out.push_str("/>"),
    }
}

fn text_block(out: &mut String, block: &TextBlock, canvas: Size) {
    if block.lines.is_empty() {
        return;
    }
    let zone = block.zone.to_absolute(canvas);
    let size = f64::from(block.font_size_pt);
    let step = size * LINE_HEIGHT + f64::from(block.space_after_pt);
    let total = step * block.lines.len() as f64;

    let (x, text_anchor) = match block.align {
        TextAlign::Left => (zone.x0, "start"),
        TextAlign::Center => (zone.center().x, "middle"),
    };
    let first_baseline = match block.anchor {
        VerticalAnchor::Top => zone.y0 + size,
        VerticalAnchor::Middle => zone.center().y - total / 2.0 + size,
    };

    let _ = write!(
        out,
        r#"<text font-family="{}" font-size="{size}" fill="{}" text-anchor="{text_anchor}"{}>"#,
        xml_escape(&block.font_name),
        block.color.to_hex(),
        if block.bold { r#" font-weight="bold""# } else { "" },
    );
    for (i, line) in block.lines.iter().enumerate() {
        let y = first_baseline + step * i as f64;
        let _ = write!(out, r#"<tspan x="{x}" y="{y}">{}</tspan>"#, xml_escape(line));
    }
    out.push_str("</text>");
}

fn image_placement(out: &mut String, img: &ImagePlacement, canvas: Size) {
    cropped_image(out, &img.path, img.source_px, img.crop, img.zone.to_absolute(canvas));
}

/// SVG document drawing `plan` on a `canvas`-sized slide (1 user unit = 1pt).
pub fn plan_to_svg(plan: &SlidePlan, canvas: Size) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height
    );

    match &plan.background {
        BackgroundOp::Raster {
            path,
            source_px,
            crop,
        } => {
            let full = Rect::from_origin_size((0.0, 0.0), canvas);
            cropped_image(&mut out, path, *source_px, *crop, full);
        }
        BackgroundOp::Procedural { shapes, .. } => {
            for op in shapes {
                shape(&mut out, op, canvas);
            }
        }
    }
    for img in &plan.images {
        image_placement(&mut out, img, canvas);
    }
    if let Some(title) = &plan.title {
        text_block(&mut out, title, canvas);
    }
    text_block(&mut out, &plan.body, canvas);

    out.push_str("</svg>");
    out
}

/// Draws plans to bitmaps with a shared font database.
#[derive(Clone)]
pub struct PreviewRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
    canvas: Size,
    scale: f32,
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("canvas", &self.canvas)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl PreviewRenderer {
    /// Renderer using the system fonts.
    pub fn new(canvas: Size, scale: f32) -> Self {
        Self::with_fontdb(svg::build_svg_fontdb(&[]), canvas, scale)
    }

    /// Renderer drawing text with `fontdb`.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>, canvas: Size, scale: f32) -> Self {
        Self {
            fontdb,
            canvas,
            scale,
        }
    }

    /// Rasterize one plan. Referenced files must still exist.
    pub fn render(&self, plan: &SlidePlan) -> DeckResult<image::RgbaImage> {
        let doc = plan_to_svg(plan, self.canvas);
        let tree = svg::parse_svg(doc.as_bytes(), None, self.fontdb.clone())?;
        svg::rasterize_svg(&tree, self.scale, [255, 255, 255])
    }

    /// Write `slide_NN.png` into `dir` for every plan of `deck`.
    pub fn write_all(&self, deck: &ComposedDeck, dir: &Path) -> DeckResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| {
            DeckError::io(format!("create preview dir '{}'", dir.display()), e)
        })?;
        let mut written = Vec::with_capacity(deck.len());
        for plan in deck.plans() {
            let path = dir.join(format!("slide_{:02}.png", plan.index + 1));
            decode::write_png(&self.render(plan)?, &path)?;
            tracing::debug!(path = %path.display(), "wrote preview");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
#[path = "../tests/unit/preview.rs"]
mod tests;
