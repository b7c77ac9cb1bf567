use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{DeckError, DeckResult};

/// Largest raster edge the engine will allocate for an SVG page.
const MAX_DIM: u32 = 16_384;

/// Font database with the system fonts plus any fonts found in `extra_dirs`.
pub fn build_svg_fontdb(extra_dirs: &[&Path]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in extra_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if is_font {
            let _ = db.load_font_file(&path);
        }
    }
}

/// Parse one SVG document. Relative `href`s resolve against `resources_dir`.
pub fn parse_svg(
    bytes: &[u8],
    resources_dir: Option<&Path>,
    fontdb: Arc<usvg::fontdb::Database>,
) -> DeckResult<usvg::Tree> {
    let opts = usvg::Options {
        resources_dir: resources_dir.map(Path::to_path_buf),
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Pixel size of `tree` rendered at `scale`.
pub fn svg_raster_size(tree: &usvg::Tree, scale: f32) -> DeckResult<(u32, u32)> {
    fn to_px(v: f32) -> DeckResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(DeckError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width() * scale)?;
    let h = to_px(size.height() * scale)?;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(DeckError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize `tree` at `scale` over an opaque `background`, as straight-alpha RGBA8.
pub fn rasterize_svg(
    tree: &usvg::Tree,
    scale: f32,
    background: [u8; 3],
) -> DeckResult<image::RgbaImage> {
    let (width, height) = svg_raster_size(tree, scale)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DeckError::validation("failed to allocate svg pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::from_rgba8(
        background[0],
        background[1],
        background[2],
        255,
    ));

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut data = pixmap.take();
    crate::assets::decode::demultiply_rgba8_in_place(&mut data);
    image::RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| DeckError::validation("svg pixmap size mismatch"))
}

/// Split back-to-back SVG documents into one slice per top-level `<svg>` element.
///
/// Nested `<svg>` elements stay inside their page; comments are skipped.
pub fn split_svg_pages(text: &str) -> Vec<&str> {
    fn is_svg_open(rest: &str) -> bool {
        rest.starts_with("<svg")
            && rest[4..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
    }

    let mut pages = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while let Some(off) = text[i..].find('<') {
        i += off;
        let rest = &text[i..];
        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => i += end + 3,
                None => break,
            }
            continue;
        }
        if rest.starts_with("</svg") {
            let Some(end) = rest.find('>') else { break };
            if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    pages.push(&text[start..i + end + 1]);
                }
            }
            i += end + 1;
            continue;
        }
        if is_svg_open(rest) {
            let Some(end) = rest.find('>') else { break };
            let self_closing = rest[..end].ends_with('/');
            if depth == 0 {
                start = i;
                if self_closing {
                    pages.push(&text[i..i + end + 1]);
                }
            }
            if !self_closing {
                depth += 1;
            }
            i += end + 1;
            continue;
        }
        i += 1;
    }
    pages
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg.rs"]
mod tests;
