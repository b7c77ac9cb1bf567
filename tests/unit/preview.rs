use super::*;
use crate::compose::plan::{ImageSlot, SlideKind};
use crate::foundation::core::{Rgb8, Zone};
use crate::theme::synth;

const CANVAS: Size = Size::new(720.0, 540.0);

fn renderer() -> PreviewRenderer {
    PreviewRenderer::with_fontdb(Arc::new(usvg::fontdb::Database::new()), CANVAS, 0.25)
}

fn body(lines: &[&str]) -> TextBlock {
    TextBlock {
        zone: Zone::new(0.1, 0.26, 0.8, 0.58),
        lines: lines.iter().map(|s| s.to_string()).collect(),
        font_name: "Sans & Serif".to_string(),
        font_size_pt: 19.0,
        color: Rgb8::BLACK,
        bold: false,
        align: TextAlign::Left,
        anchor: VerticalAnchor::Top,
        space_after_pt: 5.0,
    }
}

fn procedural_plan(index: usize) -> SlidePlan {
    let bg = synth::synthesize(index, CANVAS);
    SlidePlan {
        index,
        kind: SlideKind::Content,
        background: BackgroundOp::Procedural {
            palette_index: bg.palette_index,
            shapes: bg.shapes,
        },
        title: None,
        body: body(&["\u{2022} <tea> & biscuits"]),
        images: Vec::new(),
    }
}

#[test]
fn svg_escapes_text_and_lists_every_shape() {
    let doc = plan_to_svg(&procedural_plan(0), CANVAS);
    assert!(doc.starts_with("<svg"));
    assert!(doc.contains("&lt;tea&gt; &amp; biscuits"));
    assert!(doc.contains(r#"font-family="Sans &amp; Serif""#));
    assert_eq!(doc.matches("<path").count(), 4);
    assert!(doc.contains(r#"stroke-width="1.6""#));
}

#[test]
fn procedural_preview_paints_palette_colors() {
    let img = renderer().render(&procedural_plan(0)).unwrap();
    assert_eq!(img.dimensions(), (180, 135));
    let p = &synth::PALETTES[0];
    // Header band, then background strip left of the card.
    assert_eq!(img.get_pixel(90, 5).0, [p.header.r, p.header.g, p.header.b, 255]);
    assert_eq!(
        img.get_pixel(3, 70).0,
        [p.background.r, p.background.g, p.background.b, 255]
    );
}

#[test]
fn raster_background_and_images_use_their_crops() {
    let dir = tempfile::tempdir().unwrap();
    // Left half red, right half blue.
    let src = dir.path().join("split.png");
    image::RgbImage::from_fn(40, 20, |x, _| {
        if x < 20 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        }
    })
    .save(&src)
    .unwrap();

    let plan = SlidePlan {
        index: 0,
        kind: SlideKind::Content,
        background: BackgroundOp::Raster {
            path: src.clone(),
            source_px: (40, 20),
            // Only the red half stays visible.
            crop: Crop {
                right: 0.5,
                ..Crop::default()
            },
        },
        title: None,
        body: body(&[]),
        images: vec![ImagePlacement {
            slot: ImageSlot::Small,
            path: src,
            zone: Zone::new(0.5, 0.5, 0.5, 0.5),
            source_px: (40, 20),
            crop: Crop {
                left: 0.5,
                ..Crop::default()
            },
        }],
    };
    let img = renderer().render(&plan).unwrap();
    assert_eq!(img.get_pixel(20, 20).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(150, 110).0, [0, 0, 255, 255]);
}
