use super::*;
use crate::foundation::core::Size;
use crate::theme::synth;

fn body(lines: &[&str]) -> TextBlock {
    TextBlock {
        zone: Zone::new(0.1, 0.26, 0.8, 0.58),
        lines: lines.iter().map(|s| s.to_string()).collect(),
        font_name: "Calibri".to_string(),
        font_size_pt: 19.0,
        color: Rgb8::WHITE,
        bold: false,
        align: TextAlign::Left,
        anchor: VerticalAnchor::Top,
        space_after_pt: 5.0,
    }
}

#[test]
fn json_uses_tagged_snake_case_variants() {
    let bg = synth::synthesize(2, Size::new(720.0, 540.0));
    let plan = SlidePlan {
        index: 2,
        kind: SlideKind::Credits,
        background: BackgroundOp::Procedural {
            palette_index: bg.palette_index,
            shapes: bg.shapes,
        },
        title: None,
        body: body(&["Ada", "Linus"]),
        images: Vec::new(),
    };
    let v = serde_json::to_value(&plan).unwrap();
    assert_eq!(v["kind"], "credits");
    assert_eq!(v["background"]["type"], "procedural");
    assert_eq!(v["background"]["shapes"][2]["kind"]["shape"], "ellipse");
    assert_eq!(v["body"]["align"], "left");
    assert_eq!(v["body"]["color"]["r"], 255);

    let back: SlidePlan = serde_json::from_value(v).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn referenced_files_lists_background_then_images() {
    let plan = SlidePlan {
        index: 0,
        kind: SlideKind::Content,
        background: BackgroundOp::Raster {
            path: PathBuf::from("/bg.png"),
            source_px: (1280, 960),
            crop: Crop::default(),
        },
        title: None,
        body: body(&[]),
        images: vec![ImagePlacement {
            slot: ImageSlot::Large,
            path: PathBuf::from("/u/a.jpg"),
            zone: Zone::new(0.06, 0.62, 0.88, 0.30),
            source_px: (10, 10),
            crop: Crop::default(),
        }],
    };
    let files: Vec<_> = plan.referenced_files().collect();
    assert_eq!(
        files,
        vec![std::path::Path::new("/bg.png"), std::path::Path::new("/u/a.jpg")]
    );
}
