use crate::foundation::core::{Rgb8, Size, Zone};

/// Colors of one procedural theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    /// Full-bleed backdrop.
    pub background: Rgb8,
    /// Header band.
    pub header: Rgb8,
    /// Decorative circle and card border.
    pub accent: Rgb8,
    /// Content card fill.
    pub card: Rgb8,
}

const fn pal(background: u32, header: u32, accent: u32, card: u32) -> Palette {
    Palette {
        background: Rgb8::from_u32(background),
        header: Rgb8::from_u32(header),
        accent: Rgb8::from_u32(accent),
        card: Rgb8::from_u32(card),
    }
}

/// The fixed theme palettes, in slide order.
pub const PALETTES: [Palette; 13] = [
    pal(0xF5F7FF, 0x2F4B7C, 0x6EA8FE, 0xFFFFFF),
    pal(0xFFF6EA, 0x8C4A1A, 0xF4A261, 0xFFFFFF),
    pal(0xEEF9F1, 0x1B6B4A, 0x7BCFA3, 0xFFFFFF),
    pal(0xFFF0F4, 0x8E204B, 0xE87EA1, 0xFFFFFF),
    pal(0xF2F3F7, 0x30343F, 0x8D99AE, 0xFFFFFF),
    pal(0xF9F4FF, 0x4C2A85, 0xA98ED6, 0xFFFFFF),
    pal(0xECFBFF, 0x0F5B6E, 0x5EC9E2, 0xFFFFFF),
    pal(0xFFF8E7, 0x7B5A12, 0xDDBB5A, 0xFFFFFF),
    pal(0xF1FFF8, 0x215E46, 0x6ED7A7, 0xFFFFFF),
    pal(0xFFF1EC, 0x7A2E1C, 0xE78A70, 0xFFFFFF),
    pal(0xF0F5FF, 0x1E3A8A, 0x7FA8FF, 0xFFFFFF),
    pal(0xF7FFF3, 0x355E1D, 0x9FCF5B, 0xFFFFFF),
    pal(0xFFF2FA, 0x6C1D45, 0xD77AB3, 0xFFFFFF),
];

/// Palette for slide `index`, cycling through [`PALETTES`].
pub fn palette(index: usize) -> &'static Palette {
    &PALETTES[index % PALETTES.len()]
}

/// Band across the top of the slide.
pub const HEADER_BAND: Zone = Zone::new(0.0, 0.0, 1.0, 0.10);
/// Rounded card behind the text.
pub const CONTENT_CARD: Zone = Zone::new(0.06, 0.18, 0.88, 0.72);
/// Top-left corner of the decorative circle.
pub const CIRCLE_ORIGIN: (f64, f64) = (0.78, 0.72);
/// Circle diameter relative to the canvas width.
pub const CIRCLE_DIAMETER: f64 = 0.26;
/// Fill opacity of the decorative circle.
pub const CIRCLE_OPACITY: f32 = 0.40;
/// Width of the card border.
pub const CARD_BORDER_PT: f64 = 1.6;
/// Corner radius of the card relative to its shorter side.
pub const CARD_CORNER_RATIO: f64 = 0.16667;

/// Geometry of a shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeKind {
    /// The zone itself.
    Rect,
    /// Ellipse inscribed in the zone.
    Ellipse,
    /// Rectangle with rounded corners.
    RoundedRect {
        /// Corner radius relative to the shorter absolute side.
        corner_ratio: f64,
    },
}

/// Outline of a shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Line color.
    pub color: Rgb8,
    /// Line width in points.
    pub width_pt: f64,
}

/// One filled vector shape of a procedural background. Zones may extend past the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeOp {
    /// Geometry.
    pub kind: ShapeKind,
    /// Bounding box, relative to the slide.
    pub zone: Zone,
    /// Fill color.
    pub fill: Rgb8,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f32,
    /// Optional outline.
    pub stroke: Option<Stroke>,
}

impl ShapeOp {
    fn solid(kind: ShapeKind, zone: Zone, fill: Rgb8) -> Self {
        Self {
            kind,
            zone,
            fill,
            fill_opacity: 1.0,
            stroke: None,
        }
    }

    /// Absolute outline on a `canvas`-sized slide.
    pub fn to_path(&self, canvas: Size) -> kurbo::BezPath {
        use kurbo::Shape as _;

        let rect = self.zone.to_absolute(canvas);
        match self.kind {
            ShapeKind::Rect => rect.to_path(0.1),
            ShapeKind::Ellipse => kurbo::Ellipse::from_rect(rect).to_path(0.1),
            ShapeKind::RoundedRect { corner_ratio } => {
                let r = rect.width().min(rect.height()) * corner_ratio;
                rect.to_rounded_rect(r).to_path(0.1)
            }
        }
    }
}

/// A procedural slide background: the palette used and the shapes to paint, back to front.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProceduralBackground {
    /// Index into [`PALETTES`].
    pub palette_index: usize,
    /// Back to front.
    pub shapes: Vec<ShapeOp>,
}

/// Build the procedural background of slide `index` on a `canvas`-sized slide.
pub fn synthesize(index: usize, canvas: Size) -> ProceduralBackground {
    let palette_index = index % PALETTES.len();
    let p = &PALETTES[palette_index];

    let aspect = if canvas.height > 0.0 {
        canvas.width / canvas.height
    } else {
        1.0
    };
    let circle = Zone::new(
        CIRCLE_ORIGIN.0,
        CIRCLE_ORIGIN.1,
        CIRCLE_DIAMETER,
        CIRCLE_DIAMETER * aspect,
    );

    let shapes = vec![
        ShapeOp::solid(ShapeKind::Rect, Zone::full(), p.background),
        ShapeOp::solid(ShapeKind::Rect, HEADER_BAND, p.header),
        ShapeOp {
            fill_opacity: CIRCLE_OPACITY,
            ..ShapeOp::solid(ShapeKind::Ellipse, circle, p.accent)
        },
        ShapeOp {
            stroke: Some(Stroke {
                color: p.accent,
                width_pt: CARD_BORDER_PT,
            }),
            ..ShapeOp::solid(
                ShapeKind::RoundedRect {
                    corner_ratio: CARD_CORNER_RATIO,
                },
                CONTENT_CARD,
                p.card,
            )
        },
    ];

    ProceduralBackground {
        palette_index,
        shapes,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/synth.rs"]
mod tests;
