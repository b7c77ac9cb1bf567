use crate::foundation::error::{DeckError, DeckResult};

pub use kurbo::{Point, Rect, Size};

/// Tolerance used when comparing relative coordinates.
pub const ZONE_EPSILON: f64 = 1e-9;

/// Rectangle on the slide canvas, relative to its width and height (`0..=1` on both axes).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Zone {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Zone {
    /// Zone from its top-left corner and size.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The whole canvas.
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Right edge.
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Width times height, in slide fractions.
    pub fn area(self) -> f64 {
        self.width * self.height
    }

    /// Build a zone from edges instead of origin + size.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Return `true` when the zone lies within the unit square (within [`ZONE_EPSILON`]).
    pub fn is_within_unit(self) -> bool {
        self.left >= -ZONE_EPSILON
            && self.top >= -ZONE_EPSILON
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= 1.0 + ZONE_EPSILON
            && self.bottom() <= 1.0 + ZONE_EPSILON
    }

    /// Relative rectangle as a `kurbo::Rect` in unit space.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.left, self.top, self.right(), self.bottom())
    }

    /// Scale into an absolute rectangle of `size`.
    pub fn to_absolute(self, size: Size) -> Rect {
        Rect::new(
            self.left * size.width,
            self.top * size.height,
            self.right() * size.width,
            self.bottom() * size.height,
        )
    }

    /// Area shared with `other`, in relative units.
    pub fn overlap_area(self, other: Zone) -> f64 {
        let r = self.to_rect().intersect(other.to_rect());
        if r.width() <= 0.0 || r.height() <= 0.0 {
            0.0
        } else {
            r.area()
        }
    }

    /// Grow to at least `min_width` x `min_height` around the same center, then shift back
    /// inside the unit square.
    pub fn ensure_min_size(self, min_width: f64, min_height: f64) -> Self {
        fn fit_axis(start: f64, len: f64, min_len: f64) -> (f64, f64) {
            let min_len = min_len.clamp(0.0, 1.0);
            let (mut start, len) = if len < min_len {
                (start - (min_len - len) * 0.5, min_len)
            } else {
                (start, len.min(1.0))
            };
            if start < 0.0 {
                start = 0.0;
            }
            if start + len > 1.0 {
                start = 1.0 - len;
            }
            (start, len)
        }

        let (left, width) = fit_axis(self.left, self.width, min_width);
        let (top, height) = fit_axis(self.top, self.height, min_height);
        Self::new(left, top, width, height)
    }
}

/// Title and body placement chosen for one background.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZonePair {
    /// Title text zone.
    pub title: Zone,
    /// Body text zone.
    pub body: Zone,
}

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// `#FFFFFF`.
    pub const WHITE: Rgb8 = Rgb8::new(0xff, 0xff, 0xff);
    /// `#000000`.
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    /// Color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB` (case-insensitive, surrounding whitespace ignored).
    pub fn parse_hex(input: &str) -> DeckResult<Self> {
        let s = input.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DeckError::invalid_color(input));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| DeckError::invalid_color(input))
        };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
    }

    /// Parse a compile-time palette literal. Only used for the built-in tables.
    pub(crate) const fn from_u32(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Relative luminance in `0..=1` (Rec.709 weights on gamma-encoded channels).
    pub fn luminance(self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgb8 {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
