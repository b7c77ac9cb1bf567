use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Size;
use crate::foundation::error::{DeckError, DeckResult};

/// Weights of the text-zone score: `contrast * contrast + (255 - stddev) * calm + area * area`.
///
/// Contrast must dominate, then low visual noise, then candidate size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ZoneWeights {
    /// Multiplier for the luminance contrast ratio (1..=21).
    pub contrast: f64,
    /// Multiplier for `255 - stddev` of the region luminance.
    pub calm: f64,
    /// Multiplier for the relative candidate area (0..=1).
    pub area: f64,
}

impl Default for ZoneWeights {
    fn default() -> Self {
        Self {
            contrast: 120.0,
            calm: 1.0,
            area: 25.0,
        }
    }
}

/// Tunable constants of the engine.
///
/// Every field has a default; a JSON file only needs the fields it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slide width in points.
    pub canvas_width_pt: f64,
    /// Slide height in points.
    pub canvas_height_pt: f64,
    /// Oversampling factor applied when rasterizing deck pages.
    pub deck_render_scale: f32,
    /// Text-zone scoring weights.
    pub zone_weights: ZoneWeights,
    /// Slack allowed between the bottom of the title and the top of a body candidate.
    pub title_body_epsilon: f64,
    /// Smallest text zone (relative width and height) the image planner may leave.
    pub min_text_zone: f64,
    /// Maximum number of names on the credits slide.
    pub max_credit_names: usize,
    /// Prefix prepended to every bullet line.
    pub bullet_prefix: String,
    /// Seed for the image orientation draw. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width_pt: 720.0,
            canvas_height_pt: 540.0,
            deck_render_scale: 1.8,
            zone_weights: ZoneWeights::default(),
            title_body_epsilon: 0.01,
            min_text_zone: 0.36,
            max_credit_names: 20,
            bullet_prefix: "\u{2022} ".to_string(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> DeckResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| DeckError::validation(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| DeckError::io(format!("open engine config '{}'", path.display()), e))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject settings no build can use.
    pub fn validate(&self) -> DeckResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas_width_pt) || !positive(self.canvas_height_pt) {
            return Err(DeckError::validation("canvas size must be positive"));
        }
        if !positive(f64::from(self.deck_render_scale)) {
            return Err(DeckError::validation("deck_render_scale must be positive"));
        }
        let w = self.zone_weights;
        if ![w.contrast, w.calm, w.area].iter().all(|v| v.is_finite()) {
            return Err(DeckError::validation("zone weights must be finite"));
        }
        if !(0.0..=0.5).contains(&self.title_body_epsilon) {
            return Err(DeckError::validation(
                "title_body_epsilon must be within 0..=0.5",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_text_zone) {
            return Err(DeckError::validation("min_text_zone must be within 0..=1"));
        }
        Ok(())
    }

    /// Canvas size in points.
    pub fn canvas(&self) -> Size {
        Size::new(self.canvas_width_pt, self.canvas_height_pt)
    }
}
