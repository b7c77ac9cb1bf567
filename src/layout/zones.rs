use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::decode;
use crate::config::ZoneWeights;
use crate::foundation::core::{Rgb8, Zone, ZonePair};

/// Title zone used when no background analysis is available.
pub const TITLE_ZONE: Zone = Zone::new(0.08, 0.08, 0.84, 0.16);
/// Body zone used when no background analysis is available.
pub const BODY_ZONE: Zone = Zone::new(0.10, 0.26, 0.80, 0.58);
/// Title zone of the first slide, slightly higher than [`TITLE_ZONE`].
pub const FIRST_SLIDE_TITLE_ZONE: Zone = Zone::new(0.08, 0.03, 0.84, 0.12);

/// Title zones tried by [`ZoneDetector`], in tie-break order.
pub const TITLE_CANDIDATES: [Zone; 5] = [
    Zone::new(0.07, 0.06, 0.86, 0.18),
    Zone::new(0.08, 0.08, 0.84, 0.16),
    Zone::new(0.10, 0.09, 0.80, 0.16),
    Zone::new(0.12, 0.10, 0.76, 0.16),
    Zone::new(0.10, 0.14, 0.80, 0.16),
];

/// Body zones tried by [`ZoneDetector`], in tie-break order.
pub const BODY_CANDIDATES: [Zone; 6] = [
    Zone::new(0.08, 0.24, 0.84, 0.60),
    Zone::new(0.10, 0.26, 0.80, 0.58),
    Zone::new(0.10, 0.30, 0.80, 0.54),
    Zone::new(0.12, 0.28, 0.76, 0.56),
    Zone::new(0.12, 0.34, 0.76, 0.50),
    Zone::new(0.08, 0.32, 0.84, 0.52),
];

/// Fallback pair for procedural backgrounds and undecodable rasters.
pub const DEFAULT_ZONES: ZonePair = ZonePair {
    title: TITLE_ZONE,
    body: BODY_ZONE,
};

/// WCAG-style contrast ratio between two relative luminances.
pub fn contrast_ratio(a: f64, b: f64) -> f64 {
    let lighter = a.max(b) + 0.05;
    let darker = a.min(b) + 0.05;
    lighter / darker
}

/// Mean and population standard deviation of luma (0..=255) inside `zone`.
///
/// `None` when the zone covers no whole pixel.
pub fn region_luma_stats(luma: &image::GrayImage, zone: Zone) -> Option<(f64, f64)> {
    let (w, h) = luma.dimensions();
    let (w, h) = (f64::from(w), f64::from(h));
    let x0 = (w * zone.left).floor().max(0.0) as u32;
    let y0 = (h * zone.top).floor().max(0.0) as u32;
    let x1 = ((w * zone.right()).floor() as u32).min(luma.width());
    let y1 = ((h * zone.bottom()).floor() as u32).min(luma.height());
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in y0..y1 {
        for x in x0..x1 {
            let v = f64::from(luma.get_pixel(x, y).0[0]);
            sum += v;
            sum_sq += v * v;
        }
    }
    let n = f64::from((x1 - x0) * (y1 - y0));
    let mean = sum / n;
    let var = (sum_sq / n - mean * mean).max(0.0);
    Some((mean, var.sqrt()))
}

/// Picks title and body zones where text of a given color stays legible over a background.
#[derive(Clone, Debug)]
pub struct ZoneDetector {
    weights: ZoneWeights,
    epsilon: f64,
    title_candidates: Vec<Zone>,
    body_candidates: Vec<Zone>,
}

impl Default for ZoneDetector {
    fn default() -> Self {
        Self::new(ZoneWeights::default(), 0.01)
    }
}

impl ZoneDetector {
    /// Detector with the built-in candidate sets.
    pub fn new(weights: ZoneWeights, epsilon: f64) -> Self {
        Self {
            weights,
            epsilon,
            title_candidates: TITLE_CANDIDATES.to_vec(),
            body_candidates: BODY_CANDIDATES.to_vec(),
        }
    }

    /// Replace the candidate sets. Empty sets fall back to the built-in ones.
    pub fn with_candidates(mut self, title: Vec<Zone>, body: Vec<Zone>) -> Self {
        if !title.is_empty() {
            self.title_candidates = title;
        }
        if !body.is_empty() {
            self.body_candidates = body;
        }
        self
    }

    /// Title zones in use.
    pub fn title_candidates(&self) -> &[Zone] {
        &self.title_candidates
    }

    /// Body zones in use.
    pub fn body_candidates(&self) -> &[Zone] {
        &self.body_candidates
    }

    /// Score of one candidate; higher is more legible. Empty regions score `-inf`.
    pub fn score(&self, luma: &image::GrayImage, zone: Zone, text: Rgb8) -> f64 {
        let Some((mean, stddev)) = region_luma_stats(luma, zone) else {
            return f64::NEG_INFINITY;
        };
        let contrast = contrast_ratio(text.luminance(), mean / 255.0);
        contrast * self.weights.contrast
            + (255.0 - stddev) * self.weights.calm
            + zone.area() * self.weights.area
    }

    /// Scores of `candidates`, in order.
    pub fn rank(&self, luma: &image::GrayImage, candidates: &[Zone], text: Rgb8) -> Vec<f64> {
        candidates
            .iter()
            .map(|&z| self.score(luma, z, text))
            .collect()
    }

    /// Best title zone, then the best body zone starting below it.
    pub fn detect(&self, background: &image::DynamicImage, text: Rgb8) -> ZonePair {
        let luma = background.to_luma8();
        let title = self
            .best(&luma, self.title_candidates.iter().copied(), text)
            .unwrap_or(TITLE_ZONE);

        let floor = title.bottom() - self.epsilon;
        let below = self
            .body_candidates
            .iter()
            .copied()
            .filter(|b| b.top >= floor);
        let body = self
            .best(&luma, below, text)
            .or_else(|| self.best(&luma, self.body_candidates.iter().copied(), text))
            .unwrap_or(BODY_ZONE);

        ZonePair { title, body }
    }

    /// Decode `path` and detect; undecodable files get [`DEFAULT_ZONES`].
    pub fn detect_file(&self, path: &Path, text: Rgb8) -> ZonePair {
        match decode::open_image(path) {
            Ok(img) => self.detect(&img, text),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "using default text zones");
                DEFAULT_ZONES
            }
        }
    }

    // First maximum wins so ties resolve to the earlier candidate.
    fn best(
        &self,
        luma: &image::GrayImage,
        candidates: impl Iterator<Item = Zone>,
        text: Rgb8,
    ) -> Option<Zone> {
        let mut best: Option<(Zone, f64)> = None;
        for zone in candidates {
            let s = self.score(luma, zone, text);
            match best {
                Some((_, bs)) if s <= bs => {}
                _ => best = Some((zone, s)),
            }
        }
        best.map(|(z, _)| z)
    }
}

/// Zone pairs already computed during one build, keyed by background path.
#[derive(Debug, Default)]
pub struct ZoneCache {
    pairs: HashMap<PathBuf, ZonePair>,
}

impl ZoneCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached pair for `key`, computing it with `compute` on first use.
    pub fn get_or_insert_with(
        &mut self,
        key: &Path,
        compute: impl FnOnce() -> ZonePair,
    ) -> ZonePair {
        if let Some(pair) = self.pairs.get(key) {
            tracing::debug!(background = %key.display(), "zone cache hit");
            return *pair;
        }
        let pair = compute();
        self.pairs.insert(key.to_path_buf(), pair);
        pair
    }

    /// Number of cached backgrounds.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `true` before the first detection.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/zones.rs"]
mod tests;
