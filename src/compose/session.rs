use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::deck::DeckRasterizer;
use crate::assets::decode;
use crate::assets::registry::{BackgroundKind, TemplateRegistry, TemplateSource};
use crate::assets::scratch::ScratchDir;
use crate::compose::plan::{
    BackgroundOp, SlideKind, SlidePlan, TextAlign, TextBlock, VerticalAnchor,
};
use crate::config::EngineConfig;
use crate::foundation::core::{Rgb8, Zone, ZonePair};
use crate::foundation::error::{DeckError, DeckResult};
use crate::layout::fonts::{body_font_size, title_font_size};
use crate::layout::images::{ImageLayoutPlanner, UserImagePool, crop_to_fill};
use crate::layout::zones::{DEFAULT_ZONES, FIRST_SLIDE_TITLE_ZONE, ZoneCache, ZoneDetector};
use crate::theme::synth;

/// Zone of the names on the credits slide.
pub const CREDITS_ZONE: Zone = Zone::new(0.10, 0.34, 0.80, 0.36);
/// Font size of the credit names.
pub const CREDITS_FONT_SIZE_PT: f32 = 26.0;
/// Paragraph spacing of the first slide's title.
pub const TITLE_SPACE_AFTER_PT: f32 = 2.0;
/// Paragraph spacing between bullets.
pub const BULLET_SPACE_AFTER_PT: f32 = 5.0;

/// Content of one slide as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideSpec {
    /// Slide title. Only the first slide shows a title, and only when the topic is blank.
    pub title: String,
    /// Bullet points, without prefix.
    pub bullets: Vec<String>,
}

fn default_font_name() -> String {
    "Calibri".to_string()
}

fn default_font_color() -> String {
    "FFFFFF".to_string()
}

/// Everything one build needs from the caller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BuildRequest {
    /// Deck topic, shown as the title of the first slide.
    #[serde(default)]
    pub topic: String,
    /// Slides in deck order; at least one.
    pub slides: Vec<SlideSpec>,
    /// Template id per slide. Slides past the end of the list use the first id.
    #[serde(default)]
    pub template_ids: Vec<u32>,
    /// Font family for all text.
    #[serde(default = "default_font_name")]
    pub font_name: String,
    /// `RRGGBB` or `#RRGGBB`.
    #[serde(default = "default_font_color")]
    pub font_color: String,
    /// Pictures placed next to the text, in pool order.
    #[serde(default)]
    pub user_images: Vec<PathBuf>,
    /// Names listed on a trailing credits slide.
    #[serde(default)]
    pub credits: Vec<String>,
}

impl BuildRequest {
    /// Parse a request from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> DeckResult<Self> {
        let req: Self = serde_json::from_reader(r)
            .map_err(|e| DeckError::validation(format!("parse build request JSON: {e}")))?;
        Ok(req)
    }

    /// Read and parse a request JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| DeckError::io(format!("open build request '{}'", path.display()), e))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject requests that cannot produce a deck. Returns the parsed font color.
    pub fn validate(&self) -> DeckResult<Rgb8> {
        let color = Rgb8::parse_hex(&self.font_color)?;
        if self.slides.is_empty() {
            return Err(DeckError::validation("request has no slides"));
        }
        if self.font_name.trim().is_empty() {
            return Err(DeckError::validation("font_name must not be empty"));
        }
        Ok(color)
    }

    /// Title text of the first slide: the topic, or the first slide's own title when the topic
    /// is blank.
    pub fn deck_title(&self) -> &str {
        let topic = self.topic.trim();
        if !topic.is_empty() {
            return topic;
        }
        self.slides.first().map_or("", |s| s.title.trim())
    }
}

fn clean_names<'a>(names: impl IntoIterator<Item = &'a str>, cap: usize) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(cap)
        .map(str::to_owned)
        .collect()
}

/// Split a comma-separated list of names, dropping blanks, keeping at most `cap` names.
pub fn parse_credit_names(raw: &str, cap: usize) -> Vec<String> {
    clean_names(raw.split(','), cap)
}

/// File stem for a deck about `topic`: safe characters only, at most 40 of them.
pub fn suggested_file_stem(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    let mut in_run = false;
    for c in topic.chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let stem: String = out.trim_matches('_').chars().take(40).collect();
    if stem.is_empty() {
        "presentation".to_string()
    } else {
        stem
    }
}

/// Plans of a finished build, plus the scratch files they point at.
///
/// The scratch directory (rasterized deck pages) is removed when this value is dropped, so
/// serialize the deck before letting it go.
#[derive(Debug)]
pub struct ComposedDeck {
    plans: Vec<SlidePlan>,
    scratch: ScratchDir,
}

impl ComposedDeck {
    /// Plans in deck order.
    pub fn plans(&self) -> &[SlidePlan] {
        &self.plans
    }

    /// Number of slides, credits included.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// `true` for a deck without slides, which a build never returns.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Directory holding the rasterized pages referenced by the plans.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Plans as pretty-printed JSON.
    pub fn to_json(&self) -> DeckResult<String> {
        serde_json::to_string_pretty(&self.plans)
            .map_err(|e| DeckError::validation(format!("serialize plans: {e}")))
    }

    /// Hand the plans to `write`, then remove the scratch directory whatever the outcome.
    pub fn persist_with<T>(
        self,
        write: impl FnOnce(&[SlidePlan]) -> DeckResult<T>,
    ) -> DeckResult<T> {
        let out = write(&self.plans);
        drop(self);
        out
    }

    /// Copy the scratch files the plans reference into `assets_dir` and return the plans
    /// pointing at the copies. Caller-owned files keep their paths.
    ///
    /// The scratch directory is removed afterwards, whatever the outcome. `assets_dir` is only
    /// created when there is something to copy.
    pub fn export_to(self, assets_dir: &Path) -> DeckResult<Vec<SlidePlan>> {
        let Self { mut plans, scratch } = self;
        let assets_dir = std::path::absolute(assets_dir).map_err(|e| {
            DeckError::io(format!("resolve assets dir '{}'", assets_dir.display()), e)
        })?;

        let mut copied: HashMap<PathBuf, PathBuf> = HashMap::new();
        for plan in &mut plans {
            for path in plan.referenced_files_mut() {
                let Ok(rel) = path.strip_prefix(scratch.path()) else {
                    continue;
                };
                let dest = match copied.get(path.as_path()) {
                    Some(dest) => dest.clone(),
                    None => {
                        let dest = assets_dir.join(rel);
                        if copied.is_empty() {
                            std::fs::create_dir_all(&assets_dir).map_err(|e| {
                                DeckError::io(
                                    format!("create assets dir '{}'", assets_dir.display()),
                                    e,
                                )
                            })?;
                        }
                        std::fs::copy(&*path, &dest).map_err(|e| {
                            DeckError::io(format!("copy '{}'", path.display()), e)
                        })?;
                        copied.insert(path.clone(), dest.clone());
                        dest
                    }
                };
                *path = dest;
            }
        }

        tracing::debug!(
            assets = %assets_dir.display(),
            files = copied.len(),
            "exported scratch files"
        );
        drop(scratch);
        Ok(plans)
    }
}

/// One build: owns the registry view, every cache, and the orientation RNG.
///
/// Consumed by [`BuildSession::compose`]; caches never outlive the build.
pub struct BuildSession {
    registry: TemplateRegistry,
    config: EngineConfig,
    rasterizer: DeckRasterizer,
    detector: ZoneDetector,
    zones: ZoneCache,
    resolved: HashMap<u32, TemplateSource>,
    planner: ImageLayoutPlanner,
    rng: StdRng,
}

impl std::fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSession")
            .field("registry", &self.registry.root())
            .field("rasterizer", &self.rasterizer)
            .field("cached_zones", &self.zones.len())
            .finish_non_exhaustive()
    }
}

impl BuildSession {
    /// Session with the built-in deck renderers.
    pub fn new(registry: TemplateRegistry, config: EngineConfig) -> DeckResult<Self> {
        config.validate()?;
        let rasterizer = DeckRasterizer::with_builtin_renderers(config.deck_render_scale);
        let detector = ZoneDetector::new(config.zone_weights, config.title_body_epsilon);
        let planner = ImageLayoutPlanner::new(config.canvas(), config.min_text_zone);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            registry,
            config,
            rasterizer,
            detector,
            zones: ZoneCache::new(),
            resolved: HashMap::new(),
            planner,
            rng,
        })
    }

    /// Replace the deck rasterizer, e.g. to install extra renderers.
    pub fn with_rasterizer(mut self, rasterizer: DeckRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Settings the session was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compose every slide of `request`, in order, plus the credits slide when names are given.
    #[tracing::instrument(
        name = "compose",
        skip_all,
        fields(topic = %request.topic, slides = request.slides.len())
    )]
    pub fn compose(mut self, request: &BuildRequest) -> DeckResult<ComposedDeck> {
        let color = request.validate()?;
        let mut scratch = ScratchDir::new()?;
        let pool = UserImagePool::prepare(&request.user_images);
        tracing::debug!(
            scratch = %scratch.path().display(),
            user_images = pool.len(),
            "build started"
        );

        let mut plans = Vec::with_capacity(request.slides.len() + 1);
        for (index, spec) in request.slides.iter().enumerate() {
            let plan = self.compose_slide(request, color, &pool, index, spec, &mut scratch)?;
            plans.push(plan);
        }

        let names = clean_names(
            request.credits.iter().map(String::as_str),
            self.config.max_credit_names,
        );
        if !names.is_empty() {
            plans.push(self.credits_slide(request, color, plans.len(), names));
        }

        tracing::info!(plans = plans.len(), "deck composed");
        Ok(ComposedDeck { plans, scratch })
    }

    /// Template for slide `index`; unknown ids fall back to the first configured id.
    fn template_for_slide(&mut self, ids: &[u32], index: usize) -> TemplateSource {
        let Some(&first) = ids.first() else {
            return TemplateSource {
                id: 0,
                kind: BackgroundKind::None,
            };
        };
        let mut id = ids.get(index).copied().unwrap_or(first);
        if !self.registry.contains(id) {
            let err = DeckError::UnsupportedTemplate { template_id: id };
            tracing::warn!(slide = index, fallback = first, "{err}");
            id = first;
        }
        self.resolved
            .entry(id)
            .or_insert_with(|| self.registry.resolve(id))
            .clone()
    }

    fn procedural(&self, index: usize) -> (BackgroundOp, ZonePair) {
        let bg = synth::synthesize(index, self.config.canvas());
        (
            BackgroundOp::Procedural {
                palette_index: bg.palette_index,
                shapes: bg.shapes,
            },
            DEFAULT_ZONES,
        )
    }

    fn raster_background(&self, path: PathBuf, (w, h): (u32, u32)) -> BackgroundOp {
        let canvas = self.config.canvas();
        BackgroundOp::Raster {
            path,
            source_px: (w, h),
            crop: crop_to_fill(f64::from(w), f64::from(h), canvas.width, canvas.height),
        }
    }

    fn background_for_slide(
        &mut self,
        source: &TemplateSource,
        index: usize,
        color: Rgb8,
        scratch: &mut ScratchDir,
    ) -> DeckResult<(BackgroundOp, ZonePair)> {
        match &source.kind {
            BackgroundKind::VectorDeck(deck) => {
                let page = self
                    .rasterizer
                    .page_for_slide(source.id, deck, index, scratch)?;
                let zones = self
                    .zones
                    .get_or_insert_with(&page.path, || self.detector.detect(&page.image, color));
                Ok((
                    self.raster_background(page.path.clone(), (page.width, page.height)),
                    zones,
                ))
            }
            BackgroundKind::StaticRaster(path) => match decode::probe_dimensions(path) {
                Ok(px) => {
                    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                    let zones = self
                        .zones
                        .get_or_insert_with(&key, || self.detector.detect_file(path, color));
                    Ok((self.raster_background(path.clone(), px), zones))
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(
                        template_id = source.id,
                        error = %err,
                        "background undecodable, using procedural theme"
                    );
                    Ok(self.procedural(index))
                }
                Err(err) => Err(err),
            },
            BackgroundKind::None => Ok(self.procedural(index)),
        }
    }

    fn compose_slide(
        &mut self,
        request: &BuildRequest,
        color: Rgb8,
        pool: &UserImagePool,
        index: usize,
        spec: &SlideSpec,
        scratch: &mut ScratchDir,
    ) -> DeckResult<SlidePlan> {
        let source = self.template_for_slide(&request.template_ids, index);
        let (background, zones) = self.background_for_slide(&source, index, color, scratch)?;

        let title = (index == 0)
            .then(|| request.deck_title())
            .filter(|t| !t.is_empty())
            .map(|text| TextBlock {
                zone: FIRST_SLIDE_TITLE_ZONE,
                lines: vec![text.to_string()],
                font_name: request.font_name.clone(),
                font_size_pt: title_font_size(text),
                color,
                bold: true,
                align: TextAlign::Center,
                anchor: VerticalAnchor::Middle,
                space_after_pt: TITLE_SPACE_AFTER_PT,
            });

        let (text_zone, images) = match self.planner.plan_slide(
            pool,
            index,
            title.is_some(),
            zones.body,
            &mut self.rng,
        ) {
            Some((layout, images)) => {
                tracing::debug!(slide = index, orientation = ?layout.orientation, "images placed");
                (layout.text_zone, images)
            }
            None => (zones.body, Vec::new()),
        };

        let prefix = &self.config.bullet_prefix;
        let body = TextBlock {
            zone: text_zone,
            lines: spec.bullets.iter().map(|b| format!("{prefix}{b}")).collect(),
            font_name: request.font_name.clone(),
            font_size_pt: body_font_size(&spec.bullets),
            color,
            bold: false,
            align: TextAlign::Left,
            anchor: VerticalAnchor::Top,
            space_after_pt: BULLET_SPACE_AFTER_PT,
        };

        tracing::debug!(
            slide = index,
            template_id = source.id,
            body_size = body.font_size_pt,
            images = images.len(),
            "slide composed"
        );
        Ok(SlidePlan {
            index,
            kind: SlideKind::Content,
            background,
            title,
            body,
            images,
        })
    }

    fn credits_slide(
        &self,
        request: &BuildRequest,
        color: Rgb8,
        index: usize,
        names: Vec<String>,
    ) -> SlidePlan {
        let (background, _) = self.procedural(index);
        SlidePlan {
            index,
            kind: SlideKind::Credits,
            background,
            title: None,
            body: TextBlock {
                zone: CREDITS_ZONE,
                lines: names,
                font_name: request.font_name.clone(),
                font_size_pt: CREDITS_FONT_SIZE_PT,
                color,
                bold: false,
                align: TextAlign::Center,
                anchor: VerticalAnchor::Top,
                space_after_pt: 0.0,
            },
            images: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/session.rs"]
mod tests;
