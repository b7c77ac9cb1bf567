use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{DeckError, DeckResult};

/// What a template id resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum BackgroundKind {
    /// Multi-page vector document; pages are rasterized per build.
    VectorDeck(PathBuf),
    /// Single photo or picture used as is.
    StaticRaster(PathBuf),
    /// No asset; the procedural theme is used.
    None,
}

/// A resolved template id.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TemplateSource {
    /// Template id.
    pub id: u32,
    /// Resolved background kind.
    pub kind: BackgroundKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AssetClass {
    Deck,
    Raster,
}

fn classify(path: &Path) -> Option<AssetClass> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "svg" | "svgdeck" | "pdf" => Some(AssetClass::Deck),
        "png" | "jpg" | "jpeg" => Some(AssetClass::Raster),
        _ => None,
    }
}

/// Leading decimal digits of the file stem, e.g. `12_forest.png` -> 12.
pub fn template_id_from_path(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits_end = stem
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(stem.len(), |(i, _)| i);
    if digits_end == 0 {
        return None;
    }
    stem[..digits_end].parse().ok()
}

#[derive(Clone, Debug, Default)]
struct Entry {
    deck: Option<PathBuf>,
    raster: Option<PathBuf>,
}

/// Directory of background assets keyed by the leading number of each file name.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    root: PathBuf,
    entries: BTreeMap<u32, Entry>,
}

impl TemplateRegistry {
    /// Scan `root` once. A missing directory yields an empty registry.
    pub fn scan(root: impl Into<PathBuf>) -> DeckResult<Self> {
        let root = root.into();
        let mut out = Self {
            root,
            entries: BTreeMap::new(),
        };
        if !out.root.is_dir() {
            tracing::warn!(root = %out.root.display(), "template directory not found");
            return Ok(out);
        }

        let read = std::fs::read_dir(&out.root).map_err(|e| {
            DeckError::io(format!("read template dir '{}'", out.root.display()), e)
        })?;
        let mut files = Vec::new();
        for item in read {
            let item = item.map_err(|e| DeckError::io("read template dir entry", e))?;
            let path = item.path();
            if path.is_file() {
                files.push(path);
            }
        }
        // Directory iteration order is platform dependent; sort so ties resolve the same way.
        files.sort();

        for path in files {
            let (Some(id), Some(class)) = (template_id_from_path(&path), classify(&path)) else {
                continue;
            };
            let entry = out.entries.entry(id).or_default();
            let slot = match class {
                AssetClass::Deck => &mut entry.deck,
                AssetClass::Raster => &mut entry.raster,
            };
            if slot.is_none() {
                *slot = Some(path);
            }
        }
        tracing::debug!(
            root = %out.root.display(),
            templates = out.entries.len(),
            "scanned template registry"
        );
        Ok(out)
    }

    /// Scanned directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return `true` when at least one asset carries `id`.
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Every template id present, ascending.
    pub fn template_ids(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    /// Resolve `id`: deck first, then static raster, else [`BackgroundKind::None`].
    pub fn resolve(&self, id: u32) -> TemplateSource {
        let kind = match self.entries.get(&id) {
            Some(Entry {
                deck: Some(path), ..
            }) => BackgroundKind::VectorDeck(path.clone()),
            Some(Entry {
                raster: Some(path),
                ..
            }) => BackgroundKind::StaticRaster(path.clone()),
            _ => BackgroundKind::None,
        };
        TemplateSource { id, kind }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/registry.rs"]
mod tests;
