use std::path::{Path, PathBuf};

use crate::foundation::error::{DeckError, DeckResult};

/// Build-scoped temporary directory for rasterized pages.
///
/// Removed, with everything inside it, when dropped.
#[derive(Debug)]
pub struct ScratchDir {
    dir: tempfile::TempDir,
    next: u32,
}

impl ScratchDir {
    /// Create a fresh directory under the system temp dir.
    pub fn new() -> DeckResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("deckforge_")
            .tempdir()
            .map_err(|e| DeckError::io("create build scratch directory", e))?;
        Ok(Self { dir, next: 0 })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reserve a fresh file path inside the directory. The file is not created.
    pub fn next_path(&mut self, stem: &str, ext: &str) -> PathBuf {
        let n = self.next;
        self.next += 1;
        self.dir.path().join(format!("{stem}_{n:04}.{ext}"))
    }
}
