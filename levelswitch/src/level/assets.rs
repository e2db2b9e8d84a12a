//! Map asset location.
//!
//! Level tables are usually written with paths relative to a map set inside
//! a shared maps directory (`<share_dir>/<map_name>/<relative>`). The map
//! server needs the full location, so relative entries are joined onto the
//! configured root before the [`LevelMap`](super::LevelMap) is built.

use std::path::{Path, PathBuf};

use super::map::MapAssetPath;

/// Root directory that relative map asset paths are joined onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    share_dir: PathBuf,
    map_name: Option<String>,
}

impl AssetRoot {
    /// Create a root at `share_dir`.
    pub fn new(share_dir: impl Into<PathBuf>) -> Self {
        Self {
            share_dir: share_dir.into(),
            map_name: None,
        }
    }

    /// Place assets under a named map set inside the share directory.
    pub fn with_map_name(mut self, map_name: impl Into<String>) -> Self {
        let map_name = map_name.into();
        self.map_name = (!map_name.is_empty()).then_some(map_name);
        self
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        match &self.map_name {
            Some(name) => self.share_dir.join(name),
            None => self.share_dir.clone(),
        }
    }

    /// Produce the full asset location for a configured path.
    ///
    /// Absolute paths and URLs are returned unchanged.
    pub fn locate(&self, configured: &str) -> MapAssetPath {
        if configured.contains("://") || Path::new(configured).is_absolute() {
            return MapAssetPath::new(configured);
        }
        MapAssetPath::new(self.base_dir().join(configured).to_string_lossy())
    }
}
