//! Level → map asset lookup table.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors from building or querying a [`LevelMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelMapError {
    /// A reported level has no map asset configured.
    #[error("No map configured for level '{0}'")]
    UnknownLevel(String),

    /// The table has no entries at all.
    #[error("Level map is empty")]
    Empty,

    /// An entry has an empty level identifier.
    #[error("Level identifier must not be empty")]
    EmptyLevelId,

    /// An entry has an empty asset path.
    #[error("Map path for level '{0}' must not be empty")]
    EmptyPath(String),
}

/// Location of a map asset as understood by the map server.
///
/// This is an opaque string (a filesystem path or URL). The switcher never
/// opens it; the map server does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapAssetPath(String);

impl MapAssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapAssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapAssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for MapAssetPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Fixed table of level identifier → map asset path.
///
/// Built once at startup and never modified. Construction rejects empty
/// tables, empty identifiers and empty paths, so every stored entry is
/// usable as-is.
///
/// # Example
///
/// ```
/// use levelswitch::level::LevelMap;
///
/// let map = LevelMap::new([("L1", "L1/map.yaml"), ("L2", "L2/map.yaml")]).unwrap();
/// assert_eq!(map.resolve("L2").unwrap().as_str(), "L2/map.yaml");
/// assert!(map.resolve("L3").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    entries: BTreeMap<String, MapAssetPath>,
}

impl LevelMap {
    /// Build a level map from `(level, path)` pairs.
    ///
    /// Later duplicates of a level replace earlier ones.
    pub fn new<I, L, P>(entries: I) -> Result<Self, LevelMapError>
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: Into<MapAssetPath>,
    {
        let mut table = BTreeMap::new();
        for (level, path) in entries {
            let level = level.into();
            let path = path.into();
            if level.trim().is_empty() {
                return Err(LevelMapError::EmptyLevelId);
            }
            if path.as_str().trim().is_empty() {
                return Err(LevelMapError::EmptyPath(level));
            }
            table.insert(level, path);
        }

        if table.is_empty() {
            return Err(LevelMapError::Empty);
        }

        Ok(Self { entries: table })
    }

    /// Look up the map asset for a level.
    pub fn resolve(&self, level: &str) -> Result<&MapAssetPath, LevelMapError> {
        self.entries
            .get(level)
            .ok_or_else(|| LevelMapError::UnknownLevel(level.to_string()))
    }

    pub fn contains(&self, level: &str) -> bool {
        self.entries.contains_key(level)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries sorted by level identifier.
    pub fn levels(&self) -> impl Iterator<Item = (&str, &MapAssetPath)> {
        self.entries.iter().map(|(level, path)| (level.as_str(), path))
    }
}
