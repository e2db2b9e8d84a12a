//! Levels, their map assets, and level-change detection.
//!
//! - [`LevelMap`]: fixed table of level identifier → map asset path
//! - [`LevelMonitor`]: decides whether a snapshot should trigger a switch
//! - [`AssetRoot`]: joins relative asset paths onto a map share directory

mod assets;
mod map;
mod monitor;

pub use assets::AssetRoot;
pub use map::{LevelMap, LevelMapError, MapAssetPath};
pub use monitor::{LevelChangeEvent, LevelMonitor, Observation};
