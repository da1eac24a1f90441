//! Tunables for rendering, batch runs and interactive re-rendering.
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON file only
//! needs the fields it overrides.

use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An 8-bit RGBA color.
pub type Rgba = [u8; 4];

/// Configuration for the [`Renderer`](crate::render::Renderer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of the square output image in pixels.
    pub image_size: u32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Fraction of the frame the path's bounding sphere may fill.
    pub margin: f32,
    /// Largest bounding-box extent still treated as a point cloud.
    pub degenerate_extent: f32,
    /// Marker radius used for point clouds.
    pub degenerate_marker_radius: f32,
    /// Marker radius as a fraction of the bounding-box diagonal.
    pub marker_scale: f32,
    /// Smallest marker radius for non-degenerate paths, in world units.
    pub min_marker_radius: f32,
    /// Poly-line width in pixels at 200x200; scales with the image.
    pub line_width: f32,
    pub background: Rgba,
    pub start_color: Rgba,
    pub end_color: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_size: 200,
            fov_degrees: 45.0,
            margin: 0.85,
            degenerate_extent: 1e-3,
            degenerate_marker_radius: 0.05,
            marker_scale: 0.015,
            min_marker_radius: 0.1,
            line_width: 1.5,
            background: [20, 20, 31, 255],
            start_color: [34, 197, 94, 255],
            end_color: [244, 63, 94, 255],
        }
    }
}

impl RenderConfig {
    /// Thumbnail preset: same look on a 400x400 viewport.
    pub fn thumbnail() -> Self {
        Self {
            image_size: 400,
            ..Self::default()
        }
    }
}

/// Configuration for [`run_batch`](crate::batch::run_batch).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Walks longer than this are decimated before rendering.
    pub max_points: usize,
    /// Upper bound on the sanitized walk-name part of an output identifier.
    pub max_name_len: usize,
    /// Directory receiving images and the manifest.
    pub output_dir: PathBuf,
    /// Manifest file name inside `output_dir`.
    pub manifest_name: String,
    /// Only datasets whose identifier contains one of these substrings run.
    /// Empty means all.
    pub only: Vec<String>,
    /// Reconcile with the previous manifest instead of replacing it.
    pub merge: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_points: 5000,
            max_name_len: 64,
            output_dir: PathBuf::from("thumbnails"),
            manifest_name: "manifest.json".to_string(),
            only: Vec::new(),
            merge: false,
        }
    }
}

impl BatchConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }

    /// True when `dataset_id` passes the `only` filter.
    pub fn selects(&self, dataset_id: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|f| dataset_id.contains(f.as_str()))
    }
}

/// Configuration for [`RerenderJob`](crate::interactive::RerenderJob).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerenderConfig {
    /// Desired number of points per re-derived walk.
    pub target_points: usize,
    /// Items processed before control returns to the host.
    pub items_per_yield: usize,
}

impl Default for RerenderConfig {
    fn default() -> Self {
        Self {
            target_points: 5000,
            items_per_yield: 10,
        }
    }
}

/// Shared JSON loading for the config structs.
pub trait LoadConfig: DeserializeOwned {
    fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

impl LoadConfig for RenderConfig {}
impl LoadConfig for BatchConfig {}
impl LoadConfig for RerenderConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = BatchConfig::from_json_str(r#"{"merge": true, "only": ["whale"]}"#).unwrap();
        assert!(cfg.merge);
        assert_eq!(cfg.max_points, 5000);
        assert_eq!(cfg.manifest_name, "manifest.json");
    }

    #[test]
    fn only_filter_is_substring_match() {
        let cfg = BatchConfig {
            only: vec!["bird".into()],
            ..Default::default()
        };
        assert!(cfg.selects("songbirds"));
        assert!(!cfg.selects("whales"));
        assert!(BatchConfig::default().selects("anything"));
    }

    #[test]
    fn render_config_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        std::fs::write(&path, r#"{"image_size": 64, "line_width": 2.0}"#).unwrap();
        let cfg = RenderConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.image_size, 64);
        assert_eq!(cfg.line_width, 2.0);
        assert_eq!(cfg.fov_degrees, RenderConfig::default().fov_degrees);
        assert!(matches!(
            RenderConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn thumbnail_preset_is_400() {
        assert_eq!(RenderConfig::thumbnail().image_size, 400);
        assert_eq!(RenderConfig::default().image_size, 200);
    }
}
