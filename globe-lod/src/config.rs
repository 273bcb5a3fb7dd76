use std::path::{Path, PathBuf};

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deepest level a tile index can address with `u32` columns.
pub const MAX_SUPPORTED_SPLIT_DEPTH: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub identifier: String,
    pub radii: [f64; 3],
    pub segments_per_patch: u32,
    pub min_split_depth: u32,
    pub max_split_depth: u32,
    pub general: GeneralProperties,
    pub debug: DebugProperties,
    pub labels: Option<LabelsConfig>,
}
impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            identifier: "Earth".to_string(),
            radii: [6378137.0, 6378137.0, 6356752.3142451793],
            segments_per_patch: 64,
            min_split_depth: 2,
            max_split_depth: 22,
            general: GeneralProperties::default(),
            debug: DebugProperties::default(),
            labels: None,
        }
    }
}
impl GlobeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GlobeConfig = serde_json::from_str(json)?;
        config.validate()?;
        return Ok(config);
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        return GlobeConfig::from_json_str(&json);
    }
    pub fn radii(&self) -> DVec3 {
        return DVec3::from_array(self.radii);
    }
    pub fn validate(&self) -> Result<()> {
        if self.radii.iter().any(|r| !(*r > 0.0) || !r.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "radii must be positive, got {:?}",
                self.radii
            )));
        }
        if self.min_split_depth < 1 {
            return Err(Error::InvalidConfig(
                "min_split_depth must be at least 1".to_string(),
            ));
        }
        if self.min_split_depth > self.max_split_depth {
            return Err(Error::InvalidConfig(format!(
                "min_split_depth {} is larger than max_split_depth {}",
                self.min_split_depth, self.max_split_depth
            )));
        }
        if self.max_split_depth > MAX_SUPPORTED_SPLIT_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max_split_depth {} exceeds {}",
                self.max_split_depth, MAX_SUPPORTED_SPLIT_DEPTH
            )));
        }
        if !(self.general.lod_scale_factor > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lod_scale_factor must be positive, got {}",
                self.general.lod_scale_factor
            )));
        }
        return Ok(());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralProperties {
    pub lod_scale_factor: f64,
}
impl Default for GeneralProperties {
    fn default() -> Self {
        Self {
            lod_scale_factor: 10.0,
        }
    }
}

/// Read every frame, so toggling a flag takes effect on the next render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugProperties {
    pub perform_horizon_culling: bool,
    pub perform_frustum_culling: bool,
    pub level_by_projected_area_else_distance: bool,
    pub limit_level_by_available_data: bool,
    pub show_chunk_bounds: bool,
    pub show_chunk_aabb: bool,
}
impl Default for DebugProperties {
    fn default() -> Self {
        Self {
            perform_horizon_culling: true,
            perform_frustum_culling: true,
            level_by_projected_area_else_distance: true,
            limit_level_by_available_data: true,
            show_chunk_bounds: false,
            show_chunk_aabb: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub file_name: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub enabled: bool,
    pub font_size: f32,
    pub max_size: f32,
    pub min_size: f32,
    pub size: f32,
    pub min_height: f64,
    pub color: [f32; 4],
    pub fade_in_distance: f64,
    pub fade_in_enabled: bool,
    pub culling_disabled: bool,
    pub distance_epsilon: f64,
    pub sin_epsilon: f64,
}
impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            file_name: PathBuf::new(),
            cache_dir: None,
            enabled: true,
            font_size: 30.0,
            max_size: 300.0,
            min_size: 4.0,
            size: 2.5,
            min_height: 100.0,
            color: [1.0, 1.0, 0.0, 1.0],
            fade_in_distance: 1e6,
            fade_in_enabled: true,
            culling_disabled: false,
            distance_epsilon: 5500.0,
            sin_epsilon: 0.04,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let config = GlobeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GlobeConfig::default());
        assert_eq!(config.min_split_depth, 2);
        assert_eq!(config.max_split_depth, 22);
        assert!(config.debug.perform_horizon_culling);
        assert!(!config.debug.show_chunk_aabb);
    }
    #[test]
    fn partial_json() {
        let config = GlobeConfig::from_json_str(
            r#"{
                "identifier": "Moon",
                "radii": [1737400.0, 1737400.0, 1737400.0],
                "debug": { "perform_frustum_culling": false },
                "labels": { "file_name": "moon.csv", "min_height": 50.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.identifier, "Moon");
        assert!(!config.debug.perform_frustum_culling);
        assert!(config.debug.perform_horizon_culling);
        let labels = config.labels.unwrap();
        assert_eq!(labels.file_name, PathBuf::from("moon.csv"));
        assert_eq!(labels.min_height, 50.0);
        assert_eq!(labels.distance_epsilon, 5500.0);
    }
    #[test]
    fn validation_is_fatal() {
        let bad = [
            r#"{ "radii": [0.0, 1.0, 1.0] }"#,
            r#"{ "min_split_depth": 0 }"#,
            r#"{ "min_split_depth": 10, "max_split_depth": 5 }"#,
            r#"{ "max_split_depth": 31 }"#,
            r#"{ "general": { "lod_scale_factor": -1.0 } }"#,
        ];
        for json in bad {
            assert!(matches!(
                GlobeConfig::from_json_str(json),
                Err(Error::InvalidConfig(_))
            ));
        }
        assert!(matches!(
            GlobeConfig::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
    }
}
