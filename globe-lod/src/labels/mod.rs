use bevy::math::{DVec3, Vec3, Vec4};
use globe_scene::{Ellipsoid, Geodetic2};

use crate::config::LabelsConfig;
use crate::error::Result;
use crate::render_data::RenderData;

mod loader;
pub use loader::*;

/// Labels with a fade below this are not drawn at all.
pub const MIN_FADE: f64 = 0.005;

/// Longest feature name kept, in bytes.
pub const MAX_FEATURE_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub feature: String,
    pub diameter: f32,
    /// Degrees.
    pub latitude: f32,
    /// Degrees, east positive, may exceed 180.
    pub longitude: f32,
    /// Surface position in model space.
    pub geo_position: Vec3,
}
impl LabelEntry {
    pub fn new(feature: String, diameter: f32, latitude: f32, longitude: f32, ellipsoid: &Ellipsoid) -> Self {
        let geodetic = Geodetic2::from_degrees(latitude as f64, longitude as f64);
        Self {
            feature,
            diameter,
            latitude,
            longitude,
            geo_position: ellipsoid.cartesian_surface_position(geodetic).as_vec3(),
        }
    }
    pub fn geodetic(&self) -> Geodetic2 {
        return Geodetic2::from_degrees(self.latitude as f64, self.longitude as f64);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRenderTechnique {
    Planar,
    Fisheye,
}

/// Everything a text renderer needs to draw one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub feature: String,
    /// Model space, raised by the minimum height along the surface normal.
    pub position: DVec3,
    pub color: Vec4,
    pub font_size: f32,
    pub text_scale: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub ortho_right: DVec3,
    pub ortho_up: DVec3,
    pub camera_position: DVec3,
    pub camera_look_up: DVec3,
    pub technique: LabelRenderTechnique,
}

/// Opacity ramp from `radius + min_height` to `radius + min_height + fade_in_distance`.
pub fn fade_in_factor(radius: f64, min_height: f64, fade_in_distance: f64, distance: f64) -> f64 {
    let start = radius + min_height;
    if fade_in_distance <= 0.0 {
        return if distance >= start { 1.0 } else { 0.0 };
    }
    return ((distance - start) / fade_in_distance).clamp(0.0, 1.0);
}

/// Billboard axes in model space, `None` when the view direction is zero.
pub fn ortho_vectors(view_direction: DVec3, look_up: DVec3) -> Option<(DVec3, DVec3)> {
    let mut ortho_right = view_direction.cross(look_up).normalize_or_zero();
    if ortho_right == DVec3::ZERO {
        let other = DVec3::new(look_up.y, look_up.x, look_up.z);
        ortho_right = other.cross(view_direction).normalize_or_zero();
    }
    if ortho_right == DVec3::ZERO {
        return None;
    }
    let ortho_up = ortho_right.cross(view_direction).normalize_or_zero();
    return Some((ortho_right, ortho_up));
}

#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    config: LabelsConfig,
    entries: Vec<LabelEntry>,
}
impl Labels {
    pub fn new(config: LabelsConfig, entries: Vec<LabelEntry>) -> Self {
        Self { config, entries }
    }
    /// Reads the labels through the cache next to them.
    pub fn load(config: LabelsConfig, identifier: &str, ellipsoid: &Ellipsoid) -> Result<Self> {
        let entries = load_labels(&config, identifier, ellipsoid)?;
        return Ok(Labels::new(config, entries));
    }
    pub fn config(&self) -> &LabelsConfig {
        return &self.config;
    }
    pub fn config_mut(&mut self) -> &mut LabelsConfig {
        return &mut self.config;
    }
    pub fn entries(&self) -> &[LabelEntry] {
        return &self.entries;
    }
    pub fn is_enabled(&self) -> bool {
        return self.config.enabled && !self.entries.is_empty();
    }
    pub fn fade(&self, ellipsoid: &Ellipsoid, distance_to_globe: f64) -> f64 {
        if !self.config.fade_in_enabled {
            return 1.0;
        }
        return fade_in_factor(
            ellipsoid.average_radius(),
            self.config.min_height,
            self.config.fade_in_distance,
            distance_to_globe,
        );
    }
    /// A label is drawn when it is nearer than the globe centre and inside the
    /// angular radius of the globe, both with some slack.
    pub fn is_label_visible(
        &self,
        distance_to_globe: f64,
        distance_to_label: f64,
        sin_alpha: f64,
        max_sin_alpha: f64,
    ) -> bool {
        if self.config.culling_disabled {
            return true;
        }
        return distance_to_globe >= distance_to_label + self.config.distance_epsilon
            && sin_alpha <= max_sin_alpha + self.config.sin_epsilon;
    }
    /// Placements of the labels visible from `data`, plus the number culled.
    pub fn placements(&self, data: &RenderData, ellipsoid: &Ellipsoid) -> (Vec<LabelPlacement>, usize) {
        if !self.is_enabled() {
            return (Vec::new(), 0);
        }
        let camera_position = data.camera_position_model_space();
        let distance_to_globe = camera_position.length();
        let fade = self.fade(ellipsoid, distance_to_globe);
        if fade < MIN_FADE {
            return (Vec::new(), self.entries.len());
        }
        let view_direction = data.camera_view_direction_model_space();
        let Some((ortho_right, ortho_up)) =
            ortho_vectors(view_direction, data.camera_look_up_model_space())
        else {
            return (Vec::new(), self.entries.len());
        };
        let max_sin_alpha = if distance_to_globe > 0.0 {
            (ellipsoid.maximum_radius / distance_to_globe).min(1.0)
        } else {
            1.0
        };
        let to_globe = (-camera_position).normalize_or_zero();
        let [r, g, b, a] = self.config.color;
        let color = Vec4::new(r, g, b, a * fade as f32);
        let technique = if data.fisheye {
            LabelRenderTechnique::Fisheye
        } else {
            LabelRenderTechnique::Planar
        };

        let mut placements = Vec::new();
        let mut culled = 0;
        for entry in self.entries.iter() {
            let normal = ellipsoid.geodetic_surface_normal(entry.geodetic());
            let position = entry.geo_position.as_dvec3() + normal * self.config.min_height;
            let camera_to_label = position - camera_position;
            let distance_to_label = camera_to_label.length();
            let sin_alpha = to_globe.cross(camera_to_label.normalize_or_zero()).length();
            if !self.is_label_visible(distance_to_globe, distance_to_label, sin_alpha, max_sin_alpha) {
                culled += 1;
                continue;
            }
            placements.push(LabelPlacement {
                feature: entry.feature.clone(),
                position,
                color,
                font_size: self.config.font_size,
                text_scale: 2f32.powf(self.config.size),
                min_size: self.config.min_size,
                max_size: self.config.max_size,
                ortho_right,
                ortho_up,
                camera_position,
                camera_look_up: data.camera_look_up_model_space(),
                technique,
            });
        }
        return (placements, culled);
    }
}
