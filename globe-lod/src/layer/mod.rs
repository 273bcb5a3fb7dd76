use std::fmt;
use std::sync::Arc;

use bevy::math::{DVec2, UVec2};
use serde::{Deserialize, Serialize};

use crate::tile::{TileProvider, TileUvTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerGroupId {
    HeightLayers = 0,
    ColorLayers = 1,
    Overlays = 2,
    NightLayers = 3,
    WaterMasks = 4,
}
impl LayerGroupId {
    pub const ALL: [LayerGroupId; 5] = [
        LayerGroupId::HeightLayers,
        LayerGroupId::ColorLayers,
        LayerGroupId::Overlays,
        LayerGroupId::NightLayers,
        LayerGroupId::WaterMasks,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerBlendMode {
    #[default]
    Normal,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerRenderSettings {
    pub gamma: f32,
    pub multiplier: f32,
    pub offset: f32,
    pub blend_mode: LayerBlendMode,
}
impl Default for LayerRenderSettings {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            multiplier: 1.0,
            offset: 0.0,
            blend_mode: LayerBlendMode::Normal,
        }
    }
}
impl LayerRenderSettings {
    pub fn perform_layer_settings(&self, value: f32) -> f32 {
        return value.signum() * value.abs().powf(self.gamma) * self.multiplier + self.offset;
    }
}

#[derive(Clone)]
pub struct Layer {
    pub name: String,
    pub enabled: bool,
    pub tile_provider: Arc<dyn TileProvider>,
    pub render_settings: LayerRenderSettings,
    /// Border texels around the tile data, on every side.
    pub padding: u32,
}
impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("render_settings", &self.render_settings)
            .field("padding", &self.padding)
            .finish()
    }
}
impl Layer {
    pub fn new(name: impl Into<String>, tile_provider: Arc<dyn TileProvider>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            tile_provider,
            render_settings: LayerRenderSettings::default(),
            padding: 0,
        }
    }
    pub fn with_render_settings(mut self, render_settings: LayerRenderSettings) -> Self {
        self.render_settings = render_settings;
        return self;
    }
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        return self;
    }
    pub fn tile_provider(&self) -> &dyn TileProvider {
        return self.tile_provider.as_ref();
    }
    /// Maps a chunk uv into the texture, skipping the padded border.
    pub fn tile_uv_to_texture_sample_position(
        &self,
        uv_transform: &TileUvTransform,
        patch_uv: DVec2,
        resolution: UVec2,
    ) -> DVec2 {
        let uv = uv_transform.apply(patch_uv);
        let current_size = resolution.as_dvec2();
        let padding = DVec2::splat(self.padding as f64);
        let source_size = (current_size - 2.0 * padding).max(DVec2::ONE);
        return (uv * source_size + padding) / current_size;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerGroup {
    layers: Vec<Layer>,
}
impl LayerGroup {
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
    pub fn layers(&self) -> &[Layer] {
        return &self.layers;
    }
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        return self.layers.iter_mut().find(|layer| layer.name == name);
    }
    /// Enabled layers in insertion order.
    pub fn active_layers(&self) -> impl Iterator<Item = &Layer> {
        return self.layers.iter().filter(|layer| layer.enabled);
    }
    pub fn has_active_layers(&self) -> bool {
        return self.active_layers().next().is_some();
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    groups: [LayerGroup; 5],
}
impl LayerManager {
    pub fn new() -> Self {
        return Self::default();
    }
    pub fn layer_group(&self, id: LayerGroupId) -> &LayerGroup {
        return &self.groups[id as usize];
    }
    pub fn layer_group_mut(&mut self, id: LayerGroupId) -> &mut LayerGroup {
        return &mut self.groups[id as usize];
    }
    pub fn add_layer(&mut self, id: LayerGroupId, layer: Layer) {
        self.layer_group_mut(id).add_layer(layer);
    }
    pub fn has_any_active_layers(&self) -> bool {
        return self.groups.iter().any(|group| group.has_active_layers());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::MemoryTileProvider;

    #[test]
    fn layer_settings() {
        let settings = LayerRenderSettings {
            gamma: 2.0,
            multiplier: 3.0,
            offset: 1.0,
            blend_mode: LayerBlendMode::Normal,
        };
        assert_eq!(settings.perform_layer_settings(2.0), 13.0);
        assert_eq!(settings.perform_layer_settings(-2.0), -11.0);
        assert_eq!(LayerRenderSettings::default().perform_layer_settings(-7.5), -7.5);
    }
    #[test]
    fn sample_position_skips_padding() {
        let provider = Arc::new(MemoryTileProvider::new());
        let layer = Layer::new("height", provider.clone());
        let transform = TileUvTransform::default();
        let uv = layer.tile_uv_to_texture_sample_position(
            &transform,
            DVec2::new(0.25, 0.5),
            UVec2::new(8, 8),
        );
        assert_eq!(uv, DVec2::new(0.25, 0.5));
        let padded = Layer::new("padded", provider).with_padding(2);
        let uv = padded.tile_uv_to_texture_sample_position(&transform, DVec2::ZERO, UVec2::new(8, 8));
        assert_eq!(uv, DVec2::splat(0.25));
        let uv = padded.tile_uv_to_texture_sample_position(&transform, DVec2::ONE, UVec2::new(8, 8));
        assert_eq!(uv, DVec2::splat(0.75));
    }
    #[test]
    fn active_layers_in_order() {
        let mut manager = LayerManager::new();
        let provider = Arc::new(MemoryTileProvider::new());
        manager.add_layer(LayerGroupId::HeightLayers, Layer::new("a", provider.clone()));
        manager.add_layer(LayerGroupId::HeightLayers, Layer::new("b", provider.clone()));
        manager.add_layer(LayerGroupId::HeightLayers, Layer::new("c", provider));
        manager
            .layer_group_mut(LayerGroupId::HeightLayers)
            .layer_mut("b")
            .unwrap()
            .enabled = false;
        let names: Vec<&str> = manager
            .layer_group(LayerGroupId::HeightLayers)
            .active_layers()
            .map(|layer| layer.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(!manager.layer_group(LayerGroupId::ColorLayers).has_active_layers());
        assert!(manager.has_any_active_layers());
    }
}
