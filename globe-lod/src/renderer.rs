use bevy::math::{DVec4, Vec4};
use bevy::prelude::Resource;
use globe_scene::TileIndex;

use crate::chunk::Chunk;
use crate::labels::LabelPlacement;
use crate::render_data::RenderData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugBoxKind {
    /// Bounding polyhedron in clip space.
    Bounds,
    /// Screen-space box in normalized device coordinates.
    Aabb,
}

/// Draws what the globe selected. The globe never touches the GPU itself.
pub trait GlobeRenderer {
    fn render_chunk(&mut self, chunk: &Chunk, data: &RenderData);
    fn update(&mut self) {}
    fn recompile_shaders(&mut self) {}
    fn render_debug_box(&mut self, _corners: &[DVec4; 8], _color: Vec4, _kind: DebugBoxKind) {}
    fn render_label(&mut self, _label: &LabelPlacement) {}
}

/// Keeps what one frame asked for.
#[derive(Resource, Debug, Default)]
pub struct RecordingRenderer {
    pub chunks: Vec<TileIndex>,
    pub labels: Vec<LabelPlacement>,
    pub debug_boxes: Vec<(DebugBoxKind, Vec4)>,
    pub updates: usize,
    pub shader_recompilations: usize,
}
impl RecordingRenderer {
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.labels.clear();
        self.debug_boxes.clear();
    }
}
impl GlobeRenderer for RecordingRenderer {
    fn render_chunk(&mut self, chunk: &Chunk, _data: &RenderData) {
        self.chunks.push(chunk.tile_index());
    }
    fn update(&mut self) {
        self.updates += 1;
    }
    fn recompile_shaders(&mut self) {
        self.shader_recompilations += 1;
    }
    fn render_debug_box(&mut self, _corners: &[DVec4; 8], color: Vec4, kind: DebugBoxKind) {
        self.debug_boxes.push((kind, color));
    }
    fn render_label(&mut self, label: &LabelPlacement) {
        self.labels.push(label.clone());
    }
}
