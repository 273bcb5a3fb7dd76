use bevy::log::{debug, error, info};
use bevy::math::{DVec2, DVec3, DVec4, UVec2, Vec4};
use bevy::prelude::Resource;
use globe_scene::math::negative_pi_to_pi;
use globe_scene::{Geodetic2, TileIndex};
use instant::Instant;

use crate::chunk::{
    AvailableTileDataEvaluator, Chunk, ChunkCuller, ChunkLevelEvaluator, ChunkNode, ChunkSelector,
    DistanceEvaluator, FrustumCuller, HorizonCuller, ProjectedAreaEvaluator, UNKNOWN_DESIRED_LEVEL,
};
use crate::config::{DebugProperties, GlobeConfig};
use crate::context::GlobeContext;
use crate::error::Result;
use crate::labels::Labels;
use crate::layer::{LayerBlendMode, LayerGroupId, LayerManager};
use crate::render_data::RenderData;
use crate::renderer::{DebugBoxKind, GlobeRenderer};
use crate::stats::RenderStats;
use crate::tile::{TileStatus, TileTexture};

/// Samples at or below this are treated as missing, as the surface shader does.
pub const MIN_VALID_HEIGHT_SAMPLE: f32 = -100000.0;

/// Cullers and evaluators the tree update asks.
struct Strategies {
    horizon_culler: Box<dyn ChunkCuller>,
    frustum_culler: Box<dyn ChunkCuller>,
    projected_area_evaluator: Box<dyn ChunkLevelEvaluator>,
    distance_evaluator: Box<dyn ChunkLevelEvaluator>,
    available_tile_data_evaluator: Box<dyn ChunkLevelEvaluator>,
}
impl Default for Strategies {
    fn default() -> Self {
        Self {
            horizon_culler: Box::new(HorizonCuller),
            frustum_culler: Box::new(FrustumCuller::default()),
            projected_area_evaluator: Box::new(ProjectedAreaEvaluator),
            distance_evaluator: Box::new(DistanceEvaluator),
            available_tile_data_evaluator: Box::new(AvailableTileDataEvaluator),
        }
    }
}

struct GlobeSelector<'a> {
    context: &'a GlobeContext,
    strategies: &'a Strategies,
}
impl<'a> ChunkSelector for GlobeSelector<'a> {
    fn refresh(&self, chunk: &mut Chunk) {
        chunk.update_bounds(self.context);
    }
    fn is_cullable(&self, chunk: &Chunk, data: &RenderData) -> bool {
        let debug = &self.context.debug;
        if debug.perform_horizon_culling
            && self
                .strategies
                .horizon_culler
                .is_cullable(chunk, data, self.context)
        {
            return true;
        }
        return debug.perform_frustum_culling
            && self
                .strategies
                .frustum_culler
                .is_cullable(chunk, data, self.context);
    }
    fn desired_level(&self, chunk: &Chunk, data: &RenderData) -> i32 {
        let context = self.context;
        let strategies = self.strategies;
        let mut level = if context.debug.level_by_projected_area_else_distance {
            strategies
                .projected_area_evaluator
                .desired_level(chunk, data, context)
        } else {
            strategies.distance_evaluator.desired_level(chunk, data, context)
        };
        if context.debug.limit_level_by_available_data {
            let available = strategies
                .available_tile_data_evaluator
                .desired_level(chunk, data, context);
            if available != UNKNOWN_DESIRED_LEVEL {
                level = level.min(available);
            }
        }
        return level
            .max(context.min_split_depth as i32)
            .min(context.max_split_depth as i32);
    }
    fn max_split_depth(&self) -> u32 {
        return self.context.max_split_depth;
    }
}

/// A globe drawn as two quadtrees of chunks, west and east of the prime meridian.
#[derive(Resource)]
pub struct ChunkedLodGlobe {
    identifier: String,
    segments_per_patch: u32,
    context: GlobeContext,
    left_root: ChunkNode,
    right_root: ChunkNode,
    strategies: Strategies,
    labels: Option<Labels>,
    bounding_sphere_radius: f64,
    shaders_need_recompilation: bool,
    last_stats: RenderStats,
}
impl ChunkedLodGlobe {
    pub fn new(config: &GlobeConfig, layer_manager: LayerManager) -> Result<Self> {
        config.validate()?;
        let context = GlobeContext::new(config, layer_manager);
        let labels = match &config.labels {
            Some(labels_config) if labels_config.enabled => {
                match Labels::load(labels_config.clone(), &config.identifier, &context.ellipsoid) {
                    Ok(labels) => {
                        info!(
                            "Loaded {} labels for '{}'",
                            labels.entries().len(),
                            config.identifier
                        );
                        Some(labels)
                    }
                    Err(e) => {
                        error!("Failed to load labels for '{}': {}", config.identifier, e);
                        return Err(e);
                    }
                }
            }
            _ => None,
        };
        let bounding_sphere_radius = context.ellipsoid.maximum_radius;
        info!(
            "Created chunked LOD globe '{}' with split depth {}..={}",
            config.identifier, context.min_split_depth, context.max_split_depth
        );
        return Ok(Self {
            identifier: config.identifier.clone(),
            segments_per_patch: config.segments_per_patch,
            context,
            left_root: ChunkNode::new(TileIndex::WEST_ROOT),
            right_root: ChunkNode::new(TileIndex::EAST_ROOT),
            strategies: Strategies::default(),
            labels,
            bounding_sphere_radius,
            shaders_need_recompilation: true,
            last_stats: RenderStats::default(),
        });
    }
    pub fn identifier(&self) -> &str {
        return &self.identifier;
    }
    pub fn segments_per_patch(&self) -> u32 {
        return self.segments_per_patch;
    }
    pub fn context(&self) -> &GlobeContext {
        return &self.context;
    }
    pub fn layer_manager_mut(&mut self) -> &mut LayerManager {
        return &mut self.context.layer_manager;
    }
    pub fn debug_properties(&self) -> &DebugProperties {
        return &self.context.debug;
    }
    pub fn debug_properties_mut(&mut self) -> &mut DebugProperties {
        return &mut self.context.debug;
    }
    pub fn labels(&self) -> Option<&Labels> {
        return self.labels.as_ref();
    }
    pub fn labels_mut(&mut self) -> Option<&mut Labels> {
        return self.labels.as_mut();
    }
    pub fn set_labels(&mut self, labels: Option<Labels>) {
        self.labels = labels;
    }
    pub fn left_root(&self) -> &ChunkNode {
        return &self.left_root;
    }
    pub fn right_root(&self) -> &ChunkNode {
        return &self.right_root;
    }
    pub fn bounding_sphere_radius(&self) -> f64 {
        return self.bounding_sphere_radius;
    }
    pub fn last_stats(&self) -> &RenderStats {
        return &self.last_stats;
    }
    /// Shaders are rebuilt on the next `update`.
    pub fn notify_shader_recompilation(&mut self) {
        self.shaders_need_recompilation = true;
    }

    pub fn update(&mut self, data: &RenderData, renderer: &mut dyn GlobeRenderer) {
        let model = data.model_transform;
        let scale = model
            .x_axis
            .truncate()
            .length()
            .max(model.y_axis.truncate().length())
            .max(model.z_axis.truncate().length());
        self.bounding_sphere_radius = self.context.ellipsoid.maximum_radius * scale;
        if self.shaders_need_recompilation {
            renderer.recompile_shaders();
            self.shaders_need_recompilation = false;
        }
        renderer.update();
    }

    pub fn render(&mut self, data: &RenderData, renderer: &mut dyn GlobeRenderer) -> RenderStats {
        let start = Instant::now();
        let selector = GlobeSelector {
            context: &self.context,
            strategies: &self.strategies,
        };
        self.left_root.update_chunk_tree(data, &selector);
        self.right_root.update_chunk_tree(data, &selector);

        let mut stats = RenderStats::default();
        let debug = self.context.debug.clone();
        for root in [&self.left_root, &self.right_root] {
            root.breadth_first(|node| {
                stats.chunk_nodes += 1;
                if !node.is_leaf() {
                    return;
                }
                stats.leaf_chunk_nodes += 1;
                let chunk = node.chunk();
                if !chunk.is_visible() {
                    stats.culled_chunks += 1;
                    return;
                }
                renderer.render_chunk(chunk, data);
                stats.rendered_chunks += 1;
                stats.max_rendered_level = stats.max_rendered_level.max(chunk.level());
                if debug.show_chunk_bounds || debug.show_chunk_aabb {
                    render_debug_boxes(chunk, data, &debug, &mut *renderer);
                }
            });
        }

        if let Some(labels) = self.labels.as_ref() {
            let (placements, culled) = labels.placements(data, &self.context.ellipsoid);
            for placement in placements.iter() {
                renderer.render_label(placement);
            }
            stats.rendered_labels = placements.len();
            stats.culled_labels = culled;
        }

        stats.render_time = start.elapsed();
        debug!("{}: {}", self.identifier, stats);
        self.last_stats = stats;
        return stats;
    }

    /// Leaf chunk node holding `point`, from the root of its hemisphere.
    pub fn find_chunk_node(&self, point: Geodetic2) -> &ChunkNode {
        let point = Geodetic2::new(point.lat, negative_pi_to_pi(point.lon));
        if point.lon < 0.0 {
            return self.left_root.find(point);
        }
        return self.right_root.find(point);
    }
    pub fn desired_level(&self, chunk: &Chunk, data: &RenderData) -> i32 {
        return self.selector().desired_level(chunk, data);
    }
    pub fn is_cullable(&self, chunk: &Chunk, data: &RenderData) -> bool {
        return self.selector().is_cullable(chunk, data);
    }
    fn selector(&self) -> GlobeSelector<'_> {
        return GlobeSelector {
            context: &self.context,
            strategies: &self.strategies,
        };
    }

    /// Terrain height at the model-space `position`, sampled from the active height
    /// layers of the chunk rendered there. Zero where no layer has data.
    pub fn get_height(&self, position: DVec3) -> f32 {
        let geodetic = self.context.ellipsoid.cartesian_to_geodetic2(position);
        let node = self.find_chunk_node(geodetic);
        let chunk = node.chunk();
        let tile_index = chunk.tile_index();
        let patch_uv = chunk.surface_patch().patch_uv(geodetic);

        let mut height = 0.0;
        let height_layers = self
            .context
            .layer_manager
            .layer_group(LayerGroupId::HeightLayers);
        for layer in height_layers.active_layers() {
            let provider = layer.tile_provider();
            let chunk_tile = provider.chunk_tile(&tile_index);
            if chunk_tile.tile.status != TileStatus::Ok {
                continue;
            }
            let Some(texture) = chunk_tile.tile.texture.as_deref() else {
                continue;
            };
            let sample_uv = layer.tile_uv_to_texture_sample_position(
                &chunk_tile.uv_transform,
                patch_uv,
                texture.dimensions(),
            );
            let Some(sample) = sample_bilinear(texture, sample_uv, provider.no_data_value_as_float())
            else {
                continue;
            };
            let value = layer
                .render_settings
                .perform_layer_settings(provider.depth_transform().apply(sample));
            match layer.render_settings.blend_mode {
                LayerBlendMode::Normal => height = value,
                LayerBlendMode::Add => height += value,
            }
        }
        return height;
    }
}

fn render_debug_boxes(
    chunk: &Chunk,
    data: &RenderData,
    debug: &DebugProperties,
    renderer: &mut dyn GlobeRenderer,
) {
    let bits = 1 + chunk.level() % 6;
    let color = Vec4::new(
        (bits & 1) as f32,
        ((bits >> 1) & 1) as f32,
        ((bits >> 2) & 1) as f32,
        0.3,
    );
    if debug.show_chunk_bounds {
        let mvp = data.model_view_projection();
        let corners = *chunk.bounding_polyhedron_corners();
        let clip_corners = corners.map(|corner| mvp * corner);
        renderer.render_debug_box(&clip_corners, color, DebugBoxKind::Bounds);
    }
    if debug.show_chunk_aabb {
        if let Some(bounds) = FrustumCuller::ndc_bounds(chunk, data) {
            let (min, max) = (bounds.minimum, bounds.maximum);
            let mut corners = [DVec4::ZERO; 8];
            for (i, corner) in corners.iter_mut().enumerate() {
                *corner = DVec4::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                    1.0,
                );
            }
            renderer.render_debug_box(&corners, color, DebugBoxKind::Aabb);
        }
    }
}

/// Bilinear sample with texel centres at `(i + 0.5) / size`. `None` when one of the
/// four texels is NaN or holds no data.
pub fn sample_bilinear(texture: &TileTexture, uv: DVec2, no_data_value: f32) -> Option<f32> {
    let dimensions = texture.dimensions();
    if dimensions.x == 0 || dimensions.y == 0 {
        return None;
    }
    let last = (dimensions - UVec2::ONE).as_dvec2();
    let position = uv * dimensions.as_dvec2() - DVec2::splat(0.5);
    let base = position.floor().clamp(DVec2::ZERO, last);
    let fraction = (position - base).clamp(DVec2::ZERO, DVec2::ONE);

    let x0 = base.x as u32;
    let y0 = base.y as u32;
    let x1 = (x0 + 1).min(dimensions.x - 1);
    let y1 = (y0 + 1).min(dimensions.y - 1);
    let h00 = texture.texel_as_float(UVec2::new(x0, y0));
    let h10 = texture.texel_as_float(UVec2::new(x1, y0));
    let h01 = texture.texel_as_float(UVec2::new(x0, y1));
    let h11 = texture.texel_as_float(UVec2::new(x1, y1));
    let valid = |h: f32| h > MIN_VALID_HEIGHT_SAMPLE && h != no_data_value;
    if ![h00, h10, h01, h11].into_iter().all(valid) {
        return None;
    }
    let (fx, fy) = (fraction.x, fraction.y);
    let south = h00 as f64 * (1.0 - fx) + h10 as f64 * fx;
    let north = h01 as f64 * (1.0 - fx) + h11 as f64 * fx;
    return Some((south * (1.0 - fy) + north * fy) as f32);
}
