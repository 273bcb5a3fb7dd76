use globe_scene::{Geodetic2, Geodetic3};

use super::Chunk;
use crate::context::GlobeContext;
use crate::layer::LayerGroupId;
use crate::render_data::RenderData;
use crate::tile::TileStatus;

/// Returned when an evaluator has no opinion on the level.
pub const UNKNOWN_DESIRED_LEVEL: i32 = -1;

pub trait ChunkLevelEvaluator: Send + Sync {
    fn desired_level(&self, chunk: &Chunk, data: &RenderData, context: &GlobeContext) -> i32;
}

/// Level from the area the patch covers on the unit sphere around the camera.
///
/// The area is estimated from the triangle spanned by the patch centre and the
/// midpoints of the two edges nearest the camera, which is an eighth of the patch.
/// Working near the camera keeps strongly curved patches from being underestimated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectedAreaEvaluator;

impl ChunkLevelEvaluator for ProjectedAreaEvaluator {
    fn desired_level(&self, chunk: &Chunk, data: &RenderData, context: &GlobeContext) -> i32 {
        let ellipsoid = &context.ellipsoid;
        let camera_position = data.camera_position_model_space();
        let camera_geodetic = ellipsoid.cartesian_to_geodetic2(camera_position);

        let patch = chunk.surface_patch();
        let center = patch.center();
        let closest_corner = patch.closest_corner(camera_geodetic);
        let min_height = chunk.bounding_heights().min as f64;

        let c = Geodetic3::new(center, min_height);
        let c1 = Geodetic3::new(Geodetic2::new(center.lat, closest_corner.lon), min_height);
        let c2 = Geodetic3::new(Geodetic2::new(closest_corner.lat, center.lon), min_height);

        let a = (ellipsoid.cartesian_position(c) - camera_position).normalize_or_zero();
        let b = (ellipsoid.cartesian_position(c1) - camera_position).normalize_or_zero();
        let c = (ellipsoid.cartesian_position(c2) - camera_position).normalize_or_zero();

        let area_abc = 0.5 * (c - a).cross(b - a).length();
        let projected_chunk_area = 8.0 * area_abc;
        let scaled_area = context.general.lod_scale_factor * projected_chunk_area;
        return chunk.level() as i32 + (scaled_area - 1.0).round() as i32;
    }
}

/// Level from the distance between the camera and the closest point of the patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEvaluator;

impl ChunkLevelEvaluator for DistanceEvaluator {
    fn desired_level(&self, chunk: &Chunk, data: &RenderData, context: &GlobeContext) -> i32 {
        let ellipsoid = &context.ellipsoid;
        let camera_position = data.camera_position_model_space();
        let point_on_patch = chunk
            .surface_patch()
            .closest_point(ellipsoid.cartesian_to_geodetic2(camera_position));
        let patch_position = ellipsoid.cartesian_position(Geodetic3::new(
            point_on_patch,
            chunk.bounding_heights().min as f64,
        ));
        let distance = (patch_position - camera_position).length();
        let scale_factor = context.general.lod_scale_factor * ellipsoid.minimum_radius;
        // saturating cast, a zero distance asks for the deepest level
        return (scale_factor / distance).log2().ceil() as i32;
    }
}

/// Caps the level where no active layer has data for the chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailableTileDataEvaluator;

impl ChunkLevelEvaluator for AvailableTileDataEvaluator {
    fn desired_level(&self, chunk: &Chunk, _data: &RenderData, context: &GlobeContext) -> i32 {
        let layer_manager = &context.layer_manager;
        let index = chunk.tile_index();
        let mut any_active = false;
        for id in LayerGroupId::ALL {
            for layer in layer_manager.layer_group(id).active_layers() {
                any_active = true;
                if layer.tile_provider().tile_status(&index) == TileStatus::Ok {
                    return UNKNOWN_DESIRED_LEVEL;
                }
            }
        }
        if !any_active {
            return UNKNOWN_DESIRED_LEVEL;
        }
        let mut ancestor = index.parent();
        while let Some(parent) = ancestor {
            for id in LayerGroupId::ALL {
                let ready = layer_manager
                    .layer_group(id)
                    .active_layers()
                    .any(|layer| layer.tile_provider().tile_status(&parent) == TileStatus::Ok);
                if ready {
                    return parent.level as i32;
                }
            }
            ancestor = parent.parent();
        }
        return index.level as i32 - 1;
    }
}
