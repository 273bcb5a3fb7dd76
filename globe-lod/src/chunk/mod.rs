use bevy::math::{DVec3, DVec4};
use globe_scene::{Geodetic2, Geodetic3, GeodeticPatch, Quad, TileIndex};

use crate::context::GlobeContext;
use crate::layer::LayerGroupId;
use crate::tile::TileStatus;

mod chunk_node;
mod culler;
mod evaluator;
pub use chunk_node::*;
pub use culler::*;
pub use evaluator::*;

/// Height assumed for texels without data.
pub const DEFAULT_HEIGHT: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingHeights {
    pub min: f32,
    pub max: f32,
    pub available: bool,
}

/// One quadtree patch of the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    tile_index: TileIndex,
    surface_patch: GeodeticPatch,
    is_visible: bool,
    bounding_heights: BoundingHeights,
    corners: [DVec4; 8],
}
impl Chunk {
    pub fn new(tile_index: TileIndex) -> Self {
        Self {
            tile_index,
            surface_patch: GeodeticPatch::from(tile_index),
            is_visible: true,
            bounding_heights: BoundingHeights::default(),
            corners: [DVec4::ZERO; 8],
        }
    }
    pub fn tile_index(&self) -> TileIndex {
        return self.tile_index;
    }
    pub fn surface_patch(&self) -> &GeodeticPatch {
        return &self.surface_patch;
    }
    pub fn level(&self) -> u32 {
        return self.tile_index.level;
    }
    pub fn is_visible(&self) -> bool {
        return self.is_visible;
    }
    pub fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
    }
    pub fn bounding_heights(&self) -> BoundingHeights {
        return self.bounding_heights;
    }
    /// Model-space corners: 0..4 at the minimum height, 4..8 at the maximum, both in
    /// `Quad` order.
    pub fn bounding_polyhedron_corners(&self) -> &[DVec4; 8] {
        return &self.corners;
    }
    /// Streamed height tiles change the bounds, so this runs on every visit.
    pub fn update_bounds(&mut self, context: &GlobeContext) {
        self.bounding_heights = compute_bounding_heights(&self.tile_index, context);
        self.corners = compute_bounding_polyhedron_corners(
            &self.surface_patch,
            &self.bounding_heights,
            context,
        );
    }
}

fn compute_bounding_heights(tile_index: &TileIndex, context: &GlobeContext) -> BoundingHeights {
    let mut heights = BoundingHeights::default();
    let height_layers = context
        .layer_manager
        .layer_group(LayerGroupId::HeightLayers);
    let mut last_had_missing_data = true;
    for layer in height_layers.active_layers() {
        let provider = layer.tile_provider();
        let chunk_tile = provider.chunk_tile(tile_index);
        if chunk_tile.tile.status == TileStatus::Ok {
            if let Some(meta_data) = chunk_tile.tile.meta_data {
                let depth_transform = provider.depth_transform();
                let settings = &layer.render_settings;
                let a = settings.perform_layer_settings(depth_transform.apply(meta_data.min_value));
                let b = settings.perform_layer_settings(depth_transform.apply(meta_data.max_value));
                // a negative depth scale swaps the ends
                let (min_value, max_value) = (a.min(b), a.max(b));
                if !heights.available {
                    if meta_data.has_missing_data {
                        heights.min = DEFAULT_HEIGHT.min(min_value);
                        heights.max = DEFAULT_HEIGHT.max(max_value);
                    } else {
                        heights.min = min_value;
                        heights.max = max_value;
                    }
                    heights.available = true;
                } else {
                    heights.min = heights.min.min(min_value);
                    heights.max = heights.max.max(max_value);
                }
                last_had_missing_data = meta_data.has_missing_data;
            }
        }
        if !last_had_missing_data {
            break;
        }
    }
    return heights;
}

fn compute_bounding_polyhedron_corners(
    patch: &GeodeticPatch,
    heights: &BoundingHeights,
    context: &GlobeContext,
) -> [DVec4; 8] {
    let ellipsoid = &context.ellipsoid;
    let patch_center_radius = ellipsoid.maximum_radius;
    let max_center_radius = patch_center_radius + heights.max as f64;
    let half_size = patch.half_size();

    // the top corners must reach above the curved patch centre
    let scale_to_cover_center = 1.0 / (half_size.lat.cos() * half_size.lon.cos());
    let max_corner_height = max_center_radius * scale_to_cover_center - patch_center_radius;
    let min_corner_height = heights.min as f64;

    let chunk_is_northern = patch.is_northern();
    let lat_close_to_equator = patch.edge_latitude_nearest_equator();
    let p1 = ellipsoid.cartesian_position(Geodetic3::new(
        Geodetic2::new(lat_close_to_equator, patch.min_lon()),
        max_corner_height,
    ));
    let p2 = ellipsoid.cartesian_position(Geodetic3::new(
        Geodetic2::new(lat_close_to_equator, patch.max_lon()),
        max_corner_height,
    ));
    let mid: DVec3 = (p1 + p2) * 0.5;
    let lat_diff = lat_close_to_equator - ellipsoid.cartesian_to_geodetic2(mid).lat;

    let mut corners = [DVec4::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let quad = Quad::from_index(i);
        let height = if i < 4 {
            min_corner_height
        } else {
            max_corner_height
        };
        let mut geodetic = Geodetic3::new(patch.corner(quad), height);
        if chunk_is_northern != quad.is_north() {
            geodetic.geodetic2.lat += lat_diff;
        }
        *corner = ellipsoid.cartesian_position(geodetic).extend(1.0);
    }
    return corners;
}
