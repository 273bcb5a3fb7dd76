//! Flies a camera down onto a procedural terrain and logs what the globe selects.

use std::sync::Arc;

use bevy::log::LogPlugin;
use bevy::math::{DMat4, DVec3};
use bevy::prelude::*;
use globe_lod::layer::{Layer, LayerGroupId, LayerManager};
use globe_lod::tile::{MemoryTileProvider, TileTexture};
use globe_lod::{
    Camera, ChunkedLodGlobe, GlobeConfig, GlobePlugin, GlobeView, LastRenderStats, RecordingRenderer,
    RenderData,
};
use globe_scene::{Ellipsoid, Geodetic2, Geodetic3, GeodeticPatch, TileIndex};

const FRAMES: u32 = 120;
const TERRAIN_LEVELS: u32 = 5;
const TEXTURE_SIZE: u32 = 16;
const TERRAIN_AMPLITUDE: f64 = 4000.0;

fn terrain_height(point: Geodetic2) -> f32 {
    return (TERRAIN_AMPLITUDE * (point.lat * 7.0).sin() * (point.lon * 5.0).cos()) as f32;
}

fn terrain_provider() -> MemoryTileProvider {
    let mut provider = MemoryTileProvider::new().with_max_level(TERRAIN_LEVELS);
    for level in 1..=TERRAIN_LEVELS {
        for x in 0..(1u32 << level) {
            for y in 0..(1u32 << (level - 1)) {
                let index = TileIndex::new(x, y, level);
                let patch = GeodeticPatch::from(index);
                let south_west = Geodetic2::new(patch.min_lat(), patch.min_lon());
                let size = patch.size();
                let mut texels = Vec::with_capacity((TEXTURE_SIZE * TEXTURE_SIZE) as usize);
                for row in 0..TEXTURE_SIZE {
                    for column in 0..TEXTURE_SIZE {
                        let u = (column as f64 + 0.5) / TEXTURE_SIZE as f64;
                        let v = (row as f64 + 0.5) / TEXTURE_SIZE as f64;
                        let point = Geodetic2::new(
                            south_west.lat + v * size.lat,
                            south_west.lon + u * size.lon,
                        );
                        texels.push(terrain_height(point));
                    }
                }
                provider.insert_texture(index, TileTexture::new(TEXTURE_SIZE, TEXTURE_SIZE, texels));
            }
        }
    }
    return provider;
}

fn camera_at(ellipsoid: &Ellipsoid, target: Geodetic2, height: f64) -> RenderData {
    let position = ellipsoid.cartesian_position(Geodetic3::new(target, height));
    let camera = Camera::look_at(
        position,
        DVec3::ZERO,
        DVec3::Z,
        std::f64::consts::FRAC_PI_4,
        16.0 / 9.0,
        1.0,
        1e10,
    );
    return RenderData::new(camera, DMat4::IDENTITY);
}

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let config = match std::env::args().nth(1) {
        Some(path) => match GlobeConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not read globe configuration '{}': {}", path, e);
                return;
            }
        },
        None => GlobeConfig::default(),
    };

    let mut layer_manager = LayerManager::new();
    layer_manager.add_layer(
        LayerGroupId::HeightLayers,
        Layer::new("procedural", Arc::new(terrain_provider())),
    );
    let globe = match ChunkedLodGlobe::new(&config, layer_manager) {
        Ok(globe) => globe,
        Err(e) => {
            error!("Could not create globe '{}': {}", config.identifier, e);
            return;
        }
    };
    let ellipsoid = globe.context().ellipsoid;

    let target = Geodetic2::from_degrees(46.5, 8.0);
    let start_height = 4.0 * ellipsoid.maximum_radius;
    let end_height = 500.0;
    app.add_plugins(GlobePlugin::<RecordingRenderer>::default())
        .insert_resource(globe)
        .insert_resource(RecordingRenderer::default())
        .insert_resource(GlobeView(camera_at(&ellipsoid, target, start_height)));

    for frame in 0..FRAMES {
        let t = frame as f64 / (FRAMES - 1) as f64;
        let height = start_height * (end_height / start_height).powf(t);
        app.world.resource_mut::<GlobeView>().0 = camera_at(&ellipsoid, target, height);
        app.world.resource_mut::<RecordingRenderer>().clear();
        app.update();

        if frame % 10 == 0 || frame == FRAMES - 1 {
            let stats = app.world.resource::<LastRenderStats>().0;
            let globe = app.world.resource::<ChunkedLodGlobe>();
            let terrain = globe.get_height(ellipsoid.cartesian_surface_position(target));
            info!(
                "frame {} height {:.0} m terrain {:.1} m: {}",
                frame, height, terrain, stats
            );
        }
    }
}
