use bevy::math::DVec3;
use globe_scene::math::Cartesian3;
use globe_scene::{AxisAlignedBoundingBox, Geodetic2, Quad};

use super::Chunk;
use crate::context::GlobeContext;
use crate::render_data::RenderData;

pub trait ChunkCuller: Send + Sync {
    fn is_cullable(&self, chunk: &Chunk, data: &RenderData, context: &GlobeContext) -> bool;
}

/// Culls chunks whose bounding polyhedron falls outside the view frustum.
///
/// The corners are taken to normalized device coordinates dividing by `|w|`, so
/// points behind the camera still end up on the wrong side of the near plane.
#[derive(Debug, Clone, Copy)]
pub struct FrustumCuller {
    view_frustum: AxisAlignedBoundingBox,
}
impl Default for FrustumCuller {
    fn default() -> Self {
        Self {
            view_frustum: AxisAlignedBoundingBox::from_corners(
                DVec3::new(-1.0, -1.0, 0.0),
                DVec3::new(1.0, 1.0, 1e35),
            ),
        }
    }
}
impl FrustumCuller {
    pub fn new(view_frustum: AxisAlignedBoundingBox) -> Self {
        Self { view_frustum }
    }
    /// Screen-space bounds of the chunk, `None` if a corner does not project.
    pub fn ndc_bounds(chunk: &Chunk, data: &RenderData) -> Option<AxisAlignedBoundingBox> {
        let mvp = data.model_view_projection();
        let mut bounds: Option<AxisAlignedBoundingBox> = None;
        for corner in chunk.bounding_polyhedron_corners() {
            let clip = mvp * *corner;
            let ndc = clip.truncate() / clip.w.abs();
            if !ndc.is_finite() {
                return None;
            }
            match bounds.as_mut() {
                Some(b) => b.expand(ndc),
                None => bounds = Some(AxisAlignedBoundingBox::from_corners(ndc, ndc)),
            }
        }
        return bounds;
    }
}
impl ChunkCuller for FrustumCuller {
    fn is_cullable(&self, chunk: &Chunk, data: &RenderData, _context: &GlobeContext) -> bool {
        match FrustumCuller::ndc_bounds(chunk, data) {
            Some(bounds) => !self.view_frustum.intersects(&bounds),
            None => false,
        }
    }
}

/// Culls chunks hidden behind the curvature of the globe.
///
/// The globe is treated as a sphere of the minimum radius, and the chunk as its
/// closest surface point inflated by the maximum bounding height.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizonCuller;

impl HorizonCuller {
    pub fn is_point_cullable(
        camera_position: DVec3,
        globe_position: DVec3,
        object_position: DVec3,
        object_bounding_sphere_radius: f64,
        minimum_globe_radius: f64,
    ) -> bool {
        let r2 = minimum_globe_radius * minimum_globe_radius;
        let camera_distance_squared = (camera_position - globe_position).magnitude_squared();
        if camera_distance_squared <= r2 {
            return false;
        }
        let distance_to_horizon = (camera_distance_squared - r2).sqrt();
        let object_distance_to_horizon =
            ((object_position - globe_position).magnitude_squared() - r2).max(0.0).sqrt();
        let minimum_allowed_distance_squared = (distance_to_horizon + object_distance_to_horizon)
            .powi(2)
            + object_bounding_sphere_radius * object_bounding_sphere_radius;
        let distance_to_object_squared = (object_position - camera_position).magnitude_squared();
        return distance_to_object_squared > minimum_allowed_distance_squared;
    }
    /// Point of the meridian `lon` between `min_lat` and `max_lat` nearest to `p` along the
    /// great circle. Past a quarter turn in longitude the nearest latitude moves toward the pole.
    pub fn closest_point_on_meridian(p: Geodetic2, lon: f64, min_lat: f64, max_lat: f64) -> Geodetic2 {
        let lat = p.lat.sin().atan2(p.lat.cos() * (p.lon - lon).cos());
        return Geodetic2::new(lat.clamp(min_lat, max_lat), lon);
    }
}
impl ChunkCuller for HorizonCuller {
    fn is_cullable(&self, chunk: &Chunk, data: &RenderData, context: &GlobeContext) -> bool {
        let ellipsoid = &context.ellipsoid;
        let patch = chunk.surface_patch();
        let max_height = chunk.bounding_heights().max as f64;
        let camera_position = data.camera_position_model_space();

        let camera_geodetic = ellipsoid.cartesian_to_geodetic2(camera_position);
        let closest_patch_point = patch.closest_point(camera_geodetic);
        let mut object_position = ellipsoid.cartesian_surface_position(closest_patch_point);

        // closest in lat/lon is not always closest in space
        let mut candidates = Vec::with_capacity(6);
        for quad in Quad::ALL {
            candidates.push(patch.corner(quad));
        }
        for edge_lon in [patch.min_lon(), patch.max_lon()] {
            candidates.push(HorizonCuller::closest_point_on_meridian(
                camera_geodetic,
                edge_lon,
                patch.min_lat(),
                patch.max_lat(),
            ));
        }
        let mut closest_distance = (camera_position - object_position).magnitude();
        for candidate in candidates {
            let position = ellipsoid.cartesian_surface_position(candidate);
            let distance = (camera_position - position).magnitude();
            if distance < closest_distance {
                closest_distance = distance;
                object_position = position;
            }
        }
        return HorizonCuller::is_point_cullable(
            camera_position,
            DVec3::ZERO,
            object_position,
            max_height,
            ellipsoid.minimum_radius,
        );
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DMat4;
    use globe_scene::{Ellipsoid, Geodetic3, GeodeticPatch, TileIndex};
    use rand::Rng;

    use super::*;
    use crate::render_data::Camera;

    fn context() -> GlobeContext {
        let mut context = GlobeContext::default();
        context.ellipsoid = Ellipsoid::sphere(1000.0);
        return context;
    }
    fn looking_at(position: DVec3, target: DVec3) -> RenderData {
        let camera = Camera::look_at(position, target, DVec3::Z, 1.0, 1.0, 0.1, 1e9);
        return RenderData::new(camera, DMat4::IDENTITY);
    }

    #[test]
    fn horizon_never_culls_chunk_below_camera() {
        let context = context();
        for level in 2..12 {
            let target = Geodetic2::new(0.3, 1.2);
            let index = TileIndex::from_geodetic(target, level);
            let mut chunk = Chunk::new(index);
            chunk.update_bounds(&context);
            let mut height = 0.5;
            while height < 1e8 {
                let position = context.ellipsoid.cartesian_position(Geodetic3::new(target, height));
                let data = looking_at(position, DVec3::ZERO);
                assert!(!HorizonCuller.is_cullable(&chunk, &data, &context));
                height *= 3.0;
            }
        }
    }
    #[test]
    fn horizon_culls_far_side() {
        let context = context();
        let index = TileIndex::from_geodetic(Geodetic2::new(0.0, 0.5), 6);
        let mut chunk = Chunk::new(index);
        chunk.update_bounds(&context);
        let camera = context
            .ellipsoid
            .cartesian_position(Geodetic3::new(Geodetic2::new(0.0, 0.5 - std::f64::consts::PI), 100.0));
        let data = looking_at(camera, DVec3::ZERO);
        assert!(HorizonCuller.is_cullable(&chunk, &data, &context));
    }
    #[test]
    fn meridian_point_moves_toward_pole_past_quarter_turn() {
        let p = Geodetic2::new(-0.7, 1.05);
        let near = HorizonCuller::closest_point_on_meridian(p, 0.8, -1.5, 0.0);
        assert!(near.lat < p.lat && near.lat > -1.5);
        let far = HorizonCuller::closest_point_on_meridian(p, 1.05 - 2.5, -1.5, 0.0);
        assert_eq!(far.lat, -1.5);
        let on = HorizonCuller::closest_point_on_meridian(p, 1.05, -1.5, 0.0);
        assert!((on.lat - p.lat).abs() < 1e-12);
    }
    #[test]
    fn horizon_culled_chunks_have_no_visible_point() {
        let context = context();
        let ellipsoid = &context.ellipsoid;
        let mut rng = rand::thread_rng();
        for _ in 0..3000 {
            let level = rng.gen_range(2..=8);
            let columns = 1u32 << level;
            let index = TileIndex::new(rng.gen_range(0..columns), rng.gen_range(0..columns / 2), level);
            let mut chunk = Chunk::new(index);
            chunk.update_bounds(&context);
            let camera_geodetic = Geodetic2::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
            );
            let height = rng.gen_range(1.0..2000.0);
            let camera = ellipsoid.cartesian_position(Geodetic3::new(camera_geodetic, height));
            let data = looking_at(camera, DVec3::ZERO);
            if !HorizonCuller.is_cullable(&chunk, &data, &context) {
                continue;
            }
            let patch = chunk.surface_patch();
            for i in 0..=20 {
                for j in 0..=20 {
                    let p = Geodetic2::new(
                        patch.min_lat() + patch.size().lat * i as f64 / 20.0,
                        patch.min_lon() + patch.size().lon * j as f64 / 20.0,
                    );
                    let position = ellipsoid.cartesian_surface_position(p);
                    let elevation_sin = ellipsoid
                        .geodetic_surface_normal(p)
                        .dot((camera - position).normalize());
                    assert!(
                        elevation_sin <= 0.005,
                        "culled but visible: {} camera {:?} height {} point {:?}",
                        index,
                        camera_geodetic,
                        height,
                        p
                    );
                }
            }
        }
    }
    #[test]
    fn point_test_camera_inside_globe() {
        assert!(!HorizonCuller::is_point_cullable(
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::ZERO,
            DVec3::new(-1.0, 0.0, 0.0),
            0.0,
            1.0
        ));
    }
    #[test]
    fn frustum_culls_behind_camera() {
        let context = context();
        let target = Geodetic2::new(0.1, 0.1);
        let index = TileIndex::from_geodetic(target, 8);
        let mut chunk = Chunk::new(index);
        chunk.update_bounds(&context);
        let center = GeodeticPatch::from(index).center();
        let above = context.ellipsoid.cartesian_position(Geodetic3::new(center, 50.0));
        let facing = looking_at(above, DVec3::ZERO);
        assert!(!FrustumCuller::default().is_cullable(&chunk, &facing, &context));
        let away = looking_at(above, above * 2.0);
        assert!(FrustumCuller::default().is_cullable(&chunk, &away, &context));
    }
    #[test]
    fn frustum_culls_off_screen() {
        let context = context();
        let index = TileIndex::from_geodetic(Geodetic2::new(0.0, 0.0), 8);
        let mut chunk = Chunk::new(index);
        chunk.update_bounds(&context);
        let position = DVec3::new(1100.0, -50.0, 0.0);
        let sideways = looking_at(position, position + DVec3::new(0.0, 1.0, 0.0));
        assert!(FrustumCuller::default().is_cullable(&chunk, &sideways, &context));
    }
}
