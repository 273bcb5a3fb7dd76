use std::f64::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::DVec2;

use crate::geodetic::Geodetic2;
use crate::math::normalize_around;
use crate::tile_index::{Quad, TileIndex};

/// Latitude/longitude rectangle given by its centre and half size, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPatch {
    center: Geodetic2,
    half_size: Geodetic2,
}
impl GeodeticPatch {
    pub fn new(center: Geodetic2, half_size: Geodetic2) -> Self {
        Self { center, half_size }
    }
    pub fn center(&self) -> Geodetic2 {
        return self.center;
    }
    pub fn half_size(&self) -> Geodetic2 {
        return self.half_size;
    }
    pub fn size(&self) -> Geodetic2 {
        return self.half_size * 2.0;
    }
    pub fn min_lat(&self) -> f64 {
        return self.center.lat - self.half_size.lat;
    }
    pub fn max_lat(&self) -> f64 {
        return self.center.lat + self.half_size.lat;
    }
    pub fn min_lon(&self) -> f64 {
        return self.center.lon - self.half_size.lon;
    }
    pub fn max_lon(&self) -> f64 {
        return self.center.lon + self.half_size.lon;
    }
    pub fn is_northern(&self) -> bool {
        return self.center.lat > 0.0;
    }
    pub fn corner(&self, quad: Quad) -> Geodetic2 {
        match quad {
            Quad::NorthWest => Geodetic2::new(self.max_lat(), self.min_lon()),
            Quad::NorthEast => Geodetic2::new(self.max_lat(), self.max_lon()),
            Quad::SouthWest => Geodetic2::new(self.min_lat(), self.min_lon()),
            Quad::SouthEast => Geodetic2::new(self.min_lat(), self.max_lon()),
        }
    }
    pub fn edge_latitude_nearest_equator(&self) -> f64 {
        let sign = if self.is_northern() { -1.0 } else { 1.0 };
        return self.center.lat + self.half_size.lat * sign;
    }
    /// Closed on every edge, so neighbouring patches both claim a shared edge.
    pub fn contains(&self, p: Geodetic2) -> bool {
        let diff = self.center - p;
        return diff.lat.abs() <= self.half_size.lat && diff.lon.abs() <= self.half_size.lon;
    }
    pub fn closest_corner(&self, p: Geodetic2) -> Geodetic2 {
        let center_to_point = p - self.center;
        let lat_diff = normalize_around(center_to_point.lat, 0.0);
        let lon_diff = normalize_around(center_to_point.lon, 0.0);
        let corner_lat = self.center.lat + self.half_size.lat * if lat_diff > 0.0 { 1.0 } else { -1.0 };
        let corner_lon = self.center.lon + self.half_size.lon * if lon_diff > 0.0 { 1.0 } else { -1.0 };
        return Geodetic2::new(corner_lat, corner_lon);
    }
    /// Closest point of the patch in great-circle distance. A plain clamp is wrong
    /// once the point is more than a quarter turn away in longitude, then the
    /// latitude is mirrored over the pole before clamping.
    pub fn closest_point(&self, p: Geodetic2) -> Geodetic2 {
        let point_lat = normalize_around(p.lat, self.center.lat);
        let point_lon = normalize_around(p.lon, self.center.lon);

        let center_to_point_lon = normalize_around(self.center.lon - point_lon, 0.0);
        let lon_distance_to_edge = center_to_point_lon.abs() - self.half_size.lon;

        let clamped_lat = if lon_distance_to_edge > FRAC_PI_2 {
            normalize_around(PI - point_lat, self.center.lat).clamp(self.min_lat(), self.max_lat())
        } else {
            point_lat.clamp(self.min_lat(), self.max_lat())
        };
        let clamped_lon = point_lon.clamp(self.min_lon(), self.max_lon());
        return Geodetic2::new(clamped_lat, clamped_lon);
    }
    /// Normalized coordinates of `p` from the south-west corner, u along longitude.
    pub fn patch_uv(&self, p: Geodetic2) -> DVec2 {
        let south_west = self.corner(Quad::SouthWest);
        let size = self.corner(Quad::NorthEast) - south_west;
        let diff = p - south_west;
        return DVec2::new(diff.lon / size.lon, diff.lat / size.lat);
    }
}
impl From<TileIndex> for GeodeticPatch {
    fn from(index: TileIndex) -> Self {
        let delta = TAU / (1u64 << index.level) as f64;
        let north_west = Geodetic2::new(
            FRAC_PI_2 - delta * index.y as f64,
            -PI + delta * index.x as f64,
        );
        let half_size = Geodetic2::new(delta / 2.0, delta / 2.0);
        let center = Geodetic2::new(
            north_west.lat - half_size.lat,
            north_west.lon + half_size.lon,
        );
        return GeodeticPatch::new(center, half_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON14;

    #[test]
    fn hemisphere_roots() {
        let west = GeodeticPatch::from(TileIndex::WEST_ROOT);
        assert!(west.center().equals_epsilon(&Geodetic2::new(0.0, -FRAC_PI_2), EPSILON14));
        assert!(west.half_size().equals_epsilon(&Geodetic2::new(FRAC_PI_2, FRAC_PI_2), EPSILON14));
        let east = GeodeticPatch::from(TileIndex::EAST_ROOT);
        assert_eq!(east.min_lon(), 0.0);
        assert_eq!(east.max_lon(), PI);
        assert!(west.contains(Geodetic2::new(0.0, 0.0)));
        assert!(east.contains(Geodetic2::new(0.0, 0.0)));
    }
    #[test]
    fn children_partition_parent() {
        let parent_index = TileIndex::new(3, 1, 3);
        let parent = GeodeticPatch::from(parent_index);
        let children = parent_index.children().map(GeodeticPatch::from);
        let mut area = 0.0;
        for child in children.iter() {
            area += child.size().lat * child.size().lon;
            assert!(parent.contains(child.center()));
            assert!(child.min_lat() >= parent.min_lat() - EPSILON14);
            assert!(child.max_lat() <= parent.max_lat() + EPSILON14);
            assert!(child.min_lon() >= parent.min_lon() - EPSILON14);
            assert!(child.max_lon() <= parent.max_lon() + EPSILON14);
        }
        let parent_area = parent.size().lat * parent.size().lon;
        assert!((area - parent_area).abs() < EPSILON14);
        // children of one row share the exact parent centre latitude as an edge
        assert!((children[0].min_lat() - parent.center().lat).abs() < EPSILON14);
        assert!((children[2].max_lat() - parent.center().lat).abs() < EPSILON14);
        assert!((children[0].max_lon() - parent.center().lon).abs() < EPSILON14);
        assert!((children[1].min_lon() - parent.center().lon).abs() < EPSILON14);
    }
    #[test]
    fn corners() {
        let patch = GeodeticPatch::new(Geodetic2::new(0.2, 0.4), Geodetic2::new(0.1, 0.2));
        assert!(patch.corner(Quad::NorthWest).equals_epsilon(&Geodetic2::new(0.3, 0.2), EPSILON14));
        assert!(patch.corner(Quad::SouthEast).equals_epsilon(&Geodetic2::new(0.1, 0.6), EPSILON14));
        assert!((patch.edge_latitude_nearest_equator() - 0.1).abs() < EPSILON14);
    }
    #[test]
    fn closest_corner_and_point() {
        let patch = GeodeticPatch::new(Geodetic2::new(0.0, 0.0), Geodetic2::new(0.1, 0.1));
        let corner = patch.closest_corner(Geodetic2::new(0.5, -0.5));
        assert_eq!(corner, Geodetic2::new(0.1, -0.1));
        let inside = Geodetic2::new(0.05, -0.02);
        assert_eq!(patch.closest_point(inside), inside);
        let outside = patch.closest_point(Geodetic2::new(0.05, 0.5));
        assert!(outside.equals_epsilon(&Geodetic2::new(0.05, 0.1), EPSILON14));
        // a point across the globe clamps to the pole side
        let big = GeodeticPatch::new(Geodetic2::new(0.0, 0.0), Geodetic2::new(PI / 4.0, PI / 4.0));
        let far = big.closest_point(Geodetic2::new(5f64.to_radians(), 170f64.to_radians()));
        assert!((far.lat - PI / 4.0).abs() < EPSILON14);
        assert!((far.lon - PI / 4.0).abs() < EPSILON14);
    }
    #[test]
    fn tile_from_geodetic_contains_point() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let p = Geodetic2::new(rng.gen_range(-FRAC_PI_2..=FRAC_PI_2), rng.gen_range(-PI..PI));
            let level = rng.gen_range(1..20);
            let index = TileIndex::from_geodetic(p, level);
            assert!(index.is_valid());
            let patch = GeodeticPatch::from(index);
            assert!(
                patch.contains(p)
                    || patch.closest_point(p).equals_epsilon(&p, 1e-12),
                "{} does not contain {:?}",
                index,
                p
            );
        }
    }
    #[test]
    fn patch_uv() {
        let patch = GeodeticPatch::new(Geodetic2::new(0.0, 1.0), Geodetic2::new(0.5, 0.5));
        let uv = patch.patch_uv(Geodetic2::new(0.25, 0.75));
        assert!((uv.x - 0.25).abs() < EPSILON14);
        assert!((uv.y - 0.75).abs() < EPSILON14);
    }
}
