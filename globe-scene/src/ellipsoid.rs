use bevy::math::DVec3;

use crate::geodetic::{Geodetic2, Geodetic3};
use crate::math::{Cartesian3, EPSILON14};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub radii: DVec3,
    pub radii_squared: DVec3,
    pub one_over_radii: DVec3,
    pub one_over_radii_squared: DVec3,
    pub minimum_radius: f64,
    pub maximum_radius: f64,
}
impl Default for Ellipsoid {
    fn default() -> Self {
        return Ellipsoid::unit_sphere();
    }
}
impl Ellipsoid {
    pub fn from_vec3(radii: DVec3) -> Self {
        return Ellipsoid::new(radii.x, radii.y, radii.z);
    }
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let radii = DVec3::new(x, y, z);
        let radii_squared = DVec3::new(x * x, y * y, z * z);
        let one_over_radii = DVec3::new(1.0 / x, 1.0 / y, 1.0 / z);
        let one_over_radii_squared = DVec3::new(1.0 / (x * x), 1.0 / (y * y), 1.0 / (z * z));
        Ellipsoid {
            radii,
            radii_squared,
            one_over_radii,
            one_over_radii_squared,
            minimum_radius: radii.minimum_component(),
            maximum_radius: radii.maximum_component(),
        }
    }
    pub fn wgs84() -> Self {
        return Ellipsoid::new(6378137.0, 6378137.0, 6356752.3142451793);
    }
    pub fn unit_sphere() -> Self {
        return Ellipsoid::new(1.0, 1.0, 1.0);
    }
    pub fn sphere(radius: f64) -> Self {
        return Ellipsoid::new(radius, radius, radius);
    }
    pub fn average_radius(&self) -> f64 {
        return (self.radii.x + self.radii.y + self.radii.z) / 3.0;
    }
    pub fn geodetic_surface_normal(&self, geodetic2: Geodetic2) -> DVec3 {
        let cos_lat = geodetic2.lat.cos();
        return DVec3::new(
            cos_lat * geodetic2.lon.cos(),
            cos_lat * geodetic2.lon.sin(),
            geodetic2.lat.sin(),
        );
    }
    pub fn geodetic_surface_normal_for_geocentrically_projected_point(&self, p: DVec3) -> DVec3 {
        let normal = p.multiply_components(&self.one_over_radii_squared);
        if normal.magnitude_squared() < EPSILON14 {
            return DVec3::Z;
        }
        return normal.normalize();
    }
    pub fn cartesian_surface_position(&self, geodetic2: Geodetic2) -> DVec3 {
        let normal = self.geodetic_surface_normal(geodetic2);
        let k = self.radii_squared.multiply_components(&normal);
        let gamma = k.dot(normal).sqrt();
        return k / gamma;
    }
    pub fn cartesian_position(&self, geodetic3: Geodetic3) -> DVec3 {
        let normal = self.geodetic_surface_normal(geodetic3.geodetic2);
        return self.cartesian_surface_position(geodetic3.geodetic2) + normal * geodetic3.height;
    }
    /// Longitude is returned in `[-PI, PI]`.
    pub fn cartesian_to_geodetic2(&self, p: DVec3) -> Geodetic2 {
        let normal = self.geodetic_surface_normal_for_geocentrically_projected_point(p);
        return Geodetic2::new(normal.z.clamp(-1.0, 1.0).asin(), normal.y.atan2(normal.x));
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::math::{EPSILON10, EPSILON7};

    #[test]
    fn radii() {
        let e = Ellipsoid::wgs84();
        assert_eq!(e.minimum_radius, 6356752.3142451793);
        assert_eq!(e.maximum_radius, 6378137.0);
        assert_eq!(Ellipsoid::sphere(5.0).average_radius(), 5.0);
    }
    #[test]
    fn surface_position_on_sphere() {
        let e = Ellipsoid::sphere(10.0);
        let p = e.cartesian_surface_position(Geodetic2::new(0.0, PI / 2.0));
        assert!(p.equals_epsilon(DVec3::new(0.0, 10.0, 0.0), Some(EPSILON10), None));
        let q = e.cartesian_position(Geodetic3::new(Geodetic2::new(PI / 2.0, 0.0), 5.0));
        assert!(q.equals_epsilon(DVec3::new(0.0, 0.0, 15.0), Some(EPSILON10), None));
    }
    #[test]
    fn cartesian_to_geodetic_round_trip() {
        let e = Ellipsoid::wgs84();
        let g = Geodetic2::new(0.3, -2.1);
        let p = e.cartesian_surface_position(g);
        let back = e.cartesian_to_geodetic2(p);
        assert!((back.lon - g.lon).abs() < EPSILON10);
        assert!((back.lat - g.lat).abs() < EPSILON7);
        let s = Ellipsoid::sphere(3.0);
        let back = s.cartesian_to_geodetic2(s.cartesian_surface_position(g));
        assert!(back.equals_epsilon(&g, EPSILON10));
    }
}
