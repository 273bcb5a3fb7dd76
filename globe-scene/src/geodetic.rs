use std::ops::{Add, Div, Mul, Sub};

use bevy::math::DVec2;

/// Latitude and longitude in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geodetic2 {
    pub lat: f64,
    pub lon: f64,
}

impl Geodetic2 {
    pub const ZERO: Geodetic2 = Geodetic2 { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.to_radians(),
            lon: lon.to_radians(),
        }
    }
    pub fn to_degrees(&self) -> DVec2 {
        DVec2::new(self.lat.to_degrees(), self.lon.to_degrees())
    }
    pub fn equals_epsilon(&self, other: &Geodetic2, epsilon: f64) -> bool {
        return (self.lat - other.lat).abs() <= epsilon && (self.lon - other.lon).abs() <= epsilon;
    }
}

impl Add for Geodetic2 {
    type Output = Geodetic2;
    fn add(self, rhs: Self) -> Self::Output {
        Geodetic2::new(self.lat + rhs.lat, self.lon + rhs.lon)
    }
}
impl Sub for Geodetic2 {
    type Output = Geodetic2;
    fn sub(self, rhs: Self) -> Self::Output {
        Geodetic2::new(self.lat - rhs.lat, self.lon - rhs.lon)
    }
}
impl Mul<f64> for Geodetic2 {
    type Output = Geodetic2;
    fn mul(self, rhs: f64) -> Self::Output {
        Geodetic2::new(self.lat * rhs, self.lon * rhs)
    }
}
impl Div<f64> for Geodetic2 {
    type Output = Geodetic2;
    fn div(self, rhs: f64) -> Self::Output {
        Geodetic2::new(self.lat / rhs, self.lon / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geodetic3 {
    pub geodetic2: Geodetic2,
    pub height: f64,
}
impl Geodetic3 {
    pub fn new(geodetic2: Geodetic2, height: f64) -> Self {
        Self { geodetic2, height }
    }
}
impl From<Geodetic2> for Geodetic3 {
    fn from(geodetic2: Geodetic2) -> Self {
        Geodetic3::new(geodetic2, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::math::EPSILON14;

    #[test]
    fn ops() {
        let a = Geodetic2::new(0.5, 1.0);
        let b = Geodetic2::new(0.25, -1.0);
        assert_eq!(a + b, Geodetic2::new(0.75, 0.0));
        assert_eq!(a - b, Geodetic2::new(0.25, 2.0));
        assert_eq!(a * 2.0, Geodetic2::new(1.0, 2.0));
        assert_eq!(a / 2.0, Geodetic2::new(0.25, 0.5));
    }
    #[test]
    fn degrees() {
        let p = Geodetic2::from_degrees(90.0, -180.0);
        assert!(p.equals_epsilon(&Geodetic2::new(PI / 2.0, -PI), EPSILON14));
        let d = p.to_degrees();
        assert!((d.x - 90.0).abs() < 1e-12);
        assert!((d.y + 180.0).abs() < 1e-12);
    }
}
