use bevy::math::DVec3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisAlignedBoundingBox {
    pub minimum: DVec3,
    pub maximum: DVec3,
    pub center: DVec3,
}
impl AxisAlignedBoundingBox {
    pub fn from_corners(minimum: DVec3, maximum: DVec3) -> Self {
        Self {
            minimum,
            maximum,
            center: (minimum + maximum) * 0.5,
        }
    }
    pub fn expand(&mut self, p: DVec3) {
        self.minimum = self.minimum.min(p);
        self.maximum = self.maximum.max(p);
        self.center = (self.minimum + self.maximum) * 0.5;
    }
    /// Touching boxes count as intersecting.
    pub fn intersects(&self, other: &AxisAlignedBoundingBox) -> bool {
        return self.minimum.cmple(other.maximum).all() && other.minimum.cmple(self.maximum).all();
    }
}
