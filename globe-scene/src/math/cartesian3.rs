use bevy::math::DVec3;

use super::equals_epsilon;

pub trait Cartesian3 {
    fn equals_epsilon(
        &self,
        right: DVec3,
        relative_epsilon: Option<f64>,
        absolute_epsilon: Option<f64>,
    ) -> bool;
    fn magnitude(&self) -> f64;
    fn magnitude_squared(&self) -> f64;
    fn multiply_components(&self, right: &DVec3) -> DVec3;
    fn maximum_component(&self) -> f64;
    fn minimum_component(&self) -> f64;
}
impl Cartesian3 for DVec3 {
    fn equals_epsilon(
        &self,
        right: DVec3,
        relative_epsilon: Option<f64>,
        absolute_epsilon: Option<f64>,
    ) -> bool {
        return self.eq(&right)
            || equals_epsilon(self.x, right.x, relative_epsilon, absolute_epsilon)
                && equals_epsilon(self.y, right.y, relative_epsilon, absolute_epsilon)
                && equals_epsilon(self.z, right.z, relative_epsilon, absolute_epsilon);
    }
    fn magnitude(&self) -> f64 {
        return self.length();
    }
    fn magnitude_squared(&self) -> f64 {
        return self.length_squared();
    }
    fn multiply_components(&self, right: &DVec3) -> DVec3 {
        return DVec3::new(self.x * right.x, self.y * right.y, self.z * right.z);
    }
    fn maximum_component(&self) -> f64 {
        return self.x.max(self.y).max(self.z);
    }
    fn minimum_component(&self) -> f64 {
        return self.x.min(self.y).min(self.z);
    }
}
