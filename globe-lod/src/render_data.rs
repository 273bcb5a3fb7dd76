use bevy::math::{DMat4, DVec3};

/// Read-only description of the viewer, world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub view_direction: DVec3,
    pub look_up: DVec3,
    pub view_matrix: DMat4,
    pub projection_matrix: DMat4,
}
impl Camera {
    pub fn look_at(
        position: DVec3,
        target: DVec3,
        up: DVec3,
        fov_y: f64,
        aspect_ratio: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let view_direction = (target - position).normalize_or_zero();
        Self {
            position,
            view_direction,
            look_up: up.normalize_or_zero(),
            view_matrix: DMat4::look_at_rh(position, target, up),
            projection_matrix: DMat4::perspective_rh(fov_y, aspect_ratio, near, far),
        }
    }
    pub fn view_projection_matrix(&self) -> DMat4 {
        return self.projection_matrix * self.view_matrix;
    }
}
impl Default for Camera {
    fn default() -> Self {
        return Camera::look_at(
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::ZERO,
            DVec3::Y,
            std::f64::consts::FRAC_PI_3,
            16.0 / 9.0,
            0.1,
            1e10,
        );
    }
}

/// Per-frame input handed to the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderData {
    pub camera: Camera,
    pub model_transform: DMat4,
    pub fisheye: bool,
    inverse_model_transform: DMat4,
    model_view_projection: DMat4,
}
impl RenderData {
    pub fn new(camera: Camera, model_transform: DMat4) -> Self {
        Self {
            camera,
            model_transform,
            fisheye: false,
            inverse_model_transform: model_transform.inverse(),
            model_view_projection: camera.view_projection_matrix() * model_transform,
        }
    }
    pub fn with_fisheye(mut self, fisheye: bool) -> Self {
        self.fisheye = fisheye;
        return self;
    }
    pub fn inverse_model_transform(&self) -> DMat4 {
        return self.inverse_model_transform;
    }
    pub fn model_view_projection(&self) -> DMat4 {
        return self.model_view_projection;
    }
    pub fn camera_position_model_space(&self) -> DVec3 {
        return self
            .inverse_model_transform
            .transform_point3(self.camera.position);
    }
    pub fn camera_view_direction_model_space(&self) -> DVec3 {
        return self
            .inverse_model_transform
            .transform_vector3(self.camera.view_direction)
            .normalize_or_zero();
    }
    pub fn camera_look_up_model_space(&self) -> DVec3 {
        return self
            .inverse_model_transform
            .transform_vector3(self.camera.look_up)
            .normalize_or_zero();
    }
}
impl Default for RenderData {
    fn default() -> Self {
        return RenderData::new(Camera::default(), DMat4::IDENTITY);
    }
}
