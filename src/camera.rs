//! Fly-through perspective camera and its keyboard controller.
//!
//! The camera always looks down the fixed forward axis (-Z); it can be moved
//! around but never turned. View and projection matrices are cached: the view
//! is rebuilt on every [`Camera::update`], the projection only when
//! [`Camera::set_projection`] is called.

use instant::Duration;

use cgmath::{Deg, Matrix4, Vector3};
use winit::keyboard::KeyCode;

use crate::{input::InputState, math};

/// Unit offset from the eye to the point the camera looks at.
pub const FORWARD: Vector3<f32> = Vector3::new(0.0, 0.0, -1.0);
/// World up used for the look-at construction.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world space. Call [`Camera::update`] after changing it.
    pub position: Vector3<f32>,
    target: Vector3<f32>,
    fov: Deg<f32>,
    aspect: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    /// Creates a camera at `position` looking one unit down the forward axis.
    ///
    /// A field of view outside `(0°, 180°)` or a non-positive aspect ratio
    /// produces a degenerate projection: nothing panics, but what ends up on
    /// screen is undefined.
    pub fn new<V: Into<Vector3<f32>>, D: Into<Deg<f32>>>(position: V, aspect: f32, fov: D) -> Self {
        let position = position.into();
        let fov = fov.into();
        let target = position + FORWARD;
        Self {
            position,
            target,
            fov,
            aspect,
            view: math::look_at(position, target, WORLD_UP),
            projection: math::perspective(fov, aspect, Z_NEAR, Z_FAR),
        }
    }

    /// Re-derives the target from the current position and rebuilds the view matrix.
    pub fn update(&mut self) {
        self.target = self.position + FORWARD;
        self.view = math::look_at(self.position, self.target, WORLD_UP);
    }

    /// Rebuilds the projection matrix only.
    ///
    /// Callers only need this when the aspect ratio or field of view changed;
    /// calling it every frame is wasteful but harmless.
    pub fn set_projection<D: Into<Deg<f32>>>(&mut self, aspect: f32, fov: D) {
        self.aspect = aspect;
        self.fov = fov.into();
        self.projection = math::perspective(self.fov, aspect, Z_NEAR, Z_FAR);
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target
    }

    pub fn fov(&self) -> Deg<f32> {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    /// Projection in OpenGL clip convention (depth in `[-1, 1]`).
    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }
}

/// Moves a [`Camera`] on the XZ plane from held keys.
///
/// W/S move along -Z/+Z and A/D along -X/+X at `speed` units per second.
/// Escape asks the surface to close.
#[derive(Debug, Clone, Copy)]
pub struct FlyCameraController {
    pub speed: f32,
}

impl FlyCameraController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Applies the held movement keys to `camera.position`.
    ///
    /// Returns `true` when Escape is held.
    pub fn update(&self, camera: &mut Camera, input: &InputState, dt: Duration) -> bool {
        let step = self.speed * dt.as_secs_f32();
        if input.key_pressed(KeyCode::KeyW) {
            camera.position.z -= step;
        }
        if input.key_pressed(KeyCode::KeyS) {
            camera.position.z += step;
        }
        if input.key_pressed(KeyCode::KeyA) {
            camera.position.x -= step;
        }
        if input.key_pressed(KeyCode::KeyD) {
            camera.position.x += step;
        }
        input.key_pressed(KeyCode::Escape)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::tests::assert_mat_eq;

    #[test]
    fn target_follows_position_after_update() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), 800.0 / 600.0, Deg(90.0));
        camera.update();
        assert_eq!(camera.target(), Vector3::new(0.0, 0.0, 2.0));

        for p in [
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-50.0, 0.5, 1000.0),
            Vector3::new(0.0, -7.25, -3.0),
        ] {
            camera.position = p;
            camera.update();
            assert_eq!(camera.target(), camera.position + FORWARD);
        }
    }

    #[test]
    fn update_is_idempotent() {
        let mut camera = Camera::new(Vector3::new(4.0, -2.0, 9.0), 1.0, Deg(70.0));
        camera.update();
        let first: [[f32; 4]; 4] = camera.view().into();
        camera.update();
        let second: [[f32; 4]; 4] = camera.view().into();
        assert_eq!(first, second);
    }

    #[test]
    fn view_moves_world_opposite_to_eye() {
        let camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), 1.0, Deg(90.0));
        assert_mat_eq(
            camera.view(),
            Matrix4::from_translation(Vector3::new(0.0, 0.0, -3.0)),
        );
    }

    #[test]
    fn set_projection_leaves_view_alone() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), 1.0, Deg(90.0));
        let view = camera.view();
        camera.set_projection(2.0, Deg(45.0));
        assert_eq!(camera.view(), view);
        assert_eq!(camera.aspect(), 2.0);
        assert_eq!(camera.fov(), Deg(45.0));
        assert_mat_eq(
            camera.projection(),
            math::perspective(Deg(45.0), 2.0, Z_NEAR, Z_FAR),
        );
    }

    #[test]
    fn moving_the_eye_does_not_touch_the_projection() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), 1.0, Deg(90.0));
        let projection = camera.projection();
        camera.position.x += 10.0;
        camera.update();
        assert_eq!(camera.projection(), projection);
    }

    #[test]
    fn controller_moves_along_fixed_axes() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), 1.0, Deg(90.0));
        let controller = FlyCameraController::new(3.0);
        let mut input = InputState::default();

        input.press(KeyCode::KeyW);
        input.press(KeyCode::KeyD);
        let close = controller.update(&mut camera, &input, Duration::from_millis(500));
        assert!(!close);
        assert_abs_diff_eq!(camera.position.z, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(camera.position.x, 1.5, epsilon = 1e-6);
        assert_eq!(camera.position.y, 0.0);

        input.release(KeyCode::KeyW);
        input.release(KeyCode::KeyD);
        input.press(KeyCode::Escape);
        assert!(controller.update(&mut camera, &input, Duration::from_secs(1)));
        assert_abs_diff_eq!(camera.position.z, 1.5, epsilon = 1e-6);
    }
}
