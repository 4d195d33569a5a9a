//! Transform math: look-at, perspective projection and pose composition.
//!
//! Everything in here is a pure function over `cgmath` types. Matrices follow
//! the OpenGL clip-space convention (depth in `[-1, 1]`); the renderer converts
//! to wgpu's `[0, 1]` depth range with [`OPENGL_TO_WGPU_MATRIX`] right before
//! the projection is pushed to the GPU.

use cgmath::{Deg, Matrix4, Point3, Rad, Vector3};

/// Converts OpenGL clip space (z in `[-1, 1]`) into wgpu clip space (z in `[0, 1]`).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Right-handed look-at view matrix.
pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::look_at_rh(
        Point3::new(eye.x, eye.y, eye.z),
        Point3::new(target.x, target.y, target.z),
        up,
    )
}

/// Right-handed perspective projection in OpenGL clip convention.
///
/// Unlike `cgmath::perspective` this never asserts on its inputs: a field of
/// view of 0° yields infinite scale factors and one of 180° (or more) a
/// collapsed frustum. Both are undefined visually but never panic.
pub fn perspective(fovy: impl Into<Rad<f32>>, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let fovy: Rad<f32> = fovy.into();
    let f = 1.0 / (fovy.0 / 2.0).tan();
    let depth = near - far;

    #[rustfmt::skip]
    let projection = Matrix4::new(
        f / aspect, 0.0, 0.0,                          0.0,
        0.0,        f,   0.0,                          0.0,
        0.0,        0.0, (far + near) / depth,        -1.0,
        0.0,        0.0, (2.0 * far * near) / depth,   0.0,
    );
    projection
}

/// Rotation about X, then Y, then Z, composed as `Rx * Ry * Rz`.
pub fn rotation(degrees: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_angle_x(Deg(degrees.x))
        * Matrix4::from_angle_y(Deg(degrees.y))
        * Matrix4::from_angle_z(Deg(degrees.z))
}

/// Model matrix of a pose: `Rx * Ry * Rz * T`.
///
/// The rotation is applied on the left of the translation, so an entity placed
/// away from the origin orbits the world origin when rotated. Swapping the
/// order changes what every off-origin entity looks like on screen.
pub fn model_matrix(position: Vector3<f32>, rotation_degrees: Vector3<f32>) -> Matrix4<f32> {
    rotation(rotation_degrees) * Matrix4::from_translation(position)
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::{SquareMatrix, Vector4};

    use super::*;

    pub(crate) fn assert_mat_eq(actual: Matrix4<f32>, expected: Matrix4<f32>) {
        let actual: [[f32; 4]; 4] = actual.into();
        let expected: [[f32; 4]; 4] = expected.into();
        for c in 0..4 {
            for r in 0..4 {
                assert_abs_diff_eq!(actual[c][r], expected[c][r], epsilon = 1e-5);
            }
        }
    }

    fn clip_depth(projection: Matrix4<f32>, view_z: f32) -> f32 {
        let clip = projection * Vector4::new(0.0, 0.0, view_z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn perspective_maps_near_and_far_planes_to_ndc_bounds() {
        for fov in [1.0_f32, 45.0, 90.0, 179.0] {
            for aspect in [0.25_f32, 1.0, 800.0 / 600.0, 16.0] {
                let p = perspective(Deg(fov), aspect, 0.1, 1000.0);
                let raw: [[f32; 4]; 4] = p.into();
                assert!(raw.iter().flatten().all(|v| v.is_finite()), "fov {fov}, aspect {aspect}");
                assert_abs_diff_eq!(clip_depth(p, -0.1), -1.0, epsilon = 1e-4);
                assert_abs_diff_eq!(clip_depth(p, -1000.0), 1.0, epsilon = 1e-4);
                let mid = clip_depth(p, -10.0);
                assert!((-1.0..=1.0).contains(&mid));
            }
        }
    }

    #[test]
    fn perspective_matches_cgmath_for_valid_input() {
        let ours = perspective(Deg(60.0), 1.5, 0.1, 100.0);
        let theirs = cgmath::perspective(Deg(60.0), 1.5, 0.1, 100.0);
        assert_mat_eq(ours, theirs);
    }

    #[test]
    fn degenerate_fov_does_not_panic() {
        let _ = perspective(Deg(0.0), 1.0, 0.1, 1000.0);
        let _ = perspective(Deg(180.0), 1.0, 0.1, 1000.0);
    }

    #[test]
    fn wgpu_conversion_moves_depth_into_unit_range() {
        let p = OPENGL_TO_WGPU_MATRIX * perspective(Deg(90.0), 1.0, 0.1, 1000.0);
        assert_abs_diff_eq!(clip_depth(p, -0.1), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(clip_depth(p, -1000.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn rotation_is_applied_before_translation() {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let degrees = Vector3::new(30.0, 45.0, 60.0);
        let expected = Matrix4::from_angle_x(Deg(30.0))
            * Matrix4::from_angle_y(Deg(45.0))
            * Matrix4::from_angle_z(Deg(60.0))
            * Matrix4::from_translation(position);
        let swapped = Matrix4::from_translation(position) * rotation(degrees);

        let model = model_matrix(position, degrees);
        assert_mat_eq(model, expected);

        let a: [[f32; 4]; 4] = model.into();
        let b: [[f32; 4]; 4] = swapped.into();
        assert!((a[3][0] - b[3][0]).abs() > 1e-3 || (a[3][1] - b[3][1]).abs() > 1e-3);
    }

    #[test]
    fn zero_pose_is_identity() {
        assert_mat_eq(
            model_matrix(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)),
            Matrix4::identity(),
        );
    }
}
