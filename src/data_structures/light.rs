use cgmath::{InnerSpace, Vector3, Zero};

/// Direction used when a light is built from a zero vector.
pub const STRAIGHT_DOWN: Vector3<f32> = Vector3::new(0.0, -1.0, 0.0);

/// Sun-like light: a direction and an intensity, no position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    direction: Vector3<f32>,
    intensity: f32,
    color: Vector3<f32>,
}

impl DirectionalLight {
    /// White light shining along `direction`, which is normalized here.
    pub fn new<V: Into<Vector3<f32>>>(direction: V, intensity: f32) -> Self {
        let direction = direction.into();
        let direction = if direction.is_zero() || !direction.magnitude2().is_finite() {
            log::warn!("Directional light built from {:?}; shining straight down instead", direction);
            STRAIGHT_DOWN
        } else {
            direction.normalize()
        };

        Self {
            direction,
            intensity,
            color: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn color(&self) -> Vector3<f32> {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let light = DirectionalLight::new(Vector3::new(0.0, -3.0, 4.0), 0.8);
        assert!((light.direction().magnitude() - 1.0).abs() < 1e-6);
        assert!((light.direction() - Vector3::new(0.0, -0.6, 0.8)).magnitude() < 1e-6);
        assert_eq!(light.intensity(), 0.8);
        assert_eq!(light.color(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn zero_direction_falls_back_to_straight_down() {
        let light = DirectionalLight::new(Vector3::new(0.0, 0.0, 0.0), 1.0);
        assert_eq!(light.direction(), STRAIGHT_DOWN);
    }
}
