// lodestar_core/src/types.rs

use nalgebra::Isometry3;

// --- Core Type Aliases ---
/// Monotonic time in seconds.
pub type Timestamp = f64;

/// A stamped rigid transform. Immutable once constructed; the pose-prior
/// handler produces one of these per accepted update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub isometry: Isometry3<f64>,
    pub timestamp: Timestamp,
}

impl Pose {
    pub fn new(isometry: Isometry3<f64>, timestamp: Timestamp) -> Self {
        Self {
            isometry,
            timestamp,
        }
    }

    /// An identity pose at time zero, the state before any prior arrives.
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
            timestamp: 0.0,
        }
    }

    /// The motion of `other` expressed in this pose's frame:
    /// `inverse(self) ∘ other`.
    pub fn relative_to(&self, other: &Pose) -> Isometry3<f64> {
        self.isometry.inverse() * other.isometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    #[test]
    fn relative_to_recovers_the_increment() {
        let a = Pose::new(
            Isometry3::from_parts(
                Translation3::new(1.0, 0.0, 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3),
            ),
            1.0,
        );
        let step = Isometry3::from_parts(
            Translation3::new(0.5, -0.2, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -0.1),
        );
        let b = Pose::new(a.isometry * step, 2.0);

        let relative = a.relative_to(&b);
        assert_abs_diff_eq!(
            relative.translation.vector,
            step.translation.vector,
            epsilon = 1e-12
        );
        assert!(relative.rotation.angle_to(&step.rotation) < 1e-12);
    }
}
