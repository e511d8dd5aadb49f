//! Rigid-body stepping behind a small trait so the episode logic can run
//! against either rapier or a plain Euler integrator.

pub mod euler;
pub mod rapier;

use nalgebra::Vector2;

pub use crate::physics::euler::EulerWorld;
pub use crate::physics::rapier::RapierWorld;

/// Pose and velocities of the single dynamic body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub angle: f64,
    pub angular_velocity: f64,
}

impl BodyState {
    pub fn at_rest(position: Vector2<f64>) -> Self {
        BodyState {
            position,
            velocity: Vector2::zeros(),
            angle: 0.0,
            angular_velocity: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.angle.is_finite()
            && self.angular_velocity.is_finite()
    }
}

/// Mass and collider geometry of the dynamic body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    pub mass: f64,
    pub half_extents: Vector2<f64>,
}

impl BodySpec {
    /// Corners of the box in the body frame, counter-clockwise.
    pub fn local_corners(&self) -> [Vector2<f64>; 4] {
        let (hx, hy) = (self.half_extents.x, self.half_extents.y);
        [
            Vector2::new(-hx, -hy),
            Vector2::new(hx, -hy),
            Vector2::new(hx, hy),
            Vector2::new(-hx, hy),
        ]
    }
}

/// A world holding exactly one dynamic body under constant gravity.
pub trait RigidBodyWorld: Send {
    /// Create the body, replacing any previous one.
    fn spawn(&mut self, spec: BodySpec, initial: BodyState);

    /// Current state of the body. `None` before the first spawn.
    fn state(&self) -> Option<BodyState>;

    /// Overwrite the body's pose and velocities.
    fn set_state(&mut self, state: BodyState);

    /// Apply an instantaneous impulse given in the body frame at a body-frame point.
    fn apply_local_impulse(&mut self, impulse: Vector2<f64>, local_point: Vector2<f64>);

    /// Advance the world by `dt` seconds.
    fn step(&mut self, dt: f64);
}

/// Rotate a body-frame vector into the world frame.
pub fn rotate(v: Vector2<f64>, angle: f64) -> Vector2<f64> {
    let (s, c) = angle.sin_cos();
    Vector2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// 2D cross product `r × j`.
pub fn cross(r: Vector2<f64>, j: Vector2<f64>) -> f64 {
    r.x * j.y - r.y * j.x
}

/// Moment of inertia of a solid box about its center.
pub fn box_moment(spec: &BodySpec) -> f64 {
    let w = 2.0 * spec.half_extents.x;
    let h = 2.0 * spec.half_extents.y;
    spec.mass * (w * w + h * h) / 12.0
}
