use nalgebra::Vector2;

use crate::physics::{box_moment, cross, rotate, BodySpec, BodyState, RigidBodyWorld};

/// Semi-implicit Euler integration of a single free box. No collisions.
#[derive(Clone, Debug)]
pub struct EulerWorld {
    gravity: Vector2<f64>,
    body: Option<(BodySpec, BodyState)>,
}

impl EulerWorld {
    pub fn new(gravity: Vector2<f64>) -> Self {
        EulerWorld {
            gravity,
            body: None,
        }
    }
}

impl RigidBodyWorld for EulerWorld {
    fn spawn(&mut self, spec: BodySpec, initial: BodyState) {
        self.body = Some((spec, initial));
    }

    fn state(&self) -> Option<BodyState> {
        self.body.map(|(_, state)| state)
    }

    fn set_state(&mut self, state: BodyState) {
        if let Some((_, current)) = self.body.as_mut() {
            *current = state;
        }
    }

    fn apply_local_impulse(&mut self, impulse: Vector2<f64>, local_point: Vector2<f64>) {
        let Some((spec, state)) = self.body.as_mut() else {
            return;
        };

        let world_impulse = rotate(impulse, state.angle);
        state.velocity += world_impulse / spec.mass;

        let arm = rotate(local_point, state.angle);
        let torque_impulse = cross(arm, world_impulse);
        if torque_impulse != 0.0 {
            state.angular_velocity += torque_impulse / box_moment(spec);
        }
    }

    fn step(&mut self, dt: f64) {
        if let Some((_, state)) = self.body.as_mut() {
            state.velocity += self.gravity * dt;
            state.position += state.velocity * dt;
            state.angle += state.angular_velocity * dt;
        }
    }
}
