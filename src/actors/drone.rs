use crate::action::{Action, ImpulseTable};
use crate::actors::actor::{vector2_to_tuple, Actor};
use crate::error::{EnvError, EnvResult};
use crate::physics::{rotate, BodySpec, BodyState, RigidBodyWorld};
use nalgebra::Vector2;

// Drone representation
pub struct Drone {
    pub spec: BodySpec,
    impulses: ImpulseTable,
    world: Box<dyn RigidBodyWorld>,
    state: BodyState,
}

impl Actor for Drone {
    fn position(&self) -> (f64, f64) {
        vector2_to_tuple(self.state.position)
    }
}

impl Drone {
    pub fn new(
        spec: BodySpec,
        impulses: ImpulseTable,
        world: Box<dyn RigidBodyWorld>,
        position: (f64, f64),
    ) -> Self {
        let mut drone = Drone {
            spec,
            impulses,
            world,
            state: BodyState::at_rest(Vector2::new(position.0, position.1)),
        };
        drone.respawn(position);
        drone
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    /// Discard the current body and create a fresh one at rest.
    pub fn respawn(&mut self, position: (f64, f64)) {
        let initial = BodyState::at_rest(Vector2::new(position.0, position.1));
        self.world.spawn(self.spec, initial);
        self.state = initial;
    }

    pub fn set_state(&mut self, state: BodyState) {
        self.world.set_state(state);
        self.sync();
    }

    /// Apply the action's impulse at the body origin.
    pub fn apply_action(&mut self, action: Action) {
        let impulse = self.impulses.impulse(action);
        if impulse != Vector2::zeros() {
            self.world.apply_local_impulse(impulse, Vector2::zeros());
            self.sync();
        }
    }

    /// Advance the physics world and return the new state.
    pub fn advance(&mut self, dt: f64) -> EnvResult<BodyState> {
        self.world.step(dt);
        self.sync();

        if !self.state.is_finite() {
            return Err(EnvError::NonFiniteState(format!("{:?}", self.state)));
        }
        Ok(self.state)
    }

    /// World-frame corners of the collider box.
    pub fn corners(&self) -> [Vector2<f64>; 4] {
        self.spec
            .local_corners()
            .map(|corner| self.state.position + rotate(corner, self.state.angle))
    }

    fn sync(&mut self) {
        if let Some(state) = self.world.state() {
            self.state = state;
        }
    }
}
