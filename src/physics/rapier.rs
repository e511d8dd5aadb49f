use nalgebra::{Point2, Vector2};
use rapier2d_f64::prelude::*;
use tracing::debug;

use crate::physics::{BodySpec, BodyState, RigidBodyWorld};

/// Single-body rapier world. The ground is not modeled as a collider.
pub struct RapierWorld {
    gravity: Vector2<f64>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    drone: Option<RigidBodyHandle>,
}

impl RapierWorld {
    pub fn new(gravity: Vector2<f64>) -> Self {
        RapierWorld {
            gravity,
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            drone: None,
        }
    }

    fn body(&self) -> Option<&RigidBody> {
        self.drone.and_then(|handle| self.bodies.get(handle))
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.drone.and_then(|handle| self.bodies.get_mut(handle))
    }
}

impl RigidBodyWorld for RapierWorld {
    fn spawn(&mut self, spec: BodySpec, initial: BodyState) {
        if let Some(handle) = self.drone.take() {
            self.bodies.remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }

        let body = RigidBodyBuilder::dynamic()
            .translation(initial.position)
            .rotation(initial.angle)
            .linvel(initial.velocity)
            .angvel(initial.angular_velocity)
            .can_sleep(false)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(spec.half_extents.x, spec.half_extents.y)
            .mass(spec.mass)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.bodies[handle].recompute_mass_properties_from_colliders(&self.colliders);

        debug!(
            x = initial.position.x,
            y = initial.position.y,
            mass = spec.mass,
            "spawned rapier body"
        );
        self.drone = Some(handle);
    }

    fn state(&self) -> Option<BodyState> {
        self.body().map(|body| BodyState {
            position: *body.translation(),
            velocity: *body.linvel(),
            angle: body.rotation().angle(),
            angular_velocity: body.angvel(),
        })
    }

    fn set_state(&mut self, state: BodyState) {
        if let Some(body) = self.body_mut() {
            body.set_translation(state.position, true);
            body.set_rotation(Rotation::new(state.angle), true);
            body.set_linvel(state.velocity, true);
            body.set_angvel(state.angular_velocity, true);
        }
    }

    fn apply_local_impulse(&mut self, impulse: Vector2<f64>, local_point: Vector2<f64>) {
        if let Some(body) = self.body_mut() {
            let pose = *body.position();
            let world_impulse = pose.rotation * impulse;
            let world_point = pose * Point2::from(local_point);
            body.apply_impulse_at_point(world_impulse, world_point, true);
        }
    }

    fn step(&mut self, dt: f64) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}
