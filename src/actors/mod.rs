pub mod actor;
pub mod drone;
pub mod target;

pub use crate::actors::actor::Actor;
pub use crate::actors::drone::Drone;
pub use crate::actors::target::TargetZone;
