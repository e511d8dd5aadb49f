use nalgebra::Vector2;
use tracing::warn;

use crate::error::{EnvError, EnvResult};

/// Discrete thrust commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    None = 0,
    ThrustLeft = 1,
    ThrustRight = 2,
    ThrustUp = 3,
}

impl Action {
    pub const COUNT: usize = 4;
    pub const ALL: [Action; Action::COUNT] = [
        Action::None,
        Action::ThrustLeft,
        Action::ThrustRight,
        Action::ThrustUp,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a raw action. Lenient decoding maps unknown values to `None`.
    pub fn decode(raw: i64, strict: bool) -> EnvResult<Action> {
        match Action::try_from(raw) {
            Ok(action) => Ok(action),
            Err(err) if strict => Err(err),
            Err(_) => {
                warn!(raw, "unknown action treated as no-op");
                Ok(Action::None)
            }
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Action::None),
            1 => Ok(Action::ThrustLeft),
            2 => Ok(Action::ThrustRight),
            3 => Ok(Action::ThrustUp),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

/// Body-frame impulse for each action, indexed by `Action::index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpulseTable {
    impulses: [Vector2<f64>; Action::COUNT],
}

impl ImpulseTable {
    pub fn new(side_impulse: f64, up_impulse: f64) -> Self {
        ImpulseTable {
            impulses: [
                Vector2::zeros(),
                Vector2::new(-side_impulse, 0.0),
                Vector2::new(side_impulse, 0.0),
                Vector2::new(0.0, up_impulse),
            ],
        }
    }

    pub fn impulse(&self, action: Action) -> Vector2<f64> {
        self.impulses[action.index()]
    }
}

impl Default for ImpulseTable {
    fn default() -> Self {
        ImpulseTable::new(100.0, 200.0)
    }
}
