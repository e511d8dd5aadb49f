use nalgebra::Vector2;

/// Anything placed in the world.
pub trait Actor {
    fn position(&self) -> (f64, f64);
}

pub fn vector2_to_tuple(vec: Vector2<f64>) -> (f64, f64) {
    (vec.x, vec.y)
}
