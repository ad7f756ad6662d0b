mod angle;
mod field_transform;
mod geom;
mod instant;
mod team;

pub use angle::*;
pub use field_transform::*;
pub use geom::*;
pub use instant::*;
pub use team::*;

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
