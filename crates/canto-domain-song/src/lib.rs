pub mod model;
pub mod pitch_name;

pub use model::*;
pub use pitch_name::*;
