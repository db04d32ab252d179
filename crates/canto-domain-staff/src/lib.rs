pub mod interpolation;
pub mod labels;
pub mod pitch_row;
pub mod reconciler;
pub mod segment;
pub mod sentence_window;

pub use interpolation::*;
pub use labels::*;
pub use pitch_row::*;
pub use reconciler::*;
pub use segment::*;
pub use sentence_window::*;
