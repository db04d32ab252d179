pub mod pitch;
pub mod storage;
pub mod timing;
pub mod types;

pub use pitch::*;
pub use storage::*;
pub use timing::*;
pub use types::*;
