//! Camera, per-frame snapshots and the model transform

mod camera;
mod frame;
mod transform;

pub use camera::*;
pub use frame::*;
pub use transform::*;
