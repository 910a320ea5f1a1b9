//! Per-frame simulation: mode state, the particle integrator, ornament
//! instances and the camera rig

pub mod camera;
pub mod context;
pub mod integrator;
pub mod mode;
pub mod ornaments;

pub use camera::CameraRig;
pub use context::SimulationContext;
pub use integrator::{apply_pointer_force, spiral_target, step_field, step_particle};
pub use mode::{GestureSignal, HandPosition, Mode, ModeController, CLOSED_FIST, OPEN_PALM};
pub use ornaments::{gem_scale, GemInstances, StarTopper};
