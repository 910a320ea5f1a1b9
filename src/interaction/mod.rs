pub mod picking;
pub mod probe;

pub use picking::{pick_nearest, HitInfo};
pub use probe::{closest_approach, pixel_to_ndc, ray_from_pointer, Approach, CameraState, Ray};
