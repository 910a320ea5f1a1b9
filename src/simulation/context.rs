use crate::interaction::Ray;
use crate::math::Vec3;
use super::mode::Mode;

/// Everything a particle pass needs to know about the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    pub mode: Mode,
    /// Seconds since the scene started
    pub elapsed: f32,
    /// Seconds since the previous frame
    pub delta: f32,
    /// Pointer ray, in whatever frame the pass works in
    pub ray: Option<Ray>,
}

impl SimulationContext {
    pub fn new(mode: Mode, elapsed: f32, delta: f32, ray: Option<Ray>) -> Self {
        Self {
            mode,
            elapsed,
            delta,
            ray,
        }
    }

    pub fn is_chaos(&self) -> bool {
        self.mode.is_chaos()
    }

    /// Same frame with the ray carried into a cloud's local frame
    pub fn localized(&self, offset: Vec3, rotation_y: f32) -> Self {
        Self {
            ray: self.ray.map(|ray| ray.to_local(offset, rotation_y)),
            ..*self
        }
    }

    pub fn without_ray(&self) -> Self {
        Self { ray: None, ..*self }
    }
}
