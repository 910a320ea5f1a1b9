pub mod vec3;
pub mod matrix;

pub use vec3::Vec3;
pub use matrix::Mat4;

/// Scalar linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-frame ease factor, clamped so a long frame never overshoots the target
pub fn ease_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}
