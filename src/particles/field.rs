use crate::math::Vec3;
use super::category::{Category, MotionProfile};
use super::generator::GeneratedField;
use super::particle::Particle;

/// Arena of one category's particles plus the buffers handed to the renderer
///
/// All buffers are allocated once and overwritten in place every frame.
/// Positions are expressed in the cloud's local frame; `cloud_rotation`
/// is the Y rotation the renderer applies to the whole cloud.
pub struct ParticleField {
    category: Category,
    profile: MotionProfile,
    particles: Vec<Particle>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    phases: Vec<f32>,
    cloud_rotation: f32,
}

impl ParticleField {
    pub fn new(category: Category, profile: MotionProfile, generated: GeneratedField) -> Self {
        let GeneratedField { particles, colors, sizes } = generated;

        let mut positions = vec![0.0f32; particles.len() * 3];
        for (i, p) in particles.iter().enumerate() {
            p.current.write_to(&mut positions, i);
        }
        let phases = particles.iter().map(|p| p.phase()).collect();

        Self {
            category,
            profile,
            particles,
            positions,
            colors,
            sizes,
            phases,
            cloud_rotation: 0.0,
        }
    }

    /// Field from bare particles, with white color and unit size
    pub fn from_particles(category: Category, profile: MotionProfile, particles: Vec<Particle>) -> Self {
        let count = particles.len();
        Self::new(
            category,
            profile,
            GeneratedField {
                particles,
                colors: vec![1.0; count * 3],
                sizes: vec![1.0; count],
            },
        )
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Particles together with the output buffer, for the integrator pass
    pub fn particles_and_positions_mut(&mut self) -> (&mut [Particle], &mut [f32]) {
        (&mut self.particles, &mut self.positions)
    }

    /// Rendered positions, 3 floats per particle
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }

    /// Static colors, 3 floats per particle
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(self.colors[base], self.colors[base + 1], self.colors[base + 2])
    }

    /// Static sizes (point size or base instance scale)
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    pub fn cloud_rotation(&self) -> f32 {
        self.cloud_rotation
    }

    pub fn spin_cloud(&mut self, radians: f32) {
        self.cloud_rotation = (self.cloud_rotation + radians) % std::f32::consts::TAU;
    }
}
