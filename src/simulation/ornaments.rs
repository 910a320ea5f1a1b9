//! Gem instance attributes and the star topper
//!
//! Gem positions come from the shared integrator; this module adds what only
//! instanced meshes need: orientation, per-mode scale with a hover pop, and a
//! shimmer color. The star is a single object with its own heavier easing.

use crate::interaction::pick_nearest;
use crate::math::{ease_factor, Vec3};
use crate::particles::palette::{hex_color, SILVER};
use crate::particles::ParticleField;
use super::context::SimulationContext;
use super::mode::Mode;

/// Instance scale multiplier per mode, applied to the base scale
const FORMED_SCALE: f32 = 0.15;
const CHAOS_SCALE: f32 = 0.3;

/// Extra scale at full hover strength
const HOVER_POP: f32 = 0.3;

/// Resting sway amplitude in radians and the extra swing when hovered
const BASE_SWAY: f32 = 0.15;
const HOVER_SWAY: f32 = 0.3;

/// Fraction of the way to silver at full hover strength
const SHIMMER_MIX: f32 = 0.6;

/// Instance scale of a gem with the given base scale
pub fn gem_scale(base_scale: f32, mode: Mode, strength: f32) -> f32 {
    let mode_scale = match mode {
        Mode::Formed => FORMED_SCALE,
        Mode::Chaos => CHAOS_SCALE,
    };
    mode_scale * base_scale * (1.0 + strength * HOVER_POP)
}

/// Per-gem orientation, scale and color, rewritten every frame
pub struct GemInstances {
    rotations: Vec<Vec3>,
    rotation_buffer: Vec<f32>,
    scales: Vec<f32>,
    colors: Vec<f32>,
}

impl GemInstances {
    /// Instances at rest in formed mode
    pub fn new(field: &ParticleField) -> Self {
        let count = field.len();
        let scales = field
            .sizes()
            .iter()
            .map(|&base| gem_scale(base, Mode::Formed, 0.0))
            .collect();

        Self {
            rotations: vec![Vec3::ZERO; count],
            rotation_buffer: vec![0.0; count * 3],
            scales,
            colors: field.colors().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Euler angles (XYZ), 3 floats per gem
    pub fn rotations(&self) -> &[f32] {
        &self.rotation_buffer
    }

    pub fn rotation(&self, index: usize) -> Vec3 {
        self.rotations[index]
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Shimmer-blended colors, 3 floats per gem
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Hover hit-test against last frame's instances. Only runs while formed.
    /// The gem nearest the camera along the ray gets full strength.
    pub fn hover(&self, field: &mut ParticleField, ctx: &SimulationContext) -> Option<usize> {
        if ctx.is_chaos() {
            return None;
        }
        let ray = ctx.ray.as_ref()?;

        let spheres = field
            .particles()
            .iter()
            .zip(&self.scales)
            .map(|(gem, &radius)| (gem.current, radius));
        let hit = pick_nearest(ray, spheres)?;

        field.particles_mut()[hit.index].excite();
        Some(hit.index)
    }

    /// Recompute orientation, scale and color after the integrator has run
    pub fn update(&mut self, field: &ParticleField, ctx: &SimulationContext) {
        let dt = ctx.delta;
        let t = ctx.elapsed;
        let silver = hex_color(SILVER);

        for (i, gem) in field.particles().iter().enumerate() {
            let strength = gem.interaction_strength;
            let rotation = &mut self.rotations[i];

            match ctx.mode {
                Mode::Chaos => {
                    rotation.x += dt * 2.0;
                    rotation.y += dt * 2.0;
                }
                Mode::Formed => {
                    let amp = BASE_SWAY + strength * HOVER_SWAY;
                    rotation.x = (t * 1.5 + gem.phase()).sin() * amp;
                    rotation.z = (t * 1.2 + gem.phase()).cos() * amp;
                    rotation.y += dt * 0.2 + strength * dt * 5.0;
                }
            }
            rotation.write_to(&mut self.rotation_buffer, i);

            self.scales[i] = gem_scale(field.sizes()[i], ctx.mode, strength);

            let mut color = field.color(i);
            if strength > 0.0 {
                color = color.lerp(&silver, strength * SHIMMER_MIX);
            }
            color.write_to(&mut self.colors, i);
        }
    }
}

/// Height of the star above the top of the foliage when formed
const STAR_LIFT: f32 = 0.8;

/// The golden star that floats above the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarTopper {
    position: Vec3,
    rotation: Vec3,
    tree_height: f32,
}

impl StarTopper {
    /// Star resting at its formed height
    pub fn new(tree_height: f32) -> Self {
        Self {
            position: Vec3::new(0.0, tree_height / 2.0 + STAR_LIFT, 0.0),
            rotation: Vec3::ZERO,
            tree_height,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Position then rotation, 6 floats
    pub fn transform(&self) -> [f32; 6] {
        let [px, py, pz] = self.position.to_array();
        let [rx, ry, rz] = self.rotation.to_array();
        [px, py, pz, rx, ry, rz]
    }

    /// Where the star is heading: above the tree when formed, the center in chaos,
    /// bobbing either way
    pub fn target(&self, mode: Mode, elapsed: f32) -> Vec3 {
        let base = match mode {
            Mode::Formed => self.tree_height / 2.0 + STAR_LIFT,
            Mode::Chaos => 0.0,
        };
        Vec3::new(0.0, base + (elapsed * 1.5).sin() * 0.25, 0.0)
    }

    pub fn update(&mut self, ctx: &SimulationContext) {
        let dt = ctx.delta;
        let goal = self.target(ctx.mode, ctx.elapsed);
        self.position = self.position.lerp(&goal, ease_factor(1.0, dt));

        match ctx.mode {
            Mode::Chaos => {
                self.rotation.y += dt * 2.0;
                self.rotation.x += dt;
            }
            Mode::Formed => {
                self.rotation.y += dt * 0.5;
                self.rotation.z = ctx.elapsed.sin() * 0.05;
            }
        }
    }
}
