//! Particle field generation
//!
//! Builds the formed (cone) and chaos (filled sphere) configurations for
//! each category, along with the fixed per-particle color, size, speed and
//! phase. Runs once when a scene is built.

use std::f32::consts::{PI, TAU};
use rand::Rng;
use crate::math::Vec3;
use super::category::Category;
use super::palette::{self, hex_color};
use super::particle::Particle;

/// Winding count of the pearl garland, in half turns
const PEARL_WINDINGS: f32 = 10.0;

/// Pearl spiral sits a little outside the foliage
const PEARL_RADIUS_MARGIN: f32 = 0.5;

/// Dust hovers just outside the foliage surface
const DUST_RADIUS_MARGIN: f32 = 1.2;

/// Instanced pearl size
const PEARL_SCALE: f32 = 0.4;

/// Inputs for one category's field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub category: Category,
    pub count: usize,
    pub height: f32,
    pub radius: f32,
    pub chaos_radius: f32,
}

/// Particles plus their static render attributes
///
/// `colors` holds 3 floats per particle; `sizes` holds one (point size for
/// foliage and dust, base instance scale for gems and pearls).
#[derive(Debug, Clone, Default)]
pub struct GeneratedField {
    pub particles: Vec<Particle>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
}

impl GeneratedField {
    fn with_capacity(count: usize) -> Self {
        Self {
            particles: Vec::with_capacity(count),
            colors: Vec::with_capacity(count * 3),
            sizes: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, particle: Particle, color: Vec3, size: f32) {
        self.particles.push(particle);
        self.colors.extend_from_slice(&color.to_array());
        self.sizes.push(size);
    }
}

/// Generate the field for one category
pub fn generate_field<R: Rng>(spec: &FieldSpec, rng: &mut R) -> GeneratedField {
    let mut field = GeneratedField::with_capacity(spec.count);

    for i in 0..spec.count {
        let chaos = sample_chaos_position(spec.chaos_radius, rng);

        match spec.category {
            Category::Foliage => {
                let t: f32 = rng.gen();
                let theta = rng.gen::<f32>() * TAU;
                // sqrt keeps the disk at height t uniformly filled
                let r = cone_radius(t, spec.radius) * rng.gen::<f32>().sqrt();
                let target = cone_point(t, r, theta, spec.height);

                let color = match rng.gen::<f32>() {
                    mix if mix > 0.9 => palette::SILVER,
                    mix if mix > 0.6 => palette::DEEP_GREEN,
                    _ => palette::EMERALD,
                };
                let size = rng.gen::<f32>() * 0.4 + 0.1;
                let speed = rng.gen::<f32>() * 2.0 + 1.0;

                field.push(Particle::new(target, chaos, speed), hex_color(color), size);
            }
            Category::Dust => {
                let t: f32 = rng.gen();
                let theta = rng.gen::<f32>() * TAU;
                let r = cone_radius(t, spec.radius) + DUST_RADIUS_MARGIN;
                let target = cone_point(t, r, theta, spec.height);

                let color = match rng.gen::<f32>() {
                    pick if pick > 0.6 => palette::GOLD,
                    pick if pick > 0.3 => palette::SILVER,
                    _ => palette::PALE_PINK,
                };
                let size = rng.gen::<f32>() * 0.2 + 0.1;
                let phase = rng.gen::<f32>() * TAU;
                let speed = rng.gen::<f32>() * 0.5 + 0.2;

                let particle = Particle::new(target, chaos, speed).with_phase(phase);
                field.push(particle, hex_color(color), size);
            }
            Category::Ornament => {
                let t: f32 = rng.gen();
                let theta = rng.gen::<f32>() * TAU;
                let target = cone_point(t, cone_radius(t, spec.radius), theta, spec.height);

                let color = palette::PINK_PALETTE[rng.gen_range(0..palette::PINK_PALETTE.len())];
                let scale = 0.5 + rng.gen::<f32>();
                let speed = rng.gen::<f32>() * 2.0 + 0.5;
                let phase = rng.gen::<f32>() * TAU;

                let particle = Particle::new(target, chaos, speed).with_phase(phase);
                field.push(particle, hex_color(color), scale);
            }
            Category::Pearl => {
                let t = i as f32 / spec.count as f32;
                let r = cone_radius(t, spec.radius + PEARL_RADIUS_MARGIN);
                let target = cone_point(t, r, t * PEARL_WINDINGS * PI, spec.height);
                let speed = rng.gen::<f32>() + 0.2;

                field.push(Particle::new(target, chaos, speed), hex_color(palette::SILVER), PEARL_SCALE);
            }
        }
    }

    field
}

/// Radius of the cone at normalized height `t`
fn cone_radius(t: f32, base_radius: f32) -> f32 {
    (1.0 - t) * base_radius
}

/// Point at normalized height `t`, distance `r` from the axis, angle `theta`.
/// The tree is centered vertically on the origin.
fn cone_point(t: f32, r: f32, theta: f32, height: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), (t - 0.5) * height, r * theta.sin())
}

/// Uniform sample inside a sphere of radius `max_radius`
///
/// The cube root on the radius gives uniform density per unit volume rather
/// than bunching samples at the center.
pub fn sample_chaos_position<R: Rng>(max_radius: f32, rng: &mut R) -> Vec3 {
    let u: f32 = rng.gen();
    let v: f32 = rng.gen();
    let w: f32 = rng.gen();

    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let lambda = TAU * u;
    let r = max_radius * w.cbrt();

    Vec3::new(
        r * phi.sin() * lambda.cos(),
        r * phi.sin() * lambda.sin(),
        r * phi.cos(),
    )
}
