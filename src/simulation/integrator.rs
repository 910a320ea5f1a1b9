//! Per-particle integration
//!
//! One pass per category per frame:
//! 1. ease `current` toward the active target (static or moving),
//! 2. apply the pointer force (repel when formed, attract and swirl in chaos),
//! 3. write the result, plus any output-only sway, into the field's buffer.

use crate::config::TreeShape;
use crate::interaction::{closest_approach, Ray};
use crate::math::{ease_factor, Vec3};
use crate::particles::{FormedTarget, InteractionProfile, MotionProfile, Particle, ParticleField, SpiralRise};
use super::context::SimulationContext;
use super::mode::Mode;

/// Below this distance from the ray the attraction direction is unreliable
const MIN_ATTRACT_DISTANCE: f32 = 0.01;

/// Advance every particle of `field` by one frame.
/// `ctx.ray` must already be in the field's local frame.
pub fn step_field(field: &mut ParticleField, ctx: &SimulationContext, tree: &TreeShape) {
    let profile = *field.profile();
    let (particles, positions) = field.particles_and_positions_mut();

    for (index, particle) in particles.iter_mut().enumerate() {
        step_particle(index, particle, &profile, ctx, tree);

        let mut output = particle.current;
        if ctx.mode == Mode::Formed && profile.output_sway != 0.0 {
            output.y += (ctx.elapsed + particle.target().x).sin() * profile.output_sway;
        }
        output.write_to(positions, index);
    }

    if ctx.mode == Mode::Formed && profile.cloud_spin != 0.0 {
        field.spin_cloud(ctx.delta * profile.cloud_spin);
    }
}

/// Base motion, hover decay and pointer force for a single particle
pub fn step_particle(
    index: usize,
    particle: &mut Particle,
    profile: &MotionProfile,
    ctx: &SimulationContext,
    tree: &TreeShape,
) {
    let previous = particle.current;

    match ctx.mode {
        Mode::Chaos => {
            let factor = profile.chaos_rate.factor(particle.speed(), ctx.delta);
            particle.ease_toward(particle.chaos_target(), factor);
        }
        Mode::Formed => match profile.formed_target {
            FormedTarget::Static => {
                let factor = profile.formed_rate.factor(particle.speed(), ctx.delta);
                particle.ease_toward(particle.target(), factor);
            }
            FormedTarget::SpiralRise(spiral) => {
                let goal = spiral_target(&spiral, index, particle, ctx.elapsed, tree);
                let horizontal = profile.formed_rate.factor(particle.speed(), ctx.delta);
                let vertical = ease_factor(spiral.vertical_ease, ctx.delta);
                let current = &mut particle.current;
                current.x += (goal.x - current.x) * horizontal;
                current.y += (goal.y - current.y) * vertical;
                current.z += (goal.z - current.z) * horizontal;
            }
        },
    }

    particle.decay_strength(ctx.delta);

    if let (Some(ray), Some(interaction)) = (ctx.ray.as_ref(), profile.interaction.as_ref()) {
        apply_pointer_force(particle, ray, interaction, ctx.mode, ctx.delta);
    }

    if !particle.current.is_finite() {
        particle.current = previous;
    }
}

/// Position on the rising spiral the dust follows while the tree is formed.
///
/// Height climbs with time and wraps back to the bottom once it passes the
/// top of the tree plus `headroom`. The radius follows the cone at that
/// height and the angle precesses, even indices one way and odd the other.
pub fn spiral_target(
    spiral: &SpiralRise,
    index: usize,
    particle: &Particle,
    elapsed: f32,
    tree: &TreeShape,
) -> Vec3 {
    let base = particle.target();
    let span = tree.height + spiral.headroom;

    let climbed = base.y + elapsed * particle.speed() * spiral.rise;
    let y = if span > 0.0 {
        (climbed + span / 2.0).rem_euclid(span) - span / 2.0
    } else {
        climbed
    };

    let s = if tree.height > 0.0 {
        1.0 - (y + tree.height / 2.0) / tree.height
    } else {
        1.0
    };
    let radius = (s * tree.radius + spiral.radial_offset).max(0.0);

    let turn = if index % 2 == 0 { 1.0 } else { -1.0 };
    let angle = base.z.atan2(base.x) + elapsed * spiral.precession * turn;

    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

/// Repel from the ray when formed; pull toward it and orbit around it in chaos.
/// Degenerate directions skip the affected term.
pub fn apply_pointer_force(
    particle: &mut Particle,
    ray: &Ray,
    profile: &InteractionProfile,
    mode: Mode,
    dt: f32,
) {
    let approach = match closest_approach(ray, particle.current) {
        Some(approach) => approach,
        None => return,
    };

    match mode {
        Mode::Formed => {
            if approach.distance_sq >= profile.repel_radius_sq {
                return;
            }
            if let Some(away) = approach.offset.try_normalize() {
                let strength = (profile.repel_radius_sq - approach.distance_sq) * profile.repel_strength * dt;
                particle.current += away.scale(strength);
            }
        }
        Mode::Chaos => {
            let radius = profile.attract_radius;
            if approach.distance_sq >= radius * radius {
                return;
            }
            let dist = approach.distance_sq.sqrt();
            if dist <= MIN_ATTRACT_DISTANCE {
                return;
            }

            // 1 on the ray, 0 at the edge of the influence radius
            let factor = 1.0 - dist / radius;

            let inward = approach.offset.scale(factor * profile.attract_strength * dt / dist);
            particle.current -= inward;

            if let Some(tangent) = ray.direction().cross(&approach.offset).try_normalize() {
                particle.current += tangent.scale(factor * profile.swirl_strength * dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::{generate_field, Category, EaseRate, FieldSpec};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;

    fn tree() -> TreeShape {
        TreeShape::default()
    }

    fn foliage_field(count: usize, seed: u64) -> ParticleField {
        let generated = generate_field(
            &FieldSpec {
                category: Category::Foliage,
                count,
                height: 14.0,
                radius: 5.0,
                chaos_radius: 25.0,
            },
            &mut StdRng::seed_from_u64(seed),
        );
        let profile = Category::Foliage.profile(Category::Foliage.default_interaction());
        ParticleField::new(Category::Foliage, profile, generated)
    }

    fn run(field: &mut ParticleField, mode: Mode, frames: usize, start: f32, ray: Option<Ray>) -> f32 {
        let mut elapsed = start;
        for _ in 0..frames {
            elapsed += DT;
            let ctx = SimulationContext::new(mode, elapsed, DT, ray);
            step_field(field, &ctx, &tree());
        }
        elapsed
    }

    fn max_error(field: &ParticleField, goal: impl Fn(&Particle) -> Vec3) -> f32 {
        field
            .particles()
            .iter()
            .map(|p| p.current.distance(&goal(p)))
            .fold(0.0, f32::max)
    }

    fn distance_to_ray(ray: &Ray, point: Vec3) -> f32 {
        closest_approach(ray, point).unwrap().distance_sq.sqrt()
    }

    #[test]
    fn test_no_drift_at_rest() {
        let mut field = foliage_field(500, 1);
        run(&mut field, Mode::Formed, 600, 0.0, None);
        assert!(max_error(&field, |p| p.target()) < 1e-5);
    }

    #[test]
    fn test_pearls_and_gems_rest_too() {
        for category in [Category::Ornament, Category::Pearl] {
            let generated = generate_field(
                &FieldSpec {
                    category,
                    count: 100,
                    height: 14.0,
                    radius: 5.0,
                    chaos_radius: category.default_chaos_radius(),
                },
                &mut StdRng::seed_from_u64(2),
            );
            let mut field = ParticleField::new(category, category.profile(None), generated);
            run(&mut field, Mode::Formed, 300, 0.0, None);
            assert!(max_error(&field, |p| p.target()) < 1e-5);

            let expected_spin = match category {
                Category::Pearl => 300.0 * DT * 0.05,
                _ => 0.0,
            };
            assert!((field.cloud_rotation() - expected_spin).abs() < 1e-4);
        }
    }

    #[test]
    fn test_output_sway_leaves_state_alone() {
        let mut field = foliage_field(50, 3);
        run(&mut field, Mode::Formed, 30, 1.0, None);
        let elapsed = 1.0 + 30.0 * DT;

        for (i, p) in field.particles().iter().enumerate() {
            assert_eq!(p.current, p.target());
            let expected_y = p.target().y + (elapsed + p.target().x).sin() * 0.05;
            assert!((field.position(i).y - expected_y).abs() < 1e-3);
        }
        assert!(field.cloud_rotation() > 0.0);
    }

    #[test]
    fn test_chaos_has_no_sway_or_spin() {
        let mut field = foliage_field(50, 4);
        run(&mut field, Mode::Chaos, 10, 0.0, None);
        for (i, p) in field.particles().iter().enumerate() {
            assert_eq!(field.position(i), p.current);
        }
        assert_eq!(field.cloud_rotation(), 0.0);
    }

    #[test]
    fn test_chaos_converges() {
        let mut field = foliage_field(300, 5);
        run(&mut field, Mode::Chaos, 600, 0.0, None);
        assert!(max_error(&field, |p| p.chaos_target()) < 1e-3);
    }

    #[test]
    fn test_dust_chaos_converges() {
        let generated = generate_field(
            &FieldSpec {
                category: Category::Dust,
                count: 200,
                height: 14.0,
                radius: 5.0,
                chaos_radius: 25.0,
            },
            &mut StdRng::seed_from_u64(6),
        );
        let mut field = ParticleField::new(Category::Dust, Category::Dust.profile(None), generated);
        run(&mut field, Mode::Chaos, 600, 0.0, None);
        assert!(max_error(&field, |p| p.chaos_target()) < 1e-3);
    }

    #[test]
    fn test_chaos_is_snappier() {
        let mut formed = foliage_field(200, 7);
        let mut chaos = foliage_field(200, 7);
        for p in formed.particles_mut() {
            p.current = p.chaos_target();
        }
        run(&mut formed, Mode::Formed, 20, 0.0, None);
        run(&mut chaos, Mode::Chaos, 20, 0.0, None);

        // Both start the same distance from where they are heading
        let formed_left: f32 = formed.particles().iter().map(|p| p.current.distance(&p.target())).sum();
        let chaos_left: f32 = chaos.particles().iter().map(|p| p.current.distance(&p.chaos_target())).sum();
        assert!(chaos_left < formed_left);
    }

    #[test]
    fn test_toggle_round_trip() {
        let epsilon = 0.05;
        let mut field = foliage_field(1000, 8);

        let mut elapsed = run(&mut field, Mode::Formed, 300, 0.0, None);
        assert!(max_error(&field, |p| p.target()) < epsilon);

        elapsed = run(&mut field, Mode::Chaos, 300, elapsed, None);
        assert!(max_error(&field, |p| p.chaos_target()) < epsilon);

        run(&mut field, Mode::Formed, 300, elapsed, None);
        assert!(max_error(&field, |p| p.target()) < epsilon);
    }

    #[test]
    fn test_formed_repels_chaos_attracts() {
        let profile = Category::Foliage.default_interaction().unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let start = Vec3::new(1.0, 0.0, 0.0);
        let before = distance_to_ray(&ray, start);

        let mut formed = Particle::new(start, start, 1.0);
        apply_pointer_force(&mut formed, &ray, &profile, Mode::Formed, DT);
        assert!(distance_to_ray(&ray, formed.current) > before);
        // Pushed straight out, no tangential component
        assert!(formed.current.y.abs() < 1e-6);

        let mut chaos = Particle::new(start, start, 1.0);
        apply_pointer_force(&mut chaos, &ray, &profile, Mode::Chaos, DT);
        assert!(distance_to_ray(&ray, chaos.current) < before);
        // Swirl moves it around the ray
        assert!(chaos.current.y.abs() > 0.1);
    }

    #[test]
    fn test_force_outside_radius_does_nothing() {
        let profile = Category::Foliage.default_interaction().unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();

        let far_for_repel = Vec3::new(2.0, 0.0, 0.0);
        let mut p = Particle::new(far_for_repel, far_for_repel, 1.0);
        apply_pointer_force(&mut p, &ray, &profile, Mode::Formed, DT);
        assert_eq!(p.current, far_for_repel);

        let far_for_attract = Vec3::new(7.0, 0.0, 0.0);
        let mut p = Particle::new(far_for_attract, far_for_attract, 1.0);
        apply_pointer_force(&mut p, &ray, &profile, Mode::Chaos, DT);
        assert_eq!(p.current, far_for_attract);

        let behind = Vec3::new(0.5, 0.0, 11.0);
        let mut p = Particle::new(behind, behind, 1.0);
        apply_pointer_force(&mut p, &ray, &profile, Mode::Formed, DT);
        assert_eq!(p.current, behind);
    }

    #[test]
    fn test_dust_reaches_further_than_foliage() {
        let foliage = Category::Foliage.default_interaction().unwrap();
        let dust = Category::Dust.default_interaction().unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        // Squared distance 2.5: outside the foliage repel radius, inside the dust one
        let start = Vec3::new(2.5f32.sqrt(), 0.0, 0.0);

        let mut p = Particle::new(start, start, 1.0);
        apply_pointer_force(&mut p, &ray, &foliage, Mode::Formed, DT);
        assert_eq!(p.current, start);

        let mut p = Particle::new(start, start, 1.0);
        apply_pointer_force(&mut p, &ray, &dust, Mode::Formed, DT);
        assert!((p.current.x - (start.x + 0.5 * 3.0 * DT)).abs() < 1e-5);
        assert!(p.current.y.abs() < 1e-6);
        assert!(p.current.z.abs() < 1e-6);
    }

    #[test]
    fn test_dust_attract_and_swirl_in_chaos() {
        let dust = Category::Dust.default_interaction().unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let start = Vec3::new(2.5f32.sqrt(), 0.0, 0.0);
        let factor = 1.0 - start.x / 6.0;

        let mut p = Particle::new(start, start, 1.0);
        apply_pointer_force(&mut p, &ray, &dust, Mode::Chaos, DT);

        // Pulled toward the ray along x, swirled around it along -y
        assert!((start.x - p.current.x - factor * 10.0 * DT).abs() < 1e-5);
        assert!((p.current.y + factor * 20.0 * DT).abs() < 1e-5);
        assert!(p.current.z.abs() < 1e-6);
    }

    #[test]
    fn test_particle_on_ray_is_left_alone() {
        let profile = Category::Dust.default_interaction().unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        for mode in [Mode::Formed, Mode::Chaos] {
            let mut p = Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0);
            apply_pointer_force(&mut p, &ray, &profile, mode, DT);
            assert_eq!(p.current, Vec3::ZERO);
        }
    }

    #[test]
    fn test_bounded_under_random_and_degenerate_rays() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut field = foliage_field(400, 9);
        let targets: Vec<Vec3> = field.particles().iter().map(|p| p.target()).collect();
        let mut elapsed = 0.0;

        for frame in 0..240 {
            elapsed += DT;
            let mode = if frame % 80 < 40 { Mode::Formed } else { Mode::Chaos };

            let ray = match frame % 4 {
                // Straight through a particle
                0 => {
                    let through = targets[frame % targets.len()];
                    Ray::new(through + Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, -1.0))
                }
                // Zero direction never becomes a ray
                1 => Ray::new(Vec3::ZERO, Vec3::ZERO),
                // Origin sitting on a particle
                2 => Ray::new(targets[(frame * 7) % targets.len()], Vec3::UP),
                _ => Ray::new(
                    Vec3::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0)),
                    Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
                ),
            };

            let ctx = SimulationContext::new(mode, elapsed, DT, ray);
            step_field(&mut field, &ctx, &tree());

            assert!(field.positions().iter().all(|v| v.is_finite()));
            assert!(field.particles().iter().all(|p| p.current.is_finite()));
            assert!(field.particles().iter().all(|p| p.current.length() < 100.0));
        }
    }

    #[test]
    fn test_spiral_target_wraps_and_precesses() {
        let spiral = SpiralRise::default();
        let shape = tree();
        let particle = Particle::new(Vec3::new(6.2, -7.0, 0.0), Vec3::ZERO, 0.5);

        let start = spiral_target(&spiral, 0, &particle, 0.0, &shape);
        assert!((start.y + 7.0).abs() < 1e-4);
        assert!((start.x - 6.2).abs() < 1e-3);

        // Height stays inside the wrapped span at any time
        for step in 0..500 {
            let t = step as f32 * 0.37;
            let goal = spiral_target(&spiral, 1, &particle, t, &shape);
            assert!(goal.y >= -9.0 && goal.y < 9.0);
            assert!(goal.is_finite());
        }

        // Even and odd indices turn in opposite directions
        let even = spiral_target(&spiral, 0, &particle, 1.0, &shape);
        let odd = spiral_target(&spiral, 1, &particle, 1.0, &shape);
        assert!(even.z > 0.0);
        assert!(odd.z < 0.0);
    }

    #[test]
    fn test_spiral_with_flat_tree_is_finite() {
        let spiral = SpiralRise::default();
        let flat = TreeShape { height: 0.0, radius: 0.0 };
        let particle = Particle::new(Vec3::new(1.2, 0.0, 0.0), Vec3::ZERO, 0.4);
        for step in 0..100 {
            let goal = spiral_target(&spiral, step, &particle, step as f32 * 0.5, &flat);
            assert!(goal.is_finite());
        }
    }

    #[test]
    fn test_spiral_uses_formed_rate_horizontally() {
        let spiral = SpiralRise::default();
        let shape = tree();
        let ctx = SimulationContext::new(Mode::Formed, DT, DT, None);
        let start = Vec3::new(10.0, -5.0, 4.0);

        let mut particle = Particle::new(Vec3::new(3.0, -2.0, 1.0), Vec3::ZERO, 0.5);
        particle.current = start;
        let goal = spiral_target(&spiral, 0, &particle, DT, &shape);

        let mut held = Category::Dust.profile(None);
        held.formed_rate = EaseRate::Fixed(0.0);
        let mut still = particle.clone();
        step_particle(0, &mut still, &held, &ctx, &shape);
        assert_eq!(still.current.x, start.x);
        assert_eq!(still.current.z, start.z);
        assert!((still.current.y - (start.y + (goal.y - start.y) * 5.0 * DT)).abs() < 1e-5);

        let dust = Category::Dust.profile(None);
        let mut moving = particle.clone();
        step_particle(0, &mut moving, &dust, &ctx, &shape);
        assert!((moving.current.x - (start.x + (goal.x - start.x) * 2.0 * DT)).abs() < 1e-5);
        assert!((moving.current.z - (start.z + (goal.z - start.z) * 2.0 * DT)).abs() < 1e-5);
        assert_eq!(moving.current.y, still.current.y);
    }

    #[test]
    fn test_dust_follows_moving_target_when_formed() {
        let generated = generate_field(
            &FieldSpec {
                category: Category::Dust,
                count: 100,
                height: 14.0,
                radius: 5.0,
                chaos_radius: 25.0,
            },
            &mut StdRng::seed_from_u64(10),
        );
        let mut field = ParticleField::new(Category::Dust, Category::Dust.profile(None), generated);
        let before: Vec<Vec3> = field.particles().iter().map(|p| p.current).collect();
        run(&mut field, Mode::Formed, 60, 0.0, None);

        let moved = field
            .particles()
            .iter()
            .zip(&before)
            .filter(|(p, b)| p.current.distance(b) > 0.05)
            .count();
        assert!(moved > 90);
    }
}
