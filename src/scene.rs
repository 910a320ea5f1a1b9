//! The whole tree: every particle field, the mode controller, the camera,
//! and the per-frame step that ties them together.

use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::config::SceneConfig;
use crate::interaction::{pixel_to_ndc, ray_from_pointer, Ray};
use crate::math::Vec3;
use crate::particles::{generate_field, Category, FieldSpec, ParticleField};
use crate::simulation::{
    step_field, CameraRig, GemInstances, GestureSignal, Mode, ModeController, SimulationContext,
    StarTopper,
};

/// Longest frame the simulation will take in one step, in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

pub struct TreeScene {
    config: SceneConfig,
    foliage: ParticleField,
    dust: ParticleField,
    ornaments: ParticleField,
    gems: GemInstances,
    pearls: ParticleField,
    star: StarTopper,
    controller: ModeController,
    camera: CameraRig,
    /// Pointer in normalized device coordinates, if it is over the canvas
    pointer: Option<(f32, f32)>,
    viewport: (f32, f32),
    elapsed: f32,
}

impl TreeScene {
    /// Generate every field from the configuration
    pub fn new(config: SceneConfig, width: f32, height: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut build = |category: Category| {
            let spec = FieldSpec {
                category,
                count: config.count(category),
                height: config.tree.height,
                radius: config.tree.radius,
                chaos_radius: config.chaos_radius(category),
            };
            let generated = generate_field(&spec, &mut rng);
            let profile = category.profile(config.interaction(category));
            ParticleField::new(category, profile, generated)
        };

        let foliage = build(Category::Foliage);
        let dust = build(Category::Dust);
        let ornaments = build(Category::Ornament);
        let pearls = build(Category::Pearl);

        log::info!(
            "tree scene built: {} foliage, {} dust, {} ornaments, {} pearls (seed {})",
            foliage.len(),
            dust.len(),
            ornaments.len(),
            pearls.len(),
            config.seed
        );

        let gems = GemInstances::new(&ornaments);
        let star = StarTopper::new(config.tree.height);

        Self {
            foliage,
            dust,
            ornaments,
            gems,
            pearls,
            star,
            controller: ModeController::default(),
            camera: CameraRig::new(width, height),
            pointer: None,
            viewport: (width, height),
            elapsed: 0.0,
            config,
        }
    }

    pub fn from_yaml(yaml: &str, width: f32, height: f32) -> Result<Self, String> {
        let config = SceneConfig::from_yaml(yaml)?;
        Ok(Self::new(config, width, height))
    }

    /// Simulate one frame of `dt` seconds.
    ///
    /// Non-finite or negative deltas count as zero; long frames are clamped.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DELTA) } else { 0.0 };
        self.elapsed += dt;

        self.camera.update(self.controller.gesture(), self.elapsed, dt);

        let ctx = SimulationContext::new(self.controller.mode(), self.elapsed, dt, self.pointer_ray());
        let offset = self.config.group_offset;
        let tree = self.config.tree;

        let foliage_ctx = ctx.localized(offset, self.foliage.cloud_rotation());
        step_field(&mut self.foliage, &foliage_ctx, &tree);

        let dust_ctx = ctx.localized(offset, self.dust.cloud_rotation());
        step_field(&mut self.dust, &dust_ctx, &tree);

        let gem_ctx = ctx.localized(offset, self.ornaments.cloud_rotation());
        self.gems.hover(&mut self.ornaments, &gem_ctx);
        step_field(&mut self.ornaments, &gem_ctx, &tree);
        self.gems.update(&self.ornaments, &gem_ctx);

        let pearl_ctx = ctx.localized(offset, self.pearls.cloud_rotation());
        step_field(&mut self.pearls, &pearl_ctx, &tree);

        self.star.update(&ctx.without_ray());
    }

    /// World-space pointer ray for this frame
    pub fn pointer_ray(&self) -> Option<Ray> {
        let pointer = self.pointer?;
        ray_from_pointer(pointer, &self.camera.state())
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.controller.toggle()
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        self.controller.set_mode(mode)
    }

    pub fn push_gesture(&mut self, signal: GestureSignal) -> Option<Mode> {
        self.controller.apply_gesture(signal)
    }

    pub fn lose_hand(&mut self) {
        self.controller.lose_hand();
    }

    pub fn gesture_unavailable(&mut self, reason: &str) {
        self.controller.mark_unavailable(reason);
    }

    /// Pointer in normalized device coordinates, or `None` when it left the canvas
    pub fn set_pointer(&mut self, ndc: Option<(f32, f32)>) {
        self.pointer = ndc.filter(|(x, y)| x.is_finite() && y.is_finite());
    }

    /// Pointer in canvas pixels, origin top-left
    pub fn set_pointer_px(&mut self, x: f32, y: f32) {
        let (width, height) = self.viewport;
        if width > 0.0 && height > 0.0 {
            self.set_pointer(Some(pixel_to_ndc(x, y, width, height)));
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn field(&self, category: Category) -> &ParticleField {
        match category {
            Category::Foliage => &self.foliage,
            Category::Dust => &self.dust,
            Category::Ornament => &self.ornaments,
            Category::Pearl => &self.pearls,
        }
    }

    pub fn gems(&self) -> &GemInstances {
        &self.gems
    }

    pub fn star(&self) -> &StarTopper {
        &self.star
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn group_offset(&self) -> Vec3 {
        self.config.group_offset
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
