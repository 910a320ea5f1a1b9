use crate::math::{lerp, Vec3};

/// Strength below which a hover excitation is treated as gone
const STRENGTH_FLOOR: f32 = 0.001;

/// How fast a hover excitation fades, per second
const STRENGTH_DECAY_RATE: f32 = 4.0;

/// A single tracked particle with its two fixed destinations
///
/// The formed and chaos targets are set once at generation; only `current`
/// and `interaction_strength` change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    target: Vec3,
    chaos_target: Vec3,
    pub current: Vec3,
    speed: f32,
    phase: f32,
    pub interaction_strength: f32,
}

impl Particle {
    /// New particle resting at its formed position
    pub fn new(target: Vec3, chaos_target: Vec3, speed: f32) -> Self {
        Self {
            target,
            chaos_target,
            current: target,
            speed,
            phase: 0.0,
            interaction_strength: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn chaos_target(&self) -> Vec3 {
        self.chaos_target
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Move `current` a fraction of the way to `destination`
    pub fn ease_toward(&mut self, destination: Vec3, factor: f32) {
        self.current = self.current.lerp(&destination, factor);
    }

    /// Full hover excitation
    pub fn excite(&mut self) {
        self.interaction_strength = 1.0;
    }

    /// Exponential fade of the hover excitation toward zero
    pub fn decay_strength(&mut self, dt: f32) {
        if self.interaction_strength > STRENGTH_FLOOR {
            let t = crate::math::ease_factor(STRENGTH_DECAY_RATE, dt);
            self.interaction_strength = lerp(self.interaction_strength, 0.0, t);
        } else {
            self.interaction_strength = 0.0;
        }
    }
}
