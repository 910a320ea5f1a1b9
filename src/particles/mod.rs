//! Particle categories, generation, and storage

pub mod category;
pub mod field;
pub mod generator;
pub mod palette;
pub mod particle;

pub use category::{Category, EaseRate, FormedTarget, InteractionProfile, MotionProfile, SpiralRise};
pub use field::ParticleField;
pub use generator::{generate_field, sample_chaos_position, FieldSpec, GeneratedField};
pub use particle::Particle;
