//! Per-category motion strategy
//!
//! Every particle category shares the same dual-target shape. What differs
//! is captured here as data: how fast each mode eases, whether the formed
//! target is static or moving, which pointer force applies, and the
//! output-only sway and cloud spin.

use serde::{Deserialize, Serialize};

/// The particle categories that make up the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Foliage,
    Dust,
    Ornament,
    Pearl,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Foliage,
        Category::Dust,
        Category::Ornament,
        Category::Pearl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Foliage => "foliage",
            Category::Dust => "dust",
            Category::Ornament => "ornaments",
            Category::Pearl => "pearls",
        }
    }

    pub fn default_count(&self) -> usize {
        match self {
            Category::Foliage => 28_000,
            Category::Dust => 1_200,
            Category::Ornament => 200,
            Category::Pearl => 150,
        }
    }

    /// Radius of the sphere the chaos positions fill
    pub fn default_chaos_radius(&self) -> f32 {
        match self {
            Category::Foliage | Category::Dust => 25.0,
            Category::Ornament => 30.0,
            Category::Pearl => 20.0,
        }
    }

    pub fn default_interaction(&self) -> Option<InteractionProfile> {
        match self {
            Category::Foliage => Some(InteractionProfile {
                repel_radius_sq: 2.0,
                repel_strength: 2.0,
                attract_radius: 6.0,
                attract_strength: 15.0,
                swirl_strength: 30.0,
            }),
            Category::Dust => Some(InteractionProfile {
                repel_radius_sq: 3.0,
                repel_strength: 3.0,
                attract_radius: 6.0,
                attract_strength: 10.0,
                swirl_strength: 20.0,
            }),
            // Gems react through the hover hit-test, pearls not at all
            Category::Ornament | Category::Pearl => None,
        }
    }

    /// Built-in motion profile, with the interaction tunables supplied by the caller
    pub fn profile(&self, interaction: Option<InteractionProfile>) -> MotionProfile {
        match self {
            Category::Foliage => MotionProfile {
                formed_rate: EaseRate::PerSpeed(1.5),
                chaos_rate: EaseRate::PerSpeed(3.0),
                formed_target: FormedTarget::Static,
                output_sway: 0.05,
                cloud_spin: 0.05,
                interaction,
            },
            Category::Dust => MotionProfile {
                formed_rate: EaseRate::Fixed(2.0),
                chaos_rate: EaseRate::Fixed(2.0),
                formed_target: FormedTarget::SpiralRise(SpiralRise::default()),
                output_sway: 0.0,
                cloud_spin: 0.0,
                interaction,
            },
            Category::Ornament => MotionProfile {
                formed_rate: EaseRate::PerSpeed(1.0),
                chaos_rate: EaseRate::PerSpeed(2.0),
                formed_target: FormedTarget::Static,
                output_sway: 0.0,
                cloud_spin: 0.0,
                interaction,
            },
            Category::Pearl => MotionProfile {
                formed_rate: EaseRate::PerSpeed(0.5),
                chaos_rate: EaseRate::PerSpeed(1.0),
                formed_target: FormedTarget::Static,
                output_sway: 0.0,
                cloud_spin: 0.05,
                interaction,
            },
        }
    }
}

/// How quickly `current` closes the gap to its target each second
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EaseRate {
    /// Rate independent of the particle
    Fixed(f32),
    /// Rate multiplied by the particle's own speed
    PerSpeed(f32),
}

impl EaseRate {
    /// Clamped lerp factor for one frame
    pub fn factor(&self, speed: f32, dt: f32) -> f32 {
        let rate = match *self {
            EaseRate::Fixed(rate) => rate,
            EaseRate::PerSpeed(rate) => rate * speed,
        };
        crate::math::ease_factor(rate, dt)
    }
}

/// Parameters of the rising, precessing spiral the dust follows when formed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralRise {
    /// Multiplier on particle speed for the vertical climb
    pub rise: f32,
    /// Extra height above the tree the spiral travels before wrapping
    pub headroom: f32,
    /// Distance kept outside the foliage surface
    pub radial_offset: f32,
    /// Angular speed in rad/s; even particles turn one way, odd the other
    pub precession: f32,
    /// Ease rate for height. The horizontal rate is the profile's `formed_rate`.
    pub vertical_ease: f32,
}

impl Default for SpiralRise {
    fn default() -> Self {
        Self {
            rise: 0.5,
            headroom: 4.0,
            radial_offset: 1.2,
            precession: 0.2,
            vertical_ease: 5.0,
        }
    }
}

/// Where a particle heads while the tree is formed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormedTarget {
    Static,
    SpiralRise(SpiralRise),
}

/// Pointer force tunables. `repel_radius_sq` is compared against the
/// squared ray distance directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionProfile {
    pub repel_radius_sq: f32,
    pub repel_strength: f32,
    pub attract_radius: f32,
    pub attract_strength: f32,
    pub swirl_strength: f32,
}

impl InteractionProfile {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("repel_radius_sq", self.repel_radius_sq),
            ("repel_strength", self.repel_strength),
            ("attract_radius", self.attract_radius),
            ("attract_strength", self.attract_strength),
            ("swirl_strength", self.swirl_strength),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("interaction.{} must be a finite, non-negative number", name));
            }
        }
        Ok(())
    }
}

/// Complete motion strategy for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// Ease toward the formed target; a spiral target uses it horizontally
    pub formed_rate: EaseRate,
    pub chaos_rate: EaseRate,
    pub formed_target: FormedTarget,
    /// Amplitude of the vertical wobble added to the output buffer only
    pub output_sway: f32,
    /// Spin of the whole cloud about Y while formed, rad/s
    pub cloud_spin: f32,
    pub interaction: Option<InteractionProfile>,
}
