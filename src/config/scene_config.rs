use serde::{Deserialize, Serialize};
use crate::math::Vec3;
use crate::particles::category::{Category, InteractionProfile};

/// Largest particle count accepted for any single category
pub const MAX_CATEGORY_COUNT: usize = 1_000_000;

/// Overall tree dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    pub height: f32,
    pub radius: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 14.0,
            radius: 5.0,
        }
    }
}

/// Optional per-category overrides; anything left out falls back to the
/// category's built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOverrides {
    pub count: Option<usize>,
    pub chaos_radius: Option<f32>,
    pub interaction: Option<InteractionProfile>,
}

/// Startup configuration for the whole scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for the particle field generator
    pub seed: u64,
    pub tree: TreeShape,
    /// Offset of the content group in world space
    pub group_offset: Vec3,
    pub foliage: CategoryOverrides,
    pub dust: CategoryOverrides,
    pub ornaments: CategoryOverrides,
    pub pearls: CategoryOverrides,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 2024,
            tree: TreeShape::default(),
            group_offset: Vec3::new(0.0, -2.0, 0.0),
            foliage: CategoryOverrides::default(),
            dust: CategoryOverrides::default(),
            ornaments: CategoryOverrides::default(),
            pearls: CategoryOverrides::default(),
        }
    }
}

impl SceneConfig {
    /// Parse from YAML string. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: SceneConfig = serde_yaml::from_str(yaml)
            .map_err(|e| format!("YAML parse error: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| format!("YAML write error: {}", e))
    }

    /// Same configuration with every category count replaced
    pub fn with_counts(mut self, foliage: usize, dust: usize, ornaments: usize, pearls: usize) -> Self {
        self.foliage.count = Some(foliage);
        self.dust.count = Some(dust);
        self.ornaments.count = Some(ornaments);
        self.pearls.count = Some(pearls);
        self
    }

    fn overrides(&self, category: Category) -> &CategoryOverrides {
        match category {
            Category::Foliage => &self.foliage,
            Category::Dust => &self.dust,
            Category::Ornament => &self.ornaments,
            Category::Pearl => &self.pearls,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.overrides(category)
            .count
            .unwrap_or_else(|| category.default_count())
    }

    pub fn chaos_radius(&self, category: Category) -> f32 {
        self.overrides(category)
            .chaos_radius
            .unwrap_or_else(|| category.default_chaos_radius())
    }

    pub fn interaction(&self, category: Category) -> Option<InteractionProfile> {
        self.overrides(category)
            .interaction
            .or_else(|| category.default_interaction())
    }

    /// Reject values that would put non-finite numbers into the particle buffers.
    /// Zero sizes are allowed and produce a collapsed tree.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tree.height.is_finite() || self.tree.height < 0.0 {
            return Err(format!("tree.height must be finite and non-negative, got {}", self.tree.height));
        }
        if !self.tree.radius.is_finite() || self.tree.radius < 0.0 {
            return Err(format!("tree.radius must be finite and non-negative, got {}", self.tree.radius));
        }
        if !self.group_offset.is_finite() {
            return Err("group_offset must be finite".to_string());
        }

        for category in Category::ALL {
            let count = self.count(category);
            if count > MAX_CATEGORY_COUNT {
                return Err(format!(
                    "{}.count {} exceeds the limit of {}",
                    category.name(),
                    count,
                    MAX_CATEGORY_COUNT
                ));
            }

            let radius = self.chaos_radius(category);
            if !radius.is_finite() || radius < 0.0 {
                return Err(format!(
                    "{}.chaos_radius must be finite and non-negative, got {}",
                    category.name(),
                    radius
                ));
            }

            if let Some(interaction) = self.overrides(category).interaction {
                interaction
                    .validate()
                    .map_err(|e| format!("{}.{}", category.name(), e))?;
            }
        }

        Ok(())
    }
}
