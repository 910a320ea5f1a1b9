pub mod scene_config;

pub use scene_config::{CategoryOverrides, SceneConfig, TreeShape, MAX_CATEGORY_COUNT};
