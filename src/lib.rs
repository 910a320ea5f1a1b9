use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod frame_loop;
pub mod interaction;
pub mod math;
pub mod particles;
pub mod scene;
pub mod simulation;

use config::SceneConfig;
use frame_loop::FrameLoop;
use particles::{Category, ParticleField};
use scene::TreeScene;
use simulation::{GestureSignal, HandPosition, Mode};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info).ok();
}

/// Holiday tree engine exposed to JavaScript
///
/// The host renders; this handle simulates and hands back buffers. Positions
/// are in the content group's frame (see `group_offset`), and the foliage and
/// pearl clouds additionally carry their own Y rotation.
#[wasm_bindgen]
pub struct HolidayTree {
    scene: Rc<RefCell<TreeScene>>,
    frame_loop: FrameLoop,
}

#[wasm_bindgen]
impl HolidayTree {
    /// Create a tree with the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> HolidayTree {
        Self::from_scene(TreeScene::new(SceneConfig::default(), width, height))
    }

    /// Create a tree from a YAML configuration
    #[wasm_bindgen]
    pub fn with_config(yaml: &str, width: f32, height: f32) -> Result<HolidayTree, JsValue> {
        let scene = TreeScene::from_yaml(yaml, width, height)
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(Self::from_scene(scene))
    }

    // === Mode ===

    /// Flip between formed and chaos; returns the new mode name
    #[wasm_bindgen]
    pub fn toggle_mode(&mut self) -> String {
        self.scene.borrow_mut().toggle_mode().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn set_chaos(&mut self, chaos: bool) {
        let mode = if chaos { Mode::Chaos } else { Mode::Formed };
        self.scene.borrow_mut().set_mode(mode);
    }

    /// "FORMED" or "CHAOS"
    #[wasm_bindgen]
    pub fn mode(&self) -> String {
        self.scene.borrow().mode().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn is_chaos(&self) -> bool {
        self.scene.borrow().mode().is_chaos()
    }

    // === Gesture input ===

    /// Latest recognizer output. Hand position is normalized to [0, 1].
    #[wasm_bindgen]
    pub fn push_gesture(&mut self, label: &str, x: f32, y: f32, is_detected: bool) {
        let signal = GestureSignal {
            label: label.to_string(),
            hand_position: HandPosition::new(x, y),
            is_detected,
        };
        self.scene.borrow_mut().push_gesture(signal);
    }

    /// The webcam or gesture model failed; fall back to manual control
    #[wasm_bindgen]
    pub fn gesture_unavailable(&mut self, reason: &str) {
        self.scene.borrow_mut().gesture_unavailable(reason);
    }

    /// The recognizer lost the hand. Mode and last position are kept.
    #[wasm_bindgen]
    pub fn lose_hand(&mut self) {
        self.scene.borrow_mut().lose_hand();
    }

    /// False once `gesture_unavailable` has been reported
    #[wasm_bindgen]
    pub fn is_gesture_available(&self) -> bool {
        self.scene.borrow().controller().is_gesture_available()
    }

    #[wasm_bindgen]
    pub fn gesture_label(&self) -> String {
        self.scene.borrow().controller().gesture().label.clone()
    }

    #[wasm_bindgen]
    pub fn is_hand_detected(&self) -> bool {
        self.scene.borrow().controller().gesture().is_detected
    }

    // === Pointer and viewport ===

    /// Handle mouse move, in canvas pixels
    #[wasm_bindgen]
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        self.scene.borrow_mut().set_pointer_px(x, y);
    }

    #[wasm_bindgen]
    pub fn set_pointer_ndc(&mut self, x: f32, y: f32) {
        self.scene.borrow_mut().set_pointer(Some((x, y)));
    }

    /// Pointer left the canvas
    #[wasm_bindgen]
    pub fn clear_pointer(&mut self) {
        self.scene.borrow_mut().set_pointer(None);
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene.borrow_mut().resize(width, height);
    }

    // === Frame driving ===

    /// Advance the simulation by `dt` seconds
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32) {
        self.scene.borrow_mut().step(dt);
    }

    /// Drive the simulation from requestAnimationFrame. `callback` runs after
    /// each step with the frame delta in seconds.
    #[wasm_bindgen]
    pub fn start_loop(&mut self, callback: Option<js_sys::Function>) -> Result<(), JsValue> {
        self.frame_loop
            .start(self.scene.clone(), callback)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen]
    pub fn stop_loop(&mut self) {
        self.frame_loop.stop();
    }

    #[wasm_bindgen]
    pub fn is_loop_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    #[wasm_bindgen]
    pub fn elapsed(&self) -> f32 {
        self.scene.borrow().elapsed()
    }

    // === Foliage ===

    #[wasm_bindgen]
    pub fn foliage_count(&self) -> usize {
        self.read_field(Category::Foliage, |f| f.len())
    }

    #[wasm_bindgen]
    pub fn foliage_positions(&self) -> Vec<f32> {
        self.read_field(Category::Foliage, |f| f.positions().to_vec())
    }

    /// Linear RGB, 3 floats per particle
    #[wasm_bindgen]
    pub fn foliage_colors(&self) -> Vec<f32> {
        self.read_field(Category::Foliage, |f| f.colors().to_vec())
    }

    #[wasm_bindgen]
    pub fn foliage_sizes(&self) -> Vec<f32> {
        self.read_field(Category::Foliage, |f| f.sizes().to_vec())
    }

    /// Y rotation of the foliage cloud in radians
    #[wasm_bindgen]
    pub fn foliage_rotation(&self) -> f32 {
        self.read_field(Category::Foliage, |f| f.cloud_rotation())
    }

    // === Dust ===

    #[wasm_bindgen]
    pub fn dust_count(&self) -> usize {
        self.read_field(Category::Dust, |f| f.len())
    }

    #[wasm_bindgen]
    pub fn dust_positions(&self) -> Vec<f32> {
        self.read_field(Category::Dust, |f| f.positions().to_vec())
    }

    #[wasm_bindgen]
    pub fn dust_colors(&self) -> Vec<f32> {
        self.read_field(Category::Dust, |f| f.colors().to_vec())
    }

    #[wasm_bindgen]
    pub fn dust_sizes(&self) -> Vec<f32> {
        self.read_field(Category::Dust, |f| f.sizes().to_vec())
    }

    /// Blink phase per particle, for the point shader
    #[wasm_bindgen]
    pub fn dust_phases(&self) -> Vec<f32> {
        self.read_field(Category::Dust, |f| f.phases().to_vec())
    }

    // === Gems ===

    #[wasm_bindgen]
    pub fn gem_count(&self) -> usize {
        self.read_field(Category::Ornament, |f| f.len())
    }

    #[wasm_bindgen]
    pub fn gem_positions(&self) -> Vec<f32> {
        self.read_field(Category::Ornament, |f| f.positions().to_vec())
    }

    /// Euler angles, 3 per gem
    #[wasm_bindgen]
    pub fn gem_rotations(&self) -> Vec<f32> {
        self.scene.borrow().gems().rotations().to_vec()
    }

    #[wasm_bindgen]
    pub fn gem_scales(&self) -> Vec<f32> {
        self.scene.borrow().gems().scales().to_vec()
    }

    /// Palette colors with the hover shimmer applied
    #[wasm_bindgen]
    pub fn gem_colors(&self) -> Vec<f32> {
        self.scene.borrow().gems().colors().to_vec()
    }

    // === Pearls ===

    #[wasm_bindgen]
    pub fn pearl_count(&self) -> usize {
        self.read_field(Category::Pearl, |f| f.len())
    }

    #[wasm_bindgen]
    pub fn pearl_positions(&self) -> Vec<f32> {
        self.read_field(Category::Pearl, |f| f.positions().to_vec())
    }

    #[wasm_bindgen]
    pub fn pearl_sizes(&self) -> Vec<f32> {
        self.read_field(Category::Pearl, |f| f.sizes().to_vec())
    }

    #[wasm_bindgen]
    pub fn pearl_rotation(&self) -> f32 {
        self.read_field(Category::Pearl, |f| f.cloud_rotation())
    }

    // === Star, camera, group ===

    /// Star position then Euler rotation, 6 floats
    #[wasm_bindgen]
    pub fn star_transform(&self) -> Vec<f32> {
        self.scene.borrow().star().transform().to_vec()
    }

    #[wasm_bindgen]
    pub fn camera_position(&self) -> Vec<f32> {
        self.scene.borrow().camera().position().to_array().to_vec()
    }

    /// Column-major view matrix
    #[wasm_bindgen]
    pub fn view_matrix(&self) -> Vec<f32> {
        self.scene.borrow().camera().state().view_matrix().as_slice().to_vec()
    }

    /// Column-major projection matrix
    #[wasm_bindgen]
    pub fn projection_matrix(&self) -> Vec<f32> {
        self.scene.borrow().camera().state().projection_matrix().as_slice().to_vec()
    }

    /// World offset of the content group
    #[wasm_bindgen]
    pub fn group_offset(&self) -> Vec<f32> {
        self.scene.borrow().group_offset().to_array().to_vec()
    }
}

impl HolidayTree {
    fn from_scene(scene: TreeScene) -> HolidayTree {
        Self {
            scene: Rc::new(RefCell::new(scene)),
            frame_loop: FrameLoop::new(),
        }
    }

    fn read_field<T>(&self, category: Category, read: impl FnOnce(&ParticleField) -> T) -> T {
        read(self.scene.borrow().field(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> HolidayTree {
        HolidayTree::with_config(
            "foliage: { count: 200 }\ndust: { count: 40 }\nornaments: { count: 12 }\npearls: { count: 16 }\n",
            640.0,
            480.0,
        )
        .unwrap()
    }

    #[test]
    fn test_buffers_match_counts() {
        let tree = small_tree();
        assert_eq!(tree.foliage_positions().len(), tree.foliage_count() * 3);
        assert_eq!(tree.foliage_colors().len(), 200 * 3);
        assert_eq!(tree.dust_phases().len(), 40);
        assert_eq!(tree.gem_rotations().len(), 12 * 3);
        assert_eq!(tree.gem_colors().len(), 12 * 3);
        assert_eq!(tree.pearl_positions().len(), 16 * 3);
        assert_eq!(tree.star_transform().len(), 6);
        assert_eq!(tree.view_matrix().len(), 16);
        assert_eq!(tree.group_offset(), vec![0.0, -2.0, 0.0]);
    }

    #[test]
    fn test_mode_controls() {
        let mut tree = small_tree();
        assert_eq!(tree.mode(), "FORMED");
        assert_eq!(tree.toggle_mode(), "CHAOS");
        assert!(tree.is_chaos());
        tree.set_chaos(false);
        assert_eq!(tree.mode(), "FORMED");

        tree.push_gesture("Open_Palm", 0.4, 0.6, true);
        assert!(tree.is_chaos());
        assert!(tree.is_hand_detected());

        tree.push_gesture("Closed_Fist", 0.4, 0.6, false);
        assert!(tree.is_chaos());
        assert_eq!(tree.gesture_label(), "Closed_Fist");
    }

    #[test]
    fn test_hand_loss_and_unavailable_input() {
        let mut tree = small_tree();
        assert!(tree.is_gesture_available());

        tree.push_gesture("Open_Palm", 0.2, 0.8, true);
        tree.lose_hand();
        assert!(!tree.is_hand_detected());
        assert!(tree.is_chaos());
        assert_eq!(tree.gesture_label(), "Open_Palm");

        tree.gesture_unavailable("no camera");
        assert!(!tree.is_gesture_available());
        tree.push_gesture("Closed_Fist", 0.5, 0.5, true);
        assert!(!tree.is_hand_detected());
        assert!(tree.is_chaos());
        assert_eq!(tree.toggle_mode(), "FORMED");
    }

    #[test]
    fn test_step_moves_clock() {
        let mut tree = small_tree();
        tree.on_mouse_move(320.0, 240.0);
        tree.step(0.05);
        tree.clear_pointer();
        tree.step(0.05);
        assert!((tree.elapsed() - 0.1).abs() < 1e-6);
        assert!(tree.foliage_rotation() > 0.0);
    }
}
