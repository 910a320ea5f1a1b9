//! Camera rig steered by the hand position
//!
//! With a hand in view the camera orbits to the angle and height the hand
//! points at; otherwise it drifts around the tree on its own. Either way it
//! eases toward the goal and always looks at the origin.

use std::f32::consts::{PI, TAU};
use crate::interaction::CameraState;
use crate::math::{ease_factor, Vec3};
use super::mode::GestureSignal;

/// Orbit radius around the tree
const ORBIT_RADIUS: f32 = 20.0;

/// Resting camera height
const BASE_HEIGHT: f32 = 4.0;

/// Height swing across the full vertical hand range
const HEIGHT_RANGE: f32 = 10.0;

/// Angular speed of the idle orbit, rad/s
const AUTO_ORBIT_SPEED: f32 = 0.1;

/// How quickly the camera closes on its goal, per second
const FOLLOW_RATE: f32 = 2.0;

const FOV_DEGREES: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    position: Vec3,
    look_at: Vec3,
    fov_y: f32,
    aspect: f32,
}

impl CameraRig {
    pub fn new(width: f32, height: f32) -> Self {
        let mut rig = Self {
            position: Vec3::new(0.0, BASE_HEIGHT, ORBIT_RADIUS),
            look_at: Vec3::ZERO,
            fov_y: FOV_DEGREES * PI / 180.0,
            aspect: 1.0,
        };
        rig.set_aspect(width, height);
        rig
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Keeps the previous aspect when the viewport is degenerate
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Where the camera wants to be this frame
    pub fn goal(&self, gesture: &GestureSignal, elapsed: f32) -> Vec3 {
        if gesture.is_detected {
            let hand = gesture.hand_position;
            let angle = (hand.x - 0.5) * TAU;
            let height = BASE_HEIGHT - (hand.y - 0.5) * HEIGHT_RANGE;
            Vec3::new(angle.sin() * ORBIT_RADIUS, height, angle.cos() * ORBIT_RADIUS)
        } else {
            let angle = elapsed * AUTO_ORBIT_SPEED;
            Vec3::new(angle.sin() * ORBIT_RADIUS, BASE_HEIGHT, angle.cos() * ORBIT_RADIUS)
        }
    }

    pub fn update(&mut self, gesture: &GestureSignal, elapsed: f32, dt: f32) {
        let goal = self.goal(gesture, elapsed);
        self.position = self.position.lerp(&goal, ease_factor(FOLLOW_RATE, dt));
    }

    /// Snapshot handed to the probe and the renderer
    pub fn state(&self) -> CameraState {
        CameraState {
            eye: self.position,
            target: self.look_at,
            up: Vec3::UP,
            fov_y: self.fov_y,
            aspect: self.aspect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_starts_in_front_of_tree() {
        let rig = CameraRig::new(800.0, 400.0);
        assert_eq!(rig.position(), Vec3::new(0.0, 4.0, 20.0));
        assert_eq!(rig.aspect(), 2.0);
        assert!((rig.state().fov_y - 50f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_resize_is_ignored() {
        let mut rig = CameraRig::new(800.0, 400.0);
        rig.set_aspect(0.0, 0.0);
        rig.set_aspect(f32::NAN, 100.0);
        assert_eq!(rig.aspect(), 2.0);
    }

    #[test]
    fn test_follows_hand() {
        let mut rig = CameraRig::new(1.0, 1.0);
        // Hand at the right edge, near the top: a half turn around, above the base height
        let gesture = GestureSignal::detected("None", 1.0, 0.0);

        let goal = rig.goal(&gesture, 0.0);
        assert!(goal.x.abs() < 1e-4);
        assert!((goal.z + 20.0).abs() < 1e-4);
        assert!((goal.y - 9.0).abs() < 1e-6);

        for _ in 0..600 {
            rig.update(&gesture, 0.0, DT);
        }
        assert!(rig.position().distance(&goal) < 1e-3);
    }

    #[test]
    fn test_auto_orbits_without_hand() {
        let rig = CameraRig::new(1.0, 1.0);
        let idle = GestureSignal::default();
        let goal = rig.goal(&idle, 10.0);
        assert!((goal.x - 1f32.sin() * 20.0).abs() < 1e-4);
        assert!((goal.z - 1f32.cos() * 20.0).abs() < 1e-4);
        assert_eq!(goal.y, 4.0);
    }

    #[test]
    fn test_state_looks_at_origin() {
        let rig = CameraRig::new(1.0, 1.0);
        let state = rig.state();
        let (forward, _, _) = state.basis().unwrap();
        assert!(forward.distance(&Vec3::new(0.0, -4.0, -20.0).try_normalize().unwrap()) < 1e-5);
    }
}
