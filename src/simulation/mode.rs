//! Formed/chaos mode and the gesture signal that can force it

/// Gesture label that scatters the tree
pub const OPEN_PALM: &str = "Open_Palm";

/// Gesture label that gathers the tree back together
pub const CLOSED_FIST: &str = "Closed_Fist";

/// Which configuration the particles are heading for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Formed,
    Chaos,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Formed => Mode::Chaos,
            Mode::Chaos => Mode::Formed,
        }
    }

    pub fn is_chaos(self) -> bool {
        self == Mode::Chaos
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Formed => "FORMED",
            Mode::Chaos => "CHAOS",
        }
    }
}

/// Hand position normalized to the video frame, x mirrored for the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPosition {
    pub x: f32,
    pub y: f32,
}

impl HandPosition {
    pub const CENTER: HandPosition = HandPosition { x: 0.5, y: 0.5 };

    /// Clamp into [0, 1]; non-finite coordinates fall back to the center
    pub fn new(x: f32, y: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            x: sanitize(x),
            y: sanitize(y),
        }
    }
}

/// Latest output of the gesture recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSignal {
    pub label: String,
    pub hand_position: HandPosition,
    pub is_detected: bool,
}

impl Default for GestureSignal {
    fn default() -> Self {
        Self {
            label: "None".to_string(),
            hand_position: HandPosition::CENTER,
            is_detected: false,
        }
    }
}

impl GestureSignal {
    pub fn detected(label: &str, x: f32, y: f32) -> Self {
        Self {
            label: label.to_string(),
            hand_position: HandPosition::new(x, y),
            is_detected: true,
        }
    }

    /// The mode this signal forces, if any
    pub fn forced_mode(&self) -> Option<Mode> {
        if !self.is_detected {
            return None;
        }
        match self.label.as_str() {
            OPEN_PALM => Some(Mode::Chaos),
            CLOSED_FIST => Some(Mode::Formed),
            _ => None,
        }
    }
}

/// Holds the current mode and the last gesture signal
///
/// The mode only changes through `toggle`, `set_mode` or a detected
/// gesture that maps to a mode.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    gesture: GestureSignal,
    gesture_unavailable: bool,
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn gesture(&self) -> &GestureSignal {
        &self.gesture
    }

    pub fn is_gesture_available(&self) -> bool {
        !self.gesture_unavailable
    }

    /// Flip between formed and chaos, returning the new mode
    pub fn toggle(&mut self) -> Mode {
        let next = self.mode.toggled();
        self.set_mode(next);
        next
    }

    /// Returns true when the mode actually changed
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }
        log::debug!("mode {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        true
    }

    /// Store the latest gesture and apply any mode it forces.
    /// Returns the new mode when a transition happened.
    pub fn apply_gesture(&mut self, mut signal: GestureSignal) -> Option<Mode> {
        if self.gesture_unavailable {
            signal.is_detected = false;
        }

        let forced = signal.forced_mode();
        self.gesture = signal;

        match forced {
            Some(mode) if self.set_mode(mode) => Some(mode),
            _ => None,
        }
    }

    /// The hand left the frame; keep the last label and position
    pub fn lose_hand(&mut self) {
        self.gesture.is_detected = false;
    }

    /// The gesture source failed (camera denied, model failed to load).
    /// Every later signal is treated as undetected.
    pub fn mark_unavailable(&mut self, reason: &str) {
        if !self.gesture_unavailable {
            log::warn!("gesture input disabled: {}", reason);
        }
        self.gesture_unavailable = true;
        self.gesture.is_detected = false;
    }
}
