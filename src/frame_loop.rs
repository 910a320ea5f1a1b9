//! `requestAnimationFrame` driver
//!
//! Each frame steps the scene and then calls an optional JS callback with
//! the frame delta. `stop` cancels the pending request and can be called
//! from anywhere, including from inside that callback.
//!
//! The closure reaches its own slot through a `Weak`, so the `FrameLoop`
//! holds the only strong reference. Dropping the loop frees the closure and
//! the scene it captured. wasm-bindgen postpones the free of a closure that
//! is mid-call until the call returns.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use crate::scene::{TreeScene, MAX_FRAME_DELTA};

type FrameClosure = Closure<dyn FnMut(f64)>;

/// Seconds between two `requestAnimationFrame` timestamps (milliseconds).
/// The first frame, and any clock that runs backwards, counts as zero.
pub fn frame_delta(previous_ms: Option<f64>, now_ms: f64) -> f32 {
    match previous_ms {
        Some(previous) if now_ms.is_finite() && now_ms > previous => {
            (((now_ms - previous) / 1000.0) as f32).min(MAX_FRAME_DELTA)
        }
        _ => 0.0,
    }
}

#[derive(Default)]
pub struct FrameLoop {
    active: Rc<Cell<bool>>,
    in_frame: Rc<Cell<bool>>,
    handle: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<FrameClosure>>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.get()
    }

    /// Start stepping `scene` every animation frame
    pub fn start(&mut self, scene: Rc<RefCell<TreeScene>>, on_frame: Option<js_sys::Function>) -> Result<(), String> {
        if self.active.get() {
            return Err("frame loop already running".to_string());
        }
        if self.in_frame.get() {
            return Err("cannot restart the frame loop from inside a frame".to_string());
        }
        let window = web_sys::window().ok_or("no window")?;

        let active = self.active.clone();
        let in_frame = self.in_frame.clone();
        let handle = self.handle.clone();
        let slot: Weak<RefCell<Option<FrameClosure>>> = Rc::downgrade(&self.closure);
        let frame_window = window.clone();
        let mut last_timestamp: Option<f64> = None;

        let closure = Closure::wrap(Box::new(move |now: f64| {
            handle.set(None);
            if !active.get() {
                return;
            }
            in_frame.set(true);

            let dt = frame_delta(last_timestamp.replace(now), now);
            match scene.try_borrow_mut() {
                Ok(mut scene) => scene.step(dt),
                Err(_) => log::error!("scene is borrowed elsewhere, skipping frame"),
            }

            if let Some(callback) = &on_frame {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_f64(dt as f64)) {
                    log::error!("frame callback failed: {:?}", e);
                }
            }

            in_frame.set(false);
            if !active.get() {
                return;
            }
            let Some(slot) = slot.upgrade() else {
                return;
            };
            if let Some(closure) = slot.borrow().as_ref() {
                match frame_window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                    Ok(id) => handle.set(Some(id)),
                    Err(e) => {
                        log::error!("requestAnimationFrame failed: {:?}", e);
                        active.set(false);
                    }
                }
            };
        }) as Box<dyn FnMut(f64)>);

        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| format!("requestAnimationFrame failed: {:?}", e))?;

        *self.closure.borrow_mut() = Some(closure);
        self.handle.set(Some(id));
        self.active.set(true);
        log::debug!("frame loop started");
        Ok(())
    }

    /// Cancel the pending frame. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if !self.active.replace(false) && self.handle.get().is_none() {
            return;
        }

        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {:?}", e);
                }
            }
        }

        self.closure.borrow_mut().take();
        log::debug!("frame loop stopped");
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        self.closure.borrow_mut().take();
    }
}
