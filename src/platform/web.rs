//! Browser scheduling
//!
//! `requestAnimationFrame` and `setTimeout` behind [`FrameHost`]. The
//! callbacks are installed after the driver exists, since they need a handle
//! back to it; until then every request is refused.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::driver::{FrameHost, TimerKind};

pub struct BrowserHost {
    window: web_sys::Window,
    frame_cb: Option<Closure<dyn FnMut(f64)>>,
    single_tap_cb: Option<Closure<dyn FnMut()>>,
    long_press_cb: Option<Closure<dyn FnMut()>>,
}

impl BrowserHost {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            frame_cb: None,
            single_tap_cb: None,
            long_press_cb: None,
        }
    }

    /// Install the callbacks the browser invokes. They are kept alive for as
    /// long as this host is, and dropped with it.
    pub fn install(
        &mut self,
        frame_cb: Closure<dyn FnMut(f64)>,
        single_tap_cb: Closure<dyn FnMut()>,
        long_press_cb: Closure<dyn FnMut()>,
    ) {
        self.frame_cb = Some(frame_cb);
        self.single_tap_cb = Some(single_tap_cb);
        self.long_press_cb = Some(long_press_cb);
    }

    /// Milliseconds on the same clock the frame callback receives
    pub fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

impl FrameHost for BrowserHost {
    fn request_frame(&mut self) -> Option<i32> {
        let cb = self.frame_cb.as_ref()?;
        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }

    fn set_timeout(&mut self, kind: TimerKind, delay_ms: f64) -> Option<i32> {
        let cb = match kind {
            TimerKind::SingleTap => self.single_tap_cb.as_ref()?,
            TimerKind::LongPress => self.long_press_cb.as_ref()?,
        };
        let delay = delay_ms.ceil().clamp(0.0, i32::MAX as f64) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay)
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("setTimeout failed: {:?}", e);
                None
            }
        }
    }

    fn clear_timeout(&mut self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}
