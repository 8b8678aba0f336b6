//! A simulated scrollable list standing in for a native one.

use collapse_tabs::{GestureId, ScrollSurface};
use parking_lot::Mutex;

/// List of fixed content height inside a viewport.
pub struct DemoList {
    gesture: GestureId,
    max_offset: f32,
    position: Mutex<f32>,
    pending: Mutex<Option<f32>>,
}

impl DemoList {
    pub fn new(content_height: f32, viewport_height: f32) -> Self {
        Self {
            gesture: GestureId::next(),
            max_offset: (content_height - viewport_height).max(0.0),
            position: Mutex::new(0.0),
            pending: Mutex::new(None),
        }
    }

    pub fn position(&self) -> f32 {
        *self.position.lock()
    }

    /// Scroll event produced by the last `scroll_to`, if not yet delivered.
    pub fn take_scroll_event(&self) -> Option<f32> {
        self.pending.lock().take()
    }

    /// The user flings the list itself to `offset_y`.
    pub fn user_scroll(&self, offset_y: f32) {
        self.scroll_to(offset_y, false);
    }
}

impl ScrollSurface for DemoList {
    fn scroll_to(&self, offset_y: f32, _animated: bool) {
        let clamped = offset_y.clamp(0.0, self.max_offset);
        *self.position.lock() = clamped;
        *self.pending.lock() = Some(clamped);
    }

    fn gesture_id(&self) -> GestureId {
        self.gesture
    }
}
