//! Full-screen image lightbox transform state.
//!
//! Scale is driven by two-finger pinch distance deltas, mouse wheel, or
//! double-tap; translation by single-finger pan while zoomed in. Scale is
//! clamped to `[MIN_SCALE, MAX_SCALE]` no matter how large the gesture
//! input is, and everything resets when the overlay closes.

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 5.0;

/// Target scale for the double-tap zoom toggle.
pub const DOUBLE_TAP_SCALE: f32 = 2.5;

/// Multiplicative step per wheel notch.
const WHEEL_STEP: f32 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Lightbox {
    open: bool,
    scale: f32,
    translate_x: f32,
    translate_y: f32,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self {
            open: false,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Lightbox {
    pub fn open(&mut self) {
        // Reopening always starts at identity.
        *self = Self::default();
        self.open = true;
    }

    /// Escape key and click-outside both land here.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translation(&self) -> (f32, f32) {
        (self.translate_x, self.translate_y)
    }

    /// Apply a pinch gesture given the previous and current two-finger
    /// distances. Degenerate inputs (zero/negative distances) are ignored.
    pub fn pinch(&mut self, prev_distance: f32, distance: f32) {
        if !self.open || prev_distance <= 0.0 || distance <= 0.0 {
            return;
        }
        self.set_scale(self.scale * (distance / prev_distance));
    }

    /// Mouse-wheel zoom for pointer devices. Negative delta zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.open {
            return;
        }
        let factor = if delta_y < 0.0 { WHEEL_STEP } else { 1.0 / WHEEL_STEP };
        self.set_scale(self.scale * factor);
    }

    /// Single-finger pan, active only while zoomed beyond 1x.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !self.open || self.scale <= 1.0 {
            return;
        }
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Double-tap toggles between 1x and the fixed zoomed level.
    pub fn double_tap(&mut self) {
        if !self.open {
            return;
        }
        if (self.scale - 1.0).abs() < f32::EPSILON {
            self.set_scale(DOUBLE_TAP_SCALE);
        } else {
            self.set_scale(1.0);
            self.translate_x = 0.0;
            self.translate_y = 0.0;
        }
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        if self.scale <= 1.0 {
            self.translate_x = 0.0;
            self.translate_y = 0.0;
        }
    }
}
