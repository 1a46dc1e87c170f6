//! Boot progress bar model.
//!
//! The bar has a target set from load progress and a displayed value that
//! eases toward it at a fixed rate, so a pass that finishes instantly still
//! fills the bar visibly. It is created only once the preload stage has
//! completed; the scene transition fires when the displayed value reaches 1.

use bevy_ecs::prelude::Resource;

/// Displayed fraction gained per second while catching up with the target.
pub const FILL_RATE: f32 = 1.0;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct BootProgress {
    target: f32,
    displayed: f32,
    rate: f32,
}

impl Default for BootProgress {
    fn default() -> Self {
        Self::new(FILL_RATE)
    }
}

impl BootProgress {
    /// Create an empty bar filling at `rate` per second.
    pub fn new(rate: f32) -> Self {
        BootProgress {
            target: 0.0,
            displayed: 0.0,
            rate: rate.max(f32::EPSILON),
        }
    }

    /// Raise the target. Values are clamped to `[0, 1]`; lower targets are
    /// ignored.
    pub fn set_progress(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        if value > self.target {
            self.target = value;
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn displayed(&self) -> f32 {
        self.displayed
    }

    /// Move the displayed value toward the target; returns the new value.
    pub fn advance(&mut self, delta: f32) -> f32 {
        if self.displayed < self.target {
            self.displayed = (self.displayed + delta.max(0.0) * self.rate).min(self.target);
        }
        self.displayed
    }

    /// Whether the bar is visibly full.
    pub fn is_full(&self) -> bool {
        self.displayed >= 1.0
    }
}
