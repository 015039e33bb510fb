use crate::constants::{MAX_CARD_SCALE, MIN_CARD_SCALE};
use serde::{Deserialize, Serialize};

/// Preferences remembered between runs through eframe's storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    pub card_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            card_scale: 1.0,
        }
    }
}

impl Settings {
    pub fn set_card_scale(&mut self, scale: f32) {
        self.card_scale = clamp_card_scale(scale);
    }

    /// Card scale as the rounded percentage shown in the settings window.
    pub fn card_scale_percent(&self) -> u32 {
        (self.card_scale * 100.0).round() as u32
    }
}

pub fn clamp_card_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_CARD_SCALE, MAX_CARD_SCALE)
    } else {
        1.0
    }
}
