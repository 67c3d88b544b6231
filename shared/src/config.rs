//! Timing constants and limits for the core.
//!
//! Every delay the controllers schedule comes from [`CoreConfig`], so the shell can tune
//! animation timings per platform (or collapse them for reduced motion) with a single
//! `Event::Configure`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CLOCK_REFRESH_MS: u64 = 30_000;
pub const DEFAULT_DEEP_LINK_DELAY_MS: u64 = 500;
pub const DEFAULT_RESET_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_AUTO_CLOSE_MS: u64 = 3_000;
pub const DEFAULT_FRAME_BARRIER_MS: u64 = 16;
pub const DEFAULT_SCREEN_TRANSITION_MS: u64 = 300;
pub const DEFAULT_MORPH_OPEN_MS: u64 = 350;
pub const DEFAULT_MORPH_CLOSE_MS: u64 = 300;
pub const DEFAULT_MIN_FLING_CLOSE_MS: u64 = 120;
pub const DEFAULT_PRESS_MS: u64 = 120;
pub const DEFAULT_PRESSED_SCALE: f64 = 0.96;
pub const MAX_REACH_OUTS: usize = 20;
pub const MAX_TITLE_CHARS: usize = 120;
pub const MAX_BODY_CHARS: usize = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTiming {
    pub open_ms: u64,
    pub close_ms: u64,
    /// Floor for fling-accelerated closes.
    pub min_close_ms: u64,
    pub press_ms: u64,
    pub pressed_scale: f64,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            open_ms: DEFAULT_MORPH_OPEN_MS,
            close_ms: DEFAULT_MORPH_CLOSE_MS,
            min_close_ms: DEFAULT_MIN_FLING_CLOSE_MS,
            press_ms: DEFAULT_PRESS_MS,
            pressed_scale: DEFAULT_PRESSED_SCALE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub clock_refresh_ms: u64,
    pub deep_link_delay_ms: u64,
    pub reset_debounce_ms: u64,
    pub auto_close_ms: u64,
    pub frame_barrier_ms: u64,
    pub screen_transition_ms: u64,
    pub transition: TransitionTiming,
    pub max_reach_outs: usize,
    pub max_title_chars: usize,
    pub max_body_chars: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            clock_refresh_ms: DEFAULT_CLOCK_REFRESH_MS,
            deep_link_delay_ms: DEFAULT_DEEP_LINK_DELAY_MS,
            reset_debounce_ms: DEFAULT_RESET_DEBOUNCE_MS,
            auto_close_ms: DEFAULT_AUTO_CLOSE_MS,
            frame_barrier_ms: DEFAULT_FRAME_BARRIER_MS,
            screen_transition_ms: DEFAULT_SCREEN_TRANSITION_MS,
            transition: TransitionTiming::default(),
            max_reach_outs: MAX_REACH_OUTS,
            max_title_chars: MAX_TITLE_CHARS,
            max_body_chars: MAX_BODY_CHARS,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_refresh_ms == 0 {
            return Err(ConfigError::ZeroInterval("clock_refresh_ms"));
        }
        if self.frame_barrier_ms == 0 {
            return Err(ConfigError::ZeroInterval("frame_barrier_ms"));
        }
        if self.max_reach_outs == 0 {
            return Err(ConfigError::ZeroLimit("max_reach_outs"));
        }
        if self.max_title_chars == 0 {
            return Err(ConfigError::ZeroLimit("max_title_chars"));
        }
        if self.max_body_chars == 0 {
            return Err(ConfigError::ZeroLimit("max_body_chars"));
        }
        let scale = self.transition.pressed_scale;
        if !scale.is_finite() || !(0.5..=1.0).contains(&scale) {
            return Err(ConfigError::OutOfRange {
                field: "transition.pressed_scale",
                value: scale,
            });
        }
        Ok(())
    }
}
