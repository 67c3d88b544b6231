//! Open/close controller for a button that morphs into a full-screen modal.
//!
//! `progress` runs from 0 (collapsed button) to 1 (expanded modal). The controller holds no
//! business data; it only drives the animatable values the shell reads back through
//! [`TransitionSnapshot`].
//!
//! State machine: Closed → Opening → Open → Closing → Closed. Opening while open and closing
//! while closed are no-ops; reversing mid-flight starts from the current progress so each
//! operation stays monotonic.

use serde::{Deserialize, Serialize};

use crate::config::TransitionTiming;
use crate::motion::{Easing, Tween};

/// Velocity (points/s) at which a fling closes in half the configured time.
const FLING_REFERENCE_VELOCITY: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// On-screen frame of the control the modal grows out of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presentation {
    #[default]
    Morph,
    /// No source control to grow from; the shell slides the modal up instead.
    Originless,
}

/// Emitted by [`TransitionController::advance`] when an operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Opened,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    pub phase: TransitionPhase,
    pub visible: bool,
    pub progress: f64,
    pub presentation: Presentation,
    pub anchor: Option<Anchor>,
    pub pressed_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionController {
    timing: TransitionTiming,
    phase: TransitionPhase,
    visible: bool,
    progress: f64,
    presentation: Presentation,
    anchor: Option<Anchor>,
    animation: Option<Tween>,
    pressed_scale: f64,
    press_animation: Option<Tween>,
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(TransitionTiming::default())
    }
}

impl TransitionController {
    #[must_use]
    pub fn new(timing: TransitionTiming) -> Self {
        Self {
            timing,
            phase: TransitionPhase::Closed,
            visible: false,
            progress: 0.0,
            presentation: Presentation::Morph,
            anchor: None,
            animation: None,
            pressed_scale: 1.0,
            press_animation: None,
        }
    }

    pub fn set_timing(&mut self, timing: TransitionTiming) {
        self.timing = timing;
    }

    /// User-initiated open, morphing out of `anchor`. Returns false when already open or opening.
    pub fn open(&mut self, anchor: Option<Anchor>) -> bool {
        self.start_open(Presentation::Morph, anchor)
    }

    /// System-initiated open without a source control.
    pub fn open_alternate(&mut self) -> bool {
        self.start_open(Presentation::Originless, None)
    }

    fn start_open(&mut self, presentation: Presentation, anchor: Option<Anchor>) -> bool {
        if matches!(self.phase, TransitionPhase::Open | TransitionPhase::Opening) {
            return false;
        }
        self.visible = true;
        self.presentation = presentation;
        self.anchor = anchor;
        self.phase = TransitionPhase::Opening;
        self.animation = Some(Tween::from_millis(
            self.progress,
            1.0,
            self.timing.open_ms,
            Easing::OutCubic,
        ));
        true
    }

    /// Animate back to the button. `velocity` comes from a dismiss gesture and shortens the
    /// animation; the end state is always exactly 0.
    pub fn close(&mut self, velocity: Option<f64>) -> bool {
        if matches!(self.phase, TransitionPhase::Closed | TransitionPhase::Closing) {
            return false;
        }
        let (duration, easing) = match velocity {
            Some(v) if v.is_finite() && v != 0.0 => {
                let factor = 1.0 / (1.0 + v.abs() / FLING_REFERENCE_VELOCITY);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let scaled = (self.timing.close_ms as f64 * factor).round() as u64;
                (scaled.max(self.timing.min_close_ms), Easing::OutCubic)
            }
            _ => (self.timing.close_ms, Easing::OutQuad),
        };
        self.phase = TransitionPhase::Closing;
        self.animation = Some(Tween::from_millis(self.progress, 0.0, duration, easing));
        true
    }

    pub fn press_in(&mut self) {
        self.animate_press(self.timing.pressed_scale);
    }

    pub fn press_out(&mut self) {
        self.animate_press(1.0);
    }

    fn animate_press(&mut self, target: f64) {
        self.press_animation = Some(Tween::from_millis(
            self.pressed_scale,
            target,
            self.timing.press_ms,
            Easing::OutQuad,
        ));
    }

    /// Advance all running animations by one frame.
    pub fn advance(&mut self, dt_ms: f64) -> Option<TransitionOutcome> {
        if let Some(press) = self.press_animation.as_mut() {
            self.pressed_scale = press.advance(dt_ms);
            if press.is_finished() {
                self.press_animation = None;
            }
        }

        let animation = self.animation.as_mut()?;
        self.progress = animation.advance(dt_ms);
        if !animation.is_finished() {
            return None;
        }

        self.animation = None;
        match self.phase {
            TransitionPhase::Opening => {
                self.progress = 1.0;
                self.phase = TransitionPhase::Open;
                Some(TransitionOutcome::Opened)
            }
            TransitionPhase::Closing => {
                self.progress = 0.0;
                self.visible = false;
                self.phase = TransitionPhase::Closed;
                self.presentation = Presentation::Morph;
                self.anchor = None;
                Some(TransitionOutcome::Closed)
            }
            TransitionPhase::Open | TransitionPhase::Closed => None,
        }
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.press_animation.is_some()
    }

    #[must_use]
    pub const fn phase(&self) -> TransitionPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub const fn is_alternate(&self) -> bool {
        matches!(self.presentation, Presentation::Originless)
    }

    #[must_use]
    pub const fn pressed_scale(&self) -> f64 {
        self.pressed_scale
    }

    #[must_use]
    pub fn snapshot(&self) -> TransitionSnapshot {
        TransitionSnapshot {
            phase: self.phase,
            visible: self.visible,
            progress: self.progress,
            presentation: self.presentation,
            anchor: self.anchor,
            pressed_scale: self.pressed_scale,
        }
    }
}
