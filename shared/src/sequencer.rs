//! Which of the four post-submission screens is mounted, and the single value `t` that slides
//! between the input layer (t = 0) and the active layer (t = 1).
//!
//! Switching between two active screens is a two-phase protocol: the new screen is committed and
//! `t` snaps to 0 in the same update, then [`ScreenSequencer::release_barrier`] starts the forward
//! animation on the next frame. Both active screens share one layer, so skipping the barrier would
//! show the new screen already slid in.

use serde::{Deserialize, Serialize};

use crate::motion::{interpolate, Easing, Tween};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Input,
    Pending,
    Confirmation,
    Rejected,
}

impl Screen {
    /// Anything but `Input` renders on the active layer.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Input)
    }
}

/// What the caller has to do after asking for a screen change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStep {
    Unchanged,
    Animating,
    /// Schedule a one-frame callback and call `release_barrier` from it.
    AwaitingFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub translate_x: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSequencer {
    screen: Screen,
    t: f64,
    animation: Option<Tween>,
    barrier: bool,
    duration_ms: u64,
}

impl Default for ScreenSequencer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SCREEN_TRANSITION_MS)
    }
}

impl ScreenSequencer {
    #[must_use]
    pub fn new(duration_ms: u64) -> Self {
        Self {
            screen: Screen::Input,
            t: 0.0,
            animation: None,
            barrier: false,
            duration_ms,
        }
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn transition_to(&mut self, target: Screen) -> SequencerStep {
        if target == self.screen && !self.barrier {
            return SequencerStep::Unchanged;
        }

        if !target.is_active() {
            self.screen = Screen::Input;
            self.barrier = false;
            self.animate_to(0.0);
            return SequencerStep::Animating;
        }

        if !self.screen.is_active() {
            self.screen = target;
            self.barrier = false;
            self.animate_to(1.0);
            return SequencerStep::Animating;
        }

        self.screen = target;
        self.t = 0.0;
        self.animation = None;
        self.barrier = true;
        SequencerStep::AwaitingFrame
    }

    /// Second phase of an active-to-active switch. No-op unless a barrier is pending.
    pub fn release_barrier(&mut self) -> bool {
        if !self.barrier {
            return false;
        }
        self.barrier = false;
        self.animate_to(1.0);
        true
    }

    /// Back to `Input` with `t` at 0 in this update, no animation.
    pub fn jump_to_input(&mut self) {
        self.screen = Screen::Input;
        self.t = 0.0;
        self.animation = None;
        self.barrier = false;
    }

    fn animate_to(&mut self, target: f64) {
        if (self.t - target).abs() < f64::EPSILON && self.animation.is_none() {
            self.t = target;
            return;
        }
        self.animation = Some(Tween::from_millis(
            self.t,
            target,
            self.duration_ms,
            Easing::OutQuad,
        ));
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if let Some(animation) = self.animation.as_mut() {
            self.t = animation.advance(dt_ms);
            if animation.is_finished() {
                self.t = animation.target();
                self.animation = None;
            }
        }
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub const fn t(&self) -> f64 {
        self.t
    }

    #[must_use]
    pub const fn awaiting_frame(&self) -> bool {
        self.barrier
    }

    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[must_use]
    pub fn input_layer(&self) -> LayerStyle {
        LayerStyle {
            translate_x: interpolate(self.t, &[0.0, 1.0], &[0.0, -100.0]),
            opacity: interpolate(self.t, &[0.0, 0.8, 1.0], &[1.0, 0.3, 0.0]),
        }
    }

    /// `None` while the input screen is current: the active layer is unmounted.
    #[must_use]
    pub fn active_layer(&self) -> Option<LayerStyle> {
        self.screen.is_active().then(|| LayerStyle {
            translate_x: interpolate(self.t, &[0.0, 1.0], &[300.0, 0.0]),
            opacity: interpolate(self.t, &[0.0, 0.2, 1.0], &[0.0, 1.0, 1.0]),
        })
    }
}
