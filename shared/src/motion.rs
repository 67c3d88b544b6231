//! Frame-driven animation primitives.
//!
//! The shell owns the rendering clock and reports elapsed time with
//! `Event::AnimationFrame`; everything here is a pure function of those deltas.
//!
//! # Invariants
//!
//! - Easing curves are monotonic on [0, 1] and exact at both ends.
//! - A [`Tween`] never overshoots its endpoints and lands exactly on `to` when finished.
//! - Negative or non-finite deltas are treated as zero.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    OutQuad,
    OutCubic,
}

impl Easing {
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Self::Linear => x,
            Self::OutQuad => 1.0 - (1.0 - x) * (1.0 - x),
            Self::OutCubic => 1.0 - (1.0 - x).powi(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: Easing,
}

impl Tween {
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration.as_secs_f64() * 1000.0,
            elapsed_ms: 0.0,
            easing,
        }
    }

    #[must_use]
    pub fn from_millis(from: f64, to: f64, millis: u64, easing: Easing) -> Self {
        Self::new(from, to, Duration::from_millis(millis), easing)
    }

    /// Advance by `dt_ms` and return the new value.
    pub fn advance(&mut self, dt_ms: f64) -> f64 {
        let dt = if dt_ms.is_finite() && dt_ms > 0.0 { dt_ms } else { 0.0 };
        self.elapsed_ms = (self.elapsed_ms + dt).min(self.duration_ms.max(0.0));
        self.value()
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        if self.is_finished() {
            return self.to;
        }
        let eased = self.easing.apply(self.elapsed_ms / self.duration_ms);
        self.from + (self.to - self.from) * eased
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms
    }

    #[must_use]
    pub const fn target(&self) -> f64 {
        self.to
    }
}

/// Piecewise-linear interpolation with clamping at both ends of `input`.
///
/// `input` must be ascending and the same length as `output`; shorter ranges
/// collapse to the first output value.
#[must_use]
pub fn interpolate(value: f64, input: &[f64], output: &[f64]) -> f64 {
    let len = input.len().min(output.len());
    if len == 0 {
        return 0.0;
    }
    if len == 1 || value <= input[0] || !value.is_finite() {
        return output[0];
    }
    if value >= input[len - 1] {
        return output[len - 1];
    }

    for i in 1..len {
        if value <= input[i] {
            let span = input[i] - input[i - 1];
            if span <= 0.0 {
                return output[i];
            }
            let local = (value - input[i - 1]) / span;
            return output[i - 1] + (output[i] - output[i - 1]) * local;
        }
    }
    output[len - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn easing_is_exact_at_endpoints() {
        for easing in [Easing::Linear, Easing::OutQuad, Easing::OutCubic] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let tween = Tween::from_millis(0.3, 1.0, 0, Easing::OutQuad);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::from_millis(1.0, 0.0, 300, Easing::OutCubic);
        tween.advance(100.0);
        assert!(tween.value() > 0.0);
        tween.advance(1_000.0);
        assert_eq!(tween.value(), 0.0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut tween = Tween::from_millis(0.0, 1.0, 300, Easing::Linear);
        tween.advance(150.0);
        let before = tween.value();
        tween.advance(-50.0);
        tween.advance(f64::NAN);
        assert_eq!(tween.value(), before);
    }

    #[test]
    fn interpolate_matches_layer_ranges() {
        let opacity = |t| interpolate(t, &[0.0, 0.8, 1.0], &[1.0, 0.3, 0.0]);
        assert_eq!(opacity(0.0), 1.0);
        assert!((opacity(0.8) - 0.3).abs() < 1e-9);
        assert_eq!(opacity(1.0), 0.0);
        assert_eq!(opacity(2.0), 0.0);
        assert_eq!(opacity(-1.0), 1.0);

        let slide = interpolate(0.5, &[0.0, 1.0], &[300.0, 0.0]);
        assert!((slide - 150.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn tween_is_monotonic(
            from in 0.0f64..=1.0,
            to in 0.0f64..=1.0,
            duration in 1u64..2_000,
            steps in proptest::collection::vec(0.0f64..100.0, 1..60),
        ) {
            let mut tween = Tween::from_millis(from, to, duration, Easing::OutQuad);
            let mut last = tween.value();
            for dt in steps {
                let next = tween.advance(dt);
                if to >= from {
                    prop_assert!(next >= last - 1e-12);
                } else {
                    prop_assert!(next <= last + 1e-12);
                }
                prop_assert!(next >= from.min(to) - 1e-12 && next <= from.max(to) + 1e-12);
                last = next;
            }
        }
    }
}
