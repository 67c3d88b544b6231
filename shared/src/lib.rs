#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod motion;
pub mod reach_outs;
pub mod sequencer;
pub mod submission;
pub mod transition;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::CoreConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, ErrorKind, StoreError, SubmitError};
pub use event::Event;
pub use model::Model;
pub use view::{UserFacingError, ViewModel};

const SECOND_MS: u64 = 1_000;

/// Coarsest unit first; each entry is (seconds per unit, suffix).
const TIME_AGO_UNITS: [(u64, &str); 6] = [
    (365 * 24 * 60 * 60, "y"),
    (30 * 24 * 60 * 60, "mo"),
    (7 * 24 * 60 * 60, "w"),
    (24 * 60 * 60, "d"),
    (60 * 60, "h"),
    (60, "m"),
];

/// Compact relative time for card footers ("Just now", "45s ago", "3h ago", "2mo ago").
/// Timestamps in the future (clock skew between devices) read as "Just now".
#[must_use]
pub fn format_time_ago(timestamp_ms: u64, now_ms: u64) -> String {
    let secs = now_ms.saturating_sub(timestamp_ms) / SECOND_MS;
    if secs < 5 {
        return "Just now".into();
    }

    TIME_AGO_UNITS
        .iter()
        .find(|(unit, _)| secs >= *unit)
        .map_or_else(
            || format!("{secs}s ago"),
            |(unit, suffix)| format!("{}{suffix} ago", secs / unit),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60 * SECOND_MS;
    const HOUR: u64 = 60 * MIN;
    const DAY: u64 = 24 * HOUR;

    #[test]
    fn time_ago_buckets() {
        let now = 400 * DAY;
        assert_eq!(format_time_ago(now, now), "Just now");
        assert_eq!(format_time_ago(now - 4 * SECOND_MS, now), "Just now");
        assert_eq!(format_time_ago(now - 45 * SECOND_MS, now), "45s ago");
        assert_eq!(format_time_ago(now - 5 * MIN, now), "5m ago");
        assert_eq!(format_time_ago(now - 3 * HOUR, now), "3h ago");
        assert_eq!(format_time_ago(now - 2 * DAY, now), "2d ago");
        assert_eq!(format_time_ago(now - 14 * DAY, now), "2w ago");
        assert_eq!(format_time_ago(now - 65 * DAY, now), "2mo ago");
        assert_eq!(format_time_ago(now - 366 * DAY, now), "1y ago");
    }

    #[test]
    fn future_timestamps_read_as_now() {
        assert_eq!(format_time_ago(10 * MIN, 0), "Just now");
    }
}
