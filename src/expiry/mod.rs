//! Ephemeral message subsystem
//!
//! Two timers drive it: a slow sweep that collects expired messages and
//! deletes them (remotely first, locally only on confirmation), and a
//! fast tick that recomputes the remaining-time labels for display.

pub mod countdown;
pub mod scheduler;

pub use countdown::{format_remaining, remaining_labels};
pub use scheduler::ExpiryScheduler;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// User-facing auto-delete choices.
///
/// Every preset converts to canonical milliseconds through this one
/// table; expiry instants are always absolute UTC derived from it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutoDeletePreset {
    OneMinute,
    FifteenMinutes,
    OneHour,
    SixHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    SevenDays,
    Never,
}

impl AutoDeletePreset {
    /// Duration in canonical milliseconds; `None` for `Never`.
    pub fn duration_ms(self) -> Option<i64> {
        const MINUTE: i64 = 60 * 1_000;
        const HOUR: i64 = 60 * MINUTE;
        const DAY: i64 = 24 * HOUR;

        match self {
            AutoDeletePreset::OneMinute => Some(MINUTE),
            AutoDeletePreset::FifteenMinutes => Some(15 * MINUTE),
            AutoDeletePreset::OneHour => Some(HOUR),
            AutoDeletePreset::SixHours => Some(6 * HOUR),
            AutoDeletePreset::TwelveHours => Some(12 * HOUR),
            AutoDeletePreset::OneDay => Some(DAY),
            AutoDeletePreset::ThreeDays => Some(3 * DAY),
            AutoDeletePreset::SevenDays => Some(7 * DAY),
            AutoDeletePreset::Never => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AutoDeletePreset::OneMinute => "1 minute",
            AutoDeletePreset::FifteenMinutes => "15 minutes",
            AutoDeletePreset::OneHour => "1 hour",
            AutoDeletePreset::SixHours => "6 hours",
            AutoDeletePreset::TwelveHours => "12 hours",
            AutoDeletePreset::OneDay => "24 hours",
            AutoDeletePreset::ThreeDays => "3 days",
            AutoDeletePreset::SevenDays => "7 days",
            AutoDeletePreset::Never => "Never",
        }
    }

    /// Absolute expiry instant for a message sent at `from`.
    pub fn expires_at(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration_ms()
            .map(|ms| from + Duration::milliseconds(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_table_is_in_milliseconds() {
        assert_eq!(AutoDeletePreset::OneMinute.duration_ms(), Some(60_000));
        assert_eq!(
            AutoDeletePreset::FifteenMinutes.duration_ms(),
            Some(900_000)
        );
        assert_eq!(
            AutoDeletePreset::SevenDays.duration_ms(),
            Some(7 * 24 * 60 * 60 * 1_000)
        );
        assert_eq!(AutoDeletePreset::Never.duration_ms(), None);
    }

    #[test]
    fn expiry_is_strictly_after_send_time() {
        let sent = Utc::now();
        for preset in [
            AutoDeletePreset::OneMinute,
            AutoDeletePreset::OneHour,
            AutoDeletePreset::SevenDays,
        ] {
            assert!(preset.expires_at(sent).unwrap() > sent);
        }
        assert!(AutoDeletePreset::Never.expires_at(sent).is_none());
    }
}
