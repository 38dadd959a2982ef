//! Countdown Presenter
//!
//! Pure read-side projection: remaining-time labels for every message
//! with a future expiry, keyed by message id. Recomputed on the fast
//! tick, never touching the messages themselves.

use crate::entities::Message;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Human label for a remaining duration: largest applicable unit,
/// floor-rounded. Durations of zero or less render as `0s`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    if secs >= 86_400 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Labels for every message still counting down at `now`. Messages
/// without an expiry, or already past it, get no entry.
pub fn remaining_labels(messages: &[Message], now: DateTime<Utc>) -> HashMap<String, String> {
    messages
        .iter()
        .filter_map(|message| {
            let at = message.auto_delete_at?;
            if at <= now {
                return None;
            }
            Some((message.message_id.clone(), format_remaining(at - now)))
        })
        .collect()
}
