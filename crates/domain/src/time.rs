//! Wall-clock timestamps.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed` and `last_updated`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
