//! Time and timestamp helpers.
//!
//! All persisted timestamps (`origin`, `pushed`, `created`, `modified`) and
//! every age threshold are expressed in Unix milliseconds.

use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Return the current UTC time in Unix milliseconds.
#[must_use]
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}
