//! Identity types for Vigil records

use chrono::{DateTime, Utc};

/// Record identifier generated by the store.
/// Strictly increasing in creation order within a table.
pub type RecordId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time, used for `created_at` on insert.
pub fn now() -> Timestamp {
    Utc::now()
}
