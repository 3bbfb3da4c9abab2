//! Lovelace / ADA conversion and deadline display

use chrono::{DateTime, Utc};

use crate::error::OffchainError;

/// Lovelace per ADA
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Converts lovelace to ADA.
pub fn lovelace_to_ada(lovelace: u64) -> f64 {
    lovelace as f64 / LOVELACE_PER_ADA as f64
}

/// Converts ADA to lovelace, rounding to the nearest lovelace.
pub fn ada_to_lovelace(ada: f64) -> u64 {
    (ada * LOVELACE_PER_ADA as f64).round() as u64
}

/// Formats a lovelace amount as `"<ada> ADA"` with six decimals.
pub fn format_ada(lovelace: u64) -> String {
    format!(
        "{}.{:06} ADA",
        lovelace / LOVELACE_PER_ADA,
        lovelace % LOVELACE_PER_ADA
    )
}

/// Renders a POSIX-seconds deadline as an RFC 3339 UTC timestamp.
///
/// Out-of-range values are printed as the raw number.
pub fn format_deadline(deadline_secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(deadline_secs, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => deadline_secs.to_string(),
    }
}

/// Deadline `hours` from now, in POSIX seconds.
pub fn deadline_from_now(hours: u64) -> Result<i64, OffchainError> {
    i64::try_from(hours)
        .ok()
        .and_then(|h| h.checked_mul(3600))
        .and_then(|secs| Utc::now().timestamp().checked_add(secs))
        .ok_or_else(|| OffchainError::OutOfRange(format!("deadline {} hours from now", hours)))
}
