//! Response helpers shared by handlers.

use chrono::{SecondsFormat, Utc};

/// Current time as RFC 3339 UTC with millisecond precision,
/// e.g. `2024-05-01T12:00:00.123Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
