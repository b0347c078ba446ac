use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Pattern shared by the `date` and `utcdate` fields, e.g. `2012-12-14 07:20:42,000`.
pub const ISO8601_PATTERN: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Render a timestamp in its own zone using [`ISO8601_PATTERN`].
pub fn format_iso8601<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(ISO8601_PATTERN).to_string()
}
