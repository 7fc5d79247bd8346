use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// Display offset used by the client when none is configured (UTC+05:30).
pub const DEFAULT_OFFSET_MINUTES: i32 = 330;

/// Format of an HTML-style `datetime-local` value, e.g. `2026-03-01T18:30`.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Build a fixed offset from minutes east of UTC, falling back to UTC for
/// out-of-range values.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| {
        log::warn!("Invalid UTC offset {} minutes, using UTC", minutes);
        Utc.fix()
    })
}

/// Express an instant at the given offset.
pub fn at_offset(instant: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    instant.with_timezone(&offset)
}

/// Default value for the scheduled-time field: "now" at the display offset.
pub fn input_value(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    at_offset(instant, offset).format(INPUT_FORMAT).to_string()
}

/// Parse a `datetime-local` value as wall-clock time at the display offset.
///
/// Blank input means "not scheduled" and yields `Ok(None)`.
pub fn parse_input(
    value: &str,
    offset: FixedOffset,
) -> Result<Option<DateTime<FixedOffset>>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    // Accept an optional seconds component as well
    let naive = NaiveDateTime::parse_from_str(value, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))?;
    Ok(offset.from_local_datetime(&naive).single())
}

/// Render a datetime the way the CSV file stores it: `1/1/2024, 12:00:00 AM`.
pub fn csv_timestamp(dt: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Render a datetime for item cards: `1 Jan 2024, 05:30 am`.
pub fn display_timestamp(dt: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset)
        .format("%-d %b %Y, %I:%M %P")
        .to_string()
}
