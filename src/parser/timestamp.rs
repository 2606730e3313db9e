use time::macros::format_description;
use time::{PrimitiveDateTime, UtcOffset};

use crate::parser::LineError;

/// Rewrites a report timestamp (`YYYY-MM-DD HH:MM:SS`, no zone) as
/// `YYYY-MM-DDTHH:MM:SS±hhmm`, reading it as local time at `offset`.
pub fn normalize_timestamp(value: &str, offset: UtcOffset) -> Result<String, LineError> {
    let invalid = |reason: String| LineError::Timestamp {
        value: value.to_string(),
        reason,
    };

    let parsed = PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| invalid(e.to_string()))?;

    parsed
        .assume_offset(offset)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
        ))
        .map_err(|e| invalid(e.to_string()))
}

/// Parses `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(s: &str) -> Result<UtcOffset, time::error::Parse> {
    UtcOffset::parse(
        s.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
}
