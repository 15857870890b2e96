//! Converting between on-chain block times and the local wall-clock times sales are bucketed by.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone};
use chrono_tz::Tz;

/// Seconds since the unix epoch, as reported in a sale's blockTime.
pub type BlockTime = i64;

pub fn local_sale_time(block_time: BlockTime, timezone: &Tz) -> Result<DateTime<Tz>> {
    timezone
        .timestamp_opt(block_time, 0)
        .single()
        .with_context(|| format!("block time {block_time} is out of range"))
}

/// The calendar day a sale belongs to, in the local timezone. Summaries are keyed by this.
pub fn sale_date(block_time: BlockTime, timezone: &Tz) -> Result<NaiveDate> {
    local_sale_time(block_time, timezone).map(|date_time| date_time.date_naive())
}

/// RFC 3339 with offset and whole seconds, e.g. 2024-03-31T03:30:00+02:00.
pub fn to_iso_string(date_time: &DateTime<Tz>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Reads back a "Sale Time" value as stored in the sales database. A value without a time
/// component counts as the start of that day in the given timezone.
pub fn parse_sale_time(value: &str, timezone: &Tz) -> Result<BlockTime> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.timestamp());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("failed to parse sale time {value}"))?;

    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| timezone.from_local_datetime(&midnight).earliest())
        .map(|date_time| date_time.timestamp())
        .ok_or_else(|| anyhow!("no local midnight for {value} in {timezone}"))
}
