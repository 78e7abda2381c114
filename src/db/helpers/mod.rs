use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

pub fn to_u8(value: i64, field: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| anyhow!("{field} out of range: {value}"))
}

pub fn to_i16(value: i64, field: &str) -> Result<i16> {
    i16::try_from(value).map_err(|_| anyhow!("{field} out of range: {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}
