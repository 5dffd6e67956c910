use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", input))
}

/// Days `from` to `to`, both included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Parse an `A..B` span of days.
pub fn parse_span(input: &str) -> Result<DaySpan> {
    let Some((from, to)) = input.split_once("..") else {
        bail!("Invalid span '{}', expected YYYY-MM-DD..YYYY-MM-DD", input);
    };
    Ok(DaySpan {
        from: parse_date(from)?,
        to: parse_date(to)?,
    })
}
