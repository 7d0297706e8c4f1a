//! Date-range splitting of a search into time-sliced copies

use super::models::SearchDefinition;
use crate::error::{Error, Result};
use crate::query::Filter;
use chrono::{Duration, NaiveDate};

/// Column used for the date constraints of split searches
pub const DATE_COLUMN: &str = "as_of_date";

/// Date format of split filters and of the CLI `--from`/`--to` flags
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timespan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Interval of whole days, as given on the command line
pub fn interval_days(days: i64) -> Result<Duration> {
    Duration::try_days(days)
        .filter(|d| d.num_days() >= 1)
        .ok_or_else(|| Error::Validation(format!("invalid split interval: {} days", days)))
}

/// Cut `[from, to)` into consecutive spans of `interval`; the last span ends at `to`
pub fn split_time(from: NaiveDate, to: NaiveDate, interval: Duration) -> Result<Vec<Timespan>> {
    if interval.num_days() < 1 {
        return Err(Error::Validation(
            "split interval must be at least one day".to_string(),
        ));
    }

    let mut spans = Vec::new();
    let mut start = from;
    while start + interval < to {
        spans.push(Timespan {
            start,
            end: start + interval,
        });
        start = start + interval;
    }
    spans.push(Timespan { start, end: to });

    Ok(spans)
}

impl SearchDefinition {
    /// Split into one copy per span, each with extra `as_of_date` filters and
    /// its own output file. `self` is left untouched.
    pub fn split(&self, from: NaiveDate, to: NaiveDate, interval: Duration) -> Result<Vec<SearchDefinition>> {
        let spans = split_time(from, to, interval)?;

        Ok(spans
            .iter()
            .enumerate()
            .map(|(index, span)| {
                let mut search = self.clone();
                search.request.filters.push(Filter::new(
                    DATE_COLUMN,
                    ">=",
                    span.start.format(DATE_FORMAT).to_string(),
                ));
                search.request.filters.push(Filter::new(
                    DATE_COLUMN,
                    "<",
                    span.end.format(DATE_FORMAT).to_string(),
                ));
                // each split writes its own file
                search.output = format!("{}_{:03}", search.output, index);
                search
            })
            .collect())
    }
}
