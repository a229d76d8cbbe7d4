use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Visitor count for one site over one hour of the raw source.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub timestamp: NaiveDateTime,
    pub site: String,
    pub metric_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub bucket: NaiveDateTime,
    pub site: String,
    pub value: f64,
}

impl AggregatedPoint {
    pub fn date(&self) -> NaiveDate {
        self.bucket.date()
    }
}
