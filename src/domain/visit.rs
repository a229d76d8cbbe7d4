use chrono::NaiveDate;

/// Average visit duration of one mall for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDurationRecord {
    pub mall_id: String,
    pub mall_name: String,
    pub month: NaiveDate,
    pub average_minutes: f64,
}
