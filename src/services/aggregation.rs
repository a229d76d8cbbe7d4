use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::domain::flow::{AggregatedPoint, TimeSeriesRecord};
use crate::domain::granularity::Granularity;

/// Sums `metric_value` per (bucket, site).
///
/// The result is sorted by bucket, then site. Empty input yields an empty
/// series.
pub fn aggregate(records: &[TimeSeriesRecord], granularity: Granularity) -> Vec<AggregatedPoint> {
    let mut groups: BTreeMap<(NaiveDateTime, &str), f64> = BTreeMap::new();
    for record in records {
        let bucket = granularity.bucket(record.timestamp);
        *groups.entry((bucket, record.site.as_str())).or_insert(0.0) += record.metric_value;
    }

    groups
        .into_iter()
        .map(|((bucket, site), value)| AggregatedPoint {
            bucket,
            site: site.to_string(),
            value,
        })
        .collect()
}

pub fn total(points: &[AggregatedPoint]) -> f64 {
    points.iter().map(|point| point.value).sum()
}

/// Distinct sites of a series, sorted.
pub fn sites(points: &[AggregatedPoint]) -> Vec<String> {
    let mut sites: Vec<String> = points.iter().map(|point| point.site.clone()).collect();
    sites.sort();
    sites.dedup();
    sites
}
