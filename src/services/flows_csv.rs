use std::io::Read;
use std::path::Path;

use chrono::NaiveTime;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::domain::flow::TimeSeriesRecord;
use crate::services::datasets::{
    DatasetError, LoadReport, Loaded, parse_date, parse_number, read_error,
};

#[derive(Debug, Deserialize)]
struct FlowRow {
    #[serde(rename = "Jour")]
    day: Option<String>,
    #[serde(rename = "heure")]
    hour_range: Option<String>,
    #[serde(rename = "Site")]
    site: Option<String>,
    #[serde(rename = "Entrées")]
    entries: Option<String>,
}

/// Loads hourly visitor counts.
///
/// Rows with an unparseable day, hour range or count, or without a site, are
/// dropped and counted in the [`LoadReport`].
pub fn load_flows_from_csv_file<P: AsRef<Path>>(
    path: P,
) -> Result<Loaded<TimeSeriesRecord>, DatasetError> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(read_error(path))?;
    let loaded = read_flows(reader, path)?;
    loaded.log("flows", path);
    Ok(loaded)
}

pub fn deserialize_flows_from_csv_str(
    input: &str,
    origin_path: &Path,
) -> Result<Loaded<TimeSeriesRecord>, DatasetError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input.as_bytes());
    read_flows(reader, origin_path)
}

fn read_flows<R: Read>(
    mut reader: csv::Reader<R>,
    origin_path: &Path,
) -> Result<Loaded<TimeSeriesRecord>, DatasetError> {
    let headers = reader.headers().map_err(read_error(origin_path))?.clone();
    for column in ["Jour", "heure", "Site", "Entrées"] {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(DatasetError::MissingColumn {
                path: origin_path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for row in reader.deserialize::<FlowRow>() {
        report.total_rows += 1;
        match row.ok().and_then(record_from_row) {
            Some(record) => records.push(record),
            None => report.dropped_rows += 1,
        }
    }

    Ok(Loaded { records, report })
}

fn record_from_row(row: FlowRow) -> Option<TimeSeriesRecord> {
    let day = parse_date(row.day.as_deref())?;
    let hour = parse_start_hour(row.hour_range.as_deref()?)?;
    let site = row.site?.trim().to_string();
    if site.is_empty() {
        return None;
    }
    let metric_value = parse_number(row.entries.as_deref())?;

    Some(TimeSeriesRecord {
        timestamp: day.and_time(hour),
        site,
        metric_value,
    })
}

/// Start hour of a range such as `"10:00 - 11:00"`.
fn parse_start_hour(range: &str) -> Option<NaiveTime> {
    let start = range.split(" - ").next()?.trim();
    let hour = start.split(':').next()?.trim().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, 0, 0)
}
