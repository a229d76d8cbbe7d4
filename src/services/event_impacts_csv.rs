use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::services::datasets::{DatasetError, LoadReport, Loaded, parse_number, read_error};
use crate::services::event_catalog::EventImpact;

#[derive(Debug, Deserialize)]
struct EventImpactRow {
    #[serde(rename = "Exceptionnel")]
    label: Option<String>,
    #[serde(rename = "Impact")]
    impact: Option<String>,
}

pub fn load_event_impacts_from_csv_file<P: AsRef<Path>>(
    path: P,
) -> Result<Loaded<EventImpact>, DatasetError> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(read_error(path))?;
    let loaded = read_event_impacts(reader, path)?;
    loaded.log("event_impacts", path);
    Ok(loaded)
}

pub fn deserialize_event_impacts_from_csv_str(
    input: &str,
    origin_path: &Path,
) -> Result<Loaded<EventImpact>, DatasetError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input.as_bytes());
    read_event_impacts(reader, origin_path)
}

fn read_event_impacts<R: Read>(
    mut reader: csv::Reader<R>,
    origin_path: &Path,
) -> Result<Loaded<EventImpact>, DatasetError> {
    let headers = reader.headers().map_err(read_error(origin_path))?.clone();
    for column in ["Exceptionnel", "Impact"] {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(DatasetError::MissingColumn {
                path: origin_path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for row in reader.deserialize::<EventImpactRow>() {
        report.total_rows += 1;
        let impact = row.ok().and_then(|row| {
            let label = row.label?.trim().to_string();
            let impact_pct = parse_number(row.impact.as_deref())?;
            (!label.is_empty()).then_some(EventImpact { label, impact_pct })
        });
        match impact {
            Some(impact) => records.push(impact),
            None => report.dropped_rows += 1,
        }
    }

    Ok(Loaded { records, report })
}
