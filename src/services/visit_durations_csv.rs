use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};

use crate::domain::calendar::parse_month_label;
use crate::domain::visit::VisitDurationRecord;
use crate::services::datasets::{DatasetError, LoadReport, Loaded, parse_number, read_error};

const MALL_ID_COLUMN: &str = "ID Mall";
const MALL_NAME_COLUMN: &str = "Nom Centre";

/// Loads the wide visit-duration table (one column per month) in long form.
///
/// Month columns are titled like `"Janvier 2024"`; columns whose title is not
/// a month are ignored. Blank cells are skipped, unparseable ones dropped.
pub fn load_visit_durations_from_csv_file<P: AsRef<Path>>(
    path: P,
) -> Result<Loaded<VisitDurationRecord>, DatasetError> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(read_error(path))?;
    let loaded = read_visit_durations(reader, path)?;
    loaded.log("visit_durations", path);
    Ok(loaded)
}

pub fn deserialize_visit_durations_from_csv_str(
    input: &str,
    origin_path: &Path,
) -> Result<Loaded<VisitDurationRecord>, DatasetError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input.as_bytes());
    read_visit_durations(reader, origin_path)
}

fn read_visit_durations<R: Read>(
    mut reader: csv::Reader<R>,
    origin_path: &Path,
) -> Result<Loaded<VisitDurationRecord>, DatasetError> {
    let headers = reader.headers().map_err(read_error(origin_path))?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| DatasetError::MissingColumn {
                path: origin_path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let id_index = column_index(MALL_ID_COLUMN)?;
    let name_index = column_index(MALL_NAME_COLUMN)?;

    let month_columns: Vec<(usize, NaiveDate)> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != id_index && *index != name_index)
        .filter_map(|(index, header)| match parse_month_label(header) {
            Some(month) => Some((index, month)),
            None => {
                tracing::warn!(column = header, "ignoring non-month column");
                None
            }
        })
        .collect();

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for row in reader.records() {
        let Ok(row) = row else {
            report.total_rows += 1;
            report.dropped_rows += 1;
            continue;
        };
        let mall_id = row.get(id_index).unwrap_or_default().trim().to_string();
        let mall_name = row.get(name_index).unwrap_or_default().trim().to_string();

        for (index, month) in &month_columns {
            let cell = row.get(*index).unwrap_or_default();
            if cell.trim().is_empty() {
                continue;
            }
            report.total_rows += 1;
            match parse_number(Some(cell)) {
                Some(average_minutes) if !mall_name.is_empty() => records.push(VisitDurationRecord {
                    mall_id: mall_id.clone(),
                    mall_name: mall_name.clone(),
                    month: *month,
                    average_minutes,
                }),
                _ => report.dropped_rows += 1,
            }
        }
    }

    Ok(Loaded { records, report })
}
