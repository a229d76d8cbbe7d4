use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::domain::calendar::parse_month_label;
use crate::domain::revenue::TenantRevenueRecord;
use crate::services::datasets::{DatasetError, LoadReport, Loaded, parse_number, read_error};

#[derive(Debug, Deserialize)]
struct TenantRevenueRow {
    #[serde(rename = "Mois")]
    month: Option<String>,
    #[serde(rename = "Nom ensemble immobilier")]
    mall_name: Option<String>,
    #[serde(rename = "Famille enseigne")]
    tenant_family: Option<String>,
    #[serde(rename = "Sous-famille enseigne", default)]
    tenant_subfamily: Option<String>,
    #[serde(rename = "CA Mensuel TTC N")]
    monthly_revenue: Option<String>,
    #[serde(rename = "Superficie (m²)", default)]
    floor_area: Option<String>,
}

pub fn load_tenant_revenue_from_csv_file<P: AsRef<Path>>(
    path: P,
) -> Result<Loaded<TenantRevenueRecord>, DatasetError> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(read_error(path))?;
    let loaded = read_tenant_revenue(reader, path)?;
    loaded.log("tenant_revenue", path);
    Ok(loaded)
}

pub fn deserialize_tenant_revenue_from_csv_str(
    input: &str,
    origin_path: &Path,
) -> Result<Loaded<TenantRevenueRecord>, DatasetError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input.as_bytes());
    read_tenant_revenue(reader, origin_path)
}

fn read_tenant_revenue<R: Read>(
    mut reader: csv::Reader<R>,
    origin_path: &Path,
) -> Result<Loaded<TenantRevenueRecord>, DatasetError> {
    let headers = reader.headers().map_err(read_error(origin_path))?.clone();
    for column in ["Mois", "Nom ensemble immobilier", "Famille enseigne", "CA Mensuel TTC N"] {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(DatasetError::MissingColumn {
                path: origin_path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for row in reader.deserialize::<TenantRevenueRow>() {
        report.total_rows += 1;
        match row.ok().and_then(record_from_row) {
            Some(record) => records.push(record),
            None => report.dropped_rows += 1,
        }
    }

    Ok(Loaded { records, report })
}

fn record_from_row(row: TenantRevenueRow) -> Option<TenantRevenueRecord> {
    let month = parse_month_label(row.month.as_deref()?)?;
    let mall_name = row.mall_name?.trim().to_string();
    if mall_name.is_empty() {
        return None;
    }
    let monthly_revenue = parse_number(row.monthly_revenue.as_deref())?;

    Some(TenantRevenueRecord {
        month,
        mall_name,
        tenant_family: non_blank(row.tenant_family).unwrap_or_else(|| "Unknown".to_string()),
        tenant_subfamily: non_blank(row.tenant_subfamily).unwrap_or_else(|| "Unknown".to_string()),
        monthly_revenue,
        floor_area: parse_number(row.floor_area.as_deref()),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
