use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::flow::TimeSeriesRecord;
use crate::domain::revenue::TenantRevenueRecord;
use crate::domain::visit::VisitDurationRecord;
use crate::services::event_catalog::EventImpact;
use crate::services::event_impacts_csv::load_event_impacts_from_csv_file;
use crate::services::flows_csv::load_flows_from_csv_file;
use crate::services::tenant_revenue_csv::load_tenant_revenue_from_csv_file;
use crate::services::visit_durations_csv::load_visit_durations_from_csv_file;

pub const FLOWS_FILE: &str = "flows.csv";
pub const VISIT_DURATIONS_FILE: &str = "visit_durations.csv";
pub const TENANT_REVENUE_FILE: &str = "tenant_revenue.csv";
pub const EVENT_IMPACTS_FILE: &str = "event_impacts.csv";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("datasets directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("missing datasets: {}", .0.join(", "))]
    MissingInput(Vec<String>),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("missing column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

/// Rows read from a dataset, with the number of rows dropped as invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

impl<T> Loaded<T> {
    pub(crate) fn log(&self, dataset: &str, path: &Path) {
        tracing::info!(
            dataset,
            path = %path.display(),
            rows = self.report.total_rows,
            kept = self.records.len(),
            "loaded dataset"
        );
        if self.report.dropped_rows > 0 {
            tracing::warn!(
                dataset,
                dropped = self.report.dropped_rows,
                "dropped invalid rows"
            );
        }
    }
}

/// Dataset files the flow analysis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Flows,
    VisitDurations,
    TenantRevenue,
    EventImpacts,
}

impl Dataset {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Flows => FLOWS_FILE,
            Self::VisitDurations => VISIT_DURATIONS_FILE,
            Self::TenantRevenue => TENANT_REVENUE_FILE,
            Self::EventImpacts => EVENT_IMPACTS_FILE,
        }
    }
}

/// Location of the dataset files.
#[derive(Debug, Clone)]
pub struct DatasetDir {
    root: PathBuf,
}

impl DatasetDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.file_name())
    }

    /// Fails with every missing file name when any of `required` is absent.
    pub fn require(&self, required: &[Dataset]) -> Result<(), DatasetError> {
        if !self.root.is_dir() {
            return Err(DatasetError::DirectoryNotFound(self.root.clone()));
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|dataset| !self.path(**dataset).is_file())
            .map(|dataset| dataset.file_name().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::MissingInput(missing))
        }
    }

    pub fn load_flows(&self) -> Result<Loaded<TimeSeriesRecord>, DatasetError> {
        load_flows_from_csv_file(self.path(Dataset::Flows))
    }

    pub fn load_visit_durations(&self) -> Result<Loaded<VisitDurationRecord>, DatasetError> {
        load_visit_durations_from_csv_file(self.path(Dataset::VisitDurations))
    }

    pub fn load_tenant_revenue(&self) -> Result<Loaded<TenantRevenueRecord>, DatasetError> {
        load_tenant_revenue_from_csv_file(self.path(Dataset::TenantRevenue))
    }

    pub fn load_event_impacts(&self) -> Result<Loaded<EventImpact>, DatasetError> {
        load_event_impacts_from_csv_file(self.path(Dataset::EventImpacts))
    }
}

pub(crate) fn read_error(path: &Path) -> impl Fn(csv::Error) -> DatasetError + '_ {
    move |source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Parses numbers as exported by spreadsheets: surrounding blanks, spaces as
/// thousands separators and a decimal comma are accepted.
pub(crate) fn parse_number(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

pub(crate) fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}
