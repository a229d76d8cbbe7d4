use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::calendar::DateWindow;
use crate::domain::granularity::Granularity;
use crate::domain::scenario::{DEFAULT_CONVERSION_FACTOR, Scenario, ScenarioEvent};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse scenario file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid date format in {path}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { path: PathBuf, value: String },
    #[error("invalid granularity in {path}: {value}")]
    InvalidGranularity { path: PathBuf, value: String },
    #[error("invalid date range in {path}: start_date {start_date} is after end_date {end_date}")]
    InvalidDateRange {
        path: PathBuf,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[error("invalid conversion factor in {path}: {value}")]
    InvalidConversionFactor { path: PathBuf, value: f64 },
}

#[derive(Debug, Deserialize)]
struct ScenarioRecord {
    granularity: Option<String>,
    start_date: String,
    end_date: String,
    sites: Option<Vec<String>>,
    cutover_date: String,
    conversion_factor: Option<f64>,
    events: Option<Vec<ScenarioEventRecord>>,
}

#[derive(Debug, Deserialize)]
struct ScenarioEventRecord {
    label: String,
    site: Option<String>,
    date: String,
    impact_pct: Option<f64>,
}

pub fn load_scenario_from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_scenario_from_yaml_str(&contents, path)
}

pub fn deserialize_scenario_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<Scenario, ScenarioError> {
    let record: ScenarioRecord =
        serde_yaml::from_str(input).map_err(|source| ScenarioError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?;

    let granularity = match record.granularity {
        Some(value) => value
            .parse::<Granularity>()
            .map_err(|_| ScenarioError::InvalidGranularity {
                path: origin_path.to_path_buf(),
                value,
            })?,
        None => Granularity::Daily,
    };

    let start_date = parse_date(&record.start_date, origin_path)?;
    let end_date = parse_date(&record.end_date, origin_path)?;
    if start_date > end_date {
        return Err(ScenarioError::InvalidDateRange {
            path: origin_path.to_path_buf(),
            start_date,
            end_date,
        });
    }

    let conversion_factor = record.conversion_factor.unwrap_or(DEFAULT_CONVERSION_FACTOR);
    if !conversion_factor.is_finite() || conversion_factor < 0.0 {
        return Err(ScenarioError::InvalidConversionFactor {
            path: origin_path.to_path_buf(),
            value: conversion_factor,
        });
    }

    let events = record
        .events
        .unwrap_or_default()
        .into_iter()
        .map(|event| {
            Ok(ScenarioEvent {
                date: parse_date(&event.date, origin_path)?,
                label: event.label,
                site: event.site,
                impact_pct: event.impact_pct,
            })
        })
        .collect::<Result<Vec<_>, ScenarioError>>()?;

    Ok(Scenario {
        granularity,
        window: DateWindow::new(start_date, end_date),
        sites: record.sites.unwrap_or_default(),
        cutover_date: parse_date(&record.cutover_date, origin_path)?,
        conversion_factor,
        events,
    })
}

fn parse_date(value: &str, origin_path: &Path) -> Result<NaiveDate, ScenarioError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ScenarioError::InvalidDate {
        path: origin_path.to_path_buf(),
        value: value.to_string(),
    })
}
