use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// Document format of a written report, picked from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Yaml,
    Json,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

pub fn serialize_report<W: Write, T: Serialize>(
    writer: &mut W,
    report: &T,
    format: ReportFormat,
) -> io::Result<()> {
    match format {
        ReportFormat::Yaml => {
            let yaml = serde_yaml::to_string(report).map_err(io::Error::other)?;
            writer.write_all(yaml.as_bytes())
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report).map_err(io::Error::other)?;
            writer.write_all(b"\n")
        }
    }
}

pub fn write_report_file<T: Serialize>(path: &Path, report: &T) -> io::Result<()> {
    let mut buffer = Vec::new();
    serialize_report(&mut buffer, report, ReportFormat::from_path(path))?;
    std::fs::write(path, buffer)
}
