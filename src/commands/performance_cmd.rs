use std::path::Path;
use std::process::ExitCode;

use crate::commands::report_format::format_performance_report;
use crate::services::datasets::{Dataset, DatasetDir};
use crate::services::report_output::write_report_file;
use crate::services::tenant_performance::{PerformanceFilter, analyze};

pub fn performance_command(
    datasets: &Path,
    filter: &PerformanceFilter,
    output: Option<&Path>,
) -> ExitCode {
    if filter.window.is_empty() {
        eprintln!(
            "Invalid period: start {} is after end {}",
            filter.window.start_date, filter.window.end_date
        );
        return ExitCode::FAILURE;
    }

    let datasets = DatasetDir::new(datasets);
    let records = match datasets
        .require(&[Dataset::TenantRevenue])
        .and_then(|()| datasets.load_tenant_revenue())
    {
        Ok(loaded) => loaded.records,
        Err(e) => {
            eprintln!("Failed to load tenant revenue: {e}");
            return ExitCode::FAILURE;
        }
    };

    let performance = analyze(&records, filter);
    println!("{}", format_performance_report(&performance));

    if let Some(output) = output {
        if let Err(e) = write_report_file(output, &performance) {
            eprintln!("Failed to write performance report: {e}");
            return ExitCode::FAILURE;
        }
        println!("Performance report written to {}", output.display());
    }
    ExitCode::SUCCESS
}
