use std::path::Path;
use std::process::ExitCode;

use crate::commands::report_format::format_flow_report;
use crate::domain::granularity::Granularity;
use crate::services::datasets::DatasetDir;
use crate::services::flow_analysis::{FlowReport, run_flow_analysis};
use crate::services::report_output::write_report_file;
use crate::services::scenario_yaml::load_scenario_from_yaml_file;

pub fn flows_command(
    datasets: &Path,
    scenario: &Path,
    output: &Path,
    granularity: Option<Granularity>,
) -> ExitCode {
    let Some(report) = build_flow_report(datasets, scenario, granularity) else {
        return ExitCode::FAILURE;
    };

    println!("{}", format_flow_report(&report));

    if let Err(e) = write_report_file(output, &report) {
        eprintln!("Failed to write flow report: {e}");
        return ExitCode::FAILURE;
    }
    println!("Flow report written to {}", output.display());
    ExitCode::SUCCESS
}

/// Loads the scenario and runs the analysis, reporting failures on stderr.
pub(crate) fn build_flow_report(
    datasets: &Path,
    scenario: &Path,
    granularity: Option<Granularity>,
) -> Option<FlowReport> {
    let mut scenario = match load_scenario_from_yaml_file(scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {e}");
            return None;
        }
    };
    if let Some(granularity) = granularity {
        scenario.granularity = granularity;
    }

    match run_flow_analysis(&DatasetDir::new(datasets), &scenario) {
        Ok(report) => Some(report),
        Err(e) => {
            eprintln!("Failed to analyse visitor flows: {e}");
            None
        }
    }
}
