use std::path::Path;
use std::process::ExitCode;

use crate::commands::flows_cmd::build_flow_report;
use crate::domain::granularity::Granularity;
use crate::services::flow_plot::plot_flow_report;

pub fn plot_flows_command(
    datasets: &Path,
    scenario: &Path,
    output: &Path,
    granularity: Option<Granularity>,
) -> ExitCode {
    let Some(report) = build_flow_report(datasets, scenario, granularity) else {
        return ExitCode::FAILURE;
    };

    match plot_flow_report(&report, output) {
        Ok(true) => {
            println!("Flow chart written to {}", output.display());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("No data for the selected window and sites, chart skipped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to plot visitor flows: {e}");
            ExitCode::FAILURE
        }
    }
}
