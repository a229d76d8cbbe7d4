use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use footfall::commands::base_commands::{CliArgs, Commands};
use footfall::commands::events_cmd::events_command;
use footfall::commands::flows_cmd::flows_command;
use footfall::commands::performance_cmd::performance_command;
use footfall::commands::plot_flows_cmd::plot_flows_command;
use footfall::domain::calendar::DateWindow;
use footfall::services::tenant_performance::PerformanceFilter;
use footfall::telemetry;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(e) = telemetry::init() {
        eprintln!("Failed to initialise logging: {e}");
    }

    match args.command {
        Commands::Flows {
            datasets,
            scenario,
            output,
            granularity,
        } => flows_command(&datasets, &scenario, &output, granularity),
        Commands::PlotFlows {
            datasets,
            scenario,
            output,
            granularity,
        } => plot_flows_command(&datasets, &scenario, &output, granularity),
        Commands::Performance {
            datasets,
            start,
            end,
            mall,
            family,
            output,
        } => {
            let filter = PerformanceFilter {
                window: DateWindow::new(start, end),
                malls: mall,
                families: family,
            };
            performance_command(&datasets, &filter, output.as_deref())
        }
        Commands::Events { datasets } => events_command(&datasets),
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}
