use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::granularity::Granularity;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate visitor flows, simulate planned events and write the report
    Flows {
        /// Directory holding the dataset CSV files
        #[arg(short, long)]
        datasets: PathBuf,
        /// Scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,
        /// Output report file (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        output: PathBuf,
        /// Override the scenario granularity
        #[arg(short, long, value_enum)]
        granularity: Option<Granularity>,
    },
    /// Plot historical and simulated visitor flows into a PNG chart
    PlotFlows {
        /// Directory holding the dataset CSV files
        #[arg(short, long)]
        datasets: PathBuf,
        /// Scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,
        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
        /// Override the scenario granularity
        #[arg(short, long, value_enum)]
        granularity: Option<Granularity>,
    },
    /// Report tenant revenue KPIs for a period
    Performance {
        /// Directory holding the dataset CSV files
        #[arg(short, long)]
        datasets: PathBuf,
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Restrict to these malls (repeatable)
        #[arg(long)]
        mall: Vec<String>,
        /// Restrict to these tenant families (repeatable)
        #[arg(long)]
        family: Vec<String>,
        /// Optional output report file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the events available for simulation
    Events {
        /// Directory holding the dataset CSV files
        #[arg(short, long)]
        datasets: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
