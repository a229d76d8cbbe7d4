use std::path::Path;
use std::process::ExitCode;

use crate::commands::report_format::format_event_candidates;
use crate::services::datasets::{Dataset, DatasetDir};
use crate::services::event_catalog::EventCatalog;

pub fn events_command(datasets: &Path) -> ExitCode {
    let datasets = DatasetDir::new(datasets);
    let impacts = match datasets
        .require(&[Dataset::EventImpacts])
        .and_then(|()| datasets.load_event_impacts())
    {
        Ok(loaded) => loaded.records,
        Err(e) => {
            eprintln!("Failed to load event impacts: {e}");
            return ExitCode::FAILURE;
        }
    };

    let catalog = EventCatalog::from_impacts(&impacts);
    println!("{}", format_event_candidates(catalog.candidates()));
    ExitCode::SUCCESS
}
