use chrono::NaiveDate;

use crate::domain::calendar::DateWindow;
use crate::domain::granularity::Granularity;

/// Revenue generated per visitor when a scenario does not set its own.
pub const DEFAULT_CONVERSION_FACTOR: f64 = 20.0;

/// Event requested by a scenario, before it is accepted into an
/// [`crate::domain::event::EventStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEvent {
    pub label: String,
    pub site: Option<String>,
    pub date: NaiveDate,
    /// Falls back to the catalog's average impact when absent.
    pub impact_pct: Option<f64>,
}

/// User selection driving one run of the flow analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub granularity: Granularity,
    pub window: DateWindow,
    /// Empty means every site.
    pub sites: Vec<String>,
    pub cutover_date: NaiveDate,
    pub conversion_factor: f64,
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    pub fn includes_site(&self, site: &str) -> bool {
        self.sites.is_empty() || self.sites.iter().any(|selected| selected == site)
    }
}
