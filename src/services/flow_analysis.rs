use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::calendar::DateWindow;
use crate::domain::event::{EventStore, PlannedEvent};
use crate::domain::flow::{AggregatedPoint, TimeSeriesRecord};
use crate::domain::granularity::Granularity;
use crate::domain::scenario::Scenario;
use crate::domain::visit::VisitDurationRecord;
use crate::services::aggregation::{aggregate, sites, total};
use crate::services::datasets::{Dataset, DatasetDir, DatasetError};
use crate::services::event_catalog::{CatalogError, EventCatalog};
use crate::services::event_overlay::{apply_with_uplifts, split_at_cutover};
use crate::services::kpi::{Kpi, mean};
use crate::services::period_comparison::previous_window;
use crate::services::revenue_projection::{
    RevenueBreakdown, incremental_revenue, project, total_revenue,
};

#[derive(Error, Debug)]
pub enum FlowAnalysisError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Non-fatal conditions met while running an analysis.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No aggregated point matches the selected window and sites.
    EmptySelection,
    RejectedEvent {
        label: String,
        date: NaiveDate,
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EmptySelection => write!(f, "no data for the selected window and sites"),
            Notice::RejectedEvent {
                label,
                date,
                reason,
            } => write!(f, "event {label} on {date} skipped: {reason}"),
        }
    }
}

/// Datasets the flow analysis reads.
#[derive(Debug, Clone, Default)]
pub struct FlowInputs {
    pub flows: Vec<TimeSeriesRecord>,
    pub visit_durations: Vec<VisitDurationRecord>,
    pub catalog: EventCatalog,
}

impl FlowInputs {
    pub const REQUIRED: [Dataset; 3] = [
        Dataset::Flows,
        Dataset::VisitDurations,
        Dataset::EventImpacts,
    ];

    pub fn load(datasets: &DatasetDir) -> Result<Self, DatasetError> {
        datasets.require(&Self::REQUIRED)?;
        Ok(Self {
            flows: datasets.load_flows()?.records,
            visit_durations: datasets.load_visit_durations()?.records,
            catalog: EventCatalog::from_impacts(&datasets.load_event_impacts()?.records),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub granularity: Granularity,
    pub window: DateWindow,
    pub previous_window: DateWindow,
    pub cutover_date: NaiveDate,
    pub sites: Vec<String>,
    pub flow: Kpi,
    pub visit_duration: Kpi,
    pub revenue: Kpi,
    pub revenue_breakdown: RevenueBreakdown,
    pub events: Vec<PlannedEvent>,
    pub notices: Vec<Notice>,
    pub base: Vec<AggregatedPoint>,
    pub simulated: Vec<AggregatedPoint>,
    pub historical: Vec<AggregatedPoint>,
    pub forecast: Vec<AggregatedPoint>,
}

impl FlowReport {
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

/// Turns the scenario's events into an [`EventStore`].
///
/// Events without an explicit impact take the catalog average; an unknown
/// label then fails the run. Events colliding on a start date are skipped and
/// reported as notices.
pub fn plan_events(
    scenario: &Scenario,
    catalog: &EventCatalog,
) -> Result<(EventStore, Vec<Notice>), CatalogError> {
    let mut store = EventStore::new();
    let mut notices = Vec::new();
    for requested in &scenario.events {
        let site = requested.site.as_deref();
        let event = match requested.impact_pct {
            Some(impact_pct) => PlannedEvent::new(&requested.label, site, requested.date, impact_pct),
            None => catalog.plan(&requested.label, site, requested.date)?,
        };
        if let Err(e) = store.add(event) {
            tracing::warn!(label = %requested.label, date = %requested.date, "{e}");
            notices.push(Notice::RejectedEvent {
                label: requested.label.clone(),
                date: requested.date,
                reason: e.to_string(),
            });
        }
    }
    Ok((store, notices))
}

/// Runs the whole pipeline for `scenario` on the given inputs.
pub fn analyze(inputs: &FlowInputs, scenario: &Scenario, store: &EventStore) -> FlowReport {
    let window = scenario.window;
    let aggregated = aggregate(&inputs.flows, scenario.granularity);
    let selected = |point: &&AggregatedPoint| scenario.includes_site(&point.site);

    let base: Vec<AggregatedPoint> = aggregated
        .iter()
        .filter(selected)
        .filter(|point| window.contains(point.date()))
        .cloned()
        .collect();

    let mut notices = Vec::new();
    if base.is_empty() {
        tracing::info!(
            start_date = %window.start_date,
            end_date = %window.end_date,
            sites = ?scenario.sites,
            "empty selection"
        );
        notices.push(Notice::EmptySelection);
    }

    let previous = previous_window(window.start_date, window.end_date, scenario.granularity);
    let previous_total: f64 = aggregated
        .iter()
        .filter(selected)
        .filter(|point| previous.contains(point.date()))
        .map(|point| point.value)
        .sum();

    let durations = inputs
        .visit_durations
        .iter()
        .filter(|record| scenario.includes_site(&record.mall_name));
    let visit_duration = Kpi::new(
        mean(
            durations
                .clone()
                .filter(|record| window.contains(record.month))
                .map(|record| record.average_minutes),
        ),
        mean(
            durations
                .filter(|record| record.month < window.start_date)
                .map(|record| record.average_minutes),
        ),
    );

    let events = store.events();
    let (simulated, uplifts) = apply_with_uplifts(&base, events, scenario.cutover_date);
    let revenue_breakdown =
        incremental_revenue(&base, events, &uplifts, scenario.conversion_factor);
    let simulated_revenue = total_revenue(&project(&simulated, scenario.conversion_factor));
    let (historical, forecast) = split_at_cutover(&simulated, scenario.cutover_date);

    tracing::debug!(
        points = base.len(),
        events = events.len(),
        base_revenue = revenue_breakdown.base_total,
        simulated_revenue,
        "flow analysis complete"
    );

    FlowReport {
        granularity: scenario.granularity,
        window,
        previous_window: previous,
        cutover_date: scenario.cutover_date,
        sites: sites(&base),
        flow: Kpi::new(total(&base), previous_total),
        visit_duration,
        revenue: Kpi::new(simulated_revenue, revenue_breakdown.base_total),
        revenue_breakdown,
        events: events.to_vec(),
        notices,
        base,
        simulated,
        historical,
        forecast,
    }
}

/// Loads the datasets, plans the scenario's events and analyses them.
pub fn run_flow_analysis(
    datasets: &DatasetDir,
    scenario: &Scenario,
) -> Result<FlowReport, FlowAnalysisError> {
    let inputs = FlowInputs::load(datasets)?;
    let (store, mut notices) = plan_events(scenario, &inputs.catalog)?;
    let mut report = analyze(&inputs, scenario, &store);
    notices.append(&mut report.notices);
    report.notices = notices;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::ScenarioEvent;
    use crate::services::event_catalog::EventImpact;
    use chrono::NaiveDateTime;

    fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn flow(date: NaiveDate, hour: u32, site: &str, value: f64) -> TimeSeriesRecord {
        TimeSeriesRecord {
            timestamp: at(date, hour),
            site: site.to_string(),
            metric_value: value,
        }
    }

    fn scenario(start: NaiveDate, end: NaiveDate, cutover: NaiveDate) -> Scenario {
        Scenario {
            granularity: Granularity::Daily,
            window: DateWindow::new(start, end),
            sites: Vec::new(),
            cutover_date: cutover,
            conversion_factor: 2.0,
            events: Vec::new(),
        }
    }

    fn requested(label: &str, date: NaiveDate, impact_pct: Option<f64>) -> ScenarioEvent {
        ScenarioEvent {
            label: label.to_string(),
            site: None,
            date,
            impact_pct,
        }
    }

    #[test]
    fn daily_total_with_a_ten_percent_event() {
        let day = on_date(2025, 1, 1);
        let inputs = FlowInputs {
            flows: vec![flow(day, 0, "A", 100.0), flow(day, 1, "A", 50.0)],
            ..FlowInputs::default()
        };
        let scenario = scenario(day, day, day);

        let report = analyze(&inputs, &scenario, &EventStore::new());
        assert_eq!(report.base.len(), 1);
        assert_eq!(report.base[0].value, 150.0);
        assert_eq!(report.simulated, report.base);

        let mut store = EventStore::new();
        store.add(PlannedEvent::new("Concert", Some("A"), day, 10.0)).unwrap();
        let report = analyze(&inputs, &scenario, &store);

        assert!((report.simulated[0].value - 165.0).abs() < 1e-9);
        assert!((report.revenue.current - 330.0).abs() < 1e-9);
        assert_eq!(report.revenue.previous, 300.0);
        assert!((report.revenue_breakdown.events[0].incremental_revenue - 30.0).abs() < 1e-9);
        assert_eq!(report.historical, Vec::new());
        assert_eq!(report.forecast.len(), 1);
    }

    #[test]
    fn compares_flow_with_the_previous_window() {
        let inputs = FlowInputs {
            flows: vec![
                flow(on_date(2025, 1, 8), 10, "A", 40.0),
                flow(on_date(2025, 1, 9), 10, "A", 60.0),
                flow(on_date(2025, 1, 10), 10, "A", 150.0),
                flow(on_date(2025, 1, 11), 10, "A", 50.0),
                flow(on_date(2025, 1, 11), 10, "B", 1000.0),
            ],
            ..FlowInputs::default()
        };
        let mut scenario = scenario(on_date(2025, 1, 10), on_date(2025, 1, 11), on_date(2025, 2, 1));
        scenario.sites = vec!["A".to_string()];

        let report = analyze(&inputs, &scenario, &EventStore::new());
        assert_eq!(report.sites, vec!["A".to_string()]);
        assert_eq!(
            report.previous_window,
            DateWindow::new(on_date(2025, 1, 9), on_date(2025, 1, 9))
        );
        assert_eq!(report.flow.current, 200.0);
        assert_eq!(report.flow.previous, 60.0);
        assert!(report.notices.is_empty());
    }

    #[test]
    fn averages_visit_durations_before_and_within_the_window() {
        let visit = |mall: &str, month: u32, minutes: f64| VisitDurationRecord {
            mall_id: "1".to_string(),
            mall_name: mall.to_string(),
            month: on_date(2024, month, 1),
            average_minutes: minutes,
        };
        let inputs = FlowInputs {
            visit_durations: vec![
                visit("A", 1, 30.0),
                visit("A", 2, 40.0),
                visit("A", 3, 60.0),
                visit("B", 3, 100.0),
            ],
            ..FlowInputs::default()
        };
        let mut scenario = scenario(on_date(2024, 3, 1), on_date(2024, 3, 31), on_date(2024, 3, 1));
        scenario.sites = vec!["A".to_string()];

        let report = analyze(&inputs, &scenario, &EventStore::new());
        assert_eq!(report.visit_duration.current, 60.0);
        assert_eq!(report.visit_duration.previous, 35.0);
        assert!((report.visit_duration.variance_pct - 71.428_571).abs() < 1e-3);
    }

    #[test]
    fn empty_selection_is_reported_as_a_notice() {
        let inputs = FlowInputs {
            flows: vec![flow(on_date(2025, 1, 1), 10, "A", 10.0)],
            ..FlowInputs::default()
        };
        let scenario = scenario(on_date(2026, 1, 1), on_date(2026, 1, 31), on_date(2026, 1, 1));

        let report = analyze(&inputs, &scenario, &EventStore::new());
        assert!(report.is_empty());
        assert_eq!(report.notices, vec![Notice::EmptySelection]);
        assert_eq!(report.flow.variance_pct, 0.0);
        assert_eq!(report.revenue.current, 0.0);
    }

    #[test]
    fn plan_events_uses_catalog_average_and_skips_duplicates() {
        let catalog = EventCatalog::from_impacts(&[
            EventImpact {
                label: "Soldes".to_string(),
                impact_pct: 10.0,
            },
            EventImpact {
                label: "Soldes".to_string(),
                impact_pct: 20.0,
            },
        ]);
        let day = on_date(2025, 1, 8);
        let mut scenario = scenario(day, day, day);
        scenario.events = vec![
            requested("Soldes", day, None),
            requested("Concert", day, Some(5.0)),
            requested("Concert", on_date(2025, 1, 15), Some(5.0)),
        ];

        let (store, notices) = plan_events(&scenario, &catalog).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.events()[0].impact_pct, 15.0);
        assert_eq!(
            notices,
            vec![Notice::RejectedEvent {
                label: "Concert".to_string(),
                date: day,
                reason: "an event is already planned on 2025-01-08".to_string(),
            }]
        );
    }

    #[test]
    fn plan_events_fails_on_unknown_label_without_impact() {
        let day = on_date(2025, 1, 8);
        let mut scenario = scenario(day, day, day);
        scenario.events = vec![requested("Mystery", day, None)];

        let err = plan_events(&scenario, &EventCatalog::default()).unwrap_err();
        assert_eq!(err, CatalogError::UnknownEvent("Mystery".to_string()));
    }
}
