use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::event::PlannedEvent;
use crate::domain::flow::AggregatedPoint;
use crate::domain::revenue::RevenuePoint;

pub fn project(points: &[AggregatedPoint], conversion_factor: f64) -> Vec<RevenuePoint> {
    points
        .iter()
        .map(|point| RevenuePoint {
            bucket: point.bucket,
            site: point.site.clone(),
            revenue: point.value * conversion_factor,
        })
        .collect()
}

pub fn total_revenue(points: &[RevenuePoint]) -> f64 {
    points.iter().map(|point| point.revenue).sum()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EventRevenue {
    pub label: String,
    pub start_date: NaiveDate,
    pub impact_pct: f64,
    pub incremental_revenue: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RevenueBreakdown {
    pub conversion_factor: f64,
    pub base_total: f64,
    pub events: Vec<EventRevenue>,
    pub total: f64,
}

/// Revenue attributable to each event.
///
/// `uplifts` are the per-event traffic increments returned by
/// [`crate::services::event_overlay::apply_with_uplifts`], in event order.
/// The total is the base revenue plus every increment.
pub fn incremental_revenue(
    base: &[AggregatedPoint],
    events: &[PlannedEvent],
    uplifts: &[f64],
    conversion_factor: f64,
) -> RevenueBreakdown {
    let base_total = total_revenue(&project(base, conversion_factor));
    let events: Vec<EventRevenue> = events
        .iter()
        .zip(uplifts)
        .map(|(event, uplift)| EventRevenue {
            label: event.label.clone(),
            start_date: event.start_date,
            impact_pct: event.impact_pct,
            incremental_revenue: uplift * conversion_factor,
        })
        .collect();
    let total = base_total + events.iter().map(|e| e.incremental_revenue).sum::<f64>();

    RevenueBreakdown {
        conversion_factor,
        base_total,
        events,
        total,
    }
}
