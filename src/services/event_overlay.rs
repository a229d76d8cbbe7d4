use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::domain::event::PlannedEvent;
use crate::domain::flow::AggregatedPoint;

/// Overlays `events` on a copy of `aggregated`, from `cutover_date` onwards.
///
/// Events are applied in list order on the running copy, so the multipliers
/// of overlapping events compound. An event matching no point is a no-op.
pub fn apply(
    aggregated: &[AggregatedPoint],
    events: &[PlannedEvent],
    cutover_date: NaiveDate,
) -> Vec<AggregatedPoint> {
    overlay(aggregated, events, |point| point.date() >= cutover_date).0
}

/// Same as [`apply`], also returning the traffic each event adds.
///
/// The uplift of an event is measured against the running series it is
/// applied to, so with overlapping events the uplifts still add up to the
/// difference between the simulated and the base totals.
pub fn apply_with_uplifts(
    aggregated: &[AggregatedPoint],
    events: &[PlannedEvent],
    cutover_date: NaiveDate,
) -> (Vec<AggregatedPoint>, Vec<f64>) {
    overlay(aggregated, events, |point| point.date() >= cutover_date)
}

/// Legacy single-argument variant: site-agnostic, and guarded by a calendar
/// year instead of a cutover.
pub fn apply_in_year(
    aggregated: &[AggregatedPoint],
    events: &[PlannedEvent],
    year: i32,
) -> Vec<AggregatedPoint> {
    let everywhere: Vec<PlannedEvent> = events
        .iter()
        .map(|event| PlannedEvent {
            site: None,
            ..event.clone()
        })
        .collect();
    overlay(aggregated, &everywhere, |point| point.bucket.year() == year).0
}

fn overlay<F>(
    aggregated: &[AggregatedPoint],
    events: &[PlannedEvent],
    in_scope: F,
) -> (Vec<AggregatedPoint>, Vec<f64>)
where
    F: Fn(&AggregatedPoint) -> bool,
{
    let mut simulated = aggregated.to_vec();
    let mut uplifts = Vec::with_capacity(events.len());
    for event in events {
        let multiplier = event.multiplier();
        let mut matched = 0usize;
        let mut uplift = 0.0;
        for point in simulated
            .iter_mut()
            .filter(|point| touches(event, &**point) && in_scope(&**point))
        {
            let scaled = point.value * multiplier;
            uplift += scaled - point.value;
            point.value = scaled;
            matched += 1;
        }
        tracing::debug!(
            event = %event.label,
            start_date = %event.start_date,
            matched,
            uplift,
            "applied planned event"
        );
        uplifts.push(uplift);
    }
    (simulated, uplifts)
}

fn touches(event: &PlannedEvent, point: &AggregatedPoint) -> bool {
    event.applies_to_site(&point.site) && event.window().contains(point.date())
}

/// Points of `series` inside the site and date range of `event`.
pub fn impacted_points<'a>(series: &'a [AggregatedPoint], event: &PlannedEvent) -> Vec<&'a AggregatedPoint> {
    series.iter().filter(|point| touches(event, point)).collect()
}

/// Splits a series into historical points (before the cutover) and forecast
/// points (on or after it).
pub fn split_at_cutover(
    series: &[AggregatedPoint],
    cutover_date: NaiveDate,
) -> (Vec<AggregatedPoint>, Vec<AggregatedPoint>) {
    let cutover = cutover_date.and_time(NaiveTime::MIN);
    series.iter().cloned().partition(|point| point.bucket < cutover)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn point(date: NaiveDate, site: &str, value: f64) -> AggregatedPoint {
        AggregatedPoint {
            bucket: date.and_time(NaiveTime::MIN),
            site: site.to_string(),
            value,
        }
    }

    fn daily_series(site: &str, from: NaiveDate, days: u64, value: f64) -> Vec<AggregatedPoint> {
        from.iter_days()
            .take(days as usize)
            .map(|date| point(date, site, value))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn no_events_is_identity() {
        let series = daily_series("Site A", on_date(2025, 1, 1), 10, 100.0);
        assert_eq!(apply(&series, &[], on_date(2025, 1, 1)), series);
    }

    #[test]
    fn single_event_scales_its_week() {
        let series = vec![point(on_date(2025, 1, 1), "Site A", 150.0)];
        let event = PlannedEvent::new("Sale", Some("Site A"), on_date(2025, 1, 1), 10.0);
        assert_eq!(event.end_date, on_date(2025, 1, 5));

        let simulated = apply(&series, &[event], on_date(2025, 1, 1));
        assert_close(simulated[0].value, 165.0);
        // input untouched
        assert_eq!(series[0].value, 150.0);
    }

    #[test]
    fn event_is_restricted_to_its_site_and_week() {
        let mut series = daily_series("Site A", on_date(2025, 1, 6), 14, 100.0);
        series.extend(daily_series("Site B", on_date(2025, 1, 6), 14, 100.0));
        // Wednesday 2025-01-08 -> Sunday 2025-01-12
        let event = PlannedEvent::new("Sale", Some("Site A"), on_date(2025, 1, 8), 20.0);

        let simulated = apply(&series, &[event], on_date(2025, 1, 1));
        for point in &simulated {
            let in_week = point.date() >= on_date(2025, 1, 8) && point.date() <= on_date(2025, 1, 12);
            let expected = if point.site == "Site A" && in_week { 120.0 } else { 100.0 };
            assert_close(point.value, expected);
        }
    }

    #[test]
    fn non_overlapping_events_only_touch_their_own_window() {
        let series = daily_series("Site A", on_date(2025, 1, 6), 14, 100.0);
        let events = vec![
            PlannedEvent::new("First", Some("Site A"), on_date(2025, 1, 6), 10.0),
            PlannedEvent::new("Second", Some("Site A"), on_date(2025, 1, 13), 50.0),
        ];

        let simulated = apply(&series, &events, on_date(2025, 1, 1));
        for point in &simulated[..7] {
            assert_close(point.value, 110.0);
        }
        for point in &simulated[7..] {
            assert_close(point.value, 150.0);
        }
    }

    #[test]
    fn overlapping_events_compound_multiplicatively() {
        let series = vec![point(on_date(2025, 1, 10), "Site A", 200.0)];
        let events = vec![
            PlannedEvent::new("Sale", Some("Site A"), on_date(2025, 1, 8), 10.0),
            PlannedEvent::new("Concert", None, on_date(2025, 1, 9), 20.0),
        ];

        let simulated = apply(&series, &events, on_date(2025, 1, 1));
        assert_close(simulated[0].value, 200.0 * 1.1 * 1.2);
        assert!((simulated[0].value - 200.0 * (1.0 + 0.1 + 0.2)).abs() > 1.0);
    }

    #[test]
    fn uplifts_add_up_to_the_simulated_difference() {
        let series = daily_series("Site A", on_date(2025, 1, 6), 14, 100.0);
        let events = vec![
            PlannedEvent::new("Sale", Some("Site A"), on_date(2025, 1, 8), 10.0),
            PlannedEvent::new("Concert", None, on_date(2025, 1, 10), 20.0),
            PlannedEvent::new("Fair", None, on_date(2025, 1, 13), 5.0),
        ];

        let (simulated, uplifts) = apply_with_uplifts(&series, &events, on_date(2025, 1, 1));
        let base_total: f64 = series.iter().map(|p| p.value).sum();
        let simulated_total: f64 = simulated.iter().map(|p| p.value).sum();

        assert_eq!(uplifts.len(), 3);
        // Sale: 5 days at +10; Concert: 3 days on top of already scaled values.
        assert_close(uplifts[0], 50.0);
        assert_close(uplifts[1], 3.0 * 110.0 * 0.2);
        assert_close(uplifts[2], 7.0 * 5.0);
        assert_close(uplifts.iter().sum::<f64>(), simulated_total - base_total);
    }

    #[test]
    fn points_before_cutover_are_never_overlaid() {
        let series = daily_series("Site A", on_date(2024, 12, 30), 7, 100.0);
        let event = PlannedEvent::new("Sale", Some("Site A"), on_date(2024, 12, 30), 10.0);

        let simulated = apply(&series, &[event], on_date(2025, 1, 1));
        for point in &simulated {
            let expected = if point.date() >= on_date(2025, 1, 1) { 110.0 } else { 100.0 };
            assert_close(point.value, expected);
        }
    }

    #[test]
    fn event_without_matching_points_is_a_no_op() {
        let series = daily_series("Site A", on_date(2025, 1, 1), 5, 100.0);
        let event = PlannedEvent::new("Later", Some("Site A"), on_date(2025, 6, 2), 30.0);
        assert_eq!(apply(&series, &[event], on_date(2025, 1, 1)), series);
    }

    #[test]
    fn year_guarded_variant_ignores_site_and_other_years() {
        let mut series = daily_series("Site A", on_date(2024, 12, 30), 7, 100.0);
        series.extend(daily_series("Site B", on_date(2024, 12, 30), 7, 100.0));
        let event = PlannedEvent::new("Sale", Some("Site A"), on_date(2024, 12, 30), 10.0);

        let simulated = apply_in_year(&series, &[event], 2025);
        for point in &simulated {
            let expected = if point.bucket.year() == 2025 { 110.0 } else { 100.0 };
            assert_close(point.value, expected);
        }
    }

    #[test]
    fn split_at_cutover_partitions_the_series() {
        let series = daily_series("Site A", on_date(2024, 12, 29), 5, 1.0);
        let (historical, forecast) = split_at_cutover(&series, on_date(2025, 1, 1));

        assert_eq!(historical.len(), 3);
        assert_eq!(forecast.len(), 2);
        assert!(forecast.iter().all(|p| p.date() >= on_date(2025, 1, 1)));
    }

    #[test]
    fn impacted_points_follow_event_window() {
        let series = daily_series("Site A", on_date(2025, 1, 6), 14, 100.0);
        let event = PlannedEvent::new("Sale", Some("Site A"), on_date(2025, 1, 10), 10.0);

        let touched = impacted_points(&series, &event);
        let dates: Vec<NaiveDate> = touched.iter().map(|p| p.date()).collect();
        assert_eq!(
            dates,
            vec![on_date(2025, 1, 10), on_date(2025, 1, 11), on_date(2025, 1, 12)]
        );
    }
}
