use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use plotters::prelude::*;
use thiserror::Error;

use crate::domain::flow::AggregatedPoint;
use crate::services::event_overlay::impacted_points;
use crate::services::flow_analysis::FlowReport;

const CUTOVER_LABEL: &str = "Forecast start";

#[derive(Error, Debug)]
pub enum FlowPlotError {
    #[error("failed to render flow chart: {0}")]
    Render(String),
}

#[derive(Debug, Clone, PartialEq)]
struct SiteLine {
    site: String,
    historical: Vec<(i32, f64)>,
    /// Starts at the last historical point so both lines join.
    forecast: Vec<(i32, f64)>,
}

/// An impacted forecast point, annotated with its event.
#[derive(Debug, Clone, PartialEq)]
struct EventMarker {
    x: i32,
    y: f64,
    label: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    buckets: Vec<NaiveDateTime>,
    lines: Vec<SiteLine>,
    cutover_index: Option<i32>,
    markers: Vec<EventMarker>,
    max_value: f64,
}

/// Renders the simulated series of `report` as a PNG line chart.
///
/// Returns `false` without writing anything when the report has no data.
pub fn plot_flow_report(report: &FlowReport, output_path: &Path) -> Result<bool, FlowPlotError> {
    if report.is_empty() {
        tracing::info!("empty selection, chart skipped");
        return Ok(false);
    }
    let series = prepare(report);
    render_plot_png(output_path, report, &series)?;
    Ok(true)
}

fn prepare(report: &FlowReport) -> ChartSeries {
    let mut buckets: Vec<NaiveDateTime> = report.simulated.iter().map(|point| point.bucket).collect();
    buckets.sort();
    buckets.dedup();
    let index_of = |point: &AggregatedPoint| {
        buckets
            .binary_search(&point.bucket)
            .ok()
            .map(|index| (index as i32, point.value))
    };

    let mut by_site: BTreeMap<&str, SiteLine> = BTreeMap::new();
    for point in &report.historical {
        if let Some(xy) = index_of(point) {
            line_for(&mut by_site, &point.site).historical.push(xy);
        }
    }
    for line in by_site.values_mut() {
        if let Some(last) = line.historical.last() {
            line.forecast.push(*last);
        }
    }
    for point in &report.forecast {
        if let Some(xy) = index_of(point) {
            line_for(&mut by_site, &point.site).forecast.push(xy);
        }
    }

    let cutover_index = report
        .forecast
        .first()
        .and_then(|point| buckets.binary_search(&point.bucket).ok())
        .map(|index| index as i32);

    let markers = report
        .events
        .iter()
        .flat_map(|event| {
            let label = format!("{} {:+.0}%", event.label, event.impact_pct);
            impacted_points(&report.forecast, event)
                .into_iter()
                .filter_map(index_of)
                .map(move |(x, y)| EventMarker {
                    x,
                    y,
                    label: label.clone(),
                })
        })
        .collect();

    let max_value = report
        .simulated
        .iter()
        .map(|point| point.value)
        .fold(0.0, f64::max);

    ChartSeries {
        buckets,
        lines: by_site.into_values().collect(),
        cutover_index,
        markers,
        max_value,
    }
}

fn line_for<'m, 'a>(
    by_site: &'m mut BTreeMap<&'a str, SiteLine>,
    site: &'a str,
) -> &'m mut SiteLine {
    by_site.entry(site).or_insert_with(|| SiteLine {
        site: site.to_string(),
        historical: Vec::new(),
        forecast: Vec::new(),
    })
}

fn forecast_label(site: &str) -> String {
    format!("{site} (forecast)")
}

fn render_plot_png(
    output_path: &Path,
    report: &FlowReport,
    series: &ChartSeries,
) -> Result<(), FlowPlotError> {
    let max_x = series.buckets.len().max(1) as i32;
    let max_y = if series.max_value > 0.0 {
        series.max_value * 1.1
    } else {
        1.0
    };

    let root = BitMapBackend::new(output_path, (1200, 650)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;

    let caption = format!("Visitor traffic {}", report.granularity.caption());
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(75)
        .build_cartesian_2d(0..max_x, 0.0..max_y)
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;

    let format = report.granularity.bucket_format();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Period")
        .y_desc("Visitors")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .x_labels(series.buckets.len().clamp(1, 10))
        .x_label_formatter(&|index| {
            if *index < 0 {
                return String::new();
            }
            series
                .buckets
                .get(*index as usize)
                .map(|bucket| bucket.format(format).to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;

    for (index, line) in series.lines.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(line.historical.iter().copied(), color.stroke_width(2)))
            .map_err(|e| FlowPlotError::Render(e.to_string()))?
            .label(line.site.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(LineSeries::new(
                line.forecast.iter().copied(),
                color.mix(0.6).stroke_width(3),
            ))
            .map_err(|e| FlowPlotError::Render(e.to_string()))?
            .label(forecast_label(&line.site))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.mix(0.6).stroke_width(3))
            });
    }

    if let Some(cutover) = series.cutover_index {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(cutover, 0.0), (cutover, max_y)],
                BLACK.stroke_width(1),
            )))
            .map_err(|e| FlowPlotError::Render(e.to_string()))?
            .label(CUTOVER_LABEL)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(1)));
    }

    chart
        .draw_series(series.markers.iter().map(|marker| {
            EmptyElement::at((marker.x, marker.y))
                + Circle::new((0, 0), 5, RED.filled())
                + Text::new(marker.label.clone(), (8, -18), ("sans-serif", 14).into_font())
        }))
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;

    root.present()
        .map_err(|e| FlowPlotError::Render(e.to_string()))?;
    Ok(())
}
