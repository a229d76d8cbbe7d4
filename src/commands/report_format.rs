use crate::services::event_catalog::EventCandidate;
use crate::services::flow_analysis::FlowReport;
use crate::services::kpi::Kpi;
use crate::services::tenant_performance::TenantPerformance;

pub fn format_flow_report(report: &FlowReport) -> String {
    let sites = if report.sites.is_empty() {
        "none".to_string()
    } else {
        report.sites.join(", ")
    };

    let mut lines = Vec::new();
    lines.push("Flow Report".to_string());
    lines.push(format!(
        "Period: {} to {} ({})",
        report.window.start_date, report.window.end_date, report.granularity
    ));
    lines.push(format!(
        "Compared with: {} to {}",
        report.previous_window.start_date, report.previous_window.end_date
    ));
    lines.push(format!("Cutover: {}", report.cutover_date));
    lines.push(format!("Sites: {sites}"));
    lines.push(String::new());
    lines.push("KPI | Current | Previous | Variation".to_string());
    lines.push("----|---------|----------|----------".to_string());
    lines.push(format_kpi_row("Visitors", &report.flow));
    lines.push(format_kpi_row("Visit duration (min)", &report.visit_duration));
    lines.push(format_kpi_row("Revenue (simulated vs base)", &report.revenue));

    if !report.revenue_breakdown.events.is_empty() {
        lines.push(String::new());
        lines.push("Event | Start | Impact | Incremental revenue".to_string());
        lines.push("------|-------|--------|--------------------".to_string());
        for event in &report.revenue_breakdown.events {
            lines.push(format!(
                "{} | {} | {:+.1}% | {:.2}",
                event.label, event.start_date, event.impact_pct, event.incremental_revenue
            ));
        }
        lines.push(format!(
            "Total revenue: {:.2} (base {:.2})",
            report.revenue_breakdown.total, report.revenue_breakdown.base_total
        ));
    }

    if !report.notices.is_empty() {
        lines.push(String::new());
        lines.push("Notices:".to_string());
        for notice in &report.notices {
            lines.push(format!("- {notice}"));
        }
    }

    lines.join("\n")
}

pub fn format_performance_report(performance: &TenantPerformance) -> String {
    let mut lines = Vec::new();
    lines.push("Tenant Performance".to_string());
    lines.push(format!(
        "Period: {} to {}",
        performance.window.start_date, performance.window.end_date
    ));
    lines.push(format!(
        "Compared with: {} to {}",
        performance.previous_window.start_date, performance.previous_window.end_date
    ));
    lines.push(format!("Records: {}", performance.records));
    lines.push(String::new());
    lines.push("KPI | Current | Previous | Variation".to_string());
    lines.push("----|---------|----------|----------".to_string());
    lines.push(format_kpi_row("Total revenue", &performance.total_revenue));
    lines.push(format_kpi_row(
        "Average revenue per center",
        &performance.average_revenue_per_center,
    ));
    lines.push(format_kpi_row(
        "Average revenue per family",
        &performance.average_revenue_per_family,
    ));

    if !performance.revenue_per_center.is_empty() {
        lines.push(String::new());
        lines.push("Center | Average revenue".to_string());
        lines.push("-------|----------------".to_string());
        for center in &performance.revenue_per_center {
            lines.push(format!("{} | {:.2}", center.mall, center.average_revenue));
        }
    }

    if !performance.monthly_revenue_per_center.is_empty() {
        lines.push(String::new());
        lines.push("Center | Month | Average revenue".to_string());
        lines.push("-------|-------|----------------".to_string());
        for row in &performance.monthly_revenue_per_center {
            lines.push(format!(
                "{} | {} | {:.2}",
                row.mall,
                row.month.format("%Y-%m"),
                row.average_revenue
            ));
        }
    }

    if !performance.revenue_per_center_and_family.is_empty() {
        lines.push(String::new());
        lines.push("Center | Family | Average revenue | Revenue per m²".to_string());
        lines.push("-------|--------|-----------------|---------------".to_string());
        for row in &performance.revenue_per_center_and_family {
            let per_square_metre = performance
                .revenue_per_square_metre
                .iter()
                .find(|area| area.mall == row.mall && area.family == row.family)
                .map_or(0.0, |area| area.revenue_per_square_metre);
            lines.push(format!(
                "{} | {} | {:.2} | {:.2}",
                row.mall, row.family, row.average_revenue, per_square_metre
            ));
        }
    }

    if !performance.top_families.is_empty() {
        lines.push(String::new());
        lines.push("Top families:".to_string());
        for (rank, family) in performance.top_families.iter().enumerate() {
            lines.push(format!("{}. {} | {:.2}", rank + 1, family.name, family.average_revenue));
        }
    }

    if !performance.family_footprints.is_empty() {
        lines.push(String::new());
        lines.push("Family | Average revenue | Average floor area (m²)".to_string());
        lines.push("-------|-----------------|------------------------".to_string());
        for footprint in &performance.family_footprints {
            lines.push(format!(
                "{} | {:.2} | {:.1}",
                footprint.family, footprint.average_revenue, footprint.average_floor_area
            ));
        }
    }

    lines.join("\n")
}

pub fn format_event_candidates(candidates: &[EventCandidate]) -> String {
    if candidates.is_empty() {
        return "No event with a positive impact".to_string();
    }
    let mut lines = Vec::new();
    lines.push("Event | Average impact".to_string());
    lines.push("------|---------------".to_string());
    for candidate in candidates {
        lines.push(format!("{} | {:+.1}%", candidate.label, candidate.average_impact_pct));
    }
    lines.join("\n")
}

fn format_kpi_row(label: &str, kpi: &Kpi) -> String {
    format!(
        "{label} | {current:.2} | {previous:.2} | {variance:+.1}%",
        current = kpi.current,
        previous = kpi.previous,
        variance = kpi.variance_pct
    )
}
