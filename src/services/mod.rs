pub mod aggregation;
pub mod datasets;
pub mod event_catalog;
pub mod event_impacts_csv;
pub mod event_overlay;
pub mod flow_analysis;
pub mod flow_plot;
pub mod flows_csv;
pub mod kpi;
pub mod period_comparison;
pub mod report_output;
pub mod revenue_projection;
pub mod scenario_yaml;
pub mod tenant_performance;
pub mod tenant_revenue_csv;
pub mod visit_durations_csv;
