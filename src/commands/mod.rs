pub mod base_commands;
pub mod events_cmd;
pub mod flows_cmd;
pub mod performance_cmd;
pub mod plot_flows_cmd;
pub mod report_format;
