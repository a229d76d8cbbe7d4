//! Visitor-traffic aggregation and event-impact simulation for retail centers.

pub mod commands;
pub mod domain;
pub mod services;
pub mod telemetry;
