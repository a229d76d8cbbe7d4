pub mod calendar;
pub mod event;
pub mod flow;
pub mod granularity;
pub mod revenue;
pub mod scenario;
pub mod visit;
