use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::calendar::{DateWindow, end_of_week};

/// Hypothetical percentage uplift applied to one week of traffic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedEvent {
    pub label: String,
    /// `None` applies the event to every site.
    pub site: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub impact_pct: f64,
}

impl PlannedEvent {
    /// The event runs from `start_date` to the Sunday closing its week.
    pub fn new(label: &str, site: Option<&str>, start_date: NaiveDate, impact_pct: f64) -> Self {
        Self {
            label: label.to_string(),
            site: site.map(str::to_string),
            start_date,
            end_date: end_of_week(start_date),
            impact_pct,
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    pub fn multiplier(&self) -> f64 {
        1.0 + self.impact_pct / 100.0
    }

    pub fn applies_to_site(&self, site: &str) -> bool {
        self.site.as_deref().is_none_or(|own| own == site)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("an event is already planned on {date}")]
pub struct DuplicateEventError {
    pub date: NaiveDate,
}

/// Planned events of the current scenario, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStore {
    events: Vec<PlannedEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `event` unless another event already starts on the same date.
    pub fn add(&mut self, event: PlannedEvent) -> Result<(), DuplicateEventError> {
        if self.events.iter().any(|e| e.start_date == event.start_date) {
            return Err(DuplicateEventError {
                date: event.start_date,
            });
        }
        self.events.push(event);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<PlannedEvent> {
        if index < self.events.len() {
            Some(self.events.remove(index))
        } else {
            None
        }
    }

    pub fn events(&self) -> &[PlannedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
