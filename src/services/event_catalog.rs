use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::event::PlannedEvent;

/// One measured impact of a past event, as found in the impact table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventImpact {
    pub label: String,
    pub impact_pct: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EventCandidate {
    pub label: String,
    pub average_impact_pct: f64,
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

/// Events that can be simulated, best average impact first.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    candidates: Vec<EventCandidate>,
}

impl EventCatalog {
    /// Keeps positive impacts only and averages them per label.
    pub fn from_impacts(impacts: &[EventImpact]) -> Self {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for impact in impacts.iter().filter(|impact| impact.impact_pct > 0.0) {
            let entry = sums.entry(impact.label.as_str()).or_insert((0.0, 0));
            entry.0 += impact.impact_pct;
            entry.1 += 1;
        }

        let mut candidates: Vec<EventCandidate> = sums
            .into_iter()
            .map(|(label, (sum, count))| EventCandidate {
                label: label.to_string(),
                average_impact_pct: sum / count as f64,
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.average_impact_pct
                .partial_cmp(&a.average_impact_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });

        Self { candidates }
    }

    pub fn candidates(&self) -> &[EventCandidate] {
        &self.candidates
    }

    pub fn find(&self, label: &str) -> Option<&EventCandidate> {
        self.candidates.iter().find(|candidate| candidate.label == label)
    }

    /// Plans a catalog event on `date` with its average impact.
    pub fn plan(
        &self,
        label: &str,
        site: Option<&str>,
        date: NaiveDate,
    ) -> Result<PlannedEvent, CatalogError> {
        let candidate = self
            .find(label)
            .ok_or_else(|| CatalogError::UnknownEvent(label.to_string()))?;
        Ok(PlannedEvent::new(
            &candidate.label,
            site,
            date,
            candidate.average_impact_pct,
        ))
    }
}
