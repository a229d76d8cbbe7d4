use serde::Serialize;

/// Percentage change of `current` relative to `previous`.
///
/// A zero `previous` yields `0.0`, never an infinite or NaN value.
pub fn variance(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Arithmetic mean, `0.0` for an empty input.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// A scalar metric next to its comparison value.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Kpi {
    pub current: f64,
    pub previous: f64,
    pub variance_pct: f64,
}

impl Kpi {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            variance_pct: variance(current, previous),
        }
    }
}
