use chrono::{Duration, NaiveDate};

use crate::domain::calendar::DateWindow;
use crate::domain::granularity::Granularity;

/// Comparison window preceding a selection of `[start, end]`.
///
/// Windows are inclusive on both ends and compared against bucket dates:
/// - hourly: the day before `start` up to `start`;
/// - daily: `end - start` days back from `start`, ending the day before it;
/// - weekly: seven days back from `start`, up to `start`;
/// - monthly: a fixed 30-day lookback up to `start`, not a calendar month.
pub fn previous_window(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> DateWindow {
    match granularity {
        Granularity::Hourly => DateWindow::new(start - Duration::days(1), start),
        Granularity::Daily => {
            let span = (end - start).num_days();
            DateWindow::new(start - Duration::days(span), start - Duration::days(1))
        }
        Granularity::Weekly => DateWindow::new(start - Duration::weeks(1), start),
        Granularity::Monthly => DateWindow::new(start - Duration::days(30), start),
    }
}

/// Lookback of the same span as `[start, end]`, ending the day before `start`.
pub fn preceding_span(start: NaiveDate, end: NaiveDate) -> DateWindow {
    let span = (end - start).num_days();
    DateWindow::new(start - Duration::days(span), start - Duration::days(1))
}
