//! Tallying raw incidents into [`CrimeStatistics`].

use area_report_crime_models::{CrimeIncident, CrimeStatistics};
use chrono::NaiveDate;

/// Counts incidents in the trailing window ending at `as_of` and compares
/// them against the preceding window of the same length.
///
/// The current window covers the `window_days` days up to and including
/// `as_of`; the prior window is the `window_days` days before that.
/// Incidents dated after `as_of` are ignored. The trend is absent when the
/// prior window has no incidents.
#[must_use]
pub fn tally_incidents(
    incidents: &[CrimeIncident],
    as_of: NaiveDate,
    window_days: u32,
) -> CrimeStatistics {
    let window = i64::from(window_days.max(1));

    let mut current = 0u32;
    let mut violent = 0u32;
    let mut prior = 0u32;

    for incident in incidents {
        let days_before = (as_of - incident.occurred_on).num_days();
        if (0..window).contains(&days_before) {
            current = current.saturating_add(1);
            if incident.category.is_violent() {
                violent = violent.saturating_add(1);
            }
        } else if (window..window * 2).contains(&days_before) {
            prior = prior.saturating_add(1);
        }
    }

    let trend_percent = (prior > 0)
        .then(|| (f64::from(current) - f64::from(prior)) / f64::from(prior) * 100.0);

    log::debug!(
        "Tallied {current} incidents ({violent} violent, {prior} prior) over {window_days} days"
    );

    CrimeStatistics {
        incidents: current,
        violent_incidents: Some(violent),
        trend_percent,
        window_days: window_days.max(1),
    }
}
