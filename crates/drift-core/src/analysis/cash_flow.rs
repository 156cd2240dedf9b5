//! Cash-flow forecast
//!
//! Spreads the net of the fetched window over `history_months` to get a
//! monthly average, then walks forward month by month from the start date:
//! the leading periods get a jittered "actual", every period gets a
//! deterministic growth forecast.

use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use crate::models::Transaction;

use super::random::RandomSource;
use super::types::{round_half_up, AnalysisConfig, CashFlowMonth};

const ACTUAL_JITTER: (f64, f64) = (0.8, 1.2);

/// Compute a `months`-long cash-flow forecast starting at the month of `start`
///
/// Empty input is valid and yields zeros throughout.
pub fn cash_flow_forecast(
    transactions: &[Transaction],
    months: u32,
    start: NaiveDate,
    config: &AnalysisConfig,
    rng: &mut dyn RandomSource,
) -> Vec<CashFlowMonth> {
    let net: f64 = transactions.iter().map(|t| t.amount).sum();
    let monthly_average = net / f64::from(config.history_months.max(1));

    debug!(
        transactions = transactions.len(),
        monthly_average, months, "Computing cash-flow forecast"
    );

    let first_of_month = NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap_or(start);

    (0..months)
        .map(|i| {
            let label = first_of_month
                .checked_add_months(Months::new(i))
                .map(|date| config.locale.month_label(date))
                .unwrap_or_default();

            let actual = (i < config.actual_months).then(|| {
                round_half_up(monthly_average * rng.uniform(ACTUAL_JITTER.0, ACTUAL_JITTER.1))
            });

            let forecast =
                round_half_up(monthly_average * (1.0 + config.monthly_growth * f64::from(i)));

            CashFlowMonth {
                label,
                actual,
                forecast,
            }
        })
        .collect()
}
