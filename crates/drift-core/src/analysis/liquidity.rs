//! Liquidity budget
//!
//! Projects weekly inflow and outflow from the historical per-transaction
//! averages, jittered by a random multiplier, and carries a running balance
//! forward from the configured starting balance.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

use super::random::RandomSource;
use super::types::{round_half_up, AnalysisConfig, LiquidityWeek};

const INFLOW_JITTER: (f64, f64) = (0.9, 1.1);
const OUTFLOW_JITTER: (f64, f64) = (0.95, 1.05);

/// Compute a `weeks`-long liquidity budget
///
/// Both averages divide by the total number of transactions, not by the number
/// of inflows or outflows. Fails with [`Error::EmptyInput`] before producing any
/// row when `transactions` is empty.
pub fn liquidity_budget(
    transactions: &[Transaction],
    weeks: u32,
    config: &AnalysisConfig,
    rng: &mut dyn RandomSource,
) -> Result<Vec<LiquidityWeek>> {
    if transactions.is_empty() {
        return Err(Error::EmptyInput("liquidity budget"));
    }

    let count = transactions.len() as f64;
    let total_inflow: f64 = transactions
        .iter()
        .filter(|t| t.is_inflow())
        .map(|t| t.amount)
        .sum();
    let total_outflow: f64 = transactions
        .iter()
        .filter(|t| t.is_outflow())
        .map(|t| t.amount)
        .sum::<f64>()
        .abs();

    let average_inflow = total_inflow / count;
    let average_outflow = total_outflow / count;

    debug!(
        transactions = transactions.len(),
        average_inflow, average_outflow, weeks, "Computing liquidity budget"
    );

    // Carried on the rounded figures so every row satisfies
    // cumulative == previous cumulative + net
    let mut cumulative = round_half_up(config.starting_balance);
    let mut budget = Vec::with_capacity(weeks as usize);

    for week in 1..=weeks {
        let inflow = average_inflow * rng.uniform(INFLOW_JITTER.0, INFLOW_JITTER.1);
        let outflow = average_outflow * rng.uniform(OUTFLOW_JITTER.0, OUTFLOW_JITTER.1);
        let net = round_half_up(inflow - outflow);
        cumulative += net;

        budget.push(LiquidityWeek {
            label: config.locale.week_label(week),
            inflow: round_half_up(inflow),
            outflow: round_half_up(outflow),
            net,
            cumulative,
        });
    }

    Ok(budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::random::{FixedRandom, SeededRandom, SequenceRandom};
    use crate::analysis::types::ReportLocale;

    fn sample() -> Vec<Transaction> {
        [1000.0, -400.0, 500.0, -100.0]
            .into_iter()
            .map(Transaction::new)
            .collect()
    }

    #[test]
    fn test_empty_input_is_error() {
        let mut rng = FixedRandom::midpoint();
        let result = liquidity_budget(&[], 4, &AnalysisConfig::default(), &mut rng);
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_midpoint_multipliers() {
        // averages: inflow 1500/4 = 375, outflow 500/4 = 125
        let mut rng = FixedRandom::midpoint();
        let weeks = liquidity_budget(&sample(), 4, &AnalysisConfig::default(), &mut rng).unwrap();

        assert_eq!(weeks.len(), 4);
        for (i, week) in weeks.iter().enumerate() {
            assert_eq!(week.inflow, 375);
            assert_eq!(week.outflow, 125);
            assert_eq!(week.net, 250);
            assert_eq!(week.cumulative, 250_000 + 250 * (i as i64 + 1));
        }
        assert_eq!(weeks[0].label, "Uke 1");
        assert_eq!(weeks[3].label, "Uke 4");
    }

    #[test]
    fn test_multiplier_bounds() {
        // unit 0.0 gives the low end of both ranges
        let mut rng = FixedRandom::new(0.0);
        let weeks = liquidity_budget(&sample(), 1, &AnalysisConfig::default(), &mut rng).unwrap();
        assert_eq!(weeks[0].inflow, round_half_up(375.0 * 0.9));
        assert_eq!(weeks[0].outflow, round_half_up(125.0 * 0.95));
    }

    #[test]
    fn test_draw_order_inflow_then_outflow() {
        let mut rng = SequenceRandom::new([0.0, 0.5]);
        let weeks = liquidity_budget(&sample(), 1, &AnalysisConfig::default(), &mut rng).unwrap();
        assert_eq!(weeks[0].inflow, round_half_up(375.0 * 0.9));
        assert_eq!(weeks[0].outflow, 125);
    }

    #[test]
    fn test_cumulative_chain() {
        let mut rng = SeededRandom::new(7);
        let weeks = liquidity_budget(&sample(), 4, &AnalysisConfig::default(), &mut rng).unwrap();

        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0].cumulative, 250_000 + weeks[0].net);
        for i in 1..weeks.len() {
            assert_eq!(weeks[i].cumulative, weeks[i - 1].cumulative + weeks[i].net);
        }
    }

    #[test]
    fn test_cumulative_chain_with_fractional_net() {
        // net is 375.4 every week; the balance must follow the rounded 375
        let txs: Vec<Transaction> = [1501.6, 0.0, 0.0, 0.0]
            .into_iter()
            .map(Transaction::new)
            .collect();
        let mut rng = FixedRandom::midpoint();
        let weeks = liquidity_budget(&txs, 4, &AnalysisConfig::default(), &mut rng).unwrap();

        assert_eq!(weeks[0].net, 375);
        assert_eq!(weeks[0].cumulative, 250_375);
        assert_eq!(weeks[1].cumulative, 250_750);
        for i in 1..weeks.len() {
            assert_eq!(weeks[i].cumulative, weeks[i - 1].cumulative + weeks[i].net);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let config = AnalysisConfig::default();
        let a = liquidity_budget(&sample(), 4, &config, &mut SeededRandom::new(99)).unwrap();
        let b = liquidity_budget(&sample(), 4, &config, &mut SeededRandom::new(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_outflow_only_input() {
        let txs = vec![Transaction::new(-300.0), Transaction::new(-100.0)];
        let mut rng = FixedRandom::midpoint();
        let weeks = liquidity_budget(&txs, 2, &AnalysisConfig::default(), &mut rng).unwrap();
        assert_eq!(weeks[0].inflow, 0);
        assert_eq!(weeks[0].outflow, 200);
        assert_eq!(weeks[0].net, -200);
        assert_eq!(weeks[1].cumulative, 249_600);
    }

    #[test]
    fn test_zero_weeks() {
        let mut rng = FixedRandom::midpoint();
        let weeks = liquidity_budget(&sample(), 0, &AnalysisConfig::default(), &mut rng).unwrap();
        assert!(weeks.is_empty());
    }

    #[test]
    fn test_custom_starting_balance_and_locale() {
        let config = AnalysisConfig {
            starting_balance: 1_000.0,
            ..AnalysisConfig::default()
        }
        .with_locale(ReportLocale::EnUs);
        let mut rng = FixedRandom::midpoint();
        let weeks = liquidity_budget(&sample(), 1, &config, &mut rng).unwrap();
        assert_eq!(weeks[0].cumulative, 1_250);
        assert_eq!(weeks[0].label, "Week 1");
    }
}
