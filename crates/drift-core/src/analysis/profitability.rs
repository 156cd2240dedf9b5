//! Profitability breakdown
//!
//! Splits total revenue and expenses into the five fixed profit-and-loss
//! categories. Deterministic and total over any input.

use crate::models::Transaction;

use super::types::{round_half_up, ProfitCategory, ProfitabilityLine};

/// Sales budget as a share of actual revenue
const SALES_BUDGET_SHARE: f64 = 0.94;

/// Compute the five-row profitability breakdown
pub fn profitability_analysis(transactions: &[Transaction]) -> Vec<ProfitabilityLine> {
    let revenue: f64 = transactions
        .iter()
        .filter(|t| t.is_inflow())
        .map(|t| t.amount)
        .sum();
    let expenses: f64 = transactions
        .iter()
        .filter(|t| t.is_outflow())
        .map(|t| t.amount)
        .sum::<f64>()
        .abs();

    ProfitCategory::ALL
        .iter()
        .map(|&category| match category.expense_shares() {
            None => ProfitabilityLine {
                category,
                actual: round_half_up(revenue),
                budget: round_half_up(revenue * SALES_BUDGET_SHARE),
            },
            Some((actual_share, budget_share)) => ProfitabilityLine {
                category,
                actual: round_half_up(-expenses * actual_share),
                budget: round_half_up(-expenses * budget_share),
            },
        })
        .collect()
}
