//! Analysis Engine facade - dispatches an [`AnalysisKind`] to its calculator

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AnalysisKind, Transaction};

use super::random::RandomSource;
use super::types::{
    AnalysisConfig, CashFlowMonth, LiquidityWeek, ProfitabilityLine, DEFAULT_MONTHS, DEFAULT_WEEKS,
};
use super::{cash_flow_forecast, liquidity_budget, profitability_analysis};

/// Output of one analysis run
///
/// Serializes as the bare row array, which is what clients and storage expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Liquidity(Vec<LiquidityWeek>),
    Cashflow(Vec<CashFlowMonth>),
    Profitability(Vec<ProfitabilityLine>),
}

impl AnalysisReport {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisReport::Liquidity(_) => AnalysisKind::Liquidity,
            AnalysisReport::Cashflow(_) => AnalysisKind::Cashflow,
            AnalysisReport::Profitability(_) => AnalysisKind::Profitability,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnalysisReport::Liquidity(rows) => rows.len(),
            AnalysisReport::Cashflow(rows) => rows.len(),
            AnalysisReport::Profitability(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Stateless engine holding the shared configuration
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run `kind` with its default period count
    pub fn run(
        &self,
        kind: AnalysisKind,
        transactions: &[Transaction],
        today: NaiveDate,
        rng: &mut dyn RandomSource,
    ) -> Result<AnalysisReport> {
        let periods = match kind {
            AnalysisKind::Liquidity => DEFAULT_WEEKS,
            AnalysisKind::Cashflow => DEFAULT_MONTHS,
            AnalysisKind::Profitability => 0,
        };
        self.run_with_periods(kind, transactions, periods, today, rng)
    }

    /// Run `kind` over `periods` weeks or months (ignored for profitability)
    pub fn run_with_periods(
        &self,
        kind: AnalysisKind,
        transactions: &[Transaction],
        periods: u32,
        today: NaiveDate,
        rng: &mut dyn RandomSource,
    ) -> Result<AnalysisReport> {
        let report = match kind {
            AnalysisKind::Liquidity => AnalysisReport::Liquidity(liquidity_budget(
                transactions,
                periods,
                &self.config,
                rng,
            )?),
            AnalysisKind::Cashflow => AnalysisReport::Cashflow(cash_flow_forecast(
                transactions,
                periods,
                today,
                &self.config,
                rng,
            )),
            AnalysisKind::Profitability => {
                AnalysisReport::Profitability(profitability_analysis(transactions))
            }
        };

        tracing::debug!(kind = %kind, rows = report.len(), "Analysis complete");
        Ok(report)
    }
}
