//! Analysis Engine - the three canned financial analyses
//!
//! Pure functions from a materialized list of [`Transaction`]s to report rows:
//!
//! - **Liquidity budget** - weekly inflow/outflow projection with a running balance
//! - **Cash-flow forecast** - monthly actual vs. growth forecast
//! - **Profitability** - five-category actual vs. budget breakdown
//!
//! Nothing here performs I/O or reads the clock. Randomness comes in through a
//! [`RandomSource`] and the current month through an explicit start date, so
//! every output is reproducible in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drift_core::analysis::{AnalysisEngine, SystemRandom};
//!
//! let engine = AnalysisEngine::new(AnalysisConfig::from_env()?);
//! let report = engine.run(AnalysisKind::Cashflow, &txs, today, &mut SystemRandom::new())?;
//! ```
//!
//! [`Transaction`]: crate::models::Transaction

pub mod cash_flow;
pub mod engine;
pub mod liquidity;
pub mod profitability;
pub mod random;
pub mod types;

pub use cash_flow::cash_flow_forecast;
pub use engine::{AnalysisEngine, AnalysisReport};
pub use liquidity::liquidity_budget;
pub use profitability::profitability_analysis;
pub use random::{FixedRandom, RandomSource, SeededRandom, SequenceRandom, SystemRandom};
pub use types::{
    round_half_up, AnalysisConfig, CashFlowMonth, LiquidityWeek, ProfitCategory,
    ProfitabilityLine, ReportLocale, DEFAULT_MONTHS, DEFAULT_WEEKS,
};
