//! Report rows and configuration for the Analysis Engine

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opening balance the liquidity budget accumulates from
pub const DEFAULT_STARTING_BALANCE: f64 = 250_000.0;

/// Number of months the fetched transaction window is assumed to span
pub const DEFAULT_HISTORY_MONTHS: u32 = 3;

/// Leading cash-flow periods that carry an `actual` figure
pub const DEFAULT_ACTUAL_MONTHS: u32 = 3;

/// Forecast growth per month index
pub const DEFAULT_MONTHLY_GROWTH: f64 = 0.05;

pub const DEFAULT_WEEKS: u32 = 4;
pub const DEFAULT_MONTHS: u32 = 6;

/// Environment variable overriding the starting balance
pub const STARTING_BALANCE_ENV: &str = "DRIFT_STARTING_BALANCE";
/// Environment variable overriding the cash-flow history divisor
pub const HISTORY_MONTHS_ENV: &str = "DRIFT_HISTORY_MONTHS";
/// Environment variable selecting the report locale
pub const LOCALE_ENV: &str = "DRIFT_LOCALE";

/// Round half toward positive infinity
///
/// `-2.5` becomes `-2`, `2.5` becomes `3`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// One week of the liquidity budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityWeek {
    pub label: String,
    pub inflow: i64,
    pub outflow: i64,
    pub net: i64,
    pub cumulative: i64,
}

/// One month of the cash-flow forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowMonth {
    pub label: String,
    /// Only present for the leading history periods
    pub actual: Option<i64>,
    pub forecast: i64,
}

/// Profit and loss categories, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfitCategory {
    Sales,
    Payroll,
    Rent,
    Marketing,
    Other,
}

impl ProfitCategory {
    pub const ALL: [ProfitCategory; 5] = [
        ProfitCategory::Sales,
        ProfitCategory::Payroll,
        ProfitCategory::Rent,
        ProfitCategory::Marketing,
        ProfitCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfitCategory::Sales => "Sales",
            ProfitCategory::Payroll => "Payroll",
            ProfitCategory::Rent => "Rent",
            ProfitCategory::Marketing => "Marketing",
            ProfitCategory::Other => "Other",
        }
    }

    /// Share of total expenses booked as (actual, budget); `None` for Sales
    pub fn expense_shares(&self) -> Option<(f64, f64)> {
        match self {
            ProfitCategory::Sales => None,
            ProfitCategory::Payroll => Some((0.40, 0.38)),
            ProfitCategory::Rent => Some((0.15, 0.15)),
            ProfitCategory::Marketing => Some((0.10, 0.12)),
            ProfitCategory::Other => Some((0.35, 0.35)),
        }
    }
}

impl fmt::Display for ProfitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One category of the profitability breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityLine {
    pub category: ProfitCategory,
    pub actual: i64,
    pub budget: i64,
}

/// Locale used for period labels and insight prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportLocale {
    /// Norwegian Bokmål
    #[default]
    #[serde(rename = "nb-NO")]
    NbNo,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
}

impl ReportLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportLocale::NbNo => "nb-NO",
            ReportLocale::EnUs => "en-US",
            ReportLocale::EnGb => "en-GB",
        }
    }

    fn chrono_locale(&self) -> chrono::Locale {
        match self {
            ReportLocale::NbNo => chrono::Locale::nb_NO,
            ReportLocale::EnUs => chrono::Locale::en_US,
            ReportLocale::EnGb => chrono::Locale::en_GB,
        }
    }

    pub fn is_norwegian(&self) -> bool {
        matches!(self, ReportLocale::NbNo)
    }

    /// Abbreviated month name for the month containing `date`
    pub fn month_label(&self, date: NaiveDate) -> String {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| {
                dt.and_utc()
                    .format_localized("%b", self.chrono_locale())
                    .to_string()
            })
            .unwrap_or_default()
    }

    /// Label for the n-th week (1-based)
    pub fn week_label(&self, week: u32) -> String {
        if self.is_norwegian() {
            format!("Uke {}", week)
        } else {
            format!("Week {}", week)
        }
    }
}

impl fmt::Display for ReportLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportLocale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_lowercase().as_str() {
            "nb-no" | "nb" | "no" | "nn-no" => Ok(ReportLocale::NbNo),
            "en-us" | "en" => Ok(ReportLocale::EnUs),
            "en-gb" => Ok(ReportLocale::EnGb),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

/// Tunables shared by the three calculators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub starting_balance: f64,
    /// Divisor for the cash-flow monthly average
    pub history_months: u32,
    pub actual_months: u32,
    pub monthly_growth: f64,
    pub locale: ReportLocale,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            history_months: DEFAULT_HISTORY_MONTHS,
            actual_months: DEFAULT_ACTUAL_MONTHS,
            monthly_growth: DEFAULT_MONTHLY_GROWTH,
            locale: ReportLocale::default(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by `DRIFT_STARTING_BALANCE`, `DRIFT_HISTORY_MONTHS`
    /// and `DRIFT_LOCALE`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(STARTING_BALANCE_ENV) {
            config = config.with_starting_balance(raw.trim().parse::<f64>().map_err(|_| {
                Error::InvalidData(format!("{} must be a number, got '{}'", STARTING_BALANCE_ENV, raw))
            })?)?;
        }

        if let Ok(raw) = std::env::var(HISTORY_MONTHS_ENV) {
            let months: u32 = raw.trim().parse().map_err(|_| {
                Error::InvalidData(format!(
                    "{} must be a positive integer, got '{}'",
                    HISTORY_MONTHS_ENV, raw
                ))
            })?;
            config = config.with_history_months(months)?;
        }

        if let Ok(raw) = std::env::var(LOCALE_ENV) {
            config.locale = raw.parse().map_err(Error::InvalidData)?;
        }

        Ok(config)
    }

    pub fn with_locale(mut self, locale: ReportLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Rejects NaN and infinities, which would collapse every balance
    pub fn with_starting_balance(mut self, balance: f64) -> Result<Self> {
        if !balance.is_finite() {
            return Err(Error::InvalidData(format!(
                "starting balance must be a finite number, got {}",
                balance
            )));
        }
        self.starting_balance = balance;
        Ok(self)
    }

    pub fn with_history_months(mut self, months: u32) -> Result<Self> {
        if months == 0 {
            return Err(Error::InvalidData(
                "history months must be at least 1".to_string(),
            ));
        }
        self.history_months = months;
        Ok(self)
    }
}
