//! Prompt text and canned fallbacks for analysis insights

use crate::analysis::ReportLocale;
use crate::models::AnalysisKind;

const SYSTEM_PROMPT_NB: &str =
    "Du er en ekspert regnskapsfører som forklarer økonomi på enkelt norsk til små bedrifter.";
const SYSTEM_PROMPT_EN: &str =
    "You are an expert accountant who explains finances in plain English to small businesses.";

/// System message sent with every insight request
pub fn system_prompt(locale: ReportLocale) -> &'static str {
    if locale.is_norwegian() {
        SYSTEM_PROMPT_NB
    } else {
        SYSTEM_PROMPT_EN
    }
}

/// User message embedding the report rows as JSON
pub fn user_prompt(kind: AnalysisKind, data: &serde_json::Value, locale: ReportLocale) -> String {
    let lead = match (kind, locale.is_norwegian()) {
        (AnalysisKind::Liquidity, true) => {
            "Analyser følgende likviditetsdata og gi norsk forklaring og anbefalinger"
        }
        (AnalysisKind::Cashflow, true) => "Analyser kontantstrømdata og gi norsk analyse",
        (AnalysisKind::Profitability, true) => "Analyser lønnsomhetsdata og gi norsk innsikt",
        (AnalysisKind::Liquidity, false) => {
            "Analyze the following liquidity data and give an explanation and recommendations"
        }
        (AnalysisKind::Cashflow, false) => "Analyze the cash-flow data and give an analysis",
        (AnalysisKind::Profitability, false) => "Analyze the profitability data and give insight",
    };
    format!("{}: {}", lead, data)
}

/// Text shown when no language model answer is available
pub fn fallback_insight(kind: AnalysisKind, locale: ReportLocale) -> &'static str {
    match (kind, locale.is_norwegian()) {
        (AnalysisKind::Liquidity, true) => {
            "Likviditeten ser stabil ut. Hold øye med kontantstrømmen og sørg for at kundene betaler i tide."
        }
        (AnalysisKind::Cashflow, true) => {
            "Kontantstrømmen viser positiv utvikling. Fortsett det gode arbeidet med salg og kostnadscontroll."
        }
        (AnalysisKind::Profitability, true) => {
            "Lønnsomheten er innenfor normale rammer. Vurder å optimalisere de største kostnadene."
        }
        (AnalysisKind::Liquidity, false) => {
            "Liquidity looks stable. Keep an eye on cash flow and make sure customers pay on time."
        }
        (AnalysisKind::Cashflow, false) => {
            "Cash flow is trending positively. Keep up the good work on sales and cost control."
        }
        (AnalysisKind::Profitability, false) => {
            "Profitability is within normal bounds. Consider trimming the largest costs."
        }
    }
}
