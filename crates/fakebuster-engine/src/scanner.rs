//! Lexical scam-pattern scanner for free text.

use serde::{Deserialize, Serialize};

use crate::types::{RiskLevel, Severity};

/// Registry of scam phrasing, grouped by category. Patterns are lowercase.
const SCAM_PATTERNS: &[(&str, &[&str])] = &[
    ("urgency", &["limited time", "act now", "expires today", "hurry"]),
    (
        "money_promises",
        &["guaranteed income", "make money fast", "easy money"],
    ),
    ("fake_urgency", &["only today", "last chance", "don't miss out"]),
    (
        "personal_info",
        &["ssn", "social security", "bank account", "routing number"],
    ),
];

const SENSITIVE_CATEGORY: &str = "personal_info";

/// One matched registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamPattern {
    pub category: String,
    pub pattern: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub risk_level: RiskLevel,
    pub scam_indicators: Vec<ScamPattern>,
    pub is_suspicious: bool,
}

fn severity_for(category: &str) -> Severity {
    if category == SENSITIVE_CATEGORY {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Scan `text` for every registry pattern it contains.
///
/// Matching is a case-insensitive substring test; each matching pattern is
/// reported once, in registry order.
#[must_use]
pub fn scan_text(text: &str) -> ScanReport {
    let lower = text.to_lowercase();

    let scam_indicators: Vec<ScamPattern> = SCAM_PATTERNS
        .iter()
        .flat_map(|(category, patterns)| {
            patterns
                .iter()
                .filter(|pattern| lower.contains(**pattern))
                .map(move |pattern| ScamPattern {
                    category: (*category).to_string(),
                    pattern: (*pattern).to_string(),
                    severity: severity_for(category),
                })
        })
        .collect();

    let risk_level = if scam_indicators
        .iter()
        .any(|i| i.severity == Severity::High)
    {
        RiskLevel::High
    } else if scam_indicators.is_empty() {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    ScanReport {
        risk_level,
        is_suspicious: !scam_indicators.is_empty(),
        scam_indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_low_risk() {
        let report = scan_text("The package arrived on Tuesday.");
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(!report.is_suspicious);
        assert!(report.scam_indicators.is_empty());
    }

    #[test]
    fn money_and_urgency_are_medium() {
        let report = scan_text("guaranteed income, act now");
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert!(report.is_suspicious);
        let categories: Vec<&str> = report
            .scam_indicators
            .iter()
            .map(|i| i.category.as_str())
            .collect();
        assert_eq!(categories, vec!["urgency", "money_promises"]);
        assert!(report
            .scam_indicators
            .iter()
            .all(|i| i.severity == Severity::Medium));
    }

    #[test]
    fn personal_info_escalates_to_high() {
        let report = scan_text("Guaranteed income! Just send your Bank Account and routing number");
        assert_eq!(report.risk_level, RiskLevel::High);
        let high: Vec<&str> = report
            .scam_indicators
            .iter()
            .filter(|i| i.severity == Severity::High)
            .map(|i| i.pattern.as_str())
            .collect();
        assert_eq!(high, vec!["bank account", "routing number"]);
    }

    #[test]
    fn every_match_in_a_category_is_reported() {
        let report = scan_text("HURRY, limited time, expires today, act now");
        assert_eq!(report.scam_indicators.len(), 4);
        assert!(report.scam_indicators.iter().all(|i| i.category == "urgency"));
    }

    #[test]
    fn substring_matching_catches_embedded_terms() {
        // "ssn" is matched as a substring, as in the registry contract.
        let report = scan_text("classnotes");
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn report_serializes_with_lowercase_labels() {
        let json = serde_json::to_value(scan_text("last chance")).unwrap();
        assert_eq!(json["risk_level"], "medium");
        assert_eq!(json["scam_indicators"][0]["severity"], "medium");
        assert_eq!(json["scam_indicators"][0]["category"], "fake_urgency");
    }
}
