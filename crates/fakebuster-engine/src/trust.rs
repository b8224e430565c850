//! Additive website legitimacy scoring.

use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

const BASE_SCORE: i64 = 50;
const SAFE_THRESHOLD: i64 = 70;
const WARNING_THRESHOLD: i64 = 40;
const LONG_URL: u64 = 100;

/// Structural signals gathered from a page by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteSignals {
    #[serde(default)]
    pub has_ssl: bool,
    #[serde(default)]
    pub has_contact_info: bool,
    #[serde(default)]
    pub has_privacy_policy: bool,
    #[serde(default)]
    pub has_terms_of_service: bool,
    #[serde(default)]
    pub suspicious_elements: Vec<String>,
    /// Supplied by an external lookup; absent counts as a brand-new domain.
    #[serde(default)]
    pub domain_age_days: Option<u64>,
    #[serde(default)]
    pub url_length: Option<u64>,
}

impl WebsiteSignals {
    fn has_suspicious(&self, tag: &str) -> bool {
        self.suspicious_elements.iter().any(|e| e == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustStatus {
    Safe,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustVerdict {
    pub trust_score: u8,
    pub status: TrustStatus,
    pub warnings: Vec<String>,
    pub is_legitimate: bool,
    pub risk_level: RiskLevel,
}

/// Raw additive score before clamping.
fn raw_score(signals: &WebsiteSignals) -> i64 {
    let mut score = BASE_SCORE;

    score += if signals.has_ssl { 20 } else { -20 };
    if signals.has_contact_info {
        score += 15;
    }
    if signals.has_privacy_policy {
        score += 10;
    }
    if signals.has_terms_of_service {
        score += 10;
    }

    let suspicious = i64::try_from(signals.suspicious_elements.len()).unwrap_or(i64::MAX / 10);
    score -= suspicious.saturating_mul(10);

    score += match signals.domain_age_days.unwrap_or(0) {
        age if age > 365 => 15,
        age if age > 90 => 5,
        _ => -10,
    };

    if signals.url_length.unwrap_or(0) > LONG_URL {
        score -= 5;
    }

    score
}

fn warnings(signals: &WebsiteSignals) -> Vec<String> {
    let checks = [
        (!signals.has_ssl, "Website does not use HTTPS encryption"),
        (!signals.has_contact_info, "No contact information found"),
        (
            signals.has_suspicious("excessive_popups"),
            "Excessive popup advertisements detected",
        ),
        (
            signals.has_suspicious("urgency_tactics"),
            "Urgency pressure tactics detected",
        ),
    ];
    checks
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, message)| message.to_string())
        .collect()
}

/// Score a website's legitimacy from its structural signals.
///
/// The score starts at 50, is adjusted per signal, and is clamped to
/// `[0, 100]`. Status, risk level and legitimacy are derived from the clamped
/// score alone; warnings are derived from the raw signals.
#[must_use]
pub fn score_trust(signals: &WebsiteSignals) -> TrustVerdict {
    let score = raw_score(signals).clamp(0, 100);

    let (risk_level, status, is_legitimate) = if score >= SAFE_THRESHOLD {
        (RiskLevel::Low, TrustStatus::Safe, true)
    } else if score >= WARNING_THRESHOLD {
        (RiskLevel::Medium, TrustStatus::Warning, true)
    } else {
        (RiskLevel::High, TrustStatus::Danger, false)
    };

    TrustVerdict {
        trust_score: u8::try_from(score).unwrap_or(0),
        status,
        warnings: warnings(signals),
        is_legitimate,
        risk_level,
    }
}
