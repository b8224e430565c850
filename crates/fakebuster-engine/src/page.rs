//! Whole-page and form checks layered on the trust scorer.

use serde::{Deserialize, Serialize};

use crate::trust::{score_trust, TrustVerdict, WebsiteSignals};

/// Phrases that commonly appear on scam landing pages.
const PAGE_SCAM_KEYWORDS: &[&str] = &[
    "limited time offer",
    "act now",
    "exclusive deal",
    "guaranteed income",
    "work from home",
    "make money fast",
];

const FORM_RECOMMENDATIONS: [&str; 3] = [
    "Verify the website's legitimacy before entering personal information",
    "Check for HTTPS encryption in the URL",
    "Look for privacy policy and terms of service",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub signals: WebsiteSignals,
    #[serde(default)]
    pub page_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub text_length: usize,
    pub suspicious_elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAnalysis {
    #[serde(flatten)]
    pub verdict: TrustVerdict,
    pub alerts: Vec<PageAlert>,
    pub page_analysis: PageSummary,
}

/// Trust verdict for the page plus keyword alerts from its visible text.
#[must_use]
pub fn analyze_page(page: &PageInput) -> PageAnalysis {
    let verdict = score_trust(&page.signals);

    let text = page.page_text.to_lowercase();
    let alerts = PAGE_SCAM_KEYWORDS
        .iter()
        .filter(|keyword| text.contains(**keyword))
        .map(|keyword| PageAlert {
            kind: AlertKind::Warning,
            message: format!("Potential scam indicator detected: \"{keyword}\""),
        })
        .collect();

    PageAnalysis {
        verdict,
        alerts,
        page_analysis: PageSummary {
            title: page.title.clone(),
            text_length: page.page_text.chars().count(),
            suspicious_elements: page.signals.suspicious_elements.clone(),
        },
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormField {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSecurityReport {
    pub is_secure: bool,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Flag forms that submit over plain HTTP or ask for sensitive fields.
#[must_use]
pub fn check_form_security(has_ssl: bool, fields: &[FormField]) -> FormSecurityReport {
    let mut warnings = Vec::new();
    if !has_ssl {
        warnings.push("Form is not using HTTPS encryption".to_string());
    }

    for field in fields {
        let name = field.name.to_lowercase();
        if name.contains("ssn") {
            warnings.push("Form requests Social Security Number".to_string());
        }
        if name.contains("admin") && field.field_type.as_deref() == Some("password") {
            warnings.push("Suspicious admin password field detected".to_string());
        }
    }

    FormSecurityReport {
        is_secure: has_ssl,
        warnings,
        recommendations: FORM_RECOMMENDATIONS.iter().map(ToString::to_string).collect(),
    }
}
