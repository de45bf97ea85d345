use crate::detection::DetectionSignals;
use crate::machine_learning::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity derived from the classifier's scam probability alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarningLevel {
    Low,
    Medium,
    High,
}

impl WarningLevel {
    pub fn from_scam_probability(scam_probability: f64) -> Self {
        if scam_probability < 40.0 {
            WarningLevel::Low
        } else if scam_probability < 70.0 {
            WarningLevel::Medium
        } else {
            WarningLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WarningLevel::Low => "LOW",
            WarningLevel::Medium => "MEDIUM",
            WarningLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one prediction, with its audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub final_label: Label,
    pub classifier_label: Label,
    /// Percent, 0 to 100.
    pub classifier_confidence: f64,
    /// Percent, 0 to 100.
    pub scam_probability: f64,
    pub is_scam: bool,
    pub adjusted: bool,
    /// Empty when no cascade rule fired.
    pub adjustment_reason: String,
    /// Name of the cascade rule that decided the label.
    pub rule: String,
    pub warning_level: WarningLevel,
    pub risk_factors: Vec<String>,
    pub model_used: String,
    pub word_count: usize,
    pub is_short_text: bool,
    pub only_safe_words: bool,
    pub signals: DetectionSignals,
}

impl Verdict {
    /// Multi-line, human readable summary used by the CLI.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Prediction: {} (model: {})\n  Classifier: {} ({:.2}% confidence, {:.2}% scam)\n  Warning level: {}",
            self.final_label.as_str().to_uppercase(),
            self.model_used,
            self.classifier_label,
            self.classifier_confidence,
            self.scam_probability,
            self.warning_level
        );
        if self.adjusted {
            out.push_str(&format!("\n  Adjusted: {}", self.adjustment_reason));
        }
        if !self.risk_factors.is_empty() {
            out.push_str(&format!("\n  Risk factors: {}", self.risk_factors.join(", ")));
        }
        if !self.signals.indicators_found.is_empty() {
            out.push_str(&format!(
                "\n  Keywords: {}",
                self.signals.indicators_found.join(", ")
            ));
        }
        if !self.signals.critical_patterns_found.is_empty() {
            out.push_str(&format!(
                "\n  Critical patterns: {}",
                self.signals.critical_patterns_found.join(", ")
            ));
        }
        if !self.signals.suspicious_domains_found.is_empty() {
            out.push_str(&format!(
                "\n  Suspicious domains: {}",
                self.signals.suspicious_domains_found.join(", ")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_level_boundaries() {
        assert_eq!(WarningLevel::from_scam_probability(0.0), WarningLevel::Low);
        assert_eq!(WarningLevel::from_scam_probability(39.99), WarningLevel::Low);
        assert_eq!(WarningLevel::from_scam_probability(40.0), WarningLevel::Medium);
        assert_eq!(WarningLevel::from_scam_probability(69.99), WarningLevel::Medium);
        assert_eq!(WarningLevel::from_scam_probability(70.0), WarningLevel::High);
        assert_eq!(WarningLevel::from_scam_probability(100.0), WarningLevel::High);
    }

    #[test]
    fn test_warning_level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&WarningLevel::Medium).unwrap(), "\"MEDIUM\"");
    }
}
