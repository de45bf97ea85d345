//! Decision Engine Component
//!
//! Fuses detector signals with the classifier output. The cascade is an
//! ordered list of [`CascadeRule`]s; the first rule whose predicate holds
//! decides the label, and the final catch-all passes the classifier label
//! through unchanged.

use super::verdict::{Verdict, WarningLevel};
use crate::config::EngineSettings;
use crate::detection::DetectionSignals;
use crate::machine_learning::{Classification, Label};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub short_text_threshold: usize,
    pub min_confidence_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            short_text_threshold: 5,
            min_confidence_threshold: 60.0,
        }
    }
}

impl From<&EngineSettings> for DecisionConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            short_text_threshold: settings.short_text_threshold,
            min_confidence_threshold: settings.min_confidence_threshold,
        }
    }
}

/// What every cascade rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct FusionInput<'a> {
    pub signals: &'a DetectionSignals,
    pub classifier_label: Label,
    /// Percent, 0 to 100.
    pub scam_probability: f64,
    pub short_text_threshold: usize,
}

impl FusionInput<'_> {
    pub fn is_short_text(&self) -> bool {
        self.signals.word_count <= self.short_text_threshold
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub label: Label,
    pub adjusted: bool,
    pub reason: String,
}

#[derive(Clone, Copy)]
pub struct CascadeRule {
    pub name: &'static str,
    pub applies: fn(&FusionInput) -> bool,
    pub outcome: fn(&FusionInput) -> RuleOutcome,
}

impl fmt::Debug for CascadeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeRule").field("name", &self.name).finish()
    }
}

pub const CLASSIFIER_RULE: &str = "classifier";

fn classifier_outcome(input: &FusionInput) -> RuleOutcome {
    RuleOutcome {
        label: input.classifier_label,
        adjusted: false,
        reason: String::new(),
    }
}

/// The standard cascade, highest priority first.
pub fn default_cascade() -> Vec<CascadeRule> {
    vec![
        CascadeRule {
            name: "critical_pattern",
            applies: |input| input.signals.critical_count >= 1,
            outcome: |input| RuleOutcome {
                label: Label::Scam,
                adjusted: true,
                reason: format!(
                    "CRITICAL SCAM PATTERN: {}",
                    input.signals.critical_patterns_found.join(", ")
                ),
            },
        },
        CascadeRule {
            name: "strong_indicators",
            applies: |input| input.signals.indicator_count >= 3,
            outcome: |input| RuleOutcome {
                label: Label::Scam,
                adjusted: true,
                reason: format!(
                    "Multiple strong indicators: {}",
                    input.signals.indicators_found.join(", ")
                ),
            },
        },
        CascadeRule {
            name: "suspicious_url",
            applies: |input| input.signals.has_suspicious_url && input.signals.indicator_count >= 1,
            outcome: |_| RuleOutcome {
                label: Label::Scam,
                adjusted: true,
                reason: "Suspicious URL + scam keywords".to_string(),
            },
        },
        CascadeRule {
            name: "indicators_with_confidence",
            applies: |input| input.signals.indicator_count >= 2 && input.scam_probability >= 50.0,
            // Only marked adjusted when the classifier disagreed.
            outcome: |input| RuleOutcome {
                label: Label::Scam,
                adjusted: input.classifier_label != Label::Scam,
                reason: format!(
                    "Indicators + ML confidence: {}",
                    input.signals.indicators_found.join(", ")
                ),
            },
        },
        CascadeRule {
            name: "short_safe_text",
            applies: |input| input.is_short_text() && input.signals.only_safe_words,
            outcome: |_| RuleOutcome {
                label: Label::Legitimate,
                adjusted: true,
                reason: "Short text with only safe words".to_string(),
            },
        },
        CascadeRule {
            name: "short_uncertain_text",
            applies: |input| {
                input.is_short_text()
                    && input.signals.indicator_count == 0
                    && input.scam_probability < 50.0
            },
            outcome: |_| RuleOutcome {
                label: Label::Legitimate,
                adjusted: true,
                reason: "Short text, no indicators, low ML confidence".to_string(),
            },
        },
        CascadeRule {
            name: CLASSIFIER_RULE,
            applies: |_| true,
            outcome: classifier_outcome,
        },
    ]
}

pub struct DecisionEngine {
    config: DecisionConfig,
    rules: Vec<CascadeRule>,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self::with_rules(config, default_cascade())
    }

    pub fn with_rules(config: DecisionConfig, rules: Vec<CascadeRule>) -> Self {
        Self { config, rules }
    }

    /// Make final decision from the detector signals and the classifier output
    pub fn make_decision(
        &self,
        signals: DetectionSignals,
        classification: &Classification,
        model_used: &str,
    ) -> Verdict {
        let (classifier_confidence, scam_probability) = classification.percentages();
        let input = FusionInput {
            signals: &signals,
            classifier_label: classification.label,
            scam_probability,
            short_text_threshold: self.config.short_text_threshold,
        };

        let (rule, outcome) = self
            .rules
            .iter()
            .find(|rule| (rule.applies)(&input))
            .map(|rule| (rule.name, (rule.outcome)(&input)))
            .unwrap_or_else(|| (CLASSIFIER_RULE, classifier_outcome(&input)));

        log::debug!(
            "Cascade rule '{}' -> {} (classifier {} at {:.2}% scam, adjusted: {})",
            rule,
            outcome.label,
            classification.label,
            scam_probability,
            outcome.adjusted
        );

        let is_short_text = input.is_short_text();
        let risk_factors = risk_factors(&signals);

        Verdict {
            final_label: outcome.label,
            classifier_label: classification.label,
            classifier_confidence,
            scam_probability,
            is_scam: outcome.label == Label::Scam,
            adjusted: outcome.adjusted,
            adjustment_reason: outcome.reason,
            rule: rule.to_string(),
            warning_level: WarningLevel::from_scam_probability(scam_probability),
            risk_factors,
            model_used: model_used.to_string(),
            word_count: signals.word_count,
            is_short_text,
            only_safe_words: signals.only_safe_words,
            signals,
        }
    }

    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }

    /// Inserts `rule` at `position`, clamped to the end of the cascade.
    pub fn insert_rule(&mut self, position: usize, rule: CascadeRule) {
        let position = position.min(self.rules.len());
        self.rules.insert(position, rule);
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DecisionConfig::default())
    }
}

/// Independent of which rule fired.
fn risk_factors(signals: &DetectionSignals) -> Vec<String> {
    let mut factors = Vec::new();
    if signals.critical_count > 0 {
        factors.push(format!("{} critical patterns", signals.critical_count));
    }
    if signals.indicator_count > 0 {
        factors.push(format!("{} scam keywords", signals.indicator_count));
    }
    if signals.has_suspicious_url {
        factors.push("Suspicious link/URL".to_string());
    }
    factors
}
