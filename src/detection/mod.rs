//! Stateless signal detectors. Each one reads a message and the shared
//! lexicon, and none of them can fail.

pub mod critical_patterns;
pub mod keywords;
pub mod suspicious_domains;

use crate::lexicon::CompiledLexicon;
use serde::{Deserialize, Serialize};

pub use critical_patterns::detect_critical_patterns;
pub use keywords::{count_words, detect_indicators, is_only_safe_words};
pub use suspicious_domains::detect_suspicious_url;

/// Everything the detectors derived from one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSignals {
    pub word_count: usize,
    pub indicator_count: usize,
    pub indicators_found: Vec<String>,
    pub critical_count: usize,
    pub critical_patterns_found: Vec<String>,
    pub has_suspicious_url: bool,
    pub suspicious_domains_found: Vec<String>,
    pub only_safe_words: bool,
}

impl DetectionSignals {
    pub fn analyze(lexicon: &CompiledLexicon, text: &str) -> Self {
        let word_count = count_words(text);
        let (indicator_count, indicators_found) = detect_indicators(lexicon, text);
        let (critical_count, critical_patterns_found) = detect_critical_patterns(lexicon, text);
        let (has_suspicious_url, suspicious_domains_found) = detect_suspicious_url(lexicon, text);
        let only_safe_words = is_only_safe_words(lexicon, text);

        log::debug!(
            "Signals: {} words, {} indicators, {} critical, suspicious url: {}, only safe: {}",
            word_count,
            indicator_count,
            critical_count,
            has_suspicious_url,
            only_safe_words
        );

        Self {
            word_count,
            indicator_count,
            indicators_found,
            critical_count,
            critical_patterns_found,
            has_suspicious_url,
            suspicious_domains_found,
            only_safe_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    #[test]
    fn test_lottery_message_signals() {
        let lexicon = Lexicon::default().compile().unwrap();
        let signals = DetectionSignals::analyze(
            &lexicon,
            "Selamat! Anda menang undian Rp50.000.000! Transfer biaya admin Rp500rb ke 081234567890",
        );

        assert_eq!(signals.word_count, 11);
        assert!(signals.critical_count >= 1);
        assert!(signals
            .critical_patterns_found
            .contains(&"selamat.*undian".to_string()));
        assert!(signals.indicator_count >= 3);
        for expected in ["menang", "undian", "transfer", "biaya admin"] {
            assert!(
                signals.indicators_found.contains(&expected.to_string()),
                "missing indicator {}",
                expected
            );
        }
        assert!(!signals.has_suspicious_url);
        assert!(!signals.only_safe_words);
    }

    #[test]
    fn test_meeting_message_has_no_signals() {
        let lexicon = Lexicon::default().compile().unwrap();
        let signals = DetectionSignals::analyze(
            &lexicon,
            "Meeting besok jam 2 siang. Jangan lupa bawa proposal",
        );

        assert_eq!(signals.critical_count, 0);
        assert_eq!(signals.indicator_count, 0, "found {:?}", signals.indicators_found);
        assert!(!signals.has_suspicious_url);
    }

    #[test]
    fn test_empty_message() {
        let lexicon = Lexicon::default().compile().unwrap();
        let signals = DetectionSignals::analyze(&lexicon, "");
        assert_eq!(signals.word_count, 0);
        assert_eq!(signals.indicator_count, 0);
        assert_eq!(signals.critical_count, 0);
        assert!(!signals.has_suspicious_url);
        assert!(signals.only_safe_words);
    }
}
