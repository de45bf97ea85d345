use crate::lexicon::CompiledLexicon;

/// Suspicious-domain patterns matched in the lower-cased text.
///
/// The patterns are only evaluated when the text carries some URL-like token
/// (scheme, `www.` or a short dotted suffix); ordinary prose with periods never
/// reaches them.
pub fn detect_suspicious_url(lexicon: &CompiledLexicon, text: &str) -> (bool, Vec<String>) {
    let text_lower = text.to_lowercase();

    if !lexicon.url_marker.is_match(&text_lower) {
        return (false, Vec::new());
    }

    let found: Vec<String> = lexicon
        .suspicious_domains
        .iter()
        .filter(|(_, regex)| regex.is_match(&text_lower))
        .map(|(source, _)| source.clone())
        .collect();

    if !found.is_empty() {
        log::debug!("Suspicious domain patterns matched: {:?}", found);
    }

    (!found.is_empty(), found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use std::collections::BTreeSet;

    #[test]
    fn test_suspicious_domain_detected() {
        let lexicon = Lexicon::default().compile().unwrap();
        let (suspicious, found) =
            detect_suspicious_url(&lexicon, "Info: www.hadiahtelkomsel2024.com");
        assert!(suspicious);
        assert!(found.contains(&r"hadiah.*\.com".to_string()));
        assert!(found.contains(&r"\d{4,}\.com".to_string()));
    }

    #[test]
    fn test_no_url_marker_skips_patterns() {
        // pattern needs no dot, so only the URL gate can keep it from matching
        let lexicon = Lexicon {
            safe_words: BTreeSet::new(),
            strong_indicators: vec![],
            critical_patterns: vec![],
            suspicious_domain_patterns: vec!["promo".to_string()],
        }
        .compile()
        .unwrap();

        assert_eq!(detect_suspicious_url(&lexicon, "promo akhir tahun"), (false, vec![]));
        assert!(detect_suspicious_url(&lexicon, "promo di www.toko.id").0);
    }

    #[test]
    fn test_legitimate_domain_not_flagged() {
        let lexicon = Lexicon::default().compile().unwrap();
        let (suspicious, found) = detect_suspicious_url(&lexicon, "Cek https://github.com/rust-lang");
        assert!(!suspicious);
        assert!(found.is_empty());
    }
}
