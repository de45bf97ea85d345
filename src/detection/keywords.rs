use crate::lexicon::CompiledLexicon;

/// Number of whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Strong indicators occurring anywhere in the lower-cased text, in lexicon
/// order. Matching is plain substring search with no word boundaries, so
/// run-together scam text still counts.
pub fn detect_indicators(lexicon: &CompiledLexicon, text: &str) -> (usize, Vec<String>) {
    let text_lower = text.to_lowercase();
    let found: Vec<String> = lexicon
        .strong_indicators
        .iter()
        .filter(|indicator| text_lower.contains(indicator.as_str()))
        .cloned()
        .collect();

    (found.len(), found)
}

/// True when every word longer than two characters is a safe word.
/// An empty message is vacuously safe.
pub fn is_only_safe_words(lexicon: &CompiledLexicon, text: &str) -> bool {
    text.to_lowercase()
        .split_whitespace()
        .all(|word| word.chars().count() <= 2 || lexicon.safe_words.contains(word))
}
