use crate::lexicon::CompiledLexicon;

/// Critical patterns found anywhere in the lower-cased text (unanchored
/// search). Returns the pattern sources in lexicon order.
pub fn detect_critical_patterns(lexicon: &CompiledLexicon, text: &str) -> (usize, Vec<String>) {
    let text_lower = text.to_lowercase();
    let found: Vec<String> = lexicon
        .critical_patterns
        .iter()
        .filter(|(_, regex)| regex.is_match(&text_lower))
        .map(|(source, _)| source.clone())
        .collect();

    if !found.is_empty() {
        log::debug!("Critical patterns matched: {:?}", found);
    }

    (found.len(), found)
}
