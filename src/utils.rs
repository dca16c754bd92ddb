//! String normalization shared by query evaluation.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

/// Normalize a query string: lowercase, strip diacritics, and collapse whitespace.
///
/// Index artifacts store their terms in this form, so queries must pass through
/// the same pipeline before lookup:
/// - "café" → "cafe"
/// - "Naïve  Queries" → "naive queries"
/// - "Résumé" → "resume"
///
/// # Algorithm (with unicode-normalization feature)
///
/// 1. NFD normalize (decompose characters into base + combining marks)
/// 2. Filter out combining marks (category Mn = Mark, Nonspacing)
/// 3. Lowercase
/// 4. Collapse whitespace
///
/// # Algorithm (without unicode-normalization)
///
/// 1. Lowercase only (assumes input is pre-normalized or ASCII)
/// 2. Collapse whitespace
#[cfg(feature = "unicode-normalization")]
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lightweight normalization when the feature is disabled.
/// Just lowercases and collapses whitespace. Assumes input is ASCII or pre-normalized.
#[cfg(not(feature = "unicode-normalization"))]
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if a character is a combining mark (diacritic).
///
/// Combining marks have Unicode category "Mn" (Mark, Nonspacing).
/// Examples: ́ (acute), ̄ (macron), ̣ (dot below)
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    // Unicode category Mn (Mark, Nonspacing) range
    // This covers the most common combining diacritical marks
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{0C00}'..='\u{0C7F}' |  // Telugu (some combining marks)
        '\u{0900}'..='\u{097F}' |  // Devanagari (some combining marks)
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}
