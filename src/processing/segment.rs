//! Section boundary detection.
//!
//! Every header pattern is anchored on the newline that precedes the header, and the
//! newline's offset is recorded as the boundary. All patterns are treated as equally
//! valid; overlapping matches simply yield nearby offsets, which the chunker tolerates.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Section 1: Introduction
        r"\n\s*(?:SECTION|Section)\s+\d+[.:]\s+\w+",
        // 1.2 Important Terms
        r"\n\s*\d+(?:\.\d+)*\s+[A-Z][a-zA-Z\s]+",
        // IV. Risk Factors
        r"\n\s*[IVXLCDM]+\.\s+[A-Z][a-zA-Z\s]+",
        // RISK FACTORS (SUMMARY)
        r"(?m)\n[ \t]*[A-Z][A-Z \t]{2,80}(?:[ \t]*\([^)\n]+\))?[ \t]*$",
        // Article IV: Terms, Article 4. Terms
        r"\n\s*(?:ARTICLE|Article)\s+(?:[IVXLCDM]+|\d+)[.:]\s+\w+",
    ]
    .into_iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            tracing::error!(pattern, error = %error, "Skipping invalid header pattern");
            None
        }
    })
    .collect()
});

/// Detect candidate section starts in `text`.
///
/// The result is strictly increasing and always begins with offset `0`. Offsets are byte
/// positions and always fall on character boundaries.
pub fn detect_section_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = BTreeSet::from([0]);
    for pattern in HEADER_PATTERNS.iter() {
        boundaries.extend(pattern.find_iter(text).map(|found| found.start()));
    }
    tracing::trace!(count = boundaries.len(), "Detected section boundaries");
    boundaries.into_iter().collect()
}
