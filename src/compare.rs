//! Checking a computed digest against a reference value.

use crate::models::{DigestResult, Verdict};

/// Exact, case-sensitive comparison. An empty reference means there is
/// nothing to check against.
pub fn compare(computed: &str, reference: &str) -> Verdict {
    if reference.is_empty() {
        Verdict::NoReference
    } else if computed == reference {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// Trim surrounding whitespace and lowercase, matching the engine's hex rendering.
pub fn normalize_reference(text: &str) -> String {
    text.trim().to_ascii_lowercase()
}

/// Normalize `reference` and compare it with the result's digest.
pub fn verify(result: &DigestResult, reference: &str) -> Verdict {
    compare(result.hex_digest(), &normalize_reference(reference))
}
