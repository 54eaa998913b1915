//! Masking of claim values before they reach logs or diagnostic output.

use crate::principal::claim_types;

/// Shown in place of an empty value.
pub const NULL_MARKER: &str = "[NULL]";

/// Shown in place of values too short to partially reveal.
pub const REDACTED: &str = "*****";

/// Mask a sensitive value: values of 5 characters or fewer are fully redacted, longer
/// ones keep their first 3 and last 2 characters.
pub fn mask_value(value: &str) -> String {
    if value.is_empty() {
        return NULL_MARKER.to_owned();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 5 {
        return REDACTED.to_owned();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}...{tail}")
}

/// Whether a claim type carries personal data.
pub fn is_sensitive_claim(claim_type: &str) -> bool {
    [
        "email",
        "sub",
        "name",
        claim_types::NAME_IDENTIFIER,
        claim_types::EMAIL,
        claim_types::NAME,
    ]
    .iter()
    .any(|t| t.eq_ignore_ascii_case(claim_type))
}

/// Mask a claim value when its type is sensitive; other values pass through.
pub fn mask_claim(claim_type: &str, value: &str) -> String {
    if value.is_empty() {
        NULL_MARKER.to_owned()
    } else if is_sensitive_claim(claim_type) {
        mask_value(value)
    } else {
        value.to_owned()
    }
}
