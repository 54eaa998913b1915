//! Identity provider tags.
//!
//! A provider tag names the identity system that authenticated a user. Together with
//! the provider's subject id it forms the unique key of a user record. Tags coming from
//! the platform proxy are stored as received, so the set is open.

pub const APPLE: &str = "apple";
pub const GOOGLE: &str = "google";
/// Developer-mode sign-ins without a live identity provider.
pub const DEV: &str = "dev";
pub const UNKNOWN: &str = "unknown";

/// Infer a provider tag from free text such as a token issuer or an authentication type.
///
/// Case-insensitive substring match: "apple" wins over "google". Returns `None` when
/// neither matches so callers can pick their own default.
pub fn infer(hint: &str) -> Option<&'static str> {
    let hint = hint.to_ascii_lowercase();
    if hint.contains(APPLE) {
        Some(APPLE)
    } else if hint.contains(GOOGLE) {
        Some(GOOGLE)
    } else {
        None
    }
}
