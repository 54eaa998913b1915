//! Claims principal attached to a request by an upstream authentication layer.

use serde::{Deserialize, Serialize};

/// Long-form claim type URIs used by platform identity layers alongside the short
/// OIDC names (`sub`, `email`, `name`).
pub mod claim_types {
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
    pub const EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
}

/// A single key/value assertion about an identity.
///
/// Field names match the platform proxy's serialized principal (`typ`/`val`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub typ: String,
    pub val: String,
}

impl Claim {
    pub fn new(typ: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            val: val.into(),
        }
    }
}

/// An already-authenticated identity.
///
/// Upstream layers insert this into request extensions; the claims extractor reads it
/// as its lowest-priority evidence source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// How the upstream layer authenticated the caller (e.g. "AppleId", "Google").
    pub authentication_type: Option<String>,
    pub claims: Vec<Claim>,
}

impl Principal {
    pub fn new(authentication_type: Option<&str>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: authentication_type.map(str::to_owned),
            claims,
        }
    }

    /// First non-empty value of a claim type, compared case-insensitively.
    pub fn find(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.typ.eq_ignore_ascii_case(claim_type) && !c.val.is_empty())
            .map(|c| c.val.as_str())
    }

    /// First non-empty value among `claim_types`, in order; empty string when none match.
    pub fn first_of(&self, claim_types: &[&str]) -> &str {
        claim_types
            .iter()
            .find_map(|t| self.find(t))
            .unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}
