//! Identity-token decoding.
//!
//! The token's signature is NOT verified here. The issuer (Sign in with Apple, Google)
//! or the platform proxy in front of the service is trusted to have done that; this
//! module only reads the claims.

use http::HeaderMap;
use serde::{Deserialize, Serialize};

use locasso_domain::provider;

use crate::principal::Claim;
use crate::proxy::header_str;

/// Dedicated request header carrying the identity token.
pub const ID_TOKEN_HEADER: &str = "x-id-token";

/// Errors returned by [`decode_id_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("missing token")]
    Missing,
    #[error("malformed token")]
    Malformed,
}

/// OIDC identity-token claims relevant to sign-in.
///
/// Every field defaults to empty so tokens from issuers that omit a claim (Apple only
/// sends `email` on some sign-ins) still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub iss: String,
}

impl IdTokenClaims {
    /// Provider tag inferred from the issuer, `"unknown"` when it names neither Apple
    /// nor Google.
    pub fn provider(&self) -> &'static str {
        provider::infer(&self.iss).unwrap_or(provider::UNKNOWN)
    }

    pub fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new("sub", &self.sub),
            Claim::new("email", &self.email),
            Claim::new("name", &self.name),
            Claim::new("picture", &self.picture),
            Claim::new("iss", &self.iss),
        ]
    }
}

/// Decode an identity token's claims without verifying its signature or expiry.
pub fn decode_id_token(token: &str) -> Result<IdTokenClaims, TokenError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    jsonwebtoken::dangerous::insecure_decode::<IdTokenClaims>(token)
        .map(|data| data.claims)
        .map_err(|_| TokenError::Malformed)
}

/// Read and decode the token in [`ID_TOKEN_HEADER`].
pub fn id_token_from_headers(headers: &HeaderMap) -> Result<IdTokenClaims, TokenError> {
    decode_id_token(header_str(headers, ID_TOKEN_HEADER))
}
