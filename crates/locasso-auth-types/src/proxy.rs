//! Identity headers injected by the platform authentication proxy.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use serde::Deserialize;

use locasso_domain::provider;

use crate::principal::{Claim, Principal, claim_types};

pub const PRINCIPAL_ID_HEADER: &str = "x-ms-client-principal-id";
pub const PRINCIPAL_HEADER: &str = "x-ms-client-principal";
pub const PRINCIPAL_NAME_HEADER: &str = "x-ms-client-principal-name";
pub const PRINCIPAL_EMAIL_HEADER: &str = "x-ms-client-principal-email";
pub const PRINCIPAL_IDP_HEADER: &str = "x-ms-client-principal-idp";

/// Identity as reported by the proxy headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyIdentity {
    pub principal_id: String,
    pub name: String,
    pub email: String,
    pub idp: String,
    /// Decoded `x-ms-client-principal` blob; `None` when it is not valid base64 JSON.
    pub principal: Option<Principal>,
}

impl ProxyIdentity {
    /// Read the proxy headers. Returns `None` unless both the principal id and the
    /// principal blob are present and non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let principal_id = header_str(headers, PRINCIPAL_ID_HEADER);
        let blob = header_str(headers, PRINCIPAL_HEADER);
        if principal_id.is_empty() || blob.is_empty() {
            return None;
        }
        Some(Self {
            principal_id: principal_id.to_owned(),
            name: header_str(headers, PRINCIPAL_NAME_HEADER).to_owned(),
            email: header_str(headers, PRINCIPAL_EMAIL_HEADER).to_owned(),
            idp: header_str(headers, PRINCIPAL_IDP_HEADER).to_owned(),
            principal: decode_client_principal(blob),
        })
    }

    /// Email from the header, else from the decoded principal.
    pub fn email(&self) -> &str {
        non_empty_or(&self.email, || {
            self.blob_claim(&[claim_types::EMAIL, "email"])
        })
    }

    /// Display name from the header, else from the decoded principal.
    pub fn name(&self) -> &str {
        non_empty_or(&self.name, || self.blob_claim(&[claim_types::NAME, "name"]))
    }

    pub fn photo_url(&self) -> &str {
        self.blob_claim(&["picture"])
    }

    /// Provider tag from the idp header, else the principal's auth type, else "unknown".
    pub fn provider(&self) -> &str {
        non_empty_or(&self.idp, || {
            self.principal
                .as_ref()
                .and_then(|p| p.authentication_type.as_deref())
                .filter(|t| !t.is_empty())
                .unwrap_or(provider::UNKNOWN)
        })
    }

    /// Claims reported by the proxy, header values first.
    pub fn claims(&self) -> Vec<Claim> {
        let mut claims = vec![
            Claim::new("sub", &self.principal_id),
            Claim::new("email", self.email()),
            Claim::new("name", self.name()),
            Claim::new("idp", self.provider()),
        ];
        if let Some(principal) = &self.principal {
            claims.extend(principal.claims.iter().cloned());
        }
        claims
    }

    fn blob_claim(&self, claim_types: &[&str]) -> &str {
        self.principal
            .as_ref()
            .map(|p| p.first_of(claim_types))
            .unwrap_or_default()
    }
}

/// Serialized principal carried in `x-ms-client-principal`.
#[derive(Debug, Deserialize)]
struct ClientPrincipal {
    #[serde(default)]
    auth_typ: Option<String>,
    #[serde(default)]
    claims: Vec<Claim>,
}

fn decode_client_principal(blob: &str) -> Option<Principal> {
    let bytes = match STANDARD.decode(blob) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "client principal is not valid base64");
            return None;
        }
    };
    match serde_json::from_slice::<ClientPrincipal>(&bytes) {
        Ok(cp) => Some(Principal {
            authentication_type: cp.auth_typ,
            claims: cp.claims,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "client principal is not valid JSON");
            None
        }
    }
}

/// Trimmed header value; empty when absent or not visible ASCII.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
}

fn non_empty_or<'a>(value: &'a str, fallback: impl FnOnce() -> &'a str) -> &'a str {
    if value.is_empty() { fallback() } else { value }
}
