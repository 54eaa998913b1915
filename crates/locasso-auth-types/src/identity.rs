//! Claims extraction: request evidence → normalized external identity.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::HeaderMap;
use http::request::Parts;
use serde::Serialize;

use locasso_domain::provider;

use crate::developer::DeveloperParams;
use crate::mask::mask_value;
use crate::principal::{Claim, Principal, claim_types};
use crate::proxy::ProxyIdentity;
use crate::token::{IdTokenClaims, TokenError, id_token_from_headers};

/// Which evidence source produced an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimsSource {
    ProxyHeaders,
    IdToken,
    Developer,
    Principal,
}

/// Normalized identity tuple handed to the resolver.
///
/// Missing values are empty strings, never absent: the resolver decides whether an
/// empty `external_id` or `email` is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub provider: String,
    /// `None` when the request carried no usable evidence at all.
    pub source: Option<ClaimsSource>,
}

impl ExternalIdentity {
    /// Both required fields are present.
    pub fn is_complete(&self) -> bool {
        !self.external_id.is_empty() && !self.email.is_empty()
    }
}

/// Identity evidence carried by one request.
///
/// Extracting this never fails. Developer parameters are not read by the extractor
/// because they depend on service configuration and the request body; handlers attach
/// them with [`RequestEvidence::with_developer`].
#[derive(Debug, Clone, Default)]
pub struct RequestEvidence {
    pub headers: HeaderMap,
    pub principal: Option<Principal>,
    pub developer: Option<DeveloperParams>,
}

impl RequestEvidence {
    pub fn with_developer(mut self, params: DeveloperParams) -> Self {
        self.developer = Some(params);
        self
    }

    pub fn has_id_token(&self) -> bool {
        !matches!(id_token_from_headers(&self.headers), Err(TokenError::Missing))
    }
}

impl<S> FromRequestParts<S> for RequestEvidence
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    // Same shape as the other header extractors: read synchronously, return a
    // 'static future so the impl satisfies axum-core's `impl Future + Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let evidence = Self {
            headers: parts.headers.clone(),
            principal: parts.extensions.get::<Principal>().cloned(),
            developer: None,
        };
        async move { Ok(evidence) }
    }
}

/// The evidence source selected for a request, in priority order.
#[derive(Debug, Clone)]
pub enum IdentityEvidence {
    ProxyHeaders(ProxyIdentity),
    IdToken(IdTokenClaims),
    Developer(DeveloperParams),
    Principal(Principal),
}

impl IdentityEvidence {
    /// Pick the highest-priority source present in the request:
    /// proxy headers, identity token, developer parameters, then the upstream principal.
    pub fn select(evidence: &RequestEvidence) -> Option<Self> {
        if let Some(proxy) = ProxyIdentity::from_headers(&evidence.headers) {
            return Some(Self::ProxyHeaders(proxy));
        }
        match id_token_from_headers(&evidence.headers) {
            Ok(claims) => return Some(Self::IdToken(claims)),
            Err(TokenError::Malformed) => {
                tracing::debug!("ignoring identity token that does not decode");
            }
            Err(TokenError::Missing) => {}
        }
        if let Some(params) = evidence.developer.as_ref().filter(|p| p.has_id()) {
            return Some(Self::Developer(params.clone()));
        }
        evidence.principal.clone().map(Self::Principal)
    }

    pub fn source(&self) -> ClaimsSource {
        match self {
            Self::ProxyHeaders(_) => ClaimsSource::ProxyHeaders,
            Self::IdToken(_) => ClaimsSource::IdToken,
            Self::Developer(_) => ClaimsSource::Developer,
            Self::Principal(_) => ClaimsSource::Principal,
        }
    }

    /// Raw claims behind this evidence, unmasked.
    pub fn claims(&self) -> Vec<Claim> {
        match self {
            Self::ProxyHeaders(proxy) => proxy.claims(),
            Self::IdToken(token) => token.claims(),
            Self::Developer(params) => params.claims(),
            Self::Principal(principal) => principal.claims.clone(),
        }
    }

    pub fn into_identity(self) -> ExternalIdentity {
        let source = Some(self.source());
        match self {
            Self::ProxyHeaders(proxy) => ExternalIdentity {
                external_id: proxy.principal_id.clone(),
                email: proxy.email().to_owned(),
                name: proxy.name().to_owned(),
                photo_url: proxy.photo_url().to_owned(),
                provider: proxy.provider().to_owned(),
                source,
            },
            Self::IdToken(token) => ExternalIdentity {
                provider: token.provider().to_owned(),
                external_id: token.sub,
                email: token.email,
                name: token.name,
                photo_url: token.picture,
                source,
            },
            Self::Developer(params) => ExternalIdentity {
                external_id: params.id().to_owned(),
                email: params.email().to_owned(),
                name: params.name().to_owned(),
                photo_url: params.photo_url().to_owned(),
                provider: params.provider().to_owned(),
                source,
            },
            Self::Principal(principal) => ExternalIdentity {
                external_id: principal
                    .first_of(&[claim_types::NAME_IDENTIFIER, "sub"])
                    .to_owned(),
                email: principal.first_of(&[claim_types::EMAIL, "email"]).to_owned(),
                name: principal.first_of(&[claim_types::NAME, "name"]).to_owned(),
                photo_url: principal.first_of(&["picture"]).to_owned(),
                provider: principal_provider(&principal).to_owned(),
                source,
            },
        }
    }
}

/// Provider for an upstream principal: its `idp` claim, else a guess from the
/// authentication type, else Apple (the only provider the mobile client signs in with
/// without an explicit tag).
fn principal_provider(principal: &Principal) -> &str {
    if let Some(idp) = principal.find("idp") {
        return idp;
    }
    principal
        .authentication_type
        .as_deref()
        .and_then(provider::infer)
        .unwrap_or(provider::APPLE)
}

/// Extract the normalized identity from a request's evidence. Never fails: with no
/// usable evidence every field is empty.
pub fn extract_identity(evidence: &RequestEvidence) -> ExternalIdentity {
    let identity = IdentityEvidence::select(evidence)
        .map(IdentityEvidence::into_identity)
        .unwrap_or_default();
    tracing::debug!(
        source = ?identity.source,
        provider = %identity.provider,
        external_id = %mask_value(&identity.external_id),
        email = %mask_value(&identity.email),
        has_name = !identity.name.is_empty(),
        "extracted identity claims"
    );
    identity
}
