use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
};
use serde::Serialize;
use uuid::Uuid;

use locasso_auth_types::developer::{DeveloperParams, dev_flag_requested};
use locasso_auth_types::identity::{
    ClaimsSource, ExternalIdentity, IdentityEvidence, RequestEvidence, extract_identity,
};
use locasso_auth_types::mask::mask_claim;
use locasso_domain::user::UserRole;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::authenticate::{AuthenticateUserInput, AuthenticateUserUseCase};

/// Placeholder for identity fields the caller's claims do not carry.
const UNKNOWN: &str = "Unknown";

// ── POST /api/auth/signin ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub is_new_user: bool,
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: UserRole,
}

pub async fn sign_in(
    State(state): State<AppState>,
    evidence: RequestEvidence,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Result<Json<SignInResponse>, AuthServiceError> {
    let evidence = attach_developer_params(&state, evidence, raw_query.as_deref(), &body);
    let identity = extract_identity(&evidence);

    let usecase = AuthenticateUserUseCase {
        repo: state.user_repo(),
    };
    let out = usecase.execute(authenticate_input(identity)).await?;
    let user = out.user;

    Ok(Json(SignInResponse {
        is_new_user: out.is_new_user,
        user_id: user.id,
        email: user.email,
        name: non_empty(user.name),
        photo_url: non_empty(user.photo_url),
        role: user.role,
    }))
}

// ── GET /api/auth/me ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Echo the caller's identity claims. Never reads the user store.
pub async fn me(
    State(state): State<AppState>,
    evidence: RequestEvidence,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<MeResponse>, AuthServiceError> {
    let evidence = attach_developer_params(&state, evidence, raw_query.as_deref(), &[]);
    let identity = extract_identity(&evidence);
    if identity.source.is_none() {
        return Err(AuthServiceError::Unauthenticated);
    }
    Ok(Json(MeResponse {
        id: or_unknown(identity.external_id),
        email: or_unknown(identity.email),
        name: or_unknown(identity.name),
    }))
}

// ── GET /api/auth/diagnostic ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DiagnosticClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResponse {
    pub is_authenticated: bool,
    pub source: Option<ClaimsSource>,
    pub claims: Vec<DiagnosticClaim>,
    pub has_id_token: bool,
}

/// Report which evidence the request carries, with sensitive claim values masked.
/// Routed only in developer mode.
pub async fn diagnostic(
    State(state): State<AppState>,
    evidence: RequestEvidence,
    RawQuery(raw_query): RawQuery,
) -> Json<DiagnosticResponse> {
    let evidence = attach_developer_params(&state, evidence, raw_query.as_deref(), &[]);
    let selected = IdentityEvidence::select(&evidence);
    let claims = selected
        .as_ref()
        .map(IdentityEvidence::claims)
        .unwrap_or_default()
        .into_iter()
        .map(|claim| DiagnosticClaim {
            value: mask_claim(&claim.typ, &claim.val),
            claim_type: claim.typ,
        })
        .collect();

    Json(DiagnosticResponse {
        is_authenticated: selected.is_some(),
        source: selected.as_ref().map(IdentityEvidence::source),
        claims,
        has_id_token: evidence.has_id_token(),
    })
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Attach developer parameters when the service is in developer mode and the caller
/// opted in. Otherwise the evidence is returned unchanged.
fn attach_developer_params(
    state: &AppState,
    evidence: RequestEvidence,
    raw_query: Option<&str>,
    body: &[u8],
) -> RequestEvidence {
    if !dev_flag_requested(&evidence.headers, raw_query) {
        return evidence;
    }
    if !state.dev_mode {
        tracing::debug!("developer parameters ignored outside developer mode");
        return evidence;
    }
    evidence.with_developer(DeveloperParams::from_request(raw_query, body))
}

fn authenticate_input(identity: ExternalIdentity) -> AuthenticateUserInput {
    AuthenticateUserInput {
        external_id: identity.external_id,
        email: identity.email,
        name: non_empty(identity.name),
        photo_url: non_empty(identity.photo_url),
        provider: identity.provider,
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_owned()
    } else {
        value
    }
}
