use axum::{extract::State, http::StatusCode};

use locasso_core::health::database_ready;

use crate::state::AppState;

/// Handler for `GET /readyz`: ready once the user store answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_ready(&state.db).await
}
