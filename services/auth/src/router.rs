use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::trace::TraceLayer;

use locasso_core::health::healthz;
use locasso_core::middleware::{log_auth_failures, request_id_layer};

use crate::handlers::{
    auth::{diagnostic, me, sign_in},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sign-in
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/me", get(me));

    // Diagnostic echoes claim evidence; never exposed outside developer mode.
    if state.dev_mode {
        router = router.route("/api/auth/diagnostic", get(diagnostic));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(log_auth_failures)),
        )
        .with_state(state)
}
