use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(
        axum::http::HeaderName::from_static("x-request-id"),
        MakeUuidRequestId,
    )
}

/// Log 401 and 403 responses with enough request context to trace the failing caller.
///
/// Only header names are logged, and any header carrying credentials is left out
/// entirely. Apply with `.layer(axum::middleware::from_fn(log_auth_failures))`.
pub async fn log_auth_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let headers = header_names(request.headers());

    let response = next.run(request).await;

    match response.status() {
        StatusCode::UNAUTHORIZED => tracing::warn!(
            status = 401,
            %method,
            %path,
            headers = %headers,
            "authentication failed"
        ),
        StatusCode::FORBIDDEN => tracing::warn!(
            status = 403,
            %method,
            %path,
            "authorization failed"
        ),
        _ => {}
    }
    response
}

fn header_names(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(|name| name.as_str())
        .filter(|name| !is_credential_header(name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_credential_header(name: &str) -> bool {
    name.contains("authorization") || name.contains("token") || name == "cookie"
}
