//! Request-id propagation and bearer-token gates.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use furnish_auth::Claims;

use crate::error::ApiError;
use crate::state::AppState;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Attaches a request id to the request extensions and echoes it on the
/// response. An inbound `x-request-id` is kept so upstream proxies can
/// correlate.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    req.extensions_mut().insert(id.clone());
    let mut res = next.run(req).await;
    res.headers_mut().insert(REQUEST_ID_HEADER.clone(), id);
    res
}

/// Requires a valid bearer token; stores the claims in the extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match claims_from_request(&state, &req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// Requires a valid bearer token with the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match claims_from_request(&state, &req) {
        Ok(claims) if claims.is_admin() => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(_) => ApiError::new(StatusCode::FORBIDDEN, "admin role required").into_response(),
        Err(err) => err.into_response(),
    }
}

fn claims_from_request(state: &AppState, req: &Request<Body>) -> Result<Claims, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

    let token = match header.strip_prefix("Bearer ") {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::unauthorized("invalid Authorization header")),
    };

    state.tokens.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "token rejected");
        ApiError::unauthorized("invalid or expired token")
    })
}
