/// Session gate middleware
///
/// Runs in front of every route. Public paths and the auth endpoints pass
/// straight through. Everything else needs a valid session token from the
/// `Authorization: Bearer` header or the session cookie:
///
/// - protected pages (`/dashboard...`) redirect to
///   `/login?callbackUrl=<original path and query>` with `303 See Other`
/// - protected API endpoints answer `401` JSON
///
/// On success a [`SessionContext`] is inserted into the request extensions
/// for handlers to extract with `Extension<SessionContext>`.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use pagepilot_shared::auth::{
    gate::{classify_path, login_redirect_target, session_token_from_headers, RouteClass, SessionContext},
    session::validate_session_token,
};

pub async fn session_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let class = classify_path(req.uri().path());

    if matches!(class, RouteClass::Public | RouteClass::Bypass) {
        return next.run(req).await;
    }

    let claims = session_token_from_headers(req.headers())
        .map(|token| validate_session_token(&token, state.session_secret()));

    match claims {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(SessionContext::from(claims));
            next.run(req).await
        }
        failure => {
            if let Some(Err(e)) = &failure {
                tracing::debug!(path = %req.uri().path(), error = %e, "Rejected session token");
            }

            match class {
                RouteClass::Page => {
                    let original = req
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str())
                        .unwrap_or_else(|| req.uri().path());
                    Redirect::to(&login_redirect_target(original)).into_response()
                }
                _ => match failure {
                    Some(Err(e)) => ApiError::from(e).into_response(),
                    _ => ApiError::Unauthorized("Authentication required".to_string()).into_response(),
                },
            }
        }
    }
}
