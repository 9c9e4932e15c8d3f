use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::handlers::helpers::{save_request, session_id_from_jar};
use crate::models::AppState;
use crate::routes::is_protected_get_route;
use crate::services::Authorization;

/// Runs in front of every route. Exempt and permitted paths pass straight
/// through; everything else needs a live session or gets redirected to the
/// login page.
pub async fn auth_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if state.gate.is_exempt(&path) || state.gate.is_permitted(&path) {
        return next.run(request).await;
    }
    match state.gate.authorize(session_id_from_jar(&jar).as_deref()) {
        Authorization::Authenticated(session) => {
            tracing::debug!(username = %session.username, %path, "authenticated request");
            next.run(request).await
        }
        Authorization::Unauthenticated => {
            tracing::debug!(%path, "redirecting unauthenticated request to login page");
            // unrouted paths such as /favicon.ico would only lead to a 404
            let jar = if request.method() == Method::GET && is_protected_get_route(&path) {
                save_request(jar, request.uri())
            } else {
                jar
            };
            (jar, Redirect::to(&state.config.login_page)).into_response()
        }
    }
}
