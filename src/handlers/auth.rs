use askama::Template;
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::AppState;
use crate::services::{CredentialInput, LoginOutcome};
use crate::templates::LoginTemplate;
use crate::utils::parse_urlencoded_body;

use super::helpers::{
    clear_saved_request, clear_session_cookie, current_session_from_jar, ensure_csrf_token,
    session_cookie, session_id_from_jar, success_target, verify_csrf,
};

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";
pub const LOGGED_OUT_MESSAGE: &str = "You have been signed out.";

#[derive(Deserialize, Default)]
pub struct LoginPageQuery {
    pub error: Option<String>,
    pub logout: Option<String>,
}

pub async fn login_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginPageQuery>,
) -> Result<Response, AppError> {
    if current_session_from_jar(&state, &jar).is_some() {
        return Ok(Redirect::to(&state.config.default_success_url).into_response());
    }
    let (jar, csrf_token) = ensure_csrf_token(&state, jar);
    let mut page = LoginTemplate::new(&state, csrf_token);
    if query.logout.is_some() {
        page = page.with_notice(LOGGED_OUT_MESSAGE);
    }
    if query.error.is_some() {
        page = page.with_error(LOGIN_FAILED_MESSAGE);
    }
    Ok((jar, Html(page.render()?)).into_response())
}

pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, AppError> {
    let fields = parse_urlencoded_body(&body);
    verify_csrf(&state, &jar, &fields)?;
    let input = CredentialInput::from_form(
        &fields,
        &state.config.username_param,
        &state.config.password_param,
    );
    match state.gate.login(&input) {
        LoginOutcome::Success(session) => {
            // drop any session the client held before logging in
            if let Some(previous) = session_id_from_jar(&jar) {
                state.gate.logout(&previous);
            }
            let target = success_target(&state, &jar);
            let jar = clear_saved_request(jar).add(session_cookie(&session));
            Ok((jar, Redirect::to(&target)).into_response())
        }
        LoginOutcome::Failure => {
            let (jar, csrf_token) = ensure_csrf_token(&state, jar);
            let page = LoginTemplate::new(&state, csrf_token).with_error(LOGIN_FAILED_MESSAGE);
            Ok((jar, Html(page.render()?)).into_response())
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, AppError> {
    let fields = parse_urlencoded_body(&body);
    verify_csrf(&state, &jar, &fields)?;
    if let Some(sid) = session_id_from_jar(&jar) {
        state.gate.logout(&sid);
    }
    let target = format!("{}?logout", state.config.login_page);
    Ok((clear_session_cookie(jar), Redirect::to(&target)).into_response())
}
